#![forbid(unsafe_code)]

//! Wire encoding helpers.
//!
//! All fixed-length binary values (public keys, KEM ciphertexts, nonces,
//! signatures) are carried as standard base64 text when they cross a
//! text-based transport boundary. The [`b64`] serde adapter keeps struct
//! fields as raw bytes in memory while (de)serializing them as base64
//! strings.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encode bytes as standard base64 text.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

/// Serde adapter: `#[serde(with = "quill_core::wire::b64")]` on a `Vec<u8>`
/// field serializes it as a base64 string.
pub mod b64 {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
