#![forbid(unsafe_code)]

//! Message cipher.
//!
//! Application payloads are protected under an established session key.
//! Encryption always generates a fresh random nonce of the AEAD's required
//! length — callers can never supply one, which eliminates nonce-reuse bugs
//! at the call site. Associated data binds sender/recipient context into
//! the tag so a ciphertext cannot be replayed to a different recipient
//! without detection.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use crate::session::SessionKey;

/// One encrypted application payload, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub sender: String,
    pub recipient: String,
    #[serde(with = "quill_core::wire::b64")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub nonce: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub aad: Vec<u8>,
    /// Observability only; never used for protocol decisions.
    pub timestamp: DateTime<Utc>,
    pub message_id: String,
}

/// Encrypt a payload under the session key with a fresh random nonce.
pub fn seal(
    provider: &CryptoProvider,
    key: &SessionKey,
    sender: &str,
    recipient: &str,
    plaintext: &[u8],
    aad: &[u8],
) -> CryptoResult<EncryptedMessage> {
    let mut nonce = vec![0u8; provider.aead().nonce_len()];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = provider.aead().encrypt(key.as_bytes(), &nonce, plaintext, aad)?;
    let message = EncryptedMessage {
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        ciphertext,
        nonce,
        aad: aad.to_vec(),
        timestamp: quill_core::ids::now(),
        message_id: quill_core::ids::new_id(),
    };
    debug!(message_id = %message.message_id, recipient = %message.recipient, "message sealed");
    Ok(message)
}

/// Decrypt a received message. Any tag mismatch, truncated input or wrong
/// key yields [`CryptoError::AuthenticationFailure`]; the cause is never
/// distinguished and no partial plaintext is returned.
pub fn open(provider: &CryptoProvider, key: &SessionKey, message: &EncryptedMessage) -> CryptoResult<Vec<u8>> {
    provider
        .aead()
        .decrypt(key.as_bytes(), &message.nonce, &message.ciphertext, &message.aad)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::HkdfSha256;
    use crate::session::{derive_session_key, SharedSecretPair};
    use std::collections::HashSet;

    fn test_key(seed: u8) -> SessionKey {
        derive_session_key(&HkdfSha256, SharedSecretPair::new([seed; 32], [seed + 1; 32]), "hs-test")
    }

    #[test]
    fn seal_then_open_round_trips() {
        let provider = CryptoProvider::default_stack();
        let key = test_key(1);
        let sealed = seal(&provider, &key, "alice", "bob", b"hello", b"alice|bob").unwrap();
        assert_eq!(open(&provider, &key, &sealed).unwrap(), b"hello");
    }

    #[test]
    fn nonces_are_never_repeated() {
        let provider = CryptoProvider::default_stack();
        let key = test_key(2);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let sealed = seal(&provider, &key, "a", "b", b"payload", b"").unwrap();
            assert_eq!(sealed.nonce.len(), 12);
            assert!(seen.insert(sealed.nonce));
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let provider = CryptoProvider::default_stack();
        let sealed = seal(&provider, &test_key(3), "alice", "bob", b"hello", b"").unwrap();
        assert_eq!(
            open(&provider, &test_key(9), &sealed).unwrap_err(),
            CryptoError::AuthenticationFailure
        );
    }

    #[test]
    fn tampering_any_field_fails_closed() {
        let provider = CryptoProvider::default_stack();
        let key = test_key(4);
        let sealed = seal(&provider, &key, "alice", "bob", b"hello", b"alice|bob").unwrap();

        let mut bad_ct = sealed.clone();
        bad_ct.ciphertext[0] ^= 0x01;
        assert_eq!(open(&provider, &key, &bad_ct).unwrap_err(), CryptoError::AuthenticationFailure);

        let mut bad_nonce = sealed.clone();
        bad_nonce.nonce[0] ^= 0x01;
        assert_eq!(open(&provider, &key, &bad_nonce).unwrap_err(), CryptoError::AuthenticationFailure);

        let mut bad_aad = sealed;
        bad_aad.aad = b"mallory|bob".to_vec();
        assert_eq!(open(&provider, &key, &bad_aad).unwrap_err(), CryptoError::AuthenticationFailure);
    }

    #[test]
    fn message_ids_are_unique() {
        let provider = CryptoProvider::default_stack();
        let key = test_key(5);
        let a = seal(&provider, &key, "alice", "bob", b"x", b"").unwrap();
        let b = seal(&provider, &key, "alice", "bob", b"x", b"").unwrap();
        assert_ne!(a.message_id, b.message_id);
    }
}
