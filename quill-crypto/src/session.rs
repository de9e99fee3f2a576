#![forbid(unsafe_code)]

//! Session key derivation.
//!
//! Both shared secrets are combined into one 32-byte session key:
//!
//! ```text
//! session_key = HKDF-SHA256(SHA-256(ecdh_secret || kem_secret),
//!                           salt = "quill-hybrid-session",
//!                           info = "quill-hybrid-session", 32)
//! ```
//!
//! The pre-hash normalizes the combined secret length before extraction;
//! the fixed salt/info label separates this derivation from every other
//! HKDF use. Concatenation order is fixed — ECDH first, KEM second — and
//! both sides must honor it or derive mismatched keys, which fail closed
//! at the first decrypt. Each party derives the identical key locally; the
//! symmetric key itself is never transported.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::kdf::KdfLabel;
use crate::provider::Kdf;

/// The two independent shared secrets of one handshake. Transient: held
/// only between secret computation and key derivation, zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecretPair {
    ecdh: [u8; 32],
    kem: [u8; 32],
}

impl SharedSecretPair {
    pub fn new(ecdh: [u8; 32], kem: [u8; 32]) -> Self {
        Self { ecdh, kem }
    }
}

impl fmt::Debug for SharedSecretPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecretPair(<redacted>)")
    }
}

/// 32-byte session key that zeroizes on drop. Tagged with the handshake
/// that produced it; the creation time is observability only.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SessionKey {
    key: [u8; 32],
    #[zeroize(skip)]
    handshake_id: String,
    #[zeroize(skip)]
    created_at: DateTime<Utc>,
}

impl SessionKey {
    pub fn new(key: [u8; 32], handshake_id: String) -> Self {
        Self { key, handshake_id, created_at: quill_core::ids::now() }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn handshake_id(&self) -> &str {
        &self.handshake_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("handshake_id", &self.handshake_id)
            .field("created_at", &self.created_at)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Combine the two shared secrets into the session key. Consumes the pair;
/// all intermediate buffers are zeroized before returning.
pub fn derive_session_key(kdf: &dyn Kdf, secrets: SharedSecretPair, handshake_id: &str) -> SessionKey {
    let mut combined = Zeroizing::new([0u8; 64]);
    combined[..32].copy_from_slice(&secrets.ecdh);
    combined[32..].copy_from_slice(&secrets.kem);
    drop(secrets);

    let seed: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(&combined[..]).into());

    let label = KdfLabel::Session.as_bytes();
    let mut okm = kdf.derive(&seed[..], label, label, 32);
    let mut key = [0u8; 32];
    key.copy_from_slice(&okm);
    okm.zeroize();

    SessionKey::new(key, handshake_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::HkdfSha256;

    #[test]
    fn identical_secrets_derive_identical_keys() {
        let kdf = HkdfSha256;
        let a = derive_session_key(&kdf, SharedSecretPair::new([1; 32], [2; 32]), "hs-1");
        let b = derive_session_key(&kdf, SharedSecretPair::new([1; 32], [2; 32]), "hs-1");
        assert_eq!(a, b);
    }

    #[test]
    fn concatenation_order_is_significant() {
        let kdf = HkdfSha256;
        let forward = derive_session_key(&kdf, SharedSecretPair::new([1; 32], [2; 32]), "hs-1");
        let swapped = derive_session_key(&kdf, SharedSecretPair::new([2; 32], [1; 32]), "hs-1");
        assert_ne!(forward, swapped);
    }

    #[test]
    fn either_secret_changes_the_key() {
        let kdf = HkdfSha256;
        let base = derive_session_key(&kdf, SharedSecretPair::new([1; 32], [2; 32]), "hs-1");
        let ecdh_diff = derive_session_key(&kdf, SharedSecretPair::new([9; 32], [2; 32]), "hs-1");
        let kem_diff = derive_session_key(&kdf, SharedSecretPair::new([1; 32], [9; 32]), "hs-1");
        assert_ne!(base, ecdh_diff);
        assert_ne!(base, kem_diff);
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let kdf = HkdfSha256;
        let key = derive_session_key(&kdf, SharedSecretPair::new([42; 32], [42; 32]), "hs-1");
        let rendered = format!("{key:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("hs-1"));
    }
}
