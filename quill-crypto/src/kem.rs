#![forbid(unsafe_code)]

//! Simulated key-encapsulation mechanism.
//!
//! This KEM reproduces the reference protocol's demo construction: the
//! ciphertext is fresh randomness of Kyber-768 ciphertext size, and the
//! shared secret is derived deterministically as
//! `HKDF-SHA256(ciphertext || public_key)` under a fixed domain label.
//!
//! **Known weakening, preserved on purpose:** decapsulation is a function
//! of the ciphertext and the *public* key, so anyone holding both can
//! recompute the secret. The hybrid construction still protects traffic
//! through the X25519 half, but this primitive contributes no post-quantum
//! confidentiality. Swap in a true private-key KEM (e.g. ML-KEM) behind the
//! [`Kem`](crate::provider::Kem) trait for production use; the interface
//! shape is kept compatible so nothing else changes.

use rand_core::{OsRng, RngCore};

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{hkdf_extract_expand, KdfLabel};
use crate::keys::{Algorithm, KeyPair};
use crate::provider::Kem;

/// Kyber-768 ciphertext size, kept for wire compatibility.
pub const KEM_CIPHERTEXT_LEN: usize = 1088;
/// Simulated KEM key length.
pub const KEM_KEY_LEN: usize = 32;
/// Shared secret length.
pub const KEM_SECRET_LEN: usize = 32;

/// The simulated KEM primitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedKem;

fn derive_secret(ciphertext: &[u8], public_key: &[u8]) -> [u8; KEM_SECRET_LEN] {
    let mut ikm = Vec::with_capacity(ciphertext.len() + public_key.len());
    ikm.extend_from_slice(ciphertext);
    ikm.extend_from_slice(public_key);
    let okm = hkdf_extract_expand(&ikm, KdfLabel::KemSim.as_bytes(), b"", KEM_SECRET_LEN);
    let mut secret = [0u8; KEM_SECRET_LEN];
    secret.copy_from_slice(&okm);
    secret
}

impl Kem for SimulatedKem {
    fn generate(&self) -> KeyPair {
        let mut public = vec![0u8; KEM_KEY_LEN];
        let mut private = vec![0u8; KEM_KEY_LEN];
        OsRng.fill_bytes(&mut public);
        OsRng.fill_bytes(&mut private);
        KeyPair::new(Algorithm::SimulatedKem, public, private)
    }

    fn encapsulate(&self, peer_public: &[u8]) -> CryptoResult<([u8; 32], Vec<u8>)> {
        if peer_public.len() != KEM_KEY_LEN {
            return Err(CryptoError::InvalidKeyEncoding("kem public key must be 32 bytes"));
        }
        let mut ciphertext = vec![0u8; KEM_CIPHERTEXT_LEN];
        OsRng.fill_bytes(&mut ciphertext);
        let secret = derive_secret(&ciphertext, peer_public);
        Ok((secret, ciphertext))
    }

    fn decapsulate(&self, own_context: &[u8], ciphertext: &[u8]) -> CryptoResult<[u8; 32]> {
        if own_context.len() != KEM_KEY_LEN {
            return Err(CryptoError::InvalidKeyEncoding("kem public key must be 32 bytes"));
        }
        // A tampered ciphertext is not detectable here: it derives a
        // different secret, which surfaces downstream as an AEAD
        // authentication failure on first use.
        Ok(derive_secret(ciphertext, own_context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encapsulate_and_decapsulate_agree() {
        let kem = SimulatedKem;
        let pair = kem.generate();
        let (secret, ciphertext) = kem.encapsulate(pair.public()).unwrap();
        assert_eq!(ciphertext.len(), KEM_CIPHERTEXT_LEN);
        let recovered = kem.decapsulate(pair.public(), &ciphertext).unwrap();
        assert_eq!(secret, recovered);
    }

    #[test]
    fn tampered_ciphertext_derives_different_secret() {
        let kem = SimulatedKem;
        let pair = kem.generate();
        let (secret, mut ciphertext) = kem.encapsulate(pair.public()).unwrap();
        ciphertext[0] ^= 0x01;
        let other = kem.decapsulate(pair.public(), &ciphertext).unwrap();
        assert_ne!(secret, other);
    }

    #[test]
    fn encapsulations_are_independent() {
        let kem = SimulatedKem;
        let pair = kem.generate();
        let (s1, c1) = kem.encapsulate(pair.public()).unwrap();
        let (s2, c2) = kem.encapsulate(pair.public()).unwrap();
        assert_ne!(c1, c2);
        assert_ne!(s1, s2);
    }

    #[test]
    fn malformed_public_key_is_rejected() {
        let kem = SimulatedKem;
        assert!(kem.encapsulate(&[0u8; 16]).is_err());
        assert!(kem.decapsulate(&[0u8; 16], &[0u8; KEM_CIPHERTEXT_LEN]).is_err());
    }
}
