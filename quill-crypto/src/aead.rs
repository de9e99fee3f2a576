#![forbid(unsafe_code)]

//! ChaCha20-Poly1305 AEAD primitive.
//!
//! Nonce discipline lives one layer up in [`crate::cipher`]: encryption
//! there always generates a fresh random 96-bit nonce, so this module only
//! enforces lengths and maps every decrypt failure to a single
//! indistinguishable error.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};

use crate::error::{CryptoError, CryptoResult};
use crate::provider::MessageAead;

/// ChaCha20-Poly1305 nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 with a 96-bit nonce and 128-bit tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChaChaPolyAead;

impl MessageAead for ChaChaPolyAead {
    fn nonce_len(&self) -> usize {
        NONCE_LEN
    }

    fn encrypt(&self, key: &[u8; 32], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::EncryptionFailure);
        }
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .encrypt(Nonce::from_slice(nonce), Payload { msg: plaintext, aad })
            .map_err(|_| CryptoError::EncryptionFailure)
    }

    fn decrypt(&self, key: &[u8; 32], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        // Uniform failure: length problems and tag mismatches are
        // indistinguishable to the caller.
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::AuthenticationFailure);
        }
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}
