#![forbid(unsafe_code)]

//! Primitive provider.
//!
//! The five cryptographic primitives Quill composes — key agreement, KEM,
//! signature, KDF and AEAD — sit behind small traits so each can be swapped
//! independently. A [`CryptoProvider`] is constructed explicitly and passed
//! to the handshake engine and message cipher; there is no process-wide
//! registration.
//!
//! All operations are synchronous and stateless with respect to each other;
//! randomness is drawn from the OS where a primitive requires it.

use crate::aead::ChaChaPolyAead;
use crate::ecdh::X25519KeyAgreement;
use crate::error::CryptoResult;
use crate::kdf::hkdf_extract_expand;
use crate::kem::SimulatedKem;
use crate::keys::KeyPair;
use crate::sig::Dilithium2Scheme;

/// Classical key agreement (ECDH).
pub trait KeyAgreement: Send + Sync {
    /// Generate a fresh key pair.
    fn generate(&self) -> KeyPair;
    /// Compute the shared secret from our private key and the peer's
    /// public key. Fails with `InvalidKeyEncoding` on malformed keys.
    fn agree(&self, own_private: &[u8], peer_public: &[u8]) -> CryptoResult<[u8; 32]>;
}

/// Key-encapsulation mechanism.
pub trait Kem: Send + Sync {
    /// Generate a fresh key pair.
    fn generate(&self) -> KeyPair;
    /// Encapsulate to the peer's public key, returning the shared secret
    /// and the ciphertext to transmit.
    fn encapsulate(&self, peer_public: &[u8]) -> CryptoResult<([u8; 32], Vec<u8>)>;
    /// Recover the shared secret from a received ciphertext and the local
    /// KEM context.
    fn decapsulate(&self, own_context: &[u8], ciphertext: &[u8]) -> CryptoResult<[u8; 32]>;
}

/// Digital signature scheme.
pub trait SignatureScheme: Send + Sync {
    /// Generate a fresh signing key pair.
    fn generate(&self) -> KeyPair;
    /// Sign a message with the private signing key.
    fn sign(&self, message: &[u8], signing_private: &[u8]) -> CryptoResult<Vec<u8>>;
    /// Verify a signature. Failures are reported as `false`, never as a
    /// process error; malformed keys or signatures also verify as `false`.
    fn verify(&self, message: &[u8], signature: &[u8], verification_public: &[u8]) -> bool;
}

/// Key-derivation function (extract-and-expand).
pub trait Kdf: Send + Sync {
    /// Derive `out_len` bytes from the input keying material. Deterministic
    /// for identical inputs.
    fn derive(&self, ikm: &[u8], salt: &[u8], info: &[u8], out_len: usize) -> Vec<u8>;
}

/// Authenticated encryption with associated data.
pub trait MessageAead: Send + Sync {
    /// Required nonce length in bytes.
    fn nonce_len(&self) -> usize;
    /// Encrypt, returning `ciphertext || tag`.
    fn encrypt(&self, key: &[u8; 32], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;
    /// Decrypt `ciphertext || tag`. Any failure — tag mismatch, truncated
    /// input, wrong key, bad nonce — yields `AuthenticationFailure` with no
    /// further detail and no partial output.
    fn decrypt(&self, key: &[u8; 32], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// HKDF-SHA256 as the provider KDF.
#[derive(Debug, Default, Clone, Copy)]
pub struct HkdfSha256;

impl Kdf for HkdfSha256 {
    fn derive(&self, ikm: &[u8], salt: &[u8], info: &[u8], out_len: usize) -> Vec<u8> {
        hkdf_extract_expand(ikm, salt, info, out_len)
    }
}

/// Explicitly constructed bundle of the five primitives.
pub struct CryptoProvider {
    ecdh: Box<dyn KeyAgreement>,
    kem: Box<dyn Kem>,
    signature: Box<dyn SignatureScheme>,
    kdf: Box<dyn Kdf>,
    aead: Box<dyn MessageAead>,
}

impl CryptoProvider {
    /// Assemble a provider from explicit primitive implementations.
    pub fn new(
        ecdh: Box<dyn KeyAgreement>,
        kem: Box<dyn Kem>,
        signature: Box<dyn SignatureScheme>,
        kdf: Box<dyn Kdf>,
        aead: Box<dyn MessageAead>,
    ) -> Self {
        Self { ecdh, kem, signature, kdf, aead }
    }

    /// The default Quill stack: X25519, simulated KEM, Dilithium2,
    /// HKDF-SHA256 and ChaCha20-Poly1305.
    pub fn default_stack() -> Self {
        Self::new(
            Box::new(X25519KeyAgreement),
            Box::new(SimulatedKem),
            Box::new(Dilithium2Scheme),
            Box::new(HkdfSha256),
            Box::new(ChaChaPolyAead),
        )
    }

    pub fn ecdh(&self) -> &dyn KeyAgreement {
        self.ecdh.as_ref()
    }

    pub fn kem(&self) -> &dyn Kem {
        self.kem.as_ref()
    }

    pub fn signature(&self) -> &dyn SignatureScheme {
        self.signature.as_ref()
    }

    pub fn kdf(&self) -> &dyn Kdf {
        self.kdf.as_ref()
    }

    pub fn aead(&self) -> &dyn MessageAead {
        self.aead.as_ref()
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::default_stack()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stack_exposes_all_primitives() {
        let provider = CryptoProvider::default_stack();
        assert_eq!(provider.aead().nonce_len(), 12);
        let okm = provider.kdf().derive(b"ikm", b"salt", b"info", 32);
        assert_eq!(okm.len(), 32);
    }
}
