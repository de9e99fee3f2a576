#![forbid(unsafe_code)]

//! Dilithium2 transcript signatures.
//!
//! The reference implementation stubbed its signature scheme (verification
//! always succeeded), which cannot bind a transcript. Real Dilithium2
//! detached signatures are used instead; the 2420-byte signature size and
//! the sign/verify interface shape are unchanged.

use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{Algorithm, KeyPair};
use crate::provider::SignatureScheme;

/// Dilithium2 detached-signature scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dilithium2Scheme;

impl SignatureScheme for Dilithium2Scheme {
    fn generate(&self) -> KeyPair {
        let (public, private) = dilithium2::keypair();
        KeyPair::new(Algorithm::Dilithium2, public.as_bytes().to_vec(), private.as_bytes().to_vec())
    }

    fn sign(&self, message: &[u8], signing_private: &[u8]) -> CryptoResult<Vec<u8>> {
        let key = dilithium2::SecretKey::from_bytes(signing_private)
            .map_err(|_| CryptoError::InvalidKeyEncoding("malformed dilithium2 signing key"))?;
        Ok(dilithium2::detached_sign(message, &key).as_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], verification_public: &[u8]) -> bool {
        let Ok(key) = dilithium2::PublicKey::from_bytes(verification_public) else {
            return false;
        };
        let Ok(sig) = dilithium2::DetachedSignature::from_bytes(signature) else {
            return false;
        };
        dilithium2::verify_detached_signature(&sig, message, &key).is_ok()
    }
}
