#![forbid(unsafe_code)]

//! X25519 key agreement.

use rand_core::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{Algorithm, KeyPair};
use crate::provider::KeyAgreement;

const KEY_LEN: usize = 32;

/// X25519 over Curve25519, the classical half of the hybrid exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct X25519KeyAgreement;

impl KeyAgreement for X25519KeyAgreement {
    fn generate(&self) -> KeyPair {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        KeyPair::new(Algorithm::X25519, public.as_bytes().to_vec(), secret.to_bytes().to_vec())
    }

    fn agree(&self, own_private: &[u8], peer_public: &[u8]) -> CryptoResult<[u8; 32]> {
        let private: [u8; KEY_LEN] = own_private
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyEncoding("x25519 private key must be 32 bytes"))?;
        let public: [u8; KEY_LEN] = peer_public
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyEncoding("x25519 public key must be 32 bytes"))?;

        let shared = StaticSecret::from(private).diffie_hellman(&PublicKey::from(public));
        // Low-order peer points collapse the shared secret to zero; reject
        // them as malformed rather than proceeding with a known value.
        if !shared.was_contributory() {
            return Err(CryptoError::InvalidKeyEncoding("x25519 public key is a low-order point"));
        }
        Ok(shared.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn agreement_is_symmetric() {
        let x = X25519KeyAgreement;
        let a = x.generate();
        let b = x.generate();
        let ab = x.agree(a.private(), b.public()).unwrap();
        let ba = x.agree(b.private(), a.public()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn rfc7748_vector_matches() {
        let x = X25519KeyAgreement;
        let alice_priv = hex!("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let bob_pub = hex!("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f");
        let shared = x.agree(&alice_priv, &bob_pub).unwrap();
        let expected = hex!("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");
        assert_eq!(shared, expected);
    }

    #[test]
    fn wrong_length_keys_are_rejected() {
        let x = X25519KeyAgreement;
        let pair = x.generate();
        assert_eq!(
            x.agree(&[0u8; 31], pair.public()).unwrap_err(),
            CryptoError::InvalidKeyEncoding("x25519 private key must be 32 bytes")
        );
        assert!(x.agree(pair.private(), &[0u8; 64]).is_err());
    }

    #[test]
    fn low_order_point_is_rejected() {
        let x = X25519KeyAgreement;
        let pair = x.generate();
        // The identity point is the canonical low-order input.
        let err = x.agree(pair.private(), &[0u8; 32]).unwrap_err();
        assert_eq!(err, CryptoError::InvalidKeyEncoding("x25519 public key is a low-order point"));
    }
}
