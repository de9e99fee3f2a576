#![forbid(unsafe_code)]

//! Key material management.
//!
//! One identity owns three key pairs (ECDH, KEM, signature). The private
//! halves live in zeroize-on-drop containers and never leave the owning
//! process: they are excluded from serialization and from `Debug` output.
//! Only the [`PublicKeySet`] crosses the process boundary, via the identity
//! directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::provider::CryptoProvider;

/// Algorithm tag identifying which primitive a key pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    X25519,
    SimulatedKem,
    Dilithium2,
}

/// A primitive key pair. The private half zeroizes on drop.
pub struct KeyPair {
    algorithm: Algorithm,
    public: Vec<u8>,
    private: Zeroizing<Vec<u8>>,
}

impl KeyPair {
    pub fn new(algorithm: Algorithm, public: Vec<u8>, private: Vec<u8>) -> Self {
        Self { algorithm, public, private: Zeroizing::new(private) }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn public(&self) -> &[u8] {
        &self.public
    }

    /// Private key bytes, for use by the owning process only. Never hand
    /// these to the mailbox or any serializer.
    pub fn private(&self) -> &[u8] {
        &self.private
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("public_len", &self.public.len())
            .field("private", &"<redacted>")
            .finish()
    }
}

/// The three public halves published for one identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeySet {
    #[serde(with = "quill_core::wire::b64")]
    pub ecdh_public: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub kem_public: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub signature_public: Vec<u8>,
}

/// Full key material for one identity.
#[derive(Debug)]
pub struct IdentityKeys {
    pub ecdh: KeyPair,
    pub kem: KeyPair,
    pub signature: KeyPair,
}

impl IdentityKeys {
    /// The public halves, suitable for publication.
    pub fn public_set(&self) -> PublicKeySet {
        PublicKeySet {
            ecdh_public: self.ecdh.public().to_vec(),
            kem_public: self.kem.public().to_vec(),
            signature_public: self.signature.public().to_vec(),
        }
    }
}

/// Generate fresh, independently random key pairs for a new identity.
/// Called once per identity at registration time.
pub fn generate_identity(provider: &CryptoProvider) -> IdentityKeys {
    IdentityKeys {
        ecdh: provider.ecdh().generate(),
        kem: provider.kem().generate(),
        signature: provider.signature().generate(),
    }
}
