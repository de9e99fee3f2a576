#![forbid(unsafe_code)]

//! Quill cryptography engine.
//!
//! This crate provides:
//! 1. The primitive provider: five independently swappable primitives
//!    (key agreement, KEM, signature, KDF, AEAD) assembled into an
//!    explicitly constructed [`CryptoProvider`] (see [`provider`]).
//! 2. Identity key-material generation (see [`keys`]).
//! 3. The hybrid handshake engine with explicit tagged-state machines
//!    (see [`handshake`]).
//! 4. Session key derivation combining both shared secrets (see [`session`]).
//! 5. AEAD message protection with per-message random nonces (see [`cipher`]).

pub mod aead;
pub mod cipher;
pub mod ecdh;
pub mod error;
pub mod handshake;
pub mod kdf;
pub mod kem;
pub mod keys;
pub mod provider;
pub mod session;
pub mod sig;

pub use cipher::{open, seal, EncryptedMessage};
pub use error::{CryptoError, CryptoResult};
pub use handshake::{accept, initiate, HandshakeError, HandshakeMessage};
pub use keys::{generate_identity, Algorithm, IdentityKeys, KeyPair, PublicKeySet};
pub use provider::CryptoProvider;
pub use session::{derive_session_key, SessionKey, SharedSecretPair};
