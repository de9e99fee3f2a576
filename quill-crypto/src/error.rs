#![forbid(unsafe_code)]

//! Primitive-level error type.
//!
//! Every cryptographic failure is reported to the immediate caller as a
//! typed result. Display strings never include key or secret material, and
//! [`CryptoError::AuthenticationFailure`] deliberately carries no detail:
//! the caller must not be able to distinguish a wrong key from a tampered
//! ciphertext.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Malformed key bytes (wrong length or not on the expected domain).
    /// Fatal to the single operation, never to the process.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(&'static str),

    /// Transcript signature did not verify; the handshake is rejected and
    /// no session key is produced.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// AEAD authentication failed on decrypt: tag mismatch, truncated
    /// input or wrong key. The message is discarded with no partial output.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// AEAD encryption failed (plaintext exceeds the cipher's limits).
    #[error("encryption failed")]
    EncryptionFailure,
}

/// Convenient alias for primitive operation results.
pub type CryptoResult<T> = Result<T, CryptoError>;
