#![forbid(unsafe_code)]

//! Quill identity directory.
//!
//! A lookup service mapping a user identifier to its published public keys
//! and a stored credential hash. This is plain key-value bookkeeping: the
//! cryptographic substance lives in `quill-crypto`. Credentials are stored
//! as salted Argon2id hashes and verified with a slow comparison; the
//! plaintext password is never retained. Private key halves never reach
//! this crate at all — callers register only a [`PublicKeySet`].

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use parking_lot::RwLock;
use quill_crypto::PublicKeySet;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by directory operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// Peer identity unknown; a handshake cannot start.
    #[error("unknown user: {0}")]
    NotFound(String),

    #[error("user already registered: {0}")]
    UserExists(String),

    #[error("credential hashing failed")]
    CredentialHash,
}

struct UserRecord {
    credential_hash: String,
    keys: PublicKeySet,
}

/// In-memory identity directory, safe under concurrent registration.
#[derive(Default)]
pub struct KeyDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl KeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new identity with its published public keys. The
    /// password is hashed with a fresh salt before the lock is taken.
    pub fn register(&self, username: &str, password: &str, keys: PublicKeySet) -> Result<(), DirectoryError> {
        let salt = SaltString::generate(&mut OsRng);
        let credential_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| DirectoryError::CredentialHash)?
            .to_string();

        let mut users = self.users.write();
        if users.contains_key(username) {
            return Err(DirectoryError::UserExists(username.to_string()));
        }
        users.insert(username.to_string(), UserRecord { credential_hash, keys });
        info!(user = %username, "identity registered");
        Ok(())
    }

    /// Verify a credential. Unknown users and wrong passwords both report
    /// plain `false`; nothing about the stored credential is revealed.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let stored = {
            let users = self.users.read();
            match users.get(username) {
                Some(record) => record.credential_hash.clone(),
                None => {
                    warn!(user = %username, "authentication for unknown user");
                    return false;
                }
            }
        };

        let Ok(parsed) = PasswordHash::new(&stored) else {
            return false;
        };
        let ok = Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok();
        info!(user = %username, success = ok, "authentication attempt");
        ok
    }

    /// Fetch the published public keys for a user.
    pub fn get_public_keys(&self, username: &str) -> Result<PublicKeySet, DirectoryError> {
        self.users
            .read()
            .get(username)
            .map(|record| record.keys.clone())
            .ok_or_else(|| DirectoryError::NotFound(username.to_string()))
    }

    pub fn exists(&self, username: &str) -> bool {
        self.users.read().contains_key(username)
    }
}
