#![forbid(unsafe_code)]

//! Hybrid handshake engine.
//!
//! A handshake is a single message from initiator to responder carrying an
//! ephemeral X25519 public key, a KEM ciphertext, and a Dilithium2
//! signature over the canonical transcript. Both parties then derive the
//! same session key from the two independent shared secrets — the session
//! stays confidential if either agreement alone is broken.
//!
//! Signing the transcript (not just the ciphertext) binds sender and
//! recipient identities to the specific ephemeral material, so a captured
//! handshake cannot be replayed to a different recipient or paired with a
//! different ephemeral key.
//!
//! Progress is modeled as explicit tagged states, one independent machine
//! per handshake; illegal transitions (e.g. deriving a key before
//! verification) are rejected with [`HandshakeError::InvalidState`]. There
//! is no mid-handshake retry: a machine either reaches its terminal state
//! or fails at a specific step and is discarded, partial state included.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CryptoError;
use crate::keys::{IdentityKeys, KeyPair, PublicKeySet};
use crate::provider::CryptoProvider;
use crate::session::{derive_session_key, SessionKey, SharedSecretPair};

/// The single handshake message, immutable once created. Produced once per
/// attempt by the initiator and consumed exactly once by the responder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeMessage {
    pub sender: String,
    pub recipient: String,
    #[serde(with = "quill_core::wire::b64")]
    pub ephemeral_public: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub kem_ciphertext: Vec<u8>,
    #[serde(with = "quill_core::wire::b64")]
    pub signature: Vec<u8>,
    /// Observability only; never used for protocol decisions.
    pub timestamp: DateTime<Utc>,
    pub handshake_id: String,
}

/// Errors that can occur while driving a handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("invalid handshake state: expected {expected}, got {actual}")]
    InvalidState { expected: &'static str, actual: &'static str },

    /// An identifier exceeds the 16-bit length prefix of the canonical
    /// transcript encoding.
    #[error("identifier too long for canonical transcript")]
    IdentifierTooLong,

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Initiator progress. `Sent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorState {
    Idle,
    EphemeralGenerated,
    SecretsComputed,
    TranscriptSigned,
    Sent,
    Failed,
}

/// Responder progress. `Derived` and `Failed` are terminal. Signature
/// verification gates secret computation: a message that fails to verify
/// never reaches the ECDH or KEM primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    Idle,
    Received,
    SignatureVerified,
    SecretsComputed,
    Derived,
    Failed,
}

impl InitiatorState {
    fn name(self) -> &'static str {
        match self {
            InitiatorState::Idle => "Idle",
            InitiatorState::EphemeralGenerated => "EphemeralGenerated",
            InitiatorState::SecretsComputed => "SecretsComputed",
            InitiatorState::TranscriptSigned => "TranscriptSigned",
            InitiatorState::Sent => "Sent",
            InitiatorState::Failed => "Failed",
        }
    }
}

impl ResponderState {
    fn name(self) -> &'static str {
        match self {
            ResponderState::Idle => "Idle",
            ResponderState::Received => "Received",
            ResponderState::SignatureVerified => "SignatureVerified",
            ResponderState::SecretsComputed => "SecretsComputed",
            ResponderState::Derived => "Derived",
            ResponderState::Failed => "Failed",
        }
    }
}

impl fmt::Display for InitiatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ResponderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical transcript: length-prefixed sender and recipient ids followed
/// by the ephemeral public key and the KEM ciphertext. The u16 prefixes
/// make the encoding unambiguous without delimiters; field order is fixed
/// and must not be changed by any implementation.
pub fn canonical_transcript(
    sender: &str,
    recipient: &str,
    ephemeral_public: &[u8],
    kem_ciphertext: &[u8],
) -> Result<Vec<u8>, HandshakeError> {
    let sender = sender.as_bytes();
    let recipient = recipient.as_bytes();
    if sender.len() > usize::from(u16::MAX) || recipient.len() > usize::from(u16::MAX) {
        return Err(HandshakeError::IdentifierTooLong);
    }

    let mut out = Vec::with_capacity(4 + sender.len() + recipient.len() + ephemeral_public.len() + kem_ciphertext.len());
    out.extend_from_slice(&(sender.len() as u16).to_be_bytes());
    out.extend_from_slice(sender);
    out.extend_from_slice(&(recipient.len() as u16).to_be_bytes());
    out.extend_from_slice(recipient);
    out.extend_from_slice(ephemeral_public);
    out.extend_from_slice(kem_ciphertext);
    Ok(out)
}

/// Initiator-side state machine.
pub struct InitiatorHandshake<'a> {
    provider: &'a CryptoProvider,
    state: InitiatorState,
    self_id: String,
    peer_id: String,
    handshake_id: String,
    ephemeral: Option<KeyPair>,
    kem_ciphertext: Option<Vec<u8>>,
    secrets: Option<SharedSecretPair>,
    signature: Option<Vec<u8>>,
}

impl<'a> InitiatorHandshake<'a> {
    pub fn new(provider: &'a CryptoProvider, self_id: &str, peer_id: &str) -> Self {
        Self {
            provider,
            state: InitiatorState::Idle,
            self_id: self_id.to_string(),
            peer_id: peer_id.to_string(),
            handshake_id: quill_core::ids::new_id(),
            ephemeral: None,
            kem_ciphertext: None,
            secrets: None,
            signature: None,
        }
    }

    pub fn state(&self) -> InitiatorState {
        self.state
    }

    fn guard(&self, expected: InitiatorState) -> Result<(), HandshakeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(HandshakeError::InvalidState { expected: expected.name(), actual: self.state.name() })
        }
    }

    /// Generate a fresh ephemeral X25519 key pair, never reused across
    /// handshakes.
    pub fn generate_ephemeral(&mut self) -> Result<(), HandshakeError> {
        self.guard(InitiatorState::Idle)?;
        self.ephemeral = Some(self.provider.ecdh().generate());
        self.state = InitiatorState::EphemeralGenerated;
        Ok(())
    }

    /// Compute the ECDH shared secret against the responder's published
    /// key and encapsulate a KEM secret to its KEM key.
    pub fn compute_secrets(&mut self, peer: &PublicKeySet) -> Result<(), HandshakeError> {
        self.guard(InitiatorState::EphemeralGenerated)?;
        let ephemeral = self.ephemeral.as_ref().ok_or(HandshakeError::InvalidState {
            expected: "EphemeralGenerated",
            actual: "Idle",
        })?;

        let result = self
            .provider
            .ecdh()
            .agree(ephemeral.private(), &peer.ecdh_public)
            .and_then(|ecdh_secret| {
                let (kem_secret, ciphertext) = self.provider.kem().encapsulate(&peer.kem_public)?;
                Ok((ecdh_secret, kem_secret, ciphertext))
            });

        match result {
            Ok((ecdh_secret, kem_secret, ciphertext)) => {
                self.secrets = Some(SharedSecretPair::new(ecdh_secret, kem_secret));
                self.kem_ciphertext = Some(ciphertext);
                self.state = InitiatorState::SecretsComputed;
                Ok(())
            }
            Err(e) => {
                self.state = InitiatorState::Failed;
                Err(e.into())
            }
        }
    }

    /// Sign the canonical transcript with the long-term signing key.
    pub fn sign_transcript(&mut self, signing_key: &KeyPair) -> Result<(), HandshakeError> {
        self.guard(InitiatorState::SecretsComputed)?;
        let (ephemeral, ciphertext) = match (self.ephemeral.as_ref(), self.kem_ciphertext.as_ref()) {
            (Some(e), Some(c)) => (e, c),
            _ => {
                return Err(HandshakeError::InvalidState {
                    expected: "SecretsComputed",
                    actual: self.state.name(),
                })
            }
        };

        let transcript = canonical_transcript(&self.self_id, &self.peer_id, ephemeral.public(), ciphertext)?;
        match self.provider.signature().sign(&transcript, signing_key.private()) {
            Ok(signature) => {
                self.signature = Some(signature);
                self.state = InitiatorState::TranscriptSigned;
                Ok(())
            }
            Err(e) => {
                self.state = InitiatorState::Failed;
                Err(e.into())
            }
        }
    }

    /// Emit the handshake message and independently derive the session
    /// key. Terminal: consumes the machine.
    pub fn finish(mut self) -> Result<(HandshakeMessage, SessionKey), HandshakeError> {
        self.guard(InitiatorState::TranscriptSigned)?;
        let (ephemeral, ciphertext, signature, secrets) = match (
            self.ephemeral.take(),
            self.kem_ciphertext.take(),
            self.signature.take(),
            self.secrets.take(),
        ) {
            (Some(e), Some(c), Some(s), Some(sec)) => (e, c, s, sec),
            _ => {
                return Err(HandshakeError::InvalidState {
                    expected: "TranscriptSigned",
                    actual: self.state.name(),
                })
            }
        };

        let message = HandshakeMessage {
            sender: self.self_id.clone(),
            recipient: self.peer_id.clone(),
            ephemeral_public: ephemeral.public().to_vec(),
            kem_ciphertext: ciphertext,
            signature,
            timestamp: quill_core::ids::now(),
            handshake_id: self.handshake_id.clone(),
        };
        let session_key = derive_session_key(self.provider.kdf(), secrets, &self.handshake_id);
        self.state = InitiatorState::Sent;

        info!(handshake_id = %message.handshake_id, peer = %self.peer_id, "handshake initiated");
        Ok((message, session_key))
    }
}

/// Responder-side state machine.
pub struct ResponderHandshake<'a> {
    provider: &'a CryptoProvider,
    state: ResponderState,
    message: Option<HandshakeMessage>,
    secrets: Option<SharedSecretPair>,
}

impl<'a> ResponderHandshake<'a> {
    pub fn new(provider: &'a CryptoProvider) -> Self {
        Self { provider, state: ResponderState::Idle, message: None, secrets: None }
    }

    pub fn state(&self) -> ResponderState {
        self.state
    }

    fn guard(&self, expected: ResponderState) -> Result<(), HandshakeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(HandshakeError::InvalidState { expected: expected.name(), actual: self.state.name() })
        }
    }

    /// Accept the received message into the machine. Consumes it: a
    /// handshake message is used at most once.
    pub fn receive(&mut self, message: HandshakeMessage) -> Result<(), HandshakeError> {
        self.guard(ResponderState::Idle)?;
        debug!(handshake_id = %message.handshake_id, sender = %message.sender, "handshake received");
        self.message = Some(message);
        self.state = ResponderState::Received;
        Ok(())
    }

    /// Verify the transcript signature against the sender's published
    /// verification key. This gate comes first: a message that fails to
    /// verify is rejected before the ECDH or KEM primitives ever run, so a
    /// forged handshake costs the responder no secret computation.
    pub fn verify_signature(&mut self, sender_verification_public: &[u8]) -> Result<(), HandshakeError> {
        self.guard(ResponderState::Received)?;
        let message = self.message.as_ref().ok_or(HandshakeError::InvalidState {
            expected: "Received",
            actual: "Idle",
        })?;

        let transcript = canonical_transcript(
            &message.sender,
            &message.recipient,
            &message.ephemeral_public,
            &message.kem_ciphertext,
        )?;

        if self.provider.signature().verify(&transcript, &message.signature, sender_verification_public) {
            self.state = ResponderState::SignatureVerified;
            Ok(())
        } else {
            warn!(handshake_id = %message.handshake_id, sender = %message.sender, "handshake signature rejected");
            self.state = ResponderState::Failed;
            Err(CryptoError::SignatureVerificationFailed.into())
        }
    }

    /// Compute both shared secrets from the verified fields and the local
    /// long-term key material.
    pub fn compute_secrets(&mut self, own: &IdentityKeys) -> Result<(), HandshakeError> {
        self.guard(ResponderState::SignatureVerified)?;
        let message = self.message.as_ref().ok_or(HandshakeError::InvalidState {
            expected: "SignatureVerified",
            actual: "Idle",
        })?;

        let result = self
            .provider
            .ecdh()
            .agree(own.ecdh.private(), &message.ephemeral_public)
            .and_then(|ecdh_secret| {
                let kem_secret = self.provider.kem().decapsulate(own.kem.public(), &message.kem_ciphertext)?;
                Ok(SharedSecretPair::new(ecdh_secret, kem_secret))
            });

        match result {
            Ok(secrets) => {
                self.secrets = Some(secrets);
                self.state = ResponderState::SecretsComputed;
                Ok(())
            }
            Err(e) => {
                self.state = ResponderState::Failed;
                Err(e.into())
            }
        }
    }

    /// Derive the session key. Terminal: consumes the machine.
    pub fn derive(mut self) -> Result<SessionKey, HandshakeError> {
        self.guard(ResponderState::SecretsComputed)?;
        let (message, secrets) = match (self.message.take(), self.secrets.take()) {
            (Some(m), Some(s)) => (m, s),
            _ => {
                return Err(HandshakeError::InvalidState {
                    expected: "SecretsComputed",
                    actual: self.state.name(),
                })
            }
        };

        let session_key = derive_session_key(self.provider.kdf(), secrets, &message.handshake_id);
        self.state = ResponderState::Derived;
        info!(handshake_id = %message.handshake_id, sender = %message.sender, "handshake derived");
        Ok(session_key)
    }
}

/// Run the full initiator side: fresh ephemeral, both secrets, transcript
/// signature, message emission and local key derivation.
pub fn initiate(
    provider: &CryptoProvider,
    self_id: &str,
    peer_id: &str,
    own: &IdentityKeys,
    peer: &PublicKeySet,
) -> Result<(HandshakeMessage, SessionKey), HandshakeError> {
    let mut machine = InitiatorHandshake::new(provider, self_id, peer_id);
    machine.generate_ephemeral()?;
    machine.compute_secrets(peer)?;
    machine.sign_transcript(&own.signature)?;
    machine.finish()
}

/// Run the full responder side on a received message. Verification failure
/// discards the handshake before any secret computation; no session key is
/// produced.
pub fn accept(
    provider: &CryptoProvider,
    message: HandshakeMessage,
    own: &IdentityKeys,
    peer: &PublicKeySet,
) -> Result<SessionKey, HandshakeError> {
    let mut machine = ResponderHandshake::new(provider);
    machine.receive(message)?;
    machine.verify_signature(&peer.signature_public)?;
    machine.compute_secrets(own)?;
    machine.derive()
}
