#![forbid(unsafe_code)]

//! Quill mailbox relay.
//!
//! Store-and-forward delivery keyed by recipient identifier. The relay
//! only ever sees handshake messages and sealed ciphertexts — no key
//! material and no plaintext. Delivery order is insertion order per
//! recipient, and draining removes the queue: at-most-once delivery to
//! the polling client. Queues are bounded; transport-level retry on a
//! full mailbox belongs to the caller, never to the crypto core.

use parking_lot::Mutex;
use quill_core::QuillConfig;
use quill_crypto::{EncryptedMessage, HandshakeMessage};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, info};

/// Anything the relay can carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Envelope {
    Handshake(HandshakeMessage),
    Message(EncryptedMessage),
}

impl Envelope {
    pub fn sender(&self) -> &str {
        match self {
            Envelope::Handshake(m) => &m.sender,
            Envelope::Message(m) => &m.sender,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Envelope::Handshake(m) => &m.recipient,
            Envelope::Message(m) => &m.recipient,
        }
    }
}

/// Errors surfaced by relay operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("mailbox full for {recipient} (depth {depth})")]
    MailboxFull { recipient: String, depth: usize },
}

/// In-memory store-and-forward mailbox.
pub struct Mailbox {
    queues: Mutex<HashMap<String, VecDeque<Envelope>>>,
    max_depth: usize,
}

impl Mailbox {
    pub fn new(max_depth: usize) -> Self {
        Self { queues: Mutex::new(HashMap::new()), max_depth }
    }

    pub fn from_config(config: &QuillConfig) -> Self {
        Self::new(config.max_mailbox_depth)
    }

    /// Queue an envelope for its recipient, preserving insertion order.
    pub fn deliver(&self, envelope: Envelope) -> Result<(), RelayError> {
        let recipient = envelope.recipient().to_string();
        let mut queues = self.queues.lock();
        let queue = queues.entry(recipient.clone()).or_default();
        if queue.len() >= self.max_depth {
            return Err(RelayError::MailboxFull { recipient, depth: queue.len() });
        }
        debug!(recipient = %recipient, sender = %envelope.sender(), "envelope queued");
        queue.push_back(envelope);
        Ok(())
    }

    /// Remove and return everything queued for a user, oldest first.
    /// Drained envelopes are gone: at-most-once delivery.
    pub fn drain(&self, user: &str) -> Vec<Envelope> {
        let drained: Vec<Envelope> = self
            .queues
            .lock()
            .remove(user)
            .map(Vec::from)
            .unwrap_or_default();
        if !drained.is_empty() {
            info!(user = %user, count = drained.len(), "mailbox drained");
        }
        drained
    }

    /// Drop everything queued for one user.
    pub fn clear(&self, user: &str) {
        self.queues.lock().remove(user);
        info!(user = %user, "mailbox cleared");
    }

    /// Drop all queues (admin reset).
    pub fn clear_all(&self) {
        self.queues.lock().clear();
        info!("all mailboxes cleared");
    }

    /// Per-user queue depths, for admin monitoring.
    pub fn queue_stats(&self) -> HashMap<String, usize> {
        self.queues
            .lock()
            .iter()
            .map(|(user, queue)| (user.clone(), queue.len()))
            .collect()
    }
}
