#![forbid(unsafe_code)]

//! Identifier and timestamp helpers.
//!
//! Handshake and message records each carry a globally unique id (UUIDv4)
//! and a creation timestamp. Timestamps exist for observability only and
//! must never drive protocol decisions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a fresh globally unique identifier for a handshake or message.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time, UTC.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
