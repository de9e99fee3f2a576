#![forbid(unsafe_code)]

//! Quill shared foundation crate.
//!
//! This crate provides:
//! 1. Strongly-typed TOML configuration (see [`config`] module).
//! 2. Common error type shared by the Quill crates.
//! 3. Identifier and timestamp helpers for handshake/message records.
//! 4. Base64 wire-encoding adapters for binary fields crossing text
//!    transports (see [`wire`] module).
//! 5. Tracing initialization at the configured verbosity (see [`logging`]
//!    module).

pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod wire;

pub use config::QuillConfig;
pub use error::{QuillError, QuillResult};
