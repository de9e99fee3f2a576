#![forbid(unsafe_code)]

//! Common error type for Quill crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuillError {
    /// I/O related failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parsing failures.
    #[error("Config parse error: {0}")]
    ConfigParse(toml::de::Error),
}

/// Convenient alias for results throughout Quill crates.
pub type QuillResult<T> = Result<T, QuillError>;
