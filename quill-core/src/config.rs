#![forbid(unsafe_code)]

//! Quill configuration handling. Parses a TOML file into a strongly-typed
//! structure with sensible defaults so embedders can run without any file at
//! all. All values are plain data; nothing here touches key material.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::{QuillError, QuillResult};

/// Primary configuration structure shared across Quill components.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Logging verbosity (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,

    /// Maximum number of queued envelopes per mailbox recipient.
    #[serde(default = "default_max_mailbox_depth")]
    pub max_mailbox_depth: usize,

    /// Idle lifetime of a derived session key, in seconds. Enforced by the
    /// embedding application; sessions are re-keyed by a fresh handshake.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            max_mailbox_depth: default_max_mailbox_depth(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_max_mailbox_depth() -> usize {
    1024
}

fn default_session_ttl_secs() -> u64 {
    // 30 minutes, matching the session timeout used by reference clients.
    30 * 60
}

impl QuillConfig {
    /// Load a configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QuillResult<Self> {
        let data = fs::read_to_string(&path).map_err(QuillError::from)?;
        let cfg = toml::from_str::<QuillConfig>(&data).map_err(QuillError::ConfigParse)?;
        Ok(cfg)
    }

    /// Alias for [`Self::from_file`].
    pub fn load<P: AsRef<Path>>(path: P) -> QuillResult<Self> {
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = QuillConfig::default();
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
        assert_eq!(cfg.max_mailbox_depth, 1024);
        assert_eq!(cfg.session_ttl_secs, 1800);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: QuillConfig = toml::from_str("max_mailbox_depth = 16").unwrap();
        assert_eq!(cfg.max_mailbox_depth, 16);
        assert_eq!(cfg.session_ttl_secs, 1800);
    }

    #[test]
    fn unknown_path_is_io_error() {
        let err = QuillConfig::from_file("/nonexistent/quill.toml").unwrap_err();
        assert!(matches!(err, QuillError::Io(_)));
    }
}
