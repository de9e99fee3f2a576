#![forbid(unsafe_code)]

//! Logging initialization.
//!
//! Installs the global tracing subscriber at the configured verbosity.
//! Key and secret material never appears in events; call sites log ids
//! and operation names only.

use tracing_subscriber::EnvFilter;

use crate::QuillConfig;

/// Initialize tracing from the configured log level. Safe to call more
/// than once: only the first call installs a subscriber.
pub fn init(config: &QuillConfig) {
    let level = config.log_level.as_deref().unwrap_or("info");
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let cfg = QuillConfig::default();
        init(&cfg);
        init(&cfg);
        init(&QuillConfig { log_level: Some("debug".to_string()), ..QuillConfig::default() });
    }
}
