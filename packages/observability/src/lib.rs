//! Structured logging shared by the Inkleaf binaries.
//!
//! A binary calls [`init_with_config`] once, early in `main`; library crates
//! only emit through the `tracing` macros and never install a subscriber.
//!
//! With the default `file-sink` feature every event is appended as one JSON
//! object per line to `~/.inkleaf/logs/inkleaf.jsonl` (or
//! [`LogConfig::log_path`]). Several processes may share the file. Without the
//! feature, or when the file cannot be opened, events go to stderr.
//!
//! Values stored under credential-like keys (`access_token`, `code`,
//! `password`, ...) and values shaped like bearer tokens or JWTs are written
//! as `[REDACTED]`.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "inkleaf-cli".into(),
//!     default_level: "debug".into(),
//!     ..Default::default()
//! });
//! tracing::info!(phase = "anonymous", "session settled");
//! ```

mod jsonl;
mod redact;
#[cfg(feature = "file-sink")]
mod sink;

pub use jsonl::{JsonlLayer, LogRecord};
pub use redact::{is_sensitive_key, sanitize_fields, REDACTED};
#[cfg(feature = "file-sink")]
pub use sink::{default_log_path, AppendFile};

pub use tracing::{debug, error, info, instrument, trace, warn, Level};

use std::path::PathBuf;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Which structured fields survive into the JSONL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservabilityMode {
    /// Every field, after redaction.
    #[default]
    DevVerbose,
    /// Correlation fields only (`operation`, `phase`, `user_id`, ...).
    MetadataOnly,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written as `service` on every line.
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_level: String,
    /// Overrides [`default_log_path`].
    pub log_path: Option<PathBuf>,
    /// Mirror warnings and errors to stderr in compact form.
    pub also_stderr: bool,
    pub mode: ObservabilityMode,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            mode: ObservabilityMode::default(),
        }
    }
}

impl LogConfig {
    /// `RUST_LOG` when set and valid, else [`LogConfig::default_level`].
    pub(crate) fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Shorthand for [`init_with_config`] with defaults and the given service.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..LogConfig::default()
    });
}

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "file-sink")]
    {
        if sink::install(&config) {
            return;
        }
    }
    init_stderr_only(&config);
}

/// Compact stderr output, honouring the same filter as the file sink.
pub fn init_stderr_only(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .finish()
        .try_init();
}
