//! Settings, on-disk layout and logging bootstrap shared by the Inkleaf
//! tools.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, PlatformSettings, SessionSettings, DEFAULT_AUTH_TIMEOUT_MS, DEFAULT_LOG_LEVEL,
    DEFAULT_SUPABASE_ANON_KEY, DEFAULT_SUPABASE_URL,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
