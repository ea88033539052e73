//! Logging bootstrap for Inkleaf binaries.

use crate::Paths;
use observability::{LogConfig, ObservabilityMode};
use tracing::Level;

const SERVICE_NAME: &str = "inkleaf-cli";

/// Send logs to `paths.log_file()` at `level` (or `RUST_LOG`), echoing
/// warnings to stderr. `INKLEAF_OBS_MODE=metadata` strips free-form fields.
pub fn init_logging(paths: &Paths, level: &str) {
    let mode = std::env::var("INKLEAF_OBS_MODE")
        .map(|raw| observability_mode(&raw))
        .unwrap_or_default();

    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: parse_level(level).as_str().to_ascii_lowercase(),
        log_path: Some(paths.log_file()),
        also_stderr: true,
        mode,
    });
}

fn observability_mode(raw: &str) -> ObservabilityMode {
    if raw.trim().eq_ignore_ascii_case("metadata") {
        ObservabilityMode::MetadataOnly
    } else {
        ObservabilityMode::DevVerbose
    }
}

/// Lenient level parsing; anything unrecognised is `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Level::WARN,
        other => other.parse().unwrap_or(Level::INFO),
    }
}
