//! `config.json` and its environment overrides.
//!
//! Precedence, lowest first: compiled-in defaults, the file, `INKLEAF_*`
//! variables. Missing keys in the file take their defaults.

use crate::{ConfigError, ConfigResult, Paths};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Build-time `INKLEAF_SUPABASE_URL` wins over the placeholder project.
pub const DEFAULT_SUPABASE_URL: &str = match option_env!("INKLEAF_SUPABASE_URL") {
    Some(url) => url,
    None => "https://inkleaf.supabase.co",
};

/// Public anon key; build-time `INKLEAF_SUPABASE_ANON_KEY` wins.
pub const DEFAULT_SUPABASE_ANON_KEY: &str = match option_env!("INKLEAF_SUPABASE_ANON_KEY") {
    Some(key) => key,
    None => "public-anon-key",
};

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 8_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub url: String,
    pub anon_key: String,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SUPABASE_URL.into(),
            anon_key: DEFAULT_SUPABASE_ANON_KEY.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Deadline for each auth or profile call.
    pub call_timeout_ms: u64,
    /// Redirect target embedded in the sign-in email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_redirect_url: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_AUTH_TIMEOUT_MS,
            otp_redirect_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub platform: PlatformSettings,
    pub session: SessionSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.into(),
            platform: PlatformSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

impl Config {
    /// Defaults plus process environment, ignoring any file.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env(env_lookup);
        config
    }

    /// Read `paths.config_file()` if present, apply the environment and
    /// validate the result.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.config_file();
        let mut config = if file.is_file() {
            Self::read(&file)?
        } else {
            Self::default()
        };
        config.apply_env(env_lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn read(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        paths.ensure_dirs()?;
        fs::write(paths.config_file(), serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("INKLEAF_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(url) = lookup("INKLEAF_SUPABASE_URL") {
            self.platform.url = url;
        }
        if let Some(key) = lookup("INKLEAF_SUPABASE_ANON_KEY") {
            self.platform.anon_key = key;
        }
        if let Some(ms) = lookup("INKLEAF_AUTH_TIMEOUT_MS").and_then(|raw| raw.parse().ok()) {
            self.session.call_timeout_ms = ms;
        }
        if let Some(url) = lookup("INKLEAF_OTP_REDIRECT_URL") {
            self.session.otp_redirect_url = Some(url);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.supabase_url()?;
        if self.session.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "session.call_timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(redirect) = &self.session.otp_redirect_url {
            Url::parse(redirect)?;
        }
        Ok(())
    }

    pub fn supabase_url(&self) -> ConfigResult<Url> {
        Ok(Url::parse(&self.platform.url)?)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.session.call_timeout_ms)
    }

    /// First DNS label of the platform host, e.g. `abcd` for
    /// `https://abcd.supabase.co`.
    pub fn project_ref(&self) -> ConfigResult<String> {
        let url = self.supabase_url()?;
        match url.host_str().and_then(|host| host.split('.').next()) {
            Some(label) if !label.is_empty() => Ok(label.to_string()),
            _ => Err(ConfigError::Invalid {
                key: "platform.url",
                reason: format!("{} has no host", self.platform.url),
            }),
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        fs::write(&file, r#"{ "session": { "call_timeout_ms": 2500 } }"#).unwrap();

        let config = Config::read(&file).unwrap();
        assert_eq!(config.auth_timeout(), Duration::from_millis(2500));
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.platform, PlatformSettings::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path());
        let mut config = Config::default();
        config.session.otp_redirect_url = Some("https://inkleaf.studio/login".into());
        config.save(&paths).unwrap();

        let mut loaded = Config::read(&paths.config_file()).unwrap();
        loaded.validate().unwrap();
        assert_eq!(loaded, config);

        loaded.session.otp_redirect_url = None;
        let raw = serde_json::to_string(&loaded).unwrap();
        assert!(!raw.contains("otp_redirect_url"));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path());
        let config = Config::load(&paths).unwrap();
        assert_eq!(config.session.call_timeout_ms, DEFAULT_AUTH_TIMEOUT_MS);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("INKLEAF_LOG_LEVEL", "debug"),
            ("INKLEAF_SUPABASE_URL", "https://staging.supabase.co"),
            ("INKLEAF_AUTH_TIMEOUT_MS", "1200"),
            ("INKLEAF_OTP_REDIRECT_URL", "https://inkleaf.studio/auth"),
        ]));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.project_ref().unwrap(), "staging");
        assert_eq!(config.auth_timeout(), Duration::from_millis(1200));
        assert_eq!(
            config.session.otp_redirect_url.as_deref(),
            Some("https://inkleaf.studio/auth")
        );
        assert_eq!(config.platform.anon_key, DEFAULT_SUPABASE_ANON_KEY);
    }

    #[test]
    fn unparseable_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("INKLEAF_AUTH_TIMEOUT_MS", "soon")]));
        assert_eq!(config.session.call_timeout_ms, DEFAULT_AUTH_TIMEOUT_MS);
    }

    #[test]
    fn validation() {
        let mut config = Config::default();
        config.validate().unwrap();

        config.session.call_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "session.call_timeout_ms", .. })
        ));

        config.session.call_timeout_ms = 10;
        config.platform.url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
        assert!(config.project_ref().is_err());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("config.json");
        fs::write(&file, "{ log_level: ").unwrap();

        let err = Config::read(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }
}
