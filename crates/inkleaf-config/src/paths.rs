//! On-disk layout under the Inkleaf home directory.
//!
//! ```text
//! ~/.inkleaf/
//!   config.json
//!   storage/local.json     persistent key/value scope
//!   logs/inkleaf.jsonl     structured log
//! ```

use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};

const HOME_DIR: &str = ".inkleaf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// `~/.inkleaf`.
    pub fn new() -> ConfigResult<Self> {
        dirs::home_dir()
            .map(|home| Self::with_base_dir(home.join(HOME_DIR)))
            .ok_or(ConfigError::NoHome)
    }

    pub fn with_base_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.root.join("storage")
    }

    /// Backing file of the persistent storage scope.
    pub fn persistent_store_file(&self) -> PathBuf {
        self.storage_dir().join("local.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("inkleaf.jsonl")
    }

    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        for dir in [self.storage_dir(), self.logs_dir()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_is_rooted_at_base_dir() {
        let paths = Paths::with_base_dir("/srv/inkleaf");
        assert_eq!(paths.config_file(), Path::new("/srv/inkleaf/config.json"));
        assert_eq!(
            paths.persistent_store_file(),
            Path::new("/srv/inkleaf/storage/local.json")
        );
        assert_eq!(paths.log_file(), Path::new("/srv/inkleaf/logs/inkleaf.jsonl"));
    }

    #[test]
    fn ensure_dirs_builds_missing_tree() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("a").join("b"));

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(paths.storage_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
        assert!(!paths.config_file().exists());
    }
}
