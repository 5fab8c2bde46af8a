//! Configuration loading.
//!
//! Settings come from `<data-dir>/config.toml`; command-line flags override
//! the file, and missing keys fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::fields::{CompletionModel, DateFormat};
use crate::store::StoreConfig;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";
/// Environment variable that overrides the default data directory.
pub const DATA_DIR_ENV: &str = "TUGAS_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub completion_model: CompletionModel,
    pub date_format: DateFormat,
    /// Length of the slide-and-fade exit transition; 0 disables it.
    pub transition_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion_model: CompletionModel::SeparateList,
            date_format: DateFormat::Numeric,
            transition_ms: 300,
        }
    }
}

impl Config {
    /// Load `config.toml` from `data_dir`, or defaults if it does not exist.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        completion_model: Option<CompletionModel>,
        date_format: Option<DateFormat>,
    ) -> Self {
        if let Some(model) = completion_model {
            self.completion_model = model;
        }
        if let Some(format) = date_format {
            self.date_format = format;
        }
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            completion_model: self.completion_model,
            date_format: self.date_format,
        }
    }
}

/// Resolve the data directory: explicit flag, then `TUGAS_DIR`, then `~/.tugasku`.
pub fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tugasku"))
        .ok_or(ConfigError::NoDataDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg = Config::from_toml("date_format = \"long\"\n").unwrap();
        assert_eq!(cfg.date_format, DateFormat::Long);
        assert_eq!(cfg.completion_model, CompletionModel::SeparateList);
        assert_eq!(cfg.transition_ms, 300);
    }

    #[test]
    fn test_full_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "completion_model = \"flag\"\ndate_format = \"long\"\ntransition_ms = 0\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.completion_model, CompletionModel::Flag);
        assert_eq!(cfg.transition_ms, 0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "completion_model = \"sometimes\"").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_flags_override_file() {
        let cfg = Config::default().with_overrides(Some(CompletionModel::Flag), None);
        assert_eq!(cfg.completion_model, CompletionModel::Flag);
        assert_eq!(cfg.date_format, DateFormat::Numeric);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/tugas-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/tugas-test"));
    }
}
