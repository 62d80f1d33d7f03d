//! Persistent CLI Configuration Loader
//!
//! Configuration is loaded from `~/.config/birr-fx/config.toml` on Linux,
//! `~/Library/Application Support/birr-fx/config.toml` on macOS
//! or `%APPDATA%\birr-fx\config.toml` on Windows.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// CLI Configuration structure loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    /// JSON file holding an `FxConfig` or a bare rate table array.
    pub rates_file: Option<PathBuf>,
    /// Source currency used when `convert` is given only an amount.
    pub default_from: Option<String>,
    /// Target currency used when `convert` is given no target.
    pub default_to: Option<String>,
    /// Enable debug logging by default.
    pub enable_logging: Option<bool>,
}

impl CliConfig {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("birr-fx"))
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Loads the default config file.
    /// Returns `CliConfig::default()` if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file found at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<CliConfig>(&content) {
                Ok(config) => {
                    debug!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CliConfig::default();
        assert!(config.rates_file.is_none());
        assert!(config.default_from.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = CliConfig {
            default_to: Some("EUR".to_string()),
            enable_logging: Some(true),
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("default-to"));
        assert!(toml_str.contains("EUR"));

        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_gives_default() {
        let config = CliConfig::load_from(Path::new("/no/such/birr-fx/config.toml"));
        assert_eq!(config, CliConfig::default());
    }
}
