/// Application configuration: load, save and sanitize.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "undo-entry.json";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "UNDO_ENTRY_CONFIG";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Whether new entries track undo history.
    pub undo_enabled: bool,
    /// Max undo groups kept per entry (minimum 1).
    pub max_history_depth: usize,
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            undo_enabled: true,
            max_history_depth: 10_000,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `UNDO_ENTRY_CONFIG` environment variable
    /// 2. `undo-entry/undo-entry.json` in the platform config directory
    /// 3. `undo-entry.json` next to the executable
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        if let Some(dir) = dirs::config_dir() {
            return dir.join("undo-entry").join(CONFIG_FILE_NAME);
        }
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match Self::load(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {}: {e:#}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Reads and sanitizes the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.sanitize();
        Ok(config)
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.max_history_depth = self.max_history_depth.max(1);
        if self.log_filter.trim().is_empty() {
            self.log_filter = "info".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.undo_enabled);
        assert_eq!(config.max_history_depth, 10_000);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_sanitize_clamps_depth() {
        let mut config = AppConfig::default();
        config.max_history_depth = 0;
        config.sanitize();
        assert_eq!(config.max_history_depth, 1);
    }

    #[test]
    fn test_sanitize_preserves_valid_depth() {
        let mut config = AppConfig::default();
        config.max_history_depth = 250;
        config.sanitize();
        assert_eq!(config.max_history_depth, 250);
    }

    #[test]
    fn test_sanitize_resets_blank_log_filter() {
        let mut config = AppConfig::default();
        config.log_filter = "   ".to_string();
        config.sanitize();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let json = r#"{"undo_enabled": false}"#;
        let parsed: AppConfig = serde_json::from_str(json).unwrap();
        assert!(!parsed.undo_enabled);
        assert_eq!(parsed.max_history_depth, 10_000);
        assert_eq!(parsed.log_filter, "info");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"max_history_depth": 7, "current_theme": "Dark"}"#;
        let parsed: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.max_history_depth, 7);
    }

    #[test]
    fn test_config_path_from_env_var() {
        // Save and restore env var
        let original = std::env::var(CONFIG_ENV_VAR).ok();
        std::env::set_var(CONFIG_ENV_VAR, "/custom/undo.json");
        let path = AppConfig::config_path();
        assert_eq!(path, PathBuf::from("/custom/undo.json"));
        // Restore
        match original {
            Some(val) => std::env::set_var(CONFIG_ENV_VAR, val),
            None => std::env::remove_var(CONFIG_ENV_VAR),
        }
    }
}
