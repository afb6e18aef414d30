// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration persistence (save/load).

use crate::config::AppConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Manages configuration file persistence for one tool.
///
/// Each desktop utility keeps its own config file so a broken file only
/// takes down the tool that owns it.
pub struct ConfigManager {
    config_dir: PathBuf,
    tool: String,
}

impl ConfigManager {
    /// Create a config manager for the named tool, initializing the
    /// config directory.
    pub fn new(tool: &str) -> Result<Self, ConfigError> {
        let project_dirs =
            ProjectDirs::from("", "", "milotools").ok_or(ConfigError::NoConfigDir)?;
        let config_dir = project_dirs.config_dir().to_path_buf();
        fs::create_dir_all(&config_dir)?;

        Ok(Self {
            config_dir,
            tool: tool.to_string(),
        })
    }

    /// Test constructor with an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>, tool: &str) -> Self {
        Self {
            config_dir: dir.into(),
            tool: tool.to_string(),
        }
    }

    /// Path to this tool's config file.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(format!("{}.toml", self.tool))
    }

    /// Load the tool config, falling back to defaults when the file does
    /// not exist yet.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let path = self.config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Ok(AppConfig::from_toml(&content)?)
        } else {
            Ok(AppConfig::default())
        }
    }

    /// Save the tool config.
    pub fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;
        let content = config.to_toml()?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path(), "audiopanel");
        let config = manager.load_config().unwrap();
        assert_eq!(config.window.width, 500);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path(), "audiopanel");

        let mut config = AppConfig::default();
        config.window.width = 800;
        config.general.language = "es".to_string();
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.window.width, 800);
        assert_eq!(loaded.general.language, "es");
    }

    #[test]
    fn test_tools_do_not_share_files() {
        let dir = TempDir::new().unwrap();
        let audio = ConfigManager::with_dir(dir.path(), "audiopanel");
        let stats = ConfigManager::with_dir(dir.path(), "sysstats");
        assert_ne!(audio.config_path(), stats.config_path());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_dir(dir.path(), "audiopanel");
        fs::write(manager.config_path(), "not [valid toml").unwrap();
        assert!(matches!(
            manager.load_config(),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
