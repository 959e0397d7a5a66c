//! Configuration file support for episub.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file: the server connection and the table
//! preferences (language-profile filtering).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// User configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the subtitle manager server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// API key sent with every request.
    #[serde(default)]
    pub api_key: String,

    /// Show only subtitles whose language is in the series profile.
    #[serde(default)]
    pub only_desired: bool,

    /// Default series to open when none is given on the command line.
    #[serde(default)]
    pub series_id: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_server_url() -> String {
    "http://localhost:6767".to_string()
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            server_url: default_server_url(),
            api_key: String::new(),
            only_desired: false,
            series_id: None,
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/episub/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> std::result::Result<PathBuf, io::Error> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("episub");

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            let config = Self::new();
            config.save()?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_has_defaults() {
        let config = Config::new();
        assert_eq!(config.server_url, "http://localhost:6767");
        assert!(config.api_key.is_empty());
        assert!(!config.only_desired);
        assert!(config.series_id.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            server_url: "http://bazarr.local:6767".to_string(),
            api_key: "abc123".to_string(),
            only_desired: true,
            series_id: Some(42),
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("server_url = \"http://bazarr.local:6767\""));
        assert!(toml_str.contains("api_key = \"abc123\""));
        assert!(toml_str.contains("only_desired = true"));
        assert!(toml_str.contains("series_id = 42"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            server_url = "http://10.0.0.2:6767"
            api_key = "secret"
            only_desired = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:6767");
        assert_eq!(config.api_key, "secret");
        assert!(config.only_desired);
        assert!(config.series_id.is_none());
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Only specify some fields, rest should use defaults
        let toml_str = r#"
            api_key = "secret"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.server_url, "http://localhost:6767"); // default
        assert!(!config.only_desired); // default
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:6767");
        assert!(!config.only_desired);
    }
}
