use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

pub const AI_API_KEY_ENV: &str = "FLOWZEN_AI_API_KEY";
pub const EMAIL_TOKEN_ENV: &str = "FLOWZEN_EMAIL_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

/// Text-analysis model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Prefer the `FLOWZEN_AI_API_KEY` environment variable over storing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP mail relay used for reminder confirmations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            upcoming_limit: default_upcoming_limit(),
            ai: AiConfig::default(),
            email: EmailConfig::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("flowzen.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/flowzen/flowzen.db".to_string()
    }
}

fn default_upcoming_limit() -> usize {
    5
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_from(&config_path, profile)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path; a missing file is created with defaults.
    pub fn load_from(path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents =
                fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            if let Err(e) = config.save_to(path) {
                tracing::error!(path = %path.display(), error = %e, "failed to save config file");
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Credentials from the environment win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(AI_API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.ai.api_key = Some(key);
        }
        if let Some(token) = lookup(EMAIL_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.email.api_token = Some(token);
        }
    }

    pub fn save_to(&mut self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("flowzen.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/flowzen-dev/flowzen.db".to_string(),
                utils::Profile::Prod => "~/.local/share/flowzen/flowzen.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert_eq!(config.upcoming_limit, 5);
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));

        let reloaded = Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.database_path, config.database_path);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database_path = \"/tmp/fz.db\"\n[email]\nrelay_url = \"https://relay.example/send\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path, utils::Profile::Prod).unwrap();
        assert_eq!(config.database_path, "/tmp/fz.db");
        assert_eq!(
            config.email.relay_url.as_deref(),
            Some("https://relay.example/send")
        );
        assert_eq!(config.email.timeout_secs, 30);
        assert_eq!(config.ai.model, "gemini-2.0-flash");
    }

    #[test]
    fn env_credentials_override_file_values() {
        let mut config = Config::default();
        config.ai.api_key = Some("from-file".to_string());
        config.apply_overrides_from(|name| match name {
            AI_API_KEY_ENV => Some("from-env".to_string()),
            EMAIL_TOKEN_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.ai.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.email.api_token, None);
    }
}
