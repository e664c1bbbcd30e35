//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::types::PostVisibility;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub username: String,

    /// Inline password; takes precedence over `password_file`.
    #[serde(default)]
    pub password: Option<String>,

    /// Path of a file holding the password (trailing whitespace trimmed).
    #[serde(default)]
    pub password_file: Option<String>,

    /// Endpoint override for self-hosted or test targets.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default publish status for cross-posted articles: draft | publish.
    #[serde(default = "default_status")]
    pub status: String,

    /// Remote folder name for primary image uploads.
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,
}

fn default_status() -> String {
    "draft".to_string()
}

fn default_upload_folder() -> String {
    "blog".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Path of the SQLite link database.
    pub path: String,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                username: String::new(),
                password: None,
                password_file: Some("~/.config/virgool/password".to_string()),
                base_url: None,
                status: default_status(),
                upload_folder: default_upload_folder(),
            },
            links: LinksConfig {
                path: "~/.local/share/virgool/links.db".to_string(),
            },
        }
    }
}

impl ApiConfig {
    /// Resolve the account password: inline value wins, then `password_file`.
    pub fn resolve_password(&self) -> Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }

        if let Some(file) = &self.password_file {
            let expanded = shellexpand::tilde(file).to_string();
            let secret =
                std::fs::read_to_string(&expanded).map_err(ConfigError::ReadError)?;
            return Ok(secret.trim().to_string());
        }

        Err(ConfigError::MissingField("api.password or api.password_file".to_string()).into())
    }

    /// Default publish visibility; values outside {draft, publish} are
    /// rejected before any network call is possible.
    pub fn visibility(&self) -> Result<PostVisibility> {
        Ok(self.status.parse::<PostVisibility>()?)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("VIRGOOL_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("virgool").join("config.toml"))
}
