use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_PHOTO;

fn default_api_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

fn default_true() -> bool {
    true
}

/// Service configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file (required)
    pub database_path: PathBuf,
    /// API server port (default: 3000)
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Address the API server binds to (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Photo path given to every roster entry (default: /student1.png)
    #[serde(default = "default_photo")]
    pub default_photo: String,
    /// Allow cross-origin requests from any origin (default: true)
    #[serde(default = "default_true")]
    pub cors_allow_any: bool,
}

impl ServiceConfig {
    /// Config pointing at `database_path` with every other field defaulted
    pub fn with_database(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            api_port: default_api_port(),
            bind_address: default_bind_address(),
            default_photo: default_photo(),
            cors_allow_any: true,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: ServiceConfig = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path must not be empty".to_string());
        }
        if self.api_port == 0 {
            return Err("api_port must be between 1 and 65535".to_string());
        }
        Ok(())
    }
}
