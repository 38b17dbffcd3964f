use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Connection settings for the dependent MySQL instance. Credentials and
/// schema describe the externally configured connection; the liveness probe
/// itself only needs the endpoint and timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default = "default_db_charset")]
    pub charset: String,
    #[serde(default = "default_db_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateConfig {
    /// HTTPS source of the replacement binary/script. Empty disables
    /// `--self-update`.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_update_target")]
    pub target: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            database: DatabaseConfig::default(),
            update: UpdateConfig::default(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            target: default_update_target(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: String::new(),
            password: String::new(),
            schema: String::new(),
            charset: default_db_charset(),
            timeout_ms: default_db_timeout_ms(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config validation error: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Validation("listen is required".to_string()));
        }
        if SocketAddr::from_str(&self.listen).is_err() {
            return Err(ConfigError::Validation(
                "listen must be a valid host:port address".to_string(),
            ));
        }

        if self.database.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.host must not be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Validation(
                "database.port must be in range 1..65535".to_string(),
            ));
        }
        if self.database.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "database.timeout_ms must be > 0".to_string(),
            ));
        }

        if !self.update.url.is_empty() && !self.update.url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "update.url must be an https:// URL".to_string(),
            ));
        }
        if self.update.target.trim().is_empty() {
            return Err(ConfigError::Validation(
                "update.target must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_db_port() -> u16 {
    3306
}

fn default_db_charset() -> String {
    "utf8mb4".to_string()
}

// Matches the update-fetch network timeout; a stalled database must not
// hang the whole report.
const fn default_db_timeout_ms() -> u64 {
    10_000
}

fn default_update_target() -> String {
    "./screend".to_string()
}
