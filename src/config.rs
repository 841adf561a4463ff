//! Configuration module for fileshelf.

use serde::Deserialize;
use std::path::Path;

use crate::db::DeleteMode;
use crate::{Result, ShelfError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = permissive development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/fileshelf.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Content store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Web root directory; uploads live underneath it.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Uploads directory relative to the root. Also the public URL prefix.
    #[serde(default = "default_uploads_path")]
    pub uploads_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// How record deletion is carried out.
    #[serde(default)]
    pub delete_mode: DeleteMode,
}

fn default_storage_root() -> String {
    "public".to_string()
}

fn default_uploads_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl StorageConfig {
    /// Upload cap in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize) * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            uploads_path: default_uploads_path(),
            max_upload_size_mb: default_max_upload_size(),
            delete_mode: DeleteMode::default(),
        }
    }
}

/// Identity configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Secret used to verify bearer tokens (must be set).
    #[serde(default)]
    pub jwt_secret: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/fileshelf.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Content store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Identity configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShelfError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist. Environment overrides are applied either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShelfError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILESHELF_JWT_SECRET`: Override the JWT secret key
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("FILESHELF_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ShelfError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via FILESHELF_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(ShelfError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
