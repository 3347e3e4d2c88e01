//! Configuration loading for the flatmatch API.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `FLATMATCH_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration derived from `FLATMATCH_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// MongoDB connection string. Required at startup; there is no default
    /// when loading from the environment.
    pub mongo_uri: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_store_connect_attempts")]
    pub store_connect_attempts: u32,
    #[serde(default = "default_store_connect_delay_ms")]
    pub store_connect_delay_ms: u64,
    #[serde(default = "default_store_selection_timeout_ms")]
    pub store_selection_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            mongo_uri: "mongodb://localhost:27017".to_string(),
            db_name: default_db_name(),
            store_connect_attempts: default_store_connect_attempts(),
            store_connect_delay_ms: default_store_connect_delay_ms(),
            store_selection_timeout_ms: default_store_selection_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongo_uri.is_empty() {
            return Err(ConfigError::MissingMongoUri);
        }

        if self.store_connect_attempts == 0 {
            return Err(ConfigError::InvalidConnectAttempts {
                value: self.store_connect_attempts,
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_db_name() -> String {
    "flatmatch".to_string()
}

fn default_store_connect_attempts() -> u32 {
    5
}

fn default_store_connect_delay_ms() -> u64 {
    2000
}

fn default_store_selection_timeout_ms() -> u64 {
    5000
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("MongoDB connection string is missing; set FLATMATCH_MONGO_URI")]
    MissingMongoUri,
    #[error("store connect attempts must be at least 1, got {value}")]
    InvalidConnectAttempts { value: u32 },
}

/// Loads configuration using layered `.env` files and `FLATMATCH_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from layered env files and the process environment.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("FLATMATCH_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);

        // The store connection string has no default: a missing value is a
        // fatal startup error.
        let mongo_uri = layered
            .remove("MONGO_URI")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingMongoUri)?;

        let db_name = layered
            .remove("DB_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_db_name);
        let store_connect_attempts = layered
            .remove("STORE_CONNECT_ATTEMPTS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_store_connect_attempts);
        let store_connect_delay_ms = layered
            .remove("STORE_CONNECT_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_store_connect_delay_ms);
        let store_selection_timeout_ms = layered
            .remove("STORE_SELECTION_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_store_selection_timeout_ms);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            mongo_uri,
            db_name,
            store_connect_attempts,
            store_connect_delay_ms,
            store_selection_timeout_ms,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("FLATMATCH_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("FLATMATCH_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
