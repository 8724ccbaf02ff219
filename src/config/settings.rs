//! Application settings loaded from environment variables.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::StartupError;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_MIN_CONNECTIONS, DEFAULT_REDIS_URL,
};

/// Relational store configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Redis cache configuration.
///
/// `url` carries address, password and database index; see
/// [`CacheEndpoint::parse`](crate::infra::CacheEndpoint::parse).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to a
    /// `.env` file and then to development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(DEFAULT_DB_MIN_CONNECTIONS),
            connect_timeout_secs: parse_var("DATABASE_CONNECT_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        };

        let cache = CacheConfig {
            url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
        };

        Self { database, cache }
    }

    /// Load configuration from a JSON file. Missing keys take the defaults.
    pub fn from_file(path: &Path) -> Result<Self, StartupError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            StartupError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
            .map_err(|e| StartupError::Config(format!("{}: {}", path.display(), e)))
    }

    fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
