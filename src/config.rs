//! Process configuration from environment variables.
//!
//! Every knob has a default so the service starts with no environment at
//! all: in-memory store, 6 s toasts, simulator off. A `.env` file is loaded
//! by `main` before this runs.

use std::path::PathBuf;
use std::time::Duration;

use crate::services::simulator::DEFAULT_SIMULATOR_INTERVAL_SECS;
use crate::services::toast::DEFAULT_TOAST_TTL_SECS;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STORE_DIR: &str = "data";
const DEFAULT_BUS_CAPACITY: usize = 256;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown STORE_BACKEND: {0} (expected memory, file or postgres)")]
    UnknownBackend(String),
    #[error("STORE_BACKEND=postgres requires DATABASE_URL")]
    MissingDatabaseUrl,
}

/// Where repositories keep their documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    Postgres { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreBackend,
    pub toast_ttl: Duration,
    pub bus_capacity: usize,
    /// `None` when the notification simulator is disabled.
    pub simulator_interval: Option<Duration>,
    pub cookie_secure: bool,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error for an unknown store backend or a Postgres backend
    /// without `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = parse_store_backend(
            std::env::var("STORE_BACKEND").ok().as_deref(),
            std::env::var("STORE_DIR").ok(),
            std::env::var("DATABASE_URL").ok(),
            env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
        )?;
        let simulator_interval = env_bool("SIMULATOR_ENABLED", false).then(|| {
            Duration::from_secs(env_parse("SIMULATOR_INTERVAL_SECS", DEFAULT_SIMULATOR_INTERVAL_SECS).max(1))
        });

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            store,
            toast_ttl: Duration::from_secs(env_parse("NOTIFY_TTL_SECS", DEFAULT_TOAST_TTL_SECS)),
            bus_capacity: env_parse("NOTIFY_BUS_CAPACITY", DEFAULT_BUS_CAPACITY).max(1),
            simulator_interval,
            cookie_secure: env_bool("COOKIE_SECURE", false),
        })
    }
}

pub(crate) fn parse_store_backend(
    raw: Option<&str>,
    dir: Option<String>,
    database_url: Option<String>,
    max_connections: u32,
) -> Result<StoreBackend, ConfigError> {
    match raw.map(str::trim).unwrap_or("memory") {
        "" | "memory" => Ok(StoreBackend::Memory),
        "file" => Ok(StoreBackend::File(PathBuf::from(dir.unwrap_or_else(|| DEFAULT_STORE_DIR.to_owned())))),
        "postgres" => {
            let url = database_url.filter(|u| !u.trim().is_empty()).ok_or(ConfigError::MissingDatabaseUrl)?;
            Ok(StoreBackend::Postgres { url, max_connections })
        }
        other => Err(ConfigError::UnknownBackend(other.to_owned())),
    }
}

/// Parse `key` as `T`, falling back to `default` when unset or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().map_or(default, |v| parse_bool(&v).unwrap_or(default))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
