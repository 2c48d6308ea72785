// src/config.rs
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::db::connection::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_BUSY_TIMEOUT, DEFAULT_POOL_SIZE};
use crate::db::{Store, StoreConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Process configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_workers: usize,
    /// `None` runs the API without a database.
    pub store: Option<StoreConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            max_workers: 8,
            store: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; tests pass a map instead of the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store = match lookup("FIELD_DATA_DB").filter(|p| !p.trim().is_empty()) {
            None => None,
            Some(path) => Some(StoreConfig {
                path: path.trim().into(),
                pool_size: parse_or(&lookup, "STORE_POOL_SIZE", DEFAULT_POOL_SIZE, "pool size")?,
                acquire_timeout: millis_or(&lookup, "STORE_TIMEOUT_MS", DEFAULT_ACQUIRE_TIMEOUT)?,
                busy_timeout: millis_or(&lookup, "STORE_BUSY_TIMEOUT_MS", DEFAULT_BUSY_TIMEOUT)?,
            }),
        };

        Ok(Self {
            host: parse_or(&lookup, "HOST", defaults.host, "IP address")?,
            port: parse_or(&lookup, "PORT", defaults.port, "port")?,
            max_workers: parse_or(&lookup, "MAX_WORKERS", defaults.max_workers, "worker count")?,
            store,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The store handle this configuration describes, not yet connected.
    pub fn build_store(&self) -> Store {
        match &self.store {
            Some(cfg) => Store::new(cfg.clone()),
            None => Store::unconfigured(),
        }
    }
}

fn parse_or<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            expected,
        }),
    }
}

fn millis_or<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let ms = parse_or(
        lookup,
        name,
        default.as_millis() as u64,
        "duration in milliseconds",
    )?;
    Ok(Duration::from_millis(ms))
}
