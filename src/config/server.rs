//! Process settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Settings for the HTTP server and the storage connection.
///
/// | Variable | Default |
/// |---|---|
/// | `SERVER_ADDR` | `0.0.0.0:8000` |
/// | `DATABASE_URL` | `sqlite://finance.db?mode=rwc` |
/// | `CONFIG_DIR` | `./config/de2025` |
/// | `API_PREFIX` | `/api` |
/// | `DB_CONNECT_ATTEMPTS` | `10` |
/// | `DB_CONNECT_DELAY_MS` | `2000` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub server_addr: String,
    /// sqlx connection URL of the relational store.
    pub database_url: String,
    /// Directory holding `payroll.yaml` and `tarif.yaml`.
    pub config_dir: PathBuf,
    /// Path prefix every route is nested under.
    pub api_prefix: String,
    /// How many times to try connecting to the store at startup.
    pub db_connect_attempts: u32,
    /// Fixed delay between connection attempts.
    pub db_connect_delay: Duration,
}

impl ServerConfig {
    /// Reads the settings from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let db_connect_attempts: u32 = parse_var(&lookup, "DB_CONNECT_ATTEMPTS", 10)?;
        if db_connect_attempts == 0 {
            return Err(EngineError::InvalidConfig {
                key: "DB_CONNECT_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let delay_ms: u64 = parse_var(&lookup, "DB_CONNECT_DELAY_MS", 2000)?;

        let mut api_prefix = string("API_PREFIX", "/api");
        if !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }
        while api_prefix.len() > 1 && api_prefix.ends_with('/') {
            api_prefix.pop();
        }

        Ok(Self {
            server_addr: string("SERVER_ADDR", "0.0.0.0:8000"),
            database_url: string("DATABASE_URL", "sqlite://finance.db?mode=rwc"),
            config_dir: PathBuf::from(string("CONFIG_DIR", "./config/de2025")),
            api_prefix,
            db_connect_attempts,
            db_connect_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> EngineResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| EngineError::InvalidConfig {
            key: key.to_string(),
            message: format!("cannot parse '{}': {}", raw, err),
        }),
    }
}
