//! Persistence for the finance table, settings and the audit log.
//!
//! Everything is stored in one SQLite database reached through an `sqlx`
//! pool. [`Database`] owns the pool and hands out the three stores, which
//! share it.

mod audit;
mod finance;
mod migrations;
mod settings;

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info, warn};

use crate::error::{EngineError, EngineResult};

pub use audit::AuditLog;
pub use finance::{FinanceStore, ResetSummary};
pub use migrations::latest_version;
pub use settings::SettingsStore;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the application database.
///
/// Cloning is cheap; clones share the pool and the stores' state.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    finance: FinanceStore,
    settings: SettingsStore,
    audit: AuditLog,
}

impl Database {
    /// Connects to `url`, retrying up to `attempts` times with a fixed
    /// `delay` between attempts, then applies pending migrations.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the URL cannot be parsed
    /// - `StorageUnavailable` once every attempt has failed
    /// - `Migration` if the schema cannot be brought up to date
    pub async fn connect(url: &str, attempts: u32, delay: Duration) -> EngineResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| EngineError::InvalidConfig {
                key: "DATABASE_URL".to_string(),
                message: e.to_string(),
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let started = Instant::now();
        let mut attempt = 1;
        let pool = loop {
            match SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => break pool,
                Err(e) if attempt < attempts => {
                    warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Database not reachable, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(attempts = attempts, error = %e, "Giving up on database");
                    return Err(EngineError::StorageUnavailable {
                        attempts,
                        message: e.to_string(),
                    });
                }
            }
        };

        let database = Self::bootstrap(pool).await?;
        info!(
            attempts = attempt,
            duration_ms = started.elapsed().as_millis() as u64,
            schema_version = latest_version(),
            "Database ready"
        );
        Ok(database)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// The pool holds exactly one connection that is never recycled; the
    /// data lives as long as that connection does.
    pub async fn connect_in_memory() -> EngineResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: SqlitePool) -> EngineResult<Self> {
        migrations::apply_migrations(&pool).await?;

        Ok(Self {
            finance: FinanceStore::new(pool.clone()),
            settings: SettingsStore::new(pool.clone()),
            audit: AuditLog::new(pool.clone()),
            pool,
        })
    }

    /// Finance table cells and row metadata.
    pub fn finance(&self) -> &FinanceStore {
        &self.finance
    }

    /// Named settings snapshots.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Append-only action log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_has_schema() {
        let db = Database::connect_in_memory().await.unwrap();

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(version, i64::from(latest_version()));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_database_gives_up() {
        let result = Database::connect(
            "sqlite:///nonexistent-dir/for/sure/finance.db",
            2,
            Duration::from_millis(1),
        )
        .await;

        assert!(matches!(
            result,
            Err(EngineError::StorageUnavailable { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = Database::connect("sqlite://finance.db?mode=bogus", 1, Duration::ZERO).await;
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }
}
