//! Schema migrations.
//!
//! Migrations are numbered SQL files compiled into the binary. The applied
//! version is mirrored to `PRAGMA user_version`, and all pending migrations
//! are applied in one transaction.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

/// Latest schema version known to this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

pub(crate) async fn apply_migrations(pool: &SqlitePool) -> EngineResult<()> {
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    let current = u32::try_from(current).unwrap_or(0);
    let latest = latest_version();

    if current > latest {
        return Err(EngineError::Migration {
            version: current,
            message: format!("database schema is newer than supported version {latest}"),
        });
    }
    if current == latest {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        for statement in migration
            .sql
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| EngineError::Migration {
                    version: migration.version,
                    message: e.to_string(),
                })?;
        }
        // PRAGMA does not take bind parameters.
        sqlx::query(&format!("PRAGMA user_version = {}", migration.version))
            .execute(&mut *tx)
            .await?;
        info!(version = migration.version, "Applied schema migration");
    }
    tx.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn empty_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[test]
    fn test_versions_are_increasing() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(latest_version(), 1);
    }

    #[tokio::test]
    async fn test_apply_twice_is_noop() {
        let pool = empty_pool().await;
        apply_migrations(&pool).await.unwrap();
        apply_migrations(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["action_log", "finance_cell", "finance_row", "setting"]);
    }

    #[tokio::test]
    async fn test_newer_schema_is_rejected() {
        let pool = empty_pool().await;
        sqlx::query("PRAGMA user_version = 99")
            .execute(&pool)
            .await
            .unwrap();

        let result = apply_migrations(&pool).await;
        assert!(matches!(result, Err(EngineError::Migration { version: 99, .. })));
    }
}
