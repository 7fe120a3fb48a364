//! Append-only action log.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::EngineResult;
use crate::models::ActionLog;

#[derive(sqlx::FromRow)]
struct LogRow {
    id: i64,
    action: String,
    info: String,
    ts: DateTime<Utc>,
}

/// Writer for the `action_log` table.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Appends one record and returns its id.
    pub async fn record(&self, action: &str, info: &Value) -> EngineResult<i64> {
        let id = sqlx::query("INSERT INTO action_log (action, info, ts) VALUES (?, ?, ?)")
            .bind(action)
            .bind(serde_json::to_string(info)?)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(id)
    }

    /// Returns up to `limit` records, newest first.
    pub async fn recent(&self, limit: u32) -> EngineResult<Vec<ActionLog>> {
        let rows: Vec<LogRow> = sqlx::query_as(
            "SELECT id, action, info, ts FROM action_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> EngineResult<ActionLog> {
                Ok(ActionLog {
                    id: row.id,
                    action: row.action,
                    info: serde_json::from_str(&row.info)?,
                    ts: row.ts,
                })
            })
            .collect()
    }
}
