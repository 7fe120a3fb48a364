//! Append-only settings snapshots.

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::EngineResult;

/// Store of named JSON settings objects.
///
/// Every save appends a snapshot; reads return the newest one.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    pool: SqlitePool,
}

impl SettingsStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the newest payload saved under `group`, or an empty object.
    pub async fn get(&self, group: &str) -> EngineResult<Value> {
        let data: Option<String> = sqlx::query_scalar(
            "SELECT data FROM setting WHERE group_name = ? ORDER BY ts DESC, id DESC LIMIT 1",
        )
        .bind(group)
        .fetch_optional(&self.pool)
        .await?;

        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Value::Object(Map::new())),
        }
    }

    /// Appends a snapshot for `group` and returns the payload unchanged.
    pub async fn save(&self, group: &str, payload: Value) -> EngineResult<Value> {
        let data = serde_json::to_string(&payload)?;
        sqlx::query("INSERT INTO setting (group_name, data, ts) VALUES (?, ?, ?)")
            .bind(group)
            .bind(&data)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(group = group, bytes = data.len(), "Settings saved");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use serde_json::json;

    async fn store() -> SettingsStore {
        Database::connect_in_memory()
            .await
            .expect("in-memory database")
            .settings()
            .clone()
    }

    #[tokio::test]
    async fn test_missing_group_is_empty_object() {
        let store = store().await;
        assert_eq!(store.get("payroll").await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let store = store().await;
        let payload = json!({
            "tax_class": 3,
            "federal_state": "BY",
            "nested": { "list": [1, 2.5, "drei"], "flag": true, "none": null }
        });

        let echoed = store.save("payroll", payload.clone()).await.unwrap();

        assert_eq!(echoed, payload);
        assert_eq!(store.get("payroll").await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_latest_save_wins() {
        let store = store().await;
        store.save("tarif", json!({ "v": 1 })).await.unwrap();
        store.save("tarif", json!({ "v": 2 })).await.unwrap();
        store.save("other", json!({ "v": 3 })).await.unwrap();

        assert_eq!(store.get("tarif").await.unwrap(), json!({ "v": 2 }));

        let snapshots: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM setting WHERE group_name = 'tarif'")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(snapshots, 2);
    }
}
