//! Audit log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Row id, assigned by the store.
    pub id: i64,
    /// Action name, e.g. `finance_save_cell`.
    pub action: String,
    /// Free-form payload describing the call.
    pub info: Value,
    /// Time the record was written.
    pub ts: DateTime<Utc>,
}
