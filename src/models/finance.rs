//! Finance table models.
//!
//! A finance table is a grid of numeric cells per year. Every cell belongs to
//! a revision in `0..=MAX_REVISION`; revisions are independent snapshots that
//! back the table's undo/redo.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Highest revision a finance table can reach.
pub const MAX_REVISION: i64 = 10;

/// A stored finance table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceCell {
    /// Table year.
    pub year: i64,
    /// Row id (immutable, not the display position).
    pub row: i64,
    /// Column index.
    pub col: i64,
    /// Cell value.
    pub value: Decimal,
    /// Revision the cell belongs to.
    pub revision: i64,
    /// Time of the last write.
    pub ts: DateTime<Utc>,
}

/// A cell write request. The caller names the revision it is editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    /// Table year.
    pub year: i64,
    /// Row id.
    pub row: i64,
    /// Column index.
    pub col: i64,
    /// New value.
    pub value: Decimal,
    /// Revision to write into.
    #[serde(default)]
    pub revision: i64,
}

/// Metadata of a finance table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMeta {
    /// Table year.
    pub year: i64,
    /// Row id.
    pub row: i64,
    /// Display position.
    #[serde(default)]
    pub position: i64,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Deleted rows keep their metadata but lose all cells.
    #[serde(default)]
    pub deleted: bool,
    /// Income rows are summed separately from expenses.
    #[serde(default)]
    pub income: bool,
    /// Irregular (one-off) expense.
    #[serde(default)]
    pub irregular: bool,
}

impl RowMeta {
    /// Metadata recorded for a row that is deleted before it was ever described.
    pub fn deleted_placeholder(year: i64, row: i64) -> Self {
        Self {
            year,
            row,
            position: row,
            description: String::new(),
            deleted: true,
            income: false,
            irregular: false,
        }
    }
}

/// Direction of a revision shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Step one revision back.
    Undo,
    /// Step one revision forward.
    Redo,
}

impl Direction {
    /// Returns the revision a shift from `latest` targets, clamped to
    /// `0..=MAX_REVISION`.
    pub fn target(self, latest: i64) -> i64 {
        match self {
            Self::Undo => (latest - 1).max(0),
            Self::Redo => (latest + 1).min(MAX_REVISION),
        }
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undo" => Ok(Self::Undo),
            "redo" => Ok(Self::Redo),
            other => Err(EngineError::InvalidDirection {
                direction: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}
