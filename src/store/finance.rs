//! Finance table persistence.
//!
//! Cells are keyed by `(year, row, col, revision)`. The latest revision of a
//! year is never cached; every read computes it from the stored cells.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{CellUpdate, Direction, FinanceCell, MAX_REVISION, RowMeta};

#[derive(sqlx::FromRow)]
struct CellRow {
    year: i64,
    row_no: i64,
    col_no: i64,
    value: String,
    revision: i64,
    ts: DateTime<Utc>,
}

impl TryFrom<CellRow> for FinanceCell {
    type Error = EngineError;

    fn try_from(row: CellRow) -> Result<Self, Self::Error> {
        let value = Decimal::from_str(&row.value)
            .map_err(|e| EngineError::Storage(sqlx::Error::Decode(Box::new(e))))?;
        Ok(Self {
            year: row.year,
            row: row.row_no,
            col: row.col_no,
            value,
            revision: row.revision,
            ts: row.ts,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MetaRow {
    year: i64,
    row_no: i64,
    position: i64,
    description: String,
    deleted: bool,
    income: bool,
    irregular: bool,
}

impl From<MetaRow> for RowMeta {
    fn from(row: MetaRow) -> Self {
        Self {
            year: row.year,
            row: row.row_no,
            position: row.position,
            description: row.description,
            deleted: row.deleted,
            income: row.income,
            irregular: row.irregular,
        }
    }
}

/// Counts of what [`FinanceStore::reset_year`] removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetSummary {
    /// Cells removed across all revisions.
    pub cells: u64,
    /// Row metadata records removed.
    pub rows: u64,
}

/// Store for finance table cells and row metadata.
#[derive(Debug, Clone)]
pub struct FinanceStore {
    pool: SqlitePool,
    // Serializes revision shifts within the process so a racing caller
    // observes the revision the first one created.
    shift_lock: Arc<Mutex<()>>,
}

async fn latest_revision(conn: &mut SqliteConnection, year: i64) -> EngineResult<i64> {
    let latest: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(revision), 0) FROM finance_cell WHERE year = ?")
            .bind(year)
            .fetch_one(conn)
            .await?;
    Ok(latest)
}

impl FinanceStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            shift_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns every cell of the year's highest existing revision, ordered
    /// by row then column. Empty if the year has no cells.
    pub async fn get_cells(&self, year: i64) -> EngineResult<Vec<FinanceCell>> {
        let mut conn = self.pool.acquire().await?;
        let revision = latest_revision(&mut conn, year).await?;

        let rows: Vec<CellRow> = sqlx::query_as(
            "SELECT year, row_no, col_no, value, revision, ts FROM finance_cell \
             WHERE year = ? AND revision = ? ORDER BY row_no, col_no",
        )
        .bind(year)
        .bind(revision)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(FinanceCell::try_from).collect()
    }

    /// Writes a cell at the revision named by the caller, overwriting the
    /// value if the coordinate already exists at that revision.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the revision is outside `0..=MAX_REVISION`.
    pub async fn upsert_cell(&self, update: &CellUpdate) -> EngineResult<FinanceCell> {
        if !(0..=MAX_REVISION).contains(&update.revision) {
            return Err(EngineError::invalid_input(
                "revision",
                format!("must be between 0 and {MAX_REVISION}, got {}", update.revision),
            ));
        }

        let ts = Utc::now();
        sqlx::query(
            "INSERT INTO finance_cell (year, row_no, col_no, value, revision, ts) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (year, row_no, col_no, revision) \
             DO UPDATE SET value = excluded.value, ts = excluded.ts",
        )
        .bind(update.year)
        .bind(update.row)
        .bind(update.col)
        .bind(update.value.to_string())
        .bind(update.revision)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        debug!(
            year = update.year,
            row = update.row,
            col = update.col,
            revision = update.revision,
            "Cell written"
        );

        Ok(FinanceCell {
            year: update.year,
            row: update.row,
            col: update.col,
            value: update.value,
            revision: update.revision,
            ts,
        })
    }

    /// Moves the year one revision back or forward and returns the resulting
    /// revision.
    ///
    /// The target is clamped to `0..=MAX_REVISION`; hitting a bound returns
    /// the latest revision unchanged. A target that already holds cells is
    /// returned as is. Otherwise the latest revision's cells are copied into
    /// the target in one transaction.
    pub async fn shift_revision(&self, year: i64, direction: Direction) -> EngineResult<i64> {
        let _guard = self.shift_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let latest = latest_revision(&mut tx, year).await?;
        let target = direction.target(latest);
        if target == latest {
            return Ok(latest);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM finance_cell WHERE year = ? AND revision = ?)",
        )
        .bind(year)
        .bind(target)
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Ok(target);
        }

        let copied = sqlx::query(
            "INSERT OR IGNORE INTO finance_cell (year, row_no, col_no, value, revision, ts) \
             SELECT year, row_no, col_no, value, ?, ? FROM finance_cell \
             WHERE year = ? AND revision = ?",
        )
        .bind(target)
        .bind(Utc::now())
        .bind(year)
        .bind(latest)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;

        info!(
            year = year,
            direction = %direction,
            from = latest,
            revision = target,
            cells = copied,
            "Created revision snapshot"
        );
        Ok(target)
    }

    /// Returns the metadata of every row of the year, deleted rows included,
    /// keyed by row id.
    pub async fn get_rows(&self, year: i64) -> EngineResult<BTreeMap<i64, RowMeta>> {
        let rows: Vec<MetaRow> = sqlx::query_as(
            "SELECT year, row_no, position, description, deleted, income, irregular \
             FROM finance_row WHERE year = ? ORDER BY row_no",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.row_no, RowMeta::from(row)))
            .collect())
    }

    /// Inserts or overwrites the metadata of `(meta.year, meta.row)`.
    pub async fn upsert_row(&self, meta: &RowMeta) -> EngineResult<RowMeta> {
        sqlx::query(
            "INSERT INTO finance_row (year, row_no, position, description, deleted, income, irregular) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (year, row_no) DO UPDATE SET \
             position = excluded.position, description = excluded.description, \
             deleted = excluded.deleted, income = excluded.income, irregular = excluded.irregular",
        )
        .bind(meta.year)
        .bind(meta.row)
        .bind(meta.position)
        .bind(&meta.description)
        .bind(meta.deleted)
        .bind(meta.income)
        .bind(meta.irregular)
        .execute(&self.pool)
        .await?;

        Ok(meta.clone())
    }

    /// Marks a row deleted and removes its cells at every revision.
    ///
    /// A row without metadata gets a placeholder record first.
    pub async fn delete_row(&self, year: i64, row: i64) -> EngineResult<()> {
        let placeholder = RowMeta::deleted_placeholder(year, row);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO finance_row (year, row_no, position, description, deleted) \
             VALUES (?, ?, ?, ?, 1) \
             ON CONFLICT (year, row_no) DO UPDATE SET deleted = 1",
        )
        .bind(placeholder.year)
        .bind(placeholder.row)
        .bind(placeholder.position)
        .bind(&placeholder.description)
        .execute(&mut *tx)
        .await?;

        let purged = sqlx::query("DELETE FROM finance_cell WHERE year = ? AND row_no = ?")
            .bind(year)
            .bind(row)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!(year = year, row = row, cells = purged, "Row deleted");
        Ok(())
    }

    /// Removes every cell and every row record of the year.
    pub async fn reset_year(&self, year: i64) -> EngineResult<ResetSummary> {
        let mut tx = self.pool.begin().await?;

        let cells = sqlx::query("DELETE FROM finance_cell WHERE year = ?")
            .bind(year)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let rows = sqlx::query("DELETE FROM finance_row WHERE year = ?")
            .bind(year)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        info!(year = year, cells = cells, rows = rows, "Year reset");
        Ok(ResetSummary { cells, rows })
    }
}
