//! Progress snapshots repository
//!
//! Capture is a single set-based copy: every non-deleted activity owned by
//! the user that does not already have a snapshot for the week is frozen in
//! one statement, which makes the operation idempotent and atomic.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use ft_core::FtResult;
use ft_models::ProgressSnapshot;

/// Snapshot row from the central store
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub unique_id: String,
    pub week_end_date: NaiveDate,
    pub project_id: i64,
    pub assigned_to: String,
    pub description: String,
    pub budget_mhs: f64,
    pub quantity: f64,
    pub uom: String,
    pub earn_qty_entry: f64,
    pub percent_entry: f64,
    pub earn_mhs_calc: f64,
    pub client_equiv_qty: f64,
    pub client_equiv_earn_qty: f64,
    pub captured_by: String,
    pub captured_utc_date: DateTime<Utc>,
}

impl From<SnapshotRow> for ProgressSnapshot {
    fn from(row: SnapshotRow) -> Self {
        ProgressSnapshot {
            unique_id: row.unique_id,
            week_end_date: row.week_end_date,
            project_id: row.project_id,
            assigned_to: row.assigned_to,
            description: row.description,
            budget_mhs: row.budget_mhs,
            quantity: row.quantity,
            uom: row.uom,
            earn_qty_entry: row.earn_qty_entry,
            percent_entry: row.percent_entry,
            earn_mhs_calc: row.earn_mhs_calc,
            client_equiv_qty: row.client_equiv_qty,
            client_equiv_earn_qty: row.client_equiv_earn_qty,
            captured_by: row.captured_by,
            captured_utc_date: row.captured_utc_date,
        }
    }
}

/// Progress snapshots repository
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Freeze every non-deleted activity owned by `username` into snapshot
    /// rows dated `week_end_date`. Rows that already have a snapshot for
    /// that exact date are left alone, so re-running for the same week adds
    /// nothing. Returns the number of rows captured by this call.
    pub async fn capture(
        &self,
        username: &str,
        week_end_date: NaiveDate,
        captured_by: &str,
    ) -> FtResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO progress_snapshots (
                unique_id, week_end_date, project_id, assigned_to, description,
                budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
                earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty,
                captured_by, captured_utc_date
            )
            SELECT
                a.unique_id, $2, a.project_id, a.assigned_to, a.description,
                a.budget_mhs, a.quantity, a.uom, a.earn_qty_entry, a.percent_entry,
                a.earn_mhs_calc, a.client_equiv_qty, a.client_equiv_earn_qty,
                $3, NOW()
            FROM activities a
            WHERE a.assigned_to = $1
              AND a.deleted = FALSE
              AND NOT EXISTS (
                  SELECT 1 FROM progress_snapshots s
                  WHERE s.unique_id = a.unique_id AND s.week_end_date = $2
              )
            "#,
        )
        .bind(username)
        .bind(week_end_date)
        .bind(captured_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Load the full snapshot set for a user and week
    pub async fn load(
        &self,
        username: &str,
        week_end_date: NaiveDate,
    ) -> FtResult<Vec<ProgressSnapshot>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT unique_id, week_end_date, project_id, assigned_to, description,
                   budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
                   earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty,
                   captured_by, captured_utc_date
            FROM progress_snapshots
            WHERE assigned_to = $1 AND week_end_date = $2
            ORDER BY unique_id ASC
            "#,
        )
        .bind(username)
        .bind(week_end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProgressSnapshot::from).collect())
    }
}
