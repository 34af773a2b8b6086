//! Central activities repository
//!
//! Upsert keyed by `unique_id`, incremental fetch ordered by
//! `sync_version`, and batched ownership lookups chunked to stay under
//! backend parameter limits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use ft_core::FtResult;
use ft_models::Activity;

use crate::gateway::UpsertOutcome;

const ACTIVITY_COLUMNS: &str = "unique_id, project_id, assigned_to, description, discipline, \
     area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry, earn_mhs_calc, \
     client_equiv_qty, client_equiv_earn_qty, deleted, updated_by, updated_utc_date, sync_version";

/// Activity row from the central store
#[derive(Debug, Clone, FromRow)]
pub struct CentralActivityRow {
    pub unique_id: String,
    pub project_id: i64,
    pub assigned_to: String,
    pub description: String,
    pub discipline: String,
    pub area: String,
    pub budget_mhs: f64,
    pub quantity: f64,
    pub uom: String,
    pub earn_qty_entry: f64,
    pub percent_entry: f64,
    pub earn_mhs_calc: f64,
    pub client_equiv_qty: f64,
    pub client_equiv_earn_qty: f64,
    pub deleted: bool,
    pub updated_by: String,
    pub updated_utc_date: DateTime<Utc>,
    pub sync_version: i64,
}

impl From<CentralActivityRow> for Activity {
    fn from(row: CentralActivityRow) -> Self {
        Activity {
            unique_id: row.unique_id,
            project_id: row.project_id,
            assigned_to: row.assigned_to,
            description: row.description,
            discipline: row.discipline,
            area: row.area,
            budget_mhs: row.budget_mhs,
            quantity: row.quantity,
            uom: row.uom,
            earn_qty_entry: row.earn_qty_entry,
            percent_entry: row.percent_entry,
            earn_mhs_calc: row.earn_mhs_calc,
            client_equiv_qty: row.client_equiv_qty,
            client_equiv_earn_qty: row.client_equiv_earn_qty,
            deleted: row.deleted,
            updated_by: row.updated_by,
            updated_utc_date: row.updated_utc_date,
            sync_version: row.sync_version,
        }
    }
}

/// Central activities repository
pub struct CentralActivityRepository {
    pool: PgPool,
}

impl CentralActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a record keyed by `unique_id`, advancing its
    /// `sync_version` from the store-wide sequence. Classified so the push
    /// report can distinguish new rows from updated ones.
    pub async fn upsert(&self, activity: &Activity, updated_by: &str) -> FtResult<UpsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE unique_id = $1)",
        )
        .bind(&activity.unique_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            sqlx::query(
                r#"
                UPDATE activities SET
                    project_id = $2,
                    assigned_to = $3,
                    description = $4,
                    discipline = $5,
                    area = $6,
                    budget_mhs = $7,
                    quantity = $8,
                    uom = $9,
                    earn_qty_entry = $10,
                    percent_entry = $11,
                    earn_mhs_calc = $12,
                    client_equiv_qty = $13,
                    client_equiv_earn_qty = $14,
                    deleted = $15,
                    updated_by = $16,
                    updated_utc_date = NOW(),
                    sync_version = nextval('activities_sync_seq')
                WHERE unique_id = $1
                "#,
            )
            .bind(&activity.unique_id)
            .bind(activity.project_id)
            .bind(&activity.assigned_to)
            .bind(&activity.description)
            .bind(&activity.discipline)
            .bind(&activity.area)
            .bind(activity.budget_mhs)
            .bind(activity.quantity)
            .bind(&activity.uom)
            .bind(activity.earn_qty_entry)
            .bind(activity.percent_entry)
            .bind(activity.earn_mhs_calc)
            .bind(activity.client_equiv_qty)
            .bind(activity.client_equiv_earn_qty)
            .bind(activity.deleted)
            .bind(updated_by)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO activities (
                    unique_id, project_id, assigned_to, description, discipline,
                    area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
                    earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty, deleted,
                    updated_by, updated_utc_date, sync_version
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, NOW(), nextval('activities_sync_seq')
                )
                "#,
            )
            .bind(&activity.unique_id)
            .bind(activity.project_id)
            .bind(&activity.assigned_to)
            .bind(&activity.description)
            .bind(&activity.discipline)
            .bind(&activity.area)
            .bind(activity.budget_mhs)
            .bind(activity.quantity)
            .bind(&activity.uom)
            .bind(activity.earn_qty_entry)
            .bind(activity.percent_entry)
            .bind(activity.earn_mhs_calc)
            .bind(activity.client_equiv_qty)
            .bind(activity.client_equiv_earn_qty)
            .bind(activity.deleted)
            .bind(updated_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    /// Fetch records of a project changed after the given version, oldest
    /// change first, optionally restricted to one owner.
    pub async fn fetch_since(
        &self,
        project_id: i64,
        newer_than: i64,
        owner: Option<&str>,
    ) -> FtResult<Vec<Activity>> {
        let rows: Vec<CentralActivityRow> = match owner {
            Some(owner) => {
                sqlx::query_as(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS}
                    FROM activities
                    WHERE project_id = $1 AND sync_version > $2 AND assigned_to = $3
                    ORDER BY sync_version ASC
                    "#,
                ))
                .bind(project_id)
                .bind(newer_than)
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    r#"
                    SELECT {ACTIVITY_COLUMNS}
                    FROM activities
                    WHERE project_id = $1 AND sync_version > $2
                    ORDER BY sync_version ASC
                    "#,
                ))
                .bind(project_id)
                .bind(newer_than)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Activity::from).collect())
    }

    /// Highest sync version present for a project, 0 when empty
    pub async fn latest_sync_version(&self, project_id: i64) -> FtResult<i64> {
        let version: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sync_version), 0) FROM activities WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }

    /// Current owner per `unique_id` for rows that still exist (and are not
    /// deleted). Keys are looked up in chunks to respect parameter-count
    /// limits; absent keys are simply missing from the map.
    pub async fn ownership_of(
        &self,
        unique_ids: &[String],
        chunk_size: usize,
    ) -> FtResult<HashMap<String, String>> {
        let mut owners = HashMap::with_capacity(unique_ids.len());

        for chunk in unique_ids.chunks(chunk_size.max(1)) {
            let rows: Vec<(String, String)> = sqlx::query_as(
                r#"
                SELECT unique_id, assigned_to
                FROM activities
                WHERE unique_id = ANY($1) AND deleted = FALSE
                "#,
            )
            .bind(chunk)
            .fetch_all(&self.pool)
            .await?;

            owners.extend(rows);
        }

        Ok(owners)
    }
}
