//! Local activities cache
//!
//! Mirror of the central `activities` table plus the `local_dirty` flag.
//! Three write paths with different dirty semantics: user edits mark the
//! row dirty, pull applies overwrite only clean rows, and restore writes
//! mark dirty so the reverted state is pushed on the next sync.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use ft_core::FtResult;
use ft_models::{Activity, ProgressSnapshot};

const ACTIVITY_COLUMNS: &str = "unique_id, project_id, assigned_to, description, discipline, \
     area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry, earn_mhs_calc, \
     client_equiv_qty, client_equiv_earn_qty, deleted, updated_by, updated_utc_date, sync_version";

/// Activity row in the local cache
#[derive(Debug, Clone, FromRow)]
pub struct LocalActivityRow {
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

impl From<LocalActivityRow> for Activity {
    fn from(row: LocalActivityRow) -> Self {
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

/// Local activities repository
pub struct LocalActivityRepository {
    pool: SqlitePool,
}

impl LocalActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a cached activity by its identity
    pub async fn get(&self, unique_id: &str) -> FtResult<Option<Activity>> {
        let row: Option<LocalActivityRow> = sqlx::query_as(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE unique_id = ?",
        ))
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Activity::from))
    }

    /// All cached activities in the given projects
    pub async fn list_for_projects(&self, project_ids: &[i64]) -> FtResult<Vec<Activity>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE project_id IN ({}) \
             ORDER BY unique_id ASC",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query_as::<_, LocalActivityRow>(&sql);
        for id in project_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Activity::from).collect())
    }

    /// Persist a user edit and mark the row dirty
    pub async fn save_edit(&self, activity: &Activity, username: &str) -> FtResult<()> {
        let mut edited = activity.clone();
        edited.touch(username);

        let mut conn = self.pool.acquire().await?;
        upsert_row(&mut conn, &edited, 1).await?;
        Ok(())
    }

    /// Overwrite the cached copy with a centrally fetched row, unless the
    /// cached copy is dirty (an unpushed local edit must not be discarded).
    /// Returns whether the row was applied.
    pub async fn apply_pull(
        &self,
        conn: &mut SqliteConnection,
        activity: &Activity,
    ) -> FtResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO activities (
                unique_id, project_id, assigned_to, description, discipline,
                area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
                earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty, deleted,
                updated_by, updated_utc_date, sync_version, local_dirty
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
            ON CONFLICT(unique_id) DO UPDATE SET
                project_id = excluded.project_id,
                assigned_to = excluded.assigned_to,
                description = excluded.description,
                discipline = excluded.discipline,
                area = excluded.area,
                budget_mhs = excluded.budget_mhs,
                quantity = excluded.quantity,
                uom = excluded.uom,
                earn_qty_entry = excluded.earn_qty_entry,
                percent_entry = excluded.percent_entry,
                earn_mhs_calc = excluded.earn_mhs_calc,
                client_equiv_qty = excluded.client_equiv_qty,
                client_equiv_earn_qty = excluded.client_equiv_earn_qty,
                deleted = excluded.deleted,
                updated_by = excluded.updated_by,
                updated_utc_date = excluded.updated_utc_date,
                sync_version = excluded.sync_version,
                local_dirty = 0
            WHERE activities.local_dirty = 0
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
        .bind(&activity.updated_by)
        .bind(activity.updated_utc_date)
        .bind(activity.sync_version)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write a snapshot's frozen progress values back onto the cached row,
    /// marking it dirty and stamping provenance. Runs on the transaction
    /// owned by the revert engine; a missing row is reinserted from the
    /// snapshot copy.
    pub async fn apply_restore(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &ProgressSnapshot,
        username: &str,
    ) -> FtResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE activities SET
                budget_mhs = ?,
                quantity = ?,
                uom = ?,
                earn_qty_entry = ?,
                percent_entry = ?,
                earn_mhs_calc = ?,
                client_equiv_qty = ?,
                client_equiv_earn_qty = ?,
                updated_by = ?,
                updated_utc_date = ?,
                local_dirty = 1
            WHERE unique_id = ?
            "#,
        )
        .bind(snapshot.budget_mhs)
        .bind(snapshot.quantity)
        .bind(&snapshot.uom)
        .bind(snapshot.earn_qty_entry)
        .bind(snapshot.percent_entry)
        .bind(snapshot.earn_mhs_calc)
        .bind(snapshot.client_equiv_qty)
        .bind(snapshot.client_equiv_earn_qty)
        .bind(username)
        .bind(now)
        .bind(&snapshot.unique_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let mut activity = snapshot.to_activity();
            activity.touch(username);
            upsert_row(conn, &activity, 1).await?;
        }

        Ok(())
    }

    /// Remove all cached rows for the given projects (project de-selection).
    /// Irreversible locally; callers confirm pending-edit loss first.
    pub async fn delete_for_projects(&self, project_ids: &[i64]) -> FtResult<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM activities WHERE project_id IN ({})",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in project_ids {
            query = query.bind(id);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Remove cached rows in the given projects not assigned to `username`.
    /// Used after an owner-filtered pull to drop rows retrieved by an
    /// earlier unfiltered sync.
    pub async fn delete_not_owned(&self, project_ids: &[i64], username: &str) -> FtResult<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM activities WHERE project_id IN ({}) AND assigned_to != ?",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in project_ids {
            query = query.bind(id);
        }
        query = query.bind(username);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Full-row upsert with an explicit dirty flag
async fn upsert_row(
    conn: &mut SqliteConnection,
    activity: &Activity,
    local_dirty: i64,
) -> FtResult<()> {
    sqlx::query(
        r#"
        INSERT INTO activities (
            unique_id, project_id, assigned_to, description, discipline,
            area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
            earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty, deleted,
            updated_by, updated_utc_date, sync_version, local_dirty
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(unique_id) DO UPDATE SET
            project_id = excluded.project_id,
            assigned_to = excluded.assigned_to,
            description = excluded.description,
            discipline = excluded.discipline,
            area = excluded.area,
            budget_mhs = excluded.budget_mhs,
            quantity = excluded.quantity,
            uom = excluded.uom,
            earn_qty_entry = excluded.earn_qty_entry,
            percent_entry = excluded.percent_entry,
            earn_mhs_calc = excluded.earn_mhs_calc,
            client_equiv_qty = excluded.client_equiv_qty,
            client_equiv_earn_qty = excluded.client_equiv_earn_qty,
            deleted = excluded.deleted,
            updated_by = excluded.updated_by,
            updated_utc_date = excluded.updated_utc_date,
            sync_version = excluded.sync_version,
            local_dirty = excluded.local_dirty
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
    .bind(&activity.updated_by)
    .bind(activity.updated_utc_date)
    .bind(activity.sync_version)
    .bind(local_dirty)
    .execute(conn)
    .await?;

    Ok(())
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    fn activity(id: &str, project: i64, owner: &str) -> Activity {
        let mut a = Activity::new(id, project);
        a.assigned_to = owner.to_string();
        a.quantity = 100.0;
        a.budget_mhs = 50.0;
        a
    }

    #[tokio::test]
    async fn test_save_edit_marks_dirty() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let repo = store.activities();

        repo.save_edit(&activity("A1", 1, "alice"), "alice")
            .await
            .unwrap();

        assert!(store.dirty().is_dirty("A1").await.unwrap());
        let saved = repo.get("A1").await.unwrap().unwrap();
        assert_eq!(saved.updated_by, "alice");
    }

    #[tokio::test]
    async fn test_pull_apply_skips_dirty_rows() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let repo = store.activities();

        repo.save_edit(&activity("A1", 1, "alice"), "alice")
            .await
            .unwrap();

        let mut central = activity("A1", 1, "alice");
        central.quantity = 999.0;
        central.sync_version = 7;

        let mut conn = store.pool().acquire().await.unwrap();
        let applied = repo.apply_pull(&mut conn, &central).await.unwrap();
        drop(conn);

        assert!(!applied);
        let cached = repo.get("A1").await.unwrap().unwrap();
        assert_eq!(cached.quantity, 100.0);
        assert!(store.dirty().is_dirty("A1").await.unwrap());
    }

    #[tokio::test]
    async fn test_pull_apply_overwrites_clean_rows() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let repo = store.activities();

        let mut central = activity("A1", 1, "alice");
        central.sync_version = 3;

        let mut conn = store.pool().acquire().await.unwrap();
        assert!(repo.apply_pull(&mut conn, &central).await.unwrap());

        central.quantity = 40.0;
        central.sync_version = 9;
        assert!(repo.apply_pull(&mut conn, &central).await.unwrap());
        drop(conn);

        let cached = repo.get("A1").await.unwrap().unwrap();
        assert_eq!(cached.quantity, 40.0);
        assert_eq!(cached.sync_version, 9);
        assert!(!store.dirty().is_dirty("A1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_not_owned() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let repo = store.activities();

        let mut conn = store.pool().acquire().await.unwrap();
        repo.apply_pull(&mut conn, &activity("A1", 1, "alice"))
            .await
            .unwrap();
        repo.apply_pull(&mut conn, &activity("A2", 1, "bob"))
            .await
            .unwrap();
        repo.apply_pull(&mut conn, &activity("B1", 2, "bob"))
            .await
            .unwrap();
        drop(conn);

        let removed = repo.delete_not_owned(&[1], "alice").await.unwrap();
        assert_eq!(removed, 1);

        assert!(repo.get("A1").await.unwrap().is_some());
        assert!(repo.get("A2").await.unwrap().is_none());
        // Other projects are untouched.
        assert!(repo.get("B1").await.unwrap().is_some());
    }
}
