//! Dirty-record tracker
//!
//! A row is dirty when it carries a local edit not yet confirmed pushed to
//! the central store. The flag drives push behavior and protects local
//! edits from being overwritten by pull; it is cleared per record only on a
//! confirmed successful push of that exact record.

use sqlx::SqlitePool;

use ft_core::FtResult;
use ft_models::Activity;

use crate::activities::LocalActivityRow;

/// Dirty-flag operations over the local cache
pub struct DirtyTracker {
    pool: SqlitePool,
}

impl DirtyTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Mark records dirty after a local mutation
    pub async fn mark_dirty(&self, unique_ids: &[String]) -> FtResult<()> {
        self.set_flag(unique_ids, 1).await
    }

    /// Clear the flag after a confirmed push of exactly these records
    pub async fn clear_dirty(&self, unique_ids: &[String]) -> FtResult<()> {
        self.set_flag(unique_ids, 0).await
    }

    pub async fn is_dirty(&self, unique_id: &str) -> FtResult<bool> {
        let dirty: Option<i64> =
            sqlx::query_scalar("SELECT local_dirty FROM activities WHERE unique_id = ?")
                .bind(unique_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(dirty == Some(1))
    }

    /// All dirty records within the given projects, push candidates
    pub async fn dirty_in_projects(&self, project_ids: &[i64]) -> FtResult<Vec<Activity>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT unique_id, project_id, assigned_to, description, discipline, \
             area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry, earn_mhs_calc, \
             client_equiv_qty, client_equiv_earn_qty, deleted, updated_by, updated_utc_date, \
             sync_version \
             FROM activities WHERE local_dirty = 1 AND project_id IN ({}) \
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

    /// Count dirty records outside the given projects
    pub async fn count_dirty_excluding(&self, project_ids: &[i64]) -> FtResult<i64> {
        if project_ids.is_empty() {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE local_dirty = 1")
                    .fetch_one(&self.pool)
                    .await?;
            return Ok(count);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM activities WHERE local_dirty = 1 AND project_id NOT IN ({})",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for id in project_ids {
            query = query.bind(id);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Dirty-row count per project, for the de-selection confirmation step
    pub async fn dirty_counts_for_projects(
        &self,
        project_ids: &[i64],
    ) -> FtResult<Vec<(i64, i64)>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT project_id, COUNT(*) FROM activities \
             WHERE local_dirty = 1 AND project_id IN ({}) \
             GROUP BY project_id",
            placeholders(project_ids.len())
        );
        let mut query = sqlx::query_as::<_, (i64, i64)>(&sql);
        for id in project_ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn set_flag(&self, unique_ids: &[String], flag: i64) -> FtResult<()> {
        if unique_ids.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "UPDATE activities SET local_dirty = ? WHERE unique_id IN ({})",
            placeholders(unique_ids.len())
        );
        let mut query = sqlx::query(&sql).bind(flag);
        for id in unique_ids {
            query = query.bind(id);
        }

        query.execute(&self.pool).await?;
        Ok(())
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    async fn seed(store: &LocalStore, id: &str, project: i64) {
        let mut a = Activity::new(id, project);
        a.assigned_to = "alice".to_string();
        let mut conn = store.pool().acquire().await.unwrap();
        store
            .activities()
            .apply_pull(&mut conn, &a)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_and_clear_dirty() {
        let store = LocalStore::open_in_memory().await.unwrap();
        seed(&store, "A1", 1).await;
        let tracker = store.dirty();

        tracker.mark_dirty(&["A1".to_string()]).await.unwrap();
        assert!(tracker.is_dirty("A1").await.unwrap());

        tracker.clear_dirty(&["A1".to_string()]).await.unwrap();
        assert!(!tracker.is_dirty("A1").await.unwrap());
    }

    #[tokio::test]
    async fn test_dirty_counts_per_project() {
        let store = LocalStore::open_in_memory().await.unwrap();
        seed(&store, "A1", 1).await;
        seed(&store, "A2", 1).await;
        seed(&store, "B1", 2).await;
        seed(&store, "C1", 3).await;

        let tracker = store.dirty();
        tracker
            .mark_dirty(&["A1".to_string(), "A2".to_string(), "C1".to_string()])
            .await
            .unwrap();

        let counts = tracker.dirty_counts_for_projects(&[1, 2]).await.unwrap();
        assert_eq!(counts, vec![(1, 2)]);

        assert_eq!(tracker.count_dirty_excluding(&[1]).await.unwrap(), 1);
        assert_eq!(tracker.count_dirty_excluding(&[]).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_dirty_in_projects_returns_push_candidates() {
        let store = LocalStore::open_in_memory().await.unwrap();
        seed(&store, "A1", 1).await;
        seed(&store, "B1", 2).await;

        let tracker = store.dirty();
        tracker
            .mark_dirty(&["A1".to_string(), "B1".to_string()])
            .await
            .unwrap();

        let candidates = tracker.dirty_in_projects(&[1]).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].unique_id, "A1");
    }
}
