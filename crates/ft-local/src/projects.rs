//! Local projects mirror
//!
//! Display-name reference table refreshed from the central store after a
//! sync. A refresh failure is housekeeping, not a sync failure; callers log
//! it and move on.

use sqlx::SqlitePool;

use ft_core::FtResult;
use ft_models::Project;

/// Local projects repository
pub struct LocalProjectRepository {
    pool: SqlitePool,
}

impl LocalProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace the whole mirror with the central project list
    pub async fn replace_all(&self, projects: &[Project]) -> FtResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
        for project in projects {
            sqlx::query("INSERT INTO projects (project_id, name) VALUES (?, ?)")
                .bind(project.project_id)
                .bind(&project.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn list(&self) -> FtResult<Vec<Project>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT project_id, name FROM projects ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(project_id, name)| Project { project_id, name })
            .collect())
    }
}
