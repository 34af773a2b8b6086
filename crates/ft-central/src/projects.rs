//! Central projects repository

use sqlx::PgPool;

use ft_core::FtResult;
use ft_models::Project;

/// Central projects repository
pub struct CentralProjectRepository {
    pool: PgPool,
}

impl CentralProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all projects for display and selection
    pub async fn list(&self) -> FtResult<Vec<Project>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT project_id, name FROM projects ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(project_id, name)| Project { project_id, name })
            .collect())
    }
}
