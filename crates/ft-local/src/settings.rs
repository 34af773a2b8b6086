//! Persisted settings and sync cursors
//!
//! Opaque key/value pairs in the local store. The typed helpers cover the
//! per-project pull cursor (`last_pulled_sync_version_{project_id}`) and the
//! owner-only sync preference. Resetting a cursor to absent forces a full
//! pull on the next sync.

use sqlx::{SqliteConnection, SqlitePool};

use ft_core::FtResult;

const OWNER_ONLY_KEY: &str = "owner_only_sync";

fn cursor_key(project_id: i64) -> String {
    format!("last_pulled_sync_version_{project_id}")
}

/// Key/value settings store
pub struct SettingsStore {
    pool: SqlitePool,
}

impl SettingsStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> FtResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> FtResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> FtResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Most recent central version already pulled for a project; 0 when the
    /// cursor is absent (full pull)
    pub async fn pull_cursor(&self, project_id: i64) -> FtResult<i64> {
        let raw = self.get(&cursor_key(project_id)).await?;
        Ok(raw.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    pub async fn set_pull_cursor(&self, project_id: i64, version: i64) -> FtResult<()> {
        self.set(&cursor_key(project_id), &version.to_string()).await
    }

    /// Cursor write on a caller-owned transaction, so the cursor advances
    /// atomically with the pulled batch it belongs to
    pub async fn set_pull_cursor_in(
        &self,
        conn: &mut SqliteConnection,
        project_id: i64,
        version: i64,
    ) -> FtResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(cursor_key(project_id))
        .bind(version.to_string())
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Drop the cursor so the next pull fetches everything
    pub async fn reset_pull_cursor(&self, project_id: i64) -> FtResult<()> {
        self.remove(&cursor_key(project_id)).await
    }

    /// Whether the last sync ran in owner-only mode
    pub async fn owner_only_sync(&self) -> FtResult<bool> {
        Ok(self.get(OWNER_ONLY_KEY).await?.as_deref() == Some("1"))
    }

    pub async fn set_owner_only_sync(&self, enabled: bool) -> FtResult<()> {
        self.set(OWNER_ONLY_KEY, if enabled { "1" } else { "0" }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    #[tokio::test]
    async fn test_cursor_roundtrip_and_reset() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let settings = store.settings();

        assert_eq!(settings.pull_cursor(7).await.unwrap(), 0);

        settings.set_pull_cursor(7, 42).await.unwrap();
        assert_eq!(settings.pull_cursor(7).await.unwrap(), 42);

        settings.reset_pull_cursor(7).await.unwrap();
        assert_eq!(settings.pull_cursor(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_owner_only_flag() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let settings = store.settings();

        assert!(!settings.owner_only_sync().await.unwrap());
        settings.set_owner_only_sync(true).await.unwrap();
        assert!(settings.owner_only_sync().await.unwrap());
        settings.set_owner_only_sync(false).await.unwrap();
        assert!(!settings.owner_only_sync().await.unwrap());
    }

    #[tokio::test]
    async fn test_cursors_are_per_project() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let settings = store.settings();

        settings.set_pull_cursor(1, 10).await.unwrap();
        settings.set_pull_cursor(2, 20).await.unwrap();

        assert_eq!(settings.pull_cursor(1).await.unwrap(), 10);
        assert_eq!(settings.pull_cursor(2).await.unwrap(), 20);
    }
}
