//! Local store pool and schema bootstrap
//!
//! The local cache is a single SQLite file (or `sqlite::memory:` in tests).
//! The schema mirrors the central `activities` table with an added
//! `local_dirty` flag, plus the `projects` display mirror and the `settings`
//! key/value table that holds sync cursors.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use ft_core::{FtResult, LocalConfig};

use crate::activities::LocalActivityRepository;
use crate::dirty::DirtyTracker;
use crate::projects::LocalProjectRepository;
use crate::settings::SettingsStore;

const SCHEMA_SQL: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS activities (
    unique_id TEXT PRIMARY KEY,
    project_id INTEGER NOT NULL,
    assigned_to TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    discipline TEXT NOT NULL DEFAULT '',
    area TEXT NOT NULL DEFAULT '',
    budget_mhs REAL NOT NULL DEFAULT 0,
    quantity REAL NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    uom TEXT NOT NULL DEFAULT '',
    earn_qty_entry REAL NOT NULL DEFAULT 0,
    percent_entry REAL NOT NULL DEFAULT 0,
    earn_mhs_calc REAL NOT NULL DEFAULT 0,
    client_equiv_qty REAL NOT NULL DEFAULT 0,
    client_equiv_earn_qty REAL NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    updated_by TEXT NOT NULL DEFAULT '',
    updated_utc_date TEXT NOT NULL,
    sync_version INTEGER NOT NULL DEFAULT 0,
    local_dirty INTEGER NOT NULL DEFAULT 0
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_activities_project ON activities(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_activities_dirty ON activities(local_dirty)",
    r#"
CREATE TABLE IF NOT EXISTS projects (
    project_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)
"#,
    r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#,
];

/// Local embedded store
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (creating if missing) the local store and bootstrap its schema
    pub async fn open(config: &LocalConfig) -> FtResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // One logical writer per local store: sync, capture, and revert are
        // serialized by the caller, so a single connection is sufficient
        // and rules out writer races inside one operation.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        tracing::info!(url = %config.url, "local store opened");
        Ok(store)
    }

    /// In-memory store for tests and scratch sessions
    pub async fn open_in_memory() -> FtResult<Self> {
        Self::open(&LocalConfig {
            url: "sqlite::memory:".to_string(),
        })
        .await
    }

    /// Create the local tables if they do not exist yet
    pub async fn init_schema(&self) -> FtResult<()> {
        for statement in SCHEMA_SQL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn activities(&self) -> LocalActivityRepository {
        LocalActivityRepository::new(self.pool.clone())
    }

    pub fn dirty(&self) -> DirtyTracker {
        DirtyTracker::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.pool.clone())
    }

    pub fn projects(&self) -> LocalProjectRepository {
        LocalProjectRepository::new(self.pool.clone())
    }
}
