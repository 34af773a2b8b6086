//! Central store gateway trait
//!
//! The seam between the engines and the shared relational service. Engines
//! depend on this trait only; tests substitute an in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use ft_core::{FtResult, SyncConfig};
use ft_models::{Activity, ProgressSnapshot, Project};

use crate::activities::CentralActivityRepository;
use crate::pool::CentralDatabase;
use crate::projects::CentralProjectRepository;
use crate::snapshots::SnapshotRepository;

/// Whether an upsert created the central row or replaced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Opaque access to the shared central store
#[async_trait]
pub trait CentralGateway: Send + Sync {
    /// Reachability check; engines call this before any write so that a
    /// connectivity failure has no partial effects
    async fn ping(&self) -> FtResult<()>;

    /// Upsert one activity keyed by `unique_id`
    async fn upsert_activity(
        &self,
        activity: &Activity,
        updated_by: &str,
    ) -> FtResult<UpsertOutcome>;

    /// Fetch a project's records changed after `newer_than`, oldest first,
    /// optionally restricted to one owner
    async fn fetch_activities_since(
        &self,
        project_id: i64,
        newer_than: i64,
        owner: Option<&str>,
    ) -> FtResult<Vec<Activity>>;

    /// Highest sync version present for a project
    async fn latest_sync_version(&self, project_id: i64) -> FtResult<i64>;

    /// Current owner per `unique_id`; keys with no live central row are
    /// absent from the result
    async fn ownership_of(&self, unique_ids: &[String]) -> FtResult<HashMap<String, String>>;

    /// Set-based, idempotent snapshot capture; returns rows newly frozen
    async fn capture_snapshots(
        &self,
        username: &str,
        week_end_date: NaiveDate,
        captured_by: &str,
    ) -> FtResult<u64>;

    /// Load the snapshot set for a user and week
    async fn load_snapshots(
        &self,
        username: &str,
        week_end_date: NaiveDate,
    ) -> FtResult<Vec<ProgressSnapshot>>;

    /// List all projects
    async fn list_projects(&self) -> FtResult<Vec<Project>>;
}

/// PostgreSQL-backed central gateway
pub struct PgCentralGateway {
    db: CentralDatabase,
    activities: CentralActivityRepository,
    snapshots: SnapshotRepository,
    projects: CentralProjectRepository,
    config: SyncConfig,
}

impl PgCentralGateway {
    pub fn new(db: CentralDatabase, config: SyncConfig) -> Self {
        let pool = db.pool().clone();
        Self {
            db,
            activities: CentralActivityRepository::new(pool.clone()),
            snapshots: SnapshotRepository::new(pool.clone()),
            projects: CentralProjectRepository::new(pool),
            config,
        }
    }
}

#[async_trait]
impl CentralGateway for PgCentralGateway {
    async fn ping(&self) -> FtResult<()> {
        self.db.ping().await
    }

    async fn upsert_activity(
        &self,
        activity: &Activity,
        updated_by: &str,
    ) -> FtResult<UpsertOutcome> {
        self.activities.upsert(activity, updated_by).await
    }

    async fn fetch_activities_since(
        &self,
        project_id: i64,
        newer_than: i64,
        owner: Option<&str>,
    ) -> FtResult<Vec<Activity>> {
        self.activities
            .fetch_since(project_id, newer_than, owner)
            .await
    }

    async fn latest_sync_version(&self, project_id: i64) -> FtResult<i64> {
        self.activities.latest_sync_version(project_id).await
    }

    async fn ownership_of(&self, unique_ids: &[String]) -> FtResult<HashMap<String, String>> {
        self.activities
            .ownership_of(unique_ids, self.config.ownership_chunk_size)
            .await
    }

    async fn capture_snapshots(
        &self,
        username: &str,
        week_end_date: NaiveDate,
        captured_by: &str,
    ) -> FtResult<u64> {
        self.snapshots
            .capture(username, week_end_date, captured_by)
            .await
    }

    async fn load_snapshots(
        &self,
        username: &str,
        week_end_date: NaiveDate,
    ) -> FtResult<Vec<ProgressSnapshot>> {
        self.snapshots.load(username, week_end_date).await
    }

    async fn list_projects(&self) -> FtResult<Vec<Project>> {
        self.projects.list().await
    }
}
