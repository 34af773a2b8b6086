//! Sync engine integration tests
//!
//! Runs the engine against an in-memory SQLite local store and a
//! HashMap-backed central gateway.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use ft_central::{CentralGateway, UpsertOutcome};
use ft_core::{EngineError, FtResult, SessionContext, SyncConfig};
use ft_local::LocalStore;
use ft_models::{Activity, ProgressSnapshot, Project};
use ft_sync::{SyncEngine, SyncOptions};

struct MockGateway {
    activities: Mutex<HashMap<String, Activity>>,
    next_version: AtomicI64,
    offline: AtomicBool,
    reject: Mutex<HashSet<String>>,
}

impl MockGateway {
    fn new() -> Self {
        Self {
            activities: Mutex::new(HashMap::new()),
            next_version: AtomicI64::new(1),
            offline: AtomicBool::new(false),
            reject: Mutex::new(HashSet::new()),
        }
    }

    /// Seed a central row with an explicit version, as another user's
    /// already-synced edit would leave it.
    fn seed(&self, activity: Activity) {
        let version = activity.sync_version;
        self.next_version
            .fetch_max(version + 1, Ordering::SeqCst);
        self.activities
            .lock()
            .unwrap()
            .insert(activity.unique_id.clone(), activity);
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn reject_pushes_of(&self, unique_id: &str) {
        self.reject.lock().unwrap().insert(unique_id.to_string());
    }

    fn central_quantity(&self, unique_id: &str) -> Option<f64> {
        self.activities
            .lock()
            .unwrap()
            .get(unique_id)
            .map(|a| a.quantity)
    }
}

#[async_trait]
impl CentralGateway for MockGateway {
    async fn ping(&self) -> FtResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EngineError::connectivity("central store unreachable"));
        }
        Ok(())
    }

    async fn upsert_activity(
        &self,
        activity: &Activity,
        updated_by: &str,
    ) -> FtResult<UpsertOutcome> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EngineError::connectivity("central store unreachable"));
        }
        if self.reject.lock().unwrap().contains(&activity.unique_id) {
            return Err(EngineError::validation("constraint violation"));
        }

        let mut stored = activity.clone();
        stored.sync_version = self.next_version.fetch_add(1, Ordering::SeqCst);
        stored.updated_by = updated_by.to_string();

        let existed = self
            .activities
            .lock()
            .unwrap()
            .insert(stored.unique_id.clone(), stored)
            .is_some();

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    async fn fetch_activities_since(
        &self,
        project_id: i64,
        newer_than: i64,
        owner: Option<&str>,
    ) -> FtResult<Vec<Activity>> {
        let mut rows: Vec<Activity> = self
            .activities
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.project_id == project_id && a.sync_version > newer_than)
            .filter(|a| owner.map_or(true, |o| a.assigned_to == o))
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.sync_version);
        Ok(rows)
    }

    async fn latest_sync_version(&self, project_id: i64) -> FtResult<i64> {
        Ok(self
            .activities
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.project_id == project_id)
            .map(|a| a.sync_version)
            .max()
            .unwrap_or(0))
    }

    async fn ownership_of(&self, unique_ids: &[String]) -> FtResult<HashMap<String, String>> {
        let activities = self.activities.lock().unwrap();
        Ok(unique_ids
            .iter()
            .filter_map(|id| {
                activities
                    .get(id)
                    .filter(|a| !a.deleted)
                    .map(|a| (id.clone(), a.assigned_to.clone()))
            })
            .collect())
    }

    async fn capture_snapshots(
        &self,
        _username: &str,
        _week_end_date: NaiveDate,
        _captured_by: &str,
    ) -> FtResult<u64> {
        Ok(0)
    }

    async fn load_snapshots(
        &self,
        _username: &str,
        _week_end_date: NaiveDate,
    ) -> FtResult<Vec<ProgressSnapshot>> {
        Ok(Vec::new())
    }

    async fn list_projects(&self) -> FtResult<Vec<Project>> {
        Ok(vec![Project::new(1, "Alpha"), Project::new(2, "Beta")])
    }
}

fn activity(id: &str, project: i64, owner: &str, quantity: f64, version: i64) -> Activity {
    let mut a = Activity::new(id, project);
    a.assigned_to = owner.to_string();
    a.quantity = quantity;
    a.sync_version = version;
    a
}

async fn engine_with(gateway: Arc<MockGateway>) -> (SyncEngine, LocalStore) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let local = LocalStore::open_in_memory().await.unwrap();
    let engine = SyncEngine::new(gateway, local.clone(), SyncConfig::default());
    (engine, local)
}

#[tokio::test]
async fn test_push_runs_before_pull_and_protects_dirty_edit() {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed(activity("A1", 1, "alice", 10.0, 1));

    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");
    let options = SyncOptions::default();

    // First sync mirrors the central row locally.
    engine.sync(&session, &[1], None, &options).await.unwrap();

    // Local edit, then a concurrent central edit by someone else.
    let mut edited = local.activities().get("A1").await.unwrap().unwrap();
    edited.quantity = 100.0;
    local.activities().save_edit(&edited, "alice").await.unwrap();
    gateway.seed(activity("A1", 1, "alice", 55.0, 2));

    let outcome = engine.sync(&session, &[1], None, &options).await.unwrap();

    // The dirty edit was pushed first, so the pull saw the pushed state and
    // the stale central value never overwrote the local edit.
    assert_eq!(outcome.push.updated, 1);
    assert!(outcome.push.failed.is_empty());

    let cached = local.activities().get("A1").await.unwrap().unwrap();
    assert_eq!(cached.quantity, 100.0);
    assert_eq!(gateway.central_quantity("A1"), Some(100.0));
    assert!(!local.dirty().is_dirty("A1").await.unwrap());
}

#[tokio::test]
async fn test_failed_push_is_collected_and_record_stays_dirty() {
    let gateway = Arc::new(MockGateway::new());
    gateway.reject_pushes_of("A1");

    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");

    local
        .activities()
        .save_edit(&activity("A1", 1, "alice", 5.0, 0), "alice")
        .await
        .unwrap();
    local
        .activities()
        .save_edit(&activity("A2", 1, "alice", 6.0, 0), "alice")
        .await
        .unwrap();

    let outcome = engine
        .sync(&session, &[1], None, &SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.push.inserted, 1);
    assert_eq!(outcome.push.failed.len(), 1);
    assert_eq!(outcome.push.failed[0].unique_id, "A1");
    assert!(!outcome.push.failed[0].message.is_empty());

    // The rejected record keeps its dirty flag for the next attempt.
    assert!(local.dirty().is_dirty("A1").await.unwrap());
    assert!(!local.dirty().is_dirty("A2").await.unwrap());
}

#[tokio::test]
async fn test_owner_filter_restricts_pull_and_cleans_foreign_rows() {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed(activity("A1", 1, "alice", 1.0, 1));
    gateway.seed(activity("A2", 1, "bob", 2.0, 2));

    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");
    let options = SyncOptions::default();

    // Full sync first: both rows land locally.
    engine.sync(&session, &[1], None, &options).await.unwrap();
    assert!(local.activities().get("A2").await.unwrap().is_some());

    // New central rows for both users.
    gateway.seed(activity("A3", 1, "alice", 3.0, 3));
    gateway.seed(activity("A4", 1, "bob", 4.0, 4));

    let outcome = engine
        .sync(&session, &[1], Some("alice"), &options)
        .await
        .unwrap();

    // Only alice's new row was pulled, and bob's previously pulled row was
    // removed by the post-filter cleanup.
    assert_eq!(outcome.pull.pulled, 1);
    assert!(local.activities().get("A3").await.unwrap().is_some());
    assert!(local.activities().get("A4").await.unwrap().is_none());
    assert!(local.activities().get("A2").await.unwrap().is_none());
    assert!(local.activities().get("A1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_disabling_owner_filter_resets_cursor_for_full_pull() {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed(activity("B1", 1, "bob", 1.0, 1));
    gateway.seed(activity("A1", 1, "alice", 2.0, 2));

    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");
    let options = SyncOptions::default();

    // Owner-only sync advances the cursor past bob's older row without ever
    // fetching it.
    engine
        .sync(&session, &[1], Some("alice"), &options)
        .await
        .unwrap();
    assert_eq!(local.settings().pull_cursor(1).await.unwrap(), 2);
    assert!(local.activities().get("B1").await.unwrap().is_none());
    assert!(local.settings().owner_only_sync().await.unwrap());

    // Turning the filter off forces a full pull that recovers the excluded
    // record.
    let outcome = engine.sync(&session, &[1], None, &options).await.unwrap();
    assert!(outcome.pull.pulled >= 1);
    assert!(local.activities().get("B1").await.unwrap().is_some());
    assert!(!local.settings().owner_only_sync().await.unwrap());
}

#[tokio::test]
async fn test_connectivity_failure_aborts_with_no_changes() {
    let gateway = Arc::new(MockGateway::new());
    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");

    local
        .activities()
        .save_edit(&activity("A1", 1, "alice", 5.0, 0), "alice")
        .await
        .unwrap();
    local.settings().set_pull_cursor(1, 9).await.unwrap();

    gateway.set_offline(true);
    let result = engine
        .sync(&session, &[1], None, &SyncOptions::default())
        .await;

    assert!(matches!(result, Err(EngineError::Connectivity { .. })));
    assert!(local.dirty().is_dirty("A1").await.unwrap());
    assert_eq!(local.settings().pull_cursor(1).await.unwrap(), 9);
}

#[tokio::test]
async fn test_deselection_report_then_removal() {
    let gateway = Arc::new(MockGateway::new());
    let (engine, local) = engine_with(gateway.clone()).await;

    local
        .activities()
        .save_edit(&activity("A1", 1, "alice", 1.0, 0), "alice")
        .await
        .unwrap();
    let clean = activity("A2", 1, "alice", 2.0, 1);
    let mut conn = local.pool().acquire().await.unwrap();
    local
        .activities()
        .apply_pull(&mut conn, &clean)
        .await
        .unwrap();
    drop(conn);
    local
        .activities()
        .save_edit(&activity("B1", 2, "alice", 3.0, 0), "alice")
        .await
        .unwrap();
    local.settings().set_pull_cursor(1, 5).await.unwrap();

    let report = engine.deselection_report(&[1, 2]).await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].project_id, 1);
    assert_eq!(report[0].dirty_count, 1);
    assert_eq!(report[1].dirty_count, 1);

    let removed = engine.remove_projects(&[1]).await.unwrap();
    assert_eq!(removed, 2);
    assert!(local.activities().get("A1").await.unwrap().is_none());
    assert!(local.activities().get("B1").await.unwrap().is_some());
    // Cursor reset alongside the rows.
    assert_eq!(local.settings().pull_cursor(1).await.unwrap(), 0);
}

#[tokio::test]
async fn test_cancellation_checked_between_records() {
    let gateway = Arc::new(MockGateway::new());
    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");

    local
        .activities()
        .save_edit(&activity("A1", 1, "alice", 1.0, 0), "alice")
        .await
        .unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let result = engine
        .sync(&session, &[1], None, &SyncOptions::with_cancel(token))
        .await;

    assert!(matches!(result, Err(EngineError::Cancelled)));
    assert!(local.dirty().is_dirty("A1").await.unwrap());
}

#[tokio::test]
async fn test_progress_reported_per_phase() {
    let gateway = Arc::new(MockGateway::new());
    gateway.seed(activity("A1", 1, "alice", 1.0, 1));

    let (engine, local) = engine_with(gateway.clone()).await;
    let session = SessionContext::new("alice");

    local
        .activities()
        .save_edit(&activity("A2", 1, "alice", 2.0, 0), "alice")
        .await
        .unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let options = SyncOptions::with_progress(Arc::new(move |report| {
        sink.lock().unwrap().push((report.phase, report.done, report.total));
    }));

    engine.sync(&session, &[1], None, &options).await.unwrap();

    let events = events.lock().unwrap();
    assert!(events
        .iter()
        .any(|(phase, _, _)| *phase == ft_sync::SyncPhase::Push));
    assert!(events
        .iter()
        .any(|(phase, _, _)| *phase == ft_sync::SyncPhase::Pull));
}
