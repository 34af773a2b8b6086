//! Revert engine
//!
//! Restores a captured week onto the local cache. Ownership is checked live
//! against the central store at revert time, not against the owner recorded
//! in the snapshot: records reassigned since capture are skipped (with the
//! current owner named in the reason), records deleted since capture are
//! skipped as gone. Admin sessions restore regardless of assignment.
//!
//! All restorable rows are written in one local transaction. A failure on
//! any row rolls the whole batch back, so the cache never holds a partially
//! reverted week.
//!
//! Callers are expected to sync before reverting; a stale cursor does not
//! break the restore itself but leaves the next sync pushing the reverted
//! values over whatever the central store holds.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use ft_central::CentralGateway;
use ft_core::{EngineError, FtResult, SessionContext, SyncConfig, UserSession};
use ft_local::LocalStore;
use ft_models::ProgressSnapshot;

/// Callback fired as restores are written: (records done, records total).
pub type RevertProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// One snapshot record the revert declined to restore
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedRecord {
    pub unique_id: String,
    pub description: String,
    /// Human-readable, e.g. "Now assigned to jsmith"
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevertResult {
    pub restored_count: u64,
    pub skipped: Vec<SkippedRecord>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl RevertResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            restored_count: 0,
            skipped: Vec::new(),
            success: false,
            error_message: Some(message.into()),
        }
    }
}

pub struct RevertEngine {
    gateway: Arc<dyn CentralGateway>,
    local: LocalStore,
    config: SyncConfig,
}

impl RevertEngine {
    pub fn new(gateway: Arc<dyn CentralGateway>, local: LocalStore, config: SyncConfig) -> Self {
        Self {
            gateway,
            local,
            config,
        }
    }

    /// Restore the session user's snapshot set for `week_end_date`.
    ///
    /// Connectivity and load failures surface as errors; an empty snapshot
    /// set and a failed write batch are reported in-band through
    /// [`RevertResult`] so callers can show them without unwinding.
    pub async fn revert(
        &self,
        session: &SessionContext,
        week_end_date: NaiveDate,
        progress: Option<&RevertProgressFn>,
    ) -> FtResult<RevertResult> {
        let snapshots = self
            .gateway
            .load_snapshots(session.username(), week_end_date)
            .await?;

        if snapshots.is_empty() {
            tracing::warn!(user = session.username(), %week_end_date, "no snapshot to revert");
            return Ok(RevertResult::failed(format!(
                "No snapshot found for week ending {week_end_date}"
            )));
        }

        let (to_restore, skipped) = self.categorize(session, &snapshots).await?;

        tracing::info!(
            user = session.username(),
            %week_end_date,
            total = snapshots.len(),
            restorable = to_restore.len(),
            skipped = skipped.len(),
            "revert categorized"
        );

        match self.apply_restores(session, &to_restore, progress).await {
            Ok(restored_count) => Ok(RevertResult {
                restored_count,
                skipped,
                success: true,
                error_message: None,
            }),
            Err(err) => {
                let err = EngineError::consistency(format!(
                    "revert aborted, no records were changed: {err}"
                ));
                tracing::error!(user = session.username(), %week_end_date, %err, "revert failed");
                Ok(RevertResult {
                    restored_count: 0,
                    skipped,
                    success: false,
                    error_message: Some(err.to_string()),
                })
            }
        }
    }

    /// Capture today's state as a backup, then revert. The backup lands
    /// under today's date and can itself be reverted to if the restore was
    /// a mistake.
    pub async fn revert_with_backup(
        &self,
        session: &SessionContext,
        week_end_date: NaiveDate,
        progress: Option<&RevertProgressFn>,
    ) -> FtResult<RevertResult> {
        let today = Utc::now().date_naive();
        let backed_up = self
            .gateway
            .capture_snapshots(session.username(), today, session.username())
            .await?;
        tracing::info!(user = session.username(), %today, backed_up, "pre-revert backup captured");

        self.revert(session, week_end_date, progress).await
    }

    /// Split a snapshot set by live ownership. Lookups go to the central
    /// store in chunks so arbitrarily large sets stay within statement
    /// parameter limits.
    async fn categorize(
        &self,
        session: &SessionContext,
        snapshots: &[ProgressSnapshot],
    ) -> FtResult<(Vec<ProgressSnapshot>, Vec<SkippedRecord>)> {
        let ids: Vec<String> = snapshots.iter().map(|s| s.unique_id.clone()).collect();
        let chunk_size = self.config.ownership_chunk_size.max(1);

        let mut owners = std::collections::HashMap::new();
        for chunk in ids.chunks(chunk_size) {
            owners.extend(self.gateway.ownership_of(chunk).await?);
        }

        let mut to_restore = Vec::new();
        let mut skipped = Vec::new();
        for snapshot in snapshots {
            match owners.get(&snapshot.unique_id) {
                None => skipped.push(SkippedRecord {
                    unique_id: snapshot.unique_id.clone(),
                    description: snapshot.description.clone(),
                    reason: "Activity no longer exists".to_string(),
                }),
                Some(owner) if session.owns(owner) => to_restore.push(snapshot.clone()),
                Some(owner) => skipped.push(SkippedRecord {
                    unique_id: snapshot.unique_id.clone(),
                    description: snapshot.description.clone(),
                    reason: if owner.is_empty() {
                        "No longer assigned".to_string()
                    } else {
                        format!("Now assigned to {owner}")
                    },
                }),
            }
        }

        Ok((to_restore, skipped))
    }

    /// Write every restorable row in one transaction. Any error leaves the
    /// cache exactly as it was.
    async fn apply_restores(
        &self,
        session: &SessionContext,
        to_restore: &[ProgressSnapshot],
        progress: Option<&RevertProgressFn>,
    ) -> FtResult<u64> {
        if to_restore.is_empty() {
            return Ok(0);
        }

        let repo = self.local.activities();
        let total = to_restore.len() as u64;
        let mut tx = self.local.pool().begin().await?;

        for (index, snapshot) in to_restore.iter().enumerate() {
            repo.apply_restore(&mut tx, snapshot, session.username())
                .await?;
            if let Some(report) = progress {
                report(index as u64 + 1, total);
            }
        }

        tx.commit().await?;
        Ok(total)
    }
}
