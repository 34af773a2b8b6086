//! Sync engine
//!
//! Orchestrates one sync cycle against the central store for a selected set
//! of projects. Push runs before pull in the same cycle so a dirty record's
//! central row already carries the local edit by the time pull reads it.

use std::sync::Arc;

use ft_central::{CentralGateway, UpsertOutcome};
use ft_core::{FtResult, SessionContext, SyncConfig, UserSession};
use ft_local::LocalStore;

use crate::progress::{SyncOptions, SyncPhase};
use crate::result::{FailedRecord, ProjectLossReport, PullResult, PushResult, SyncOutcome};

/// Push/pull orchestrator
///
/// One engine per local store; the caller serializes invocations (no two
/// sync operations may run concurrently against the same local store).
pub struct SyncEngine {
    gateway: Arc<dyn CentralGateway>,
    local: LocalStore,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(gateway: Arc<dyn CentralGateway>, local: LocalStore, config: SyncConfig) -> Self {
        Self {
            gateway,
            local,
            config,
        }
    }

    /// Run a full sync cycle: push dirty records, then pull central changes
    /// for the selected projects.
    ///
    /// `owner_filter` restricts the pull to records currently assigned to
    /// that owner; push is never filtered, because a dirty record carries a
    /// local edit that must reach the central store regardless of who owns
    /// the record now. Turning the filter off after syncing with it on
    /// forces a full pull for the selected projects.
    pub async fn sync(
        &self,
        session: &SessionContext,
        project_ids: &[i64],
        owner_filter: Option<&str>,
        options: &SyncOptions,
    ) -> FtResult<SyncOutcome> {
        // A connectivity failure here aborts the whole cycle before any
        // write or cursor movement.
        self.gateway.ping().await?;

        tracing::info!(
            username = session.username(),
            projects = ?project_ids,
            owner_only = owner_filter.is_some(),
            "sync started"
        );

        let push = self.push_records(session, project_ids, options).await?;

        self.apply_filter_transition(project_ids, owner_filter.is_some())
            .await?;

        let pull = self
            .pull_records(session, project_ids, owner_filter, options)
            .await?;

        if let Some(owner) = owner_filter {
            options.report(SyncPhase::Cleanup, 0, 1);
            let removed = self
                .local
                .activities()
                .delete_not_owned(project_ids, owner)
                .await?;
            if removed > 0 {
                tracing::info!(removed, "dropped locally cached records not owned by user");
            }
            options.report(SyncPhase::Cleanup, 1, 1);
        }

        self.refresh_project_mirror().await;

        tracing::info!(
            pushed = push.pushed(),
            push_failed = push.failed.len(),
            pulled = pull.pulled,
            skipped_dirty = pull.skipped_dirty,
            "sync finished"
        );

        Ok(SyncOutcome { push, pull })
    }

    /// Push every locally dirty record in the selected projects.
    ///
    /// Per-record store rejections are collected, not raised; the dirty
    /// flag is cleared only for records the central store confirmed.
    pub async fn push_records(
        &self,
        session: &SessionContext,
        project_ids: &[i64],
        options: &SyncOptions,
    ) -> FtResult<PushResult> {
        let dirty = self.local.dirty().dirty_in_projects(project_ids).await?;
        let total = dirty.len();
        let mut result = PushResult::default();

        for (done, record) in dirty.iter().enumerate() {
            options.check_cancelled()?;

            match self
                .gateway
                .upsert_activity(record, session.username())
                .await
            {
                Ok(UpsertOutcome::Inserted) => {
                    result.inserted += 1;
                    self.local
                        .dirty()
                        .clear_dirty(std::slice::from_ref(&record.unique_id))
                        .await?;
                }
                Ok(UpsertOutcome::Updated) => {
                    result.updated += 1;
                    self.local
                        .dirty()
                        .clear_dirty(std::slice::from_ref(&record.unique_id))
                        .await?;
                }
                Err(e) => {
                    tracing::warn!(
                        unique_id = %record.unique_id,
                        error = %e,
                        "push rejected for record"
                    );
                    result.failed.push(FailedRecord {
                        unique_id: record.unique_id.clone(),
                        description: record.description.clone(),
                        message: e.to_string(),
                    });
                }
            }

            options.report(SyncPhase::Push, done + 1, total);
        }

        Ok(result)
    }

    /// Pull central changes newer than each project's cursor and apply them
    /// to the local cache, skipping rows with unpushed local edits.
    ///
    /// Each project's batch commits in one transaction together with its
    /// cursor advance; a failure mid-cycle leaves earlier projects intact.
    pub async fn pull_records(
        &self,
        _session: &SessionContext,
        project_ids: &[i64],
        owner_filter: Option<&str>,
        options: &SyncOptions,
    ) -> FtResult<PullResult> {
        let activities = self.local.activities();
        let settings = self.local.settings();
        let total = project_ids.len();
        let mut result = PullResult::default();

        for (done, &project_id) in project_ids.iter().enumerate() {
            options.check_cancelled()?;

            let cursor = settings.pull_cursor(project_id).await?;
            let fetched = self
                .gateway
                .fetch_activities_since(project_id, cursor, owner_filter)
                .await?;

            if fetched.is_empty() {
                options.report(SyncPhase::Pull, done + 1, total);
                continue;
            }

            // Rows are applied in cursor order, one transaction per batch,
            // with the cursor advanced inside the same transaction. A
            // failure mid-project leaves earlier committed batches and
            // their cursor intact; the upsert is idempotent, so re-pulling
            // a batch is safe.
            let mut latest = cursor;
            for batch in fetched.chunks(self.config.pull_batch_size.max(1)) {
                options.check_cancelled()?;

                let mut tx = self.local.pool().begin().await?;
                for activity in batch {
                    if activities.apply_pull(&mut tx, activity).await? {
                        result.pulled += 1;
                    } else {
                        result.skipped_dirty += 1;
                    }
                    latest = latest.max(activity.sync_version);
                }
                settings
                    .set_pull_cursor_in(&mut tx, project_id, latest)
                    .await?;
                tx.commit().await?;
            }

            options.report(SyncPhase::Pull, done + 1, total);
        }

        Ok(result)
    }

    /// Dirty-row loss the user must acknowledge before projects are removed
    /// from the selected set.
    pub async fn deselection_report(
        &self,
        project_ids: &[i64],
    ) -> FtResult<Vec<ProjectLossReport>> {
        let counts = self
            .local
            .dirty()
            .dirty_counts_for_projects(project_ids)
            .await?;

        Ok(project_ids
            .iter()
            .map(|&project_id| ProjectLossReport {
                project_id,
                dirty_count: counts
                    .iter()
                    .find(|(id, _)| *id == project_id)
                    .map(|(_, count)| *count)
                    .unwrap_or(0),
            })
            .collect())
    }

    /// Remove de-selected projects from the local cache and reset their
    /// cursors. Irreversible locally, so callers must surface the
    /// [`deselection_report`](Self::deselection_report) first.
    pub async fn remove_projects(&self, project_ids: &[i64]) -> FtResult<u64> {
        let removed = self
            .local
            .activities()
            .delete_for_projects(project_ids)
            .await?;

        for &project_id in project_ids {
            self.local.settings().reset_pull_cursor(project_id).await?;
        }

        tracing::info!(projects = ?project_ids, removed, "projects removed from local cache");
        Ok(removed)
    }

    /// Detect the owner-only OFF transition: records excluded by earlier
    /// filtered pulls were never retrieved, so the cursors must be reset to
    /// force a full pull.
    async fn apply_filter_transition(
        &self,
        project_ids: &[i64],
        owner_only: bool,
    ) -> FtResult<()> {
        let settings = self.local.settings();
        let was_owner_only = settings.owner_only_sync().await?;

        if was_owner_only && !owner_only {
            tracing::info!("owner-only sync disabled; forcing full pull");
            for &project_id in project_ids {
                settings.reset_pull_cursor(project_id).await?;
            }
        }

        settings.set_owner_only_sync(owner_only).await
    }

    /// Local display mirror of the central project list. A failure here is
    /// housekeeping and never fails the sync.
    async fn refresh_project_mirror(&self) {
        match self.gateway.list_projects().await {
            Ok(projects) => {
                if let Err(e) = self.local.projects().replace_all(&projects).await {
                    tracing::warn!(error = %e, "project mirror refresh failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list central projects");
            }
        }
    }
}
