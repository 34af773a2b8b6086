//! Sync result types
//!
//! Outcomes are reported via counts and per-record failure lists, not
//! exceptions: a mid-batch failure leaves already-committed work intact and
//! shows up here.

use serde::Serialize;

/// A record that failed to push, with enough identity to report to the user
#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    pub unique_id: String,
    pub description: String,
    pub message: String,
}

/// Outcome of the push phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct PushResult {
    /// Records with no prior central row
    pub inserted: u64,
    /// Records that replaced an existing central row
    pub updated: u64,
    /// Records the central store rejected; they stay dirty locally
    pub failed: Vec<FailedRecord>,
}

impl PushResult {
    pub fn pushed(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Outcome of the pull phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullResult {
    /// Central rows applied to the local cache
    pub pulled: u64,
    /// Central rows skipped because the local copy holds an unpushed edit
    pub skipped_dirty: u64,
}

/// Combined outcome of one sync cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutcome {
    pub push: PushResult,
    pub pull: PullResult,
}

/// Unsynced-edit loss that removing a project would incur
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectLossReport {
    pub project_id: i64,
    pub dirty_count: i64,
}
