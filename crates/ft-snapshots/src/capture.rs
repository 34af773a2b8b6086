//! Snapshot capture service
//!
//! Thin orchestration over the gateway's set-based copy. The heavy lifting
//! (one INSERT..SELECT guarded by NOT EXISTS) runs on the central store, so
//! capture needs connectivity and fails fast without it.

use std::sync::Arc;

use chrono::NaiveDate;

use ft_central::CentralGateway;
use ft_core::{FtResult, SessionContext, UserSession};

/// Result of one capture run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Rows newly frozen for this week. Zero on a repeat run is normal and
    /// means the whole set was already captured.
    pub captured: u64,
}

pub struct SnapshotService {
    gateway: Arc<dyn CentralGateway>,
}

impl SnapshotService {
    pub fn new(gateway: Arc<dyn CentralGateway>) -> Self {
        Self { gateway }
    }

    /// Freeze the session user's current progress rows under the given
    /// week-end date. Idempotent per (user, week).
    pub async fn capture(
        &self,
        session: &SessionContext,
        week_end_date: NaiveDate,
    ) -> FtResult<CaptureOutcome> {
        let captured = self
            .gateway
            .capture_snapshots(session.username(), week_end_date, session.username())
            .await?;

        tracing::info!(
            user = session.username(),
            %week_end_date,
            captured,
            "snapshot capture finished"
        );

        Ok(CaptureOutcome { captured })
    }
}
