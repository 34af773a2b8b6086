//! Progress reporting and cooperative cancellation
//!
//! Long phases run off the control thread and report coarse progress
//! through a callback. Cancellation is checked between discrete units of
//! work only; a batch already inside a transaction always finishes or rolls
//! back as a whole.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ft_core::{EngineError, FtResult};

/// Phase of a sync cycle, for progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Push,
    Pull,
    Cleanup,
}

/// Coarse progress event
#[derive(Debug, Clone, Copy)]
pub struct ProgressReport {
    pub phase: SyncPhase,
    pub done: usize,
    pub total: usize,
}

/// Progress callback invoked between units of work
pub type ProgressFn = Arc<dyn Fn(ProgressReport) + Send + Sync>;

/// Per-invocation options for engine operations
#[derive(Clone, Default)]
pub struct SyncOptions {
    pub progress: Option<ProgressFn>,
    pub cancel: CancellationToken,
}

impl SyncOptions {
    pub fn with_progress(progress: ProgressFn) -> Self {
        Self {
            progress: Some(progress),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            progress: None,
            cancel,
        }
    }

    pub(crate) fn report(&self, phase: SyncPhase, done: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(ProgressReport { phase, done, total });
        }
    }

    pub(crate) fn check_cancelled(&self) -> FtResult<()> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }
}
