//! # ft-sync
//!
//! Push/pull synchronization engine for FieldTrack RS.
//!
//! One sync cycle per selected project set: push local dirty records to the
//! central store first (local edits are user intent and are never silently
//! dropped), then pull central changes newer than each project's cursor,
//! skipping rows that are still dirty locally. Ownership filtering, cursor
//! resets on filter transitions, and project de-selection live here too.

pub mod engine;
pub mod progress;
pub mod result;

pub use engine::SyncEngine;
pub use progress::{ProgressFn, ProgressReport, SyncOptions, SyncPhase};
pub use result::{FailedRecord, ProjectLossReport, PullResult, PushResult, SyncOutcome};
