//! # ft-snapshots
//!
//! Weekly snapshot capture and the revert engine for FieldTrack RS.
//!
//! Capture freezes a user's current progress rows on the central store under
//! a week-end date; it is set-based and idempotent, so re-running it for the
//! same week adds only the rows that are not frozen yet. Revert loads a
//! frozen set, checks current ownership record by record, and writes the
//! restorable subset back onto the local cache in a single transaction.
//! Restored rows come back dirty and flow to the central store on the next
//! sync.

pub mod capture;
pub mod revert;

pub use capture::{CaptureOutcome, SnapshotService};
pub use revert::{RevertEngine, RevertProgressFn, RevertResult, SkippedRecord};
