//! # ft-models
//!
//! Domain models for FieldTrack RS: the `Activity` unit of work, its
//! immutable `ProgressSnapshot` copies, the derived-field calculator that
//! keeps quantity / earned quantity / percent complete consistent, and the
//! static field registry used by restore and find/replace.

pub mod activity;
pub mod calc;
pub mod fields;
pub mod project;
pub mod snapshot;

pub use activity::Activity;
pub use calc::ProgressInput;
pub use fields::{ActivityField, FieldValue};
pub use project::Project;
pub use snapshot::ProgressSnapshot;
