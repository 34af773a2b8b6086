//! # ft-local
//!
//! Local embedded store for FieldTrack RS.
//!
//! An SQLite cache holding the user's working set of activities, a
//! `local_dirty` flag per record, the mirrored project reference table, and
//! opaque persisted settings (per-project pull cursors, the owner-only sync
//! preference). One logical writer at a time: the pool is sized to a single
//! connection and every multi-row write that must be atomic runs inside an
//! explicit transaction.

pub mod activities;
pub mod dirty;
pub mod find_replace;
pub mod projects;
pub mod settings;
pub mod store;

pub use activities::LocalActivityRepository;
pub use find_replace::FindReplace;
pub use dirty::DirtyTracker;
pub use projects::LocalProjectRepository;
pub use settings::SettingsStore;
pub use store::LocalStore;
