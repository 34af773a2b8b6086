//! # ft-core
//!
//! Core types, traits, and utilities for FieldTrack RS.
//!
//! Everything the sync, snapshot, and revert engines share lives here:
//! the error taxonomy, the session context that scopes every engine call
//! to an acting user, numeric helpers for the derived-field invariants,
//! and environment-driven configuration.

pub mod config;
pub mod error;
pub mod numeric;
pub mod session;

pub use config::{CentralConfig, EngineConfig, LocalConfig, SyncConfig};
pub use error::{EngineError, FtResult};
pub use numeric::{approx_eq, clamp_percent, round3, EPSILON};
pub use session::{SessionContext, UserSession};
