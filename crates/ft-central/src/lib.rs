//! # ft-central
//!
//! Central store gateway for FieldTrack RS.
//!
//! The shared relational service is reached through the [`CentralGateway`]
//! trait; the engines never see a connection pool. The PostgreSQL
//! implementation lives here, split per table the way the rest of the data
//! layer is:
//!
//! - [`pool`]: connection pool management and reachability checks
//! - [`activities`]: upsert, incremental fetch, batched ownership lookups
//! - [`snapshots`]: set-based snapshot capture and loading
//! - [`projects`]: project listing and per-project version tracking
//!
//! Conceptual schema:
//!
//! ```sql
//! activities(unique_id PK, project_id, assigned_to, description, discipline,
//!            area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry,
//!            earn_mhs_calc, client_equiv_qty, client_equiv_earn_qty, deleted,
//!            updated_by, updated_utc_date, sync_version)
//! progress_snapshots(unique_id, week_end_date, ...same progress fields...,
//!                    captured_by, captured_utc_date,
//!                    PRIMARY KEY (unique_id, week_end_date))
//! projects(project_id PK, name)
//! ```
//!
//! `sync_version` is drawn from the `activities_sync_seq` sequence on every
//! write, giving pull cursors a monotonic, store-wide ordering.

pub mod activities;
pub mod gateway;
pub mod pool;
pub mod projects;
pub mod snapshots;

pub use gateway::{CentralGateway, PgCentralGateway, UpsertOutcome};
pub use pool::CentralDatabase;
