//! Activity model
//!
//! The unit of work tracked by FieldTrack. Identity is the immutable
//! `unique_id`, assigned centrally at creation and never reused. Ownership
//! is the `assigned_to` username; it is the sole conflict-avoidance
//! mechanism between users and can change between sync cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity entity
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Immutable identity, assigned at creation
    pub unique_id: String,
    pub project_id: i64,
    /// Owning username; empty means unassigned
    pub assigned_to: String,
    pub description: String,
    pub discipline: String,
    pub area: String,
    /// Budgeted man-hours
    pub budget_mhs: f64,
    pub quantity: f64,
    /// Unit of measure for `quantity`
    pub uom: String,
    /// Earned quantity entered or derived
    pub earn_qty_entry: f64,
    /// Percent complete, always within [0, 100]
    pub percent_entry: f64,
    /// Earned man-hours derived from percent and budget
    pub earn_mhs_calc: f64,
    pub client_equiv_qty: f64,
    pub client_equiv_earn_qty: f64,
    pub deleted: bool,
    pub updated_by: String,
    pub updated_utc_date: DateTime<Utc>,
    /// Central-store change counter; 0 for rows never pushed
    pub sync_version: i64,
}

impl Activity {
    pub fn new(unique_id: impl Into<String>, project_id: i64) -> Self {
        Self {
            unique_id: unique_id.into(),
            project_id,
            updated_utc_date: Utc::now(),
            ..Default::default()
        }
    }

    /// Stamp provenance of the latest mutation
    pub fn touch(&mut self, username: &str) {
        self.updated_by = username.to_string();
        self.updated_utc_date = Utc::now();
    }
}
