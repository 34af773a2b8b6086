//! Progress Snapshot model
//!
//! An immutable, dated copy of an Activity's progress-relevant fields,
//! keyed by (`unique_id`, `week_end_date`). Snapshots are created by the
//! capture operation, never mutated, and form a restore-point history
//! across different week-end dates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;

/// Point-in-time copy of an Activity's progress fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub unique_id: String,
    pub week_end_date: NaiveDate,
    pub project_id: i64,
    /// Owner at capture time; current ownership is looked up live at revert
    pub assigned_to: String,
    pub description: String,
    pub budget_mhs: f64,
    pub quantity: f64,
    pub uom: String,
    pub earn_qty_entry: f64,
    pub percent_entry: f64,
    pub earn_mhs_calc: f64,
    pub client_equiv_qty: f64,
    pub client_equiv_earn_qty: f64,
    pub captured_by: String,
    pub captured_utc_date: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Freeze the progress fields of an activity for a given week
    pub fn capture(activity: &Activity, week_end_date: NaiveDate, captured_by: &str) -> Self {
        Self {
            unique_id: activity.unique_id.clone(),
            week_end_date,
            project_id: activity.project_id,
            assigned_to: activity.assigned_to.clone(),
            description: activity.description.clone(),
            budget_mhs: activity.budget_mhs,
            quantity: activity.quantity,
            uom: activity.uom.clone(),
            earn_qty_entry: activity.earn_qty_entry,
            percent_entry: activity.percent_entry,
            earn_mhs_calc: activity.earn_mhs_calc,
            client_equiv_qty: activity.client_equiv_qty,
            client_equiv_earn_qty: activity.client_equiv_earn_qty,
            captured_by: captured_by.to_string(),
            captured_utc_date: Utc::now(),
        }
    }

    /// Write the frozen progress values back onto an activity, re-deriving
    /// downstream fields. Identity and ownership are left alone; the caller
    /// stamps provenance and dirty state.
    pub fn restore_onto(&self, activity: &mut Activity) {
        activity.budget_mhs = self.budget_mhs;
        activity.quantity = self.quantity;
        activity.uom = self.uom.clone();
        activity.earn_qty_entry = self.earn_qty_entry;
        activity.percent_entry = self.percent_entry;
        activity.client_equiv_qty = self.client_equiv_qty;
        activity.recalculate();
    }

    /// Reconstruct a local activity row from the snapshot alone, for the
    /// case where the record is absent from the local cache at revert time.
    pub fn to_activity(&self) -> Activity {
        let mut activity = Activity::new(self.unique_id.clone(), self.project_id);
        activity.assigned_to = self.assigned_to.clone();
        activity.description = self.description.clone();
        self.restore_onto(&mut activity);
        activity
    }
}
