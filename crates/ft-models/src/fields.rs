//! Static Activity field registry
//!
//! Restore and find/replace address fields by name. Rather than matching
//! free-text names against struct members at runtime, every addressable
//! field is enumerated here with a typed accessor, so an unknown name is a
//! `None` at the call site and a missing arm is a compile error.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::activity::Activity;

/// A value read from or written to a registered field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

/// Every Activity field addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityField {
    AssignedTo,
    Description,
    Discipline,
    Area,
    Uom,
    BudgetMhs,
    Quantity,
    EarnQtyEntry,
    PercentEntry,
    ClientEquivQty,
}

/// All registered fields, in display order
pub const ALL_FIELDS: [ActivityField; 10] = [
    ActivityField::AssignedTo,
    ActivityField::Description,
    ActivityField::Discipline,
    ActivityField::Area,
    ActivityField::Uom,
    ActivityField::BudgetMhs,
    ActivityField::Quantity,
    ActivityField::EarnQtyEntry,
    ActivityField::PercentEntry,
    ActivityField::ClientEquivQty,
];

static BY_NAME: Lazy<HashMap<&'static str, ActivityField>> = Lazy::new(|| {
    ALL_FIELDS
        .iter()
        .map(|field| (field.name(), *field))
        .collect()
});

impl ActivityField {
    /// Canonical column-style name
    pub fn name(&self) -> &'static str {
        match self {
            ActivityField::AssignedTo => "assigned_to",
            ActivityField::Description => "description",
            ActivityField::Discipline => "discipline",
            ActivityField::Area => "area",
            ActivityField::Uom => "uom",
            ActivityField::BudgetMhs => "budget_mhs",
            ActivityField::Quantity => "quantity",
            ActivityField::EarnQtyEntry => "earn_qty_entry",
            ActivityField::PercentEntry => "percent_entry",
            ActivityField::ClientEquivQty => "client_equiv_qty",
        }
    }

    /// Human-readable label for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityField::AssignedTo => "Assigned To",
            ActivityField::Description => "Description",
            ActivityField::Discipline => "Discipline",
            ActivityField::Area => "Area",
            ActivityField::Uom => "UOM",
            ActivityField::BudgetMhs => "Budget MHs",
            ActivityField::Quantity => "Quantity",
            ActivityField::EarnQtyEntry => "Earned Quantity",
            ActivityField::PercentEntry => "Percent Complete",
            ActivityField::ClientEquivQty => "Client Equiv Quantity",
        }
    }

    /// Look a field up by its canonical name
    pub fn from_name(name: &str) -> Option<ActivityField> {
        BY_NAME.get(name).copied()
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ActivityField::AssignedTo
                | ActivityField::Description
                | ActivityField::Discipline
                | ActivityField::Area
                | ActivityField::Uom
        )
    }

    /// Read the field from an activity
    pub fn get(&self, activity: &Activity) -> FieldValue {
        match self {
            ActivityField::AssignedTo => FieldValue::Text(activity.assigned_to.clone()),
            ActivityField::Description => FieldValue::Text(activity.description.clone()),
            ActivityField::Discipline => FieldValue::Text(activity.discipline.clone()),
            ActivityField::Area => FieldValue::Text(activity.area.clone()),
            ActivityField::Uom => FieldValue::Text(activity.uom.clone()),
            ActivityField::BudgetMhs => FieldValue::Number(activity.budget_mhs),
            ActivityField::Quantity => FieldValue::Number(activity.quantity),
            ActivityField::EarnQtyEntry => FieldValue::Number(activity.earn_qty_entry),
            ActivityField::PercentEntry => FieldValue::Number(activity.percent_entry),
            ActivityField::ClientEquivQty => FieldValue::Number(activity.client_equiv_qty),
        }
    }

    /// Write the field, returning `false` on a type mismatch. Numeric
    /// progress fields go through the derived-field calculator so the
    /// invariants hold after the write.
    pub fn set(&self, activity: &mut Activity, value: FieldValue) -> bool {
        use crate::calc::ProgressInput;

        match (self, value) {
            (ActivityField::AssignedTo, FieldValue::Text(s)) => activity.assigned_to = s,
            (ActivityField::Description, FieldValue::Text(s)) => activity.description = s,
            (ActivityField::Discipline, FieldValue::Text(s)) => activity.discipline = s,
            (ActivityField::Area, FieldValue::Text(s)) => activity.area = s,
            (ActivityField::Uom, FieldValue::Text(s)) => activity.uom = s,
            (ActivityField::BudgetMhs, FieldValue::Number(n)) => {
                activity.apply_progress(ProgressInput::BudgetMhs(n));
            }
            (ActivityField::Quantity, FieldValue::Number(n)) => {
                activity.apply_progress(ProgressInput::Quantity(n));
            }
            (ActivityField::EarnQtyEntry, FieldValue::Number(n)) => {
                activity.apply_progress(ProgressInput::EarnQty(n));
            }
            (ActivityField::PercentEntry, FieldValue::Number(n)) => {
                activity.apply_progress(ProgressInput::Percent(n));
            }
            (ActivityField::ClientEquivQty, FieldValue::Number(n)) => {
                activity.client_equiv_qty = n;
                activity.recalculate();
            }
            _ => return false,
        }
        true
    }
}
