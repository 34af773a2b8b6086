//! Derived Field Calculator
//!
//! One explicit recalculation entry point instead of cascading property
//! setters. A raw edit to quantity, earned quantity, percent complete, or
//! budget is applied here, the invariant
//! `percent_entry = earn_qty_entry / quantity * 100` (when `quantity > 0`)
//! is re-established, and the downstream earned-hours fields are recomputed.
//! Every write is guarded by an epsilon no-op check, so applying the same
//! input twice changes nothing the second time.

use ft_core::numeric::{approx_eq, clamp_percent, round3};

use crate::activity::Activity;

/// A raw edit to one of the mutually-derived progress fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressInput {
    Quantity(f64),
    EarnQty(f64),
    Percent(f64),
    BudgetMhs(f64),
}

impl Activity {
    /// Apply a progress edit and re-derive the remaining fields.
    ///
    /// Returns `true` if any field actually changed. When `quantity == 0`,
    /// quantity-side edits leave percent and earned quantity untouched;
    /// percent-side edits still work independently.
    pub fn apply_progress(&mut self, input: ProgressInput) -> bool {
        let mut changed = false;

        match input {
            ProgressInput::Quantity(value) => {
                if !approx_eq(self.quantity, value) {
                    self.quantity = value;
                    changed = true;
                }
                if self.quantity > 0.0 {
                    changed |= self.derive_earn_qty_from_percent();
                }
            }
            ProgressInput::EarnQty(value) => {
                if !approx_eq(self.earn_qty_entry, value) {
                    self.earn_qty_entry = value;
                    changed = true;
                }
                if self.quantity > 0.0 {
                    let percent = clamp_percent(self.earn_qty_entry / self.quantity * 100.0);
                    if !approx_eq(self.percent_entry, percent) {
                        self.percent_entry = percent;
                        changed = true;
                    }
                }
            }
            ProgressInput::Percent(value) => {
                let percent = clamp_percent(value);
                if !approx_eq(self.percent_entry, percent) {
                    self.percent_entry = percent;
                    changed = true;
                }
                if self.quantity > 0.0 {
                    changed |= self.derive_earn_qty_from_percent();
                }
            }
            ProgressInput::BudgetMhs(value) => {
                if !approx_eq(self.budget_mhs, value) {
                    self.budget_mhs = value;
                    changed = true;
                }
            }
        }

        changed |= self.recompute_earned_hours();
        changed
    }

    /// Re-derive all downstream fields without taking a new edit. Used after
    /// restoring raw field values from a snapshot.
    pub fn recalculate(&mut self) -> bool {
        let mut changed = false;
        let percent = clamp_percent(self.percent_entry);
        if !approx_eq(self.percent_entry, percent) {
            self.percent_entry = percent;
            changed = true;
        }
        changed |= self.recompute_earned_hours();
        changed
    }

    fn derive_earn_qty_from_percent(&mut self) -> bool {
        let earn_qty = round3(self.percent_entry / 100.0 * self.quantity);
        if approx_eq(self.earn_qty_entry, earn_qty) {
            return false;
        }
        self.earn_qty_entry = earn_qty;
        true
    }

    fn recompute_earned_hours(&mut self) -> bool {
        let mut changed = false;

        let earn_mhs = if self.percent_entry >= 100.0 {
            self.budget_mhs
        } else {
            self.percent_entry / 100.0 * self.budget_mhs
        };
        let earn_mhs = round3(earn_mhs);
        if !approx_eq(self.earn_mhs_calc, earn_mhs) {
            self.earn_mhs_calc = earn_mhs;
            changed = true;
        }

        let client_equiv = if self.budget_mhs > 0.0 {
            round3(self.earn_mhs_calc / self.budget_mhs * self.client_equiv_qty)
        } else {
            0.0
        };
        if !approx_eq(self.client_equiv_earn_qty, client_equiv) {
            self.client_equiv_earn_qty = client_equiv;
            changed = true;
        }

        changed
    }
}
