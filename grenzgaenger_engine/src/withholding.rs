//! St. Gallen withholding tax (Quellensteuer).
//!
//! A simplified tariff: one blended rate per yearly income bracket,
//! reduced by a fixed number of points per child, applied to the
//! monthly gross.  The rate is not applied marginally.
//!
//! Withholding always annualises with twelve months because it is
//! levied at source each month, independent of 13th/14th salaries.

use crate::models::{MaritalStatus, WithholdingResult};
use crate::tax::WithholdingTables;

pub struct StGallenWithholdingCalculator<'a> {
    tables: &'a WithholdingTables,
}

impl<'a> StGallenWithholdingCalculator<'a> {
    pub fn new(tables: &'a WithholdingTables) -> Self {
        StGallenWithholdingCalculator { tables }
    }

    /// Rate after the per-child reduction, floored at zero.
    pub fn rate(&self, monthly_gross: f64, status: MaritalStatus, children: usize) -> f64 {
        let yearly = monthly_gross * 12.0;
        let base = self.tables.rate_for_income(yearly, status);
        (base - children as f64 * self.tables.child_rate_reduction).max(0.0)
    }

    /// Withholding on one month of `monthly_gross` CHF.
    pub fn calculate(
        &self,
        monthly_gross: f64,
        status: MaritalStatus,
        children: usize,
    ) -> WithholdingResult {
        let effective_rate = self.rate(monthly_gross, status, children);
        let source_tax = monthly_gross * effective_rate;
        WithholdingResult {
            source_tax,
            effective_rate,
            net_after_tax: monthly_gross - source_tax,
        }
    }
}
