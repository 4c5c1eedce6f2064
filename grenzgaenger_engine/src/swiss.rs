//! Swiss social-insurance deductions.
//!
//! Contributions are withheld on every installment, but the
//! unemployment ceiling and the pension entry threshold are defined on
//! the yearly salary, so the calculator needs both figures.

use crate::models::DeductionBreakdown;
use crate::tax::SwissSocialInsurance;

pub struct SwissDeductionCalculator<'a> {
    rates: &'a SwissSocialInsurance,
}

impl<'a> SwissDeductionCalculator<'a> {
    pub fn new(rates: &'a SwissSocialInsurance) -> Self {
        SwissDeductionCalculator { rates }
    }

    /// Contributions on one installment of `monthly_gross` CHF, where
    /// `yearly_gross` is the salary over all installments of the year.
    pub fn calculate(&self, monthly_gross: f64, yearly_gross: f64, age: u32) -> DeductionBreakdown {
        let r = self.rates;

        let old_age_insurance = monthly_gross * r.old_age_rate;

        let alv = &r.unemployment;
        let mut unemployment_insurance = monthly_gross * alv.base_rate;
        if yearly_gross > alv.yearly_ceiling {
            let over_ceiling = (yearly_gross - alv.yearly_ceiling) / 12.0;
            unemployment_insurance += over_ceiling * alv.supplementary_rate;
        }

        let pension = &r.pension;
        let occupational_pension =
            if age >= pension.min_age && yearly_gross >= pension.min_yearly_salary {
                monthly_gross * pension.rate
            } else {
                0.0
            };

        let sick_pay_insurance = monthly_gross * r.sick_pay_rate;
        let accident_insurance = monthly_gross * r.accident_rate;

        let total = old_age_insurance
            + unemployment_insurance
            + occupational_pension
            + sick_pay_insurance
            + accident_insurance;

        DeductionBreakdown {
            old_age_insurance,
            unemployment_insurance,
            occupational_pension,
            sick_pay_insurance,
            accident_insurance,
            total,
            net_salary: monthly_gross - total,
        }
    }
}
