//! Austrian income tax for a resident commuter working in Switzerland.
//!
//! The Swiss salary is taxable in Austria under the double-taxation
//! agreement, with the Swiss withholding tax credited against the
//! Austrian liability.  The calculation splits the year into the twelve
//! regular payments and the 13th/14th special payments:
//!
//! 1. Allowances (Pendlerpauschale, insurance, Swiss social insurance)
//!    reduce the regular yearly income to the taxable base.
//! 2. With special payments, a fictional total of base plus special
//!    payments is taxed on the bracket schedule; its average rate is the
//!    progression rate applied to the base alone (Progressionsvorbehalt).
//!    Without special payments the schedule applies to the base directly.
//! 3. Each special payment is taxed at the flat preferential rate after
//!    its own exemption.
//! 4. Credits (family, pensioner, Pendlereuro, sole earner) and then the
//!    Swiss withholding tax are subtracted, each floored at zero.
//!
//! The progression rate is taken from the fictional total before any
//! credit is applied; credits never feed back into the rate.

use crate::models::{AustrianTaxResult, PaymentsPerYear};
use crate::tax::AustrianTables;

/// Per-payment and monthly figures in EUR feeding the Austrian
/// calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AustrianTaxInput {
    /// Actual gross per installment, not averaged over the cadence.
    pub monthly_gross: f64,
    pub payments_per_year: PaymentsPerYear,
    pub commuter_allowance_monthly: f64,
    pub commuter_distance_km: u32,
    pub family_bonus_monthly: f64,
    pub pensioner_bonus_monthly: f64,
    pub sole_earner_bonus_yearly: f64,
    pub insurance_contribution_monthly: f64,
    /// Swiss withholding tax paid per month.
    pub swiss_withholding_monthly: f64,
    /// AHV/IV/EO plus ALV per installment.
    pub swiss_old_age_and_unemployment: f64,
    /// BVG per installment.
    pub swiss_pension: f64,
    /// KTG plus NBU per installment.
    pub swiss_sick_pay_and_accident: f64,
}

impl AustrianTaxInput {
    fn swiss_social_insurance(&self) -> f64 {
        self.swiss_old_age_and_unemployment + self.swiss_pension + self.swiss_sick_pay_and_accident
    }
}

pub struct AustrianTaxCalculator<'a> {
    tables: &'a AustrianTables,
}

impl<'a> AustrianTaxCalculator<'a> {
    pub fn new(tables: &'a AustrianTables) -> Self {
        AustrianTaxCalculator { tables }
    }

    pub fn calculate(&self, input: &AustrianTaxInput) -> AustrianTaxResult {
        let payments = input.payments_per_year;
        let yearly_regular = input.monthly_gross * 12.0;

        // Social insurance is withheld on every installment; the other
        // allowances are monthly EUR figures.
        let allowances = input.commuter_allowance_monthly * 12.0
            + input.insurance_contribution_monthly * 12.0
            + input.swiss_social_insurance() * payments.as_f64();
        let taxable_income = (yearly_regular - allowances).max(0.0);

        let (progression_rate, regular_income_tax) = if payments.special_payments() > 0 {
            let special_gross = input.monthly_gross * f64::from(payments.special_payments());
            let fictional_total = taxable_income + special_gross;
            let fictional_tax = self.tables.progressive_tax(fictional_total);
            let rate = ratio(fictional_tax, fictional_total);
            tracing::debug!(
                fictional_total,
                fictional_tax,
                rate,
                "progression rate from fictional total"
            );
            (rate, taxable_income * rate)
        } else {
            let tax = self.tables.progressive_tax(taxable_income);
            (ratio(tax, taxable_income), tax)
        };

        let special_payments_tax =
            f64::from(payments.special_payments()) * self.tables.special_payment_tax(input.monthly_gross);

        let gross_tax = regular_income_tax + special_payments_tax;

        let total_credits = input.family_bonus_monthly * 12.0
            + input.pensioner_bonus_monthly * 12.0
            + f64::from(input.commuter_distance_km) * self.tables.commuter_euro_per_km
            + input.sole_earner_bonus_yearly;
        let tax_after_bonuses = (gross_tax - total_credits).max(0.0);

        let swiss_tax_credit = input.swiss_withholding_monthly * 12.0;
        let tax_after_swiss_credit = (tax_after_bonuses - swiss_tax_credit).max(0.0);

        let monthly_tax = tax_after_swiss_credit / 12.0;

        tracing::debug!(
            taxable_income,
            regular_income_tax,
            special_payments_tax,
            total_credits,
            tax_after_swiss_credit,
            "austrian income tax"
        );

        AustrianTaxResult {
            taxable_income,
            progression_rate,
            regular_income_tax,
            special_payments_tax,
            gross_tax,
            total_credits,
            tax_after_bonuses,
            swiss_tax_credit,
            tax_after_swiss_credit,
            monthly_tax,
            net_income_monthly: input.monthly_gross - monthly_tax,
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxTables;

    fn input(monthly_gross: f64, payments_per_year: PaymentsPerYear) -> AustrianTaxInput {
        AustrianTaxInput {
            monthly_gross,
            payments_per_year,
            commuter_allowance_monthly: 0.0,
            commuter_distance_km: 0,
            family_bonus_monthly: 0.0,
            pensioner_bonus_monthly: 0.0,
            sole_earner_bonus_yearly: 0.0,
            insurance_contribution_monthly: 0.0,
            swiss_withholding_monthly: 0.0,
            swiss_old_age_and_unemployment: 0.0,
            swiss_pension: 0.0,
            swiss_sick_pay_and_accident: 0.0,
        }
    }

    #[test]
    fn twelve_payments_use_bracket_schedule_directly() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let r = calc.calculate(&input(5000.0, PaymentsPerYear::Twelve));
        assert_eq!(r.taxable_income, 60_000.0);
        assert!((r.regular_income_tax - tables.progressive_austrian_tax(60_000.0)).abs() < 1e-9);
        assert_eq!(r.special_payments_tax, 0.0);
        assert!((r.monthly_tax * 12.0 - r.tax_after_swiss_credit).abs() < 1e-9);
    }

    #[test]
    fn progression_rate_comes_from_fictional_total() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let mut i = input(5000.0, PaymentsPerYear::Fourteen);
        i.family_bonus_monthly = 100.0;
        let r = calc.calculate(&i);

        let fictional_total = 60_000.0 + 10_000.0;
        let rate = tables.progressive_austrian_tax(fictional_total) / fictional_total;
        assert!((r.progression_rate - rate).abs() < 1e-12);
        assert!((r.regular_income_tax - 60_000.0 * rate).abs() < 1e-9);
        // Each installment gets its own exemption.
        assert!((r.special_payments_tax - 2.0 * (5000.0 - 620.0) * 0.06).abs() < 1e-9);
        // Credits come after the rate and do not alter it.
        assert!((r.tax_after_bonuses - (r.gross_tax - 1200.0)).abs() < 1e-9);
    }

    #[test]
    fn allowances_reduce_base_with_social_insurance_per_installment() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let mut i = input(6000.0, PaymentsPerYear::Thirteen);
        i.commuter_allowance_monthly = 123.0;
        i.insurance_contribution_monthly = 100.0;
        i.swiss_old_age_and_unemployment = 400.0;
        i.swiss_pension = 300.0;
        i.swiss_sick_pay_and_accident = 100.0;
        let r = calc.calculate(&i);
        let expected = 72_000.0 - 123.0 * 12.0 - 100.0 * 12.0 - 800.0 * 13.0;
        assert!((r.taxable_income - expected).abs() < 1e-9);
    }

    #[test]
    fn credits_and_swiss_tax_never_push_below_zero() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        for &gross in &[0.0, 500.0, 2000.0, 6000.0, 15_000.0] {
            for payments in PaymentsPerYear::ALL {
                let mut i = input(gross, payments);
                i.family_bonus_monthly = 50_000.0;
                i.sole_earner_bonus_yearly = 10_000.0;
                i.commuter_distance_km = 999;
                let r = calc.calculate(&i);
                assert_eq!(r.tax_after_bonuses, 0.0);
                assert_eq!(r.tax_after_swiss_credit, 0.0);

                let mut j = input(gross, payments);
                j.swiss_withholding_monthly = 1_000_000.0;
                let r = calc.calculate(&j);
                assert_eq!(r.tax_after_swiss_credit, 0.0);
                assert!(r.tax_after_bonuses >= 0.0);
            }
        }
    }

    #[test]
    fn swiss_withholding_is_credited_not_deducted() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let base = calc.calculate(&input(6000.0, PaymentsPerYear::Twelve));
        let mut i = input(6000.0, PaymentsPerYear::Twelve);
        i.swiss_withholding_monthly = 300.0;
        let credited = calc.calculate(&i);
        assert_eq!(credited.taxable_income, base.taxable_income);
        assert!((base.tax_after_swiss_credit - credited.tax_after_swiss_credit - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn allowances_larger_than_income_floor_the_base() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let mut i = input(1000.0, PaymentsPerYear::Fourteen);
        i.insurance_contribution_monthly = 2000.0;
        let r = calc.calculate(&i);
        assert_eq!(r.taxable_income, 0.0);
        assert_eq!(r.regular_income_tax, 0.0);
        assert!(r.progression_rate.is_finite());
    }

    #[test]
    fn zero_gross_has_no_nan() {
        let tables = TaxTables::default();
        let calc = AustrianTaxCalculator::new(&tables.austria);
        let r = calc.calculate(&input(0.0, PaymentsPerYear::Thirteen));
        assert_eq!(r.progression_rate, 0.0);
        assert_eq!(r.monthly_tax, 0.0);
    }
}
