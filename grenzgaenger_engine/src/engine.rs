//! Net-income computation engine.
//!
//! The `engine` module turns a [`CalculationInput`] into a
//! [`GrenzgaengerResult`].  Data flows one way: Swiss social insurance,
//! then Swiss withholding, then conversion to EUR, then Austrian income
//! tax, and finally the net aggregation.  Every step is a pure function
//! of the input and the tax tables, so results are never stored; the
//! [`MemoizedEngine`] only skips recomputation for an unchanged input.
//!
//! Batches of inputs (salary sweeps for charts, cadence comparisons)
//! are spread across CPU cores with [`rayon`].

use crate::austria::{ratio, AustrianTaxCalculator, AustrianTaxInput};
use crate::currency::to_eur;
use crate::models::{Breakdown, CalculationInput, GrenzgaengerResult, PaymentsPerYear};
use crate::swiss::SwissDeductionCalculator;
use crate::tax::TaxTables;
use crate::withholding::StGallenWithholdingCalculator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Compute the full breakdown for one input.  Total for every
/// numerically valid input.
pub fn compute_result(input: &CalculationInput, tables: &TaxTables) -> GrenzgaengerResult {
    let rate = input.exchange_rate;
    let payments = input.payments_per_year;
    let payment_count = payments.as_f64();
    let gross_chf = input.gross_monthly_salary_chf;

    let swiss = SwissDeductionCalculator::new(&tables.switzerland).calculate(
        gross_chf,
        input.yearly_gross_chf(),
        input.age,
    );
    let withholding = StGallenWithholdingCalculator::new(&tables.st_gallen).calculate(
        gross_chf,
        input.marital_status,
        input.children.len(),
    );

    let gross_eur = to_eur(gross_chf, rate);
    let social_insurance_eur = to_eur(swiss.total, rate);
    let source_tax_eur = to_eur(withholding.source_tax, rate);

    let austrian_tax = AustrianTaxCalculator::new(&tables.austria).calculate(&AustrianTaxInput {
        monthly_gross: gross_eur,
        payments_per_year: payments,
        commuter_allowance_monthly: input.commuter_allowance_monthly,
        commuter_distance_km: input.commuter_distance_km,
        family_bonus_monthly: input.family_bonus_monthly,
        pensioner_bonus_monthly: input.pensioner_bonus_monthly,
        sole_earner_bonus_yearly: input.sole_earner_bonus_yearly,
        insurance_contribution_monthly: input.insurance_contribution_monthly,
        swiss_withholding_monthly: source_tax_eur,
        swiss_old_age_and_unemployment: to_eur(
            swiss.old_age_insurance + swiss.unemployment_insurance,
            rate,
        ),
        swiss_pension: to_eur(swiss.occupational_pension, rate),
        swiss_sick_pay_and_accident: to_eur(swiss.sick_pay_insurance + swiss.accident_insurance, rate),
    });

    let yearly_gross_eur = gross_eur * payment_count;
    let yearly_social_insurance = social_insurance_eur * payment_count;
    let yearly_withholding = source_tax_eur * 12.0;
    let yearly_insurance = input.insurance_contribution_monthly * 12.0;
    // The family bonus is consumed as a tax credit above and added once
    // more here; both are needed to reconcile to the final net.
    let yearly_family_bonus = input.family_bonus_monthly * 12.0;

    let yearly_net_eur = yearly_gross_eur
        - yearly_social_insurance
        - yearly_withholding
        - austrian_tax.tax_after_swiss_credit
        - yearly_insurance
        + yearly_family_bonus;

    // Austrian tax is not part of this ratio.
    let total_tax_burden_eur = yearly_social_insurance + yearly_withholding;
    let effective_tax_rate = ratio(total_tax_burden_eur, yearly_gross_eur) * 100.0;

    let breakdown = Breakdown {
        ahv_alv: to_eur(swiss.old_age_insurance + swiss.unemployment_insurance, rate),
        bvg: to_eur(swiss.occupational_pension, rate),
        ktg_nbu: to_eur(swiss.sick_pay_insurance + swiss.accident_insurance, rate),
        source_tax_sg: source_tax_eur,
        insurance_contribution: input.insurance_contribution_monthly,
        austrian_tax: austrian_tax.monthly_tax,
        family_bonus: input.family_bonus_monthly,
    };

    tracing::debug!(
        payments = payments.count(),
        yearly_gross_eur,
        yearly_net_eur,
        "computed net income"
    );

    GrenzgaengerResult {
        payments_per_year: payments,
        exchange_rate: rate,
        gross_salary_chf: gross_chf,
        gross_salary_eur: gross_eur,
        yearly_gross_chf: input.yearly_gross_chf(),
        yearly_gross_eur,
        swiss_deductions: swiss,
        withholding,
        austrian_tax,
        breakdown,
        monthly_net_eur: yearly_net_eur / payment_count,
        yearly_net_eur,
        average_monthly_net_eur: yearly_net_eur / 12.0,
        total_tax_burden_eur,
        effective_tax_rate,
    }
}

/// Compute many inputs in parallel.  Results keep the input order.
pub fn compute_batch(inputs: &[CalculationInput], tables: &TaxTables) -> Vec<GrenzgaengerResult> {
    inputs
        .par_iter()
        .map(|input| compute_result(input, tables))
        .collect()
}

/// One input evaluated at 12, 13 and 14 payments per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceComparison {
    pub results: Vec<GrenzgaengerResult>,
    /// Cadence with the highest yearly net.
    pub best: PaymentsPerYear,
}

pub fn compare_cadences(input: &CalculationInput, tables: &TaxTables) -> CadenceComparison {
    let variants: Vec<CalculationInput> = PaymentsPerYear::ALL
        .iter()
        .map(|&p| input.with_payments_per_year(p))
        .collect();
    let results = compute_batch(&variants, tables);
    let best = results
        .iter()
        .max_by(|a, b| a.yearly_net_eur.total_cmp(&b.yearly_net_eur))
        .map_or(input.payments_per_year, |r| r.payments_per_year);
    CadenceComparison { results, best }
}

/// Engine bound to one set of tax tables that remembers its last
/// computation.  Recomputing is always safe; this only avoids repeating
/// work when a caller re-submits an unchanged input.
pub struct MemoizedEngine {
    tables: TaxTables,
    last: Mutex<Option<(CalculationInput, GrenzgaengerResult)>>,
}

impl MemoizedEngine {
    pub fn new(tables: TaxTables) -> Self {
        MemoizedEngine {
            tables,
            last: Mutex::new(None),
        }
    }

    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    pub fn compute(&self, input: &CalculationInput) -> GrenzgaengerResult {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((cached_input, cached)) = last.as_ref() {
            if cached_input == input {
                return cached.clone();
            }
        }
        let result = compute_result(input, &self.tables);
        *last = Some((input.clone(), result.clone()));
        result
    }
}
