//! Data models for the Grenzgänger engine.
//!
//! The `models` module defines the flat input record handed to the
//! engine and the result records it produces.  All types derive
//! `Serialize` and `Deserialize` so that report and chart renderers can
//! consume them over the HTTP API without any knowledge of the
//! calculation internals.  None of these records carry identity; every
//! result is a pure function of one [`CalculationInput`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marital status, which selects the St. Gallen withholding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaritalStatus::Single => write!(f, "single"),
            MaritalStatus::Married => write!(f, "married"),
        }
    }
}

/// Number of salary installments the Swiss employer pays per year.
///
/// On the wire this is the plain number `12`, `13` or `14`; any other
/// value is rejected during deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PaymentsPerYear {
    Twelve,
    Thirteen,
    Fourteen,
}

impl PaymentsPerYear {
    pub const ALL: [PaymentsPerYear; 3] = [
        PaymentsPerYear::Twelve,
        PaymentsPerYear::Thirteen,
        PaymentsPerYear::Fourteen,
    ];

    /// Total number of installments per year.
    pub fn count(self) -> u32 {
        match self {
            PaymentsPerYear::Twelve => 12,
            PaymentsPerYear::Thirteen => 13,
            PaymentsPerYear::Fourteen => 14,
        }
    }

    /// Installments beyond the twelfth (the 13th/14th salary).
    pub fn special_payments(self) -> u32 {
        self.count() - 12
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.count())
    }
}

impl TryFrom<u8> for PaymentsPerYear {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(PaymentsPerYear::Twelve),
            13 => Ok(PaymentsPerYear::Thirteen),
            14 => Ok(PaymentsPerYear::Fourteen),
            other => Err(format!(
                "payments per year must be 12, 13 or 14, got {}",
                other
            )),
        }
    }
}

impl From<PaymentsPerYear> for u8 {
    fn from(value: PaymentsPerYear) -> Self {
        value.count() as u8
    }
}

/// A child of the commuter.  The flags drive the Familienbonus Plus
/// tier; only the number of children matters for Swiss withholding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Child {
    #[serde(default)]
    pub is_adult: bool,
    #[serde(default)]
    pub lives_at_home: bool,
    #[serde(default)]
    pub is_student: bool,
}

/// Input to the engine.
///
/// Monthly amounts are per installment.  The commuter allowance,
/// family bonus and sole-earner bonus are derived by the caller (see
/// [`crate::allowances`]) before the engine is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Gross salary per installment in CHF.
    pub gross_monthly_salary_chf: f64,
    pub payments_per_year: PaymentsPerYear,
    /// Age in years; gates the occupational pension contribution.
    pub age: u32,
    pub marital_status: MaritalStatus,
    #[serde(default)]
    pub children: Vec<Child>,
    /// One-way commute distance in km.
    #[serde(default)]
    pub commuter_distance_km: u32,
    /// Pendlerpauschale per month in EUR.
    #[serde(default)]
    pub commuter_allowance_monthly: f64,
    /// Familienbonus Plus per month in EUR, summed over all children.
    #[serde(default)]
    pub family_bonus_monthly: f64,
    /// Pensionistenabsetzbetrag per month in EUR.
    #[serde(default)]
    pub pensioner_bonus_monthly: f64,
    /// Alleinverdienerabsetzbetrag per year in EUR.
    #[serde(default)]
    pub sole_earner_bonus_yearly: f64,
    /// Private insurance contribution per month in EUR.  Deductible
    /// from the Austrian tax base and paid out of net income.
    #[serde(default)]
    pub insurance_contribution_monthly: f64,
    /// CHF→EUR multiplier.
    pub exchange_rate: f64,
}

impl CalculationInput {
    /// Gross salary over all installments of the year, in CHF.
    pub fn yearly_gross_chf(&self) -> f64 {
        self.gross_monthly_salary_chf * self.payments_per_year.as_f64()
    }

    /// The same input with a different payment cadence.
    pub fn with_payments_per_year(&self, payments_per_year: PaymentsPerYear) -> Self {
        CalculationInput {
            payments_per_year,
            ..self.clone()
        }
    }
}

/// Swiss social-insurance contributions withheld from one installment.
/// All amounts are in CHF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// AHV/IV/EO, old-age and survivors' insurance.
    pub old_age_insurance: f64,
    /// ALV, unemployment insurance.
    pub unemployment_insurance: f64,
    /// BVG, occupational pension.
    pub occupational_pension: f64,
    /// KTG, sick-pay insurance.
    pub sick_pay_insurance: f64,
    /// NBU, non-occupational accident insurance.
    pub accident_insurance: f64,
    pub total: f64,
    pub net_salary: f64,
}

/// St. Gallen withholding tax on one month of salary, in CHF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WithholdingResult {
    pub source_tax: f64,
    /// Blended rate after the child reduction, as a fraction.
    pub effective_rate: f64,
    pub net_after_tax: f64,
}

/// Austrian income tax for one year, in EUR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AustrianTaxResult {
    /// Regular (12-payment) income after allowances.
    pub taxable_income: f64,
    /// Rate applied to the regular income.  For 12 payments this is the
    /// average rate of the bracket schedule; otherwise the progression
    /// rate of the fictional total including special payments.
    pub progression_rate: f64,
    pub regular_income_tax: f64,
    pub special_payments_tax: f64,
    /// Regular plus special-payment tax, before any credits.
    pub gross_tax: f64,
    pub total_credits: f64,
    pub tax_after_bonuses: f64,
    pub swiss_tax_credit: f64,
    pub tax_after_swiss_credit: f64,
    /// Yearly liability amortised over twelve months.
    pub monthly_tax: f64,
    /// Monthly gross minus the monthly liability.
    pub net_income_monthly: f64,
}

/// Flat per-category figures in EUR for chart and report renderers.
///
/// Social-insurance categories are per installment; everything else is
/// a monthly (12-month) figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub ahv_alv: f64,
    pub bvg: f64,
    pub ktg_nbu: f64,
    pub source_tax_sg: f64,
    pub insurance_contribution: f64,
    pub austrian_tax: f64,
    pub family_bonus: f64,
}

/// The full result of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrenzgaengerResult {
    pub payments_per_year: PaymentsPerYear,
    pub exchange_rate: f64,
    pub gross_salary_chf: f64,
    pub gross_salary_eur: f64,
    pub yearly_gross_chf: f64,
    pub yearly_gross_eur: f64,
    pub swiss_deductions: DeductionBreakdown,
    pub withholding: WithholdingResult,
    pub austrian_tax: AustrianTaxResult,
    pub breakdown: Breakdown,
    /// Net per installment at the actual payment cadence.
    pub monthly_net_eur: f64,
    pub yearly_net_eur: f64,
    /// Yearly net spread over twelve months, for comparison with
    /// jurisdictions that pay twelve salaries.
    pub average_monthly_net_eur: f64,
    /// Yearly Swiss social security plus Swiss withholding, in EUR.
    pub total_tax_burden_eur: f64,
    /// `total_tax_burden_eur` as a percentage of yearly gross.
    pub effective_tax_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payments_per_year_accepts_only_known_cadences() {
        let p: PaymentsPerYear = serde_json::from_value(json!(13)).unwrap();
        assert_eq!(p, PaymentsPerYear::Thirteen);
        assert_eq!(p.special_payments(), 1);
        assert!(serde_json::from_value::<PaymentsPerYear>(json!(15)).is_err());
        assert!(serde_json::from_value::<PaymentsPerYear>(json!(0)).is_err());
        assert_eq!(serde_json::to_value(PaymentsPerYear::Fourteen).unwrap(), json!(14));
    }

    #[test]
    fn input_defaults_optional_fields() {
        let input: CalculationInput = serde_json::from_value(json!({
            "gross_monthly_salary_chf": 6000.0,
            "payments_per_year": 12,
            "age": 30,
            "marital_status": "married",
            "exchange_rate": 1.07
        }))
        .unwrap();
        assert_eq!(input.marital_status, MaritalStatus::Married);
        assert!(input.children.is_empty());
        assert_eq!(input.commuter_distance_km, 0);
        assert_eq!(input.pensioner_bonus_monthly, 0.0);
        assert_eq!(input.yearly_gross_chf(), 72000.0);
    }
}
