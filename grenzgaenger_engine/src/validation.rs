//! Input validation applied before the engine is invoked.
//!
//! The engine itself accepts any numerically valid input.  Range
//! checks on user-entered values live here so that the HTTP layer can
//! reject bad input with a field-level message instead of computing a
//! meaningless result.

use crate::currency::is_plausible_rate;
use crate::models::CalculationInput;
use crate::tax::TaxTables;
use serde::{Deserialize, Serialize};

/// Range constraint for a single numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRule {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
    pub message: &'static str,
}

impl ValidationRule {
    pub fn check(&self, value: f64) -> Option<ValidationError> {
        let message = if !value.is_finite() {
            "value must be a finite number"
        } else if self.integer && value.fract() != 0.0 {
            "value must be a whole number"
        } else if value < self.min || value > self.max {
            self.message
        } else {
            return None;
        };
        Some(ValidationError {
            field: self.field.to_string(),
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

pub const GROSS_SALARY: ValidationRule = ValidationRule {
    field: "gross_monthly_salary_chf",
    min: 1_000.0,
    max: 50_000.0,
    integer: false,
    message: "gross salary must be between CHF 1,000 and CHF 50,000",
};

pub const AGE: ValidationRule = ValidationRule {
    field: "age",
    min: 18.0,
    max: 67.0,
    integer: true,
    message: "age must be between 18 and 67",
};

pub const EXCHANGE_RATE: ValidationRule = ValidationRule {
    field: "exchange_rate",
    min: 0.5,
    max: 1.5,
    integer: false,
    message: "exchange rate must be between 0.50 and 1.50",
};

pub const COMMUTER_DISTANCE: ValidationRule = ValidationRule {
    field: "commuter_distance_km",
    min: 0.0,
    max: 999.0,
    integer: true,
    message: "distance must be between 0 and 999 km",
};

pub const INSURANCE_CONTRIBUTION: ValidationRule = ValidationRule {
    field: "insurance_contribution_monthly",
    min: 0.0,
    max: 5_000.0,
    integer: false,
    message: "insurance contribution must be between EUR 0 and EUR 5,000",
};

/// All range violations in `input`.  An empty vector means the input
/// may be handed to the engine.
pub fn validate_input(input: &CalculationInput) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = [
        (GROSS_SALARY, input.gross_monthly_salary_chf),
        (AGE, f64::from(input.age)),
        (EXCHANGE_RATE, input.exchange_rate),
        (COMMUTER_DISTANCE, f64::from(input.commuter_distance_km)),
        (INSURANCE_CONTRIBUTION, input.insurance_contribution_monthly),
    ]
    .iter()
    .filter_map(|(rule, value)| rule.check(*value))
    .collect();

    let non_negative = [
        ("commuter_allowance_monthly", input.commuter_allowance_monthly),
        ("family_bonus_monthly", input.family_bonus_monthly),
        ("pensioner_bonus_monthly", input.pensioner_bonus_monthly),
        ("sole_earner_bonus_yearly", input.sole_earner_bonus_yearly),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            errors.push(ValidationError {
                field: field.to_string(),
                message: "value must be a non-negative number".to_string(),
            });
        }
    }
    errors
}

/// Non-blocking remarks about an otherwise valid input.
pub fn warnings(input: &CalculationInput, tables: &TaxTables) -> Vec<String> {
    let mut warnings = Vec::new();
    if !is_plausible_rate(input.exchange_rate, &tables.exchange_rate) {
        warnings.push(format!(
            "exchange rate {:.4} is outside the usual range {:.2}–{:.2}",
            input.exchange_rate, tables.exchange_rate.min_plausible, tables.exchange_rate.max_plausible
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaritalStatus, PaymentsPerYear};

    fn valid() -> CalculationInput {
        CalculationInput {
            gross_monthly_salary_chf: 6000.0,
            payments_per_year: PaymentsPerYear::Thirteen,
            age: 30,
            marital_status: MaritalStatus::Single,
            children: vec![],
            commuter_distance_km: 30,
            commuter_allowance_monthly: 123.0,
            family_bonus_monthly: 0.0,
            pensioner_bonus_monthly: 0.0,
            sole_earner_bonus_yearly: 0.0,
            insurance_contribution_monthly: 0.0,
            exchange_rate: 1.07,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_input(&valid()).is_empty());
        assert!(warnings(&valid(), &TaxTables::default()).is_empty());
    }

    #[test]
    fn reports_each_violated_field() {
        let mut input = valid();
        input.gross_monthly_salary_chf = 500.0;
        input.age = 70;
        input.exchange_rate = 2.0;
        input.family_bonus_monthly = -1.0;
        let fields: Vec<_> = validate_input(&input).into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["gross_monthly_salary_chf", "age", "exchange_rate", "family_bonus_monthly"]
        );
    }

    #[test]
    fn rule_checks_integers_and_nan() {
        assert!(AGE.check(30.5).is_some());
        assert!(AGE.check(30.0).is_none());
        assert!(GROSS_SALARY.check(f64::NAN).is_some());
        assert!(GROSS_SALARY.check(50_000.0).is_none());
    }

    #[test]
    fn implausible_rate_only_warns() {
        let mut input = valid();
        input.exchange_rate = 0.6;
        assert!(validate_input(&input).is_empty());
        assert_eq!(warnings(&input, &TaxTables::default()).len(), 1);
    }
}
