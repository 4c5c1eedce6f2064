//! Tax tables and lookup helpers.
//!
//! The `tax` module holds every jurisdiction parameter the calculators
//! need: Swiss social-insurance rates, the St. Gallen withholding
//! brackets, the Austrian income-tax schedule and the allowance
//! constants.  Tables are plain data.  They deserialise from versioned
//! JSON files (one file per tax year) so that a new tax year can be
//! dropped in without touching any algorithm code; the 2026 tables are
//! built in and returned by [`TaxTables::default`].

use crate::error::{EngineError, EngineResult};
use crate::models::MaritalStatus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// One bracket of a rate schedule.  `upper_bound` of `None` marks the
/// final, unbounded bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(default)]
    pub upper_bound: Option<f64>,
    pub rate: f64,
}

impl Bracket {
    pub const fn bounded(upper_bound: f64, rate: f64) -> Self {
        Bracket {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub const fn unbounded(rate: f64) -> Self {
        Bracket {
            upper_bound: None,
            rate,
        }
    }

    fn upper(&self) -> f64 {
        self.upper_bound.unwrap_or(f64::INFINITY)
    }
}

/// Distance band of the Pendlerpauschale, covering `[min_km, max_km)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub min_km: u32,
    #[serde(default)]
    pub max_km: Option<u32>,
    /// Allowance per year in EUR.
    pub yearly: f64,
}

impl DistanceBand {
    pub fn contains(&self, distance_km: u32) -> bool {
        distance_km >= self.min_km && self.max_km.map_or(true, |max| distance_km < max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnemploymentInsurance {
    pub base_rate: f64,
    /// Rate on the part of the yearly salary above `yearly_ceiling`.
    pub supplementary_rate: f64,
    pub yearly_ceiling: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupationalPension {
    pub rate: f64,
    pub min_age: u32,
    pub min_yearly_salary: f64,
}

/// Employee shares of the Swiss social insurances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwissSocialInsurance {
    pub old_age_rate: f64,
    pub unemployment: UnemploymentInsurance,
    pub pension: OccupationalPension,
    pub sick_pay_rate: f64,
    pub accident_rate: f64,
}

/// Simplified St. Gallen withholding tariff: one blended rate per
/// yearly income bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingTables {
    pub single: Vec<Bracket>,
    pub married: Vec<Bracket>,
    /// Rate reduction per child, as a fraction (0.005 = 0.5 points).
    pub child_rate_reduction: f64,
}

impl WithholdingTables {
    pub fn brackets(&self, status: MaritalStatus) -> &[Bracket] {
        match status {
            MaritalStatus::Single => &self.single,
            MaritalStatus::Married => &self.married,
        }
    }

    /// Rate of the first bracket whose upper bound is at least
    /// `yearly_income`.
    pub fn rate_for_income(&self, yearly_income: f64, status: MaritalStatus) -> f64 {
        let brackets = self.brackets(status);
        brackets
            .iter()
            .find(|b| yearly_income <= b.upper())
            .or_else(|| brackets.last())
            .map_or(0.0, |b| b.rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialPayments {
    pub rate: f64,
    /// Tax-free amount per special payment.
    pub exemption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyBonus {
    /// Per month for a child that is not yet an adult.
    pub minor_monthly: f64,
    /// Per month for an adult student still living at home.
    pub adult_student_monthly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoleEarnerBonus {
    pub one_child_yearly: f64,
    pub per_additional_child_yearly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuterAllowanceBands {
    /// Kleines Pendlerpauschale: public transport is reasonable.
    pub small: Vec<DistanceBand>,
    /// Großes Pendlerpauschale: public transport is not reasonable.
    pub large: Vec<DistanceBand>,
    /// Below this distance no allowance applies.
    pub min_distance_km: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AustrianTables {
    pub brackets: Vec<Bracket>,
    pub special_payments: SpecialPayments,
    /// Pendlereuro: yearly credit per km of one-way distance.
    pub commuter_euro_per_km: f64,
    pub family_bonus: FamilyBonus,
    pub sole_earner_bonus: SoleEarnerBonus,
    pub commuter_allowance: CommuterAllowanceBands,
}

impl AustrianTables {
    /// Marginal-bracket income tax: each bracket taxes only the slice of
    /// income between the previous bound and its own.
    pub fn progressive_tax(&self, taxable_income: f64) -> f64 {
        let mut tax = 0.0;
        let mut previous = 0.0;
        for bracket in &self.brackets {
            if taxable_income <= previous {
                break;
            }
            let upper = bracket.upper();
            tax += (taxable_income.min(upper) - previous) * bracket.rate;
            previous = upper;
        }
        tax
    }

    /// Flat tax on one 13th/14th salary installment after its own
    /// exemption.
    pub fn special_payment_tax(&self, payment: f64) -> f64 {
        let SpecialPayments { rate, exemption } = self.special_payments;
        (payment - exemption).max(0.0) * rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateDefaults {
    /// Used whenever the live rate cannot be fetched.
    pub fallback_chf_to_eur: f64,
    pub min_plausible: f64,
    pub max_plausible: f64,
}

/// All parameters for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxTables {
    pub tax_year: u16,
    pub switzerland: SwissSocialInsurance,
    pub st_gallen: WithholdingTables,
    pub austria: AustrianTables,
    pub exchange_rate: ExchangeRateDefaults,
}

impl Default for TaxTables {
    fn default() -> Self {
        TaxTables::builtin_2026()
    }
}

impl TaxTables {
    /// Tables in force for 2026.
    pub fn builtin_2026() -> Self {
        TaxTables {
            tax_year: 2026,
            switzerland: SwissSocialInsurance {
                old_age_rate: 0.053,
                unemployment: UnemploymentInsurance {
                    base_rate: 0.011,
                    supplementary_rate: 0.005,
                    yearly_ceiling: 148_200.0,
                },
                pension: OccupationalPension {
                    rate: 0.07,
                    min_age: 18,
                    min_yearly_salary: 22_050.0,
                },
                sick_pay_rate: 0.014,
                accident_rate: 0.01,
            },
            st_gallen: WithholdingTables {
                single: vec![
                    Bracket::bounded(20_000.0, 0.00),
                    Bracket::bounded(40_000.0, 0.02),
                    Bracket::bounded(60_000.0, 0.04),
                    Bracket::bounded(80_000.0, 0.06),
                    Bracket::bounded(100_000.0, 0.08),
                    Bracket::unbounded(0.10),
                ],
                married: vec![
                    Bracket::bounded(30_000.0, 0.00),
                    Bracket::bounded(50_000.0, 0.015),
                    Bracket::bounded(70_000.0, 0.03),
                    Bracket::bounded(90_000.0, 0.05),
                    Bracket::bounded(110_000.0, 0.07),
                    Bracket::unbounded(0.09),
                ],
                child_rate_reduction: 0.005,
            },
            austria: AustrianTables {
                brackets: vec![
                    Bracket::bounded(12_816.0, 0.00),
                    Bracket::bounded(20_818.0, 0.20),
                    Bracket::bounded(34_513.0, 0.30),
                    Bracket::bounded(66_612.0, 0.40),
                    Bracket::bounded(99_266.0, 0.48),
                    Bracket::unbounded(0.50),
                ],
                special_payments: SpecialPayments {
                    rate: 0.06,
                    exemption: 620.0,
                },
                commuter_euro_per_km: 2.0,
                family_bonus: FamilyBonus {
                    minor_monthly: 166.68,
                    adult_student_monthly: 54.18,
                },
                sole_earner_bonus: SoleEarnerBonus {
                    one_child_yearly: 572.0,
                    per_additional_child_yearly: 206.0,
                },
                commuter_allowance: CommuterAllowanceBands {
                    small: vec![
                        DistanceBand { min_km: 20, max_km: Some(40), yearly: 696.0 },
                        DistanceBand { min_km: 40, max_km: Some(60), yearly: 1356.0 },
                        DistanceBand { min_km: 60, max_km: None, yearly: 2016.0 },
                    ],
                    large: vec![
                        DistanceBand { min_km: 2, max_km: Some(20), yearly: 372.0 },
                        DistanceBand { min_km: 20, max_km: Some(40), yearly: 1476.0 },
                        DistanceBand { min_km: 40, max_km: Some(60), yearly: 2568.0 },
                        DistanceBand { min_km: 60, max_km: None, yearly: 3672.0 },
                    ],
                    min_distance_km: 2,
                },
            },
            exchange_rate: ExchangeRateDefaults {
                fallback_chf_to_eur: 1.07,
                min_plausible: 0.80,
                max_plausible: 1.20,
            },
        }
    }

    /// Parse and validate tables from a JSON document.
    pub fn from_json_str(data: &str) -> EngineResult<Self> {
        let tables: TaxTables = serde_json::from_str(data)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| EngineError::TableIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// St. Gallen withholding rate for a yearly income.
    pub fn tax_rate_for_income(&self, yearly_income: f64, status: MaritalStatus) -> f64 {
        self.st_gallen.rate_for_income(yearly_income, status)
    }

    pub fn progressive_austrian_tax(&self, taxable_yearly_income: f64) -> f64 {
        self.austria.progressive_tax(taxable_yearly_income)
    }

    pub fn preferential_special_payment_tax(&self, payment: f64) -> f64 {
        self.austria.special_payment_tax(payment)
    }

    /// Check the structural assumptions the lookups rely on.
    pub fn validate(&self) -> EngineResult<()> {
        validate_brackets("st_gallen.single", &self.st_gallen.single)?;
        validate_brackets("st_gallen.married", &self.st_gallen.married)?;
        validate_brackets("austria.brackets", &self.austria.brackets)?;
        validate_bands("austria.commuter_allowance.small", &self.austria.commuter_allowance.small)?;
        validate_bands("austria.commuter_allowance.large", &self.austria.commuter_allowance.large)?;

        let rate = self.exchange_rate;
        if !(rate.min_plausible > 0.0 && rate.min_plausible <= rate.max_plausible) {
            return Err(EngineError::InvalidTables(format!(
                "exchange rate band {}..{} is empty",
                rate.min_plausible, rate.max_plausible
            )));
        }
        if rate.fallback_chf_to_eur <= 0.0 {
            return Err(EngineError::InvalidTables(
                "fallback exchange rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_brackets(name: &str, brackets: &[Bracket]) -> EngineResult<()> {
    let invalid = |msg: String| Err(EngineError::InvalidTables(format!("{}: {}", name, msg)));
    let Some((last, rest)) = brackets.split_last() else {
        return invalid("no brackets".to_string());
    };
    if last.upper_bound.is_some() {
        return invalid("final bracket must be unbounded".to_string());
    }
    let mut previous = 0.0;
    for bracket in rest {
        let Some(upper) = bracket.upper_bound else {
            return invalid("only the final bracket may be unbounded".to_string());
        };
        if upper <= previous {
            return invalid(format!("bounds must ascend, {} after {}", upper, previous));
        }
        previous = upper;
    }
    if let Some(b) = brackets.iter().find(|b| !(0.0..=1.0).contains(&b.rate)) {
        return invalid(format!("rate {} outside 0..1", b.rate));
    }
    Ok(())
}

fn validate_bands(name: &str, bands: &[DistanceBand]) -> EngineResult<()> {
    for band in bands {
        if band.max_km.map_or(false, |max| max <= band.min_km) {
            return Err(EngineError::InvalidTables(format!(
                "{}: band starting at {} km is empty",
                name, band.min_km
            )));
        }
    }
    Ok(())
}

/// Load all tax table files from a directory.
///
/// This helper scans a directory and attempts to parse any `.json`
/// files as [`TaxTables`].  Files that fail to parse or validate are
/// logged and skipped.  A missing directory yields an empty vector.
pub fn load_tax_tables_from_dir(path: &Path) -> EngineResult<Vec<TaxTables>> {
    let mut tables = Vec::new();
    if !path.is_dir() {
        return Ok(tables);
    }
    let io_err = |source| EngineError::TableIo {
        path: path.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file = entry.path();
        if !entry.file_type().map_err(io_err)?.is_file()
            || file.extension().map_or(true, |ext| ext != "json")
        {
            continue;
        }
        match TaxTables::from_file(&file) {
            Ok(t) => {
                tracing::info!(year = t.tax_year, file = %file.display(), "loaded tax tables");
                tables.push(t);
            }
            Err(err) => {
                tracing::warn!(file = %file.display(), error = %err, "skipping tax tables");
            }
        }
    }
    Ok(tables)
}

/// Tax tables keyed by tax year, with a default year for requests that
/// do not name one.
#[derive(Debug, Clone)]
pub struct TaxTableRegistry {
    tables: HashMap<u16, TaxTables>,
    default_year: u16,
}

impl Default for TaxTableRegistry {
    fn default() -> Self {
        let builtin = TaxTables::default();
        let default_year = builtin.tax_year;
        TaxTableRegistry {
            tables: HashMap::from([(default_year, builtin)]),
            default_year,
        }
    }
}

impl TaxTableRegistry {
    /// Built-in tables overlaid with every file found in `dir`.  Files
    /// replace the built-in tables of the same year.
    pub fn from_dir(dir: &Path, default_year: u16) -> EngineResult<Self> {
        let mut registry = TaxTableRegistry::default();
        for tables in load_tax_tables_from_dir(dir)? {
            registry.insert(tables);
        }
        if !registry.tables.contains_key(&default_year) {
            return Err(EngineError::UnknownTaxYear(default_year));
        }
        registry.default_year = default_year;
        Ok(registry)
    }

    pub fn insert(&mut self, tables: TaxTables) {
        self.tables.insert(tables.tax_year, tables);
    }

    pub fn default_year(&self) -> u16 {
        self.default_year
    }

    /// Tables for `year`, or for the default year when `None`.
    pub fn get(&self, year: Option<u16>) -> EngineResult<&TaxTables> {
        let year = year.unwrap_or(self.default_year);
        self.tables.get(&year).ok_or(EngineError::UnknownTaxYear(year))
    }

    pub fn years(&self) -> Vec<u16> {
        let sorted: BTreeMap<_, _> = self.tables.iter().collect();
        sorted.into_keys().copied().collect()
    }
}
