//! Derivation of the Austrian allowances the engine consumes.
//!
//! These helpers turn the raw facts a user enters (commute distance,
//! children, sole-earner status) into the monetary figures carried by
//! [`CalculationInput`](crate::models::CalculationInput).  The engine
//! never calls them itself; callers derive the figures first.

use crate::models::Child;
use crate::tax::TaxTables;

/// Pendlerpauschale per month in EUR, rounded to cents.
///
/// The small table applies when public transport is reasonable, the
/// large table otherwise.  Distances below the minimum yield nothing.
pub fn commuter_allowance_monthly(
    distance_km: u32,
    public_transport_reasonable: bool,
    tables: &TaxTables,
) -> f64 {
    let bands = &tables.austria.commuter_allowance;
    if distance_km < bands.min_distance_km {
        return 0.0;
    }
    let table = if public_transport_reasonable {
        &bands.small
    } else {
        &bands.large
    };
    table
        .iter()
        .find(|band| band.contains(distance_km))
        .map_or(0.0, |band| round_cents(band.yearly / 12.0))
}

/// Familienbonus Plus per month in EUR for one child.
pub fn child_family_bonus_monthly(child: &Child, tables: &TaxTables) -> f64 {
    let bonus = &tables.austria.family_bonus;
    if !child.is_adult {
        bonus.minor_monthly
    } else if child.lives_at_home && child.is_student {
        bonus.adult_student_monthly
    } else {
        0.0
    }
}

/// Familienbonus Plus per month in EUR, summed over all children.
pub fn family_bonus_monthly(children: &[Child], tables: &TaxTables) -> f64 {
    children
        .iter()
        .map(|child| child_family_bonus_monthly(child, tables))
        .sum()
}

/// Alleinverdienerabsetzbetrag per year in EUR.
pub fn sole_earner_bonus_yearly(is_sole_earner: bool, child_count: usize, tables: &TaxTables) -> f64 {
    if !is_sole_earner || child_count == 0 {
        return 0.0;
    }
    let bonus = &tables.austria.sole_earner_bonus;
    bonus.one_child_yearly + (child_count - 1) as f64 * bonus.per_additional_child_yearly
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
