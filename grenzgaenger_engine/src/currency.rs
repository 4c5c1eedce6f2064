//! CHF↔EUR conversion.
//!
//! The rate is always supplied by the caller; how it was obtained is
//! the concern of [`crate::rates`].

use crate::tax::ExchangeRateDefaults;

/// Convert a CHF amount using a CHF→EUR multiplier.
pub fn to_eur(amount_chf: f64, rate: f64) -> f64 {
    amount_chf * rate
}

/// Convert a EUR amount back to CHF.  A non-positive rate yields 0
/// rather than an infinite amount.
pub fn to_chf(amount_eur: f64, rate: f64) -> f64 {
    if rate > 0.0 {
        amount_eur / rate
    } else {
        0.0
    }
}

/// Whether `rate` lies within the configured plausibility band.  Only
/// used to warn the user; it never blocks a calculation.
pub fn is_plausible_rate(rate: f64, band: &ExchangeRateDefaults) -> bool {
    (band.min_plausible..=band.max_plausible).contains(&rate)
}
