//! Grenzgänger Engine library crate.
//!
//! This crate computes the monthly and yearly net income of a commuter
//! who lives in Austria and works in the canton of St. Gallen.  The
//! salary is paid in CHF and is reduced by Swiss social insurance and
//! Swiss withholding tax.  It is then converted to EUR and taxed again
//! in Austria, where the Swiss withholding is credited.
//!
//! External applications may depend on the `grenzgaenger_engine` crate
//! and call [`engine::compute_result`] directly, or embed the HTTP API
//! via [`api::build_router`].  All tax constants live in
//! [`tax::TaxTables`], which can be loaded from JSON per tax year.

pub mod allowances;
pub mod api;
pub mod austria;
pub mod config;
pub mod currency;
pub mod engine;
pub mod error;
pub mod models;
pub mod rates;
pub mod swiss;
pub mod tax;
pub mod validation;
pub mod withholding;

pub use engine::{compare_cadences, compute_batch, compute_result, MemoizedEngine};
pub use error::{EngineError, EngineResult};
pub use models::{CalculationInput, GrenzgaengerResult, PaymentsPerYear};
pub use tax::{TaxTableRegistry, TaxTables};
