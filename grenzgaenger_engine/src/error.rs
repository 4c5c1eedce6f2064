//! Error type shared by the library modules.
//!
//! The calculators themselves are total and never fail; errors only
//! arise around them, when tax tables are loaded, configuration is
//! read or an exchange rate is fetched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to read tax tables from {path:?}: {source}")]
    TableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tax tables: {0}")]
    TableParse(#[from] serde_json::Error),

    #[error("invalid tax tables: {0}")]
    InvalidTables(String),

    #[error("no tax tables for year {0}")]
    UnknownTaxYear(u16),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("exchange rate request failed: {0}")]
    RateRequest(#[from] reqwest::Error),

    #[error("invalid exchange rate response: {0}")]
    RateResponse(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
