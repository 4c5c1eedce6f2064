//! Service configuration read from the environment.

use crate::error::{EngineError, EngineResult};
use crate::rates::HttpRateSource;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Directory of per-year tax table JSON files.
    pub tax_table_dir: PathBuf,
    /// Tax year used when a request does not name one.
    pub tax_year: u16,
    pub rate_url: String,
    pub rate_timeout: Duration,
    /// Overrides the fallback rate of the tax tables.
    pub fallback_rate: Option<f64>,
}

impl AppConfig {
    /// Read configuration from `GRENZ_*` environment variables, using
    /// defaults for anything unset.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr: SocketAddr = parse(&lookup, "GRENZ_BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
        let tax_table_dir = lookup("GRENZ_TAX_TABLE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tax_tables"));
        let tax_year: u16 = parse(&lookup, "GRENZ_TAX_YEAR")?.unwrap_or(2026);
        let rate_url = lookup("GRENZ_RATE_URL")
            .unwrap_or_else(|| HttpRateSource::DEFAULT_URL.to_string());
        let timeout_secs: u64 = parse(&lookup, "GRENZ_RATE_TIMEOUT_SECS")?.unwrap_or(5);
        let fallback_rate: Option<f64> = parse(&lookup, "GRENZ_FALLBACK_RATE")?;
        if let Some(rate) = fallback_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(EngineError::Config(format!(
                    "GRENZ_FALLBACK_RATE must be positive, got {}",
                    rate
                )));
            }
        }

        Ok(AppConfig {
            bind_addr,
            tax_table_dir,
            tax_year,
            rate_url,
            rate_timeout: Duration::from_secs(timeout_secs),
            fallback_rate,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str) -> EngineResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| EngineError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}
