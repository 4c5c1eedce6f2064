//! Exchange-rate sources.
//!
//! Fetching a live CHF→EUR rate is the only network access in the
//! crate and happens strictly outside the engine: the caller obtains a
//! plain number here and passes it in the calculation input.  Any
//! failure falls back to the static rate from the tax tables.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// A provider of the current CHF→EUR multiplier.
///
/// Sources must be thread-safe (`Send + Sync`) because the HTTP server
/// shares one source between all requests.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short name reported alongside the rate.
    fn name(&self) -> &str;

    async fn fetch_chf_to_eur(&self) -> EngineResult<f64>;
}

/// A rate obtained for the caller, with its provenance.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolvedRate {
    pub rate: f64,
    pub source: String,
    pub fallback_used: bool,
}

/// Fetch from `source`, falling back to `fallback` on any error or on
/// a rate that is not a positive finite number.  Never fails.
pub async fn rate_or_fallback(source: &dyn RateSource, fallback: f64) -> ResolvedRate {
    match source.fetch_chf_to_eur().await {
        Ok(rate) if rate.is_finite() && rate > 0.0 => ResolvedRate {
            rate,
            source: source.name().to_string(),
            fallback_used: false,
        },
        Ok(rate) => {
            tracing::warn!(source = source.name(), rate, "rejected exchange rate, using fallback");
            fallback_rate(fallback)
        }
        Err(err) => {
            tracing::warn!(source = source.name(), error = %err, "exchange rate unavailable, using fallback");
            fallback_rate(fallback)
        }
    }
}

fn fallback_rate(rate: f64) -> ResolvedRate {
    ResolvedRate {
        rate,
        source: "fallback".to_string(),
        fallback_used: true,
    }
}

/// A fixed rate, for offline use and tests.
pub struct StaticRateSource(pub f64);

#[async_trait]
impl RateSource for StaticRateSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_chf_to_eur(&self) -> EngineResult<f64> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

/// Rate source backed by a Frankfurter-compatible HTTP endpoint that
/// answers `{"rates": {"EUR": <rate>}}` for a CHF base.
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub const DEFAULT_URL: &'static str = "https://api.frankfurter.app/latest?from=CHF&to=EUR";

    pub fn new(url: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpRateSource {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_chf_to_eur(&self) -> EngineResult<f64> {
        let body: LatestRates = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let rate = body
            .rates
            .get("EUR")
            .copied()
            .ok_or_else(|| EngineError::RateResponse("no EUR rate in response".to_string()))?;
        tracing::info!(rate, "fetched CHF→EUR exchange rate");
        Ok(rate)
    }
}
