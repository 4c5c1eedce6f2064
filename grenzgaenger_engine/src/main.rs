//! Entry point for the Grenzgänger Engine binary.
//!
//! Running this binary starts an HTTP server that exposes the net-income
//! calculation as a JSON API.  Configuration is read from `GRENZ_*`
//! environment variables (optionally from a `.env` file); see
//! [`grenzgaenger_engine::config::AppConfig`].  Log output is controlled
//! with `RUST_LOG`, and `RUST_LOG_FORMAT=json` switches to JSON lines.

use anyhow::Context;
use grenzgaenger_engine::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        tax_table_dir = %config.tax_table_dir.display(),
        tax_year = config.tax_year,
        "starting grenzgaenger engine"
    );
    grenzgaenger_engine::api::serve(config).await
}
