//! HTTP API for the Grenzgänger engine.
//!
//! This module exposes a small JSON API around the computation engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! submit a calculation input and receive the full result, so that
//! renderers never have to reimplement any tax logic.  The server uses
//! the same tax tables and allowance helpers as the library.
//!
//! Input is validated before the engine runs; violations are answered
//! with `422 Unprocessable Entity` and a list of field errors.

use crate::allowances::{commuter_allowance_monthly, family_bonus_monthly, sole_earner_bonus_yearly};
use crate::config::AppConfig;
use crate::engine::{compare_cadences, compute_result, CadenceComparison};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationInput, Child, GrenzgaengerResult};
use crate::rates::{rate_or_fallback, HttpRateSource, RateSource, ResolvedRate};
use crate::tax::TaxTableRegistry;
use crate::validation::{validate_input, warnings, ValidationError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across requests.
pub struct AppState {
    pub registry: RwLock<TaxTableRegistry>,
    pub rate_source: Arc<dyn RateSource>,
    /// Overrides the fallback rate of the default tax tables.
    pub fallback_rate: Option<f64>,
}

impl AppState {
    pub fn new(registry: TaxTableRegistry, rate_source: Arc<dyn RateSource>) -> Self {
        AppState {
            registry: RwLock::new(registry),
            rate_source,
            fallback_rate: None,
        }
    }

    /// Load the tax tables and build the HTTP rate source described by
    /// `config`.
    pub fn from_config(config: &AppConfig) -> EngineResult<Self> {
        let registry = TaxTableRegistry::from_dir(&config.tax_table_dir, config.tax_year)?;
        tracing::info!(years = ?registry.years(), default_year = registry.default_year(), "tax tables ready");
        let rate_source = HttpRateSource::new(config.rate_url.clone(), config.rate_timeout)?;
        Ok(AppState {
            registry: RwLock::new(registry),
            rate_source: Arc::new(rate_source),
            fallback_rate: config.fallback_rate,
        })
    }
}

/// Body of `/api/calculate` and `/api/compare`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    #[serde(flatten)]
    pub input: CalculationInput,
    #[serde(default)]
    pub tax_year: Option<u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculateResponse {
    pub result: GrenzgaengerResult,
    pub warnings: Vec<String>,
}

/// Raw facts from which the Austrian allowances are derived.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowancesRequest {
    #[serde(default)]
    pub distance_km: u32,
    #[serde(default)]
    pub public_transport_reasonable: bool,
    #[serde(default)]
    pub children: Vec<Child>,
    #[serde(default)]
    pub sole_earner: bool,
    #[serde(default)]
    pub tax_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowancesResponse {
    pub commuter_allowance_monthly: f64,
    pub family_bonus_monthly: f64,
    pub sole_earner_bonus_yearly: f64,
}

/// Errors returned by the handlers.
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<ValidationError>),
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::Engine(err) => {
                let status = match &err {
                    EngineError::UnknownTaxYear(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                let body = Json(serde_json::json!({ "error": err.to_string() }));
                (status, body).into_response()
            }
        }
    }
}

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/calculate", post(calculate_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/allowances", post(allowances_handler))
        .route("/api/exchange-rate", get(exchange_rate_handler))
        .with_state(state)
}

fn ensure_valid(input: &CalculationInput) -> Result<(), ApiError> {
    let errors = validate_input(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Handler for POST /api/calculate
async fn calculate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    ensure_valid(&request.input)?;
    let registry = app_state.registry.read().await;
    let tables = registry.get(request.tax_year)?;
    let result = compute_result(&request.input, tables);
    Ok(Json(CalculateResponse {
        result,
        warnings: warnings(&request.input, tables),
    }))
}

/// Handler for POST /api/compare
async fn compare_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CadenceComparison>, ApiError> {
    ensure_valid(&request.input)?;
    let registry = app_state.registry.read().await;
    let tables = registry.get(request.tax_year)?;
    Ok(Json(compare_cadences(&request.input, tables)))
}

/// Handler for POST /api/allowances
async fn allowances_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<AllowancesRequest>,
) -> Result<Json<AllowancesResponse>, ApiError> {
    let registry = app_state.registry.read().await;
    let tables = registry.get(request.tax_year)?;
    Ok(Json(AllowancesResponse {
        commuter_allowance_monthly: commuter_allowance_monthly(
            request.distance_km,
            request.public_transport_reasonable,
            tables,
        ),
        family_bonus_monthly: family_bonus_monthly(&request.children, tables),
        sole_earner_bonus_yearly: sole_earner_bonus_yearly(
            request.sole_earner,
            request.children.len(),
            tables,
        ),
    }))
}

/// Handler for GET /api/exchange-rate
async fn exchange_rate_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<ResolvedRate>, ApiError> {
    let fallback = match app_state.fallback_rate {
        Some(rate) => rate,
        None => {
            let registry = app_state.registry.read().await;
            registry.get(None)?.exchange_rate.fallback_chf_to_eur
        }
    };
    Ok(Json(rate_or_fallback(app_state.rate_source.as_ref(), fallback).await))
}

/// Launch the API server.  This function loads the tax tables named by
/// `config` and binds to its address.  It blocks until the server
/// terminates.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
