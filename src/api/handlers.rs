//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use log::debug;

use super::AppState;
use super::types::{
    CalculateResponse, DEFAULT_SWEEP_RANGE, ErrorResponse, SensitivityQuery, SensitivityResponse,
};
use crate::calc::comparison::ComparisonRow;
use crate::calc::params::Technology;
use crate::calc::report::{Analysis, ProgramReport};
use crate::calc::sensitivity::{SweepParameter, sweep};
use crate::config::{CalculatorConfig, ConfigOverrides};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// `GET /inputs` → 200 + `CalculatorConfig` JSON
pub async fn get_inputs(State(state): State<Arc<AppState>>) -> Json<CalculatorConfig> {
    Json(state.config.clone())
}

/// `GET /results` → 200 + `Analysis` JSON
pub async fn get_results(State(state): State<Arc<AppState>>) -> Json<Analysis> {
    Json(state.analysis.clone())
}

/// `GET /comparison` → 200 + four `ComparisonRow`s
pub async fn get_comparison(State(state): State<Arc<AppState>>) -> Json<Vec<ComparisonRow>> {
    Json(state.analysis.comparison.clone())
}

/// `GET /report` → 200 + `ProgramReport` JSON
pub async fn get_report(State(state): State<Arc<AppState>>) -> Json<ProgramReport> {
    Json(state.analysis.program_report())
}

/// Sweeps one parameter around the startup inputs.
///
/// `GET /sensitivity?parameter=gas_rate&technology=water_heating&range=25`
/// `GET /sensitivity?parameter=bogus` → 400 + `ErrorResponse`
pub async fn get_sensitivity(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SensitivityQuery>,
) -> Result<Json<SensitivityResponse>, ApiError> {
    let parameter = query
        .parameter
        .parse::<SweepParameter>()
        .map_err(bad_request)?;
    let technology = match query.technology.as_deref() {
        Some(name) => name.parse::<Technology>().map_err(bad_request)?,
        None => Technology::SpaceHeating,
    };
    let range_percent = query.range.unwrap_or(DEFAULT_SWEEP_RANGE);

    let points = sweep(
        state.config.params(technology),
        parameter,
        technology,
        range_percent,
    )
    .map_err(bad_request)?;

    Ok(Json(SensitivityResponse {
        parameter,
        technology,
        label: parameter.label(technology),
        range_percent,
        points,
    }))
}

/// Recalculates with overrides applied to the startup inputs.
///
/// `POST /calculate` with a partial config body → 200 + `CalculateResponse`
/// Invalid values → 400 + `ErrorResponse` listing every problem
pub async fn post_calculate(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<ConfigOverrides>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let inputs = overrides.apply(state.config.clone());

    let errors = inputs.validate();
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(bad_request(message));
    }

    let results = Analysis::run(&inputs).map_err(bad_request)?;
    debug!(
        "what-if run: total incentive {:.2}",
        results.combined.total_incentive
    );
    Ok(Json(CalculateResponse { inputs, results }))
}
