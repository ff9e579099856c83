//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::calc::params::Technology;
use crate::calc::report::Analysis;
use crate::calc::sensitivity::{SensitivityPoint, SweepParameter};
use crate::config::CalculatorConfig;

/// Sweep range used when the query omits `range` (±%).
pub const DEFAULT_SWEEP_RANGE: f64 = 50.0;

/// Query parameters for `GET /sensitivity`.
///
/// `parameter` accepts snake_case or camelCase names; `technology` defaults
/// to space heating.
#[derive(Debug, Deserialize)]
pub struct SensitivityQuery {
    pub parameter: String,
    pub technology: Option<String>,
    pub range: Option<f64>,
}

/// Sweep result with the axis label for charting.
#[derive(Debug, Serialize)]
pub struct SensitivityResponse {
    pub parameter: SweepParameter,
    pub technology: Technology,
    /// Human-readable label of the swept parameter.
    pub label: &'static str,
    pub range_percent: f64,
    pub points: Vec<SensitivityPoint>,
}

/// Inputs actually used for a what-if run, with their analysis.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub inputs: CalculatorConfig,
    pub results: Analysis,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
