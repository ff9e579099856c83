//! REST API for calculator inputs, results, and what-if runs.
//!
//! GET endpoints serve the analysis computed at startup:
//! - `/inputs`: the configuration the server was started with
//! - `/results`: full analysis (both technologies, package, comparison)
//! - `/comparison`: the four-row comparison table
//! - `/report`: program-administrator summary
//! - `/sensitivity`: one-parameter sweep around the startup inputs
//!
//! `POST /calculate` applies partial overrides to the startup inputs and
//! returns a fresh analysis without changing server state.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::calc::params::ParamError;
use crate::calc::report::Analysis;
use crate::config::CalculatorConfig;

pub use types::{CalculateResponse, ErrorResponse, SensitivityQuery, SensitivityResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once from the validated startup configuration and wrapped in `Arc`.
pub struct AppState {
    /// Inputs the server was started with.
    pub config: CalculatorConfig,
    /// Analysis of `config`.
    pub analysis: Analysis,
}

impl AppState {
    /// Runs the analysis for `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if `config` holds invalid parameters.
    pub fn new(config: CalculatorConfig) -> Result<Self, ParamError> {
        let analysis = Analysis::run(&config)?;
        Ok(Self { config, analysis })
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/inputs", get(handlers::get_inputs))
        .route("/results", get(handlers::get_results))
        .route("/comparison", get(handlers::get_comparison))
        .route("/report", get(handlers::get_report))
        .route("/sensitivity", get(handlers::get_sensitivity))
        .route("/calculate", post(handlers::post_calculate))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
