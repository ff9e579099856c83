//! Gas-to-heat-pump emissions and incentive calculator.

#[cfg(feature = "api")]
pub mod api;
/// Calculation engine: per-technology results, package totals, comparison, sensitivity.
pub mod calc;
pub mod cli;
pub mod config;
pub mod io;
pub mod store;
