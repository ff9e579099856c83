//! Emissions and financial calculation engine.
//!
//! Data flows one way: [`params::ParameterSet`] into
//! [`technology::calculate`], whose results feed [`combined::combine`] and
//! [`comparison::build_comparison`]. Nothing here holds state between calls.

pub mod combined;
pub mod comparison;
/// Emission factors and incentive valuation rates.
pub mod constants;
pub mod params;
pub mod ratio;
pub mod report;
pub mod sensitivity;
pub mod technology;
