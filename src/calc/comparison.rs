//! Cross-technology comparison table with fixed benchmark programs.

use serde::Serialize;

use super::ratio::checked_ratio;
use super::technology::TechnologyResult;

/// One row of the program comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Program or technology name.
    pub name: String,
    /// Annual emissions reduction (MTCO2e/yr).
    pub annual_reduction: f64,
    /// Lifetime emissions reduction (MTCO2e).
    pub lifetime_reduction: f64,
    /// Incentive paid per installation.
    pub incentive_cost: f64,
    /// Incentive per annual MTCO2e.
    pub cost_per_ton: Option<f64>,
    /// Incentive per lifetime MTCO2e.
    pub lifetime_cost_per_ton: Option<f64>,
    /// Simple payback including incentives (years).
    pub payback: Option<f64>,
    /// True for the literal benchmark rows.
    pub reference: bool,
}

impl ComparisonRow {
    fn computed(name: &str, result: &TechnologyResult, incentive: f64) -> Self {
        Self {
            name: name.to_string(),
            annual_reduction: result.net_emissions_reduction,
            lifetime_reduction: result.lifetime_emissions_reduction,
            incentive_cost: incentive,
            cost_per_ton: checked_ratio(incentive, result.net_emissions_reduction),
            lifetime_cost_per_ton: checked_ratio(incentive, result.lifetime_emissions_reduction),
            payback: result.simple_payback_with_incentive(),
            reference: false,
        }
    }

    /// Electric vehicle rebate benchmark (12-year life).
    pub fn ev_reference() -> Self {
        Self {
            name: "EV (Reference)".to_string(),
            annual_reduction: 2.72,
            lifetime_reduction: 32.64,
            incentive_cost: 1000.0,
            cost_per_ton: Some(367.5),
            lifetime_cost_per_ton: Some(30.63),
            payback: Some(3.5),
            reference: true,
        }
    }

    /// E-bike rebate benchmark (10-year life).
    pub fn e_bike_reference() -> Self {
        Self {
            name: "E-Bike (Reference)".to_string(),
            annual_reduction: 0.567,
            lifetime_reduction: 5.67,
            incentive_cost: 300.0,
            cost_per_ton: Some(529.1),
            lifetime_cost_per_ton: Some(52.91),
            payback: Some(2.5),
            reference: true,
        }
    }
}

/// Builds the four-row comparison: both heat-pump categories, then the EV and
/// e-bike benchmarks.
pub fn build_comparison(
    space_heating: &TechnologyResult,
    water_heating: &TechnologyResult,
    space_incentive: f64,
    water_incentive: f64,
) -> Vec<ComparisonRow> {
    vec![
        ComparisonRow::computed("Space Heating HP", space_heating, space_incentive),
        ComparisonRow::computed("Water Heating HP", water_heating, water_incentive),
        ComparisonRow::ev_reference(),
        ComparisonRow::e_bike_reference(),
    ]
}
