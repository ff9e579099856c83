//! Package-level totals when both technologies are installed together.

use serde::Serialize;

use super::ratio::checked_ratio;
use super::technology::TechnologyResult;

/// Aggregate figures for a space-heating plus water-heating package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedResult {
    /// Bundle discount as a dollar amount: `(space + water incentive) * pct / 100`.
    pub bundle_discount_amount: f64,
    /// Both incentives plus the bundle discount, which counts as extra incentive here.
    pub total_incentive: f64,
    /// Sum of both annual reductions (MTCO2e/yr).
    pub net_emissions_reduction: f64,
    /// Sum of both lifetime reductions (MTCO2e).
    pub lifetime_emissions_reduction: f64,
    /// `total_incentive / net_emissions_reduction`.
    pub cost_per_mtco2e: Option<f64>,
    /// `total_incentive / lifetime_emissions_reduction`.
    pub lifetime_cost_per_mtco2e: Option<f64>,
    /// Both additional costs less the bundle discount, which reduces cost here.
    pub combined_additional_cost: f64,
    /// Sum of both annual savings.
    pub combined_annual_savings: f64,
    /// `combined_additional_cost / combined_annual_savings`.
    pub payback_period: Option<f64>,
}

/// Merges two technology results and a bundle discount into package totals.
///
/// The bundle discount is added to the incentive total but subtracted from
/// the incremental cost used for payback. Both conventions are intentional
/// and kept separate.
///
/// # Arguments
///
/// * `space_heating` - Space-heating result
/// * `water_heating` - Water-heating result
/// * `space_incentive` - Space-heating program incentive
/// * `water_incentive` - Water-heating program incentive
/// * `bundle_discount_percent` - Bundle discount on a 0–100 scale
pub fn combine(
    space_heating: &TechnologyResult,
    water_heating: &TechnologyResult,
    space_incentive: f64,
    water_incentive: f64,
    bundle_discount_percent: f64,
) -> CombinedResult {
    let bundle_discount_amount = (space_incentive + water_incentive) * (bundle_discount_percent / 100.0);
    let total_incentive = space_incentive + water_incentive + bundle_discount_amount;

    let net_emissions_reduction =
        space_heating.net_emissions_reduction + water_heating.net_emissions_reduction;
    let lifetime_emissions_reduction =
        space_heating.lifetime_emissions_reduction + water_heating.lifetime_emissions_reduction;

    let combined_additional_cost =
        (space_heating.additional_cost + water_heating.additional_cost) - bundle_discount_amount;
    let combined_annual_savings = space_heating.annual_savings + water_heating.annual_savings;

    CombinedResult {
        bundle_discount_amount,
        total_incentive,
        net_emissions_reduction,
        lifetime_emissions_reduction,
        cost_per_mtco2e: checked_ratio(total_incentive, net_emissions_reduction),
        lifetime_cost_per_mtco2e: checked_ratio(total_incentive, lifetime_emissions_reduction),
        combined_additional_cost,
        combined_annual_savings,
        payback_period: checked_ratio(combined_additional_cost, combined_annual_savings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::params::{ParameterSet, Technology};
    use crate::calc::technology::calculate;

    fn defaults() -> (TechnologyResult, TechnologyResult) {
        let space = calculate(Technology::SpaceHeating, &ParameterSet::space_heating()).unwrap();
        let water = calculate(Technology::WaterHeating, &ParameterSet::water_heating()).unwrap();
        (space, water)
    }

    #[test]
    fn bundle_discount_is_added_to_incentive() {
        let (space, water) = defaults();
        let c = combine(&space, &water, 700.0, 300.0, 10.0);
        assert_eq!(c.bundle_discount_amount, 100.0);
        assert_eq!(c.total_incentive, 1100.0);
    }

    #[test]
    fn bundle_discount_is_subtracted_from_cost() {
        let (space, water) = defaults();
        let c = combine(&space, &water, 700.0, 300.0, 10.0);
        // space 1800 + water (2500 - 900 - 1800 = -200) - 100
        assert_eq!(c.combined_additional_cost, 1500.0);
        let expected = 1500.0 / (space.annual_savings + water.annual_savings);
        assert_eq!(c.payback_period, Some(expected));
    }

    #[test]
    fn reductions_are_exact_sums() {
        let (space, water) = defaults();
        let c = combine(&space, &water, 700.0, 300.0, 0.0);
        assert_eq!(
            c.net_emissions_reduction,
            space.net_emissions_reduction + water.net_emissions_reduction
        );
        assert_eq!(
            c.lifetime_emissions_reduction,
            space.lifetime_emissions_reduction + water.lifetime_emissions_reduction
        );
        assert_eq!(c.bundle_discount_amount, 0.0);
    }

    #[test]
    fn zero_reduction_leaves_cost_per_ton_undefined() {
        let (mut space, mut water) = defaults();
        space.net_emissions_reduction = 0.0;
        water.net_emissions_reduction = 0.0;
        space.lifetime_emissions_reduction = 0.0;
        water.lifetime_emissions_reduction = 0.0;
        let c = combine(&space, &water, 700.0, 300.0, 10.0);
        assert_eq!(c.cost_per_mtco2e, None);
        assert_eq!(c.lifetime_cost_per_mtco2e, None);
    }
}
