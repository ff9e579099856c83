//! Emissions, operating cost, payback, and NPV for one technology category.

use log::debug;
use serde::Serialize;

use super::constants::{
    ELECTRICITY_EMISSIONS_FACTOR, GAS_EMISSIONS_FACTOR, INCENTIVE_RATES_PER_MT, THERM_TO_KWH,
};
use super::params::{ParamError, ParameterSet, Technology};
use super::ratio::checked_ratio;

/// Cumulative cost and emissions at the end of one year of ownership.
///
/// Year 0 carries the upfront costs and zero emissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSnapshot {
    /// Years since installation.
    pub year: u32,
    /// Upfront plus escalated operating cost of the gas system to date.
    pub cumulative_cost_gas: f64,
    /// Upfront plus escalated operating cost of the heat pump to date.
    pub cumulative_cost_hp: f64,
    /// `cumulative_cost_gas - cumulative_cost_hp`.
    pub savings: f64,
    /// Gas emissions to date (MTCO2e).
    pub cumulative_emissions_gas: f64,
    /// Heat-pump emissions to date (MTCO2e).
    pub cumulative_emissions_hp: f64,
    /// Emissions avoided to date (MTCO2e).
    pub cumulative_emissions_savings: f64,
}

/// Derived metrics for one technology category.
///
/// Produced fresh by [`calculate`] on every call. Payback fields are `None`
/// when annual savings are exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyResult {
    /// Category these figures belong to.
    pub technology: Technology,
    /// Therms attributable to this end use per year.
    pub therms: f64,
    /// Heat-pump electrical load delivering the same useful energy (kWh/yr).
    pub kwh_equivalent: f64,
    /// Gas system emissions (MTCO2e/yr).
    pub annual_emissions_gas: f64,
    /// Heat-pump emissions (MTCO2e/yr).
    pub annual_emissions_hp: f64,
    /// Gas minus heat-pump emissions (MTCO2e/yr). May be negative.
    pub net_emissions_reduction: f64,
    /// `net_emissions_reduction * equipment_lifespan`.
    pub lifetime_emissions_reduction: f64,
    /// Energy plus maintenance cost of the gas system ($/yr).
    pub annual_cost_gas: f64,
    /// Energy plus maintenance cost of the heat pump ($/yr).
    pub annual_cost_hp: f64,
    /// `annual_cost_gas - annual_cost_hp`.
    pub annual_savings: f64,
    /// Incremental cost after incentives divided by annual savings.
    pub simple_payback_years: Option<f64>,
    /// Incremental cost before incentives divided by annual savings.
    pub simple_payback_no_incentive: Option<f64>,
    /// Discounted, escalated savings minus the incremental cost.
    pub net_present_value: f64,
    /// Suggested incentive at each valuation rate, rounded to cents.
    pub optimal_incentives: [f64; 3],
    /// Years `0..=equipment_lifespan`.
    pub year_by_year_data: Vec<YearSnapshot>,
    /// Gas equipment plus installation.
    pub initial_cost_gas: f64,
    /// Heat-pump equipment plus installation, less incentive and tax credit.
    pub initial_cost_hp: f64,
    /// `initial_cost_hp - initial_cost_gas`. Negative when the heat pump is cheaper.
    pub additional_cost: f64,
}

impl TechnologyResult {
    /// Payback including incentives; always equal to `simple_payback_years`.
    pub fn simple_payback_with_incentive(&self) -> Option<f64> {
        self.simple_payback_years
    }
}

/// Rounds to two decimal places using the exact binary value.
///
/// `0.015` is stored just below the half cent and becomes `0.01`. A value
/// that lands exactly on a half cent rounds away from zero.
pub fn round_cents(value: f64) -> f64 {
    let magnitude = value.abs();
    let scaled = magnitude * 100.0;
    // The fused residual is zero only when `scaled` holds the exact product.
    let exact_tie = scaled.fract() == 0.5 && magnitude.mul_add(100.0, -scaled) == 0.0;
    let rounded = if exact_tie {
        scaled.ceil() / 100.0
    } else {
        format!("{magnitude:.2}")
            .parse()
            .unwrap_or_else(|_| scaled.round() / 100.0)
    };
    rounded.copysign(value)
}

/// Computes every derived metric for one technology from its parameters.
///
/// Pure and deterministic: identical inputs give bit-identical results.
///
/// # Errors
///
/// Returns a [`ParamError`] if `params` fails [`ParameterSet::check`].
///
/// # Examples
///
/// ```
/// use carbon_incentives::calc::params::{ParameterSet, Technology};
/// use carbon_incentives::calc::technology::calculate;
///
/// let result = calculate(Technology::SpaceHeating, &ParameterSet::space_heating()).unwrap();
/// assert_eq!(result.additional_cost, 1800.0);
/// assert_eq!(result.year_by_year_data.len(), 16);
/// ```
pub fn calculate(
    technology: Technology,
    params: &ParameterSet,
) -> Result<TechnologyResult, ParamError> {
    params.check()?;

    let therms = params.annual_gas_usage * (params.usage_percentage / 100.0);
    let annual_emissions_gas = therms * GAS_EMISSIONS_FACTOR;
    let kwh_equivalent = (therms * THERM_TO_KWH) / params.heat_pump_efficiency_factor;
    let annual_emissions_hp = kwh_equivalent * ELECTRICITY_EMISSIONS_FACTOR;

    let net_emissions_reduction = annual_emissions_gas - annual_emissions_hp;
    let lifetime_emissions_reduction =
        net_emissions_reduction * f64::from(params.equipment_lifespan);

    let annual_cost_gas = therms * params.gas_rate + params.annual_maintenance_gas;
    let annual_cost_hp = kwh_equivalent * params.electricity_rate + params.annual_maintenance_hp;
    let annual_savings = annual_cost_gas - annual_cost_hp;

    let initial_cost_gas = params.gas_equipment_cost + params.gas_installation_cost;
    let initial_cost_hp_gross = params.heat_pump_equipment_cost + params.heat_pump_installation_cost;
    let initial_cost_hp =
        initial_cost_hp_gross - params.current_incentive - params.federal_tax_credit;

    let additional_cost = initial_cost_hp - initial_cost_gas;
    let simple_payback_years = checked_ratio(additional_cost, annual_savings);
    let simple_payback_no_incentive =
        checked_ratio(initial_cost_hp_gross - initial_cost_gas, annual_savings);

    let net_present_value = net_present_value(params, annual_savings, additional_cost);
    let optimal_incentives =
        INCENTIVE_RATES_PER_MT.map(|rate| round_cents(net_emissions_reduction * rate));

    let year_by_year_data = year_by_year(
        params,
        therms,
        kwh_equivalent,
        initial_cost_gas,
        initial_cost_hp,
        annual_emissions_gas,
        annual_emissions_hp,
    );

    debug!(
        "{technology}: reduction={net_emissions_reduction:.4} MTCO2e/yr, savings={annual_savings:.2}/yr, npv={net_present_value:.2}"
    );

    Ok(TechnologyResult {
        technology,
        therms,
        kwh_equivalent,
        annual_emissions_gas,
        annual_emissions_hp,
        net_emissions_reduction,
        lifetime_emissions_reduction,
        annual_cost_gas,
        annual_cost_hp,
        annual_savings,
        simple_payback_years,
        simple_payback_no_incentive,
        net_present_value,
        optimal_incentives,
        year_by_year_data,
        initial_cost_gas,
        initial_cost_hp,
        additional_cost,
    })
}

/// NPV of the heat-pump upgrade over the equipment lifespan.
///
/// Savings escalate by the utility rate increase before discounting, so year 1
/// already carries one escalation step.
fn net_present_value(params: &ParameterSet, annual_savings: f64, additional_cost: f64) -> f64 {
    let escalation = 1.0 + params.future_utility_rate_increase / 100.0;
    let discount = 1.0 + params.discount_rate / 100.0;

    let mut npv = -additional_cost;
    let mut current_savings = annual_savings;
    for year in 1..=params.equipment_lifespan {
        current_savings *= escalation;
        npv += current_savings / discount.powf(f64::from(year));
    }
    npv
}

// Energy costs escalate from year 2 onward; emissions accumulate linearly.
fn year_by_year(
    params: &ParameterSet,
    therms: f64,
    kwh_equivalent: f64,
    initial_cost_gas: f64,
    initial_cost_hp: f64,
    annual_emissions_gas: f64,
    annual_emissions_hp: f64,
) -> Vec<YearSnapshot> {
    let escalation = 1.0 + params.future_utility_rate_increase / 100.0;
    let net_emissions_reduction = annual_emissions_gas - annual_emissions_hp;

    let mut cumulative_cost_gas = initial_cost_gas;
    let mut cumulative_cost_hp = initial_cost_hp;
    let mut data = Vec::with_capacity(params.equipment_lifespan as usize + 1);

    for year in 0..=params.equipment_lifespan {
        if year > 0 {
            let factor = escalation.powf(f64::from(year - 1));
            cumulative_cost_gas += therms * params.gas_rate * factor + params.annual_maintenance_gas;
            cumulative_cost_hp +=
                kwh_equivalent * params.electricity_rate * factor + params.annual_maintenance_hp;
        }

        let y = f64::from(year);
        data.push(YearSnapshot {
            year,
            cumulative_cost_gas,
            cumulative_cost_hp,
            savings: cumulative_cost_gas - cumulative_cost_hp,
            cumulative_emissions_gas: y * annual_emissions_gas,
            cumulative_emissions_hp: y * annual_emissions_hp,
            cumulative_emissions_savings: y * net_emissions_reduction,
        });
    }
    data
}
