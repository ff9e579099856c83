//! One-at-a-time sensitivity sweeps over a single input parameter.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::params::{ParamError, ParameterSet, Technology};
use super::technology::calculate;

/// Number of samples in a sweep, spanning `-range..=+range`.
pub const SWEEP_POINTS: usize = 9;

/// Input parameters that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    GasRate,
    ElectricityRate,
    HeatPumpEfficiencyFactor,
    CurrentIncentive,
    GasEquipmentCost,
    HeatPumpEquipmentCost,
}

impl SweepParameter {
    /// Every sweepable parameter.
    pub const ALL: [SweepParameter; 6] = [
        SweepParameter::GasRate,
        SweepParameter::ElectricityRate,
        SweepParameter::HeatPumpEfficiencyFactor,
        SweepParameter::CurrentIncentive,
        SweepParameter::GasEquipmentCost,
        SweepParameter::HeatPumpEquipmentCost,
    ];

    /// Human-readable axis label.
    pub fn label(self, technology: Technology) -> &'static str {
        match self {
            SweepParameter::GasRate => "Gas Rate ($/therm)",
            SweepParameter::ElectricityRate => "Electricity Rate ($/kWh)",
            SweepParameter::HeatPumpEfficiencyFactor => technology.efficiency_label(),
            SweepParameter::CurrentIncentive => "Incentive Amount",
            SweepParameter::GasEquipmentCost => "Gas Equipment Cost",
            SweepParameter::HeatPumpEquipmentCost => "Heat Pump Cost",
        }
    }

    /// Reads this parameter from `params`.
    pub fn get(self, params: &ParameterSet) -> f64 {
        match self {
            SweepParameter::GasRate => params.gas_rate,
            SweepParameter::ElectricityRate => params.electricity_rate,
            SweepParameter::HeatPumpEfficiencyFactor => params.heat_pump_efficiency_factor,
            SweepParameter::CurrentIncentive => params.current_incentive,
            SweepParameter::GasEquipmentCost => params.gas_equipment_cost,
            SweepParameter::HeatPumpEquipmentCost => params.heat_pump_equipment_cost,
        }
    }

    /// Overwrites this parameter in `params`.
    pub fn set(self, params: &mut ParameterSet, value: f64) {
        let slot = match self {
            SweepParameter::GasRate => &mut params.gas_rate,
            SweepParameter::ElectricityRate => &mut params.electricity_rate,
            SweepParameter::HeatPumpEfficiencyFactor => &mut params.heat_pump_efficiency_factor,
            SweepParameter::CurrentIncentive => &mut params.current_incentive,
            SweepParameter::GasEquipmentCost => &mut params.gas_equipment_cost,
            SweepParameter::HeatPumpEquipmentCost => &mut params.heat_pump_equipment_cost,
        };
        *slot = value;
    }

    fn as_str(self) -> &'static str {
        match self {
            SweepParameter::GasRate => "gas_rate",
            SweepParameter::ElectricityRate => "electricity_rate",
            SweepParameter::HeatPumpEfficiencyFactor => "heat_pump_efficiency_factor",
            SweepParameter::CurrentIncentive => "current_incentive",
            SweepParameter::GasEquipmentCost => "gas_equipment_cost",
            SweepParameter::HeatPumpEquipmentCost => "heat_pump_equipment_cost",
        }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepParameter {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gas_rate" | "gasRate" => Ok(SweepParameter::GasRate),
            "electricity_rate" | "electricityRate" => Ok(SweepParameter::ElectricityRate),
            "heat_pump_efficiency_factor" | "heatPumpCOP" | "heatPumpWaterHeaterEF" | "cop"
            | "ef" => Ok(SweepParameter::HeatPumpEfficiencyFactor),
            "current_incentive" | "currentIncentive" => Ok(SweepParameter::CurrentIncentive),
            "gas_equipment_cost" | "gasHeaterCost" | "gasWaterHeaterCost" => {
                Ok(SweepParameter::GasEquipmentCost)
            }
            "heat_pump_equipment_cost" | "heatPumpCost" | "heatPumpWaterHeaterCost" => {
                Ok(SweepParameter::HeatPumpEquipmentCost)
            }
            other => Err(ParamError::UnknownParameter(other.to_string())),
        }
    }
}

/// Outcome of one scaled calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityPoint {
    /// Percent change applied to the swept parameter.
    pub change_percent: f64,
    /// Parameter value after scaling.
    pub parameter_value: f64,
    /// Simple payback with incentives.
    pub payback_years: Option<f64>,
    /// Annual emissions reduction.
    pub net_emissions_reduction: f64,
    /// Net present value.
    pub net_present_value: f64,
}

/// Percent changes for a sweep of `±range_percent` in quarter steps.
pub fn change_percents(range_percent: f64) -> [f64; SWEEP_POINTS] {
    std::array::from_fn(|k| -range_percent + k as f64 * range_percent / 4.0)
}

/// Recalculates `technology` with `parameter` scaled across `±range_percent`.
///
/// Returns [`SWEEP_POINTS`] points ordered from `-range` to `+range`. The
/// base parameters are never modified; each sample works on its own copy.
///
/// # Errors
///
/// Returns [`ParamError::InvalidRange`] for a non-positive or non-finite
/// range, or any error [`calculate`] raises for a scaled parameter set.
pub fn sweep(
    base_params: &ParameterSet,
    parameter: SweepParameter,
    technology: Technology,
    range_percent: f64,
) -> Result<Vec<SensitivityPoint>, ParamError> {
    if !range_percent.is_finite() || range_percent <= 0.0 {
        return Err(ParamError::InvalidRange(range_percent));
    }

    let current_value = parameter.get(base_params);
    debug!("sweeping {parameter} for {technology} by ±{range_percent}% around {current_value}");

    change_percents(range_percent)
        .into_iter()
        .map(|change_percent| {
            let parameter_value = current_value * (1.0 + change_percent / 100.0);
            let mut params = base_params.clone();
            parameter.set(&mut params, parameter_value);
            let result = calculate(technology, &params)?;
            Ok(SensitivityPoint {
                change_percent,
                parameter_value,
                payback_years: result.simple_payback_years,
                net_emissions_reduction: result.net_emissions_reduction,
                net_present_value: result.net_present_value,
            })
        })
        .collect()
}
