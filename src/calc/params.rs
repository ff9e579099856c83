//! Per-technology input parameters and boundary checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest analysis horizon accepted, in years.
pub const MAX_LIFESPAN_YEARS: u32 = 100;

/// End use being electrified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    /// Gas furnace replaced by an air-source heat pump (efficiency = COP).
    SpaceHeating,
    /// Gas water heater replaced by a heat-pump water heater (efficiency = energy factor).
    WaterHeating,
}

impl Technology {
    /// Both categories, space heating first.
    pub const ALL: [Technology; 2] = [Technology::SpaceHeating, Technology::WaterHeating];

    /// Display name used in reports and exports.
    pub fn label(self) -> &'static str {
        match self {
            Technology::SpaceHeating => "Space Heating",
            Technology::WaterHeating => "Water Heating",
        }
    }

    /// Name of the efficiency rating for this category.
    pub fn efficiency_label(self) -> &'static str {
        match self {
            Technology::SpaceHeating => "Heat Pump COP",
            Technology::WaterHeating => "HPWH Efficiency Factor",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Technology {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "space_heating" | "spaceHeating" | "space" => Ok(Technology::SpaceHeating),
            "water_heating" | "waterHeating" | "water" => Ok(Technology::WaterHeating),
            other => Err(ParamError::UnknownTechnology(other.to_string())),
        }
    }
}

/// Invalid input rejected before any calculation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// `equipment_lifespan` must be at least one year.
    ZeroLifespan,
    /// `equipment_lifespan` exceeds [`MAX_LIFESPAN_YEARS`].
    LifespanTooLong(u32),
    /// `discount_rate` must be above -100% so every discount factor is positive.
    InvalidDiscountRate(f64),
    /// `heat_pump_efficiency_factor` must be finite and > 0.
    NonPositiveEfficiency(f64),
    /// A numeric field is NaN or infinite.
    NonFinite(&'static str),
    /// Sensitivity range must be finite and > 0.
    InvalidRange(f64),
    /// Unrecognised technology name.
    UnknownTechnology(String),
    /// Unrecognised sensitivity parameter name.
    UnknownParameter(String),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::ZeroLifespan => write!(f, "invalid parameter: equipment_lifespan must be >= 1"),
            ParamError::LifespanTooLong(v) => write!(
                f,
                "invalid parameter: equipment_lifespan must be <= {MAX_LIFESPAN_YEARS}, got {v}"
            ),
            ParamError::InvalidDiscountRate(v) => write!(
                f,
                "invalid parameter: discount_rate must be > -100, got {v}"
            ),
            ParamError::NonPositiveEfficiency(v) => write!(
                f,
                "invalid parameter: heat_pump_efficiency_factor must be > 0, got {v}"
            ),
            ParamError::NonFinite(field) => {
                write!(f, "invalid parameter: {field} must be a finite number")
            }
            ParamError::InvalidRange(v) => {
                write!(f, "invalid parameter: sensitivity range must be > 0, got {v}")
            }
            ParamError::UnknownTechnology(name) => write!(
                f,
                "unknown technology \"{name}\", expected \"space_heating\" or \"water_heating\""
            ),
            ParamError::UnknownParameter(name) => {
                write!(f, "unknown sensitivity parameter \"{name}\"")
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Cost, efficiency, and rate inputs for one technology category.
///
/// Percent-valued fields (`usage_percentage`, `discount_rate`,
/// `future_utility_rate_increase`) are stored on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSet {
    /// Incumbent gas equipment cost.
    pub gas_equipment_cost: f64,
    /// Incumbent gas installation cost.
    pub gas_installation_cost: f64,
    /// Heat-pump equipment cost.
    pub heat_pump_equipment_cost: f64,
    /// Heat-pump installation cost.
    pub heat_pump_installation_cost: f64,
    /// Local program incentive subtracted from the heat-pump cost.
    pub current_incentive: f64,
    /// Federal tax credit subtracted from the heat-pump cost.
    pub federal_tax_credit: f64,
    /// Total household gas consumption (therms/yr).
    pub annual_gas_usage: f64,
    /// Share of `annual_gas_usage` attributable to this end use (%).
    pub usage_percentage: f64,
    /// Incumbent gas system efficiency. Informational only.
    pub gas_equipment_efficiency: f64,
    /// COP for space heating, energy factor for water heating.
    pub heat_pump_efficiency_factor: f64,
    /// Electricity price ($/kWh).
    pub electricity_rate: f64,
    /// Gas price ($/therm).
    pub gas_rate: f64,
    /// Analysis horizon in years.
    pub equipment_lifespan: u32,
    /// NPV discount rate (%).
    pub discount_rate: f64,
    /// Yearly upkeep of the gas system.
    pub annual_maintenance_gas: f64,
    /// Yearly upkeep of the heat pump.
    pub annual_maintenance_hp: f64,
    /// Annual escalation applied to both energy rates (%).
    pub future_utility_rate_increase: f64,
}

impl ParameterSet {
    /// Default inputs for a ducted gas furnace versus a cold-climate heat pump.
    pub fn space_heating() -> Self {
        Self {
            gas_equipment_cost: 3000.0,
            gas_installation_cost: 1000.0,
            heat_pump_equipment_cost: 7000.0,
            heat_pump_installation_cost: 1500.0,
            current_incentive: 700.0,
            federal_tax_credit: 2000.0,
            annual_gas_usage: 567.0,
            usage_percentage: 53.0,
            gas_equipment_efficiency: 0.85,
            heat_pump_efficiency_factor: 3.0,
            electricity_rate: 0.11,
            gas_rate: 1.50,
            equipment_lifespan: 15,
            discount_rate: 3.0,
            annual_maintenance_gas: 150.0,
            annual_maintenance_hp: 100.0,
            future_utility_rate_increase: 2.0,
        }
    }

    /// Default inputs for a gas tank water heater versus a heat-pump water heater.
    pub fn water_heating() -> Self {
        Self {
            gas_equipment_cost: 1200.0,
            gas_installation_cost: 600.0,
            heat_pump_equipment_cost: 2000.0,
            heat_pump_installation_cost: 500.0,
            current_incentive: 300.0,
            federal_tax_credit: 600.0,
            annual_gas_usage: 567.0,
            usage_percentage: 20.0,
            gas_equipment_efficiency: 0.65,
            heat_pump_efficiency_factor: 3.5,
            electricity_rate: 0.11,
            gas_rate: 1.50,
            equipment_lifespan: 12,
            discount_rate: 3.0,
            annual_maintenance_gas: 50.0,
            annual_maintenance_hp: 25.0,
            future_utility_rate_increase: 2.0,
        }
    }

    /// Default inputs for the given category.
    pub fn defaults_for(technology: Technology) -> Self {
        match technology {
            Technology::SpaceHeating => Self::space_heating(),
            Technology::WaterHeating => Self::water_heating(),
        }
    }

    /// Rejects inputs the calculator cannot give a meaningful answer for.
    ///
    /// Negative costs, savings, or emissions deltas are all legitimate and
    /// pass. Refused: a horizon outside `1..=MAX_LIFESPAN_YEARS`, a
    /// non-positive efficiency factor, a discount rate at or below -100%,
    /// and any non-finite field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParamError`] found.
    pub fn check(&self) -> Result<(), ParamError> {
        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(ParamError::NonFinite(name));
            }
        }
        if self.equipment_lifespan == 0 {
            return Err(ParamError::ZeroLifespan);
        }
        if self.equipment_lifespan > MAX_LIFESPAN_YEARS {
            return Err(ParamError::LifespanTooLong(self.equipment_lifespan));
        }
        if self.discount_rate <= -100.0 {
            return Err(ParamError::InvalidDiscountRate(self.discount_rate));
        }
        if self.heat_pump_efficiency_factor <= 0.0 {
            return Err(ParamError::NonPositiveEfficiency(
                self.heat_pump_efficiency_factor,
            ));
        }
        Ok(())
    }

    /// All floating-point fields paired with their names.
    pub fn numeric_fields(&self) -> [(&'static str, f64); 16] {
        [
            ("gas_equipment_cost", self.gas_equipment_cost),
            ("gas_installation_cost", self.gas_installation_cost),
            ("heat_pump_equipment_cost", self.heat_pump_equipment_cost),
            ("heat_pump_installation_cost", self.heat_pump_installation_cost),
            ("current_incentive", self.current_incentive),
            ("federal_tax_credit", self.federal_tax_credit),
            ("annual_gas_usage", self.annual_gas_usage),
            ("usage_percentage", self.usage_percentage),
            ("gas_equipment_efficiency", self.gas_equipment_efficiency),
            ("heat_pump_efficiency_factor", self.heat_pump_efficiency_factor),
            ("electricity_rate", self.electricity_rate),
            ("gas_rate", self.gas_rate),
            ("discount_rate", self.discount_rate),
            ("annual_maintenance_gas", self.annual_maintenance_gas),
            ("annual_maintenance_hp", self.annual_maintenance_hp),
            ("future_utility_rate_increase", self.future_utility_rate_increase),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_check() {
        for tech in Technology::ALL {
            assert_eq!(ParameterSet::defaults_for(tech).check(), Ok(()));
        }
    }

    #[test]
    fn zero_lifespan_rejected() {
        let mut p = ParameterSet::space_heating();
        p.equipment_lifespan = 0;
        assert_eq!(p.check(), Err(ParamError::ZeroLifespan));
    }

    #[test]
    fn lifespan_above_cap_rejected() {
        let mut p = ParameterSet::space_heating();
        p.equipment_lifespan = MAX_LIFESPAN_YEARS;
        assert!(p.check().is_ok());
        p.equipment_lifespan = u32::MAX;
        assert_eq!(p.check(), Err(ParamError::LifespanTooLong(u32::MAX)));
    }

    #[test]
    fn discount_rate_at_minus_hundred_rejected() {
        let mut p = ParameterSet::space_heating();
        p.discount_rate = -100.0;
        assert_eq!(p.check(), Err(ParamError::InvalidDiscountRate(-100.0)));
        p.discount_rate = -99.0;
        assert!(p.check().is_ok());
        p.discount_rate = 0.0;
        assert!(p.check().is_ok());
    }

    #[test]
    fn non_positive_efficiency_rejected() {
        let mut p = ParameterSet::water_heating();
        p.heat_pump_efficiency_factor = 0.0;
        assert_eq!(p.check(), Err(ParamError::NonPositiveEfficiency(0.0)));
        p.heat_pump_efficiency_factor = -1.5;
        assert!(p.check().is_err());
    }

    #[test]
    fn nan_field_rejected() {
        let mut p = ParameterSet::space_heating();
        p.gas_rate = f64::NAN;
        assert_eq!(p.check(), Err(ParamError::NonFinite("gas_rate")));
    }

    #[test]
    fn negative_incentive_is_allowed() {
        let mut p = ParameterSet::space_heating();
        p.current_incentive = -100.0;
        assert!(p.check().is_ok());
    }

    #[test]
    fn technology_parses_both_spellings() {
        assert_eq!("spaceHeating".parse(), Ok(Technology::SpaceHeating));
        assert_eq!("water_heating".parse(), Ok(Technology::WaterHeating));
        assert!("pool_heating".parse::<Technology>().is_err());
    }
}
