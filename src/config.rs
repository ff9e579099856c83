//! TOML-based calculator configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calc::params::{MAX_LIFESPAN_YEARS, ParameterSet, Technology};

/// Which summary the binary prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Household view: costs, payback, and NPV per technology.
    #[default]
    Consumer,
    /// Program-administrator view: $/MTCO2e and recommended incentives.
    Program,
}

impl FromStr for ViewMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(ViewMode::Consumer),
            "program" => Ok(ViewMode::Program),
            other => Err(ConfigError {
                field: "view_mode".to_string(),
                message: format!("must be \"consumer\" or \"program\", got \"{other}\""),
            }),
        }
    }
}

/// Complete input state for one calculator run.
///
/// Serialized as JSON when persisted; loaded from TOML through
/// [`ConfigOverrides`] so partial files fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Space-heating inputs.
    pub space_heating: ParameterSet,
    /// Water-heating inputs.
    pub water_heating: ParameterSet,
    /// Extra incentive when both technologies are installed (%).
    pub bundle_discount_percent: f64,
    /// Report flavour.
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Field-by-field overrides for one [`ParameterSet`].
///
/// Every field is optional; absent fields keep the base value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterOverrides {
    pub gas_equipment_cost: Option<f64>,
    pub gas_installation_cost: Option<f64>,
    pub heat_pump_equipment_cost: Option<f64>,
    pub heat_pump_installation_cost: Option<f64>,
    pub current_incentive: Option<f64>,
    pub federal_tax_credit: Option<f64>,
    pub annual_gas_usage: Option<f64>,
    pub usage_percentage: Option<f64>,
    pub gas_equipment_efficiency: Option<f64>,
    pub heat_pump_efficiency_factor: Option<f64>,
    pub electricity_rate: Option<f64>,
    pub gas_rate: Option<f64>,
    pub equipment_lifespan: Option<u32>,
    pub discount_rate: Option<f64>,
    pub annual_maintenance_gas: Option<f64>,
    pub annual_maintenance_hp: Option<f64>,
    pub future_utility_rate_increase: Option<f64>,
}

impl ParameterOverrides {
    /// Returns `base` with every present override applied.
    pub fn apply(&self, base: ParameterSet) -> ParameterSet {
        ParameterSet {
            gas_equipment_cost: self.gas_equipment_cost.unwrap_or(base.gas_equipment_cost),
            gas_installation_cost: self
                .gas_installation_cost
                .unwrap_or(base.gas_installation_cost),
            heat_pump_equipment_cost: self
                .heat_pump_equipment_cost
                .unwrap_or(base.heat_pump_equipment_cost),
            heat_pump_installation_cost: self
                .heat_pump_installation_cost
                .unwrap_or(base.heat_pump_installation_cost),
            current_incentive: self.current_incentive.unwrap_or(base.current_incentive),
            federal_tax_credit: self.federal_tax_credit.unwrap_or(base.federal_tax_credit),
            annual_gas_usage: self.annual_gas_usage.unwrap_or(base.annual_gas_usage),
            usage_percentage: self.usage_percentage.unwrap_or(base.usage_percentage),
            gas_equipment_efficiency: self
                .gas_equipment_efficiency
                .unwrap_or(base.gas_equipment_efficiency),
            heat_pump_efficiency_factor: self
                .heat_pump_efficiency_factor
                .unwrap_or(base.heat_pump_efficiency_factor),
            electricity_rate: self.electricity_rate.unwrap_or(base.electricity_rate),
            gas_rate: self.gas_rate.unwrap_or(base.gas_rate),
            equipment_lifespan: self.equipment_lifespan.unwrap_or(base.equipment_lifespan),
            discount_rate: self.discount_rate.unwrap_or(base.discount_rate),
            annual_maintenance_gas: self
                .annual_maintenance_gas
                .unwrap_or(base.annual_maintenance_gas),
            annual_maintenance_hp: self
                .annual_maintenance_hp
                .unwrap_or(base.annual_maintenance_hp),
            future_utility_rate_increase: self
                .future_utility_rate_increase
                .unwrap_or(base.future_utility_rate_increase),
        }
    }
}

/// On-disk shape of a scenario file: every key optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Bundle discount (%).
    pub bundle_discount_percent: Option<f64>,
    /// Report flavour.
    pub view_mode: Option<ViewMode>,
    /// Space-heating overrides.
    pub space_heating: ParameterOverrides,
    /// Water-heating overrides.
    pub water_heating: ParameterOverrides,
}

impl ConfigOverrides {
    /// Applies these overrides on top of `base`.
    pub fn apply(&self, base: CalculatorConfig) -> CalculatorConfig {
        CalculatorConfig {
            space_heating: self.space_heating.apply(base.space_heating),
            water_heating: self.water_heating.apply(base.water_heating),
            bundle_discount_percent: self
                .bundle_discount_percent
                .unwrap_or(base.bundle_discount_percent),
            view_mode: self.view_mode.unwrap_or(base.view_mode),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"space_heating.equipment_lifespan"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Typical calculator ranges; values outside are allowed but flagged.
const TYPICAL_RANGES: &[(&str, f64, f64)] = &[
    ("annual_gas_usage", 100.0, 1500.0),
    ("usage_percentage", 5.0, 95.0),
    ("electricity_rate", 0.05, 0.30),
    ("gas_rate", 0.5, 3.0),
    ("discount_rate", 1.0, 10.0),
    ("future_utility_rate_increase", 0.0, 10.0),
    ("current_incentive", 0.0, 5000.0),
    ("federal_tax_credit", 0.0, 5000.0),
];

impl CalculatorConfig {
    /// Returns the baseline scenario: a typical single-family home.
    pub fn baseline() -> Self {
        Self {
            space_heating: ParameterSet::space_heating(),
            water_heating: ParameterSet::water_heating(),
            bundle_discount_percent: 10.0,
            view_mode: ViewMode::Consumer,
        }
    }

    /// Returns the high-rates preset: expensive gas, pricier power, faster escalation.
    pub fn high_rates() -> Self {
        Self {
            space_heating: ParameterSet {
                gas_rate: 2.25,
                electricity_rate: 0.16,
                future_utility_rate_increase: 4.0,
                ..ParameterSet::space_heating()
            },
            water_heating: ParameterSet {
                gas_rate: 2.25,
                electricity_rate: 0.16,
                future_utility_rate_increase: 4.0,
                ..ParameterSet::water_heating()
            },
            ..Self::baseline()
        }
    }

    /// Returns the cold-climate preset: heavier heating load, lower seasonal COP.
    pub fn cold_climate() -> Self {
        Self {
            space_heating: ParameterSet {
                annual_gas_usage: 900.0,
                usage_percentage: 70.0,
                heat_pump_efficiency_factor: 2.2,
                heat_pump_equipment_cost: 9500.0,
                current_incentive: 1500.0,
                ..ParameterSet::space_heating()
            },
            water_heating: ParameterSet {
                annual_gas_usage: 900.0,
                usage_percentage: 15.0,
                heat_pump_efficiency_factor: 3.0,
                ..ParameterSet::water_heating()
            },
            bundle_discount_percent: 15.0,
            view_mode: ViewMode::Program,
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_rates", "cold_climate"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_rates" => Ok(Self::high_rates()),
            "cold_climate" => Ok(Self::cold_climate()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Inputs for one technology category.
    pub fn params(&self, technology: Technology) -> &ParameterSet {
        match technology {
            Technology::SpaceHeating => &self.space_heating,
            Technology::WaterHeating => &self.water_heating,
        }
    }

    /// Mutable inputs for one technology category.
    pub fn params_mut(&mut self, technology: Technology) -> &mut ParameterSet {
        match technology {
            Technology::SpaceHeating => &mut self.space_heating,
            Technology::WaterHeating => &mut self.water_heating,
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string; absent keys keep baseline values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides = toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })?;
        Ok(overrides.apply(Self::baseline()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for tech in Technology::ALL {
            let section = section_name(tech);
            let p = self.params(tech);

            for (name, value) in p.numeric_fields() {
                if !value.is_finite() {
                    errors.push(ConfigError {
                        field: format!("{section}.{name}"),
                        message: "must be a finite number".into(),
                    });
                }
            }
            if p.equipment_lifespan == 0 {
                errors.push(ConfigError {
                    field: format!("{section}.equipment_lifespan"),
                    message: "must be >= 1".into(),
                });
            } else if p.equipment_lifespan > MAX_LIFESPAN_YEARS {
                errors.push(ConfigError {
                    field: format!("{section}.equipment_lifespan"),
                    message: format!("must be <= {MAX_LIFESPAN_YEARS}"),
                });
            }
            if p.discount_rate <= -100.0 {
                errors.push(ConfigError {
                    field: format!("{section}.discount_rate"),
                    message: "must be > -100".into(),
                });
            }
            if p.heat_pump_efficiency_factor <= 0.0 {
                errors.push(ConfigError {
                    field: format!("{section}.heat_pump_efficiency_factor"),
                    message: "must be > 0".into(),
                });
            }
            if !(0.0..=100.0).contains(&p.usage_percentage) {
                errors.push(ConfigError {
                    field: format!("{section}.usage_percentage"),
                    message: "must be in [0, 100]".into(),
                });
            }
            if p.annual_gas_usage < 0.0 {
                errors.push(ConfigError {
                    field: format!("{section}.annual_gas_usage"),
                    message: "must be >= 0".into(),
                });
            }
            let rates = [("gas_rate", p.gas_rate), ("electricity_rate", p.electricity_rate)];
            for (name, rate) in rates {
                if rate < 0.0 {
                    errors.push(ConfigError {
                        field: format!("{section}.{name}"),
                        message: "must be >= 0".into(),
                    });
                }
            }
        }

        if !(0.0..=100.0).contains(&self.bundle_discount_percent) {
            errors.push(ConfigError {
                field: "bundle_discount_percent".into(),
                message: "must be in [0, 100]".into(),
            });
        }

        errors
    }

    /// Lists values that are valid but outside the usual calculator ranges.
    pub fn advisories(&self) -> Vec<ConfigError> {
        let mut notes = Vec::new();

        for tech in Technology::ALL {
            let section = section_name(tech);
            let p = self.params(tech);

            let values = p.numeric_fields();
            for (name, lo, hi) in TYPICAL_RANGES {
                let Some((_, value)) = values.iter().find(|(n, _)| n == name) else {
                    continue;
                };
                if *value < *lo || *value > *hi {
                    notes.push(ConfigError {
                        field: format!("{section}.{name}"),
                        message: format!("{value} is outside the typical range {lo}-{hi}"),
                    });
                }
            }

            let (cop_lo, cop_hi) = match tech {
                Technology::SpaceHeating => (1.5, 5.0),
                Technology::WaterHeating => (2.0, 4.0),
            };
            let cop = p.heat_pump_efficiency_factor;
            if cop > 0.0 && !(cop_lo..=cop_hi).contains(&cop) {
                notes.push(ConfigError {
                    field: format!("{section}.heat_pump_efficiency_factor"),
                    message: format!("{cop} is outside the typical range {cop_lo}-{cop_hi}"),
                });
            }
            if p.equipment_lifespan > 0 && !(8..=25).contains(&p.equipment_lifespan) {
                notes.push(ConfigError {
                    field: format!("{section}.equipment_lifespan"),
                    message: format!(
                        "{} years is outside the typical range 8-25",
                        p.equipment_lifespan
                    ),
                });
            }
        }

        notes
    }
}

fn section_name(technology: Technology) -> &'static str {
    match technology {
        Technology::SpaceHeating => "space_heating",
        Technology::WaterHeating => "water_heating",
    }
}
