//! Emission factors, unit conversions, and incentive valuation rates.

/// Grid electricity emissions (MTCO2e per kWh).
pub const ELECTRICITY_EMISSIONS_FACTOR: f64 = 0.000_015_742;

/// Natural gas combustion emissions (MTCO2e per therm).
pub const GAS_EMISSIONS_FACTOR: f64 = 0.005;

/// Energy content of one therm in kWh.
///
/// Only used to convert the gas load into the equivalent heat-pump electrical load.
pub const THERM_TO_KWH: f64 = 29.3;

/// Incentive value per MTCO2e of annual reduction, one per valuation horizon.
pub const INCENTIVE_RATES_PER_MT: [f64; 3] = [367.5, 551.25, 735.0];

/// Labels for [`INCENTIVE_RATES_PER_MT`], in the same order.
pub const INCENTIVE_LABELS: [&str; 3] = ["1-year value", "Mid-range value", "Lifecycle value"];

/// Index of the mid-range rate, used for program recommendations.
pub const MID_RANGE_RATE_INDEX: usize = 1;
