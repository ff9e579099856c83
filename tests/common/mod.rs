//! Shared test fixtures for integration tests.

use std::path::PathBuf;

use carbon_incentives::calc::params::ParameterSet;
use carbon_incentives::calc::report::Analysis;
use carbon_incentives::config::CalculatorConfig;

/// Baseline configuration (default space and water heating, 10% bundle).
pub fn default_config() -> CalculatorConfig {
    CalculatorConfig::baseline()
}

/// Analysis of [`default_config`].
pub fn default_analysis() -> Analysis {
    Analysis::run(&default_config()).expect("baseline config should run")
}

/// Space-heating defaults with energy use and maintenance chosen so that
/// annual savings are exactly zero.
pub fn zero_savings_params() -> ParameterSet {
    ParameterSet {
        annual_gas_usage: 0.0,
        annual_maintenance_gas: 100.0,
        annual_maintenance_hp: 100.0,
        ..ParameterSet::space_heating()
    }
}

/// Fresh, empty scratch directory unique to this process and `name`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "carbon-incentives-it-{}-{name}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

/// Parses the numeric value of a `Label: value unit` report line.
///
/// Uses the last matching line, so package totals win over per-technology
/// lines sharing the same label.
pub fn parse_metric(stdout: &str, label: &str) -> Option<f64> {
    let line = stdout
        .lines()
        .filter(|line| line.trim_start().starts_with(label))
        .last()?;
    let raw = line.split_once(':').map(|(_, right)| right.trim())?;
    let number = raw.split_whitespace().next()?.trim_start_matches('$');
    number.parse::<f64>().ok()
}
