//! Runs the binary over the shipped scenario files.

mod common;

use std::process::{Command, Output};

use carbon_incentives::config::CalculatorConfig;

#[derive(Debug)]
struct Totals {
    total_incentive: f64,
    annual_reduction: f64,
    payback_years: f64,
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carbon-incentives"))
        .args(args)
        .output()
        .expect("carbon-incentives process should run")
}

fn run_and_parse_totals(path: &str) -> Totals {
    let output = run_cli(&["--scenario", path, "--view", "consumer"]);
    assert!(
        output.status.success(),
        "scenario run failed for {path}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    let metric = |label: &str| {
        common::parse_metric(&stdout, label)
            .unwrap_or_else(|| panic!("missing line `{label}` in output: {stdout}"))
    };
    Totals {
        total_incentive: metric("Total incentive:"),
        annual_reduction: metric("Annual reduction:"),
        payback_years: metric("Payback period:"),
    }
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_results() {
    let baseline = run_and_parse_totals("scenarios/baseline.toml");
    let high_rates = run_and_parse_totals("scenarios/high_rates.toml");
    let cold = run_and_parse_totals("scenarios/cold_climate.toml");

    assert_eq!(baseline.total_incentive, 1100.0);
    assert_eq!(high_rates.total_incentive, 1100.0);
    // (1500 + 300) * 1.15
    assert_eq!(cold.total_incentive, 2070.0);

    assert!(
        high_rates.payback_years < baseline.payback_years,
        "expected pricier gas to shorten payback: baseline={:.1}, high_rates={:.1}",
        baseline.payback_years,
        high_rates.payback_years
    );
    assert_eq!(baseline.annual_reduction, high_rates.annual_reduction);
    assert!(
        cold.annual_reduction > baseline.annual_reduction,
        "expected the cold-climate load to avoid more emissions: baseline={:.2}, cold={:.2}",
        baseline.annual_reduction,
        cold.annual_reduction
    );
}

#[test]
fn scenario_files_match_presets() {
    for name in CalculatorConfig::PRESETS {
        let path = format!("scenarios/{name}.toml");
        let from_file = CalculatorConfig::from_toml_file(path.as_ref());
        let preset = CalculatorConfig::from_preset(name);
        assert!(from_file.is_ok(), "{path} should parse: {:?}", from_file.err());
        assert_eq!(from_file.ok(), preset.ok(), "{path} differs from preset");
    }
}

#[test]
fn program_view_prints_administrator_table() {
    let output = run_cli(&["--preset", "cold_climate"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Program Administrator Summary ---"));
    assert!(stdout.contains("Combined Package"));
    assert!(stdout.contains("Recommended rate: $551.25/MTCO2e"));
}

#[test]
fn invalid_scenario_exits_with_error() {
    let dir = common::scratch_dir("invalid-scenario");
    let path = dir.join("bad.toml");
    std::fs::write(&path, "[space_heating]\nequipment_lifespan = 0\n").expect("write scenario");

    let output = run_cli(&["--scenario", path.to_str().unwrap_or_default()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("space_heating.equipment_lifespan"));
}

#[test]
fn sweep_and_exports_write_files() {
    let dir = common::scratch_dir("exports");
    let sweep_csv = dir.join("sweep.csv");
    let summary_csv = dir.join("summary.csv");
    let json = dir.join("results.json");

    let output = run_cli(&[
        "--sweep",
        "gasRate:space:50",
        "--sweep-out",
        sweep_csv.to_str().unwrap_or_default(),
        "--csv-out",
        summary_csv.to_str().unwrap_or_default(),
        "--json-out",
        json.to_str().unwrap_or_default(),
    ]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let sweep = std::fs::read_to_string(&sweep_csv).expect("sweep csv written");
    assert_eq!(sweep.lines().count(), 1 + 9);

    let summary = std::fs::read_to_string(&summary_csv).expect("summary csv written");
    assert!(summary.starts_with("Category,Parameter,Value"));

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).expect("json written"))
            .expect("valid json");
    assert_eq!(parsed["results"]["combined"]["total_incentive"], 1100.0);
}
