//! CSV and JSON export of calculator results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::calc::comparison::ComparisonRow;
use crate::calc::report::Analysis;
use crate::calc::sensitivity::SensitivityPoint;
use crate::calc::technology::TechnologyResult;
use crate::config::CalculatorConfig;

/// Column header for the year-by-year export.
const TIMELINE_HEADER: &str = "technology,year,cumulative_cost_gas,cumulative_cost_hp,savings,\
                               cumulative_emissions_gas,cumulative_emissions_hp,\
                               cumulative_emissions_savings";

/// Column header for the comparison export.
const COMPARISON_HEADER: &str = "name,annual_reduction,lifetime_reduction,incentive_cost,\
                                 cost_per_ton,lifetime_cost_per_ton,payback";

/// Column header for the sensitivity export.
const SENSITIVITY_HEADER: &str =
    "change_percent,parameter_value,payback_years,net_emissions_reduction,net_present_value";

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn header(columns: &str) -> impl Iterator<Item = &str> {
    columns.split(',').map(str::trim)
}

/// Writes the `Category,Parameter,Value` summary of an analysis.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(analysis: &Analysis, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Category", "Parameter", "Value"])?;

    for r in [&analysis.space_heating, &analysis.water_heating] {
        let category = r.technology.label();
        let rows = [
            ("Annual Emissions Reduction", r.net_emissions_reduction.to_string()),
            ("Lifecycle Emissions Reduction", r.lifetime_emissions_reduction.to_string()),
            ("Annual Savings", r.annual_savings.to_string()),
            ("Payback Period", opt(r.simple_payback_years)),
        ];
        for (parameter, value) in rows {
            wtr.write_record([category, parameter, value.as_str()])?;
        }
    }

    let c = &analysis.combined;
    let rows = [
        ("Annual Emissions Reduction", c.net_emissions_reduction.to_string()),
        ("Lifecycle Emissions Reduction", c.lifetime_emissions_reduction.to_string()),
        ("Total Incentive", c.total_incentive.to_string()),
        ("Payback Period", opt(c.payback_period)),
    ];
    for (parameter, value) in rows {
        wtr.write_record(["Combined", parameter, value.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes one row per year for each technology, in the order given.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_timeline_csv(results: &[&TechnologyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(TIMELINE_HEADER))?;

    for (result, y) in results
        .iter()
        .flat_map(|r| r.year_by_year_data.iter().map(move |y| (r, y)))
    {
        wtr.write_record(&[
            result.technology.label().to_string(),
            y.year.to_string(),
            format!("{:.2}", y.cumulative_cost_gas),
            format!("{:.2}", y.cumulative_cost_hp),
            format!("{:.2}", y.savings),
            format!("{:.4}", y.cumulative_emissions_gas),
            format!("{:.4}", y.cumulative_emissions_hp),
            format!("{:.4}", y.cumulative_emissions_savings),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the comparison table.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_comparison_csv(rows: &[ComparisonRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(COMPARISON_HEADER))?;

    for r in rows {
        wtr.write_record(&[
            r.name.clone(),
            r.annual_reduction.to_string(),
            r.lifetime_reduction.to_string(),
            r.incentive_cost.to_string(),
            opt(r.cost_per_ton),
            opt(r.lifetime_cost_per_ton),
            opt(r.payback),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes sensitivity sweep points.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_sensitivity_csv(points: &[SensitivityPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(SENSITIVITY_HEADER))?;

    for p in points {
        wtr.write_record(&[
            p.change_percent.to_string(),
            p.parameter_value.to_string(),
            opt(p.payback_years),
            p.net_emissions_reduction.to_string(),
            p.net_present_value.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    inputs: &'a CalculatorConfig,
    results: &'a Analysis,
}

/// Writes inputs and results as pretty-printed JSON.
///
/// Undefined ratios appear as `null`.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_json(
    config: &CalculatorConfig,
    analysis: &Analysis,
    mut writer: impl Write,
) -> io::Result<()> {
    let export = JsonExport {
        inputs: config,
        results: analysis,
    };
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    writer.flush()
}

fn to_file(
    path: &Path,
    write: impl FnOnce(io::BufWriter<File>) -> io::Result<()>,
) -> io::Result<()> {
    let file = File::create(path)?;
    write(io::BufWriter::new(file))
}

/// Exports the summary CSV to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_csv(analysis: &Analysis, path: &Path) -> io::Result<()> {
    to_file(path, |w| write_summary_csv(analysis, w))
}

/// Exports technology timelines to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_timeline_csv(results: &[&TechnologyResult], path: &Path) -> io::Result<()> {
    to_file(path, |w| write_timeline_csv(results, w))
}

/// Exports the comparison CSV to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_comparison_csv(rows: &[ComparisonRow], path: &Path) -> io::Result<()> {
    to_file(path, |w| write_comparison_csv(rows, w))
}

/// Exports sensitivity points to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_sensitivity_csv(points: &[SensitivityPoint], path: &Path) -> io::Result<()> {
    to_file(path, |w| write_sensitivity_csv(points, w))
}

/// Exports inputs and results as JSON to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_json(config: &CalculatorConfig, analysis: &Analysis, path: &Path) -> io::Result<()> {
    to_file(path, |w| write_json(config, analysis, w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::params::{ParameterSet, Technology};
    use crate::calc::sensitivity::{SweepParameter, sweep};

    fn baseline() -> (CalculatorConfig, Analysis) {
        let cfg = CalculatorConfig::baseline();
        let analysis = Analysis::run(&cfg).unwrap();
        (cfg, analysis)
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn summary_has_header_and_twelve_rows() {
        let (_, analysis) = baseline();
        let mut buf = Vec::new();
        write_summary_csv(&analysis, &mut buf).unwrap();
        let out = to_string(buf);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Category,Parameter,Value");
        assert_eq!(lines.len(), 13);
        assert!(lines[11].starts_with("Combined,Total Incentive,1100"));
    }

    #[test]
    fn timeline_row_count_matches_lifespan() {
        let (_, analysis) = baseline();
        let mut buf = Vec::new();
        write_timeline_csv(&[&analysis.water_heating], &mut buf).unwrap();
        let out = to_string(buf);
        // 1 header + years 0..=12
        assert_eq!(out.lines().count(), 14);
        assert!(
            out.lines()
                .nth(1)
                .unwrap_or("")
                .starts_with("Water Heating,0,1800.00,1600.00,200.00")
        );

        let mut both = Vec::new();
        write_timeline_csv(&[&analysis.space_heating, &analysis.water_heating], &mut both)
            .unwrap();
        // 16 space rows + 13 water rows
        assert_eq!(to_string(both).lines().count(), 1 + 16 + 13);
    }

    #[test]
    fn undefined_payback_renders_as_na() {
        let params = ParameterSet {
            annual_gas_usage: 0.0,
            annual_maintenance_gas: 0.0,
            annual_maintenance_hp: 0.0,
            ..ParameterSet::space_heating()
        };
        let points = sweep(&params, SweepParameter::GasRate, Technology::SpaceHeating, 10.0).unwrap();
        let mut buf = Vec::new();
        write_sensitivity_csv(&points, &mut buf).unwrap();
        let out = to_string(buf);
        assert_eq!(out.lines().count(), 10);
        assert!(out.lines().skip(1).all(|l| l.contains(",N/A,")));
    }

    #[test]
    fn comparison_round_trip_parseable() {
        let (_, analysis) = baseline();
        let mut buf = Vec::new();
        write_comparison_csv(&analysis.comparison, &mut buf).unwrap();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(7));
        let names: Vec<String> = rdr
            .records()
            .filter_map(Result::ok)
            .map(|r| r[0].to_string())
            .collect();
        assert_eq!(names.len(), 4);
        assert_eq!(names[2], "EV (Reference)");
    }

    #[test]
    fn json_export_uses_null_for_undefined() {
        let mut cfg = CalculatorConfig::baseline();
        cfg.space_heating.annual_gas_usage = 0.0;
        cfg.space_heating.annual_maintenance_gas = 0.0;
        cfg.space_heating.annual_maintenance_hp = 0.0;
        let analysis = Analysis::run(&cfg).unwrap();
        let mut buf = Vec::new();
        write_json(&cfg, &analysis, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(json["inputs"]["space_heating"].is_object());
        assert!(json["results"]["space_heating"]["simple_payback_years"].is_null());
        assert_eq!(
            json["results"]["comparison"].as_array().map(Vec::len),
            Some(4)
        );
    }

    #[test]
    fn deterministic_output() {
        let (cfg, analysis) = baseline();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_json(&cfg, &analysis, &mut buf1).unwrap();
        write_json(&cfg, &analysis, &mut buf2).unwrap();
        assert_eq!(buf1, buf2);
    }
}
