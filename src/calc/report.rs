//! Full calculator pipeline and the text summaries built from it.

use std::fmt;

use log::debug;
use serde::Serialize;

use super::combined::{CombinedResult, combine};
use super::comparison::{ComparisonRow, build_comparison};
use super::constants::{INCENTIVE_LABELS, INCENTIVE_RATES_PER_MT, MID_RANGE_RATE_INDEX};
use super::params::{ParamError, Technology};
use super::ratio::display_ratio;
use super::technology::{TechnologyResult, calculate};
use crate::config::CalculatorConfig;

/// Every derived figure for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Space-heating result.
    pub space_heating: TechnologyResult,
    /// Water-heating result.
    pub water_heating: TechnologyResult,
    /// Package totals with the configured bundle discount.
    pub combined: CombinedResult,
    /// Four-row comparison table.
    pub comparison: Vec<ComparisonRow>,
}

impl Analysis {
    /// Runs both technology calculations, the package aggregation, and the comparison.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamError`] if either parameter set is rejected.
    pub fn run(config: &CalculatorConfig) -> Result<Self, ParamError> {
        let space_heating = calculate(Technology::SpaceHeating, &config.space_heating)?;
        let water_heating = calculate(Technology::WaterHeating, &config.water_heating)?;
        let space_incentive = config.space_heating.current_incentive;
        let water_incentive = config.water_heating.current_incentive;

        let combined = combine(
            &space_heating,
            &water_heating,
            space_incentive,
            water_incentive,
            config.bundle_discount_percent,
        );
        let comparison =
            build_comparison(&space_heating, &water_heating, space_incentive, water_incentive);
        debug!(
            "package: total incentive {:.2}, reduction {:.4} MTCO2e/yr",
            combined.total_incentive, combined.net_emissions_reduction
        );

        Ok(Self {
            space_heating,
            water_heating,
            combined,
            comparison,
        })
    }

    /// Result for one technology category.
    pub fn result(&self, technology: Technology) -> &TechnologyResult {
        match technology {
            Technology::SpaceHeating => &self.space_heating,
            Technology::WaterHeating => &self.water_heating,
        }
    }

    /// Program-administrator view of this analysis.
    pub fn program_report(&self) -> ProgramReport {
        ProgramReport::from_analysis(self)
    }
}

fn write_technology(f: &mut fmt::Formatter<'_>, r: &TechnologyResult) -> fmt::Result {
    writeln!(f, "--- {} ---", r.technology)?;
    writeln!(f, "Gas emissions:          {:.2} MTCO2e/yr", r.annual_emissions_gas)?;
    writeln!(f, "Heat pump emissions:    {:.2} MTCO2e/yr", r.annual_emissions_hp)?;
    writeln!(f, "Annual reduction:       {:.2} MTCO2e", r.net_emissions_reduction)?;
    writeln!(f, "Lifetime reduction:     {:.2} MTCO2e", r.lifetime_emissions_reduction)?;
    writeln!(f, "Gas operating cost:     ${:.0}/yr", r.annual_cost_gas)?;
    writeln!(f, "Heat pump operating:    ${:.0}/yr", r.annual_cost_hp)?;
    writeln!(f, "Annual savings:         ${:.0}", r.annual_savings)?;
    writeln!(f, "Additional cost:        ${:.0}", r.additional_cost)?;
    writeln!(
        f,
        "Payback (incentives):   {} years",
        display_ratio(r.simple_payback_years, 1)
    )?;
    writeln!(
        f,
        "Payback (no incentive): {} years",
        display_ratio(r.simple_payback_no_incentive, 1)
    )?;
    writeln!(f, "Net present value:      ${:.0}", r.net_present_value)?;
    for ((label, rate), value) in INCENTIVE_LABELS
        .iter()
        .zip(INCENTIVE_RATES_PER_MT)
        .zip(r.optimal_incentives)
    {
        writeln!(f, "Incentive @ ${rate}/MT ({label}): ${value:.2}")?;
    }
    Ok(())
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_technology(f, &self.space_heating)?;
        writeln!(f)?;
        write_technology(f, &self.water_heating)?;
        writeln!(f)?;
        let c = &self.combined;
        writeln!(f, "--- Combined Package ---")?;
        writeln!(f, "Bundle discount:        ${:.0}", c.bundle_discount_amount)?;
        writeln!(f, "Total incentive:        ${:.0}", c.total_incentive)?;
        writeln!(f, "Annual reduction:       {:.2} MTCO2e", c.net_emissions_reduction)?;
        writeln!(f, "Lifetime reduction:     {:.2} MTCO2e", c.lifetime_emissions_reduction)?;
        writeln!(f, "Cost per MTCO2e:        ${}", display_ratio(c.cost_per_mtco2e, 2))?;
        write!(f, "Payback period:         {} years", display_ratio(c.payback_period, 1))
    }
}

/// One line of the program-administrator table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRow {
    /// Technology, benchmark, or "Combined Package".
    pub name: String,
    /// Annual reduction (MTCO2e/yr).
    pub annual_reduction: f64,
    /// Lifetime reduction (MTCO2e).
    pub lifetime_reduction: f64,
    /// Incentive currently offered.
    pub current_incentive: f64,
    /// Incentive per annual MTCO2e.
    pub cost_per_ton: Option<f64>,
    /// Incentive per lifetime MTCO2e.
    pub lifetime_cost_per_ton: Option<f64>,
    /// Recommended incentive; `None` for benchmarks.
    pub recommended_incentive: Option<f64>,
}

/// Program-administrator summary: comparison rows plus the package row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramReport {
    /// Rows in comparison order, package last.
    pub rows: Vec<ProgramRow>,
    /// Rate used for technology recommendations ($/MTCO2e).
    pub recommended_rate_per_mt: f64,
}

impl ProgramReport {
    /// Builds the summary from a finished analysis.
    ///
    /// Technology rows recommend the mid-range optimal incentive; the package
    /// row recommends the total incentive including the bundle discount.
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let recommended = [
            analysis.space_heating.optimal_incentives[MID_RANGE_RATE_INDEX],
            analysis.water_heating.optimal_incentives[MID_RANGE_RATE_INDEX],
        ];

        let mut rows: Vec<ProgramRow> = analysis
            .comparison
            .iter()
            .enumerate()
            .map(|(i, row)| ProgramRow {
                name: row.name.clone(),
                annual_reduction: row.annual_reduction,
                lifetime_reduction: row.lifetime_reduction,
                current_incentive: row.incentive_cost,
                cost_per_ton: row.cost_per_ton,
                lifetime_cost_per_ton: row.lifetime_cost_per_ton,
                recommended_incentive: recommended.get(i).copied().filter(|_| !row.reference),
            })
            .collect();

        let c = &analysis.combined;
        rows.push(ProgramRow {
            name: "Combined Package".to_string(),
            annual_reduction: c.net_emissions_reduction,
            lifetime_reduction: c.lifetime_emissions_reduction,
            current_incentive: c.total_incentive,
            cost_per_ton: c.cost_per_mtco2e,
            lifetime_cost_per_ton: c.lifetime_cost_per_mtco2e,
            recommended_incentive: Some(c.total_incentive),
        });

        Self {
            rows,
            recommended_rate_per_mt: INCENTIVE_RATES_PER_MT[MID_RANGE_RATE_INDEX],
        }
    }
}

impl fmt::Display for ProgramReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Program Administrator Summary ---")?;
        writeln!(
            f,
            "{:<20} {:>10} {:>12} {:>10} {:>10} {:>10} {:>12}",
            "Technology", "MT/yr", "MT lifetime", "Incentive", "$/MT", "$/MT life", "Recommended"
        )?;
        for row in &self.rows {
            let recommended = row
                .recommended_incentive
                .map_or_else(|| "-".to_string(), |v| format!("${v:.0}"));
            writeln!(
                f,
                "{:<20} {:>10.2} {:>12.2} {:>10} {:>10} {:>10} {:>12}",
                row.name,
                row.annual_reduction,
                row.lifetime_reduction,
                format!("${:.0}", row.current_incentive),
                display_ratio(row.cost_per_ton, 2),
                display_ratio(row.lifetime_cost_per_ton, 2),
                recommended
            )?;
        }
        write!(
            f,
            "Recommended rate: ${}/MTCO2e",
            self.recommended_rate_per_mt
        )
    }
}
