//! Calculator entry point: CLI wiring, config loading, reports, and exports.

use std::process;

use log::{Level, LevelFilter, Log, Metadata, Record, warn};

use carbon_incentives::calc::ratio::display_ratio;
use carbon_incentives::calc::report::Analysis;
use carbon_incentives::calc::sensitivity::{SensitivityPoint, sweep};
use carbon_incentives::cli::{CliOptions, SweepRequest, parse_args, print_usage};
use carbon_incentives::config::{CalculatorConfig, ViewMode};
use carbon_incentives::io::export::{
    export_comparison_csv, export_json, export_sensitivity_csv, export_summary_csv,
    export_timeline_csv,
};
use carbon_incentives::store::{
    FileStore, ScenarioBook, reset_inputs, restore_inputs_or_default, save_inputs,
};

/// Writes log records to stderr as `[LEVEL] message`.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        Level::Warn.to_level_filter()
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Loads inputs: `--scenario`, then `--preset`, then `--load-scenario`,
/// then the saved inputs in `--store-dir`, then the baseline preset.
fn load_config(cli: &CliOptions, store: Option<&FileStore>) -> CalculatorConfig {
    if let Some(ref path) = cli.scenario {
        return CalculatorConfig::from_toml_file(path).unwrap_or_else(|e| fail(e));
    }
    if let Some(ref name) = cli.preset {
        return CalculatorConfig::from_preset(name).unwrap_or_else(|e| fail(e));
    }
    match (cli.load_scenario, store) {
        (Some(id), Some(store)) => ScenarioBook::restore(store)
            .and_then(|book| book.load(id))
            .unwrap_or_else(|e| fail(e)),
        (None, Some(store)) => restore_inputs_or_default(store),
        _ => CalculatorConfig::baseline(),
    }
}

fn print_sweep(request: &SweepRequest, points: &[SensitivityPoint]) {
    println!(
        "\n--- Sensitivity: {} ({}) ---",
        request.parameter.label(request.technology),
        request.technology
    );
    println!(
        "{:>8} {:>12} {:>10} {:>12} {:>12}",
        "Change", "Value", "Payback", "MTCO2e/yr", "NPV"
    );
    for p in points {
        println!(
            "{:>7}% {:>12.3} {:>10} {:>12.3} {:>12.0}",
            p.change_percent,
            p.parameter_value,
            display_ratio(p.payback_years, 1),
            p.net_emissions_reduction,
            p.net_present_value
        );
    }
}

fn write_exports(cli: &CliOptions, config: &CalculatorConfig, analysis: &Analysis) {
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_summary_csv(analysis, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Summary written to {}", path.display());
    }
    if let Some(ref path) = cli.timeline_out {
        let results = [&analysis.space_heating, &analysis.water_heating];
        if let Err(e) = export_timeline_csv(&results, path) {
            fail(format!("failed to write timeline CSV: {e}"));
        }
        eprintln!("Timeline written to {}", path.display());
    }
    if let Some(ref path) = cli.comparison_out {
        if let Err(e) = export_comparison_csv(&analysis.comparison, path) {
            fail(format!("failed to write comparison CSV: {e}"));
        }
        eprintln!("Comparison written to {}", path.display());
    }
    if let Some(ref path) = cli.json_out {
        if let Err(e) = export_json(config, analysis, path) {
            fail(format!("failed to write JSON: {e}"));
        }
        eprintln!("JSON written to {}", path.display());
    }
}

fn run_sweep(cli: &CliOptions, config: &CalculatorConfig) {
    let Some(request) = cli.sweep else {
        return;
    };
    let points = sweep(
        config.params(request.technology),
        request.parameter,
        request.technology,
        request.range_percent,
    )
    .unwrap_or_else(|e| fail(e));
    print_sweep(&request, &points);

    if let Some(ref path) = cli.sweep_out {
        if let Err(e) = export_sensitivity_csv(&points, path) {
            fail(format!("failed to write sensitivity CSV: {e}"));
        }
        eprintln!("Sensitivity written to {}", path.display());
    }
}

fn update_store(cli: &CliOptions, store: &mut FileStore, config: &CalculatorConfig) {
    if let Err(e) = save_inputs(&mut *store, config) {
        warn!("could not save inputs: {e}");
    }

    let needs_book = cli.save_as.is_some() || cli.list_scenarios;
    if !needs_book {
        return;
    }
    let mut book = ScenarioBook::restore(&*store).unwrap_or_else(|e| {
        warn!("{e}; starting a new scenario list");
        ScenarioBook::new()
    });

    if let Some(ref name) = cli.save_as {
        let id = book.save(name, config).unwrap_or_else(|e| fail(e));
        book.persist(&mut *store).unwrap_or_else(|e| fail(e));
        eprintln!("Saved scenario {id} \"{}\"", name.trim());
    }

    if cli.list_scenarios {
        println!("\n--- Saved Scenarios ---");
        for s in book.scenarios() {
            match s.analysis() {
                Ok(a) => println!(
                    "{:>3}  {:<24} {:>8.2} MTCO2e/yr  ${:.0} incentive",
                    s.id, s.name, a.combined.net_emissions_reduction, a.combined.total_incentive
                ),
                Err(e) => println!("{:>3}  {:<24} {e}", s.id, s.name),
            }
        }
    }
}

fn main() {
    let cli = parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        print_usage();
        process::exit(1);
    });
    init_logging(cli.verbose);

    let mut store = cli
        .store_dir
        .as_deref()
        .map(|dir| FileStore::open(dir).unwrap_or_else(|e| fail(e)));

    if cli.reset {
        if let Some(ref mut store) = store {
            reset_inputs(store).unwrap_or_else(|e| fail(e));
            eprintln!("Saved inputs cleared");
        }
    }

    let mut config = load_config(&cli, store.as_ref());

    // Apply CLI overrides
    if let Some(pct) = cli.bundle_discount {
        config.bundle_discount_percent = pct;
    }
    if let Some(view) = cli.view {
        config.view_mode = view;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    for note in config.advisories() {
        warn!("{}: {}", note.field, note.message);
    }

    let analysis = Analysis::run(&config).unwrap_or_else(|e| fail(e));

    match config.view_mode {
        ViewMode::Consumer => println!("{analysis}"),
        ViewMode::Program => println!("{}", analysis.program_report()),
    }

    run_sweep(&cli, &config);
    write_exports(&cli, &config, &analysis);

    if let Some(ref mut store) = store {
        update_store(&cli, store, &config);
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(carbon_incentives::api::AppState { config, analysis });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(carbon_incentives::api::serve(state, addr));
    }
}
