use std::env;
use std::path::PathBuf;

use crate::calc::params::Technology;
use crate::calc::sensitivity::SweepParameter;
use crate::config::ViewMode;

/// Default port for `--serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// One `--sweep <parameter>:<technology>:<range>` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRequest {
    pub parameter: SweepParameter,
    pub technology: Technology,
    pub range_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub bundle_discount: Option<f64>,
    pub view: Option<ViewMode>,
    pub csv_out: Option<PathBuf>,
    pub timeline_out: Option<PathBuf>,
    pub comparison_out: Option<PathBuf>,
    pub json_out: Option<PathBuf>,
    pub sweep: Option<SweepRequest>,
    pub sweep_out: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub save_as: Option<String>,
    pub load_scenario: Option<u64>,
    pub list_scenarios: bool,
    pub reset: bool,
    pub verbose: bool,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions {
        scenario: None,
        preset: None,
        bundle_discount: None,
        view: None,
        csv_out: None,
        timeline_out: None,
        comparison_out: None,
        json_out: None,
        sweep: None,
        sweep_out: None,
        store_dir: None,
        save_as: None,
        load_scenario: None,
        list_scenarios: false,
        reset: false,
        verbose: false,
        serve: false,
        port: DEFAULT_PORT,
    };

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                set_once(&mut opts.scenario, PathBuf::from(path), flag)?;
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                set_once(&mut opts.preset, name.to_string(), flag)?;
            }
            "--bundle-discount" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --bundle-discount (expected a percentage)",
                )?;
                let pct = raw
                    .parse::<f64>()
                    .map_err(|_| format!("--bundle-discount value \"{raw}\" is not a number"))?;
                set_once(&mut opts.bundle_discount, pct, flag)?;
            }
            "--view" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --view (expected \"consumer\" or \"program\")",
                )?;
                let view = raw.parse::<ViewMode>().map_err(|e| e.message)?;
                set_once(&mut opts.view, view, flag)?;
            }
            "--csv-out" | "--timeline-out" | "--comparison-out" | "--json-out" | "--sweep-out"
            | "--store-dir" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    &format!("missing value for {flag} (expected a file path)"),
                )?;
                let slot = match flag {
                    "--csv-out" => &mut opts.csv_out,
                    "--timeline-out" => &mut opts.timeline_out,
                    "--comparison-out" => &mut opts.comparison_out,
                    "--json-out" => &mut opts.json_out,
                    "--sweep-out" => &mut opts.sweep_out,
                    _ => &mut opts.store_dir,
                };
                set_once(slot, PathBuf::from(path), flag)?;
            }
            "--sweep" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --sweep (expected <parameter>:<technology>:<range>)",
                )?;
                set_once(&mut opts.sweep, parse_sweep(raw)?, flag)?;
            }
            "--save-as" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --save-as (expected a scenario name)")?;
                set_once(&mut opts.save_as, name.to_string(), flag)?;
            }
            "--load-scenario" => {
                i += 1;
                let raw = args.next_or_err(
                    i,
                    "missing value for --load-scenario (expected a scenario id)",
                )?;
                let id = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--load-scenario value \"{raw}\" is not a valid id"))?;
                set_once(&mut opts.load_scenario, id, flag)?;
            }
            "--list-scenarios" => opts.list_scenarios = true,
            "--reset" => opts.reset = true,
            "--verbose" | "-v" => opts.verbose = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    let sources = [
        opts.scenario.is_some(),
        opts.preset.is_some(),
        opts.load_scenario.is_some(),
    ];
    if sources.iter().filter(|s| **s).count() > 1 {
        return Err(
            "arguments `--scenario`, `--preset` and `--load-scenario` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    let needs_store = opts.save_as.is_some()
        || opts.load_scenario.is_some()
        || opts.list_scenarios
        || opts.reset;
    if needs_store && opts.store_dir.is_none() {
        return Err(
            "`--save-as`, `--load-scenario`, `--list-scenarios` and `--reset` require `--store-dir`"
                .to_string(),
        );
    }

    if opts.sweep_out.is_some() && opts.sweep.is_none() {
        return Err("`--sweep-out` requires `--sweep`".to_string());
    }

    Ok(opts)
}

/// Parses `<parameter>:<technology>:<range>`, e.g. `gas_rate:space_heating:50`.
fn parse_sweep(raw: &str) -> Result<SweepRequest, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [parameter, technology, range] = parts.as_slice() else {
        return Err(format!(
            "invalid --sweep \"{raw}\" (expected <parameter>:<technology>:<range>)"
        ));
    };
    let parameter = parameter
        .parse::<SweepParameter>()
        .map_err(|e| e.to_string())?;
    let technology = technology.parse::<Technology>().map_err(|e| e.to_string())?;
    let range_percent = range
        .parse::<f64>()
        .map_err(|_| format!("--sweep range \"{range}\" is not a number"))?;
    Ok(SweepRequest {
        parameter,
        technology,
        range_percent,
    })
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("carbon-incentives: gas vs. heat-pump emissions and incentive calculator");
    eprintln!();
    eprintln!("Usage: carbon-incentives [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>           Load inputs from a TOML file");
    eprintln!("  --preset <name>             Use a built-in preset (baseline, high_rates, cold_climate)");
    eprintln!("  --bundle-discount <pct>     Override the package bundle discount");
    eprintln!("  --view <consumer|program>   Choose the printed summary");
    eprintln!("  --csv-out <path>            Export the summary CSV");
    eprintln!("  --timeline-out <path>       Export both year-by-year timelines as CSV");
    eprintln!("  --comparison-out <path>     Export the comparison table as CSV");
    eprintln!("  --json-out <path>           Export inputs and results as JSON");
    eprintln!("  --sweep <param>:<tech>:<r>  Run a sensitivity sweep of +/- r percent");
    eprintln!("  --sweep-out <path>          Export the sweep as CSV");
    eprintln!("  --store-dir <dir>           Persist inputs and scenarios in <dir>");
    eprintln!("  --save-as <name>            Save the current inputs as a named scenario");
    eprintln!("  --load-scenario <id>        Use the inputs of a saved scenario");
    eprintln!("  --list-scenarios            List saved scenarios");
    eprintln!("  --reset                     Clear the saved inputs");
    eprintln!("  --verbose, -v               Log calculation details to stderr");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                     Start REST API server after the calculation");
        eprintln!("  --port <u16>                API server port (default: {DEFAULT_PORT})");
    }
    eprintln!("  --help                      Show this help message");
    eprintln!();
    eprintln!("Without --scenario, --preset or --load-scenario, the saved inputs in");
    eprintln!("--store-dir are used, falling back to the baseline preset.");
}
