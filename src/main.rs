#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use derby_tracker::config::load_config_or_default;
use derby_tracker::core::form::RacerForm;
use derby_tracker::report::AggregationMethod;
use derby_tracker::{
    DerbyResult, add_racer_cmd, add_times_cmd, confirm_cmd, export_cmd, report_cmd, run_cmd,
};

#[derive(Parser, Debug)]
#[command(name = "derby-tracker")]
#[command(about = "Record Pinewood Derby races and report fastest and average times", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set DERBY_TRACKER_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./derby.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the number of racers and lanes (1 or 2 each)
    Confirm {
        #[arg(long)]
        racers: String,
        #[arg(long)]
        lanes: String,
    },

    /// Save one racer's details to the workbook
    AddRacer {
        /// Workbook file (created on first save)
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// Racer number (1 or 2)
        #[arg(long)]
        number: String,
        #[arg(long)]
        name: String,
        /// Boy Scout rank
        #[arg(long, default_value = "")]
        rank: String,
        #[arg(long)]
        car_name: String,
        /// Car number (max 999)
        #[arg(long)]
        car_number: String,
        #[arg(long)]
        car_weight: String,
        /// Modification notes (canted wheels, polished axles, ...)
        #[arg(long, default_value = "")]
        mods: String,
    },

    /// Save times for 10 races from a CSV grid
    AddTimes {
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// CSV with columns Racer 1 - Lane, Racer 1 - Time, Racer 2 - Lane, Racer 2 - Time
        #[arg(long)]
        csv: PathBuf,
        /// Number of lanes in use
        #[arg(long, default_value_t = 2)]
        lanes: u8,
    },

    /// Print fastest and average times from the workbook
    Report {
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// Aggregation method (defaults to the config, then classic)
        #[arg(long, value_enum)]
        method: Option<AggregationMethod>,
        /// Write machine-readable JSON report to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Export one workbook sheet as CSV
    Export {
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// Sheet name ("Racer Details" or "Race Times")
        #[arg(long)]
        sheet: String,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replay a full session (counts, racers, race times, report) from a TOML script
    Run {
        #[arg(long)]
        script: PathBuf,
        /// Overrides the script's workbook
        #[arg(long)]
        workbook: Option<PathBuf>,
        #[arg(long, value_enum)]
        method: Option<AggregationMethod>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("DERBY_TRACKER_LOG").unwrap_or_else(|_| {
        if verbose { "derby_tracker=debug".to_string() } else { "derby_tracker=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn dispatch(cli: Cli) -> DerbyResult<()> {
    let config = load_config_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Confirm { racers, lanes } => confirm_cmd::run(&racers, &lanes).map(|_| ()),
        Commands::AddRacer { workbook, number, name, rank, car_name, car_number, car_weight, mods } => {
            let form = RacerForm {
                racer_number: number,
                racer_name: name,
                rank,
                car_name,
                car_number,
                car_weight,
                mods,
            };
            add_racer_cmd::run(config.resolve_workbook(workbook)?, form).map(|_| ())
        }
        Commands::AddTimes { workbook, csv, lanes } => {
            add_times_cmd::run(config.resolve_workbook(workbook)?, csv, lanes).map(|_| ())
        }
        Commands::Report { workbook, method, json } => report_cmd::run(
            config.resolve_workbook(workbook)?,
            method.unwrap_or(config.report.method),
            json,
        )
        .map(|_| ()),
        Commands::Export { workbook, sheet, out } => {
            export_cmd::run(config.resolve_workbook(workbook)?, sheet, out)
        }
        Commands::Run { script, workbook, method, json } => run_cmd::run(
            script,
            workbook,
            config.workbook.clone(),
            method,
            config.report.method,
            json,
        )
        .map(|_| ()),
    }
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = dispatch(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
