//! Loop Predictor
//!
//! Predicts the outcome of an action list from a scenario file and prints a
//! one-line summary, optionally writing the full report as JSON.

use clap::Parser;
use predictor_core::report::format_ticks;
use predictor_core::setup::{sample_catalog, Scenario};
use predictor_core::{PassOutcome, Predictor, PredictorConfig, PredictorError};
use predictor_types::TrackedStat;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the predictor
#[derive(Parser, Debug)]
#[command(name = "loop_predictor")]
#[command(about = "Predicts resources, time and throughput of an action list")]
struct Args {
    /// Scenario file (TOML, or JSON with a .json extension)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Configuration file
    #[arg(long, default_value = "predictor.toml")]
    config: PathBuf,

    /// Statistic to report per minute, e.g. resource:soul or skill:magic
    #[arg(long)]
    tracked: Option<TrackedStat>,

    /// Write the full report as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Keep repeating the final action until it fails
    #[arg(long)]
    repeat_last: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), PredictorError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = PredictorConfig::load_or_default(&args.config)?;
    if let Some(tracked) = args.tracked {
        config.prediction.tracked = tracked;
    }
    if args.repeat_last {
        config.prediction.repeat_last_action = true;
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => {
            tracing::warn!("no scenario given, nothing to predict");
            Scenario::default()
        }
    };

    let precision = config.display.precision();
    let mut predictor = Predictor::new(sample_catalog(), config);
    let seed = predictor.seed_state(Instant::now(), || scenario.seed.clone());

    let report = match predictor.run(&scenario.actions, seed, &scenario.world) {
        PassOutcome::Completed { report, .. } => report,
        PassOutcome::Superseded => return Ok(()),
    };

    for entry in &report.entries {
        match entry.outcome.prediction() {
            Some(p) => println!(
                "{:>3} {:<20} x{:<5} {:<7} {}",
                entry.index,
                entry.name,
                p.repeats,
                if p.valid { "ok" } else { "INVALID" },
                format_ticks(p.total_ticks, precision)
            ),
            None => println!("{:>3} {:<20} no prediction", entry.index, entry.name),
        }
    }
    println!(
        "{:.0} | {} | {:.2} {}/min",
        report.total_spent,
        format_ticks(report.total_ticks, precision),
        report.statistic.per_minute,
        report.statistic.tracked
    );

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
