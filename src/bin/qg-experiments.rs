//! qg-experiments CLI
//!
//! Usage:
//!   qg-experiments run tests/model
//!   qg-experiments run tests/model --config harness.yaml --results-dir out
//!   qg-experiments list tests/model

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use qg_experiments::experiments::{ExperimentCollector, ExperimentRunner};
use qg_experiments::HarnessConfig;

/// Discover and run language-model experiments
#[derive(Parser, Debug)]
#[command(name = "qg-experiments")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run all experiments and write the summary report
    Run {
        /// Directory containing experiment files
        #[arg(default_value = "tests/model")]
        directory: PathBuf,

        /// Harness configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory to write the report to (overrides config)
        #[arg(short, long)]
        results_dir: Option<PathBuf>,
    },

    /// List discovered experiments without running them
    List {
        /// Directory containing experiment files
        #[arg(default_value = "tests/model")]
        directory: PathBuf,

        /// Harness configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => tracing::Level::ERROR,
        (_, 0) => tracing::Level::WARN,
        (_, 1) => tracing::Level::INFO,
        (_, 2) => tracing::Level::DEBUG,
        (_, _) => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            directory,
            config,
            results_dir,
        } => run_experiments(directory, config, results_dir, cli.quiet),

        Commands::List { directory, config } => list_experiments(directory, config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(HarnessConfig::default()),
    }
}

/// Run all experiments
fn run_experiments(
    directory: PathBuf,
    config: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(dir) = results_dir {
        config.results_dir = dir;
    }

    let runner = ExperimentRunner::with_config(&directory, config)?.with_progress_callback(
        move |current, total, name| {
            if !quiet {
                eprintln!("[{}/{}] Running {}...", current, total, name);
            }
        },
    );

    let path = runner
        .run()
        .with_context(|| format!("Experiment run in {:?} failed", runner.directory()))?;

    let report = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read report {:?}", path))?;
    print!("{}", report);
    println!(
        "The results of the last experiments are stored in the {} file.",
        path.display()
    );

    Ok(())
}

/// List discovered experiments
fn list_experiments(directory: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let runner = ExperimentRunner::with_config(&directory, config)?;

    let collector = ExperimentCollector::from_config(runner.config());
    let experiments = collector.collect(runner.directory())?;

    for experiment in &experiments {
        println!("{}", experiment.qualified_name());
    }

    Ok(())
}
