//! qg-experiments - experiment discovery and reporting harness
//!
//! Scans a directory for Lua evaluation scripts, runs every `measure_*`
//! function it finds and writes the averaged scores of each model and metric
//! to a CSV report.
//!
//! # Features
//!
//! - Lua 5.4 experiment files loaded through mlua, one state per file
//! - Single or batch results per experiment
//! - Deterministic CSV summary (`model_name,metric,average_score`)
//! - YAML configuration of naming conventions and output location
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use qg_experiments::ExperimentRunner;
//!
//! let runner = ExperimentRunner::new("tests/model")?;
//! let report = runner.run()?;
//! println!("Report written to {}", report.display());
//! # Ok::<(), qg_experiments::HarnessError>(())
//! ```

pub mod config;
pub mod engine;
mod error;
pub mod experiments;
pub mod filesystem;

// Re-exports
pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use experiments::{
    generate_summary, ExperimentHandle, ExperimentOutcome, ExperimentResult, ExperimentRunner,
    MetricKind,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        generate_summary, ExperimentHandle, ExperimentOutcome, ExperimentResult,
        ExperimentRunner, HarnessConfig, HarnessError, HarnessResult, MetricKind,
    };
}
