//! Experiment discovery and reporting
//!
//! Experiments are Lua functions named `measure_*` living in `.lua` files of
//! an experiment directory. The runner loads every file into its own Lua
//! state, calls each experiment once and writes a CSV summary of the results.
//!
//! # Features
//!
//! - **Discovery by convention**: no registration code in experiment files
//! - **Per-file isolation**: each file gets a fresh Lua state
//! - **Single or batch results**: an experiment returns one `Result` or a list
//! - **Deterministic report**: files, functions and rows in a stable order
//! - **Fail-fast**: the first error aborts the run and no report is written
//!
//! # Quick Start
//!
//! ```lua
//! -- tests/model/similarity.lua
//! function measure_cosine()
//!     return Result("m1", Metric.COSINE_SIMILARITY, {0.9, 0.8, 1.0})
//! end
//! ```
//!
//! ```rust,no_run
//! use qg_experiments::experiments::ExperimentRunner;
//!
//! let path = ExperimentRunner::new("tests/model")?.run()?;
//! // tests/model/results/qg_<HH>_<MM>_<SS>_<YYYY>_<MM>_<DD>.csv
//! println!("{}", path.display());
//! # Ok::<(), qg_experiments::HarnessError>(())
//! ```

mod collector;
mod handle;
mod loader;
mod report;
mod result;
mod runner;

pub use collector::ExperimentCollector;
pub use handle::{ExperimentFn, ExperimentHandle};
pub use loader::{
    load_experiment_functions, load_experiment_functions_with_prefix, DEFAULT_FUNCTION_PREFIX,
};
pub use report::{
    average_score, generate_summary, round_score, summary_rows, SummaryRow, REPORT_HEADER,
};
pub use result::{ExperimentOutcome, ExperimentResult, MetricKind};
pub use runner::{report_path, ExperimentRunner, ProgressCallback};
