//! Experiment runner: discover, execute, summarise, persist.
//!
//! A run goes through four steps:
//!
//! 1. Collect experiments from the directory.
//! 2. Call each experiment in collection order and accumulate its results.
//! 3. Format the CSV summary.
//! 4. Write it to `{results_dir}/{prefix}_{HH}_{MM}_{SS}_{YYYY}_{MM}_{DD}.csv`.
//!
//! The first error in any step ends the run and nothing is written.
//! Experiments are not isolated from each other's failures.

use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::experiments::{generate_summary, ExperimentCollector, ExperimentResult};
use crate::filesystem::create_text_file;

/// Type for progress callbacks: (current, total, experiment label)
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str)>;

/// Discovers experiments in a directory, runs them and saves their results.
///
/// # Example
///
/// ```rust,no_run
/// use qg_experiments::experiments::ExperimentRunner;
///
/// let runner = ExperimentRunner::new("tests/model")?
///     .with_progress_callback(|current, total, name| {
///         println!("[{}/{}] {}", current, total, name);
///     });
/// let report = runner.run()?;
/// println!("Report written to {}", report.display());
/// # Ok::<(), qg_experiments::HarnessError>(())
/// ```
pub struct ExperimentRunner {
    directory: PathBuf,
    config: HarnessConfig,
    collector: ExperimentCollector,
    progress_callback: Option<ProgressCallback>,
}

impl ExperimentRunner {
    /// Create a runner with the default configuration.
    ///
    /// Fails with [`HarnessError::NotFound`] if the directory does not exist.
    pub fn new(directory: impl AsRef<Path>) -> HarnessResult<Self> {
        Self::with_config(directory, HarnessConfig::default())
    }

    /// Create a runner with a custom configuration.
    pub fn with_config(directory: impl AsRef<Path>, config: HarnessConfig) -> HarnessResult<Self> {
        config.validate()?;

        let directory = std::path::absolute(directory.as_ref())?;
        if !directory.exists() {
            return Err(HarnessError::NotFound { path: directory });
        }

        Ok(Self {
            directory,
            collector: ExperimentCollector::from_config(&config),
            config,
            progress_callback: None,
        })
    }

    /// Set a progress callback, called before each experiment.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Absolute experiment directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every experiment and return the collected results, without
    /// writing a report.
    pub fn execute(&self) -> HarnessResult<Vec<ExperimentResult>> {
        let experiments = self.collector.collect(&self.directory)?;
        let total = experiments.len();
        tracing::info!(total, directory = %self.directory.display(), "Running experiments");

        let mut results = Vec::new();
        for (index, experiment) in experiments.iter().enumerate() {
            let label = experiment.qualified_name();

            if let Some(ref callback) = self.progress_callback {
                callback(index + 1, total, &label);
            }
            tracing::info!("Running {}...", label);

            let outcome = experiment.invoke()?;
            results.extend(outcome.into_results());
        }

        Ok(results)
    }

    /// Run every experiment and write the summary report.
    ///
    /// Returns the path of the written report.
    pub fn run(&self) -> HarnessResult<PathBuf> {
        let results = self.execute()?;
        let report = generate_summary(&results);

        let path = report_path(&self.config.results_dir, &self.config.report_prefix, &Local::now());
        create_text_file(&path, &report)?;

        tracing::info!(
            "The results of the last experiments are stored in the {} file.",
            path.display()
        );

        Ok(path)
    }
}

impl std::fmt::Debug for ExperimentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentRunner")
            .field("directory", &self.directory)
            .field("config", &self.config)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

/// Report path for a run finished at `timestamp`.
pub fn report_path<Tz: TimeZone>(
    results_dir: &Path,
    prefix: &str,
    timestamp: &DateTime<Tz>,
) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    results_dir.join(format!(
        "{}_{}.csv",
        prefix,
        timestamp.format("%H_%M_%S_%Y_%m_%d")
    ))
}
