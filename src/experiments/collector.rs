//! Directory scan for experiment files.

use std::fs;
use std::path::Path;

use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::experiments::{load_experiment_functions_with_prefix, ExperimentHandle};

/// Finds experiment files in a directory and loads their experiments.
#[derive(Debug, Clone)]
pub struct ExperimentCollector {
    excluded: Vec<String>,
    suffix: String,
    function_prefix: String,
}

impl ExperimentCollector {
    /// Collector using the default naming conventions.
    pub fn new() -> Self {
        Self::from_config(&HarnessConfig::default())
    }

    /// Collector using the conventions from `config`.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            excluded: config.excluded.clone(),
            suffix: config.file_suffix(),
            function_prefix: config.function_prefix.clone(),
        }
    }

    /// Whether a directory entry name is reserved.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.excluded.iter().any(|name| name == file_name)
    }

    /// Load experiments from every eligible file directly inside `directory`.
    ///
    /// Subdirectories are not visited. Files are processed in name order and
    /// the first file that fails to load aborts the collection.
    pub fn collect(&self, directory: &Path) -> HarnessResult<Vec<ExperimentHandle>> {
        let mut entries = fs::read_dir(directory)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut experiments = Vec::new();
        for entry in entries {
            let file_name = entry.file_name().to_string_lossy().into_owned();

            if self.is_excluded(&file_name) {
                tracing::trace!(file = %file_name, "Skipping reserved entry");
                continue;
            }

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if !file_name.ends_with(&self.suffix) {
                continue;
            }

            experiments.extend(load_experiment_functions_with_prefix(
                &path,
                &self.function_prefix,
            )?);
        }

        tracing::debug!(
            directory = %directory.display(),
            count = experiments.len(),
            "Collected experiments"
        );

        Ok(experiments)
    }
}

impl Default for ExperimentCollector {
    fn default() -> Self {
        Self::new()
    }
}
