//! Harness configuration.
//!
//! Every field has a default matching the built-in conventions, so an empty
//! file (or no file at all) gives the standard behaviour.
//!
//! # Example
//!
//! ```yaml
//! extension: lua
//! excluded:
//!   - init.lua
//!   - results
//!   - runner.lua
//! function_prefix: measure_
//! results_dir: tests/model/results
//! report_prefix: qg
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};
use crate::experiments::DEFAULT_FUNCTION_PREFIX;

/// Configuration for discovery and report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Extension of experiment files, without the dot
    pub extension: String,

    /// Directory entries that are never treated as experiments
    pub excluded: Vec<String>,

    /// Name prefix of experiment functions
    pub function_prefix: String,

    /// Directory reports are written to, relative to the working directory
    pub results_dir: PathBuf,

    /// Report file name prefix
    pub report_prefix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            extension: "lua".to_string(),
            excluded: vec![
                "init.lua".to_string(),
                "results".to_string(),
                "runner.lua".to_string(),
            ],
            function_prefix: DEFAULT_FUNCTION_PREFIX.to_string(),
            results_dir: PathBuf::from("tests/model/results"),
            report_prefix: "qg".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml_str(yaml: &str) -> HarnessResult<Self> {
        let config: HarnessConfig = if yaml.trim().is_empty() {
            HarnessConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check that the naming fields are usable.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(HarnessError::InvalidConfig(
                "extension must not be empty".to_string(),
            ));
        }
        if self.function_prefix.is_empty() {
            return Err(HarnessError::InvalidConfig(
                "function_prefix must not be empty".to_string(),
            ));
        }
        if self.report_prefix.is_empty() {
            return Err(HarnessError::InvalidConfig(
                "report_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// File name suffix matched by the collector, e.g. `.lua`
    pub fn file_suffix(&self) -> String {
        format!(".{}", self.extension.trim_start_matches('.'))
    }
}
