//! Discovered experiment entry points.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::HarnessResult;
use crate::experiments::ExperimentOutcome;

/// Type for experiment invokers
pub type ExperimentFn = Box<dyn Fn() -> HarnessResult<ExperimentOutcome>>;

/// A zero-argument experiment plus the metadata needed to report on it.
///
/// Handles built by the loader keep their Lua state alive until dropped.
pub struct ExperimentHandle {
    name: String,
    module: String,
    source: PathBuf,
    invoke: ExperimentFn,
}

impl ExperimentHandle {
    /// Create a handle around any zero-argument invoker.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qg_experiments::experiments::{ExperimentHandle, ExperimentResult, MetricKind};
    ///
    /// let handle = ExperimentHandle::new("measure_const", "native", "native.rs", || {
    ///     Ok(ExperimentResult::new("m1", MetricKind::Bleu4, vec![0.5])?.into())
    /// });
    /// assert_eq!(handle.qualified_name(), "native.measure_const");
    /// ```
    pub fn new<F>(
        name: impl Into<String>,
        module: impl Into<String>,
        source: impl Into<PathBuf>,
        invoke: F,
    ) -> Self
    where
        F: Fn() -> HarnessResult<ExperimentOutcome> + 'static,
    {
        Self {
            name: name.into(),
            module: module.into(),
            source: source.into(),
            invoke: Box::new(invoke),
        }
    }

    /// Function name, e.g. `measure_bleu`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module the function was found in (file stem)
    pub fn module(&self) -> &str {
        &self.module
    }

    /// File the function was found in
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// `module.name`, used in progress output
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    /// Run the experiment.
    pub fn invoke(&self) -> HarnessResult<ExperimentOutcome> {
        (self.invoke)()
    }
}

impl fmt::Debug for ExperimentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentHandle")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("source", &self.source)
            .finish()
    }
}
