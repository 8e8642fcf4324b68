//! Turns one experiment file into experiment handles.

use std::path::Path;
use std::rc::Rc;

use crate::engine::lua_runtime::LuaModule;
use crate::error::HarnessResult;
use crate::experiments::ExperimentHandle;

/// Name prefix marking a function as an experiment
pub const DEFAULT_FUNCTION_PREFIX: &str = "measure_";

/// Load a Lua file and return its `measure_*` experiments.
///
/// The file runs in its own Lua state. Only global functions declaring no
/// parameters are returned, sorted by name.
pub fn load_experiment_functions(file_path: &Path) -> HarnessResult<Vec<ExperimentHandle>> {
    load_experiment_functions_with_prefix(file_path, DEFAULT_FUNCTION_PREFIX)
}

/// Like [`load_experiment_functions`] with a custom name prefix.
pub fn load_experiment_functions_with_prefix(
    file_path: &Path,
    prefix: &str,
) -> HarnessResult<Vec<ExperimentHandle>> {
    let module = Rc::new(LuaModule::load(file_path)?);

    let handles: Vec<ExperimentHandle> = module
        .functions_with_prefix(prefix)?
        .into_iter()
        .map(|(name, func)| {
            let owner = Rc::clone(&module);
            let experiment = name.clone();
            ExperimentHandle::new(name, module.name(), module.path(), move || {
                owner.call_experiment(&experiment, &func)
            })
        })
        .collect();

    tracing::debug!(
        path = %file_path.display(),
        count = handles.len(),
        "Collected experiment functions"
    );

    Ok(handles)
}
