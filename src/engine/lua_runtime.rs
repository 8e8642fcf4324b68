//! Lua runtime integration via mlua
//!
//! Every experiment file is executed in its own Lua 5.4 state, which acts as
//! the file's namespace: two files may define identically named helpers
//! without clashing. The state is created with the safe standard libraries
//! plus `debug`, and the host API below is installed before the file's
//! top-level code runs.
//!
//! ## Host API
//!
//! ```lua
//! -- Metric names
//! Metric.COSINE_SIMILARITY  -- "COSINE_SIMILARITY"
//! Metric.BLEU_4, Metric.METEOR, Metric.ROUGE_3
//!
//! -- Result constructor, positional or table form
//! Result("gpt-small", Metric.BLEU_4, {0.41, 0.38})
//! Result{ model_name = "gpt-small", metric = Metric.METEOR, data_points = {0.7} }
//! ```
//!
//! ## Trust
//!
//! Experiment files are trusted. Nothing is sandboxed: `io`, `os` and
//! `debug` are available, and top-level side effects run at load time.

use mlua::{
    AnyUserData, Function, Lua, LuaOptions, MetaMethod, MultiValue, StdLib, Table, UserData,
    UserDataFields, UserDataMethods, Value,
};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};
use crate::experiments::{ExperimentOutcome, ExperimentResult, MetricKind};

/// Lua-side wrapper around an [`ExperimentResult`]
#[derive(Debug, Clone)]
pub struct LuaExperimentResult(pub ExperimentResult);

impl UserData for LuaExperimentResult {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("model_name", |_, this| {
            Ok(this.0.model_name().to_string())
        });
        fields.add_field_method_get("metric", |_, this| Ok(this.0.metric().as_str()));
        fields.add_field_method_get("data_points", |_, this| {
            Ok(this.0.data_points().to_vec())
        });
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!(
                "Result({}, {}, {} points)",
                this.0.model_name(),
                this.0.metric(),
                this.0.data_points().len()
            ))
        });
    }
}

/// A loaded experiment file: one Lua state and the file it came from
pub struct LuaModule {
    /// The Lua state holding the file's globals
    lua: Lua,

    /// Logical module name (file stem)
    name: String,

    /// Source path used as chunk name
    path: PathBuf,

    /// `debug.getinfo`, captured before user code can replace it
    getinfo: Function,
}

impl LuaModule {
    /// Read and execute a Lua file in a fresh state.
    ///
    /// The module name is the file stem. Read failures, syntax errors and
    /// errors raised by top-level code are all reported as
    /// [`HarnessError::Load`] naming the file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| load_error(path, "cannot derive a module name from the path"))?;

        let code = fs::read_to_string(path)
            .map_err(|e| load_error(path, format!("failed to read file: {}", e)))?;

        Self::from_source(name, path, &code)
    }

    /// Execute `code` in a fresh state as module `name`.
    ///
    /// `path` is only used for the chunk name and error attribution.
    pub fn from_source(name: impl Into<String>, path: &Path, code: &str) -> HarnessResult<Self> {
        let name = name.into();
        let lua = new_state();

        install_host_api(&lua).map_err(|e| load_error(path, e.to_string()))?;

        let getinfo = lua
            .globals()
            .get::<Table>("debug")
            .and_then(|debug| debug.get::<Function>("getinfo"))
            .map_err(|e| load_error(path, format!("debug library unavailable: {}", e)))?;

        let chunk = lua
            .load(code)
            .set_name(format!("@{}", path.display()))
            .into_function()
            .map_err(|e| load_error(path, format!("syntax error: {}", e)))?;

        // Like `require`, the chunk receives its module name as `...`
        chunk
            .call::<()>(name.as_str())
            .map_err(|e| load_error(path, format!("error in top-level code: {}", e)))?;

        tracing::debug!(module = %name, path = %path.display(), "Loaded Lua module");

        Ok(Self {
            lua,
            name,
            path: path.to_path_buf(),
            getinfo,
        })
    }

    /// Module name (file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the module was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Global functions whose name starts with `prefix` and that declare no
    /// parameters, sorted by name.
    ///
    /// Lua table iteration order is unspecified, hence the sort.
    pub fn functions_with_prefix(&self, prefix: &str) -> HarnessResult<Vec<(String, Function)>> {
        let mut selected = Vec::new();

        for pair in self.lua.globals().pairs::<Value, Value>() {
            let (key, value) = pair?;
            let (Value::String(key), Value::Function(func)) = (key, value) else {
                continue;
            };
            let name = key.to_string_lossy().to_string();

            if !name.starts_with(prefix) {
                continue;
            }

            if !self.takes_no_parameters(&func)? {
                tracing::debug!(
                    module = %self.name,
                    function = %name,
                    "Skipping experiment function that declares parameters"
                );
                continue;
            }

            selected.push((name, func));
        }

        selected.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(selected)
    }

    /// Call a zero-argument function from this module and convert its return
    /// value into an [`ExperimentOutcome`].
    ///
    /// Errors raised by the function body are returned as-is. Returning no
    /// value is treated as returning `nil`; returning several values is
    /// rejected rather than keeping only the first.
    pub fn call_experiment(
        &self,
        experiment: &str,
        func: &Function,
    ) -> HarnessResult<ExperimentOutcome> {
        let mut values: MultiValue = func.call(())?;
        match values.len() {
            0 => outcome_from_lua(experiment, Value::Nil),
            1 => outcome_from_lua(experiment, values.pop_front().unwrap_or(Value::Nil)),
            n => Err(unsupported(experiment, format!("{} values", n))),
        }
    }

    fn takes_no_parameters(&self, func: &Function) -> HarnessResult<bool> {
        let info: Table = self.getinfo.call((func.clone(), "u"))?;
        let nparams: i64 = info.get("nparams")?;
        Ok(nparams == 0)
    }
}

impl std::fmt::Debug for LuaModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LuaModule")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

/// Convert an experiment's return value.
///
/// A `Result` userdata is a single outcome; a sequence table of `Result`
/// userdata is a batch. Anything else is rejected with
/// [`HarnessError::UnsupportedResultType`].
pub fn outcome_from_lua(experiment: &str, value: Value) -> HarnessResult<ExperimentOutcome> {
    match value {
        Value::UserData(ud) => match result_from_userdata(&ud) {
            Some(result) => Ok(ExperimentOutcome::Single(result)),
            None => Err(unsupported(experiment, "userdata")),
        },
        Value::Table(table) => {
            let len = table.raw_len();
            let entries = table.clone().pairs::<Value, Value>().count();
            if entries != len {
                return Err(unsupported(experiment, "table"));
            }

            let mut results = Vec::with_capacity(len);
            for index in 1..=len {
                let item: Value = table.raw_get(index)?;
                let result = match &item {
                    Value::UserData(ud) => result_from_userdata(ud),
                    _ => None,
                };
                match result {
                    Some(result) => results.push(result),
                    None => {
                        return Err(unsupported(
                            experiment,
                            &format!("table containing {}", item.type_name()),
                        ))
                    }
                }
            }
            Ok(ExperimentOutcome::Batch(results))
        }
        other => Err(unsupported(experiment, other.type_name())),
    }
}

fn result_from_userdata(ud: &AnyUserData) -> Option<ExperimentResult> {
    ud.borrow::<LuaExperimentResult>()
        .ok()
        .map(|wrapped| wrapped.0.clone())
}

fn new_state() -> Lua {
    // SAFETY: experiment files run with full trust; `debug` is loaded so the
    // loader can read function arity through `debug.getinfo`.
    unsafe { Lua::unsafe_new_with(StdLib::ALL_SAFE | StdLib::DEBUG, LuaOptions::default()) }
}

/// Install the `Metric` table and the `Result` constructor.
fn install_host_api(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();

    let metrics = lua.create_table()?;
    for metric in MetricKind::ALL {
        metrics.set(metric.as_str(), metric.as_str())?;
    }
    globals.set("Metric", metrics)?;

    let constructor = lua.create_function(
        |lua, (first, metric, data_points): (Value, Option<String>, Option<Vec<f64>>)| {
            let (model_name, metric, data_points) = match first {
                Value::Table(fields) if metric.is_none() && data_points.is_none() => (
                    fields.get::<String>("model_name")?,
                    fields.get::<String>("metric")?,
                    fields.get::<Vec<f64>>("data_points")?,
                ),
                other => (
                    lua.unpack::<String>(other)?,
                    metric.ok_or_else(|| mlua::Error::external("Result: missing metric"))?,
                    data_points
                        .ok_or_else(|| mlua::Error::external("Result: missing data_points"))?,
                ),
            };

            let metric: MetricKind = metric.parse().map_err(mlua::Error::external)?;
            ExperimentResult::new(model_name, metric, data_points)
                .map(LuaExperimentResult)
                .map_err(mlua::Error::external)
        },
    )?;
    globals.set("Result", constructor)?;

    Ok(())
}

fn load_error(path: &Path, message: impl Into<String>) -> HarnessError {
    HarnessError::Load {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn unsupported(experiment: &str, kind: impl Into<String>) -> HarnessError {
    HarnessError::UnsupportedResultType {
        experiment: experiment.to_string(),
        kind: kind.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(code: &str) -> LuaModule {
        LuaModule::from_source("fixture", Path::new("fixture.lua"), code).unwrap()
    }

    fn names(module: &LuaModule) -> Vec<String> {
        module
            .functions_with_prefix("measure_")
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    #[test]
    fn test_selects_prefixed_zero_arg_functions_sorted() {
        let module = module(
            r#"
            function measure_zeta() return Result("m", Metric.BLEU_4, {1}) end
            function measure_alpha() return Result("m", Metric.BLEU_4, {1}) end
            function measure_with_args(x) return x end
            function helper() return 1 end
            measure_not_a_function = 42
            "#,
        );

        assert_eq!(names(&module), vec!["measure_alpha", "measure_zeta"]);
    }

    #[test]
    fn test_vararg_function_is_selected() {
        let module = module("function measure_any(...) return {} end");
        assert_eq!(names(&module), vec!["measure_any"]);
    }

    #[test]
    fn test_local_functions_are_not_selected() {
        let module = module("local function measure_hidden() return {} end");
        assert!(names(&module).is_empty());
    }

    #[test]
    fn test_module_name_passed_as_vararg() {
        let module = module("MODULE = ...");
        let name: String = module.lua.globals().get("MODULE").unwrap();
        assert_eq!(name, "fixture");
    }

    #[test]
    fn test_syntax_error_is_load_error() {
        let err = LuaModule::from_source("broken", Path::new("broken.lua"), "function (")
            .unwrap_err();
        match err {
            HarnessError::Load { path, message } => {
                assert_eq!(path, PathBuf::from("broken.lua"));
                assert!(message.contains("syntax error"), "message: {}", message);
            }
            other => panic!("Expected Load error, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_error_is_load_error() {
        let err = LuaModule::from_source("boom", Path::new("boom.lua"), "error('boom')")
            .unwrap_err();
        assert!(matches!(err, HarnessError::Load { ref message, .. } if message.contains("boom")));
    }

    #[test]
    fn test_single_result() {
        let module = module(
            r#"function measure_one() return Result("m1", Metric.COSINE_SIMILARITY, {0.9, 0.8}) end"#,
        );
        let (name, func) = module.functions_with_prefix("measure_").unwrap().remove(0);

        let outcome = module.call_experiment(&name, &func).unwrap();
        let expected =
            ExperimentResult::new("m1", MetricKind::CosineSimilarity, vec![0.9, 0.8]).unwrap();
        assert_eq!(outcome, ExperimentOutcome::Single(expected));
    }

    #[test]
    fn test_table_constructor_and_batch() {
        let module = module(
            r#"
            function measure_many()
                return {
                    Result{ model_name = "a", metric = Metric.METEOR, data_points = {1, 2} },
                    Result("b", Metric.ROUGE_3, {0.5}),
                }
            end
            "#,
        );
        let (name, func) = module.functions_with_prefix("measure_").unwrap().remove(0);

        let results = module.call_experiment(&name, &func).unwrap().into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].model_name(), "a");
        assert_eq!(results[0].data_points(), &[1.0, 2.0]);
        assert_eq!(results[1].metric(), MetricKind::Rouge3);
    }

    #[test]
    fn test_empty_table_is_empty_batch() {
        let lua = Lua::new();
        let table = lua.create_table().unwrap();
        let outcome = outcome_from_lua("measure_empty", Value::Table(table)).unwrap();
        assert_eq!(outcome, ExperimentOutcome::Batch(vec![]));
    }

    #[test]
    fn test_unsupported_return_kinds() {
        let module = module(
            r#"
            function measure_int() return 7 end
            function measure_map() return { a = 1 } end
            function measure_mixed() return { Result("m", Metric.BLEU_4, {1}), "x" } end
            "#,
        );

        for (name, func) in module.functions_with_prefix("measure_").unwrap() {
            let err = module.call_experiment(&name, &func).unwrap_err();
            let HarnessError::UnsupportedResultType { experiment, kind } = err else {
                panic!("Expected UnsupportedResultType for {}", name);
            };
            assert_eq!(experiment, name);
            let expected = match name.as_str() {
                "measure_int" => "integer",
                "measure_map" => "table",
                _ => "table containing string",
            };
            assert_eq!(kind, expected);
        }
    }

    #[test]
    fn test_multiple_return_values_rejected() {
        let module = module(
            r#"
            function measure_two()
                return Result("a", Metric.BLEU_4, {1}), Result("b", Metric.METEOR, {0.5})
            end
            function measure_nothing() end
            "#,
        );
        let functions = module.functions_with_prefix("measure_").unwrap();
        let kind_of = |name: &str| {
            let (_, func) = functions.iter().find(|(n, _)| n == name).unwrap();
            match module.call_experiment(name, func).unwrap_err() {
                HarnessError::UnsupportedResultType { kind, .. } => kind,
                other => panic!("Expected UnsupportedResultType, got {:?}", other),
            }
        };

        assert_eq!(kind_of("measure_two"), "2 values");
        assert_eq!(kind_of("measure_nothing"), "nil");
    }

    #[test]
    fn test_result_fields_readable_from_lua() {
        let module = module(
            r#"
            local r = Result("m1", Metric.BLEU_4, {0.5, 1})
            NAME, METRIC, COUNT = r.model_name, r.metric, #r.data_points
            "#,
        );
        let globals = module.lua.globals();
        assert_eq!(globals.get::<String>("NAME").unwrap(), "m1");
        assert_eq!(globals.get::<String>("METRIC").unwrap(), "BLEU_4");
        assert_eq!(globals.get::<i64>("COUNT").unwrap(), 2);
    }

    #[test]
    fn test_invalid_result_raises_in_experiment() {
        let module = module(
            r#"
            function measure_empty() return Result("m1", Metric.BLEU_4, {}) end
            function measure_bad_metric() return Result("m1", "BLEU", {1}) end
            "#,
        );

        for (name, func) in module.functions_with_prefix("measure_").unwrap() {
            let err = module.call_experiment(&name, &func).unwrap_err();
            assert!(matches!(err, HarnessError::Lua(_)), "{}: {:?}", name, err);
        }
    }

    #[test]
    fn test_experiment_error_propagates() {
        let module = module("function measure_fail() error('metric backend down') end");
        let (name, func) = module.functions_with_prefix("measure_").unwrap().remove(0);

        let err = module.call_experiment(&name, &func).unwrap_err();
        assert!(err.to_string().contains("metric backend down"));
    }

    #[test]
    fn test_modules_are_isolated() {
        let first = module("SHARED = 1; function measure_a() return {} end");
        let second = module("function measure_b() return {} end");

        assert_eq!(names(&first), vec!["measure_a"]);
        assert_eq!(names(&second), vec!["measure_b"]);
        let shared: Value = second.lua.globals().get("SHARED").unwrap();
        assert!(shared.is_nil());
    }
}
