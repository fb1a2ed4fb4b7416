//! Layered configuration loading.
//!
//! A config is built from a defaults file, an optional user file merged on
//! top with `merge_dicts`, and `PREFIX__SECTION__KEY` environment
//! overrides. String values may reference environment variables (`$HOME`,
//! `${HOME}`) and other config keys (`${section.key}`). The result is a
//! `DotDict` tree:
//!
//! ```yaml
//! general:
//!   x: 1
//!   nested:
//!     x: "${general.x}"      # -> 1
//!     label: "${general.x}!" # -> "1!"
//! paths:
//!   home: "$HOME"
//! ```

pub mod env;
pub mod interpolate;
pub mod temporary;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dotdict::DotDict;
use crate::errors::ConfigError;
use crate::flat::{dict_to_flatdict, flatdict_to_dict_with};
use crate::mapping::{Dict, Mapping};
use crate::merge::merge_dicts;
use crate::nested::as_nested_dict;
use crate::value::Value;

pub use temporary::{set_temporary_config, TemporaryConfig};


/// Builder for loading a layered config.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    user_path: Option<PathBuf>,
    env_prefix: Option<String>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Start from the defaults file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigLoader {
            path: path.into(),
            user_path: None,
            env_prefix: None,
            env: None,
        }
    }

    /// Merge this file over the defaults when it exists.
    pub fn user_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_path = Some(path.into());
        self
    }

    /// Enable `PREFIX__SECTION__KEY` overrides.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Use a fixed environment instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Read, layer and resolve the config.
    pub fn load(&self) -> Result<DotDict, ConfigError> {
        let env = match &self.env {
            Some(vars) => vars.clone(),
            None => process_env(),
        };

        let mut config = load_file(&self.path)?;
        debug!(path = %self.path.display(), keys = config.len(), "loaded default config");

        if let Some(user_path) = &self.user_path {
            if user_path.is_file() {
                let user = load_file(user_path)?;
                debug!(path = %user_path.display(), keys = user.len(), "merging user config");
                config = merge_dicts(&config, &user);
            } else {
                debug!(path = %user_path.display(), "user config not found; skipping");
            }
        }

        let mut flat = dict_to_flatdict(&config);
        if let Some(prefix) = &self.env_prefix {
            env::apply_env_overrides(&mut flat, prefix, &env);
        }
        env::interpolate_env_values(&mut flat, &env);
        interpolate::interpolate_references(&mut flat);

        let nested: DotDict = flatdict_to_dict_with::<DotDict, _>(&flat)?;
        // Lists of mappings came through as plain leaves; convert those too.
        match as_nested_dict(&nested.into_value()) {
            Value::Dot(d) => Ok(d),
            other => Ok(DotDict::from_entries(other.entries().cloned().unwrap_or_default())),
        }
    }
}


/// Load a layered config in one call.
pub fn load_configuration(
    path: &Path,
    user_config_path: Option<&Path>,
    env_var_prefix: Option<&str>,
) -> Result<DotDict, ConfigError> {
    let mut loader = ConfigLoader::new(path);
    if let Some(user) = user_config_path {
        loader = loader.user_config(user);
    }
    if let Some(prefix) = env_var_prefix {
        loader = loader.env_prefix(prefix);
    }
    loader.load()
}


/// Read a YAML or JSON file into a plain `Dict`.
///
/// `.json` files go through `serde_json`; everything else is read as YAML,
/// including `.toml` files, which are not supported. An empty file is an
/// empty mapping.
pub fn load_file(path: &Path) -> Result<Dict, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let value = if is_json {
        parse_json(&content)
    } else {
        parse_yaml(&content)
    }
    .map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    match value {
        Value::Dict(d) => Ok(d),
        Value::Null => Ok(Dict::new()),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str::<serde_yaml::Value>(content)
        .map(Value::from)
        .map_err(|e| e.to_string())
}

fn parse_json(content: &str) -> Result<Value, String> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str::<serde_json::Value>(content)
        .map(Value::from)
        .map_err(|e| e.to_string())
}


/// Interpret a string from the environment as a bool, integer or float,
/// falling back to the string itself.
///
/// `true`/`false` match case-insensitively.
pub fn string_to_type(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(s.to_string())
}


fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
debug: false
general:
  x: 1
  y: "hi"
  nested:
    x: "${general.x}"
    x_interpolated: "${general.x} + 1"
    y: "${general.y} or bye"
interpolation:
  key: "x"
  value: "${general.nested.${interpolation.key}}"
  bad_value: "${general.bad_key}"
env_vars:
  interpolated_path: "$PATH"
  interpolated_from_non_string_key_bool: "${env_vars.true}"
  interpolated_from_non_string_key_string: "${env_vars.true} string"
  not_interpolated_path: "xxx$PATHxxx"
logging:
  format: "log-format"
worker:
  heartbeat_seconds: 5
  concurrency: 4
  use_threads: false
  labels: ["python", "testing"]
  queues: ["testing"]
  disconnect:
    keyboard: 20
    pool_failure: 20
    server_requested: 30
"#;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("dotmap_config_tests");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn test_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DOTMAP_TEST__ENV_VARS__NEW_KEY", "TEST"),
            ("DOTMAP_TEST__ENV_VARS__TWICE__NESTED__NEW_KEY", "TEST"),
            ("DOTMAP_TEST__ENV_VARS__TRUE", "true"),
            ("DOTMAP_TEST__ENV_VARS__FALSE", "false"),
            ("DOTMAP_TEST__ENV_VARS__INT", "10"),
            ("DOTMAP_TEST__ENV_VARS__NEGATIVE_INT", "-10"),
            ("DOTMAP_TEST__ENV_VARS__FLOAT", "7.5"),
            ("DOTMAP_TEST__ENV_VARS__NEGATIVE_FLOAT", "-7.5"),
            ("DOTMAP_TEST__ENV_VARS__ESCAPED_CHARACTERS", r"line 1\nline 2\rand 3\tand 4"),
            ("PATH", "1/2/3"),
        ]
    }

    fn config(name: &str) -> DotDict {
        let path = write_temp(name, TEMPLATE);
        ConfigLoader::new(&path)
            .env_prefix("DOTMAP_TEST")
            .env_vars(test_env())
            .load()
            .unwrap()
    }

    fn section<'a>(cfg: &'a DotDict, name: &str) -> &'a DotDict {
        cfg.attr(name).unwrap().as_dot().unwrap()
    }

    #[test]
    fn keys() {
        let cfg = config("keys.yaml");
        assert!(cfg.contains_key("debug"));
        assert!(cfg.contains_key("general"));
        assert!(section(&cfg, "general").contains_key("nested"));
        assert!(!cfg.contains_key("x"));
    }

    #[test]
    fn getattr_missing() {
        let cfg = config("missing.yaml");
        let err = cfg.attr("hello").unwrap_err();
        assert!(err.to_string().contains("has no attribute"));
    }

    #[test]
    fn general_values_and_types() {
        let cfg = config("general.yaml");
        assert_eq!(cfg.attr("debug").unwrap(), &Value::Bool(false));
        let general = section(&cfg, "general");
        assert_eq!(general.attr("x").unwrap(), &Value::Int(1));
        assert_eq!(general.attr("y").unwrap(), &Value::from("hi"));
    }

    #[test]
    fn general_nested_interpolation() {
        let cfg = config("nested.yaml");
        let nested = section(section(&cfg, "general"), "nested");
        assert_eq!(nested.attr("x").unwrap(), &Value::Int(1));
        assert_eq!(nested.attr("x_interpolated").unwrap(), &Value::from("1 + 1"));
        assert_eq!(nested.attr("y").unwrap(), &Value::from("hi or bye"));
    }

    #[test]
    fn nested_reference_interpolation() {
        let cfg = config("interp.yaml");
        let interp = section(&cfg, "interpolation");
        assert_eq!(interp.attr("value").unwrap(), &Value::Int(1));
        assert_eq!(interp.attr("bad_value").unwrap(), &Value::from(""));
    }

    #[test]
    fn env_var_interpolation() {
        let cfg = config("envinterp.yaml");
        let vars = section(&cfg, "env_vars");
        assert_eq!(vars.attr("interpolated_path").unwrap(), &Value::from("1/2/3"));
        assert_eq!(vars.attr("not_interpolated_path").unwrap(), &Value::from("xxx$PATHxxx"));
    }

    #[test]
    fn env_overrides_with_types() {
        let cfg = config("envtypes.yaml");
        let vars = section(&cfg, "env_vars");
        assert_eq!(vars.attr("true").unwrap(), &Value::Bool(true));
        assert_eq!(vars.attr("false").unwrap(), &Value::Bool(false));
        assert_eq!(vars.attr("int").unwrap(), &Value::Int(10));
        assert_eq!(vars.attr("negative_int").unwrap(), &Value::Int(-10));
        assert_eq!(vars.attr("float").unwrap(), &Value::Float(7.5));
        assert_eq!(vars.attr("negative_float").unwrap(), &Value::Float(-7.5));
        assert_eq!(
            vars.attr("interpolated_from_non_string_key_bool").unwrap(),
            &Value::Bool(true)
        );
        assert_eq!(
            vars.attr("interpolated_from_non_string_key_string").unwrap(),
            &Value::from("true string")
        );
    }

    #[test]
    fn env_overrides_create_keys() {
        let cfg = config("envcreate.yaml");
        let vars = section(&cfg, "env_vars");
        assert_eq!(vars.attr("new_key").unwrap(), &Value::from("TEST"));
        assert_eq!(
            cfg.get_path("env_vars.twice.nested.new_key"),
            Some(&Value::from("TEST"))
        );
        assert_eq!(
            vars.attr("escaped_characters").unwrap(),
            &Value::from("line 1\nline 2\rand 3\tand 4")
        );
    }

    #[test]
    fn lists_survive_loading() {
        let cfg = config("lists.yaml");
        let labels = cfg.get_path("worker.labels").unwrap().as_list().unwrap();
        assert_eq!(labels, &[Value::from("python"), Value::from("testing")]);
    }

    #[test]
    fn copy_does_not_share_sections() {
        let cfg = config("copy.yaml");
        let mut new = cfg.copy();
        new.set_path("general.z", 1).unwrap();
        assert!(!section(&cfg, "general").contains_key("z"));
    }

    #[test]
    fn user_config_is_merged_before_interpolation() {
        let defaults = write_temp("defaults.yaml", TEMPLATE);
        let user = write_temp("user.yaml", "general:\n  x: 2\nuser:\n  foo: bar\n");
        let cfg = ConfigLoader::new(&defaults)
            .user_config(&user)
            .env_vars(Vec::<(String, String)>::new())
            .load()
            .unwrap();
        assert_eq!(cfg.get_path("general.x"), Some(&Value::Int(2)));
        assert_eq!(cfg.get_path("user.foo"), Some(&Value::from("bar")));
        assert_eq!(cfg.get_path("general.y"), Some(&Value::from("hi")));
        assert_eq!(cfg.get_path("general.nested.x"), Some(&Value::Int(2)));
    }

    #[test]
    fn missing_user_config_is_skipped() {
        let defaults = write_temp("defaults_only.yaml", "a: 1\n");
        let cfg = ConfigLoader::new(&defaults)
            .user_config("/nonexistent/dotmap/user.yaml")
            .load()
            .unwrap();
        assert_eq!(cfg["a"], Value::Int(1));
    }

    #[test]
    fn mixed_case_keys_are_kept_and_env_keys_lowercased() {
        let path = write_temp("mixed.yaml", "SeCtIoN:\n  KeY: 1\n");
        let cfg = ConfigLoader::new(&path)
            .env_prefix("DOTMAP_MIXED")
            .env_vars([("DOTMAP_MIXED__SECTION__KEY", "2")])
            .load()
            .unwrap();
        assert_eq!(cfg.get_path("SeCtIoN.KeY"), Some(&Value::Int(1)));
        assert_eq!(cfg.get_path("section.key"), Some(&Value::Int(2)));
    }

    #[test]
    fn process_environment_is_used_by_default() {
        std::env::set_var("DOTMAP_PROCESS_ENV_TEST__SECTION__KEY", "3");
        let path = write_temp("process.yaml", "");
        let cfg = load_configuration(&path, None, Some("DOTMAP_PROCESS_ENV_TEST")).unwrap();
        assert_eq!(cfg.get_path("section.key"), Some(&Value::Int(3)));
        std::env::remove_var("DOTMAP_PROCESS_ENV_TEST__SECTION__KEY");
    }

    #[test]
    fn json_files_load() {
        let path = write_temp("cfg.json", r#"{"a": {"b": [1, {"c": 2}]}}"#);
        let cfg = ConfigLoader::new(&path).load().unwrap();
        let item = cfg.get_path("a.b").unwrap().at(1).unwrap();
        assert_eq!(item.attr("c").unwrap(), &Value::Int(2));
    }

    #[test]
    fn load_file_errors() {
        assert!(matches!(
            load_file(Path::new("/nonexistent/dotmap.yaml")),
            Err(ConfigError::Io { .. })
        ));
        let bad = write_temp("bad.json", "{not json");
        assert!(matches!(load_file(&bad), Err(ConfigError::Parse { .. })));
        let list = write_temp("list.yaml", "- 1\n- 2\n");
        assert!(matches!(load_file(&list), Err(ConfigError::NotAMapping(_))));
    }

    #[test]
    fn string_to_type_conversions() {
        for s in ["true", "True", "TRUE", "trUe"] {
            assert_eq!(string_to_type(s), Value::Bool(true));
        }
        for s in ["false", "False", "FALSE", "falSe"] {
            assert_eq!(string_to_type(s), Value::Bool(false));
        }
        assert_eq!(string_to_type("1"), Value::Int(1));
        assert_eq!(string_to_type("1.5"), Value::Float(1.5));
        assert_eq!(string_to_type("-1"), Value::Int(-1));
        assert_eq!(string_to_type("-1.5"), Value::Float(-1.5));
        assert_eq!(string_to_type("x"), Value::from("x"));
    }
}
