//! dotmap CLI: inspect layered YAML/JSON configs from the command line.
//!
//! # Usage
//!
//! ```text
//! dotmap show config.yaml --user ~/.app.yaml --env-prefix APP
//! dotmap get config.yaml worker.concurrency
//! dotmap flatten config.yaml
//! dotmap merge defaults.yaml overrides.json
//! ```
//!
//! Set `RUST_LOG=debug` to see how layers and overrides are applied.

mod parse;

use std::path::Path;
use std::process;

use dotmap_core::config::{load_file, ConfigLoader};
use dotmap_core::{dict_to_flatdict, merge_dicts, DotDict, Key, Mapping, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::parse::{parse_args, Command, Source};


const USAGE: &str = "\
Usage: dotmap <command> [args]

Commands:
  show <file> [--user <file>] [--env-prefix <P>]         print the loaded config as JSON
  get <file> <dotted.path> [--user <file>] [--env-prefix <P>]
                                                         print one value as JSON
  flatten <file>                                         print `dotted.path = value` lines
  merge <a> <b>                                          print <b> merged over <a> as JSON
  help                                                   show this message";


fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let cmd = match parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("dotmap: {}", e);
            process::exit(1);
        }
    };

    match execute(cmd) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("dotmap: {}", e);
            process::exit(1);
        }
    }
}


fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}


/// Run a parsed command and return what should be printed.
fn execute(cmd: Command) -> Result<String, String> {
    debug!(?cmd, "executing");
    match cmd {
        Command::Help => Ok(USAGE.to_string()),
        Command::Show { source } => {
            let config = load_source(&source)?;
            to_pretty_json(&config.to_dict().into_value())
        }
        Command::Get { source, path } => {
            let config = load_source(&source)?;
            let value = config
                .get_path(&path)
                .ok_or_else(|| format!("no value at '{}'", path))?;
            let plain = match value {
                Value::Dot(d) => d.to_dict().into_value(),
                other => other.clone(),
            };
            to_pretty_json(&plain)
        }
        Command::Flatten { file } => {
            let nested = load_file(&file).map_err(|e| e.to_string())?;
            let flat = dict_to_flatdict(&nested);
            let mut lines = Vec::with_capacity(flat.len());
            for (key, value) in flat.items() {
                let json = value.to_json().map_err(|e| e.to_string())?;
                lines.push(format!("{} = {}", dotted(key), json));
            }
            Ok(lines.join("\n"))
        }
        Command::Merge { base, overlay } => {
            let merged = merge_dicts(&read(&base)?, &read(&overlay)?);
            to_pretty_json(&merged.into_value())
        }
    }
}


// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_source(source: &Source) -> Result<DotDict, String> {
    let mut loader = ConfigLoader::new(&source.file);
    if let Some(user) = &source.user {
        loader = loader.user_config(user);
    }
    if let Some(prefix) = &source.env_prefix {
        loader = loader.env_prefix(prefix.as_str());
    }
    loader.load().map_err(|e| e.to_string())
}

fn read(path: &Path) -> Result<dotmap_core::Dict, String> {
    load_file(path).map_err(|e| e.to_string())
}

fn to_pretty_json(value: &Value) -> Result<String, String> {
    let json = value.to_json().map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&json).map_err(|e| e.to_string())
}

fn dotted(key: &Key) -> String {
    match key {
        Key::Compound(path) => path.to_dotted(),
        other => other.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("dotmap-cli-tests");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn source(file: PathBuf) -> Source {
        Source {
            file,
            user: None,
            env_prefix: None,
        }
    }

    #[test]
    fn help_prints_usage() {
        let out = execute(Command::Help).unwrap();
        assert!(out.contains("flatten"));
    }

    #[test]
    fn show_resolves_references() {
        let file = write_temp("show.yaml", "a:\n  x: 1\n  y: \"${a.x}\"\n");
        let out = execute(Command::Show { source: source(file) }).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json, serde_json::json!({"a": {"x": 1, "y": 1}}));
    }

    #[test]
    fn get_returns_one_value() {
        let file = write_temp("get.yaml", "worker:\n  concurrency: 4\n  disconnect:\n    keyboard: 20\n");
        let out = execute(Command::Get {
            source: source(file.clone()),
            path: "worker.concurrency".into(),
        })
        .unwrap();
        assert_eq!(out, "4");

        let out = execute(Command::Get {
            source: source(file),
            path: "worker.disconnect".into(),
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json, serde_json::json!({"keyboard": 20}));
    }

    #[test]
    fn get_missing_path_is_error() {
        let file = write_temp("missing.yaml", "a: 1\n");
        let err = execute(Command::Get {
            source: source(file),
            path: "a.b".into(),
        })
        .unwrap_err();
        assert!(err.contains("a.b"));
    }

    #[test]
    fn flatten_prints_dotted_lines() {
        let file = write_temp("flat.yaml", "a:\n  b: 1\n  c:\n    d: \"x\"\ne: true\n");
        let out = execute(Command::Flatten { file }).unwrap();
        assert_eq!(out, "a.b = 1\na.c.d = \"x\"\ne = true");
    }

    #[test]
    fn merge_layers_second_over_first() {
        let a = write_temp("merge_a.yaml", "s:\n  x: 1\n  y: 2\n");
        let b = write_temp("merge_b.json", r#"{"s": {"y": 3}, "t": 4}"#);
        let out = execute(Command::Merge { base: a, overlay: b }).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json, serde_json::json!({"s": {"x": 1, "y": 3}, "t": 4}));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = execute(Command::Flatten {
            file: PathBuf::from("/nonexistent/dotmap.yaml"),
        })
        .unwrap_err();
        assert!(err.contains("/nonexistent/dotmap.yaml"));
    }
}
