use std::path::PathBuf;


/// A parsed `dotmap` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show { source: Source },
    Get { source: Source, path: String },
    Flatten { file: PathBuf },
    Merge { base: PathBuf, overlay: PathBuf },
    Help,
}

/// Where a config comes from: a defaults file plus optional layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub file: PathBuf,
    pub user: Option<PathBuf>,
    pub env_prefix: Option<String>,
}


/// Parse CLI arguments (without the program name) into a `Command`.
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'dotmap help' for usage.".into());
    }

    match args[0] {
        "show" => parse_show(args),
        "get" => parse_get(args),
        "flatten" => parse_flatten(args),
        "merge" => parse_merge(args),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `dotmap show <file> [--user <file>] [--env-prefix <P>]`
fn parse_show(args: &[&str]) -> Result<Command, String> {
    let (positional, source) = parse_source(&args[1..])?;
    if positional.len() != 1 {
        return Err("Usage: dotmap show <file> [--user <file>] [--env-prefix <P>]".into());
    }
    Ok(Command::Show {
        source: source.with_file(positional[0]),
    })
}

/// `dotmap get <file> <dotted.path> [--user <file>] [--env-prefix <P>]`
fn parse_get(args: &[&str]) -> Result<Command, String> {
    let (positional, source) = parse_source(&args[1..])?;
    if positional.len() != 2 {
        return Err("Usage: dotmap get <file> <dotted.path> [--user <file>] [--env-prefix <P>]".into());
    }
    Ok(Command::Get {
        source: source.with_file(positional[0]),
        path: positional[1].into(),
    })
}

/// `dotmap flatten <file>`
fn parse_flatten(args: &[&str]) -> Result<Command, String> {
    if args.len() != 2 {
        return Err("Usage: dotmap flatten <file>".into());
    }
    Ok(Command::Flatten {
        file: PathBuf::from(args[1]),
    })
}

/// `dotmap merge <a> <b>`
fn parse_merge(args: &[&str]) -> Result<Command, String> {
    if args.len() != 3 {
        return Err("Usage: dotmap merge <a> <b>".into());
    }
    Ok(Command::Merge {
        base: PathBuf::from(args[1]),
        overlay: PathBuf::from(args[2]),
    })
}


// ---------------------------------------------------------------------------
// Flag helpers
// ---------------------------------------------------------------------------

/// Split `--user` / `--env-prefix` flags from positional arguments.
fn parse_source<'a>(args: &[&'a str]) -> Result<(Vec<&'a str>, Source), String> {
    let mut positional = Vec::new();
    let mut source = Source {
        file: PathBuf::new(),
        user: None,
        env_prefix: None,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--user" => {
                source.user = Some(PathBuf::from(flag_value(args, i)?));
                i += 2;
            }
            "--env-prefix" => {
                source.env_prefix = Some(flag_value(args, i)?.to_string());
                i += 2;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown flag: '{}'", flag));
            }
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }
    Ok((positional, source))
}

fn flag_value<'a>(args: &[&'a str], i: usize) -> Result<&'a str, String> {
    args.get(i + 1)
        .copied()
        .ok_or_else(|| format!("{} requires a value", args[i]))
}

impl Source {
    fn with_file(mut self, file: &str) -> Self {
        self.file = PathBuf::from(file);
        self
    }
}
