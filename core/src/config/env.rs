//! Environment handling for config loading: `PREFIX__SECTION__KEY`
//! overrides and `$VAR` / `${VAR}` expansion inside string values.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::key::{CompoundKey, Key};
use crate::mapping::{Dict, Mapping};
use crate::value::Value;

use super::string_to_type;

/// Upper bound on repeated expansion of a single value.
const MAX_EXPANSION_PASSES: usize = 10;


/// Store every `PREFIX__A__B=value` variable at the compound key `(a, b)`.
///
/// Key parts are lower-cased. Values are unescaped, env-expanded, and
/// typed with `string_to_type`. Variables are applied in name order so the
/// result does not depend on environment iteration order.
pub(crate) fn apply_env_overrides(flat: &mut Dict, prefix: &str, env: &HashMap<String, String>) {
    let marker = format!("{}__", prefix);
    let mut names: Vec<&String> = env.keys().filter(|k| k.starts_with(&marker)).collect();
    names.sort();

    for name in names {
        let option = &name[marker.len()..];
        if option.is_empty() {
            continue;
        }
        let path = CompoundKey::new(option.to_lowercase().split("__"));
        let raw = unescape(&env[name]);
        let expanded = interpolate_env(&raw, env).unwrap_or(raw);
        debug!(var = %name, key = %path.to_dotted(), "applying env override");
        flat.set_item(Key::Compound(path), string_to_type(&expanded));
    }
}


/// Expand env references in `s` until it stops changing.
///
/// Returns `None` when nothing was expanded, so callers can keep the
/// original (already typed) value.
pub(crate) fn interpolate_env(s: &str, env: &HashMap<String, String>) -> Option<String> {
    let mut current = s.to_string();
    for _ in 0..MAX_EXPANSION_PASSES {
        let next = expand_vars(&current, env);
        if next == current {
            return if current == s { None } else { Some(current) };
        }
        current = next;
    }
    warn!(value = %s, "env expansion did not settle; keeping last result");
    Some(current)
}


/// Replace `$NAME`, `${NAME}` and a leading `~` using `env`.
///
/// References to unset variables are left exactly as written, so
/// `xxx$PATHxxx` only expands if a variable named `PATHxxx` exists.
pub(crate) fn expand_vars(s: &str, env: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(s.len());

    let rest = match (s.strip_prefix('~'), env.get("HOME")) {
        (Some(tail), Some(home)) if tail.is_empty() || tail.starts_with('/') => {
            out.push_str(home);
            tail
        }
        _ => s,
    };

    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let after = &rest[i + 1..];
        if let Some(braced) = after.strip_prefix('{') {
            if let Some(close) = braced.find('}') {
                let name = &braced[..close];
                let consumed = 1 + close + 1;
                match env.get(name) {
                    Some(v) if !name.is_empty() => out.push_str(v),
                    _ => out.push_str(&rest[i..i + 1 + consumed]),
                }
                skip_bytes(&mut chars, i + 1 + consumed);
                continue;
            }
            out.push(c);
            continue;
        }
        let name_len = after
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push(c);
            continue;
        }
        let name = &after[..name_len];
        match env.get(name) {
            Some(v) => out.push_str(v),
            None => out.push_str(&rest[i..i + 1 + name_len]),
        }
        skip_bytes(&mut chars, i + 1 + name_len);
    }
    out
}

fn skip_bytes(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>, until: usize) {
    while let Some(&(j, _)) = chars.peek() {
        if j >= until {
            break;
        }
        chars.next();
    }
}


/// Turn the escape sequences `\n`, `\r`, `\t` and `\\` into characters.
/// Unknown escapes are kept verbatim.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}


/// Expand env references in every string leaf of `flat`; values that
/// changed are re-typed.
pub(crate) fn interpolate_env_values(flat: &mut Dict, env: &HashMap<String, String>) {
    for value in flat.entries_mut().values_mut() {
        let expanded = match value {
            Value::Str(s) => interpolate_env(s, env),
            _ => None,
        };
        if let Some(expanded) = expanded {
            *value = string_to_type(&expanded);
        }
    }
}
