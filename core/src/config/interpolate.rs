//! `${section.key}` references between config values.
//!
//! References resolve innermost first, so `${a.${b.key}}` first splices
//! the value of `b.key` and then resolves the resulting path. A value that
//! is exactly one reference takes the referenced value (and its type); a
//! reference inside a longer string is replaced by the referenced value's
//! text. Unknown keys resolve to the empty string.

use tracing::{trace, warn};

use crate::key::{CompoundKey, Key};
use crate::mapping::{Dict, Mapping};
use crate::value::Value;

/// References can chain; stop after this many passes over the config.
const MAX_PASSES: usize = 10;


/// Resolve references across every string leaf of a flat config.
pub(crate) fn interpolate_references(flat: &mut Dict) {
    let mut pending: Vec<Key> = flat.keys().cloned().collect();

    for _ in 0..MAX_PASSES {
        if pending.is_empty() {
            return;
        }
        let mut still_pending = Vec::new();
        for key in pending {
            let resolved = match flat.get(key.clone()) {
                Some(Value::Str(s)) => resolve_pass(flat, s),
                _ => None,
            };
            if let Some(resolved) = resolved {
                trace!(key = %key, "resolved references");
                flat.set_item(key.clone(), resolved);
                still_pending.push(key);
            }
        }
        pending = still_pending;
    }

    if pending.iter().any(|k| matches!(flat.get(k.clone()), Some(Value::Str(s)) if find_reference(s).is_some())) {
        warn!(count = pending.len(), "config references did not resolve after {} passes", MAX_PASSES);
    }
}


/// Replace every innermost reference in `current` once.
///
/// Returns `None` when `current` holds no reference. Spliced text is not
/// searched again until the next pass.
fn resolve_pass(flat: &Dict, current: &str) -> Option<Value> {
    if let Some((0, end, path)) = find_reference(current) {
        if end == current.len() {
            return Some(lookup(flat, path));
        }
    }

    let mut out = String::with_capacity(current.len());
    let mut rest = current;
    let mut found = false;
    while let Some((start, end, path)) = find_reference(rest) {
        out.push_str(&rest[..start]);
        out.push_str(&lookup(flat, path).to_string());
        rest = &rest[end..];
        found = true;
    }
    if !found {
        return None;
    }
    out.push_str(rest);
    Some(Value::Str(out))
}

fn lookup(flat: &Dict, path: &str) -> Value {
    flat.get(CompoundKey::from_dotted(path))
        .cloned()
        .unwrap_or_else(|| Value::from(""))
}


/// Locate the first innermost `${...}` in `s`.
///
/// Returns the byte range of the whole reference and the path inside it.
/// The path must be non-empty and contain none of `$`, `{`, `}`.
pub(crate) fn find_reference(s: &str) -> Option<(usize, usize, &str)> {
    let mut search_from = 0;
    while let Some(offset) = s[search_from..].find("${") {
        let start = search_from + offset;
        let inner_start = start + 2;
        let inner = &s[inner_start..];
        match inner.find(|c: char| c == '$' || c == '{' || c == '}') {
            Some(stop) if stop > 0 && inner[stop..].starts_with('}') => {
                let end = inner_start + stop + 1;
                return Some((start, end, &s[inner_start..inner_start + stop]));
            }
            _ => search_from = start + 1,
        }
    }
    None
}
