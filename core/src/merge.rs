//! Recursive merging of nested mappings.

use crate::mapping::{Entries, Mapping};
use crate::value::Value;


/// Merge `b` into a copy of `a`.
///
/// Every key of `b` replaces the matching key of `a`, except when both
/// sides hold a mapping: then the two mappings are merged recursively by
/// the same rule. Neither input is modified, and nested mappings of the
/// result keep the kind they had in `a`.
pub fn merge_dicts<A: Mapping, B: Mapping>(a: &A, b: &B) -> A {
    let mut merged = a.copy();
    merge_entries(merged.entries_mut(), b.entries());
    merged
}

fn merge_entries(target: &mut Entries, other: &Entries) {
    for (key, incoming) in other {
        if let Some(incoming_entries) = incoming.entries() {
            if let Some(existing_entries) = target.get_mut(key).and_then(Value::entries_mut) {
                merge_entries(existing_entries, incoming_entries);
                continue;
            }
        }
        target.insert(key.clone(), incoming.clone());
    }
}
