//! Flatten nested mappings into a single level keyed by `CompoundKey`, and
//! restore them.
//!
//! ```text
//! {1: 2, 2: {1: 2, 3: 4}}  <->  {(1,): 2, (2, 1): 2, (2, 3): 4}
//! ```

use tracing::trace;

use crate::errors::CollectionError;
use crate::key::{CompoundKey, Key};
use crate::mapping::{Dict, Entries, Mapping};


/// Flatten `nested` depth-first, in its own iteration order.
///
/// Each non-mapping leaf becomes one entry keyed by the path of keys that
/// leads to it. Mappings of either kind are descended into; an empty
/// nested mapping has no leaves and so contributes nothing.
pub fn dict_to_flatdict<M: Mapping>(nested: &M) -> Dict {
    let mut flat = Dict::new();
    flatten_into(nested.entries(), &CompoundKey::root(), flat.entries_mut());
    flat
}

fn flatten_into(entries: &Entries, parent: &CompoundKey, out: &mut Entries) {
    for (key, value) in entries {
        let path = parent.child(key.clone());
        match value.entries() {
            Some(children) => flatten_into(children, &path, out),
            None => {
                out.insert(Key::Compound(path), value.clone());
            }
        }
    }
}


/// Restore a flat dict into nested plain `Dict`s.
pub fn flatdict_to_dict<M: Mapping>(flat: &M) -> Result<Dict, CollectionError> {
    flatdict_to_dict_with::<Dict, M>(flat)
}

/// Restore a flat dict, building every level as a `C`.
///
/// Each `CompoundKey` entry walks (creating as needed) one nested mapping
/// per leading segment and stores the value under the last one. Entries
/// with ordinary keys are copied to the top level unchanged, so a mapping
/// that was never flattened comes back as it was.
pub fn flatdict_to_dict_with<C: Mapping, M: Mapping>(flat: &M) -> Result<C, CollectionError> {
    let mut result = C::default();
    for (key, value) in flat.entries() {
        let path = match key {
            Key::Compound(path) => path,
            other => {
                trace!(key = %other, "copying non-compound key to top level");
                result.entries_mut().insert(other.clone(), value.clone());
                continue;
            }
        };
        let (last, parents) = path
            .split_last()
            .ok_or(CollectionError::EmptyCompoundKey)?;
        let mut current = result.entries_mut();
        for seg in parents {
            let next = current
                .entry(seg.clone())
                .or_insert_with(|| C::default().into_value());
            current = next
                .entries_mut()
                .ok_or_else(|| CollectionError::PathConflict(path.clone()))?;
        }
        current.insert(last.clone(), value.clone());
    }
    Ok(result)
}
