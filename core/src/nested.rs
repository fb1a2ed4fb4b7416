//! Recursive conversion of nested values into a chosen mapping kind.

use crate::dotdict::DotDict;
use crate::mapping::{Entries, Mapping};
use crate::value::Value;


/// Convert `value` so that every mapping in it is a `DotDict`.
///
/// ```
/// use dotmap_core::{as_nested_dict, Dict, Value};
///
/// let plain = Value::Dict(Dict::from_pairs([("a", 1)]));
/// let dotted = as_nested_dict(&plain);
/// assert_eq!(dotted.attr("a").unwrap(), &Value::Int(1));
/// ```
pub fn as_nested_dict(value: &Value) -> Value {
    as_nested_dict_with::<DotDict>(value)
}

/// Convert `value` so that every mapping in it is a `C`.
///
/// Mappings of either kind become a new `C` with the same keys and
/// converted values; lists and tuples keep their kind with converted
/// elements; scalars are returned unchanged. Applying the conversion twice
/// gives an equal result.
pub fn as_nested_dict_with<C: Mapping>(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.iter().map(as_nested_dict_with::<C>).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(as_nested_dict_with::<C>).collect()),
        Value::Dict(_) | Value::Dot(_) => match value.entries() {
            Some(entries) => convert_entries::<C>(entries).into_value(),
            None => value.clone(),
        },
        scalar => scalar.clone(),
    }
}

/// Build a `C` from `entries`, converting every value recursively.
pub(crate) fn convert_entries<C: Mapping>(entries: &Entries) -> C {
    C::from_entries(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), as_nested_dict_with::<C>(v)))
            .collect(),
    )
}
