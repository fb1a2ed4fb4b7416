//! The `Mapping` trait shared by both container kinds, and `Dict`, the
//! plain insertion-ordered mapping.
//!
//! Functions that build containers (`as_nested_dict_with`,
//! `flatdict_to_dict_with`, `merge_dicts`) are generic over `Mapping`, so
//! the target kind is chosen with a type parameter: `Dict` or `DotDict`.

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::CollectionError;
use crate::key::Key;
use crate::value::Value;

/// Insertion-ordered storage behind every mapping.
pub type Entries = IndexMap<Key, Value>;


/// Common behaviour of `Dict` and `DotDict`.
///
/// Implementors only expose their storage; every mapping operation is
/// provided on top of it.
pub trait Mapping: Clone + Default + fmt::Debug {
    fn entries(&self) -> &Entries;

    fn entries_mut(&mut self) -> &mut Entries;

    fn from_entries(entries: Entries) -> Self;

    /// Wrap into the matching `Value` variant.
    fn into_value(self) -> Value;

    /// Stored value or `None`. Never fails.
    fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.entries().get(&key.into())
    }

    /// Stored value or `default`.
    fn get_or<'a>(&'a self, key: impl Into<Key>, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value> {
        self.entries_mut().get_mut(&key.into())
    }

    fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.entries().contains_key(&key.into())
    }

    /// Subscript read.
    fn item(&self, key: impl Into<Key>) -> Result<&Value, CollectionError> {
        let key = key.into();
        self.entries()
            .get(&key)
            .ok_or(CollectionError::KeyNotFound(key))
    }

    /// Subscript write. Overwrites in place, keeping the key's position.
    fn set_item(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        self.entries_mut().insert(key.into(), value.into());
    }

    /// Subscript delete, returning the removed value.
    fn del_item(&mut self, key: impl Into<Key>) -> Result<Value, CollectionError> {
        let key = key.into();
        self.entries_mut()
            .shift_remove(&key)
            .ok_or(CollectionError::KeyNotFound(key))
    }

    /// Return the existing value for `key`, storing `default` first if absent.
    fn setdefault(&mut self, key: impl Into<Key>, default: impl Into<Value>) -> &mut Value {
        self.entries_mut()
            .entry(key.into())
            .or_insert_with(|| default.into())
    }

    /// Copy every entry of `other` into `self`, overwriting on collision.
    fn update<M: Mapping>(&mut self, other: &M) {
        for (k, v) in other.entries() {
            self.entries_mut().insert(k.clone(), v.clone());
        }
    }

    /// Keyword form of `update`.
    fn update_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        for (k, v) in pairs {
            self.entries_mut().insert(k.into(), v.into());
        }
    }

    fn clear(&mut self) {
        self.entries_mut().clear();
    }

    /// Shallow copy. Values are owned, so the copy shares nothing.
    fn copy(&self) -> Self {
        self.clone()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Keys in insertion order.
    fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.entries().keys()
    }

    fn values(&self) -> indexmap::map::Values<'_, Key, Value> {
        self.entries().values()
    }

    /// `(key, value)` pairs in insertion order.
    fn items(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.entries().iter()
    }
}


// ---------------------------------------------------------------------------
// Dict
// ---------------------------------------------------------------------------

/// A plain insertion-ordered mapping. Serializable, unlike `DotDict`.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Entries,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    /// Build from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        pairs.into_iter().collect()
    }
}

impl Mapping for Dict {
    fn entries(&self) -> &Entries {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }

    fn from_entries(entries: Entries) -> Self {
        Dict { entries }
    }

    fn into_value(self) -> Value {
        Value::Dict(self)
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Dict {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Dict {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Dict) -> bool {
        self.entries == other.entries
    }
}

impl Index<&str> for Dict {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.entries.get(&Key::from(key)) {
            Some(v) => v,
            None => panic!("key not found: '{}'", key),
        }
    }
}

impl Index<&Key> for Dict {
    type Output = Value;

    fn index(&self, key: &Key) -> &Value {
        match self.entries.get(key) {
            Some(v) => v,
            None => panic!("key not found: {}", key.repr()),
        }
    }
}

impl Serialize for Dict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_or_falls_back() {
        let d = Dict::from_pairs([("data", 5)]);
        assert_eq!(d.get("data"), Some(&Value::Int(5)));
        assert_eq!(d.get("no_data"), None);
        let fallback = Value::from("fallback");
        assert_eq!(d.get_or("no_data", &fallback), &fallback);
    }

    #[test]
    fn item_reports_missing_key() {
        let d = Dict::from_pairs([("data", 5)]);
        assert_eq!(
            d.item("nothing"),
            Err(CollectionError::KeyNotFound(Key::from("nothing")))
        );
    }

    #[test]
    fn set_item_keeps_position_on_overwrite() {
        let mut d = Dict::new();
        d.set_item("a", 1);
        d.set_item("b", 2);
        d.set_item("a", 3);
        let keys: Vec<&Key> = d.keys().collect();
        assert_eq!(keys, vec![&Key::from("a"), &Key::from("b")]);
        assert_eq!(d["a"], Value::Int(3));
    }

    #[test]
    fn del_item_preserves_order_of_rest() {
        let mut d = Dict::from_pairs([("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(d.del_item("a").unwrap(), Value::Int(1));
        let keys: Vec<String> = d.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        assert!(d.del_item("a").is_err());
    }

    #[test]
    fn setdefault_only_inserts_once() {
        let mut d = Dict::from_pairs([("car", "best")]);
        assert_eq!(d.setdefault("data", 5), &Value::Int(5));
        assert_eq!(d.setdefault("data", 6), &Value::Int(5));
        assert_eq!(d["car"], Value::from("best"));
    }

    #[test]
    fn equality_ignores_order() {
        let a = Dict::from_pairs([("x", 1), ("y", 2)]);
        let b = Dict::from_pairs([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_in_insertion_order() {
        let d = Dict::from_pairs([("b", 1), ("a", 2)]);
        assert_eq!(serde_json::to_string(&d).unwrap(), r#"{"b":1,"a":2}"#);
        assert_eq!(serde_json::to_value(&d).unwrap(), json!({"a": 2, "b": 1}));
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_missing_key() {
        let d = Dict::new();
        let _ = &d["missing"];
    }
}
