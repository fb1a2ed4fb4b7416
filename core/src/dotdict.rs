//! `DotDict`: a mapping whose string keys are also reachable as
//! attributes.
//!
//! Attribute access is an explicit accessor family (`attr`, `attr_mut`,
//! `set_attr`, `del_attr`) over the same storage as subscript access
//! (`item`, `set_item`, `del_item`). Only identifier-shaped names are
//! attributes: a key like `"1abc"` or `"__x"` is reachable by subscript
//! only.
//!
//! Stored data always wins over operation names: `attr("items")` or
//! `attr("to_dict")` returns the stored entry, never the operation, since
//! operations are Rust methods and never share a namespace with data.
//!
//! ```
//! use dotmap_core::{DotDict, Mapping, Value};
//!
//! let mut dd = DotDict::from_pairs([("a", 34), ("b", 56)]);
//! assert_eq!(dd.attr("a").unwrap(), &Value::Int(34));
//! dd.set_attr("c", "set").unwrap();
//! assert_eq!(dd["c"], Value::from("set"));
//! ```

use std::fmt;
use std::ops::Index;

use crate::errors::CollectionError;
use crate::key::{CompoundKey, Key};
use crate::mapping::{Dict, Entries, Mapping};
use crate::nested::convert_entries;
use crate::value::Value;


#[derive(Debug, Clone, Default)]
pub struct DotDict {
    entries: Entries,
}

impl DotDict {
    pub fn new() -> Self {
        DotDict::default()
    }

    /// Keyword-style construction.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        pairs.into_iter().collect()
    }

    /// Copy the entries of any mapping. Nested values are not converted.
    pub fn from_mapping<M: Mapping>(other: &M) -> Self {
        DotDict {
            entries: other.entries().clone(),
        }
    }

    // -------------------------------------------------------------------
    // Attribute access
    // -------------------------------------------------------------------

    /// Attribute read. Absent or non-identifier names are an error, never
    /// a null value.
    pub fn attr(&self, name: &str) -> Result<&Value, CollectionError> {
        if !is_identifier(name) {
            return Err(CollectionError::AttributeNotFound(name.to_string()));
        }
        self.entries
            .get(&Key::from(name))
            .ok_or_else(|| CollectionError::AttributeNotFound(name.to_string()))
    }

    pub fn attr_mut(&mut self, name: &str) -> Result<&mut Value, CollectionError> {
        if !is_identifier(name) {
            return Err(CollectionError::AttributeNotFound(name.to_string()));
        }
        self.entries
            .get_mut(&Key::from(name))
            .ok_or_else(|| CollectionError::AttributeNotFound(name.to_string()))
    }

    /// Attribute write: stores under the string key `name`.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Value>) -> Result<(), CollectionError> {
        if !is_identifier(name) {
            return Err(CollectionError::InvalidAttribute(name.to_string()));
        }
        self.entries.insert(Key::from(name), value.into());
        Ok(())
    }

    pub fn del_attr(&mut self, name: &str) -> Result<Value, CollectionError> {
        if !is_identifier(name) {
            return Err(CollectionError::AttributeNotFound(name.to_string()));
        }
        self.entries
            .shift_remove(&Key::from(name))
            .ok_or_else(|| CollectionError::AttributeNotFound(name.to_string()))
    }

    /// Attribute names of this mapping, in insertion order.
    pub fn attr_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .keys()
            .filter_map(Key::as_str)
            .filter(|name| is_identifier(name))
    }

    // -------------------------------------------------------------------
    // Dotted paths
    // -------------------------------------------------------------------

    /// Follow `a.b.c` through nested mappings of either kind.
    pub fn get_path(&self, dotted: &str) -> Option<&Value> {
        let path = CompoundKey::from_dotted(dotted);
        let (last, parents) = path.split_last()?;
        let mut current = &self.entries;
        for seg in parents {
            current = current.get(seg)?.entries()?;
        }
        current.get(last)
    }

    /// Store `value` at `a.b.c`, creating `DotDict` sections on the way.
    pub fn set_path(&mut self, dotted: &str, value: impl Into<Value>) -> Result<(), CollectionError> {
        let path = CompoundKey::from_dotted(dotted);
        let (last, parents) = path
            .split_last()
            .ok_or(CollectionError::EmptyCompoundKey)?;
        let mut current = &mut self.entries;
        for seg in parents {
            let next = current
                .entry(seg.clone())
                .or_insert_with(|| Value::Dot(DotDict::new()));
            current = match next.entries_mut() {
                Some(entries) => entries,
                None => return Err(CollectionError::PathConflict(path.clone())),
            };
        }
        current.insert(last.clone(), value.into());
        Ok(())
    }

    // -------------------------------------------------------------------
    // Conversion
    // -------------------------------------------------------------------

    /// Recursively convert into plain `Dict`s, including mappings nested in
    /// lists and tuples.
    pub fn to_dict(&self) -> Dict {
        convert_entries::<Dict>(&self.entries)
    }

    /// Export as ordered keyword pairs for call sites that build option
    /// sets. Every key must be a string.
    pub fn to_kwargs(&self) -> Result<Vec<(String, Value)>, CollectionError> {
        self.entries
            .iter()
            .map(|(k, v)| match k {
                Key::Str(s) => Ok((s.clone(), v.clone())),
                other => Err(CollectionError::NonStringKey(other.clone())),
            })
            .collect()
    }
}

impl Mapping for DotDict {
    fn entries(&self) -> &Entries {
        &self.entries
    }

    fn entries_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }

    fn from_entries(entries: Entries) -> Self {
        DotDict { entries }
    }

    fn into_value(self) -> Value {
        Value::Dot(self)
    }
}


/// True for names usable as attributes: an ASCII letter or `_` followed by
/// letters, digits or `_`, and not starting with a double underscore.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = match chars.next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    };
    first_ok
        && !name.starts_with("__")
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}


// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

/// `<DotDict>` when empty, otherwise `<DotDict: 'a', 'b', 1>`: string keys
/// sorted first, then other keys in insertion order.
impl fmt::Display for DotDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("<DotDict>");
        }
        let mut strings: Vec<&str> = self.entries.keys().filter_map(Key::as_str).collect();
        strings.sort_unstable();
        let mut parts: Vec<String> = strings.iter().map(|s| format!("'{}'", s)).collect();
        parts.extend(
            self.entries
                .keys()
                .filter(|k| !k.is_str())
                .map(Key::repr),
        );
        write!(f, "<DotDict: {}>", parts.join(", "))
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for DotDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        DotDict {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DotDict {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for DotDict {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl PartialEq for DotDict {
    fn eq(&self, other: &DotDict) -> bool {
        self.entries == other.entries
    }
}

impl PartialEq<Dict> for DotDict {
    fn eq(&self, other: &Dict) -> bool {
        &self.entries == other.entries()
    }
}

impl PartialEq<DotDict> for Dict {
    fn eq(&self, other: &DotDict) -> bool {
        self.entries() == &other.entries
    }
}

impl Index<&str> for DotDict {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self.entries.get(&Key::from(key)) {
            Some(v) => v,
            None => panic!("key not found: '{}'", key),
        }
    }
}

impl Index<&Key> for DotDict {
    type Output = Value;

    fn index(&self, key: &Key) -> &Value {
        match self.entries.get(key) {
            Some(v) => v,
            None => panic!("key not found: {}", key.repr()),
        }
    }
}
