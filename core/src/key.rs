//! Mapping keys and compound path keys.
//!
//! A `Key` is anything a `Dict` or `DotDict` can be indexed by: strings,
//! integers, booleans, and `CompoundKey` paths produced by flattening.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};


/// A hashable mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Str(String),
    /// A full path through nested mappings, used by flat dicts.
    Compound(CompoundKey),
}

impl Key {
    /// The string payload, if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Key::Str(_))
    }

    pub fn as_compound(&self) -> Option<&CompoundKey> {
        match self {
            Key::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Quoted form used by container reprs: `'a'`, `1`, `true`, `('a', 1)`.
    pub fn repr(&self) -> String {
        match self {
            Key::Str(s) => format!("'{}'", s),
            Key::Int(i) => i.to_string(),
            Key::Bool(b) => b.to_string(),
            Key::Compound(c) => {
                let parts: Vec<String> = c.iter().map(|k| k.repr()).collect();
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{}", i),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Compound(c) => write!(f, "{}", c),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<CompoundKey> for Key {
    fn from(c: CompoundKey) -> Self {
        Key::Compound(c)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::Str(s) => serializer.serialize_str(s),
            // Structured encoders with string-only map keys reject this.
            Key::Compound(c) => {
                let mut seq = serializer.serialize_seq(Some(c.len()))?;
                for seg in c.iter() {
                    seq.serialize_element(seg)?;
                }
                seq.end()
            }
        }
    }
}


// ---------------------------------------------------------------------------
// CompoundKey
// ---------------------------------------------------------------------------

/// An ordered, immutable sequence of path segments used as a single key.
///
/// Two compound keys are equal (and hash equally) iff their segments are
/// equal element-wise, so `CompoundKey::new([2, 1])` built twice addresses
/// the same entry of a flat dict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompoundKey(Vec<Key>);

impl CompoundKey {
    /// Build a key from any sequence of segments.
    pub fn new<I, K>(segments: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        CompoundKey(segments.into_iter().map(Into::into).collect())
    }

    /// The empty path (root).
    pub fn root() -> Self {
        CompoundKey(Vec::new())
    }

    /// Parse `a.b.c` into string segments. An empty string is the root.
    pub fn from_dotted(path: &str) -> Self {
        if path.is_empty() {
            return CompoundKey::root();
        }
        CompoundKey::new(path.split('.'))
    }

    /// Join the segments with `.`.
    pub fn to_dotted(&self) -> String {
        self.0
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// A new key with `segment` appended; `self` is left untouched.
    pub fn child(&self, segment: impl Into<Key>) -> CompoundKey {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        CompoundKey(segments)
    }

    pub fn segments(&self) -> &[Key] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the final segment and the parent path.
    pub fn split_last(&self) -> Option<(&Key, &[Key])> {
        self.0.split_last()
    }
}

impl fmt::Display for CompoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Key::Compound(self.clone()).repr())
    }
}

impl<'a> IntoIterator for &'a CompoundKey {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Key>> for CompoundKey {
    fn from(segments: Vec<Key>) -> Self {
        CompoundKey(segments)
    }
}

impl FromIterator<Key> for CompoundKey {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        CompoundKey(iter.into_iter().collect())
    }
}
