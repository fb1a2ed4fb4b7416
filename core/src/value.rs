//! Dynamic nested values.
//!
//! `Value` is the element type stored in both mapping kinds. Mappings,
//! lists and tuples nest arbitrarily; everything else is a scalar leaf.

use std::fmt;

use serde::ser::{Error as _, Serialize, SerializeSeq, Serializer};

use crate::dotdict::DotDict;
use crate::errors::CollectionError;
use crate::key::Key;
use crate::mapping::{Dict, Entries, Mapping};


#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Dict),
    Dot(DotDict),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for either mapping kind.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::Dot(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dot(&self) -> Option<&DotDict> {
        match self {
            Value::Dot(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dot_mut(&mut self) -> Option<&mut DotDict> {
        match self {
            Value::Dot(d) => Some(d),
            _ => None,
        }
    }

    /// Entries of either mapping kind.
    pub fn entries(&self) -> Option<&Entries> {
        match self {
            Value::Dict(d) => Some(d.entries()),
            Value::Dot(d) => Some(d.entries()),
            _ => None,
        }
    }

    pub fn entries_mut(&mut self) -> Option<&mut Entries> {
        match self {
            Value::Dict(d) => Some(d.entries_mut()),
            Value::Dot(d) => Some(d.entries_mut()),
            _ => None,
        }
    }

    /// Element `index` of a list or tuple.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Attribute read through a `DotDict` value.
    ///
    /// Any other kind of value has no attributes.
    pub fn attr(&self, name: &str) -> Result<&Value, CollectionError> {
        match self {
            Value::Dot(d) => d.attr(name),
            _ => Err(CollectionError::AttributeNotFound(name.to_string())),
        }
    }

    pub fn attr_mut(&mut self, name: &str) -> Result<&mut Value, CollectionError> {
        match self {
            Value::Dot(d) => d.attr_mut(name),
            _ => Err(CollectionError::AttributeNotFound(name.to_string())),
        }
    }

    /// Convert into a `serde_json::Value`.
    ///
    /// Fails when a `DotDict` is still present anywhere in the tree, or
    /// when a mapping uses compound keys.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}


// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Structural equality. Mappings compare by entries regardless of kind and
/// order, so a `Dict` equals a `DotDict` holding the same pairs.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => match (self.entries(), other.entries()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq<Dict> for Value {
    fn eq(&self, other: &Dict) -> bool {
        self.entries() == Some(other.entries())
    }
}

impl PartialEq<DotDict> for Value {
    fn eq(&self, other: &DotDict) -> bool {
        self.entries() == Some(other.entries())
    }
}


// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Scalars render bare (strings unquoted), which is what string splicing
/// in config interpolation needs. Plain containers render as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the fraction on whole floats: `1.0`, not `1`.
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => f.write_str(s),
            Value::Dot(d) => write!(f, "{}", d),
            Value::List(_) | Value::Tuple(_) | Value::Dict(_) => match self.to_json() {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "{:?}", self),
            },
        }
    }
}


// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(d) => d.serialize(serializer),
            Value::Dot(d) => Err(S::Error::custom(format!(
                "{} is not serializable; convert it with to_dict() first",
                d
            ))),
        }
    }
}


// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl From<DotDict> for Value {
    fn from(d: DotDict) -> Self {
        Value::Dot(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (Key::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(yaml: serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::Str(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Value::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

/// YAML allows any node as a key; scalars map onto `Key` directly and
/// anything else is keyed by its YAML text.
fn yaml_key(key: serde_yaml::Value) -> Key {
    match key {
        serde_yaml::Value::String(s) => Key::Str(s),
        serde_yaml::Value::Bool(b) => Key::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Key::Int(i),
            None => Key::Str(n.to_string()),
        },
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Key::Str(
            serde_yaml::to_string(&other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        ),
    }
}
