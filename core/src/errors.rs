use std::fmt;
use std::path::PathBuf;

use crate::key::{CompoundKey, Key};

// ---------------------------------------------------------------------------
// Collection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// Subscript read or delete of an absent key.
    KeyNotFound(Key),
    /// Attribute read or delete of a name with no stored entry.
    AttributeNotFound(String),
    /// Attribute write with a name that is not an identifier.
    InvalidAttribute(String),
    /// Keyword export met a key that is not a string.
    NonStringKey(Key),
    /// A flat dict contained a compound key with no segments.
    EmptyCompoundKey,
    /// Unflattening or a dotted-path write would descend through a
    /// non-mapping value.
    PathConflict(CompoundKey),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::KeyNotFound(key) => {
                write!(f, "key not found: {}", key.repr())
            }
            CollectionError::AttributeNotFound(name) => {
                write!(f, "'DotDict' object has no attribute '{}'", name)
            }
            CollectionError::InvalidAttribute(name) => {
                write!(f, "'{}' is not a valid attribute name", name)
            }
            CollectionError::NonStringKey(key) => {
                write!(f, "keywords must be strings, got {}", key.repr())
            }
            CollectionError::EmptyCompoundKey => {
                write!(f, "compound key has no segments")
            }
            CollectionError::PathConflict(path) => {
                write!(f, "path {} passes through a non-mapping value", path)
            }
        }
    }
}

impl std::error::Error for CollectionError {}


// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// A config file could not be read.
    Io { path: PathBuf, error: std::io::Error },
    /// A config file could not be parsed.
    Parse { path: PathBuf, message: String },
    /// The parsed document is not a mapping at the top level.
    NotAMapping(PathBuf),
    /// Applying an override hit a container error.
    Collection(CollectionError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(f, "cannot read {}: {}", path.display(), error)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "cannot parse {}: {}", path.display(), message)
            }
            ConfigError::NotAMapping(path) => {
                write!(f, "{} does not contain a mapping", path.display())
            }
            ConfigError::Collection(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Collection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CollectionError> for ConfigError {
    fn from(e: CollectionError) -> Self {
        ConfigError::Collection(e)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_error_mentions_missing_name() {
        let e = CollectionError::AttributeNotFound("hello".into());
        assert!(e.to_string().contains("has no attribute 'hello'"));
    }

    #[test]
    fn key_error_quotes_string_keys() {
        let e = CollectionError::KeyNotFound(Key::from("nothing"));
        assert_eq!(e.to_string(), "key not found: 'nothing'");
    }

    #[test]
    fn config_error_wraps_collection_error() {
        let e: ConfigError = CollectionError::EmptyCompoundKey.into();
        assert!(matches!(e, ConfigError::Collection(CollectionError::EmptyCompoundKey)));
        assert!(std::error::Error::source(&e).is_some());
    }
}
