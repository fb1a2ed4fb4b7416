//! Dotmap core: dictionaries with attribute access, recursive conversion
//! between mapping kinds, recursive merging, and flatten/unflatten.
//!
//! Two mapping kinds share the `Mapping` trait:
//!
//! - `Dict`: a plain insertion-ordered mapping that serializes with serde.
//! - `DotDict`: the same storage with attribute-style accessors.
//!
//! Values nest through `Value`. The `config` module builds layered
//! configuration loading on top of these helpers.

pub mod config;
pub mod dotdict;
pub mod errors;
pub mod flat;
pub mod key;
pub mod mapping;
pub mod merge;
pub mod nested;
pub mod value;

pub use config::{
    load_configuration, set_temporary_config, string_to_type, ConfigLoader, TemporaryConfig,
};
pub use dotdict::{is_identifier, DotDict};
pub use errors::{CollectionError, ConfigError};
pub use flat::{dict_to_flatdict, flatdict_to_dict, flatdict_to_dict_with};
pub use key::{CompoundKey, Key};
pub use mapping::{Dict, Entries, Mapping};
pub use merge::merge_dicts;
pub use nested::{as_nested_dict, as_nested_dict_with};
pub use value::Value;
