//! Error types for the data model
//!
//! Provides error handling for:
//! - Schema configuration faults (rejected at load time)
//! - Response values whose shape does not fit their field

use crate::field::FieldKind;
use crate::key::KeyError;

/// Schema configuration errors
///
/// These indicate a fault in the schema-authoring surface, not in user input.
/// A schema is never constructed while any of them holds.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// `max` is smaller than `min`
    #[error("max ({max}) must not be less than min ({min})")]
    MaxBelowMin { min: usize, max: usize },

    /// `max` of zero allows no entries at all
    #[error("max must be at least 1")]
    MaxZero,

    /// Two fields share a data key
    #[error("duplicate field key: '{0}'")]
    DuplicateField(String),

    /// Select field has no options
    #[error("field '{0}' has no options")]
    EmptyOptions(String),

    /// Two options of a select field record the same value
    #[error("field '{field}' has duplicate option value '{value}'")]
    DuplicateOption { field: String, value: String },

    /// Custom text field without a length
    #[error("field '{0}' uses a custom length but none is set")]
    MissingCustomLength(String),

    /// Date field with `min` after `max`
    #[error("field '{field}': min date {min} is after max date {max}")]
    InvalidDateRange {
        field: String,
        min: chrono::NaiveDate,
        max: chrono::NaiveDate,
    },

    /// Total designates an unusable field
    #[error("invalid total on '{field}': {reason}")]
    InvalidTotal { field: String, reason: String },

    /// Malformed data key
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Schema JSON could not be parsed (includes unknown field types)
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Schema YAML could not be parsed (includes unknown field types)
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Response decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// Value shape does not fit the field variant
    #[error("response for '{key}' does not fit a {expected} field")]
    Mismatch { key: String, expected: FieldKind },

    /// Entry is not a JSON object
    #[error("entry must be a JSON object")]
    NotAnObject,
}
