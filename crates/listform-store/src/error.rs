//! Store errors and the error set surfaced to the presentation layer
//!
//! Every variant is recoverable: the store state is left as it was, and the
//! caller resolves the error by saving, cancelling or adding entries.

use indexmap::IndexMap;
use listform_serialize::RehydrateError;
use listform_validate::FieldErrors;
use serde::Serialize;

/// Recoverable store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// Another entry is open
    #[error("Please save all responses before adding another")]
    UnsavedEntry {
        /// Index of the open entry
        active: usize,
    },

    /// Submit attempted while an entry is open
    #[error("Please save in order to continue")]
    UnsavedOnSubmit {
        /// Index of the open entry
        active: usize,
    },

    /// Collection is at capacity
    #[error("You can provide at most {max} response(s)")]
    MaxReached {
        /// Schema maximum
        max: usize,
    },

    /// Too many entries to submit
    #[error("You can provide at most {max} response(s)")]
    TooManyEntries {
        /// Schema maximum
        max: usize,
        /// Current entry count
        len: usize,
    },

    /// Too few entries to submit
    #[error("You must provide at least {min} response(s)")]
    TooFewEntries {
        /// Schema minimum
        min: usize,
        /// Current entry count
        len: usize,
    },

    /// Open entry failed validation
    #[error("entry has invalid responses: {0}")]
    InvalidEntry(FieldErrors),

    /// A saved entry failed validation on submit
    #[error("entry {position} has invalid responses: {errors}")]
    InvalidEntries {
        /// One-based position of the failing entry
        position: usize,
        /// Its field errors
        errors: FieldErrors,
    },

    /// Operation needs an open entry
    #[error("no entry is open for editing")]
    NotEditing,

    /// Index outside the collection
    #[error("entry index {index} out of range (len {len})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Current entry count
        len: usize,
    },

    /// Key names no field of the schema
    #[error("unknown field: '{0}'")]
    UnknownField(String),

    /// Prior data could not be rebuilt
    #[error("cannot restore entries: {0}")]
    Rehydrate(#[from] RehydrateError),
}

/// Error flags and field messages for the current state
///
/// Reset on every store operation, then set from that operation's outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSet {
    /// Add attempted while an entry is open
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub add_item: bool,
    /// Submit attempted while an entry is open
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unsaved_item: bool,
    /// Fewer entries than the schema minimum
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub min: bool,
    /// Capacity reached or exceeded
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub max: bool,
    /// Messages for the open entry, keyed by field
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub field_errors: IndexMap<String, String>,
}

impl ErrorSet {
    /// Check if nothing is flagged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.add_item && !self.unsaved_item && !self.min && !self.max && self.field_errors.is_empty()
    }

    /// Error set describing one store error
    #[must_use]
    pub fn from_error(error: &EntryError) -> Self {
        let mut set = Self::default();
        match error {
            EntryError::UnsavedEntry { .. } => set.add_item = true,
            EntryError::UnsavedOnSubmit { .. } => set.unsaved_item = true,
            EntryError::MaxReached { .. } | EntryError::TooManyEntries { .. } => set.max = true,
            EntryError::TooFewEntries { .. } => set.min = true,
            EntryError::InvalidEntry(errors) | EntryError::InvalidEntries { errors, .. } => {
                set.field_errors = errors.messages();
            }
            EntryError::NotEditing
            | EntryError::OutOfRange { .. }
            | EntryError::UnknownField(_)
            | EntryError::Rehydrate(_) => {}
        }
        set
    }
}
