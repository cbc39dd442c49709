//! Rehydration errors

use listform_model::ResponseError;

/// Errors while rebuilding entries from prior output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RehydrateError {
    /// Raw data under the root key is not an array of entry objects
    #[error("expected an array of entries under '{0}'")]
    NotAnArray(String),

    /// Flattened input is not a JSON object
    #[error("flattened record must be a JSON object")]
    NotAnObject,

    /// Segment after the root key is not an ordinal
    #[error("invalid entry position in '{path}'")]
    InvalidPosition {
        /// Offending flattened path
        path: String,
    },

    /// Path names no field of the schema
    #[error("unknown field in '{path}'")]
    UnknownField {
        /// Offending flattened path
        path: String,
    },

    /// Path collides with a value already placed
    #[error("conflicting value at '{path}'")]
    Conflict {
        /// Offending flattened path
        path: String,
    },

    /// Positions are not contiguous from one
    #[error("missing entry at position {position}")]
    MissingEntry {
        /// First absent one-based position
        position: usize,
    },

    /// Entry values do not fit their fields
    #[error("entry {position}: {source}")]
    Response {
        /// One-based entry position
        position: usize,
        /// Field-level decoding failure
        #[source]
        source: ResponseError,
    },
}
