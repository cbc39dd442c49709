//! Field validation errors
//!
//! Every error carries the field key and a structured [`FieldErrorKind`], so
//! hosts can translate without string parsing. [`FieldErrorKind::message`]
//! gives the default user-facing wording.

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDate;
use indexmap::IndexMap;
use listform_model::{DrawType, FieldKind};
use serde::Serialize;

/// Displayed date format in range messages
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Reason a single field response was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldErrorKind {
    /// Required text or number left blank
    #[error("Enter your answer before continuing")]
    Required,

    /// Text longer than the input kind allows
    #[error("Your answer must be {max} characters or fewer")]
    TooLong { max: usize },

    /// Malformed email address
    #[error("Enter an email address in the correct format, like name@example.com")]
    InvalidEmail,

    /// Malformed telephone number
    #[error("Enter a telephone number, like 01632 960 001")]
    InvalidPhone,

    /// Number input that does not parse or is not finite
    #[error("Enter a number")]
    NotANumber,

    /// Negative number where only positive values are accepted
    #[error("Enter a positive number")]
    Negative,

    /// Required single-select left blank
    #[error("Select your answer before continuing")]
    NoSelection,

    /// Single-select value that matches no option
    #[error("Invalid selection")]
    InvalidOption { value: String },

    /// Required checklist with nothing selected
    #[error("Select at least one option")]
    NoneChecked,

    /// Checklist id that matches no option
    #[error("Invalid selection")]
    UnknownOption { id: String },

    /// Required date left blank, or not a calendar date
    #[error("Enter a valid date in DD.MM.YYYY format")]
    InvalidDate,

    /// Date without a day component
    #[error("Date must include a day")]
    MissingDay,

    /// Date without a month component
    #[error("Date must include a month")]
    MissingMonth,

    /// Date without a year component
    #[error("Date must include a year")]
    MissingYear,

    /// Day outside 1-31
    #[error("Day must be a real day")]
    InvalidDay,

    /// Month outside 1-12, or an unknown month name
    #[error("Month must be a real month")]
    InvalidMonth,

    /// Date before the field minimum
    #[error("Enter a date later than {}", .min.format(DISPLAY_DATE_FORMAT))]
    TooSoon { min: NaiveDate },

    /// Date after the field maximum
    #[error("Enter a date earlier than {}", .max.format(DISPLAY_DATE_FORMAT))]
    TooLate { max: NaiveDate },

    /// Required geometry with nothing drawn
    #[error("Draw at least one {} on the map", .draw.map_or("feature", DrawType::noun))]
    NoFeatures { draw: Option<DrawType> },

    /// Geometry that is not a GeoJSON feature
    #[error("Input must be valid GeoJSON")]
    InvalidGeoJson,

    /// Address without a first line
    #[error("Enter the first line of an address")]
    MissingAddressLine,

    /// Address without a town
    #[error("Enter a town")]
    MissingTown,

    /// Address without a postcode
    #[error("Enter a postcode")]
    MissingPostcode,

    /// Response shape does not fit the field variant
    #[error("Enter a valid {expected} answer")]
    Mismatch { expected: FieldKind },
}

impl FieldErrorKind {
    /// User-facing message
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check whether this error is a missing date component
    #[must_use]
    pub fn is_missing_component(&self) -> bool {
        matches!(
            self,
            Self::MissingDay | Self::MissingMonth | Self::MissingYear
        )
    }
}

/// Rejected response for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Data key of the field
    pub key: String,
    /// What is wrong
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Create error for a field key
    #[must_use]
    pub fn new(key: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.kind)
    }
}

impl std::error::Error for FieldError {}

/// All field errors of one entry, in field order
///
/// Holds at most one error per field: the first rule that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Empty error list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an error
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Error for a field key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.key == key)
    }

    /// Iterate errors in field order
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Number of failing fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no field failed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages keyed by field key
    #[must_use]
    pub fn messages(&self) -> IndexMap<String, String> {
        self.0
            .iter()
            .map(|e| (e.key.clone(), e.kind.message()))
            .collect()
    }

    /// `Ok` if empty, `Err(self)` otherwise
    ///
    /// # Errors
    /// Returns `self` when any field failed
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Serializable view: `{ "<fn>": "<message>" }`
impl Serialize for FieldErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages().serialize(serializer)
    }
}
