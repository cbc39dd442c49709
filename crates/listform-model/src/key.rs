//! Data keys
//!
//! Provides [`DataKey`], the dotted path under which a field's response (or a
//! whole list of entries) is recorded for downstream rule evaluation.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema as JsonSchemaObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Dotted data key
///
/// Hierarchical key made of non-empty segments.
///
/// # Examples
/// - `["identicalUnits"]` → `identicalUnits`
/// - `["proposal", "units", "residential"]` → `proposal.units.residential`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataKey(Vec<String>);

impl DataKey {
    /// Create key from a single segment
    ///
    /// # Errors
    /// Returns error if the segment is empty or has invalid characters
    pub fn single(segment: impl Into<String>) -> Result<Self, KeyError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        Ok(Self(vec![segment]))
    }

    /// Get key segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if key has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new key
    ///
    /// # Errors
    /// Returns error if the segment is empty or has invalid characters
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, KeyError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// Check if this key's segments start the given segment list
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, segments: &[impl AsRef<str>]) -> bool {
        self.0.len() <= segments.len()
            && self
                .0
                .iter()
                .zip(segments)
                .all(|(a, b)| a.as_str() == b.as_ref())
    }

    /// Join segments with a custom separator
    #[inline]
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl Display for DataKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for DataKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(KeyError::Empty);
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| validate_segment(seg).map(|()| seg.to_string()))
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl TryFrom<String> for DataKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataKey> for String {
    fn from(key: DataKey) -> Self {
        key.to_string()
    }
}

impl JsonSchema for DataKey {
    fn schema_name() -> String {
        "DataKey".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> JsonSchemaObject {
        String::json_schema(gen)
    }
}

fn validate_segment(seg: &str) -> Result<(), KeyError> {
    if seg.is_empty() {
        Err(KeyError::EmptySegment)
    } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
        Err(KeyError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

/// Errors related to data keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key with no segments
    #[error("data key is empty")]
    Empty,

    /// Empty segment in key
    #[error("data key contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),
}
