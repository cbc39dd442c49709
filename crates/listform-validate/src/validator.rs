//! Validator generator
//!
//! [`Validator::generate`] is a pure function of the schema: it compiles one
//! [`FieldRule`] per field, in field order. Schemas are immutable, so a
//! generated validator can be kept and reused for every entry of the schema.

use listform_model::{Entry, ResponseValue, Schema};

use crate::error::{FieldError, FieldErrors};
use crate::rule::FieldRule;

/// Per-field validator map for one schema
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    rules: Vec<FieldRule>,
}

impl Validator {
    /// Compile rules for every field of a schema
    #[must_use]
    pub fn generate(schema: &Schema) -> Self {
        Self {
            rules: schema.fields().iter().map(FieldRule::for_field).collect(),
        }
    }

    /// Validate a whole entry
    ///
    /// Fields missing from the entry are treated as blank.
    ///
    /// # Errors
    /// Returns every failing field, one error each, in field order
    pub fn validate(&self, entry: &Entry) -> Result<(), FieldErrors> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let value = entry.get(rule.key()).unwrap_or(&ResponseValue::Blank);
                rule.apply(value).err()
            })
            .collect::<FieldErrors>()
            .into_result()
    }

    /// Validate a single field response
    ///
    /// Unknown keys pass, since no rule constrains them.
    ///
    /// # Errors
    /// Returns the field's first failing check
    pub fn validate_field(&self, key: &str, value: &ResponseValue) -> Result<(), FieldError> {
        self.rule(key).map_or(Ok(()), |rule| rule.apply(value))
    }

    /// Rule for a field key
    #[must_use]
    pub fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.key() == key)
    }

    /// Rules in field order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}

impl From<&Schema> for Validator {
    fn from(schema: &Schema) -> Self {
        Self::generate(schema)
    }
}
