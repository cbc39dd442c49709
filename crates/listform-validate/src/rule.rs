//! Per-variant validation rules
//!
//! A [`FieldRule`] is compiled once from a [`Field`] and then applied to any
//! number of responses. Blank responses short-circuit before the variant
//! checks run, so optional fields accept absence while still rejecting bad
//! values.

use chrono::NaiveDate;
use listform_model::{Address, DrawType, Feature, Field, FieldKind, ResponseValue, TextKind};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::check_date;
use crate::error::{FieldError, FieldErrorKind};

static EMAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,18}[0-9]$").ok());

/// Format restriction on text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// `local@domain.tld`
    Email,
    /// Digits with optional `+`, spaces, brackets and dashes
    Phone,
}

impl TextFormat {
    fn accepts(self, text: &str) -> bool {
        let pattern = match self {
            Self::Email => &*EMAIL,
            Self::Phone => &*PHONE,
        };
        pattern.as_ref().map_or(true, |re| re.is_match(text))
    }

    fn error(self) -> FieldErrorKind {
        match self {
            Self::Email => FieldErrorKind::InvalidEmail,
            Self::Phone => FieldErrorKind::InvalidPhone,
        }
    }
}

/// Variant-specific check
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Free text
    Text {
        /// Character limit
        max_length: Option<usize>,
        /// Required format
        format: Option<TextFormat>,
    },
    /// Numeric input
    Number {
        /// Whether values below zero are accepted
        allow_negatives: bool,
    },
    /// Single selection
    Question {
        /// Accepted option values
        values: Vec<String>,
    },
    /// Multiple selection
    Checklist {
        /// Accepted option ids
        ids: Vec<String>,
    },
    /// `YYYY-MM-DD` date
    Date {
        /// Earliest accepted date
        min: Option<NaiveDate>,
        /// Latest accepted date
        max: Option<NaiveDate>,
    },
    /// Drawn geometry
    Map {
        /// Geometry kind named in the missing-feature message
        draw: Option<DrawType>,
    },
    /// Postal address
    Address,
}

/// Compiled rule for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    key: String,
    required: bool,
    check: Check,
}

impl FieldRule {
    /// Compile the rule for a field
    #[must_use]
    pub fn for_field(field: &Field) -> Self {
        let check = match field {
            Field::Text(spec) => Check::Text {
                max_length: spec.data.max_length(),
                format: match spec.data.kind {
                    TextKind::Email => Some(TextFormat::Email),
                    TextKind::Phone => Some(TextFormat::Phone),
                    TextKind::Short | TextKind::Long | TextKind::ExtraLong | TextKind::Custom => {
                        None
                    }
                },
            },
            Field::Number(spec) => Check::Number {
                allow_negatives: spec.data.allow_negatives,
            },
            Field::Question(spec) => Check::Question {
                values: spec
                    .data
                    .options
                    .iter()
                    .map(|opt| opt.value().to_string())
                    .collect(),
            },
            Field::Checklist(spec) => Check::Checklist {
                ids: spec.data.options.iter().map(|opt| opt.id.clone()).collect(),
            },
            Field::Date(spec) => Check::Date {
                min: spec.data.min,
                max: spec.data.max,
            },
            Field::Map(spec) => Check::Map {
                draw: spec.data.map_options.draw_type,
            },
            Field::Address(_) => Check::Address,
        };

        Self {
            key: field.key().to_string(),
            required: field.is_required(),
            check,
        }
    }

    /// Data key of the field
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a response is mandatory
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Variant-specific check
    #[inline]
    #[must_use]
    pub fn check(&self) -> &Check {
        &self.check
    }

    /// Apply the rule to a response
    ///
    /// # Errors
    /// Returns the first failing check as a [`FieldError`]
    pub fn apply(&self, value: &ResponseValue) -> Result<(), FieldError> {
        self.kind_of_failure(value)
            .map_or(Ok(()), |kind| Err(FieldError::new(self.key.clone(), kind)))
    }

    fn kind_of_failure(&self, value: &ResponseValue) -> Option<FieldErrorKind> {
        if value.is_blank() {
            return self.required.then(|| self.missing());
        }

        match (&self.check, value) {
            (Check::Text { max_length, format }, ResponseValue::Text(text)) => {
                Self::check_text(text, *max_length, *format)
            }
            (Check::Number { allow_negatives }, ResponseValue::Number(n)) => {
                Self::check_number(*n, *allow_negatives)
            }
            (Check::Number { allow_negatives }, ResponseValue::Text(raw)) => {
                match raw.trim().parse::<f64>() {
                    Ok(n) => Self::check_number(n, *allow_negatives),
                    Err(_) => Some(FieldErrorKind::NotANumber),
                }
            }
            (Check::Question { values }, ResponseValue::Text(value)) => {
                (!values.iter().any(|v| v == value)).then(|| FieldErrorKind::InvalidOption {
                    value: value.clone(),
                })
            }
            (Check::Checklist { ids }, ResponseValue::Selection(selected)) => selected
                .iter()
                .find(|id| !ids.contains(id))
                .map(|id| FieldErrorKind::UnknownOption { id: id.clone() }),
            (Check::Date { min, max }, ResponseValue::Text(date)) => {
                check_date(date.trim(), *min, *max).err()
            }
            (Check::Map { .. }, ResponseValue::Features(features)) => {
                (!features.iter().all(Feature::is_feature)).then_some(FieldErrorKind::InvalidGeoJson)
            }
            (Check::Address, ResponseValue::Address(address)) => Self::check_address(address),
            _ => Some(FieldErrorKind::Mismatch {
                expected: self.expected_kind(),
            }),
        }
    }

    fn missing(&self) -> FieldErrorKind {
        match &self.check {
            Check::Text { .. } | Check::Number { .. } => FieldErrorKind::Required,
            Check::Question { .. } => FieldErrorKind::NoSelection,
            Check::Checklist { .. } => FieldErrorKind::NoneChecked,
            Check::Date { .. } => FieldErrorKind::InvalidDate,
            Check::Map { draw } => FieldErrorKind::NoFeatures { draw: *draw },
            Check::Address => FieldErrorKind::MissingAddressLine,
        }
    }

    fn expected_kind(&self) -> FieldKind {
        match &self.check {
            Check::Text { .. } => FieldKind::Text,
            Check::Number { .. } => FieldKind::Number,
            Check::Question { .. } => FieldKind::Question,
            Check::Checklist { .. } => FieldKind::Checklist,
            Check::Date { .. } => FieldKind::Date,
            Check::Map { .. } => FieldKind::Map,
            Check::Address => FieldKind::Address,
        }
    }

    fn check_text(
        text: &str,
        max_length: Option<usize>,
        format: Option<TextFormat>,
    ) -> Option<FieldErrorKind> {
        if let Some(max) = max_length {
            if text.chars().count() > max {
                return Some(FieldErrorKind::TooLong { max });
            }
        }
        format
            .filter(|f| !f.accepts(text.trim()))
            .map(TextFormat::error)
    }

    fn check_number(n: f64, allow_negatives: bool) -> Option<FieldErrorKind> {
        if !n.is_finite() {
            Some(FieldErrorKind::NotANumber)
        } else if n < 0.0 && !allow_negatives {
            Some(FieldErrorKind::Negative)
        } else {
            None
        }
    }

    fn check_address(address: &Address) -> Option<FieldErrorKind> {
        if address.line1.trim().is_empty() {
            Some(FieldErrorKind::MissingAddressLine)
        } else if address.town.trim().is_empty() {
            Some(FieldErrorKind::MissingTown)
        } else if address.postcode.trim().is_empty() {
            Some(FieldErrorKind::MissingPostcode)
        } else {
            None
        }
    }
}
