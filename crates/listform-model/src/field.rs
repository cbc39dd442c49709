//! Field model
//!
//! A [`Field`] is one typed question within a schema. The variant decides the
//! response shape and which validation rule applies. The wire format is tagged
//! by `type`, with variant payload under `data`:
//!
//! ```json
//! { "type": "number", "required": true, "data": { "fn": "identicalUnits", "title": "Units" } }
//! ```

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::entry::{Address, Feature, ResponseValue};
use crate::error::ResponseError;
use crate::key::DataKey;

fn default_required() -> bool {
    true
}

/// Common envelope of every field variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec<T> {
    /// Whether a response is mandatory (default true)
    #[serde(default = "default_required")]
    pub required: bool,

    /// Variant-specific payload
    pub data: T,
}

impl<T> FieldSpec<T> {
    /// Required field with the given payload
    #[inline]
    #[must_use]
    pub fn required(data: T) -> Self {
        Self {
            required: true,
            data,
        }
    }
}

/// Closed set of field variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Field {
    /// Free text
    Text(FieldSpec<TextInput>),
    /// Numeric value
    Number(FieldSpec<NumberInput>),
    /// Single selection from options
    Question(FieldSpec<QuestionInput>),
    /// Multiple selection from options
    Checklist(FieldSpec<ChecklistInput>),
    /// Calendar date
    Date(FieldSpec<DateInput>),
    /// Geometry drawn on a map
    Map(FieldSpec<MapInput>),
    /// Postal address
    Address(FieldSpec<AddressInput>),
}

impl Field {
    /// Required text field
    #[must_use]
    pub fn text(input: TextInput) -> Self {
        Self::Text(FieldSpec::required(input))
    }

    /// Required number field
    #[must_use]
    pub fn number(input: NumberInput) -> Self {
        Self::Number(FieldSpec::required(input))
    }

    /// Required single-select field
    #[must_use]
    pub fn question(input: QuestionInput) -> Self {
        Self::Question(FieldSpec::required(input))
    }

    /// Required multi-select field
    #[must_use]
    pub fn checklist(input: ChecklistInput) -> Self {
        Self::Checklist(FieldSpec::required(input))
    }

    /// Required date field
    #[must_use]
    pub fn date(input: DateInput) -> Self {
        Self::Date(FieldSpec::required(input))
    }

    /// Required geometry field
    #[must_use]
    pub fn map(input: MapInput) -> Self {
        Self::Map(FieldSpec::required(input))
    }

    /// Required address field
    #[must_use]
    pub fn address(input: AddressInput) -> Self {
        Self::Address(FieldSpec::required(input))
    }

    /// Mark field as optional
    #[must_use]
    pub fn optional(mut self) -> Self {
        *self.required_mut() = false;
        self
    }

    fn required_mut(&mut self) -> &mut bool {
        match self {
            Self::Text(s) => &mut s.required,
            Self::Number(s) => &mut s.required,
            Self::Question(s) => &mut s.required,
            Self::Checklist(s) => &mut s.required,
            Self::Date(s) => &mut s.required,
            Self::Map(s) => &mut s.required,
            Self::Address(s) => &mut s.required,
        }
    }

    /// Data key (`fn`) of this field
    #[must_use]
    pub fn key(&self) -> &DataKey {
        match self {
            Self::Text(s) => &s.data.key,
            Self::Number(s) => &s.data.key,
            Self::Question(s) => &s.data.key,
            Self::Checklist(s) => &s.data.key,
            Self::Date(s) => &s.data.key,
            Self::Map(s) => &s.data.key,
            Self::Address(s) => &s.data.key,
        }
    }

    /// Question title shown to the user
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Text(s) => &s.data.title,
            Self::Number(s) => &s.data.title,
            Self::Question(s) => &s.data.title,
            Self::Checklist(s) => &s.data.title,
            Self::Date(s) => &s.data.title,
            Self::Map(s) => &s.data.title,
            Self::Address(s) => &s.data.title,
        }
    }

    /// Whether a response is mandatory
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::Text(s) => s.required,
            Self::Number(s) => s.required,
            Self::Question(s) => s.required,
            Self::Checklist(s) => s.required,
            Self::Date(s) => s.required,
            Self::Map(s) => s.required,
            Self::Address(s) => s.required,
        }
    }

    /// Variant discriminant
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Question(_) => FieldKind::Question,
            Self::Checklist(_) => FieldKind::Checklist,
            Self::Date(_) => FieldKind::Date,
            Self::Map(_) => FieldKind::Map,
            Self::Address(_) => FieldKind::Address,
        }
    }

    /// Options of a select field
    #[must_use]
    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            Self::Question(s) => Some(&s.data.options),
            Self::Checklist(s) => Some(&s.data.options),
            _ => None,
        }
    }

    /// Response value of a freshly added entry
    #[must_use]
    pub fn blank_value(&self) -> ResponseValue {
        match self {
            Self::Text(_) | Self::Number(_) | Self::Question(_) | Self::Date(_) => {
                ResponseValue::Blank
            }
            Self::Checklist(_) => ResponseValue::Selection(Vec::new()),
            Self::Map(_) => ResponseValue::Features(Vec::new()),
            Self::Address(_) => ResponseValue::Address(Address::default()),
        }
    }

    /// Decode a JSON response into the shape this field expects
    ///
    /// `null` always decodes to [`ResponseValue::Blank`]. Number fields keep
    /// raw strings so validation can report them as non-numeric.
    ///
    /// # Errors
    /// Returns [`ResponseError::Mismatch`] if the JSON shape does not fit the variant
    pub fn decode_response(&self, value: &JsonValue) -> Result<ResponseValue, ResponseError> {
        let mismatch = || ResponseError::Mismatch {
            key: self.key().to_string(),
            expected: self.kind(),
        };

        if value.is_null() {
            return Ok(ResponseValue::Blank);
        }

        match self {
            Self::Text(_) | Self::Question(_) | Self::Date(_) => value
                .as_str()
                .map(|s| ResponseValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            Self::Number(_) => match value {
                JsonValue::Number(n) => n.as_f64().map(ResponseValue::Number).ok_or_else(mismatch),
                JsonValue::String(s) if s.is_empty() => Ok(ResponseValue::Blank),
                JsonValue::String(s) => Ok(ResponseValue::Text(s.clone())),
                _ => Err(mismatch()),
            },
            Self::Checklist(_) => value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .map(ResponseValue::Selection)
                .ok_or_else(mismatch),
            Self::Map(_) => serde_json::from_value::<Vec<Feature>>(value.clone())
                .map(ResponseValue::Features)
                .map_err(|_| mismatch()),
            Self::Address(_) => serde_json::from_value::<Address>(value.clone())
                .map(ResponseValue::Address)
                .map_err(|_| mismatch()),
        }
    }
}

/// Field variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text field
    Text,
    /// Number field
    Number,
    /// Single-select field
    Question,
    /// Multi-select field
    Checklist,
    /// Date field
    Date,
    /// Geometry field
    Map,
    /// Address field
    Address,
}

impl FieldKind {
    /// Wire tag of the variant
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Question => "question",
            Self::Checklist => "checklist",
            Self::Date => "date",
            Self::Map => "map",
            Self::Address => "address",
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text input style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TextKind {
    /// Up to 120 characters
    #[default]
    Short,
    /// Up to 250 characters
    Long,
    /// Up to 750 characters
    ExtraLong,
    /// Email address
    Email,
    /// Telephone number
    Phone,
    /// Author-defined length limit
    Custom,
}

/// Text field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input style
    #[serde(rename = "type", default)]
    pub kind: TextKind,
    /// Character limit for [`TextKind::Custom`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_length: Option<usize>,
}

impl TextInput {
    /// Short text input
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            kind: TextKind::Short,
            custom_length: None,
        }
    }

    /// With input style
    #[must_use]
    pub fn with_kind(mut self, kind: TextKind) -> Self {
        self.kind = kind;
        self
    }

    /// With custom character limit
    #[must_use]
    pub fn with_custom_length(mut self, length: usize) -> Self {
        self.kind = TextKind::Custom;
        self.custom_length = Some(length);
        self
    }

    /// Maximum number of characters accepted
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        match self.kind {
            TextKind::Short => Some(120),
            TextKind::Long => Some(250),
            TextKind::ExtraLong => Some(750),
            TextKind::Custom => self.custom_length,
            TextKind::Email | TextKind::Phone => None,
        }
    }
}

/// Number field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NumberInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unit label, e.g. `m²`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Accept values below zero
    #[serde(default)]
    pub allow_negatives: bool,
}

impl NumberInput {
    /// Number input without units
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            units: None,
            allow_negatives: false,
        }
    }

    /// With unit label
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Accept negative values
    #[must_use]
    pub fn allowing_negatives(mut self) -> Self {
        self.allow_negatives = true;
        self
    }
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectOption {
    /// Stable option id
    pub id: String,
    /// Display text
    pub text: String,
    /// Recorded value; falls back to `text` when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

impl SelectOption {
    /// Option without a distinct recorded value
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            val: None,
        }
    }

    /// With recorded value
    #[must_use]
    pub fn with_val(mut self, val: impl Into<String>) -> Self {
        self.val = Some(val.into());
        self
    }

    /// Value recorded when this option is selected
    #[must_use]
    pub fn value(&self) -> &str {
        match self.val.as_deref() {
            Some(val) if !val.is_empty() => val,
            _ => &self.text,
        }
    }
}

/// Single-select field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered options
    pub options: Vec<SelectOption>,
}

impl QuestionInput {
    /// Single-select input with options
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            options,
        }
    }
}

/// Multi-select field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChecklistInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered options; responses hold selected option ids
    pub options: Vec<SelectOption>,
}

impl ChecklistInput {
    /// Multi-select input with options
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            options,
        }
    }
}

/// Date field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DateInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Earliest accepted date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<NaiveDate>,
    /// Latest accepted date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<NaiveDate>,
}

impl DateInput {
    /// Date input without range
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            min: None,
            max: None,
        }
    }

    /// With accepted range
    #[must_use]
    pub fn with_range(mut self, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Geometry draw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DrawType {
    /// Single coordinate
    Point,
    /// Closed ring
    Polygon,
}

impl DrawType {
    /// Lower-case noun used in messages
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Polygon => "polygon",
        }
    }
}

/// Map rendering and drawing hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    /// Basemap identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basemap: Option<String>,
    /// Draw mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_type: Option<DrawType>,
    /// Stroke colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_color: Option<String>,
    /// Allow more than one feature
    #[serde(default)]
    pub draw_many: bool,
}

/// Geometry field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Drawing hints
    #[serde(default)]
    pub map_options: MapOptions,
}

impl MapInput {
    /// Map input with given draw mode
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>, draw_type: DrawType) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
            map_options: MapOptions {
                draw_type: Some(draw_type),
                ..MapOptions::default()
            },
        }
    }
}

/// Address field payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AddressInput {
    /// Data key
    #[serde(rename = "fn")]
    pub key: DataKey,
    /// Question title
    pub title: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AddressInput {
    /// Address input
    #[must_use]
    pub fn new(key: DataKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            description: None,
        }
    }
}
