//! Schema model
//!
//! A [`Schema`] is a named collection of fields plus entry-count bounds.
//! Schemas are configuration data: they load from JSON or YAML and are
//! checked for internal consistency before they exist, so every `Schema`
//! value in the program is a valid one.

use std::collections::HashSet;

use schemars::gen::SchemaGenerator;
use schemars::schema::{RootSchema, Schema as JsonSchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::{Field, FieldKind, TextKind};
use crate::key::DataKey;

/// Declarative description of one structured-entry type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct Schema {
    display_type: String,
    fields: Vec<Field>,
    min: usize,
    max: Option<usize>,
    totals: Vec<TotalSpec>,
}

/// Sum of a number field across entries, optionally grouped by a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalSpec {
    /// Number field to sum
    pub field: DataKey,
    /// Label used in output keys (defaults to the field key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Single-select field whose option values partition the sum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<DataKey>,
}

impl TotalSpec {
    /// Ungrouped total of a field
    #[must_use]
    pub fn new(field: DataKey) -> Self {
        Self {
            field,
            label: None,
            group_by: None,
        }
    }

    /// With output label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Grouped by a select field
    #[must_use]
    pub fn grouped_by(mut self, discriminant: DataKey) -> Self {
        self.group_by = Some(discriminant);
        self
    }

    /// Label used in output keys
    #[must_use]
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.field.to_string())
    }
}

/// Unvalidated wire form of [`Schema`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    /// Singular name of one entry, e.g. `Unit`
    pub display_type: String,
    /// Fields in display order
    pub fields: Vec<Field>,
    /// Fewest entries accepted on submit
    #[serde(default)]
    pub min: usize,
    /// Most entries allowed; absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    /// Totals computed on submit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub totals: Vec<TotalSpec>,
}

impl Schema {
    /// Create and validate a schema
    ///
    /// # Errors
    /// Returns the first configuration fault found
    pub fn new(
        display_type: impl Into<String>,
        fields: Vec<Field>,
        min: usize,
        max: Option<usize>,
    ) -> Result<Self, SchemaError> {
        Self::try_from(SchemaDef {
            display_type: display_type.into(),
            fields,
            min,
            max,
            totals: Vec::new(),
        })
    }

    /// With totals, revalidated
    ///
    /// # Errors
    /// Returns error if a total designates a missing or unsuitable field
    pub fn with_totals(self, totals: Vec<TotalSpec>) -> Result<Self, SchemaError> {
        let mut def = SchemaDef::from(self);
        def.totals = totals;
        Self::try_from(def)
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or the schema is inconsistent
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Self::try_from(def)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or the schema is inconsistent
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef = serde_yaml::from_str(yaml)?;
        Self::try_from(def)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails (rare for JSON)
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// JSON Schema describing the schema file format
    #[must_use]
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(SchemaDef)
    }

    /// Singular name of one entry
    #[inline]
    #[must_use]
    pub fn display_type(&self) -> &str {
        &self.display_type
    }

    /// Fields in display order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field by data key
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key().to_string() == key)
    }

    /// Fewest entries accepted on submit
    #[inline]
    #[must_use]
    pub fn min(&self) -> usize {
        self.min
    }

    /// Most entries allowed
    #[inline]
    #[must_use]
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Check whether `len` entries leave room for another
    #[inline]
    #[must_use]
    pub fn has_capacity_for(&self, len: usize) -> bool {
        self.max.map_or(true, |max| len < max)
    }

    /// Single structured-entry form (`max = 1`)
    ///
    /// Presentation hides add/remove affordances; entry logic is unchanged.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.max == Some(1)
    }

    /// Totals computed on submit
    #[inline]
    #[must_use]
    pub fn totals(&self) -> &[TotalSpec] {
        &self.totals
    }

    fn check_fields(fields: &[Field]) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in fields {
            let key = field.key().to_string();
            if !seen.insert(key.clone()) {
                return Err(SchemaError::DuplicateField(key));
            }

            match field {
                Field::Question(spec) => {
                    Self::check_options(&key, spec.data.options.iter().map(|o| o.value()))?;
                }
                Field::Checklist(spec) => {
                    Self::check_options(&key, spec.data.options.iter().map(|o| o.id.as_str()))?;
                }
                Field::Text(spec) => {
                    if spec.data.kind == TextKind::Custom && spec.data.custom_length.is_none() {
                        return Err(SchemaError::MissingCustomLength(key));
                    }
                }
                Field::Date(spec) => {
                    if let (Some(min), Some(max)) = (spec.data.min, spec.data.max) {
                        if min > max {
                            return Err(SchemaError::InvalidDateRange {
                                field: key,
                                min,
                                max,
                            });
                        }
                    }
                }
                Field::Number(_) | Field::Map(_) | Field::Address(_) => {}
            }
        }
        Ok(())
    }

    fn check_options<'a>(
        key: &str,
        values: impl Iterator<Item = &'a str>,
    ) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        let mut any = false;
        for value in values {
            any = true;
            if !seen.insert(value) {
                return Err(SchemaError::DuplicateOption {
                    field: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if any {
            Ok(())
        } else {
            Err(SchemaError::EmptyOptions(key.to_string()))
        }
    }

    fn check_totals(fields: &[Field], totals: &[TotalSpec]) -> Result<(), SchemaError> {
        let kind_of = |key: &DataKey| {
            fields
                .iter()
                .find(|f| f.key() == key)
                .map(Field::kind)
        };

        for total in totals {
            let invalid = |reason: &str| SchemaError::InvalidTotal {
                field: total.field.to_string(),
                reason: reason.to_string(),
            };

            match kind_of(&total.field) {
                Some(FieldKind::Number) => {}
                Some(_) => return Err(invalid("not a number field")),
                None => return Err(invalid("no such field")),
            }

            if let Some(group_by) = &total.group_by {
                match kind_of(group_by) {
                    Some(FieldKind::Question) => {}
                    Some(_) => return Err(invalid("group_by must be a question field")),
                    None => return Err(invalid("group_by field does not exist")),
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<SchemaDef> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        if let Some(max) = def.max {
            if max == 0 {
                return Err(SchemaError::MaxZero);
            }
            if max < def.min {
                return Err(SchemaError::MaxBelowMin { min: def.min, max });
            }
        }

        Self::check_fields(&def.fields)?;
        Self::check_totals(&def.fields, &def.totals)?;

        Ok(Self {
            display_type: def.display_type,
            fields: def.fields,
            min: def.min,
            max: def.max,
            totals: def.totals,
        })
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self {
        Self {
            display_type: schema.display_type,
            fields: schema.fields,
            min: schema.min,
            max: schema.max,
            totals: schema.totals,
        }
    }
}

impl JsonSchema for Schema {
    fn schema_name() -> String {
        "Schema".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> JsonSchemaObject {
        SchemaDef::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{DateInput, NumberInput, QuestionInput, SelectOption, TextInput};
    use chrono::NaiveDate;

    fn key(s: &str) -> DataKey {
        s.parse().unwrap()
    }

    fn units_fields() -> Vec<Field> {
        vec![
            Field::question(QuestionInput::new(
                key("development"),
                "Development type",
                vec![
                    SelectOption::new("1", "New build").with_val("newBuild"),
                    SelectOption::new("2", "Conversion").with_val("conversion"),
                ],
            )),
            Field::number(NumberInput::new(key("identicalUnits"), "Units")),
        ]
    }

    #[test]
    fn schema_accepts_valid_bounds() {
        let schema = Schema::new("Unit", units_fields(), 1, Some(10)).unwrap();
        assert_eq!(schema.min(), 1);
        assert_eq!(schema.max(), Some(10));
        assert!(!schema.is_page());
        assert!(schema.has_capacity_for(9));
        assert!(!schema.has_capacity_for(10));
    }

    #[test]
    fn schema_unbounded_always_has_capacity() {
        let schema = Schema::new("Unit", units_fields(), 0, None).unwrap();
        assert!(schema.has_capacity_for(10_000));
    }

    #[test]
    fn schema_rejects_max_below_min() {
        let result = Schema::new("Unit", units_fields(), 3, Some(2));
        assert!(matches!(result, Err(SchemaError::MaxBelowMin { min: 3, max: 2 })));
    }

    #[test]
    fn schema_rejects_max_zero() {
        let result = Schema::new("Unit", units_fields(), 0, Some(0));
        assert!(matches!(result, Err(SchemaError::MaxZero)));
    }

    #[test]
    fn schema_rejects_duplicate_keys() {
        let mut fields = units_fields();
        fields.push(Field::text(TextInput::new(key("identicalUnits"), "Again")));
        let result = Schema::new("Unit", fields, 0, None);
        assert!(matches!(result, Err(SchemaError::DuplicateField(k)) if k == "identicalUnits"));
    }

    #[test]
    fn schema_rejects_duplicate_option_values() {
        let fields = vec![Field::question(QuestionInput::new(
            key("size"),
            "Size",
            vec![SelectOption::new("1", "Small"), SelectOption::new("2", "Small")],
        ))];
        let result = Schema::new("Animal", fields, 0, None);
        assert!(matches!(result, Err(SchemaError::DuplicateOption { .. })));
    }

    #[test]
    fn schema_rejects_inverted_date_range() {
        let fields = vec![Field::date(DateInput::new(key("start"), "Start").with_range(
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        ))];
        let result = Schema::new("Phase", fields, 0, None);
        assert!(matches!(result, Err(SchemaError::InvalidDateRange { .. })));
    }

    #[test]
    fn schema_page_mode() {
        let schema = Schema::new("Site", units_fields(), 1, Some(1)).unwrap();
        assert!(schema.is_page());
    }

    #[test]
    fn totals_must_target_number_fields() {
        let schema = Schema::new("Unit", units_fields(), 0, None).unwrap();
        let result = schema.clone().with_totals(vec![TotalSpec::new(key("development"))]);
        assert!(matches!(result, Err(SchemaError::InvalidTotal { .. })));

        let grouped = schema
            .with_totals(vec![TotalSpec::new(key("identicalUnits"))
                .with_label("units")
                .grouped_by(key("development"))])
            .unwrap();
        assert_eq!(grouped.totals()[0].label(), "units");
    }

    #[test]
    fn schema_from_json_validates() {
        let json = r#"{
            "displayType": "Unit",
            "min": 2,
            "max": 1,
            "fields": []
        }"#;
        assert!(matches!(
            Schema::from_json(json),
            Err(SchemaError::MaxBelowMin { .. })
        ));
    }

    #[test]
    fn schema_from_json_rejects_unknown_field_type() {
        let json = r#"{
            "displayType": "Unit",
            "fields": [{ "type": "signature", "data": { "fn": "sig", "title": "Sign" } }]
        }"#;
        assert!(matches!(Schema::from_json(json), Err(SchemaError::InvalidJson(_))));
    }

    #[test]
    fn schema_yaml_roundtrip() {
        let yaml = r"
displayType: Unit
min: 1
max: 5
fields:
  - type: number
    data:
      fn: identicalUnits
      title: How many identical units?
";
        let schema = Schema::from_yaml(yaml).unwrap();
        assert_eq!(schema.display_type(), "Unit");
        assert_eq!(schema.fields().len(), 1);

        let again = Schema::from_yaml(&schema.to_yaml().unwrap()).unwrap();
        assert_eq!(again, schema);
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let result: Result<Schema, _> = serde_json::from_str(r#"{"displayType":"X","fields":[],"max":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn json_schema_names_fields() {
        let root = Schema::json_schema();
        let text = serde_json::to_string(&root).unwrap();
        assert!(text.contains("displayType"));
        assert!(text.contains("fields"));
    }
}
