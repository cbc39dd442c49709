//! Entries and response values
//!
//! An [`Entry`] maps every field key of a schema to a [`ResponseValue`] whose
//! shape depends on the field variant.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use crate::error::ResponseError;
use crate::schema::Schema;

/// Response to a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// No answer yet
    Blank,
    /// Text, date string, selected option value, or unparsed number input
    Text(String),
    /// Parsed number
    Number(f64),
    /// Selected checklist option ids
    Selection(Vec<String>),
    /// Drawn geometry
    Features(Vec<Feature>),
    /// Postal address
    Address(Address),
}

impl ResponseValue {
    /// Text response
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Selection response
    #[must_use]
    pub fn selection<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Selection(ids.into_iter().map(Into::into).collect())
    }

    /// Check if the response carries no answer
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
            Self::Selection(ids) => ids.is_empty(),
            Self::Features(features) => features.is_empty(),
            Self::Address(address) => address.is_empty(),
        }
    }

    /// Blank text collapsed to [`ResponseValue::Blank`]
    ///
    /// Entries only ever hold the normalised form, so an empty string and a
    /// missing answer serialize the same way.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) if s.trim().is_empty() => Self::Blank,
            other => other,
        }
    }

    /// JSON representation used in serialized output
    ///
    /// Non-finite numbers have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Blank => JsonValue::Null,
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Number(n) => JsonNumber::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Self::Selection(ids) => {
                JsonValue::Array(ids.iter().cloned().map(JsonValue::String).collect())
            }
            Self::Features(features) => JsonValue::Array(
                features
                    .iter()
                    .map(Feature::to_json)
                    .collect(),
            ),
            Self::Address(address) => address.to_json(),
        }
    }
}

/// GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// GeoJSON object type, `Feature` when well formed
    #[serde(rename = "type")]
    pub kind: String,
    /// Geometry object
    #[serde(default)]
    pub geometry: JsonValue,
    /// Arbitrary feature properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<JsonMap<String, JsonValue>>,
    /// Other top-level members such as `id` or `bbox`
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl Feature {
    /// Point feature at longitude/latitude
    #[must_use]
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: serde_json::json!({
                "type": "Point",
                "coordinates": [longitude, latitude],
            }),
            properties: None,
            extra: JsonMap::new(),
        }
    }

    /// Polygon feature from a single closed ring
    #[must_use]
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: serde_json::json!({
                "type": "Polygon",
                "coordinates": [ring],
            }),
            properties: None,
            extra: JsonMap::new(),
        }
    }

    /// Check the object declares itself a GeoJSON feature
    #[inline]
    #[must_use]
    pub fn is_feature(&self) -> bool {
        self.kind == "Feature"
    }

    fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::new();
        map.insert("type".into(), JsonValue::String(self.kind.clone()));
        map.insert("geometry".into(), self.geometry.clone());
        if let Some(properties) = &self.properties {
            map.insert("properties".into(), JsonValue::Object(properties.clone()));
        }
        for (name, value) in &self.extra {
            map.entry(name.clone()).or_insert_with(|| value.clone());
        }
        JsonValue::Object(map)
    }
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// First line
    pub line1: String,
    /// Second line
    pub line2: String,
    /// Town or city
    pub town: String,
    /// County
    pub county: String,
    /// Postcode
    pub postcode: String,
    /// Country
    pub country: String,
}

impl Address {
    /// Check if no part is filled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts().iter().all(|part| part.trim().is_empty())
    }

    /// Non-empty parts joined for display
    #[must_use]
    pub fn joined(&self, separator: &str) -> String {
        self.parts()
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn parts(&self) -> [&str; 6] {
        [
            &self.line1,
            &self.line2,
            &self.town,
            &self.county,
            &self.postcode,
            &self.country,
        ]
    }

    fn to_json(&self) -> JsonValue {
        let mut map = JsonMap::new();
        for (name, part) in [
            ("line1", &self.line1),
            ("line2", &self.line2),
            ("town", &self.town),
            ("county", &self.county),
            ("postcode", &self.postcode),
            ("country", &self.country),
        ] {
            map.insert(name.into(), JsonValue::String(part.clone()));
        }
        JsonValue::Object(map)
    }
}

/// One user-filled instance of a schema's fields
///
/// Keys follow the schema's field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Entry {
    values: IndexMap<String, ResponseValue>,
}

impl Entry {
    /// Blank entry with every field of the schema
    #[must_use]
    pub fn blank(schema: &Schema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| (field.key().to_string(), field.blank_value()))
            .collect();
        Self { values }
    }

    /// Decode an entry from a JSON object, field by field
    ///
    /// Fields missing from the object are left blank; keys not in the schema are ignored.
    ///
    /// # Errors
    /// Returns error if `value` is not an object or a response has the wrong shape
    pub fn from_json(schema: &Schema, value: &JsonValue) -> Result<Self, ResponseError> {
        let object = value.as_object().ok_or(ResponseError::NotAnObject)?;
        let mut entry = Self::blank(schema);
        for field in schema.fields() {
            let key = field.key().to_string();
            if let Some(raw) = object.get(&key) {
                let decoded = field.decode_response(raw)?;
                entry.values.insert(key, decoded.normalized());
            }
        }
        Ok(entry)
    }

    /// Response for a field key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        self.values.get(key)
    }

    /// Replace the response for a field key
    ///
    /// Returns the previous response, or `None` if the key is not part of the entry.
    /// Whitespace-only text is stored as [`ResponseValue::Blank`].
    pub fn set(&mut self, key: &str, value: ResponseValue) -> Option<ResponseValue> {
        self.values
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, value.normalized()))
    }

    /// Iterate responses in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if entry has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if no field has been answered
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.values.values().all(ResponseValue::is_blank)
    }

    /// JSON object representation
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ChecklistInput, Field, NumberInput, SelectOption, TextInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "Animal",
            vec![
                Field::text(TextInput::new("name".parse().unwrap(), "Name")),
                Field::number(NumberInput::new("age".parse().unwrap(), "Age")),
                Field::checklist(ChecklistInput::new(
                    "food".parse().unwrap(),
                    "Food",
                    vec![SelectOption::new("fish", "Fish"), SelectOption::new("meat", "Meat")],
                )),
            ],
            1,
            None,
        )
        .unwrap()
    }

    #[test]
    fn blank_entry_has_every_field() {
        let entry = Entry::blank(&schema());
        assert_eq!(entry.len(), 3);
        assert!(entry.is_blank());
        assert_eq!(entry.get("food"), Some(&ResponseValue::Selection(vec![])));
    }

    #[test]
    fn set_only_known_keys() {
        let mut entry = Entry::blank(&schema());
        assert_eq!(
            entry.set("name", ResponseValue::text("Rex")),
            Some(ResponseValue::Blank)
        );
        assert_eq!(entry.set("colour", ResponseValue::text("red")), None);
        assert!(!entry.is_blank());
    }

    #[test]
    fn to_json_preserves_shapes() {
        let mut entry = Entry::blank(&schema());
        entry.set("name", ResponseValue::text("Rex"));
        entry.set("age", ResponseValue::Number(4.0));
        entry.set("food", ResponseValue::selection(["fish"]));

        assert_eq!(
            entry.to_json(),
            json!({ "name": "Rex", "age": 4.0, "food": ["fish"] })
        );
    }

    #[test]
    fn from_json_fills_missing_with_blank() {
        let entry = Entry::from_json(&schema(), &json!({ "name": "Rex", "extra": 1 })).unwrap();
        assert_eq!(entry.get("name"), Some(&ResponseValue::text("Rex")));
        assert_eq!(entry.get("age"), Some(&ResponseValue::Blank));
        assert!(entry.get("extra").is_none());
    }

    #[test]
    fn from_json_rejects_non_object() {
        assert!(matches!(
            Entry::from_json(&schema(), &json!([1, 2])),
            Err(ResponseError::NotAnObject)
        ));
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(ResponseValue::text("   ").is_blank());
        assert!(!ResponseValue::Number(0.0).is_blank());
    }

    #[test]
    fn blank_text_is_stored_as_blank() {
        let mut entry = Entry::blank(&schema());
        entry.set("age", ResponseValue::text(""));
        entry.set("name", ResponseValue::text("  "));
        assert_eq!(entry.get("age"), Some(&ResponseValue::Blank));
        assert_eq!(entry.get("name"), Some(&ResponseValue::Blank));
        assert_eq!(entry.to_json()["age"], JsonValue::Null);

        let decoded = Entry::from_json(&schema(), &json!({ "name": "", "age": " 3 " })).unwrap();
        assert_eq!(decoded.get("name"), Some(&ResponseValue::Blank));
        assert_eq!(decoded.get("age"), Some(&ResponseValue::text(" 3 ")));
    }

    #[test]
    fn feature_keeps_extra_members() {
        let raw = json!({
            "type": "Feature",
            "id": "plot-7",
            "bbox": [0.0, 0.0, 1.0, 1.0],
            "geometry": { "type": "Point", "coordinates": [0.5, 0.5] },
        });
        let feature: Feature = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(feature.extra.get("id"), Some(&json!("plot-7")));
        assert_eq!(feature.to_json(), raw);
        assert!(Feature::point(0.0, 0.0).extra.is_empty());
    }

    #[test]
    fn address_joined_skips_empty_parts() {
        let address = Address {
            line1: "1 High Street".into(),
            town: "Lewes".into(),
            postcode: "BN7 1AA".into(),
            ..Address::default()
        };
        assert_eq!(address.joined(", "), "1 High Street, Lewes, BN7 1AA");
        assert!(Address::default().is_empty());
    }

    #[test]
    fn feature_constructors_are_well_formed() {
        assert!(Feature::point(-0.1, 51.5).is_feature());
        let polygon = Feature::polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]);
        assert_eq!(polygon.geometry["type"], "Polygon");
    }
}
