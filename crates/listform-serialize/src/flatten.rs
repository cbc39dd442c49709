//! Flattening entries into a path-keyed record
//!
//! Each entry at zero-based index `i` contributes keys
//! `<root>.<ordinal(i + 1)>.<fn>`. Object values (addresses) are descended
//! into up to the configured depth; scalars, `null` and arrays are leaves.

use indexmap::IndexMap;
use listform_model::{DataKey, Entry, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::ordinal::ordinal;

/// Flattening configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlattenOptions {
    /// Path separator
    pub separator: String,
    /// Maximum object nesting descended within a field value; `None` is unbounded
    pub depth: Option<usize>,
    /// Omit the ordinal segment (single-entry forms)
    pub omit_index_keys: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: ".".to_string(),
            depth: None,
            omit_index_keys: false,
        }
    }
}

impl FlattenOptions {
    /// Options matching a schema's display mode
    ///
    /// Page-mode schemas (`max = 1`) omit the ordinal segment.
    #[must_use]
    pub fn for_schema(schema: &Schema) -> Self {
        Self {
            omit_index_keys: schema.is_page(),
            ..Self::default()
        }
    }

    /// With path separator
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// With maximum nesting depth
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// With ordinal segments omitted or kept
    #[must_use]
    pub fn with_omit_index_keys(mut self, omit: bool) -> Self {
        self.omit_index_keys = omit;
        self
    }

    /// Join path segments with the separator
    pub(crate) fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// Flattened output: path → leaf value, in emission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedRecord(IndexMap<String, JsonValue>);

impl FlattenedRecord {
    /// Empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Value at a path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        self.0.get(path)
    }

    /// Set a path, returning the previous value
    pub fn insert(&mut self, path: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.0.insert(path.into(), value)
    }

    /// Append every path of another record
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Iterate paths in emission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of paths
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no path was emitted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object view
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Build from a JSON object
    ///
    /// Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        value
            .as_object()
            .map(|object| Self(object.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
    }
}

impl FromIterator<(String, JsonValue)> for FlattenedRecord {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FlattenedRecord {
    type Item = (String, JsonValue);
    type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Flatten entries under a root key
///
/// With `omit_index_keys`, every entry writes to `<root>.<fn>` and a later
/// entry overwrites an earlier one; it is meant for single-entry forms.
#[must_use]
pub fn flatten(entries: &[Entry], root: &DataKey, options: &FlattenOptions) -> FlattenedRecord {
    let mut record = FlattenedRecord::new();
    let root_path = root.join(&options.separator);

    for (index, entry) in entries.iter().enumerate() {
        let entry_path = if options.omit_index_keys {
            root_path.clone()
        } else {
            options.join(&[root_path.as_str(), ordinal(index + 1).as_str()])
        };

        for (key, value) in entry.iter() {
            let segments: Vec<&str> = key.split('.').collect();
            let field_path = options.join(&[entry_path.as_str(), options.join(&segments).as_str()]);
            flatten_value(&mut record, field_path, value.to_json(), options.depth, options);
        }
    }

    record
}

/// Flatten an arbitrary JSON value at a path
pub(crate) fn flatten_value(
    record: &mut FlattenedRecord,
    path: String,
    value: JsonValue,
    depth: Option<usize>,
    options: &FlattenOptions,
) {
    match value {
        JsonValue::Object(object) if depth != Some(0) && !object.is_empty() => {
            let next = depth.map(|d| d - 1);
            for (key, child) in object {
                let child_path = options.join(&[path.as_str(), key.as_str()]);
                flatten_value(record, child_path, child, next, options);
            }
        }
        leaf => {
            record.insert(path, leaf);
        }
    }
}

/// Structured sibling of the flattened record: an array of entry objects
#[must_use]
pub fn raw(entries: &[Entry]) -> JsonValue {
    JsonValue::Array(entries.iter().map(Entry::to_json).collect())
}

/// Nest a leaf under a path inside a JSON object, creating objects on the way
///
/// Returns `false` if a leaf already occupies part of the path.
pub(crate) fn insert_path(object: &mut JsonMap<String, JsonValue>, path: &[&str], value: JsonValue) -> bool {
    match path {
        [] => false,
        [last] => {
            object.insert((*last).to_string(), value);
            true
        }
        [head, rest @ ..] => {
            let slot = object
                .entry((*head).to_string())
                .or_insert_with(|| JsonValue::Object(JsonMap::new()));
            match slot {
                JsonValue::Object(child) => insert_path(child, rest, value),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listform_model::{Address, AddressInput, Field, NumberInput, ResponseValue, TextInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(max: Option<usize>) -> Schema {
        Schema::new(
            "Unit",
            vec![
                Field::text(TextInput::new("name".parse().unwrap(), "Name")),
                Field::number(NumberInput::new("count".parse().unwrap(), "Count")),
            ],
            0,
            max,
        )
        .unwrap()
    }

    fn entry(schema: &Schema, name: &str, count: f64) -> Entry {
        let mut entry = Entry::blank(schema);
        entry.set("name", ResponseValue::text(name));
        entry.set("count", ResponseValue::Number(count));
        entry
    }

    #[test]
    fn flatten_uses_ordinal_segments() {
        let schema = schema(None);
        let entries = vec![entry(&schema, "a", 2.0), entry(&schema, "b", 3.0)];
        let record = flatten(&entries, &"units".parse().unwrap(), &FlattenOptions::default());

        let expected: FlattenedRecord = [
            ("units.one.name".to_string(), json!("a")),
            ("units.one.count".to_string(), json!(2.0)),
            ("units.two.name".to_string(), json!("b")),
            ("units.two.count".to_string(), json!(3.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(record, expected);
    }

    #[test]
    fn flatten_blank_is_null() {
        let schema = schema(None);
        let record = flatten(&[Entry::blank(&schema)], &"units".parse().unwrap(), &FlattenOptions::default());
        assert_eq!(record.get("units.one.name"), Some(&JsonValue::Null));
    }

    #[test]
    fn flatten_empty_collection_is_empty() {
        let record = flatten(&[], &"units".parse().unwrap(), &FlattenOptions::default());
        assert!(record.is_empty());
    }

    #[test]
    fn page_mode_omits_ordinal() {
        let schema = schema(Some(1));
        let options = FlattenOptions::for_schema(&schema);
        assert!(options.omit_index_keys);

        let record = flatten(&[entry(&schema, "site", 1.0)], &"site".parse().unwrap(), &options);
        assert_eq!(record.get("site.name"), Some(&json!("site")));
        assert!(record.get("site.one.name").is_none());
    }

    #[test]
    fn nested_objects_are_descended() {
        let schema = Schema::new(
            "Contact",
            vec![Field::address(AddressInput::new("home".parse().unwrap(), "Home"))],
            0,
            None,
        )
        .unwrap();
        let mut e = Entry::blank(&schema);
        e.set(
            "home",
            ResponseValue::Address(Address {
                line1: "1 Mill Lane".into(),
                town: "Ely".into(),
                ..Address::default()
            }),
        );

        let record = flatten(&[e.clone()], &"contacts".parse().unwrap(), &FlattenOptions::default());
        assert_eq!(record.get("contacts.one.home.line1"), Some(&json!("1 Mill Lane")));
        assert_eq!(record.get("contacts.one.home.town"), Some(&json!("Ely")));
        assert_eq!(record.len(), 6);

        let shallow = flatten(&[e], &"contacts".parse().unwrap(), &FlattenOptions::default().with_depth(0));
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow.get("contacts.one.home").unwrap()["town"], json!("Ely"));
    }

    #[test]
    fn arrays_are_leaves_even_when_empty() {
        let mut record = FlattenedRecord::new();
        flatten_value(&mut record, "a".into(), json!({ "b": [], "c": [1, 2] }), None, &FlattenOptions::default());
        assert_eq!(record.get("a.b"), Some(&json!([])));
        assert_eq!(record.get("a.c"), Some(&json!([1, 2])));
    }

    #[test]
    fn custom_separator() {
        let schema = schema(None);
        let record = flatten(
            &[entry(&schema, "a", 1.0)],
            &"proposal.units".parse().unwrap(),
            &FlattenOptions::default().with_separator("/"),
        );
        assert!(record.get("proposal/units/one/name").is_some());
    }

    #[test]
    fn insert_path_creates_objects() {
        let mut object = JsonMap::new();
        assert!(insert_path(&mut object, &["home", "town"], json!("Ely")));
        assert!(!insert_path(&mut object, &["home", "town", "x"], json!(1)));
        assert_eq!(JsonValue::Object(object), json!({ "home": { "town": "Ely" } }));
    }

    #[test]
    fn raw_is_array_of_objects() {
        let schema = schema(None);
        assert_eq!(
            raw(&[entry(&schema, "a", 1.0)]),
            json!([{ "name": "a", "count": 1.0 }])
        );
    }
}
