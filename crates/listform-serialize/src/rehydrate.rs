//! Rebuilding entries from prior output
//!
//! The engine accepts its own output as a starting collection: either the raw
//! array of entry objects, or the flattened record. Flattened paths are
//! matched against the schema's field keys (longest first), so dotted field
//! keys and nested address parts both resolve.

use std::collections::BTreeMap;

use listform_model::{DataKey, Entry, Schema};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::error::RehydrateError;
use crate::flatten::{insert_path, FlattenOptions, FlattenedRecord};
use crate::ordinal::parse_ordinal;
use crate::output::EngineConfig;
use crate::totals::TOTAL_SEGMENT;

/// Rebuild entries from the raw array representation
///
/// # Errors
/// Returns error if `raw` is not an array or an entry does not fit the schema
pub fn rehydrate_raw(schema: &Schema, raw: &JsonValue) -> Result<Vec<Entry>, RehydrateError> {
    let items = raw
        .as_array()
        .ok_or_else(|| RehydrateError::NotAnArray(schema.display_type().to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Entry::from_json(schema, item).map_err(|source| RehydrateError::Response {
                position: index + 1,
                source,
            })
        })
        .collect()
}

/// Rebuild entries from a flattened record
///
/// Paths outside `root`, and totals under it, are ignored.
///
/// # Errors
/// Returns error if a path under `root` has no valid position or field, or
/// positions are not contiguous from one
pub fn rehydrate_flattened(
    schema: &Schema,
    record: &FlattenedRecord,
    root: &DataKey,
    options: &FlattenOptions,
) -> Result<Vec<Entry>, RehydrateError> {
    let separator = options.separator.as_str();
    let prefix = format!("{}{separator}", root.join(separator));

    let mut fields: Vec<(Vec<String>, String)> = schema
        .fields()
        .iter()
        .map(|field| {
            let key = field.key();
            (key.segments().to_vec(), key.to_string())
        })
        .collect();
    fields.sort_by_key(|(segments, _)| std::cmp::Reverse(segments.len()));

    let mut objects: BTreeMap<usize, JsonMap<String, JsonValue>> = BTreeMap::new();

    for (path, value) in record.iter() {
        let Some(rest) = path.strip_prefix(&prefix) else {
            debug!(path, "skipping path outside root");
            continue;
        };
        let segments: Vec<&str> = rest.split(separator).collect();

        let (position, field_segments) = if options.omit_index_keys {
            (1, segments.as_slice())
        } else {
            let Some((first, tail)) = segments.split_first() else {
                continue;
            };
            if *first == TOTAL_SEGMENT {
                debug!(path, "skipping total");
                continue;
            }
            let position = parse_ordinal(first)
                .filter(|n| *n > 0)
                .ok_or_else(|| RehydrateError::InvalidPosition { path: path.to_string() })?;
            (position, tail)
        };

        let matched = fields.iter().find(|(key_segments, _)| {
            key_segments.len() <= field_segments.len()
                && key_segments
                    .iter()
                    .zip(field_segments)
                    .all(|(a, b)| a.as_str() == *b)
        });

        let Some((key_segments, key)) = matched else {
            if options.omit_index_keys && field_segments.first() == Some(&TOTAL_SEGMENT) {
                debug!(path, "skipping total");
                continue;
            }
            return Err(RehydrateError::UnknownField { path: path.to_string() });
        };

        let mut nested = vec![key.as_str()];
        nested.extend_from_slice(&field_segments[key_segments.len()..]);

        let object = objects.entry(position).or_default();
        if !insert_path(object, &nested, value.clone()) {
            return Err(RehydrateError::Conflict { path: path.to_string() });
        }
    }

    let mut entries = Vec::with_capacity(objects.len());
    for (expected, (position, object)) in (1..).zip(objects) {
        if position != expected {
            return Err(RehydrateError::MissingEntry { position: expected });
        }
        let entry = Entry::from_json(schema, &JsonValue::Object(object))
            .map_err(|source| RehydrateError::Response { position, source })?;
        entries.push(entry);
    }

    debug!(count = entries.len(), root = %root, "rehydrated flattened record");
    Ok(entries)
}

/// Rebuild entries from previously submitted data
///
/// `data` is an object of prior output. When it holds the raw array under the
/// root key that is used; otherwise the object is read as a flattened record.
///
/// # Errors
/// Returns error if `data` is not an object or cannot be rebuilt
pub fn rehydrate(
    schema: &Schema,
    data: &JsonValue,
    config: &EngineConfig,
) -> Result<Vec<Entry>, RehydrateError> {
    let object = data.as_object().ok_or(RehydrateError::NotAnObject)?;
    let root_path = config.root_key.join(&config.flatten.separator);

    if let Some(raw) = object.get(&root_path) {
        if raw.is_array() {
            debug!(root = %root_path, "rehydrating from raw entries");
            return rehydrate_raw(schema, raw);
        }
    }

    let record = FlattenedRecord::from_json(data).ok_or(RehydrateError::NotAnObject)?;
    rehydrate_flattened(schema, &record, &config.root_key, &config.flatten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{flatten, raw};
    use listform_model::{Address, AddressInput, Field, NumberInput, ResponseValue, TextInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(max: Option<usize>) -> Schema {
        Schema::new(
            "Unit",
            vec![
                Field::text(TextInput::new("name".parse().unwrap(), "Name")),
                Field::number(NumberInput::new("floor.area".parse().unwrap(), "Area")),
                Field::address(AddressInput::new("address".parse().unwrap(), "Address")),
            ],
            0,
            max,
        )
        .unwrap()
    }

    fn filled(schema: &Schema, name: &str) -> Entry {
        let mut entry = Entry::blank(schema);
        entry.set("name", ResponseValue::text(name));
        entry.set("floor.area", ResponseValue::Number(42.5));
        entry.set(
            "address",
            ResponseValue::Address(Address {
                line1: "2 Mill Lane".into(),
                town: "Ely".into(),
                postcode: "CB7 4AA".into(),
                ..Address::default()
            }),
        );
        entry
    }

    #[test]
    fn flattened_roundtrip_restores_entries() {
        let schema = schema(None);
        let entries = vec![filled(&schema, "a"), Entry::blank(&schema), filled(&schema, "c")];
        let root: DataKey = "units".parse().unwrap();
        let options = FlattenOptions::default();

        let record = flatten(&entries, &root, &options);
        let restored = rehydrate_flattened(&schema, &record, &root, &options).unwrap();
        assert_eq!(restored, entries);
    }

    #[test]
    fn page_mode_roundtrip() {
        let schema = schema(Some(1));
        let entries = vec![filled(&schema, "site")];
        let root: DataKey = "site".parse().unwrap();
        let options = FlattenOptions::for_schema(&schema);

        let record = flatten(&entries, &root, &options);
        assert!(record.get("site.name").is_some());
        let restored = rehydrate_flattened(&schema, &record, &root, &options).unwrap();
        assert_eq!(restored, entries);
    }

    #[test]
    fn foreign_paths_and_totals_are_ignored() {
        let schema = schema(None);
        let root: DataKey = "units".parse().unwrap();
        let mut record = flatten(&[filled(&schema, "a")], &root, &FlattenOptions::default());
        record.insert("units.total.area", json!(42.5));
        record.insert("property.type", json!("house"));

        let restored =
            rehydrate_flattened(&schema, &record, &root, &FlattenOptions::default()).unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn invalid_position_is_rejected() {
        let schema = schema(None);
        let record: FlattenedRecord = [("units.1.name".to_string(), json!("a"))].into_iter().collect();
        assert!(matches!(
            rehydrate_flattened(&schema, &record, &"units".parse().unwrap(), &FlattenOptions::default()),
            Err(RehydrateError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let schema = schema(None);
        let record: FlattenedRecord = [("units.one.colour".to_string(), json!("red"))].into_iter().collect();
        assert!(matches!(
            rehydrate_flattened(&schema, &record, &"units".parse().unwrap(), &FlattenOptions::default()),
            Err(RehydrateError::UnknownField { .. })
        ));
    }

    #[test]
    fn gaps_are_rejected() {
        let schema = schema(None);
        let record: FlattenedRecord = [("units.two.name".to_string(), json!("b"))].into_iter().collect();
        assert_eq!(
            rehydrate_flattened(&schema, &record, &"units".parse().unwrap(), &FlattenOptions::default()),
            Err(RehydrateError::MissingEntry { position: 1 })
        );
    }

    #[test]
    fn rehydrate_prefers_raw_array() {
        let schema = schema(None);
        let entries = vec![filled(&schema, "a")];
        let config = EngineConfig::new("units".parse().unwrap());
        let data = json!({ "units": raw(&entries), "units.one.name": "ignored" });

        assert_eq!(rehydrate(&schema, &data, &config).unwrap(), entries);
    }

    #[test]
    fn rehydrate_raw_rejects_wrong_shapes() {
        let schema = schema(None);
        assert!(matches!(
            rehydrate_raw(&schema, &json!({})),
            Err(RehydrateError::NotAnArray(_))
        ));
        assert!(matches!(
            rehydrate_raw(&schema, &json!([{ "name": 7 }])),
            Err(RehydrateError::Response { position: 1, .. })
        ));
    }
}
