//! Submit output
//!
//! On submit the engine produces the flattened record, the raw entry array
//! and any schema-declared totals. [`SubmitOutput::to_data`] merges them into
//! a single object keyed the way downstream rule evaluation reads it.

use listform_model::{DataKey, Entry, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::flatten::{flatten, raw, FlattenOptions, FlattenedRecord};
use crate::totals::Totals;

/// Serialization settings for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Key under which the collection is recorded
    pub root_key: DataKey,
    /// Flattening options
    #[serde(default)]
    pub flatten: FlattenOptions,
}

impl EngineConfig {
    /// Config with default flattening
    #[must_use]
    pub fn new(root_key: DataKey) -> Self {
        Self {
            root_key,
            flatten: FlattenOptions::default(),
        }
    }

    /// Config with flattening matched to the schema's display mode
    #[must_use]
    pub fn for_schema(schema: &Schema, root_key: DataKey) -> Self {
        Self {
            root_key,
            flatten: FlattenOptions::for_schema(schema),
        }
    }

    /// With flattening options
    #[must_use]
    pub fn with_flatten(mut self, flatten: FlattenOptions) -> Self {
        self.flatten = flatten;
        self
    }
}

/// Everything produced on submit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutput {
    /// Path-keyed scalar record
    pub flattened: FlattenedRecord,
    /// Array of entry objects
    pub raw: JsonValue,
    /// Schema-declared totals
    pub totals: FlattenedRecord,
}

impl SubmitOutput {
    /// Serialize a collection
    #[must_use]
    pub fn build(schema: &Schema, entries: &[Entry], config: &EngineConfig) -> Self {
        let flattened = flatten(entries, &config.root_key, &config.flatten);
        let totals = Totals::new(schema).compute(entries, &config.root_key, &config.flatten);
        debug!(
            entries = entries.len(),
            paths = flattened.len(),
            totals = totals.len(),
            "serialized collection"
        );
        Self {
            flattened,
            raw: raw(entries),
            totals,
        }
    }

    /// Merged data object: raw array under the root key, then flattened paths, then totals
    #[must_use]
    pub fn to_data(&self, config: &EngineConfig) -> JsonValue {
        let mut data = JsonMap::new();
        data.insert(
            config.root_key.join(&config.flatten.separator),
            self.raw.clone(),
        );
        for (path, value) in self.flattened.iter().chain(self.totals.iter()) {
            data.insert(path.to_string(), value.clone());
        }
        JsonValue::Object(data)
    }
}
