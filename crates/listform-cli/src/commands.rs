//! Subcommand implementations
//!
//! Each command returns the JSON document to print so it can be tested
//! without capturing stdout.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use listform_model::{DataKey, Entry, Schema};
use listform_serialize::{rehydrate, rehydrate_raw, EngineConfig, SubmitOutput};
use listform_validate::Validator;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

/// Load a schema, choosing the format by file extension
///
/// # Errors
/// Returns error if the file cannot be read or the schema is invalid
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read schema {}", path.display()))?;
    let schema = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Schema::from_yaml(&text),
        _ => Schema::from_json(&text),
    }
    .with_context(|| format!("invalid schema {}", path.display()))?;

    debug!(path = %path.display(), display_type = schema.display_type(), "loaded schema");
    Ok(schema)
}

/// Load a JSON document
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_json(path: &Path) -> Result<JsonValue> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn load_entries(schema: &Schema, path: &Path) -> Result<Vec<Entry>> {
    let raw = load_json(path)?;
    rehydrate_raw(schema, &raw).with_context(|| format!("invalid entries in {}", path.display()))
}

fn engine_config(schema: &Schema, root_key: &str) -> Result<EngineConfig> {
    let root: DataKey = root_key
        .parse()
        .with_context(|| format!("invalid root key '{root_key}'"))?;
    Ok(EngineConfig::for_schema(schema, root))
}

/// Summary of a schema that loaded cleanly
///
/// # Errors
/// Returns error if the schema cannot be loaded
pub fn check(schema_path: &Path) -> Result<JsonValue> {
    let schema = load_schema(schema_path)?;
    Ok(json!({
        "displayType": schema.display_type(),
        "fields": schema.fields().iter().map(|f| json!({
            "key": f.key().to_string(),
            "type": f.kind().to_string(),
            "required": f.is_required(),
        })).collect::<Vec<_>>(),
        "min": schema.min(),
        "max": schema.max(),
        "totals": schema.totals().len(),
    }))
}

/// Validation report over a file of entries
///
/// The first element is `true` when every entry is valid.
///
/// # Errors
/// Returns error if the schema or entries cannot be loaded
pub fn validate(schema_path: &Path, entries_path: &Path) -> Result<(bool, JsonValue)> {
    let schema = load_schema(schema_path)?;
    let entries = load_entries(&schema, entries_path)?;
    let validator = Validator::generate(&schema);

    let mut valid = true;
    let mut report = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let errors = match validator.validate(entry) {
            Ok(()) => JsonValue::Object(serde_json::Map::new()),
            Err(errors) => {
                valid = false;
                serde_json::to_value(&errors)?
            }
        };
        report.push(json!({ "position": index + 1, "errors": errors }));
    }

    let len = entries.len();
    if len < schema.min() {
        valid = false;
    }
    if schema.max().is_some_and(|max| len > max) {
        valid = false;
    }

    info!(entries = len, valid, "validated entries");
    Ok((valid, json!({ "valid": valid, "count": len, "entries": report })))
}

/// Flattened record, raw entries and totals merged into one object
///
/// # Errors
/// Returns error if the inputs cannot be loaded or the root key is invalid
pub fn flatten(schema_path: &Path, entries_path: &Path, root_key: &str) -> Result<JsonValue> {
    let schema = load_schema(schema_path)?;
    let entries = load_entries(&schema, entries_path)?;
    let config = engine_config(&schema, root_key)?;

    let output = SubmitOutput::build(&schema, &entries, &config);
    Ok(output.to_data(&config))
}

/// Entries rebuilt from previous output
///
/// # Errors
/// Returns error if the inputs cannot be loaded or the record is malformed
pub fn rehydrate_record(schema_path: &Path, record_path: &Path, root_key: &str) -> Result<JsonValue> {
    let schema = load_schema(schema_path)?;
    let data = load_json(record_path)?;
    if !data.is_object() {
        bail!("{} must contain a JSON object", record_path.display());
    }
    let config = engine_config(&schema, root_key)?;

    let entries = rehydrate(&schema, &data, &config)?;
    Ok(JsonValue::Array(entries.iter().map(Entry::to_json).collect()))
}

/// JSON Schema describing the schema file format
///
/// # Errors
/// Returns error if the schema cannot be serialized
pub fn json_schema() -> Result<JsonValue> {
    Ok(serde_json::to_value(Schema::json_schema())?)
}
