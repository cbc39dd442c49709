//! Aggregation over entries
//!
//! Totals answer "how many units in all" and "how many units of each type"
//! without a second pass over the raw entries. Output keys are
//! `<root>.total.<label>` and `<root>.total.<label>.<discriminant>.<value>`.

use indexmap::IndexMap;
use listform_model::{DataKey, Entry, ResponseValue, Schema, TotalSpec};
use serde_json::{Number as JsonNumber, Value as JsonValue};

use crate::flatten::{FlattenOptions, FlattenedRecord};

/// Path segment under which totals are emitted
pub const TOTAL_SEGMENT: &str = "total";

/// Numeric value of a response, if it has one
///
/// Number fields may hold unparsed text; text that parses counts too.
fn numeric(value: &ResponseValue) -> Option<f64> {
    match value {
        ResponseValue::Number(n) if n.is_finite() => Some(*n),
        ResponseValue::Text(raw) => raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Sum a numeric field across all entries
///
/// Entries where the field is blank or non-numeric contribute nothing.
#[must_use]
pub fn sum_field(entries: &[Entry], field: &str) -> f64 {
    entries
        .iter()
        .filter_map(|entry| entry.get(field).and_then(numeric))
        .sum()
}

/// Sum a numeric field grouped by the value of a categorical field
///
/// Groups appear in `categories` order, followed by any other values in
/// first-seen order. Only non-zero groups are returned.
#[must_use]
pub fn sum_by_category(
    entries: &[Entry],
    field: &str,
    discriminant: &str,
    categories: &[&str],
) -> IndexMap<String, f64> {
    let mut sums: IndexMap<String, f64> = categories
        .iter()
        .map(|c| ((*c).to_string(), 0.0))
        .collect();

    for entry in entries {
        let Some(amount) = entry.get(field).and_then(numeric) else {
            continue;
        };
        let Some(ResponseValue::Text(category)) = entry.get(discriminant) else {
            continue;
        };
        *sums.entry(category.clone()).or_insert(0.0) += amount;
    }

    sums.retain(|_, sum| *sum != 0.0);
    sums
}

/// JSON number for a total; integral sums are written without a fraction
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub fn total_json(sum: f64) -> JsonValue {
    if sum.fract() == 0.0 && sum.abs() < 9.0e15 {
        JsonValue::from(sum as i64)
    } else {
        JsonNumber::from_f64(sum).map_or(JsonValue::Null, JsonValue::Number)
    }
}

/// Totals declared by a schema
#[derive(Debug, Clone, Copy)]
pub struct Totals<'a> {
    schema: &'a Schema,
}

impl<'a> Totals<'a> {
    /// Totals for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Compute every declared total under a root key
    ///
    /// Each total emits its overall sum, then one key per non-zero group when
    /// grouped. Group categories come from the discriminant's option values.
    #[must_use]
    pub fn compute(&self, entries: &[Entry], root: &DataKey, options: &FlattenOptions) -> FlattenedRecord {
        let mut record = FlattenedRecord::new();
        let root_path = root.join(&options.separator);

        for spec in self.schema.totals() {
            let field = spec.field.to_string();
            let label = spec.label();
            let base = options.join(&[root_path.as_str(), TOTAL_SEGMENT, label.as_str()]);

            record.insert(base.clone(), total_json(sum_field(entries, &field)));

            if let Some(group_by) = &spec.group_by {
                let discriminant = group_by.to_string();
                let categories = self.categories(spec);
                let categories: Vec<&str> = categories.iter().map(String::as_str).collect();

                for (category, sum) in sum_by_category(entries, &field, &discriminant, &categories) {
                    let key = options.join(&[
                        base.as_str(),
                        discriminant.as_str(),
                        category.as_str(),
                    ]);
                    record.insert(key, total_json(sum));
                }
            }
        }

        record
    }

    fn categories(&self, spec: &TotalSpec) -> Vec<String> {
        spec.group_by
            .as_ref()
            .and_then(|key| self.schema.field(&key.to_string()))
            .and_then(|field| field.options())
            .map(|options| options.iter().map(|o| o.value().to_string()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listform_model::{Field, NumberInput, QuestionInput, SelectOption};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key(s: &str) -> DataKey {
        s.parse().unwrap()
    }

    fn schema() -> Schema {
        Schema::new(
            "Unit",
            vec![
                Field::question(QuestionInput::new(
                    key("development"),
                    "Development",
                    vec![
                        SelectOption::new("1", "New build").with_val("newBuild"),
                        SelectOption::new("2", "Conversion").with_val("conversion"),
                        SelectOption::new("3", "Loss").with_val("loss"),
                    ],
                )),
                Field::number(NumberInput::new(key("count"), "Count")),
            ],
            0,
            None,
        )
        .unwrap()
    }

    fn unit(schema: &Schema, development: &str, count: ResponseValue) -> Entry {
        let mut entry = Entry::blank(schema);
        entry.set("development", ResponseValue::text(development));
        entry.set("count", count);
        entry
    }

    #[test]
    fn sum_field_skips_blank_and_text() {
        let schema = schema();
        let entries = vec![
            unit(&schema, "newBuild", ResponseValue::Number(2.0)),
            unit(&schema, "newBuild", ResponseValue::Blank),
            unit(&schema, "loss", ResponseValue::text("3")),
            unit(&schema, "loss", ResponseValue::text("many")),
        ];
        assert!((sum_field(&entries, "count") - 5.0).abs() < f64::EPSILON);
        assert!(sum_field(&[], "count").abs() < f64::EPSILON);
    }

    #[test]
    fn sum_by_category_keeps_option_order_and_drops_zero() {
        let schema = schema();
        let entries = vec![
            unit(&schema, "loss", ResponseValue::Number(1.0)),
            unit(&schema, "newBuild", ResponseValue::Number(4.0)),
            unit(&schema, "newBuild", ResponseValue::Number(2.0)),
        ];
        let sums = sum_by_category(&entries, "count", "development", &["newBuild", "conversion", "loss"]);
        let keys: Vec<&str> = sums.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["newBuild", "loss"]);
        assert_eq!(sums["newBuild"], 6.0);
    }

    #[test]
    fn schema_totals_emit_overall_and_groups() {
        let schema = schema()
            .with_totals(vec![TotalSpec::new(key("count"))
                .with_label("units")
                .grouped_by(key("development"))])
            .unwrap();
        let entries = vec![
            unit(&schema, "newBuild", ResponseValue::Number(2.0)),
            unit(&schema, "conversion", ResponseValue::Number(3.0)),
        ];

        let record = Totals::new(&schema).compute(&entries, &key("units"), &FlattenOptions::default());
        let expected: FlattenedRecord = [
            ("units.total.units".to_string(), json!(5)),
            ("units.total.units.development.newBuild".to_string(), json!(2)),
            ("units.total.units.development.conversion".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(record, expected);
    }

    #[test]
    fn total_json_keeps_fractions() {
        assert_eq!(total_json(5.0), json!(5));
        assert_eq!(total_json(2.5), json!(2.5));
    }
}
