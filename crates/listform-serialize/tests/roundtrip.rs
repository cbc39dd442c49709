//! Flatten / rehydrate round trips over the shared fixtures

use listform_model::{DataKey, Entry, Field, NumberInput, ResponseValue, Schema, TextInput};
use listform_serialize::{
    flatten, raw, rehydrate, rehydrate_flattened, rehydrate_raw, EngineConfig, FlattenOptions,
    SubmitOutput,
};
use listform_validate::Validator;
use listform_test_utils::{
    entries_strategy, key, residential_units_schema, site_entry, site_schema, unit_entry,
    zoo_entry, zoo_schema,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn two_units_sum_under_total_key() {
    let schema = residential_units_schema();
    let config = EngineConfig::new(key("units"));
    let entries = vec![unit_entry("newBuild", 2.0), unit_entry("conversion", 3.0)];

    let output = SubmitOutput::build(&schema, &entries, &config);
    assert_eq!(output.totals.get("units.total.units"), Some(&json!(5)));
    assert_eq!(
        output.totals.get("units.total.units.development.newBuild"),
        Some(&json!(2))
    );
    assert_eq!(
        output.totals.get("units.total.units.development.conversion"),
        Some(&json!(3))
    );
    assert!(output
        .totals
        .get("units.total.units.development.extension")
        .is_none());
}

#[test]
fn zoo_flatten_matches_expected_paths() {
    let entries = vec![zoo_entry("Richard Parker", 10.0), zoo_entry("Richard Parker II", 2.0)];
    let record = flatten(&entries, &key("animals"), &FlattenOptions::default());

    assert_eq!(record.get("animals.one.name"), Some(&json!("Richard Parker")));
    assert_eq!(record.get("animals.two.age"), Some(&json!(2.0)));
    assert_eq!(record.get("animals.one.food"), Some(&json!(["fish", "meat"])));
    assert_eq!(record.get("animals.one.email"), Some(&json!(null)));
    assert_eq!(record.len(), 14);
}

#[test]
fn site_page_output_has_no_ordinal() {
    let schema = site_schema();
    let config = EngineConfig::for_schema(&schema, key("site"));
    let output = SubmitOutput::build(&schema, &[site_entry()], &config);

    assert_eq!(output.flattened.get("site.address.town"), Some(&json!("Southwark")));
    assert!(output.flattened.get("site.boundary").unwrap().is_array());

    let data = output.to_data(&config);
    assert_eq!(rehydrate(&schema, &data, &config).unwrap(), vec![site_entry()]);
}

#[test]
fn many_entries_use_compound_ordinals() {
    let entries: Vec<Entry> = (0..34).map(|i| zoo_entry("a", f64::from(i))).collect();
    let record = flatten(&entries, &key("animals"), &FlattenOptions::default());
    assert_eq!(record.get("animals.thirtyfour.age"), Some(&json!(33.0)));
    assert_eq!(record.get("animals.twentyone.age"), Some(&json!(20.0)));
}

#[test]
fn blank_text_in_optional_number_survives_round_trip() {
    let schema = Schema::new(
        "Extension",
        vec![
            Field::text(TextInput::new(key("name"), "Name")),
            Field::number(NumberInput::new(key("floorArea"), "Floor area")).optional(),
        ],
        0,
        None,
    )
    .unwrap();
    let mut entry = Entry::blank(&schema);
    entry.set("name", ResponseValue::text("Rear"));
    entry.set("floorArea", ResponseValue::text(""));
    assert!(Validator::generate(&schema).validate(&entry).is_ok());

    let root = key("extensions");
    let options = FlattenOptions::default();
    let first = flatten(&[entry], &root, &options);
    assert_eq!(first.get("extensions.one.floorArea"), Some(&json!(null)));

    let restored = rehydrate_flattened(&schema, &first, &root, &options).unwrap();
    assert_eq!(flatten(&restored, &root, &options), first);

    let from_raw = rehydrate_raw(&schema, &raw(&restored)).unwrap();
    assert_eq!(flatten(&from_raw, &root, &options), first);
}

fn assert_idempotent(schema: &Schema, entries: &[Entry], root: &DataKey, options: &FlattenOptions) {
    let first = flatten(entries, root, options);
    let restored = rehydrate_flattened(schema, &first, root, options).unwrap();
    let second = flatten(&restored, root, options);
    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zoo_flatten_is_idempotent(entries in entries_strategy(&zoo_schema(), 12)) {
        assert_idempotent(&zoo_schema(), &entries, &key("animals"), &FlattenOptions::default());
    }

    #[test]
    fn units_flatten_is_idempotent(entries in entries_strategy(&residential_units_schema(), 8)) {
        assert_idempotent(
            &residential_units_schema(),
            &entries,
            &key("proposal.units"),
            &FlattenOptions::default(),
        );
    }

    #[test]
    fn site_flatten_is_idempotent(entries in entries_strategy(&site_schema(), 1)) {
        let schema = site_schema();
        assert_idempotent(&schema, &entries, &key("site"), &FlattenOptions::for_schema(&schema));
    }

    #[test]
    fn rehydrated_entries_equal_originals(entries in entries_strategy(&zoo_schema(), 6)) {
        let schema = zoo_schema();
        let root = key("animals");
        let options = FlattenOptions::default();
        let record = flatten(&entries, &root, &options);
        prop_assert_eq!(rehydrate_flattened(&schema, &record, &root, &options).unwrap(), entries);
    }
}
