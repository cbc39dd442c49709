//! Testing utilities for listform workspace
//!
//! Shared schemas, filled entries and proptest strategies.

#![allow(missing_docs)]

use listform_model::{
    Address, AddressInput, ChecklistInput, DataKey, DateInput, DrawType, Entry, Feature, Field,
    MapInput, NumberInput, QuestionInput, ResponseValue, Schema, SelectOption, TextInput,
    TextKind, TotalSpec,
};
use proptest::prelude::*;

pub fn key(s: &str) -> DataKey {
    s.parse().unwrap()
}

/// Animals in a zoo: one of every common field variant, `min = 1`, `max = 10`
pub fn zoo_schema() -> Schema {
    Schema::new(
        "Animal",
        vec![
            Field::text(TextInput::new(key("name"), "What's their name?")),
            Field::text(
                TextInput::new(key("email"), "Keeper email").with_kind(TextKind::Email),
            )
            .optional(),
            Field::number(NumberInput::new(key("age"), "How old are they?").with_units("years")),
            Field::question(QuestionInput::new(
                key("size"),
                "What size are they?",
                vec![
                    SelectOption::new("small", "Small").with_val("small"),
                    SelectOption::new("medium", "Medium").with_val("medium"),
                    SelectOption::new("large", "Large").with_val("large"),
                ],
            )),
            Field::question(QuestionInput::new(
                key("cuteness"),
                "How cute are they?",
                vec![SelectOption::new("1", "Very"), SelectOption::new("2", "Super")],
            ))
            .optional(),
            Field::checklist(ChecklistInput::new(
                key("food"),
                "What do they eat?",
                vec![
                    SelectOption::new("fish", "Fish"),
                    SelectOption::new("meat", "Meat"),
                    SelectOption::new("leaves", "Leaves"),
                ],
            )),
            Field::date(DateInput::new(key("birthday"), "When is their birthday?")).optional(),
        ],
        1,
        Some(10),
    )
    .unwrap()
}

/// Filled, valid zoo entry
pub fn zoo_entry(name: &str, age: f64) -> Entry {
    let schema = zoo_schema();
    let mut entry = Entry::blank(&schema);
    entry.set("name", ResponseValue::text(name));
    entry.set("age", ResponseValue::Number(age));
    entry.set("size", ResponseValue::text("medium"));
    entry.set("food", ResponseValue::selection(["fish", "meat"]));
    entry.set("birthday", ResponseValue::text("2019-07-14"));
    entry
}

/// Residential units with totals by development type
pub fn residential_units_schema() -> Schema {
    Schema::new(
        "Unit",
        vec![
            Field::question(QuestionInput::new(
                key("development"),
                "What development does this unit result from?",
                vec![
                    SelectOption::new("1", "New build").with_val("newBuild"),
                    SelectOption::new("2", "Change of use").with_val("changeOfUse"),
                    SelectOption::new("3", "Conversion").with_val("conversion"),
                    SelectOption::new("4", "Extension").with_val("extension"),
                ],
            )),
            Field::question(QuestionInput::new(
                key("tenure"),
                "What best describes the tenure of this unit?",
                vec![
                    SelectOption::new("1", "Market housing").with_val("marketHousing"),
                    SelectOption::new("2", "Social rent").with_val("socialRent"),
                ],
            )),
            Field::number(NumberInput::new(key("bedrooms"), "How many bedrooms?")),
            Field::number(NumberInput::new(
                key("identicalUnits"),
                "How many identical units?",
            )),
        ],
        1,
        None,
    )
    .and_then(|schema| {
        schema.with_totals(vec![TotalSpec::new(key("identicalUnits"))
            .with_label("units")
            .grouped_by(key("development"))])
    })
    .unwrap()
}

/// Filled residential unit
pub fn unit_entry(development: &str, units: f64) -> Entry {
    let schema = residential_units_schema();
    let mut entry = Entry::blank(&schema);
    entry.set("development", ResponseValue::text(development));
    entry.set("tenure", ResponseValue::text("marketHousing"));
    entry.set("bedrooms", ResponseValue::Number(2.0));
    entry.set("identicalUnits", ResponseValue::Number(units));
    entry
}

/// Single-page site details: address and drawn boundary, `max = 1`
pub fn site_schema() -> Schema {
    Schema::new(
        "Site",
        vec![
            Field::address(AddressInput::new(key("address"), "Site address")),
            Field::map(MapInput::new(key("boundary"), "Draw the site boundary", DrawType::Polygon)),
            Field::text(TextInput::new(key("notes"), "Notes").with_kind(TextKind::ExtraLong))
                .optional(),
        ],
        1,
        Some(1),
    )
    .unwrap()
}

/// Filled site entry
pub fn site_entry() -> Entry {
    let schema = site_schema();
    let mut entry = Entry::blank(&schema);
    entry.set(
        "address",
        ResponseValue::Address(Address {
            line1: "49 Cobbett Street".into(),
            town: "Southwark".into(),
            postcode: "SE1 1AA".into(),
            country: "United Kingdom".into(),
            ..Address::default()
        }),
    );
    entry.set(
        "boundary",
        ResponseValue::Features(vec![Feature::polygon(vec![
            [-0.10, 51.50],
            [-0.09, 51.50],
            [-0.09, 51.51],
            [-0.10, 51.50],
        ])]),
    );
    entry
}

fn text_value() -> impl Strategy<Value = ResponseValue> {
    prop_oneof![
        Just(ResponseValue::Blank),
        "[a-zA-Z0-9 ]{0,24}".prop_map(ResponseValue::Text),
    ]
}

fn number_value() -> impl Strategy<Value = ResponseValue> {
    prop_oneof![
        Just(ResponseValue::Blank),
        (0u32..10_000).prop_map(|n| ResponseValue::Number(f64::from(n))),
        (-1000i32..1000).prop_map(|n| ResponseValue::Number(f64::from(n) / 4.0)),
        prop::sample::select(vec!["", "  ", " 3 ", "abc", "12.5"]).prop_map(ResponseValue::text),
    ]
}

fn option_value(values: Vec<String>) -> BoxedStrategy<ResponseValue> {
    if values.is_empty() {
        return Just(ResponseValue::Blank).boxed();
    }
    prop_oneof![
        Just(ResponseValue::Blank),
        proptest::sample::select(values).prop_map(ResponseValue::Text),
    ]
    .boxed()
}

fn selection_value(ids: Vec<String>) -> BoxedStrategy<ResponseValue> {
    proptest::sample::subsequence(ids.clone(), 0..=ids.len())
        .prop_map(ResponseValue::Selection)
        .boxed()
}

fn date_value() -> impl Strategy<Value = ResponseValue> {
    prop_oneof![
        Just(ResponseValue::Blank),
        (1900u32..2100, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| ResponseValue::text(format!("{y}-{m:02}-{d:02}"))),
    ]
}

fn features_value() -> impl Strategy<Value = ResponseValue> {
    proptest::collection::vec((-180i32..180, -90i32..90), 0..3).prop_map(|points| {
        ResponseValue::Features(
            points
                .into_iter()
                .map(|(lon, lat)| Feature::point(f64::from(lon), f64::from(lat)))
                .collect(),
        )
    })
}

fn address_value() -> impl Strategy<Value = ResponseValue> {
    ("[a-z0-9 ]{0,12}", "[a-z ]{0,12}", "[A-Z0-9 ]{0,8}").prop_map(|(line1, town, postcode)| {
        ResponseValue::Address(Address {
            line1,
            town,
            postcode,
            ..Address::default()
        })
    })
}

/// Arbitrary response shaped for a field (not necessarily valid)
pub fn value_strategy(field: &Field) -> BoxedStrategy<ResponseValue> {
    match field {
        Field::Text(_) => text_value().boxed(),
        Field::Number(_) => number_value().boxed(),
        Field::Question(spec) => {
            option_value(spec.data.options.iter().map(|o| o.value().to_string()).collect())
        }
        Field::Checklist(spec) => {
            selection_value(spec.data.options.iter().map(|o| o.id.clone()).collect())
        }
        Field::Date(_) => date_value().boxed(),
        Field::Map(_) => features_value().boxed(),
        Field::Address(_) => address_value().boxed(),
    }
}

/// Arbitrary entry for a schema
pub fn entry_strategy(schema: &Schema) -> BoxedStrategy<Entry> {
    let keys: Vec<String> = schema.fields().iter().map(|f| f.key().to_string()).collect();
    let values: Vec<BoxedStrategy<ResponseValue>> =
        schema.fields().iter().map(value_strategy).collect();
    let schema = schema.clone();

    values
        .prop_map(move |values| {
            let mut entry = Entry::blank(&schema);
            for (key, value) in keys.iter().zip(values) {
                entry.set(key, value);
            }
            entry
        })
        .boxed()
}

/// Arbitrary collection of up to `max` entries
pub fn entries_strategy(schema: &Schema, max: usize) -> BoxedStrategy<Vec<Entry>> {
    proptest::collection::vec(entry_strategy(schema), 0..=max).boxed()
}
