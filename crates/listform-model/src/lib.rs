//! Listform Data Model
//!
//! Declarative schemas for repeating structured-entry forms.
//!
//! # Core Concepts
//!
//! - [`Schema`]: named collection of fields with entry-count bounds
//! - [`Field`]: one typed question (text, number, select, date, geometry, address)
//! - [`Entry`]: one user-filled instance of a schema's fields
//! - [`ResponseValue`]: the answer to a single field
//! - [`DataKey`]: dotted key under which responses are recorded
//!
//! # Example
//!
//! ```rust,ignore
//! use listform_model::{Schema, Entry, ResponseValue};
//!
//! let schema = Schema::from_yaml(&std::fs::read_to_string("units.yaml")?)?;
//! let mut entry = Entry::blank(&schema);
//! entry.set("identicalUnits", ResponseValue::Number(4.0));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod display;
mod entry;
mod error;
mod field;
mod key;
mod schema;

pub use entry::{Address, Entry, Feature, ResponseValue};
pub use error::{ResponseError, SchemaError};
pub use field::{
    AddressInput, ChecklistInput, DateInput, DrawType, Field, FieldKind, FieldSpec, MapInput,
    MapOptions, NumberInput, QuestionInput, SelectOption, TextInput, TextKind,
};
pub use key::{DataKey, KeyError};
pub use schema::{Schema, SchemaDef, TotalSpec};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used items
pub mod prelude {
    pub use crate::{DataKey, Entry, Field, FieldKind, ResponseValue, Schema, SchemaError};
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn schema_to_entry_lifecycle() {
        let schema = Schema::from_json(
            r#"{
                "displayType": "Animal",
                "min": 1,
                "fields": [
                    { "type": "text", "data": { "fn": "name", "title": "Name" } },
                    { "type": "question", "data": {
                        "fn": "size", "title": "Size",
                        "options": [ { "id": "s", "text": "Small" }, { "id": "l", "text": "Large" } ]
                    } }
                ]
            }"#,
        )
        .unwrap();

        let mut entry = Entry::blank(&schema);
        assert!(entry.is_blank());
        entry.set("size", ResponseValue::text("Large"));

        let size = schema.field("size").unwrap();
        assert_eq!(size.display_value(entry.get("size").unwrap()), "Large");
        assert_eq!(entry.to_json()["size"], "Large");
    }
}
