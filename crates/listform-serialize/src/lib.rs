//! Listform Serialization Engine
//!
//! Converts entry collections into the path-keyed records consumed by
//! downstream rule evaluation, and back again.
//!
//! # Core Concepts
//!
//! - [`flatten`]: entries → `<root>.<ordinal>.<fn>` record
//! - [`ordinal`]: word-form entry positions (`one`, `twentythree`)
//! - [`Totals`]: schema-declared sums, optionally grouped by a select field
//! - [`rehydrate`]: prior output → entries
//! - [`SubmitOutput`]: flattened record, raw array and totals together
//!
//! # Example
//!
//! ```rust,ignore
//! use listform_serialize::{EngineConfig, SubmitOutput};
//!
//! let config = EngineConfig::for_schema(&schema, "proposal.units".parse()?);
//! let output = SubmitOutput::build(&schema, &entries, &config);
//! assert!(output.flattened.get("proposal.units.one.identicalUnits").is_some());
//! ```

#![warn(unreachable_pub)]

mod error;
mod flatten;
mod ordinal;
mod output;
mod rehydrate;
mod totals;

pub use error::RehydrateError;
pub use flatten::{flatten, raw, FlattenOptions, FlattenedRecord};
pub use ordinal::{ordinal, parse_ordinal};
pub use output::{EngineConfig, SubmitOutput};
pub use rehydrate::{rehydrate, rehydrate_flattened, rehydrate_raw};
pub use totals::{sum_by_category, sum_field, total_json, Totals, TOTAL_SEGMENT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
