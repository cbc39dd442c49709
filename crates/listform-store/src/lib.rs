//! Listform Entry Store
//!
//! Editing workflow for a repeating collection: one entry open at a time,
//! saved entries validated, cardinality enforced on submit.
//!
//! # Core Concepts
//!
//! - [`EntryStore`]: ordered entries plus the editing cursor
//! - [`EditState`]: idle, editing one entry, or all saved
//! - [`Transition`]: store operations checked against the state
//! - [`ErrorSet`]: flags and field messages for the presentation layer
//!
//! # Example
//!
//! ```rust,ignore
//! use listform_store::EntryStore;
//! use listform_serialize::EngineConfig;
//!
//! let mut store = EntryStore::new(schema, EngineConfig::new("animals".parse()?));
//! store.set_value("name", ResponseValue::text("Richard Parker"))?;
//! store.save_entry()?;
//! let output = store.submit_all()?;
//! ```

#![warn(unreachable_pub)]

mod error;
mod state;
mod store;

pub use error::{EntryError, ErrorSet};
pub use state::{allowed_transitions, validate_transition, EditState, Transition};
pub use store::EntryStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
