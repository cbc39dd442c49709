//! Listform Validation
//!
//! Generates per-field validators from a [`Schema`](listform_model::Schema).
//!
//! # Core Concepts
//!
//! - [`Validator`]: compiled rules for every field of one schema
//! - [`FieldRule`]: the rule for a single field variant
//! - [`FieldError`] / [`FieldErrors`]: structured, recoverable validation failures
//!
//! # Example
//!
//! ```rust,ignore
//! use listform_validate::Validator;
//!
//! let validator = Validator::generate(&schema);
//! if let Err(errors) = validator.validate(&entry) {
//!     for (key, message) in errors.messages() {
//!         println!("{key}: {message}");
//!     }
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod date;
mod error;
mod rule;
mod validator;

pub use date::{check_date, normalize_date, parse_date, DateParts};
pub use error::{FieldError, FieldErrorKind, FieldErrors, DISPLAY_DATE_FORMAT};
pub use rule::{Check, FieldRule, TextFormat};
pub use validator::Validator;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
