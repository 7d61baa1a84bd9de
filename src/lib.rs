//! Validation of JSON values against JSON Schema (draft-03) documents.
//!
//! A value is checked against a [`Schema`], and the result is a list of [`ValidationError`]s,
//! each naming where in the value the failure is and what went wrong. Checking never stops at
//! the first failure; everything wrong with a value is reported in one pass.
//!
//! Schemas can link to each other through `extends` and `$ref`. Linked schemas are fetched by a
//! [`LoaderRegistry`][loader::LoaderRegistry], which caches every document it loads so that
//! cyclic links terminate.
//!
//! # Example
//!
//! ```
//! # use jschema::*;
//! # fn main() -> jschema::Result<()> {
//! let schema = Schema::from_json_str(r#"{
//!     "type":"object",
//!     "properties":{
//!         "name":{"type":"string","required":true},
//!         "age":{"type":"integer","maximum":125},
//!         "state":{"type":"string","requires":"city"},
//!         "city":{"type":"string"}
//!     }
//! }"#)?;
//!
//! let value = Value::from_json_str(r#"{"name":"John Doe","age":130,"state":"Ohio"}"#)?;
//! let errors = jschema::validate(&value, schema)?;
//! let found: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
//! assert_eq!(found, vec![
//!     "age: must have a maximum value of 125",
//!     "state: state requires city",
//! ]);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `http`: adds [`HttpLoader`][loader::HttpLoader] to the default loaders, so schemas can be
//!   linked by `http://` and `https://` URIs.

pub mod config;
pub mod constraint;
pub mod error;
pub mod loader;
pub mod number;
pub mod schema;
pub mod uri;
pub mod validator;
pub mod value;

pub use config::{CheckMode, Coercion, DefaultCoercion, ValidatorConfig};
pub use constraint::ValidationError;
pub use error::{Error, Result};
pub use number::Number;
pub use schema::{
    Additional, Dependency, Extends, Items, Property, Requires, Schema, SimpleType, TypeEntry,
};
pub use uri::{Uri, UriResolver};
pub use validator::{SchemaSource, Validator};
pub use value::{Map, Value};

/// Default limit on schema and value nesting during a check.
pub const MAX_DEPTH: usize = 128;

/// Check `value` against `schema` with the default configuration and loaders, returning every
/// failure found.
pub fn validate(value: &Value, schema: impl Into<SchemaSource>) -> Result<Vec<ValidationError>> {
    let mut validator = Validator::new(ValidatorConfig::default());
    validator.check(value, schema)?;
    Ok(validator.into_errors())
}
