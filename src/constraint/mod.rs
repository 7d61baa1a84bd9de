//! The constraint engine.
//!
//! Checking a value means walking it alongside a schema, running each kind of [`Constraint`] the
//! schema carries. Every failure is pushed into the [`Checker`] as a [`ValidationError`] and the
//! walk carries on, so one pass reports everything wrong with a value. Only structural faults
//! (a schema that can't be loaded, a reference that can't be resolved, runaway nesting) stop a
//! check early, as an [`Error`][crate::Error].
//!
//! Each constraint kind can also be run on its own:
//!
//! ```
//! # use jschema::*;
//! # use jschema::constraint::*;
//! # use jschema::loader::LoaderRegistry;
//! # fn main() -> jschema::Result<()> {
//! let config = ValidatorConfig::default();
//! let registry = LoaderRegistry::new();
//! let mut checker = Checker::new(&config, &registry);
//!
//! let schema = Schema::new().min_length(3);
//! Constraint::String.check(&mut checker, &Value::from("ab"), &schema, "name")?;
//! assert_eq!(checker.errors().len(), 1);
//! assert_eq!(checker.errors()[0].path, "name");
//! # Ok(())
//! # }
//! ```

mod array;
mod enum_set;
mod format;
mod number;
mod object;
mod schema;
mod string;
mod types;

use crate::config::ValidatorConfig;
use crate::error::{Error, Result};
use crate::loader::LoaderRegistry;
use crate::schema::Schema;
use crate::uri::UriResolver;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// One way a value failed to match its schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Where in the value the failure is. Empty for the root.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Append an object key to a path. The first key of the root path is written bare.
pub fn increment_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Append an array index to a path.
pub fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// The kinds of constraint a schema can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// `type` and `disallow`.
    Type,
    /// Properties, pattern properties, additional properties, `requires`, and `dependencies`.
    /// Only acts on maps.
    Object,
    /// Item counts, `items`, `additionalItems`, and `uniqueItems`. Only acts on arrays.
    Array,
    /// Length limits and `pattern`. Only acts on strings.
    String,
    /// Bounds, `maxDecimal`, and `divisibleBy`. Only acts on numbers.
    Number,
    /// `enum`.
    Enum,
    /// `format`.
    Format,
    /// Everything: follows `$ref` and `extends`, then runs all the other kinds.
    Schema,
}

impl Constraint {
    /// Check `value` against the part of `schema` this kind covers, reporting failures at `path`.
    pub fn check(
        self,
        checker: &mut Checker,
        value: &Value,
        schema: &Schema,
        path: &str,
    ) -> Result<()> {
        match self {
            Constraint::Type => types::check(checker, value, schema, path),
            Constraint::Object => object::check(checker, value, schema, path),
            Constraint::Array => array::check(checker, value, schema, path),
            Constraint::String => string::check(checker, value, schema, path),
            Constraint::Number => number::check(checker, value, schema, path),
            Constraint::Enum => enum_set::check(checker, value, schema, path),
            Constraint::Format => format::check(checker, value, schema, path),
            Constraint::Schema => schema::check(checker, value, schema, path),
        }
    }
}

/// Shared state for one validation pass: settings, the loader registry, the error sink, and the
/// resolution context (base URIs and enclosing documents) for wherever the walk currently is.
pub struct Checker<'a> {
    config: &'a ValidatorConfig,
    registry: &'a LoaderRegistry,
    resolver: UriResolver,
    errors: Vec<ValidationError>,
    depth: usize,
    bases: Vec<String>,
    documents: Vec<Document>,
    active: Vec<(String, String)>,
}

/// A schema document being walked, and the key identifying it for reference resolution.
struct Document {
    key: String,
    schema: Arc<Schema>,
}

impl<'a> Checker<'a> {
    pub fn new(config: &'a ValidatorConfig, registry: &'a LoaderRegistry) -> Self {
        Self {
            config,
            registry,
            resolver: UriResolver::new(),
            errors: Vec::new(),
            depth: 0,
            bases: Vec::new(),
            documents: Vec::new(),
            active: Vec::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        self.config
    }

    pub fn registry(&self) -> &LoaderRegistry {
        self.registry
    }

    /// Check `value` against a whole schema document. `$ref: "#"` inside it refers back to
    /// `schema`.
    pub fn check(&mut self, value: &Value, schema: &Arc<Schema>) -> Result<()> {
        let key = match schema.id {
            Some(ref id) => crate::uri::Uri::without_fragment(id).to_string(),
            None => format!("{:p}", Arc::as_ptr(schema)),
        };
        self.with_document(key, Arc::clone(schema), None, |checker| {
            schema::check(checker, value, schema, "")
        })
    }

    /// Load the schema at `uri` through the registry and check `value` against it.
    pub fn check_uri(&mut self, value: &Value, uri: &str) -> Result<()> {
        schema::check_link(self, value, uri, "")
    }

    /// Record a failure at `path`.
    pub fn add_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, message));
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Run `schema` against `value` without keeping any errors. Returns whether it passed.
    pub fn passes(&mut self, value: &Value, schema: &Schema, path: &str) -> Result<bool> {
        let mark = self.errors.len();
        schema::check(self, value, schema, path)?;
        let passed = self.errors.len() == mark;
        self.errors.truncate(mark);
        Ok(passed)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            warn!(max = self.config.max_depth, "schema nesting limit reached");
            return Err(Error::SchemaTooDeep {
                max: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn base(&self) -> Option<&str> {
        self.bases.last().map(String::as_str)
    }

    fn document(&self) -> Option<&Document> {
        self.documents.last()
    }

    /// Run `f` with `schema` as the enclosing document, and `base` (if any) as the base URI.
    fn with_document<T>(
        &mut self,
        key: String,
        schema: Arc<Schema>,
        base: Option<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.documents.push(Document { key, schema });
        let pushed_base = base.is_some();
        if let Some(base) = base {
            self.bases.push(base);
        }
        let result = f(self);
        if pushed_base {
            self.bases.pop();
        }
        self.documents.pop();
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::SimpleType;

    #[test]
    fn paths() {
        assert_eq!(increment_path("", "name"), "name");
        assert_eq!(increment_path("person", "name"), "person.name");
        assert_eq!(index_path("", 0), "[0]");
        assert_eq!(index_path("list", 3), "list[3]");
        assert_eq!(index_path(&increment_path("a", "b"), 1), "a.b[1]");
    }

    #[test]
    fn error_display() {
        assert_eq!(ValidationError::new("", "bad").to_string(), "bad");
        assert_eq!(ValidationError::new("age", "bad").to_string(), "age: bad");
    }

    #[test]
    fn each_kind_runs_alone() {
        let config = ValidatorConfig::default();
        let registry = LoaderRegistry::new();
        let schema = Schema::new()
            .kind(SimpleType::Integer)
            .maximum(10)
            .min_length(5)
            .enum_add(1);
        let value = Value::from(20);

        let mut checker = Checker::new(&config, &registry);
        Constraint::String.check(&mut checker, &value, &schema, "").unwrap();
        Constraint::Type.check(&mut checker, &value, &schema, "").unwrap();
        assert!(checker.errors().is_empty());

        Constraint::Number.check(&mut checker, &value, &schema, "").unwrap();
        assert_eq!(checker.errors().len(), 1);
        Constraint::Enum.check(&mut checker, &value, &schema, "").unwrap();
        assert_eq!(checker.errors().len(), 2);

        let mut checker = Checker::new(&config, &registry);
        Constraint::Schema.check(&mut checker, &value, &schema, "").unwrap();
        assert_eq!(checker.into_errors().len(), 2);
    }

    #[test]
    fn passes_leaves_no_errors() {
        let config = ValidatorConfig::default();
        let registry = LoaderRegistry::new();
        let mut checker = Checker::new(&config, &registry);
        let schema = Schema::new().kind(SimpleType::String);
        assert!(!checker.passes(&Value::from(1), &schema, "").unwrap());
        assert!(checker.passes(&Value::from("x"), &schema, "").unwrap());
        assert!(checker.errors().is_empty());
    }

    #[test]
    fn depth_limit() {
        let config = ValidatorConfig::default().max_depth(3);
        let registry = LoaderRegistry::new();
        let mut schema = Schema::new();
        let mut value = Value::from(1);
        for _ in 0..5 {
            schema = Schema::new().items(crate::schema::Items::Schema(Box::new(schema)));
            value = Value::Array(vec![value]);
        }
        let mut checker = Checker::new(&config, &registry);
        let err = checker.check(&value, &Arc::new(schema)).unwrap_err();
        assert!(matches!(err, Error::SchemaTooDeep { max: 3 }));
    }
}
