//! The top-level entry point: check values, collect errors.

use crate::config::ValidatorConfig;
use crate::constraint::{Checker, ValidationError};
use crate::error::{Error, Result};
use crate::loader::LoaderRegistry;
use crate::schema::Schema;
use crate::value::Value;
use std::sync::Arc;
use tracing::debug;

/// Where the schema for a check comes from.
#[derive(Clone, Debug, Default)]
pub enum SchemaSource {
    /// No schema. The value must then describe its own schema.
    #[default]
    None,
    Schema(Arc<Schema>),
    /// A decoded JSON object holding the schema.
    Value(Value),
    /// JSON text holding the schema.
    Text(String),
    /// A URI to load the schema from, through the registry.
    Uri(String),
}

impl SchemaSource {
    pub fn text(text: impl Into<String>) -> Self {
        SchemaSource::Text(text.into())
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        SchemaSource::Uri(uri.into())
    }
}

impl From<Schema> for SchemaSource {
    fn from(schema: Schema) -> Self {
        SchemaSource::Schema(Arc::new(schema))
    }
}

impl From<Arc<Schema>> for SchemaSource {
    fn from(schema: Arc<Schema>) -> Self {
        SchemaSource::Schema(schema)
    }
}

impl From<&Arc<Schema>> for SchemaSource {
    fn from(schema: &Arc<Schema>) -> Self {
        SchemaSource::Schema(Arc::clone(schema))
    }
}

impl From<Value> for SchemaSource {
    fn from(value: Value) -> Self {
        SchemaSource::Value(value)
    }
}

impl From<serde_json::Value> for SchemaSource {
    fn from(value: serde_json::Value) -> Self {
        SchemaSource::Value(value.into())
    }
}

impl<T: Into<SchemaSource>> From<Option<T>> for SchemaSource {
    fn from(source: Option<T>) -> Self {
        source.map(Into::into).unwrap_or_default()
    }
}

/// Checks values against schemas, accumulating every failure.
///
/// Errors from successive calls to [`check`][Validator::check] pile up until
/// [`reset`][Validator::reset] is called.
///
/// ```
/// # use jschema::*;
/// # fn main() -> jschema::Result<()> {
/// let mut validator = Validator::new(ValidatorConfig::default());
/// let value = Value::from_json_str(r#"{"name":"John Doe","age":30}"#)?;
/// validator.check(
///     &value,
///     SchemaSource::text(r#"{"properties":{"age":{"type":"integer","maximum":25}}}"#),
/// )?;
/// assert!(!validator.is_valid());
/// assert_eq!(validator.errors()[0].path, "age");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Validator {
    config: ValidatorConfig,
    registry: Arc<LoaderRegistry>,
    errors: Vec<ValidationError>,
}

impl Validator {
    /// A validator with its own registry of the default loaders.
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_registry(config, Arc::new(LoaderRegistry::with_default_loaders()))
    }

    /// A validator sharing an existing registry, and with it the registry's schema cache.
    pub fn with_registry(config: ValidatorConfig, registry: Arc<LoaderRegistry>) -> Self {
        Self {
            config,
            registry,
            errors: Vec::new(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<LoaderRegistry> {
        &self.registry
    }

    /// Check `value` against `schema`, adding any failures to the error list.
    ///
    /// If `value` is a map holding the inline schema key (`$schema` by default), the schema
    /// there (an object, or a URI string) is checked first, then `schema` if one was given.
    ///
    /// Returns `Err` only for structural faults. Failures of the value to match are collected
    /// and read with [`errors`][Validator::errors].
    pub fn check(&mut self, value: &Value, schema: impl Into<SchemaSource>) -> Result<()> {
        let source = schema.into();
        let inline = value
            .as_map()
            .and_then(|map| map.get(&self.config.inline_schema_property));
        if inline.is_none() && matches!(source, SchemaSource::None) {
            return Err(Error::InvalidArgument(
                "no schema was given and the value does not carry its own".to_string(),
            ));
        }

        let mut checker = Checker::new(&self.config, &self.registry);
        if let Some(inline) = inline {
            debug!(
                key = self.config.inline_schema_property.as_str(),
                "checking against inline schema"
            );
            match inline {
                Value::Str(uri) => checker.check_uri(value, uri)?,
                Value::Map(_) => checker.check(value, &Arc::new(Schema::from_value(inline)?))?,
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "inline schema must be an object or a URI, not {}",
                        other.type_name()
                    )))
                }
            }
        }

        match source {
            SchemaSource::None => (),
            SchemaSource::Schema(schema) => checker.check(value, &schema)?,
            SchemaSource::Value(raw) => checker.check(value, &Arc::new(Schema::from_value(&raw)?))?,
            SchemaSource::Text(text) => {
                checker.check(value, &Arc::new(Schema::from_json_str(&text)?))?
            }
            SchemaSource::Uri(uri) => checker.check_uri(value, &uri)?,
        }

        self.errors.extend(checker.into_errors());
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Append errors found elsewhere, such as by another validator.
    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Forget all collected errors.
    pub fn reset(&mut self) {
        self.errors.clear();
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::loader::MemoryLoader;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn empty_validator() -> Validator {
        Validator::with_registry(ValidatorConfig::default(), Arc::new(LoaderRegistry::new()))
    }

    fn json(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    #[test]
    fn requires_some_schema() {
        let mut validator = empty_validator();
        assert!(matches!(
            validator.check(&json(r#"{"a":1}"#), SchemaSource::None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            validator.check(&json(r#"{"$schema":5}"#), SchemaSource::None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn self_described_document() {
        let value = json(
            r#"{
                "$schema":{
                    "properties":{
                        "name":{"type":"string"},
                        "age":{"type":"integer","required":true}
                    },
                    "additionalProperties":false
                },
                "name":"John Doe",
                "age":30
            }"#,
        );
        let mut validator = empty_validator();
        validator.check(&value, SchemaSource::None).unwrap();
        assert!(validator.is_valid(), "{:?}", validator.errors());

        let value = json(r#"{"$schema":{"properties":{"age":{"required":true}}},"name":"x"}"#);
        validator.check(&value, SchemaSource::None).unwrap();
        assert_eq!(validator.errors().len(), 1);
        assert_eq!(validator.errors()[0].path, "age");
    }

    #[test]
    fn inline_and_supplied_schemas_are_both_applied() {
        let value = json(r#"{"$schema":{"properties":{"a":{"type":"string"}}},"a":1}"#);
        let mut validator = empty_validator();
        validator
            .check(&value, json(r#"{"properties":{"a":{"minimum":5}}}"#))
            .unwrap();
        let messages: Vec<&str> = validator
            .errors()
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "integer value found, but string is required",
                "must have a minimum value of 5"
            ]
        );
    }

    #[test]
    fn inline_schema_by_uri() {
        let mut memory = MemoryLoader::new();
        memory.insert_schema("http://h/person", r#"{"properties":{"n":{"type":"string"}}}"#);
        let mut registry = LoaderRegistry::new();
        registry.add_loader(memory);
        let mut validator =
            Validator::with_registry(ValidatorConfig::default(), Arc::new(registry));
        validator
            .check(&json(r#"{"$schema":"http://h/person","n":3}"#), None::<Schema>)
            .unwrap();
        assert_eq!(validator.errors().len(), 1);
    }

    #[test]
    fn schema_by_uri_and_text() {
        let mut memory = MemoryLoader::new();
        memory.insert_schema("http://h/int", r#"{"type":"integer"}"#);
        let mut registry = LoaderRegistry::new();
        registry.add_loader(memory);
        let mut validator =
            Validator::with_registry(ValidatorConfig::default(), Arc::new(registry));

        validator.check(&json("1"), SchemaSource::uri("http://h/int")).unwrap();
        validator.check(&json("1.5"), SchemaSource::uri("http://h/int")).unwrap();
        validator.check(&json("1.5"), SchemaSource::text(r#"{"type":"number"}"#)).unwrap();
        assert_eq!(validator.errors().len(), 1);

        assert!(matches!(
            validator.check(&json("1"), SchemaSource::uri("http://h/missing")),
            Err(Error::ResourceNotFound(_))
        ));
        assert!(matches!(
            validator.check(&json("1"), SchemaSource::text("<html>")),
            Err(Error::JsonDecoding(_))
        ));
        assert!(matches!(
            validator.check(&json("1"), SchemaSource::uri("not a uri")),
            Err(Error::InvalidSourceUri(_))
        ));
    }

    #[test]
    fn error_list_management() {
        let mut validator = empty_validator();
        let schema = Arc::new(Schema::from_json_str(r#"{"type":"string"}"#).unwrap());
        validator.check(&json("1"), &schema).unwrap();
        validator.check(&json("2"), &schema).unwrap();
        assert_eq!(validator.errors().len(), 2);

        validator.add_errors(vec![ValidationError::new("x", "external")]);
        assert_eq!(validator.errors().len(), 3);

        validator.reset();
        assert!(validator.is_valid());
        validator.check(&json(r#""ok""#), &schema).unwrap();
        assert!(validator.into_errors().is_empty());
    }

    /// Build a random JSON-like tree.
    fn random_value(rng: &mut StdRng, depth: usize) -> Value {
        let kind = if depth == 0 { rng.gen_range(0..4) } else { rng.gen_range(0..6) };
        match kind {
            0 => Value::Null,
            1 => Value::from(rng.gen::<bool>()),
            2 => {
                if rng.gen() {
                    Value::from(rng.gen_range(-1000i64..1000))
                } else {
                    Value::from(rng.gen_range(-1000.0..1000.0))
                }
            }
            3 => Value::from(format!("s{}", rng.gen_range(0..100))),
            4 => (0..rng.gen_range(0..4))
                .map(|_| random_value(rng, depth - 1))
                .collect(),
            _ => Value::Map(
                (0..rng.gen_range(0..4))
                    .map(|i| (format!("k{}", i), random_value(rng, depth - 1)))
                    .collect(),
            ),
        }
    }

    #[test]
    fn no_type_means_no_type_errors() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let schema = Arc::new(
            Schema::from_json_str(
                r#"{"properties":{"k0":{},"k1":{"properties":{"k0":{}}}},"items":{}}"#,
            )
            .unwrap(),
        );
        let mut validator = empty_validator();
        for _ in 0..200 {
            let value = random_value(&mut rng, 4);
            validator.check(&value, &schema).unwrap();
        }
        assert!(validator.is_valid(), "{:?}", validator.errors());
    }

    #[test]
    fn checking_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(42);
        let schema = Arc::new(
            Schema::from_json_str(
                r#"{
                    "type":["object","array"],
                    "properties":{"k0":{"type":"string","maxLength":2},"k1":{"type":"integer"}},
                    "items":{"type":["integer","null"],"minimum":0},
                    "uniqueItems":true
                }"#,
            )
            .unwrap(),
        );
        let mut validator = empty_validator();
        for _ in 0..100 {
            let value = random_value(&mut rng, 3);
            validator.check(&value, &schema).unwrap();
            let first = validator.errors().to_vec();
            validator.reset();
            validator.check(&value, &schema).unwrap();
            assert_eq!(validator.errors(), first.as_slice());
            validator.reset();
        }
    }
}
