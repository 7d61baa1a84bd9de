//! The in-memory schema document.
//!
//! A [`Schema`] is decoded from a JSON object through a fixed table of recognized keywords. Each
//! keyword lands in a typed field; anything unrecognized is kept in [`Schema::extra`] and is never
//! acted on, so documents using newer or custom keywords still load.
//!
//! Schemas can also be put together directly:
//!
//! ```
//! # use jschema::*;
//! let schema = Schema::new()
//!     .kind(SimpleType::Object)
//!     .property("name", Schema::new().kind(SimpleType::String).required(true))
//!     .property("age", Schema::new().kind(SimpleType::Integer).maximum(125));
//! assert!(schema.has_property("age"));
//! ```

use crate::error::{Error, Result};
use crate::number::Number;
use crate::value::{Map, Value};
use educe::Educe;
use regex::Regex;
use std::ops::Deref;
use std::str::FromStr;

/// The primitive type names a `type` or `disallow` keyword may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimpleType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl SimpleType {
    /// Look up a type by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<SimpleType> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "string" => SimpleType::String,
            "number" => SimpleType::Number,
            "integer" => SimpleType::Integer,
            "boolean" => SimpleType::Boolean,
            "object" => SimpleType::Object,
            "array" => SimpleType::Array,
            "null" => SimpleType::Null,
            "any" => SimpleType::Any,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimpleType::String => "string",
            SimpleType::Number => "number",
            SimpleType::Integer => "integer",
            SimpleType::Boolean => "boolean",
            SimpleType::Object => "object",
            SimpleType::Array => "array",
            SimpleType::Null => "null",
            SimpleType::Any => "any",
        }
    }
}

/// One member of a `type` or `disallow` union.
#[derive(Clone, Debug)]
pub enum TypeEntry {
    Simple(SimpleType),
    /// A value matches this member when it validates against the schema.
    Schema(Box<Schema>),
}

impl From<SimpleType> for TypeEntry {
    fn from(ty: SimpleType) -> Self {
        TypeEntry::Simple(ty)
    }
}

/// The `items` keyword.
#[derive(Clone, Debug)]
pub enum Items {
    /// Every element is checked against this schema.
    Schema(Box<Schema>),
    /// Each position is checked against the schema at the same index.
    Tuple(Vec<Schema>),
}

/// The `additionalProperties` and `additionalItems` keywords.
#[derive(Clone, Debug)]
pub enum Additional {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// One entry of `extends`.
#[derive(Clone, Debug)]
pub enum Extends {
    Schema(Box<Schema>),
    /// Resolved against the enclosing schema's `id`, then loaded through the registry.
    Uri(String),
}

/// The `requires` keyword of a property.
#[derive(Clone, Debug)]
pub enum Requires {
    /// The named sibling must be present whenever this property is.
    Property(String),
    /// The parent object must validate against this schema whenever this property is present.
    Schema(Box<Schema>),
}

/// One entry of `dependencies`.
#[derive(Clone, Debug)]
pub enum Dependency {
    Properties(Vec<String>),
    Schema(Box<Schema>),
}

/// A schema nested under `properties`, together with its name in the parent.
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    schema: Schema,
}

impl Property {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Deref for Property {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.schema
    }
}

/// A decoded schema document, or any schema nested inside one.
///
/// Fields default to the permissive setting: an empty schema accepts every value.
#[derive(Educe, Clone, Debug)]
#[educe(Default)]
pub struct Schema {
    /// Base URI for relative references inside this schema.
    pub id: Option<String>,
    /// The `$schema` keyword.
    pub meta_schema: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Allowed types. Empty means any type.
    pub types: Vec<TypeEntry>,
    /// Types the value must not be.
    pub disallow: Vec<TypeEntry>,
    /// Declared properties, in document order.
    pub properties: Vec<Property>,
    /// Schemas for undeclared keys matching a pattern. Same regex dialect as `pattern`.
    pub pattern_properties: Vec<(Regex, Schema)>,
    #[educe(Default(expression = Additional::Allowed(true)))]
    pub additional_properties: Additional,
    pub items: Option<Items>,
    #[educe(Default(expression = Additional::Allowed(true)))]
    pub additional_items: Additional,
    /// Boolean `required` on a property schema.
    pub required: bool,
    /// Array-form `required` on an object schema, naming required properties.
    pub required_properties: Vec<String>,
    pub requires: Option<Requires>,
    pub dependencies: Vec<(String, Dependency)>,
    pub enum_values: Option<Vec<Value>>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub max_decimal: Option<usize>,
    pub divisible_by: Option<Number>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Compiled with the `regex` crate, which has no lookaround or backreferences. A schema
    /// using those ECMA 262 features fails to decode with [`Error::InvalidSchema`] rather than
    /// being checked approximately.
    pub pattern: Option<Regex>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    pub format: Option<String>,
    pub extends: Vec<Extends>,
    /// The `$ref` keyword.
    pub reference: Option<String>,
    pub default: Option<Value>,
    /// Unrecognized keywords, kept but never checked.
    pub extra: Map,
}

impl Schema {
    /// Make a new schema that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a schema from a JSON object.
    pub fn from_value(value: &Value) -> Result<Schema> {
        let map = value.as_map().ok_or_else(|| {
            Error::InvalidSchema(format!(
                "Expected an object instead of {}",
                value.type_name()
            ))
        })?;
        let mut schema = Schema::default();
        for (field, raw) in map.iter() {
            if !schema.update(field, raw)? {
                schema.extra.insert(field, raw.clone());
            }
        }
        Ok(schema)
    }

    /// Decode a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Schema> {
        let value = Value::from_json_str(text)?;
        Schema::from_value(&value)
    }

    /// Apply one keyword. Returns `Ok(true)` if the keyword is recognized, `Ok(false)` if it
    /// isn't, and `Err` if it is recognized but holds something unusable.
    fn update(&mut self, field: &str, raw: &Value) -> Result<bool> {
        match field {
            "id" => self.id = Some(read_str(field, raw)?.to_string()),
            "$schema" => self.meta_schema = Some(read_str(field, raw)?.to_string()),
            "title" => self.title = Some(read_str(field, raw)?.to_string()),
            "description" => self.description = Some(read_str(field, raw)?.to_string()),
            "type" => self.types = read_type_union(field, raw)?,
            "disallow" => self.disallow = read_type_union(field, raw)?,
            "properties" => {
                let map = read_map(field, raw)?;
                self.properties.clear();
                for (name, sub) in map.iter() {
                    self.add_property_schema(name, Schema::from_value(sub)?);
                }
            }
            "patternProperties" => {
                let map = read_map(field, raw)?;
                self.pattern_properties = map
                    .iter()
                    .map(|(source, sub)| -> Result<(Regex, Schema)> {
                        Ok((Regex::new(source)?, Schema::from_value(sub)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "additionalProperties" => self.additional_properties = read_additional(field, raw)?,
            "additionalItems" => self.additional_items = read_additional(field, raw)?,
            "items" => {
                self.items = Some(match raw {
                    Value::Array(list) => Items::Tuple(
                        list.iter()
                            .map(Schema::from_value)
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    _ => Items::Schema(Box::new(Schema::from_value(raw)?)),
                })
            }
            "required" => match raw {
                Value::Bool(b) => self.required = *b,
                Value::Array(list) => {
                    self.required_properties = list
                        .iter()
                        .map(|v| read_str(field, v).map(str::to_string))
                        .collect::<Result<Vec<_>>>()?
                }
                _ => return Err(bad_field(field, "a boolean or an array of strings")),
            },
            "requires" => {
                self.requires = Some(match raw {
                    Value::Str(name) => Requires::Property(name.clone()),
                    _ => Requires::Schema(Box::new(Schema::from_value(raw)?)),
                })
            }
            "dependencies" => {
                let map = read_map(field, raw)?;
                self.dependencies = map
                    .iter()
                    .map(|(name, dep)| -> Result<(String, Dependency)> {
                        let dep = match dep {
                            Value::Str(other) => Dependency::Properties(vec![other.clone()]),
                            Value::Array(list) => Dependency::Properties(
                                list.iter()
                                    .map(|v| read_str(field, v).map(str::to_string))
                                    .collect::<Result<Vec<_>>>()?,
                            ),
                            _ => Dependency::Schema(Box::new(Schema::from_value(dep)?)),
                        };
                        Ok((name.to_string(), dep))
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "enum" => match raw {
                Value::Array(list) => self.enum_values = Some(list.clone()),
                _ => return Err(bad_field(field, "an array")),
            },
            "minimum" => self.minimum = Some(*read_number(field, raw)?),
            "maximum" => self.maximum = Some(*read_number(field, raw)?),
            "exclusiveMinimum" => self.exclusive_minimum = read_bool(field, raw)?,
            "exclusiveMaximum" => self.exclusive_maximum = read_bool(field, raw)?,
            "maxDecimal" => self.max_decimal = Some(read_usize(field, raw)?),
            "divisibleBy" => self.divisible_by = Some(*read_number(field, raw)?),
            "minLength" => self.min_length = Some(read_usize(field, raw)?),
            "maxLength" => self.max_length = Some(read_usize(field, raw)?),
            "pattern" => self.pattern = Some(Regex::new(read_str(field, raw)?)?),
            "minItems" => self.min_items = Some(read_usize(field, raw)?),
            "maxItems" => self.max_items = Some(read_usize(field, raw)?),
            "uniqueItems" => self.unique_items = read_bool(field, raw)?,
            "format" => self.format = Some(read_str(field, raw)?.to_string()),
            "extends" => {
                self.extends = match raw {
                    Value::Array(list) => list
                        .iter()
                        .map(read_extends)
                        .collect::<Result<Vec<_>>>()?,
                    _ => vec![read_extends(raw)?],
                }
            }
            "$ref" => self.reference = Some(read_str(field, raw)?.to_string()),
            "default" => self.default = Some(raw.clone()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Add or replace a declared property.
    pub fn add_property_schema(&mut self, name: &str, schema: Schema) {
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.schema = schema,
            None => self.properties.push(Property::new(name, schema)),
        }
    }

    pub fn property_named(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property_named(name).is_some()
    }

    /// The single simple type name, if `type` names exactly one.
    pub fn type_name(&self) -> Option<&'static str> {
        match self.types.as_slice() {
            [TypeEntry::Simple(ty)] => Some(ty.name()),
            _ => None,
        }
    }

    pub fn has_extends(&self) -> bool {
        !self.extends.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The sibling property this one depends on, if `requires` names one.
    pub fn requires_property(&self) -> Option<&str> {
        match self.requires {
            Some(Requires::Property(ref name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Set the schema's `id`.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a type to the `type` union.
    pub fn kind(mut self, kind: impl Into<TypeEntry>) -> Self {
        self.types.push(kind.into());
        self
    }

    /// Add a type to the `disallow` union.
    pub fn disallow_add(mut self, kind: impl Into<TypeEntry>) -> Self {
        self.disallow.push(kind.into());
        self
    }

    /// Add or replace a declared property.
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        self.add_property_schema(name, schema);
        self
    }

    pub fn pattern_property(mut self, regex: Regex, schema: Schema) -> Self {
        self.pattern_properties.push((regex, schema));
        self
    }

    pub fn additional_properties(mut self, additional: Additional) -> Self {
        self.additional_properties = additional;
        self
    }

    pub fn items(mut self, items: Items) -> Self {
        self.items = Some(items);
        self
    }

    pub fn additional_items(mut self, additional: Additional) -> Self {
        self.additional_items = additional;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn requires(mut self, requires: Requires) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn enum_add(mut self, value: impl Into<Value>) -> Self {
        self.enum_values
            .get_or_insert_with(Vec::new)
            .push(value.into());
        self
    }

    pub fn minimum(mut self, minimum: impl Into<Number>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn maximum(mut self, maximum: impl Into<Number>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn min_items(mut self, min_items: usize) -> Self {
        self.min_items = Some(min_items);
        self
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn unique_items(mut self, unique_items: bool) -> Self {
        self.unique_items = unique_items;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn extends_add(mut self, extends: Extends) -> Self {
        self.extends.push(extends);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(text: &str) -> Result<Schema> {
        Schema::from_json_str(text)
    }
}

impl TryFrom<&Value> for Schema {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Schema> {
        Schema::from_value(value)
    }
}

fn bad_field(field: &str, expected: &str) -> Error {
    Error::InvalidSchema(format!("`{}` must be {}", field, expected))
}

fn read_str<'a>(field: &str, raw: &'a Value) -> Result<&'a str> {
    raw.as_str().ok_or_else(|| bad_field(field, "a string"))
}

fn read_bool(field: &str, raw: &Value) -> Result<bool> {
    raw.as_bool().ok_or_else(|| bad_field(field, "a boolean"))
}

fn read_number<'a>(field: &str, raw: &'a Value) -> Result<&'a Number> {
    raw.as_number().ok_or_else(|| bad_field(field, "a number"))
}

fn read_usize(field: &str, raw: &Value) -> Result<usize> {
    raw.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| bad_field(field, "a non-negative integer"))
}

fn read_map<'a>(field: &str, raw: &'a Value) -> Result<&'a Map> {
    raw.as_map().ok_or_else(|| bad_field(field, "an object"))
}

fn read_type_entry(field: &str, raw: &Value) -> Result<TypeEntry> {
    match raw {
        Value::Str(name) => SimpleType::from_name(name)
            .map(TypeEntry::Simple)
            .ok_or_else(|| Error::InvalidSchema(format!("unknown type name \"{}\"", name))),
        Value::Map(_) => Ok(TypeEntry::Schema(Box::new(Schema::from_value(raw)?))),
        _ => Err(bad_field(field, "a type name, a schema, or an array of them")),
    }
}

fn read_type_union(field: &str, raw: &Value) -> Result<Vec<TypeEntry>> {
    match raw {
        Value::Array(list) => list.iter().map(|v| read_type_entry(field, v)).collect(),
        _ => Ok(vec![read_type_entry(field, raw)?]),
    }
}

fn read_additional(field: &str, raw: &Value) -> Result<Additional> {
    match raw {
        Value::Bool(allowed) => Ok(Additional::Allowed(*allowed)),
        Value::Map(_) => Ok(Additional::Schema(Box::new(Schema::from_value(raw)?))),
        _ => Err(bad_field(field, "a boolean or a schema")),
    }
}

fn read_extends(raw: &Value) -> Result<Extends> {
    match raw {
        Value::Str(uri) => Ok(Extends::Uri(uri.clone())),
        Value::Map(_) => Ok(Extends::Schema(Box::new(Schema::from_value(raw)?))),
        _ => Err(bad_field("extends", "a schema, a URI, or an array of them")),
    }
}
