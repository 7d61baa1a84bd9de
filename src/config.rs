//! Settings that apply to a whole validation pass.

use crate::schema::SimpleType;
use crate::value::Value;
use crate::MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How strictly primitive types are matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Values must have exactly the declared type.
    #[default]
    Normal,
    /// Strings and primitives stand in for each other when the [`Coercion`] allows it: `"42"`
    /// matches `integer` and `42` matches `string`. Useful for checking form or query-string
    /// input, where types get lost on the way in.
    TypeCast,
}

/// Decides whether a value that doesn't have a type can stand in for it in
/// [`CheckMode::TypeCast`]. Only called after the strict match has failed.
pub trait Coercion: Send + Sync {
    fn coerces_to(&self, value: &Value, target: SimpleType) -> bool;
}

/// The default coercion rules. Strings holding decimal integers, JSON numbers, `true`/`false` or
/// `null` match those types, and numbers and booleans match `string`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCoercion;

impl Coercion for DefaultCoercion {
    fn coerces_to(&self, value: &Value, target: SimpleType) -> bool {
        let text = match value {
            Value::Number(_) | Value::Bool(_) => return target == SimpleType::String,
            Value::Str(text) => text.trim(),
            _ => return false,
        };
        match target {
            SimpleType::Integer => {
                let digits = text.strip_prefix('-').unwrap_or(text);
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            }
            SimpleType::Number => text
                .parse::<f64>()
                .map(|f| f.is_finite())
                .unwrap_or(false),
            SimpleType::Boolean => text == "true" || text == "false",
            SimpleType::Null => text == "null",
            _ => false,
        }
    }
}

/// Configuration for a [`Validator`][crate::Validator].
///
/// ```
/// # use jschema::*;
/// let config = ValidatorConfig::new()
///     .mode(CheckMode::TypeCast)
///     .max_depth(32);
/// assert_eq!(config.max_depth, 32);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub mode: CheckMode,
    /// Nesting limit for a check. Each nested schema applied to a value counts one level;
    /// `$ref` and `extends` links followed in place do not.
    pub max_depth: usize,
    /// Key that, on a map being checked, holds the map's own schema.
    pub inline_schema_property: String,
    #[serde(skip, default = "default_coercion")]
    pub coercion: Arc<dyn Coercion>,
}

fn default_coercion() -> Arc<dyn Coercion> {
    Arc::new(DefaultCoercion)
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            mode: CheckMode::Normal,
            max_depth: MAX_DEPTH,
            inline_schema_property: "$schema".to_string(),
            coercion: default_coercion(),
        }
    }
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("mode", &self.mode)
            .field("max_depth", &self.max_depth)
            .field("inline_schema_property", &self.inline_schema_property)
            .finish_non_exhaustive()
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn inline_schema_property(mut self, key: impl Into<String>) -> Self {
        self.inline_schema_property = key.into();
        self
    }

    /// Replace the rules used in [`CheckMode::TypeCast`].
    pub fn coercion(mut self, coercion: impl Coercion + 'static) -> Self {
        self.coercion = Arc::new(coercion);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = ValidatorConfig::default();
        assert_eq!(config.mode, CheckMode::Normal);
        assert_eq!(config.max_depth, MAX_DEPTH);
        assert_eq!(config.inline_schema_property, "$schema");
    }

    #[test]
    fn default_coercion_rules() {
        let c = |value: Value, target| DefaultCoercion.coerces_to(&value, target);
        assert!(c("42".into(), SimpleType::Integer));
        assert!(c("-7".into(), SimpleType::Integer));
        assert!(!c("4.2".into(), SimpleType::Integer));
        assert!(!c("-".into(), SimpleType::Integer));
        assert!(c("4.2e3".into(), SimpleType::Number));
        assert!(!c("inf".into(), SimpleType::Number));
        assert!(c("true".into(), SimpleType::Boolean));
        assert!(!c("yes".into(), SimpleType::Boolean));
        assert!(c("null".into(), SimpleType::Null));
        assert!(!c("[]".into(), SimpleType::Array));
    }

    #[test]
    fn primitives_coerce_to_string() {
        let c = |value: Value, target| DefaultCoercion.coerces_to(&value, target);
        assert!(c(Value::from(30), SimpleType::String));
        assert!(c(Value::from(2.5), SimpleType::String));
        assert!(c(Value::from(true), SimpleType::String));
        assert!(!c(Value::Null, SimpleType::String));
        assert!(!c(Value::Array(vec![]), SimpleType::String));
        assert!(!c(Value::from(true), SimpleType::Integer));
    }

    #[test]
    fn serde_round_trip_skips_coercion() {
        let config = ValidatorConfig::new().mode(CheckMode::TypeCast).max_depth(9);
        let text = serde_json::to_string(&config).unwrap();
        assert!(text.contains("\"type_cast\""));
        let back: ValidatorConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.mode, CheckMode::TypeCast);
        assert_eq!(back.max_depth, 9);

        let partial: ValidatorConfig = serde_json::from_str(r#"{"max_depth":3}"#).unwrap();
        assert_eq!(partial.mode, CheckMode::Normal);
        assert_eq!(partial.inline_schema_property, "$schema");
    }
}
