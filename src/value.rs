use crate::error::Result;
use crate::number::Number;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::ops::Index;

/// A decoded JSON value.
///
/// Every constraint works against this one representation. It can be built from literals through
/// `From`, from a [`serde_json::Value`], or parsed directly from JSON text with
/// [`Value::from_json_str`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    Array(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Parse JSON text into a value.
    pub fn from_json_str(text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }

    /// The JSON Schema primitive type name of this value. Numbers without a fractional part are
    /// `"integer"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_integer() => "integer",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_integer())
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        if let Value::Number(ref val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(ref val) = *self {
            Some(val.as_str())
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(ref array) = *self {
            Some(array)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        if let Value::Map(ref map) = *self {
            Some(map)
        } else {
            None
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match *self {
            Value::Map(ref mut map) => Some(map),
            _ => None,
        }
    }
}

/// An insertion-ordered string-keyed map.
///
/// Keys are unique: inserting an existing key replaces its value in place, keeping its original
/// position. Two maps are equal when they hold the same key-value pairs, regardless of order.
#[derive(Clone, Debug, Default)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key-value pair, returning the value previously held by the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key, keeping the order of the entries after it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Map) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map(|o| o == v).unwrap_or(false))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

static NULL: Value = Value::Null;

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        self.as_array().and_then(|v| v.get(index)).unwrap_or(&NULL)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, index: &str) -> &Self::Output {
        self.as_map().and_then(|v| v.get(index)).unwrap_or(&NULL)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

macro_rules! impl_value_from_number {
    ($t: ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Number(From::from(v))
            }
        }
    };
}

macro_rules! impl_value_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$p(v)
            }
        }
    };
}

impl_value_from!(bool, Bool);
impl_value_from!(Number, Number);
impl_value_from!(String, Str);
impl_value_from!(Vec<Value>, Array);
impl_value_from!(Map, Map);
impl_value_from_number!(u8);
impl_value_from_number!(u16);
impl_value_from_number!(u32);
impl_value_from_number!(u64);
impl_value_from_number!(usize);
impl_value_from_number!(i8);
impl_value_from_number!(i16);
impl_value_from_number!(i32);
impl_value_from_number!(i64);
impl_value_from_number!(isize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(v: f64) -> Self {
        Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(v: Cow<'a, str>) -> Self {
        Value::Str(v.into_owned())
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let v: Vec<Value> = iter.into_iter().map(Into::into).collect();
        Value::Array(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(ref n) => Value::Number(Number::from(n)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<'a> From<&'a serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Number(v) => v.serialize(serializer),
            Value::Str(v) => serializer.serialize_str(v),
            Value::Array(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for elem in v {
                    seq.serialize_element(elem)?;
                }
                seq.end()
            }
            Value::Map(v) => {
                let mut map = serializer.serialize_map(Some(v.len()))?;
                for (key, val) in v.iter() {
                    map.serialize_entry(key, val)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::*;

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt.write_str("any valid JSON value")
            }

            fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(v)))
            }

            fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
                Number::from_f64(v)
                    .map(Value::Number)
                    .ok_or_else(|| E::custom("non-finite number"))
            }

            fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Value::Str(v.into()))
            }

            fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(Value::Str(v))
            }

            fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D: serde::Deserializer<'de>>(
                self,
                deserializer: D,
            ) -> Result<Self::Value, D::Error> {
                Value::deserialize(deserializer)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                // Allocate with the size hint, but be conservative. 4096 is what serde uses
                // internally for collections, so we'll do likewise.
                let mut seq = match access.size_hint() {
                    Some(size) => Vec::with_capacity(size.min(4096)),
                    None => Vec::new(),
                };
                while let Some(elem) = access.next_element()? {
                    seq.push(elem);
                }
                Ok(Value::Array(seq))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = Map::new();
                while let Some((key, val)) = access.next_entry::<String, Value>()? {
                    map.insert(key, val);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_keeps_key_order() {
        let value = Value::from_json_str(r#"{"b":1,"a":[true,null,"x"],"c":2.5}"#).unwrap();
        let keys: Vec<&str> = value.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(value["a"][0], Value::Bool(true));
        assert_eq!(value["a"][2], Value::from("x"));
        assert_eq!(value["missing"], Value::Null);
    }

    #[test]
    fn map_equality_ignores_order() {
        let lhs: Map = vec![("a", Value::from(1)), ("b", Value::from(2))]
            .into_iter()
            .collect();
        let rhs: Map = vec![("b", Value::from(2)), ("a", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = Map::new();
        map.insert("a", Value::from(1));
        map.insert("b", Value::from(2));
        assert_eq!(map.insert("a", Value::from(3)), Some(Value::from(1)));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn large_objects() {
        let text: Vec<String> = (0..50_000).map(|i| format!(r#""k{}":{}"#, i, i)).collect();
        let value = Value::from_json_str(&format!("{{{}}}", text.join(","))).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.keys().next(), Some("k0"));
        assert_eq!(map.get("k49999"), Some(&Value::from(49_999)));
        assert!(map.contains_key("k25000"));
        assert!(!map.contains_key("k50000"));
        assert_eq!(map, &map.clone().into_iter().rev().collect::<Map>());
    }

    #[test]
    fn remove_keeps_order() {
        let mut map: Map = vec![("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::from(3))]
            .into_iter()
            .collect();
        assert_eq!(map.remove("a"), Some(Value::from(1)));
        assert_eq!(map.remove("a"), None);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::from(30).type_name(), "integer");
        assert_eq!(Value::from(30.0).type_name(), "integer");
        assert_eq!(Value::from(30.5).type_name(), "number");
        assert_eq!(Value::from("30").type_name(), "string");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Map(Map::new()).type_name(), "object");
    }

    #[test]
    fn from_serde_json() {
        let json = serde_json::json!({"z": 1, "y": [1.5, "s"]});
        let value = Value::from(json);
        let keys: Vec<&str> = value.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "y"]);
        assert_eq!(value.to_string(), r#"{"z":1,"y":[1.5,"s"]}"#);
    }
}
