//! JSON payload tree with support for non-finite numbers.
//!
//! The prediction service serializes dataframe values with an encoder that
//! writes `NaN`, `Infinity` and `-Infinity` as bare tokens. Those are not
//! valid JSON, so `serde_json` rejects the whole body. [`Payload::parse`]
//! reads the body as JSON5, which accepts those tokens, and builds the tree
//! through the [`Deserialize`] impl below.

use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;

/// Maximum array/object nesting accepted by [`Payload::parse`].
pub const MAX_DEPTH: usize = 64;

/// A numeric leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Non-negative integer.
    PosInt(u64),
    /// Negative integer.
    NegInt(i64),
    /// Floating point value, possibly non-finite.
    Float(f64),
}

impl Number {
    /// Returns the value as `f64` (integers may lose precision).
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::PosInt(value) => value as f64,
            Self::NegInt(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Returns true for the not-a-number value.
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Float(value) if value.is_nan())
    }

    /// Returns true for zero of any representation.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::PosInt(value) => value == 0,
            Self::NegInt(value) => value == 0,
            Self::Float(value) => value == 0.0,
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self::PosInt(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        if value < 0 {
            Self::NegInt(value)
        } else {
            Self::PosInt(value.unsigned_abs())
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PosInt(value) => write!(f, "{value}"),
            Self::NegInt(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_nan() => f.write_str("NaN"),
            Self::Float(value) if value == f64::INFINITY => f.write_str("Infinity"),
            Self::Float(value) if value == f64::NEG_INFINITY => f.write_str("-Infinity"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A JSON-like value tree.
///
/// Objects keep their keys in document order, duplicates included.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Payload>),
    Object(Vec<(String, Payload)>),
}

impl Payload {
    /// Parses a response body.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(json5::from_str(text)?)
    }

    /// Looks up an object field. The last duplicate wins.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|number| number.as_f64())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Payload]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Payload)]> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Top-level keys of an object in document order (empty otherwise).
    pub fn keys(&self) -> Vec<&str> {
        self.as_object()
            .map(|entries| entries.iter().map(|(key, _)| key.as_str()).collect())
            .unwrap_or_default()
    }

    /// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Number(number) => !(number.is_zero() || number.is_nan()),
            Self::String(value) => !value.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Pretty-printed JSON (two-space indent), keys in document order.
    /// Non-finite numbers are written as `null`.
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(Number::PosInt(value)) => serializer.serialize_u64(*value),
            Self::Number(Number::NegInt(value)) => serializer.serialize_i64(*value),
            Self::Number(Number::Float(value)) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        PayloadSeed { depth: 0 }.deserialize(deserializer)
    }
}

/// Builds one value, tracking how deep it sits in the document.
#[derive(Debug, Clone, Copy)]
struct PayloadSeed {
    depth: usize,
}

impl PayloadSeed {
    fn nested<E: de::Error>(self) -> std::result::Result<Self, E> {
        if self.depth >= MAX_DEPTH {
            return Err(E::custom(format!("nesting exceeds {MAX_DEPTH} levels")));
        }
        Ok(Self {
            depth: self.depth + 1,
        })
    }
}

impl<'de> DeserializeSeed<'de> for PayloadSeed {
    type Value = Payload;

    fn deserialize<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Payload, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for PayloadSeed {
    type Value = Payload;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Payload, E> {
        Ok(Payload::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Payload, E> {
        Ok(Payload::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Payload, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> std::result::Result<Payload, E> {
        Ok(Payload::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Payload, E> {
        Ok(Payload::Number(Number::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Payload, E> {
        Ok(Payload::Number(Number::PosInt(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Payload, E> {
        Ok(Payload::Number(Number::Float(value)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Payload, E> {
        Ok(Payload::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Payload, E> {
        Ok(Payload::String(value))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Payload, A::Error> {
        let child = self.nested()?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(child)? {
            items.push(item);
        }
        Ok(Payload::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Payload, A::Error> {
        let child = self.nested()?;
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(child)?;
            entries.push((key, value));
        }
        Ok(Payload::Object(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn test_parse_standard_json() {
        let payload = Payload::parse(r#" {"a": [1, -2, 3.5, true, null], "b": "x\"y"} "#).unwrap();
        assert_eq!(
            payload.get("a").and_then(Payload::as_array).map(<[Payload]>::len),
            Some(5)
        );
        assert_eq!(payload.get("b").and_then(Payload::as_str), Some("x\"y"));
        assert_eq!(payload.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_non_finite_tokens() {
        let payload = Payload::parse("[NaN, Infinity, -Infinity, -1]").unwrap();
        let items = payload.as_array().unwrap();
        assert!(items[0].as_number().unwrap().is_nan());
        assert_eq!(items[1].as_f64(), Some(f64::INFINITY));
        assert_eq!(items[2].as_f64(), Some(f64::NEG_INFINITY));
        assert_eq!(items[3].as_f64(), Some(-1.0));
    }

    #[test]
    fn test_quoted_non_finite_stays_text() {
        let payload = Payload::parse(r#"{"a": "NaN", "b": "Infinity"}"#).unwrap();
        assert_eq!(payload.get("a").and_then(Payload::as_str), Some("NaN"));
        assert_eq!(payload.get("b").and_then(Payload::as_str), Some("Infinity"));
    }

    #[test]
    fn test_unicode_escapes() {
        let payload = Payload::parse(r#""caf\u00e9 😀""#).unwrap();
        assert_eq!(payload.as_str(), Some("café 😀"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = Payload::parse("{\n  \"a\": }").unwrap_err();
        assert!(matches!(err, ModelError::PayloadSyntax(_)));
        assert!(Payload::parse("[1, 2").is_err());
        assert!(Payload::parse("\"open").is_err());
        assert!(Payload::parse("1 2").is_err());
        assert!(Payload::parse("Nope").is_err());
        assert!(Payload::parse("").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        let err = Payload::parse(&deep).unwrap_err();
        let expected = format!("nesting exceeds {MAX_DEPTH} levels");
        assert!(err.to_string().contains(&expected), "{err}");

        let shallow = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(Payload::parse(&shallow).is_ok());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let payload = Payload::parse(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(payload.get("a").and_then(Payload::as_f64), Some(2.0));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Payload::Null.is_truthy());
        assert!(!Payload::from("").is_truthy());
        assert!(!Payload::from(0.0).is_truthy());
        assert!(!Payload::from(f64::NAN).is_truthy());
        assert!(Payload::from("text").is_truthy());
        assert!(Payload::Object(Vec::new()).is_truthy());
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Number::Float(3.0).to_string(), "3");
        assert_eq!(Number::Float(72.5).to_string(), "72.5");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Number::NegInt(-4).to_string(), "-4");
    }

    #[test]
    fn test_serialize_round_trip_through_serde_json() {
        let payload = Payload::parse(r#"{"z": true, "a": [2.5, "s", NaN]}"#).unwrap();
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(text, r#"{"z":true,"a":[2.5,"s",null]}"#);
    }
}
