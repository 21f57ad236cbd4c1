//! [`Value`] — the universal interchange type the codec operates over.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// An application-defined wire type: a one-byte type code plus an opaque
/// payload. Unregistered codes decode to this form losslessly so they can
/// be re-encoded unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub code: u8,
    pub payload: Vec<u8>,
}

impl Extension {
    pub fn new(code: u8, payload: Vec<u8>) -> Self {
        Self { code, payload }
    }
}

/// Universal value type spanning every wire type of the format.
///
/// - `Str` holds known-textual data; `Bin` holds raw bytes whose semantic
///   intent is unknown, so the encoder resolves them through the active
///   [`StrBinMode`](crate::StrBinMode).
/// - `Map` preserves insertion order and does not force key uniqueness;
///   the encoder resolves its list-vs-dictionary ambiguity through the
///   active [`ArrMapMode`](crate::ArrMapMode).
/// - `UInt` materializes decoded integers above `i64::MAX` when the
///   bigint policy requests unsigned representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float64(f64),
    Str(String),
    Bin(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Extension(Extension),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(f) => Some(*f as f64),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Looks up the value for a string key in a `Map`, first match wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
            .map(|(_, v)| v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(u),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bin(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float64(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::json!(i),
            Value::UInt(u) => serde_json::json!(u),
            Value::Float32(f) => serde_json::json!(f),
            Value::Float64(f) => serde_json::json!(f),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Bin(b) => serde_json::Value::String(format!(
                "data:application/octet-stream;base64,{}",
                BASE64.encode(&b)
            )),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(pairs) => serde_json::Value::Object(
                pairs
                    .into_iter()
                    .map(|(k, v)| (json_key(k), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Extension(ext) => serde_json::json!({
                "ext": ext.code,
                "payload": BASE64.encode(&ext.payload),
            }),
        }
    }
}

/// Renders a map key for JSON, which only admits string keys.
fn json_key(key: Value) -> String {
    match key {
        Value::Str(s) => s,
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Nil => "null".to_owned(),
        other => serde_json::Value::from(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_value_into_map() {
        let json = serde_json::json!({"a": 1, "b": [true, null]});
        let value = Value::from(json);
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::Str("a".into()), Value::Int(1)),
                (
                    Value::Str("b".into()),
                    Value::Array(vec![Value::Bool(true), Value::Nil]),
                ),
            ])
        );
    }

    #[test]
    fn test_bin_renders_as_data_uri() {
        let json = serde_json::Value::from(Value::Bin(vec![0x01, 0x02]));
        assert_eq!(
            json,
            serde_json::Value::String("data:application/octet-stream;base64,AQI=".into())
        );
    }

    #[test]
    fn test_integer_keys_stringified() {
        let value = Value::Map(vec![(Value::Int(7), Value::Bool(true))]);
        let json = serde_json::Value::from(value);
        assert_eq!(json, serde_json::json!({"7": true}));
    }

    #[test]
    fn test_get_first_match() {
        let value = Value::Map(vec![
            (Value::Str("k".into()), Value::Int(1)),
            (Value::Str("k".into()), Value::Int(2)),
        ]);
        assert_eq!(value.get("k"), Some(&Value::Int(1)));
        assert_eq!(value.get("missing"), None);
    }

    #[test]
    fn test_u64_from_fits_signed() {
        assert_eq!(Value::from(5u64), Value::Int(5));
        assert_eq!(Value::from(u64::MAX), Value::UInt(u64::MAX));
    }
}
