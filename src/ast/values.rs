use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A runtime value carried by `Literal`/`Parameter` nodes and produced by
/// the marshaller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Float
    Float(f64),
    /// Arbitrary precision decimal
    Decimal(Decimal),
    /// Integer wider than 64 bits, serialized as decimal text
    #[serde(with = "bigint_text")]
    BigInt(i128),
    /// String
    String(String),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// Structured JSON document
    Json(serde_json::Value),
    /// Binary blob
    Bytes(Vec<u8>),
    /// Array of values
    Array(Vec<Value>),
}

/// `i128` as decimal text. Tagged enums buffer their content, and the buffer
/// has no 128-bit integers, so the number travels as a string. Plain JSON
/// numbers are still accepted on input.
mod bigint_text {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(n: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(n)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        deserializer.deserialize_any(BigIntVisitor)
    }

    struct BigIntVisitor;

    impl Visitor<'_> for BigIntVisitor {
        type Value = i128;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer or a decimal integer string")
        }

        fn visit_i64<E: de::Error>(self, n: i64) -> Result<i128, E> {
            Ok(i128::from(n))
        }

        fn visit_u64<E: de::Error>(self, n: u64) -> Result<i128, E> {
            Ok(i128::from(n))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<i128, E> {
            s.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(s), &self))
        }
    }
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::BigInt(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s),
            Value::DateTime(dt) => write!(f, "'{}'", dt.to_rfc3339()),
            Value::Json(j) => write!(f, "{}", j),
            Value::Bytes(b) => write!(f, "\\x{}", hex::encode(b)),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::BigInt(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
