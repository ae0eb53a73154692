//! Value marshalling between application values and database wire values.
//!
//! Conversion is keyed by the semantic [`FieldType`] the schema layer
//! declares for a column, plus a per-dialect [`Marshaller`] that fixes the
//! wire encodings a database expects (timestamp text format, how integers
//! wider than 64 bits travel).
//!
//! For every scalar type `from_database(to_database(v)) == v`, except that
//! timestamps are carried with millisecond precision.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::{QuarryError, QuarryResult};

/// Semantic scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    String,
    Boolean,
    Int,
    Float,
    Decimal,
    BigInt,
    DateTime,
    Json,
    Blob,
}

impl ScalarType {
    pub const ALL: [ScalarType; 9] = [
        ScalarType::String,
        ScalarType::Boolean,
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::Decimal,
        ScalarType::BigInt,
        ScalarType::DateTime,
        ScalarType::Json,
        ScalarType::Blob,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Decimal => "decimal",
            ScalarType::BigInt => "bigInt",
            ScalarType::DateTime => "dateTime",
            ScalarType::Json => "json",
            ScalarType::Blob => "blob",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScalarType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| QuarryError::Config(format!("unknown field type '{}'", s)))
    }
}

/// Declared type of a field: a scalar, optionally as an array of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldType {
    pub scalar: ScalarType,
    #[serde(default)]
    pub is_array: bool,
}

impl FieldType {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self {
            scalar,
            is_array: false,
        }
    }

    pub fn array_of(scalar: ScalarType) -> Self {
        Self {
            scalar,
            is_array: true,
        }
    }
}

impl From<ScalarType> for FieldType {
    fn from(scalar: ScalarType) -> Self {
        FieldType::scalar(scalar)
    }
}

/// Text format of timestamps on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeFormat {
    /// `2023-01-01T12:00:00.000Z`
    Iso8601,
    /// `2023-01-01 12:00:00.000`, interpreted as UTC
    MySql,
}

/// Wire form of `bigInt` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BigIntWire {
    /// Always a decimal string.
    DecimalString,
    /// Native integer when the value fits in i64, decimal string otherwise.
    NativeWhenFits,
}

/// Dialect-specific marshalling rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marshaller {
    pub datetime: DateTimeFormat,
    pub bigint: BigIntWire,
}

impl Marshaller {
    /// Convert an application value into the value sent to the database.
    pub fn to_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if field.is_array {
            return map_array(value, field.scalar, |v| self.scalar_to_database(v, field.scalar));
        }
        self.scalar_to_database(value, field.scalar)
    }

    /// Convert a value read from the database into its application form.
    pub fn from_database(&self, value: &Value, field: FieldType) -> QuarryResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if field.is_array {
            return map_array(value, field.scalar, |v| self.scalar_from_database(v, field.scalar));
        }
        self.scalar_from_database(value, field.scalar)
    }

    fn scalar_to_database(&self, value: &Value, scalar: ScalarType) -> QuarryResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match scalar {
            ScalarType::String => Ok(value.clone()),
            ScalarType::Boolean => coerce_bool(value).map(Value::Bool),
            ScalarType::Int => coerce_int(value).map(Value::Int),
            ScalarType::Float => coerce_float(value).map(Value::Float),
            ScalarType::Decimal => coerce_decimal(value).map(Value::Decimal),
            ScalarType::BigInt => {
                let n = coerce_bigint(value)?;
                Ok(match (self.bigint, i64::try_from(n)) {
                    (BigIntWire::NativeWhenFits, Ok(small)) => Value::Int(small),
                    _ => Value::String(n.to_string()),
                })
            }
            ScalarType::DateTime => match value {
                // Already serialized upstream: not re-validated here.
                Value::String(_) => Ok(value.clone()),
                other => self.format_datetime(&coerce_datetime(other)?).map(Value::String),
            },
            ScalarType::Json => match value {
                Value::Json(doc) if doc.is_object() || doc.is_array() => {
                    Ok(Value::String(serde_json::to_string(doc)?))
                }
                other => Ok(other.clone()),
            },
            ScalarType::Blob => match value {
                Value::Bytes(_) => Ok(value.clone()),
                Value::String(s) => Ok(Value::Bytes(s.as_bytes().to_vec())),
                other => Err(mismatch(scalar, other)),
            },
        }
    }

    fn scalar_from_database(&self, value: &Value, scalar: ScalarType) -> QuarryResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match scalar {
            ScalarType::String => match value {
                Value::Bytes(b) => String::from_utf8(b.clone())
                    .map(Value::String)
                    .map_err(|e| QuarryError::marshalling(scalar, format!("invalid UTF-8: {}", e))),
                other => Ok(other.clone()),
            },
            ScalarType::Boolean => coerce_bool(value).map(Value::Bool),
            ScalarType::Int => coerce_int(value).map(Value::Int),
            ScalarType::Float => coerce_float(value).map(Value::Float),
            ScalarType::Decimal => coerce_decimal(value).map(Value::Decimal),
            ScalarType::BigInt => coerce_bigint(value).map(Value::BigInt),
            ScalarType::DateTime => coerce_datetime(value).map(Value::DateTime),
            ScalarType::Json => match value {
                Value::String(text) => Ok(serde_json::from_str(text)
                    .map(Value::Json)
                    .unwrap_or_else(|_| value.clone())),
                other => Ok(other.clone()),
            },
            ScalarType::Blob => match value {
                Value::Bytes(_) => Ok(value.clone()),
                Value::String(text) => match text.strip_prefix("\\x") {
                    Some(hex_digits) => hex::decode(hex_digits).map(Value::Bytes).map_err(|e| {
                        QuarryError::marshalling(scalar, format!("invalid bytea hex: {}", e))
                    }),
                    None => Ok(Value::Bytes(text.as_bytes().to_vec())),
                },
                other => Err(mismatch(scalar, other)),
            },
        }
    }

    /// Both wire formats carry exactly four year digits.
    fn format_datetime(&self, dt: &DateTime<Utc>) -> QuarryResult<String> {
        if !(0..=9999).contains(&dt.year()) {
            return Err(QuarryError::marshalling(
                ScalarType::DateTime,
                format!("year {} is outside 0000..=9999", dt.year()),
            ));
        }
        Ok(match self.datetime {
            DateTimeFormat::Iso8601 => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            DateTimeFormat::MySql => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        })
    }
}

fn map_array<F>(value: &Value, scalar: ScalarType, convert: F) -> QuarryResult<Value>
where
    F: Fn(&Value) -> QuarryResult<Value>,
{
    match value {
        Value::Array(items) => items
            .iter()
            .map(convert)
            .collect::<QuarryResult<Vec<_>>>()
            .map(Value::Array),
        other => Err(QuarryError::marshalling(
            scalar,
            format!("expected an array, got {}", other.kind()),
        )),
    }
}

fn mismatch(scalar: ScalarType, value: &Value) -> QuarryError {
    QuarryError::marshalling(scalar, format!("cannot coerce {} value {}", value.kind(), value))
}

fn coerce_bool(value: &Value) -> QuarryResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(mismatch(ScalarType::Boolean, value)),
        },
        other => Err(mismatch(ScalarType::Boolean, other)),
    }
}

fn coerce_int(value: &Value) -> QuarryResult<i64> {
    let scalar = ScalarType::Int;
    match value {
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::BigInt(n) => i64::try_from(*n).map_err(|_| mismatch(scalar, value)),
        // `i64::MAX as f64` is 2^63, one past the largest i64.
        Value::Float(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) => {
            Ok(*f as i64)
        }
        Value::Decimal(d) if d.fract().is_zero() => {
            d.to_i64().ok_or_else(|| mismatch(scalar, value))
        }
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(scalar, value)),
        other => Err(mismatch(scalar, other)),
    }
}

fn coerce_float(value: &Value) -> QuarryResult<f64> {
    let scalar = ScalarType::Float;
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(n) => exact_f64(i128::from(*n)).ok_or_else(|| mismatch(scalar, value)),
        Value::BigInt(n) => exact_f64(*n).ok_or_else(|| mismatch(scalar, value)),
        Value::Decimal(d) => d.to_f64().ok_or_else(|| mismatch(scalar, value)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(scalar, value)),
        other => Err(mismatch(scalar, other)),
    }
}

/// `n` as a float, if the float converts back to the same integer.
fn exact_f64(n: i128) -> Option<f64> {
    let f = n as f64;
    // i128::MAX rounds up to 2^127, which saturates back to i128::MAX.
    (f < i128::MAX as f64 && f as i128 == n).then_some(f)
}

fn coerce_decimal(value: &Value) -> QuarryResult<Decimal> {
    let scalar = ScalarType::Decimal;
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Int(n) => Ok(Decimal::from(*n)),
        Value::BigInt(n) => Decimal::try_from(*n).map_err(|_| mismatch(scalar, value)),
        Value::Float(f) => Decimal::try_from(*f).map_err(|_| mismatch(scalar, value)),
        Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| mismatch(scalar, value)),
        other => Err(mismatch(scalar, other)),
    }
}

fn coerce_bigint(value: &Value) -> QuarryResult<i128> {
    let scalar = ScalarType::BigInt;
    match value {
        Value::BigInt(n) => Ok(*n),
        Value::Int(n) => Ok(i128::from(*n)),
        Value::Decimal(d) if d.fract().is_zero() => {
            d.to_i128().ok_or_else(|| mismatch(scalar, value))
        }
        Value::String(s) => s.trim().parse().map_err(|_| mismatch(scalar, value)),
        other => Err(mismatch(scalar, other)),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff][+zz]`, naive text as UTC,
/// and integers as Unix milliseconds.
fn coerce_datetime(value: &Value) -> QuarryResult<DateTime<Utc>> {
    let scalar = ScalarType::DateTime;
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::Int(ms) => {
            DateTime::from_timestamp_millis(*ms).ok_or_else(|| mismatch(scalar, value))
        }
        Value::String(s) => parse_datetime(s.trim()).ok_or_else(|| {
            QuarryError::marshalling(scalar, format!("not a timestamp: '{}'", s))
        }),
        other => Err(mismatch(scalar, other)),
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const ISO: Marshaller = Marshaller {
        datetime: DateTimeFormat::Iso8601,
        bigint: BigIntWire::DecimalString,
    };
    const MYSQL: Marshaller = Marshaller {
        datetime: DateTimeFormat::MySql,
        bigint: BigIntWire::DecimalString,
    };
    const NATIVE: Marshaller = Marshaller {
        datetime: DateTimeFormat::Iso8601,
        bigint: BigIntWire::NativeWhenFits,
    };

    fn samples() -> Vec<(Value, ScalarType)> {
        vec![
            (Value::from("hello"), ScalarType::String),
            (Value::Bool(true), ScalarType::Boolean),
            (Value::Int(42), ScalarType::Int),
            (Value::Float(3.14), ScalarType::Float),
            (Value::Decimal(Decimal::new(1999, 2)), ScalarType::Decimal),
            (Value::BigInt(123456789012345678901), ScalarType::BigInt),
            (
                Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()),
                ScalarType::DateTime,
            ),
            (Value::Json(serde_json::json!({"a": 1})), ScalarType::Json),
            (Value::Bytes(vec![0, 1, 2, 254, 255]), ScalarType::Blob),
        ]
    }

    #[test]
    fn test_round_trip_every_scalar() {
        for m in [ISO, MYSQL, NATIVE] {
            for (value, scalar) in samples() {
                let field = FieldType::scalar(scalar);
                let wire = m.to_database(&value, field).unwrap();
                let back = m.from_database(&wire, field).unwrap();
                assert_eq!(back, value, "{} via {:?}", scalar, wire);
            }
        }
    }

    #[test]
    fn test_datetime_wire_format() {
        let dt = Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());
        let field = FieldType::scalar(ScalarType::DateTime);
        assert_eq!(
            ISO.to_database(&dt, field).unwrap(),
            Value::from("2023-01-01T12:00:00.000Z")
        );
        assert_eq!(
            MYSQL.to_database(&dt, field).unwrap(),
            Value::from("2023-01-01 12:00:00.000")
        );
        // Strings pass through untouched.
        assert_eq!(
            ISO.to_database(&Value::from("whenever"), field).unwrap(),
            Value::from("whenever")
        );
    }

    #[test]
    fn test_datetime_precision_is_millis() {
        let precise = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::microseconds(1_234_567);
        let field = FieldType::scalar(ScalarType::DateTime);
        let wire = ISO.to_database(&Value::DateTime(precise), field).unwrap();
        assert_eq!(wire, Value::from("2023-01-01T12:00:01.234Z"));
    }

    #[test]
    fn test_datetime_from_postgres_text() {
        let field = FieldType::scalar(ScalarType::DateTime);
        let expected = Value::DateTime(Utc.with_ymd_and_hms(2024, 12, 25, 17, 30, 0).unwrap());
        for text in ["2024-12-25 17:30:00+00", "2024-12-25 17:30:00", "2024-12-25T17:30:00Z"] {
            assert_eq!(ISO.from_database(&Value::from(text), field).unwrap(), expected);
        }
    }

    #[test]
    fn test_bigint_wire() {
        let field = FieldType::scalar(ScalarType::BigInt);
        assert_eq!(
            ISO.to_database(&Value::BigInt(7), field).unwrap(),
            Value::from("7")
        );
        assert_eq!(
            NATIVE.to_database(&Value::BigInt(7), field).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            NATIVE.to_database(&Value::BigInt(i128::from(i64::MAX) + 1), field).unwrap(),
            Value::from("9223372036854775808")
        );
    }

    #[test]
    fn test_json_scalars_pass_through() {
        let field = FieldType::scalar(ScalarType::Json);
        assert_eq!(
            ISO.to_database(&Value::from("plain"), field).unwrap(),
            Value::from("plain")
        );
        assert_eq!(
            ISO.from_database(&Value::from("{not json"), field).unwrap(),
            Value::from("{not json")
        );
    }

    #[test]
    fn test_arrays_convert_element_wise() {
        let field = FieldType::array_of(ScalarType::BigInt);
        let value = Value::Array(vec![Value::BigInt(1), Value::Null, Value::BigInt(2)]);
        let wire = ISO.to_database(&value, field).unwrap();
        assert_eq!(
            wire,
            Value::Array(vec![Value::from("1"), Value::Null, Value::from("2")])
        );
        assert_eq!(ISO.from_database(&wire, field).unwrap(), value);
        assert!(ISO.to_database(&Value::BigInt(1), field).is_err());
    }

    #[test]
    fn test_bytea_hex_text() {
        let field = FieldType::scalar(ScalarType::Blob);
        assert_eq!(
            ISO.from_database(&Value::from("\\xdeadbeef"), field).unwrap(),
            Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert!(ISO.from_database(&Value::from("\\xzz"), field).is_err());
    }

    #[test]
    fn test_uncoercible_values_surface() {
        let err = ISO
            .to_database(&Value::from("maybe"), FieldType::scalar(ScalarType::Boolean))
            .unwrap_err();
        assert!(matches!(
            err,
            QuarryError::Marshalling { field_type: ScalarType::Boolean, .. }
        ));
        assert!(ISO
            .to_database(&Value::from("forty"), FieldType::scalar(ScalarType::Int))
            .is_err());
        assert!(ISO
            .to_database(&Value::Bool(true), FieldType::scalar(ScalarType::Blob))
            .is_err());
    }

    #[test]
    fn test_lossy_numbers_are_rejected() {
        let int = FieldType::scalar(ScalarType::Int);
        let float = FieldType::scalar(ScalarType::Float);
        for f in [1e20, -1e20, 9_223_372_036_854_775_808.0, f64::INFINITY, f64::NAN] {
            assert!(ISO.to_database(&Value::Float(f), int).is_err(), "{}", f);
        }
        assert_eq!(
            ISO.to_database(&Value::Float(-9_223_372_036_854_775_808.0), int).unwrap(),
            Value::Int(i64::MIN)
        );
        assert_eq!(ISO.to_database(&Value::Float(42.0), int).unwrap(), Value::Int(42));

        assert!(ISO.to_database(&Value::Int(i64::MAX), float).is_err());
        assert!(ISO.to_database(&Value::Int((1 << 53) + 1), float).is_err());
        assert!(ISO.to_database(&Value::BigInt(i128::MAX), float).is_err());
        assert!(ISO.to_database(&Value::BigInt(123456789012345678901), float).is_err());
        assert_eq!(
            ISO.to_database(&Value::Int(1 << 53), float).unwrap(),
            Value::Float(9_007_199_254_740_992.0)
        );
        assert_eq!(ISO.to_database(&Value::BigInt(-7), float).unwrap(), Value::Float(-7.0));
    }

    #[test]
    fn test_datetime_year_must_fit_four_digits() {
        let field = FieldType::scalar(ScalarType::DateTime);
        let far = Value::DateTime(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap());
        for m in [ISO, MYSQL] {
            assert!(matches!(
                m.to_database(&far, field),
                Err(QuarryError::Marshalling { field_type: ScalarType::DateTime, .. })
            ));
        }
        let last = Value::DateTime(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());
        let wire = ISO.to_database(&last, field).unwrap();
        assert_eq!(wire, Value::from("9999-12-31T23:59:59.000Z"));
        assert_eq!(ISO.from_database(&wire, field).unwrap(), last);
    }

    #[test]
    fn test_scalar_type_names() {
        assert_eq!("bigInt".parse::<ScalarType>().unwrap(), ScalarType::BigInt);
        assert_eq!("DATETIME".parse::<ScalarType>().unwrap(), ScalarType::DateTime);
        assert_eq!(
            serde_json::to_string(&ScalarType::DateTime).unwrap(),
            "\"dateTime\""
        );
        assert!("uuid".parse::<ScalarType>().is_err());
    }
}
