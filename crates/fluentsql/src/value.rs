//! Parameter and column values.
//!
//! `Value` is the executor-facing representation of everything that travels
//! through a statement: bound parameters, `IN` literal lists and decoded
//! result columns. The kind set is fixed (integer, double, boolean, bytes,
//! text, timestamp) plus `Null`; nullable columns map to `Option<T>`.

use chrono::{NaiveDateTime, SubsecRound};
use std::fmt;
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single SQL value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// SQL NULL. `eq`/`ne` against it compile to `IS NULL`/`IS NOT NULL`.
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    Timestamp(NaiveDateTime),
    /// Operand of an `IN` leaf; rendered inline, never bound.
    List(Vec<Value>),
}

/// Conversion failure between a [`Value`] and a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("cannot convert {found} to {expected}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("cannot parse '{value}' as {target}")]
    Parse { target: &'static str, value: String },

    #[error("column not present in result")]
    Missing,

    #[error("unsupported column type {0}")]
    UnsupportedType(String),
}

impl Value {
    /// Build a list value for `IN` leaves.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    /// Whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short kind name used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Bool(_) => "boolean",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    /// Render as an inline SQL literal in the neutral form.
    ///
    /// Text is single-quoted with embedded quotes doubled. Returns `None` for
    /// nested lists, which have no literal form.
    pub fn to_literal(&self) -> Option<String> {
        let lit = match self {
            Value::Null => "NULL".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => if *v { "1" } else { "0" }.to_string(),
            Value::Bytes(v) => format!("X'{}'", hex(v)),
            Value::Text(v) => quote_text(v),
            // SQL Server and MySQL literals take at most six fractional digits
            Value::Timestamp(v) => format!("'{}'", v.trunc_subsecs(6).format(TIMESTAMP_FORMAT)),
            Value::List(_) => return None,
        };
        Some(lit)
    }

    /// Convert into `T`.
    pub fn get<T: FromValue>(&self) -> Result<T, ValueError> {
        T::from_value(self)
    }
}

/// Single-quote `text`, doubling embedded quotes.
pub(crate) fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Lowercase hex encoding of `bytes`.
pub(crate) fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "0x{}", hex(v)),
            Value::Text(v) => f.write_str(v),
            Value::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

// ==================== Into<Value> ====================

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ==================== FromValue ====================

/// Conversion from a decoded column value.
///
/// Implemented for the fixed kind set, the narrowed `i32`/`f32` variants and
/// `Option<T>` of each (the nullable wrappers).
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ValueError {
    ValueError::Mismatch {
        expected,
        found: value.kind(),
    }
}

fn parse_err(target: &'static str, text: &str) -> ValueError {
    ValueError::Parse {
        target,
        value: text.to_string(),
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Bool(v) => Ok(i64::from(*v)),
            Value::Text(s) => s.trim().parse().map_err(|_| parse_err("i64", s)),
            other => Err(mismatch("i64", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let wide = i64::from_value(value).map_err(|e| match e {
            ValueError::Mismatch { found, .. } => ValueError::Mismatch {
                expected: "i32",
                found,
            },
            other => other,
        })?;
        i32::try_from(wide).map_err(|_| ValueError::OutOfRange {
            target: "i32",
            value: wide.to_string(),
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Text(s) => s.trim().parse().map_err(|_| parse_err("f64", s)),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let wide = f64::from_value(value).map_err(|e| match e {
            ValueError::Mismatch { found, .. } => ValueError::Mismatch {
                expected: "f32",
                found,
            },
            other => other,
        })?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(ValueError::OutOfRange {
                target: "f32",
                value: wide.to_string(),
            });
        }
        Ok(wide as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(parse_err("bool", s)),
            },
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(v) => Ok(v.clone()),
            Value::Text(s) => Ok(s.clone().into_bytes()),
            other => Err(mismatch("bytes", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Bytes(v) => String::from_utf8(v.clone()).map_err(|_| mismatch("String", value)),
            Value::Null | Value::List(_) => Err(mismatch("String", value)),
            // generic fallback: scalar kinds render as their text form
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            Value::Text(s) => {
                let s = s.trim();
                NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                    .map_err(|_| parse_err("timestamp", s))
            }
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 5))
            .expect("valid timestamp")
    }

    #[test]
    fn test_option_into_null() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn test_text_literal_escapes_quotes() {
        let v = Value::from("O'Brien");
        assert_eq!(v.to_literal().as_deref(), Some("'O''Brien'"));
    }

    #[test]
    fn test_timestamp_literal() {
        let v = Value::from(ts());
        assert_eq!(v.to_literal().as_deref(), Some("'2024-03-01 12:30:05'"));
    }

    #[test]
    fn test_timestamp_literal_caps_fraction_at_micros() {
        let nanos = ts() + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(
            Value::from(nanos).to_literal().as_deref(),
            Some("'2024-03-01 12:30:05.123456'")
        );
        let millis = ts() + chrono::Duration::milliseconds(250);
        assert_eq!(
            Value::from(millis).to_literal().as_deref(),
            Some("'2024-03-01 12:30:05.250'")
        );
    }

    #[test]
    fn test_nested_list_has_no_literal() {
        assert!(Value::list([1, 2]).to_literal().is_none());
    }

    #[test]
    fn test_narrowing_i32() {
        assert_eq!(Value::Int(42).get::<i32>(), Ok(42));
        assert!(matches!(
            Value::Int(i64::MAX).get::<i32>(),
            Err(ValueError::OutOfRange { target: "i32", .. })
        ));
    }

    #[test]
    fn test_narrowing_f32() {
        assert_eq!(Value::Float(1.5).get::<f32>(), Ok(1.5));
        assert!(Value::Float(1e300).get::<f32>().is_err());
    }

    #[test]
    fn test_nullable_wrappers() {
        assert_eq!(Value::Null.get::<Option<String>>(), Ok(None));
        assert_eq!(Value::Int(7).get::<Option<i64>>(), Ok(Some(7)));
        assert_eq!(Value::Null.get::<Option<NaiveDateTime>>(), Ok(None));
        assert!(Value::Null.get::<i64>().is_err());
    }

    #[test]
    fn test_string_fallback() {
        assert_eq!(Value::Int(5).get::<String>(), Ok("5".to_string()));
        assert_eq!(Value::Bool(true).get::<String>(), Ok("true".to_string()));
    }

    #[test]
    fn test_timestamp_from_text() {
        let v = Value::Text("2024-03-01T12:30:05".into());
        assert_eq!(v.get::<NaiveDateTime>(), Ok(ts()));
    }

    #[test]
    fn test_bool_from_int() {
        assert_eq!(Value::Int(1).get::<bool>(), Ok(true));
        assert_eq!(Value::Int(0).get::<bool>(), Ok(false));
    }
}
