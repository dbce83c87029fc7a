//! Parameter values and their Oracle bind form.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use sqljson_core::ast::Value;

use crate::error::OracleError;

/// Strings longer than this many bytes must be bound as CLOB.
pub const MAX_VARCHAR_BYTES: usize = 4000;

/// Bind type hint passed to the driver before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSize {
    Clob,
    NClob,
    Blob,
    Timestamp,
    Number,
    Varchar(u32),
}

/// Handle to a variable the driver created itself (for example an out bind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverVariable(pub u32);

/// A statement parameter as the caller supplies it.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Binary(Vec<u8>),
    /// Timestamp without a zone.
    Timestamp(NaiveDateTime),
    /// Timestamp with a UTC offset.
    TimestampTz(DateTime<FixedOffset>),
    Duration(Duration),
    /// Passed to the driver untouched.
    Variable(DriverVariable),
    /// A value carrying its own input size.
    Sized(Box<Param>, InputSize),
}

impl Param {
    pub fn sized(param: Param, size: InputSize) -> Self {
        Param::Sized(Box::new(param), size)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Text(s)
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Int(n)
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<f64> for Param {
    fn from(f: f64) -> Self {
        Param::Float(f)
    }
}

impl From<Decimal> for Param {
    fn from(d: Decimal) -> Self {
        Param::Decimal(d)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl TryFrom<&Value> for Param {
    type Error = OracleError;

    /// Parameters of compiled lookups. Text arrays only exist for PostgreSQL.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(*b),
            Value::Int(n) => Param::Int(*n),
            Value::Float(f) => Param::Float(*f),
            Value::String(s) | Value::Json(s) => Param::Text(s.clone()),
            Value::Array(_) => {
                return Err(OracleError::params("array parameters cannot be bound on Oracle"));
            }
        })
    }
}

/// A value in the form the driver binds.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Binary(Vec<u8>),
    Timestamp(NaiveDateTime),
    Interval(Duration),
    Variable(DriverVariable),
}

/// A parameter converted for Oracle, with its optional input size.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleParam {
    pub value: BindValue,
    pub input_size: Option<InputSize>,
}

impl OracleParam {
    /// Convert `param`.
    ///
    /// Booleans become 0/1. With `use_tz` an offset timestamp is moved to UTC;
    /// without it the local wall time is kept.
    pub fn new(param: &Param, use_tz: bool) -> Self {
        let value = match param {
            Param::Sized(inner, size) => {
                return Self {
                    value: Self::new(inner, use_tz).value,
                    input_size: Some(*size),
                };
            }
            Param::Null => BindValue::Null,
            Param::Bool(b) => BindValue::Int(i64::from(*b)),
            Param::Int(n) => BindValue::Int(*n),
            Param::Float(f) => BindValue::Float(*f),
            Param::Decimal(d) => BindValue::Decimal(*d),
            Param::Text(s) => BindValue::Text(s.clone()),
            Param::Binary(b) => BindValue::Binary(b.clone()),
            Param::Timestamp(ts) => BindValue::Timestamp(*ts),
            Param::TimestampTz(ts) if use_tz => BindValue::Timestamp(ts.naive_utc()),
            Param::TimestampTz(ts) => BindValue::Timestamp(ts.naive_local()),
            Param::Duration(d) => BindValue::Interval(*d),
            Param::Variable(v) => BindValue::Variable(*v),
        };

        let input_size = match &value {
            BindValue::Text(s) if s.len() > MAX_VARCHAR_BYTES => Some(InputSize::Clob),
            BindValue::Timestamp(_) => Some(InputSize::Timestamp),
            _ => None,
        };

        Self { value, input_size }
    }
}
