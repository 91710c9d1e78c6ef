//! Bound values and value shapes.
//!
//! [`Value`] is what ends up in a [`ParamSet`](crate::ParamSet).
//! [`ConditionValue`] is the shape of the right-hand side of a condition
//! (null, scalar or list), decided when the condition is constructed so the
//! compiler can branch on it exhaustively.

use bytes::BytesMut;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as text the way a loosely-typed driver would.
    ///
    /// Used for LIKE patterns, which are always matched as strings.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }

    /// Convert a JSON scalar. Arrays and objects are not scalars.
    pub fn from_json_scalar(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s:?}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_uint {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                /// Values above `i64::MAX` are bound as their decimal text.
                fn from(v: $t) -> Self {
                    match i64::try_from(v) {
                        Ok(i) => Value::Int(i),
                        Err(_) => Value::Text(v.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_uint!(u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql(ty, out),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    i.to_string().to_sql(ty, out)
                }
                _ => i.to_sql(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                    v.to_string().to_sql(ty, out)
                }
                _ => v.to_sql(ty, out),
            },
            Value::Text(s) => s.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The concrete encoder for each variant rejects types it cannot write.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// The shape of a condition's right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// SQL NULL
    Null,
    /// A single bound value
    Scalar(Value),
    /// A list of bound values (membership, BETWEEN bounds)
    List(Vec<Value>),
}

impl ConditionValue {
    /// Build a list shape from any iterator of convertible values.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        ConditionValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Convert a JSON value, keeping arrays as lists.
    ///
    /// Nested arrays or objects inside a list are rejected.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(ConditionValue::Null),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json_scalar)
                .collect::<Option<Vec<_>>>()
                .map(ConditionValue::List),
            other => Value::from_json_scalar(other).map(ConditionValue::Scalar),
        }
    }

    /// Short description of the shape, used in error messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            ConditionValue::Null => "null",
            ConditionValue::Scalar(_) => "scalar",
            ConditionValue::List(_) => "list",
        }
    }
}

impl From<Value> for ConditionValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => ConditionValue::Null,
            other => ConditionValue::Scalar(other),
        }
    }
}

macro_rules! impl_condition_value_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ConditionValue {
                fn from(v: $t) -> Self {
                    ConditionValue::from(Value::from(v))
                }
            }
        )*
    };
}

impl_condition_value_scalar!(
    i8, i16, i32, i64, u8, u16, u32, u64, usize, bool, f32, f64, &str, String, &String
);

impl<T: Into<Value>> From<Option<T>> for ConditionValue {
    fn from(v: Option<T>) -> Self {
        ConditionValue::from(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for ConditionValue {
    fn from(values: Vec<T>) -> Self {
        ConditionValue::list(values)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for ConditionValue {
    fn from(values: [T; N]) -> Self {
        ConditionValue::list(values)
    }
}
