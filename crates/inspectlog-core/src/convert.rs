//! Conversions from ordinary Rust data into [`Value`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::value::{ObjectRef, Value};

/// Largest integer magnitude a double represents exactly.
const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

/// Conversion into an inspectable [`Value`].
pub trait IntoValue {
    /// Builds the value.
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for ObjectRef {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Undefined
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for char {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::String(self.clone())
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Number(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

fn integer(n: i128) -> Value {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) {
        #[allow(clippy::cast_precision_loss)]
        Value::Number(n as f64)
    } else {
        Value::BigInt(n)
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    integer(i128::from(self))
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl IntoValue for usize {
    fn into_value(self) -> Value {
        i128::try_from(self).map_or(Value::Number(f64::INFINITY), integer)
    }
}

impl IntoValue for isize {
    fn into_value(self) -> Value {
        i128::try_from(self).map_or(Value::Number(f64::NAN), integer)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::array(self.into_iter().map(IntoValue::into_value))
    }
}

impl<T: IntoValue + Clone> IntoValue for &[T] {
    fn into_value(self) -> Value {
        Value::array(self.iter().cloned().map(IntoValue::into_value))
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::array(self.into_iter().map(IntoValue::into_value))
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        Value::map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value())),
        )
    }
}

impl<T: IntoValue> IntoValue for BTreeSet<T> {
    fn into_value(self) -> Value {
        Value::set(self.into_iter().map(IntoValue::into_value))
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::date(self)
    }
}

impl IntoValue for &Regex {
    fn into_value(self) -> Value {
        Value::regexp(self.as_str(), "")
    }
}

impl IntoValue for Regex {
    fn into_value(self) -> Value {
        (&self).into_value()
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => json_number(&n),
            Self::String(s) => Value::String(s),
            Self::Array(elements) => Value::array(elements.into_iter().map(IntoValue::into_value)),
            Self::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, v.into_value())))
            }
        }
    }
}

impl IntoValue for &serde_json::Value {
    fn into_value(self) -> Value {
        self.clone().into_value()
    }
}

fn json_number(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        integer(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        integer(i128::from(u))
    } else {
        Value::Number(n.as_f64().unwrap_or(f64::NAN))
    }
}
