use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;

use graft_utils::hash::hashbrown::HashMap as HashbrownMap;

use crate::callback::Callback;
use crate::error::ValueError;
use crate::value::{Array, Number, Object, Record, Value, ValueKind};

// -----------------------------------------------------------------------------
// Traits

/// Converts a field into a [`Value`] for serialization.
///
/// Composite Rust values (`Vec`, maps) produce fresh handles on every call;
/// use the handle types directly for fields whose identity matters.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Builds a field from a revived [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

#[inline]
fn mismatch(expected: ValueKind, found: &Value) -> ValueError {
    ValueError::Kind {
        expected,
        found: found.kind(),
    }
}

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(v) => Value::Number(Number::Int(v)),
                        // Only unsigned values above `i64::MAX` get here.
                        Err(_) => Value::Number(Number::from_u64(*self as u64)),
                    }
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Number(n) => n
                            .as_i128()
                            .and_then(|v| <$ty>::try_from(v).ok())
                            .ok_or(ValueError::OutOfRange {
                                value: n,
                                target: stringify!($ty),
                            }),
                        other => Err(mismatch(ValueKind::Number, &other)),
                    }
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::Number(Number::Float(*self as f64))
                }
            }

            impl FromValue for $ty {
                #[inline]
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Number(n) => Ok(n.as_f64() as $ty),
                        other => Err(mismatch(ValueKind::Number, &other)),
                    }
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl ToValue for bool {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(ValueKind::Bool, &other)),
        }
    }
}

impl ToValue for Number {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

impl FromValue for Number {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Number(v) => Ok(v),
            other => Err(mismatch(ValueKind::Number, &other)),
        }
    }
}

impl ToValue for String {
    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch(ValueKind::String, &other)),
        }
    }
}

// -----------------------------------------------------------------------------
// Handles

impl ToValue for Value {
    #[inline]
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

macro_rules! impl_handle {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::$ty(self.clone())
                }
            }

            impl FromValue for $ty {
                #[inline]
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$ty(v) => Ok(v),
                        other => Err(mismatch(ValueKind::$kind, &other)),
                    }
                }
            }
        )*
    };
}

impl_handle! {
    Array => Array,
    Record => Record,
    Object => Object,
    Callback => Callback,
}

// -----------------------------------------------------------------------------
// Containers

impl<T: ToValue> ToValue for Option<T> {
    #[inline]
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::array(self.iter().map(ToValue::to_value))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Array(array) => {
                let items = array.borrow().clone();
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(mismatch(ValueKind::Array, &other)),
        }
    }
}

fn record_entries(value: Value) -> Result<Vec<(String, Value)>, ValueError> {
    match value {
        Value::Record(record) => Ok(record
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        other => Err(mismatch(ValueKind::Record, &other)),
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::record(self.iter().map(|(k, v)| (k.clone(), v.to_value())))
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        record_entries(value)?
            .into_iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
            .collect()
    }
}

impl<T: ToValue, S> ToValue for HashbrownMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::record(self.iter().map(|(k, v)| (k.clone(), v.to_value())))
    }
}

impl<T: FromValue, S: BuildHasher + Default> FromValue for HashbrownMap<String, T, S> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        record_entries(value)?
            .into_iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
            .collect()
    }
}

impl<T: ToValue, S> ToValue for std::collections::HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::record(self.iter().map(|(k, v)| (k.clone(), v.to_value())))
    }
}

impl<T: FromValue, S: BuildHasher + Default> FromValue
    for std::collections::HashMap<String, T, S>
{
    fn from_value(value: Value) -> Result<Self, ValueError> {
        record_entries(value)?
            .into_iter()
            .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{FromValue, ToValue};
    use crate::error::ValueError;
    use crate::value::{Number, Value, ValueKind};

    #[test]
    fn integers_check_range() {
        assert_eq!(u8::from_value(Value::from(200_i64)), Ok(200));
        assert_eq!(
            u8::from_value(Value::from(300_i64)),
            Err(ValueError::OutOfRange {
                value: Number::Int(300),
                target: "u8",
            }),
        );
        assert_eq!(i32::from_value(Value::from(4.0)), Ok(4));
        assert!(i32::from_value(Value::from(4.5)).is_err());
    }

    #[test]
    fn kind_mismatch() {
        assert_eq!(
            String::from_value(Value::Bool(true)),
            Err(ValueError::Kind {
                expected: ValueKind::String,
                found: ValueKind::Bool,
            }),
        );
    }

    #[test]
    fn option_and_vec() {
        let none: Option<i32> = None;
        assert!(none.to_value().is_null());
        assert_eq!(Option::<i32>::from_value(Value::Null), Ok(None));

        let list = vec![1_u32, 2, 3].to_value();
        assert_eq!(list.as_array().map(|a| a.len()), Some(3));
        assert_eq!(Vec::<u32>::from_value(list), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn vec_of_vec_builds_fresh_handles() {
        let source = vec![vec![1_i64], vec![2_i64]];
        let a = source.to_value();
        let b = source.to_value();

        let (a, b) = (a.as_array().unwrap(), b.as_array().unwrap());
        assert!(!a.ptr_eq(b));
        let (a0, b0) = (a.get(0).unwrap(), b.get(0).unwrap());
        assert!(!a0.as_array().unwrap().ptr_eq(b0.as_array().unwrap()));

        assert_eq!(
            Vec::<Vec<i64>>::from_value(Value::Array(a.clone())),
            Ok(source),
        );
    }

    #[test]
    fn unsigned_above_i64() {
        let value = u64::MAX.to_value();
        assert!(matches!(value, Value::Number(Number::UInt(u64::MAX))));
        assert_eq!(u64::from_value(value.clone()), Ok(u64::MAX));
        assert!(i64::from_value(value).is_err());

        assert!(matches!(1_u64.to_value(), Value::Number(Number::Int(1))));
        assert_eq!(u64::from_value(Value::from(-1_i64)).ok(), None);
    }
}
