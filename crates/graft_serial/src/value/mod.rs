//! The live object graph walked by the serializer and built by the reviver.
//!
//! Scalars are stored inline. Composite values are shared handles
//! ([`Array`], [`Record`], [`Object`]) so that aliasing and cycles in a
//! graph are observable through [`ptr_eq`](Array::ptr_eq).
//!
//! ## Menu
//!
//! - [`Value`]: one slot of the graph.
//! - [`Number`]: integer or float, compared numerically.
//! - [`Array`] / [`Record`] / [`Object`]: shared handles.
//! - [`ToValue`] / [`FromValue`]: conversions used by derived field accessors.
//! - [`Value::structural_eq`]: cycle-aware graph comparison.

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod handle;
mod structural;

// -----------------------------------------------------------------------------
// Exports

pub use convert::{FromValue, ToValue};
pub use handle::{Array, Object, Record};

// -----------------------------------------------------------------------------
// Value

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::Serializable;
use crate::callback::Callback;
use crate::identity::RefId;

/// The kind of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Record,
    Object,
    Callback,
    Pending,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Record => "record",
            ValueKind::Object => "object",
            ValueKind::Callback => "callback",
            ValueKind::Pending => "unresolved reference",
        })
    }
}

/// A number as found in the graph or on the wire.
///
/// Integers and floats compare numerically, so `Int(1) == Float(1.0)`.
/// `UInt` only holds values above `i64::MAX`; anything smaller is an `Int`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    /// An unsigned integer, stored as `Int` when it fits.
    #[inline]
    pub fn from_u64(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Number::Int(v),
            Err(_) => Number::UInt(v),
        }
    }

    /// The exact integer value, if there is one.
    ///
    /// Floats qualify when they have no fractional part and lie within
    /// `i64::MIN..=u64::MAX`.
    pub fn as_i128(self) -> Option<i128> {
        match self {
            Number::Int(v) => Some(v as i128),
            Number::UInt(v) => Some(v as i128),
            Number::Float(v) => {
                // 2^64 is exactly representable; u64::MAX is not.
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v < 18_446_744_073_709_551_616.0 {
                    Some(v as i128)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the value as `i64` if it is an integer, or a float without
    /// fractional part that fits.
    #[inline]
    pub fn as_i64(self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Returns the value as `u64` if it is a non-negative integer, or a
    /// float without fractional part that fits.
    #[inline]
    pub fn as_u64(self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Float(a), b) | (b, Number::Float(a)) => a == b.as_f64(),
            (a, b) => a.as_i128() == b.as_i128(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => fmt::Display::fmt(v, f),
            Number::UInt(v) => fmt::Display::fmt(v, f),
            Number::Float(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// One slot of a live object graph.
///
/// [`Value::Pending`] is an unresolved reference left by the first revive
/// pass. It is only observable from hooks while a revive call is running;
/// a completed revive never returns one.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Array),
    Record(Record),
    Object(Object),
    Callback(Callback),
    Pending(RefId),
}

impl Value {
    /// Wraps `value` in a new [`Object`] handle.
    #[inline]
    pub fn object<T: Serializable>(value: T) -> Self {
        Value::Object(Object::new(value))
    }

    /// Builds a new [`Array`] handle from `items`.
    #[inline]
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Array::from_vec(items.into_iter().collect()))
    }

    /// Builds a new [`Record`] handle from `entries`.
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let record = Record::new();
        for (key, value) in entries {
            record.insert(key, value);
        }
        Value::Record(record)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Record(_) => ValueKind::Record,
            Value::Object(_) => ValueKind::Object,
            Value::Callback(_) => ValueKind::Callback,
            Value::Pending(_) => ValueKind::Pending,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(v) => Some(v),
            _ => None,
        }
    }

    /// Compares two graphs field by field.
    ///
    /// Scalars compare by value, arrays element-wise, records key-wise and
    /// objects by concrete type and then by every schema field. Cycles are
    /// handled: a pair of handles already under comparison is assumed equal.
    ///
    /// Unlike `==`, two distinct handles with the same content are equal.
    pub fn structural_eq(a: &Value, b: &Value) -> bool {
        structural::Comparer::default().eq(a, b)
    }
}

/// Scalars compare by value, handles by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Callback(a), Value::Callback(b)) => a == b,
            (Value::Pending(a), Value::Pending(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    Number => Number,
    String => String,
    Array => Array,
    Record => Record,
    Object => Object,
    Callback => Callback,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(value: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(value))
    }
}
