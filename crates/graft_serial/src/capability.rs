use alloc::borrow::Cow;
use core::any::Any;

use crate::error::FieldError;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Fields

/// Explicit field schema of a serializable type.
///
/// Usually implemented through [`#[derive(Serializable)]`](crate::derive::Serializable).
/// The schema is the complete list of fields the engine may read or assign;
/// it never includes the reserved wire keys.
pub trait Fields: Any {
    /// The Rust type name, used in diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Wire names of every field, in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Reads the field named `name`, or returns `None` if there is no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Assigns the field named `name`.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), FieldError>;
}

// -----------------------------------------------------------------------------
// Serializable

/// Instance hooks of a type that takes part in serialization.
///
/// Every method has a default, so `impl Serializable for T {}` opts in with
/// the plain behavior: all schema fields are written, and on revive a
/// default instance is created and every field is assigned.
///
/// The static hooks (`from_json`, `construct_args`) are not methods: they
/// are chosen at registration time through [`Factory`](crate::registry::Factory).
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use graft_serial::{Serializable, value::Value};
///
/// #[derive(Serializable, Default)]
/// #[serial(Serializable = false)]
/// struct Piece {
///     name: String,
///     hp: i64,
///     #[serial(skip)]
///     alive: bool,
/// }
///
/// impl Serializable for Piece {
///     fn serialize_keys(&self) -> Cow<'static, [&'static str]> {
///         Cow::Borrowed(&["name"])
///     }
///
///     fn after_revive(&mut self) {
///         self.alive = true;
///     }
/// }
/// ```
pub trait Serializable: Fields {
    /// Keys to write when no [`to_json`](Serializable::to_json) is given.
    ///
    /// Defaults to the whole schema.
    fn serialize_keys(&self) -> Cow<'static, [&'static str]> {
        Cow::Borrowed(self.field_names())
    }

    /// Replaces default field enumeration entirely.
    ///
    /// The returned value must be a [`Value::Record`]; its entries are
    /// written next to the type tag. Returning anything else fails with
    /// [`SerialError::TypeContractViolation`](crate::SerialError::TypeContractViolation).
    fn to_json(&self) -> Option<Value> {
        None
    }

    /// Called once every field of a default-constructed instance has been
    /// assigned and every reference inside them resolved.
    fn after_revive(&mut self) {}
}
