use alloc::string::String;

use thiserror::Error;

use crate::identity::RefId;
use crate::value::{Number, ValueKind};

// -----------------------------------------------------------------------------
// SerialError

/// Error returned by [`Serializer`](crate::ser::Serializer) and
/// [`Reviver`](crate::de::Reviver).
///
/// Every error aborts the whole call; no partial tree or graph is returned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SerialError {
    /// A [`Serializable`](crate::Serializable) instance whose concrete type
    /// has no registry entry was met while serializing.
    #[error("type `{type_name}` is not registered, so it has no type tag")]
    UnresolvedTypeTag { type_name: &'static str },

    /// An array was reached a second time in one serialize call.
    ///
    /// Arrays carry no reference id on the wire, so a cyclic (or shared)
    /// array cannot be represented.
    #[error("array #{ref_id} is reachable more than once; arrays cannot be referenced")]
    CircularArray { ref_id: RefId },

    /// A type tag in the input has no registry entry.
    #[error("cannot find type `{tag}` in registry")]
    UnknownType { tag: String },

    /// A hook returned or consumed a value that breaks the contract of
    /// its type.
    #[error("type `{type_tag}` violates the serializable contract: {reason}")]
    TypeContractViolation { type_tag: String, reason: String },

    /// A reference marker points to an id no node in the input defines.
    #[error("cannot find object with ref id {ref_id}")]
    DanglingReference { ref_id: RefId },

    /// A callback value names an entry the callback registry does not hold.
    #[error("callback `{name}` is not registered")]
    UnknownCallback { name: String },

    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SerialError {
    #[inline]
    pub(crate) fn contract(type_tag: impl Into<String>, reason: impl Into<String>) -> Self {
        SerialError::TypeContractViolation {
            type_tag: type_tag.into(),
            reason: reason.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldError

/// Error returned by [`Fields::set_field`](crate::Fields::set_field).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    Unknown(String),

    #[error("field `{field}`: {source}")]
    Mismatch {
        field: &'static str,
        source: ValueError,
    },
}

// -----------------------------------------------------------------------------
// ValueError

/// A [`Value`](crate::value::Value) could not be converted into a field type.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Kind {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{value} is out of range for `{target}`")]
    OutOfRange { value: Number, target: &'static str },
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{FieldError, SerialError, ValueError};
    use crate::identity::RefId;
    use crate::value::ValueKind;

    #[test]
    fn messages() {
        let err = SerialError::DanglingReference { ref_id: RefId(7) };
        assert_eq!(err.to_string(), "cannot find object with ref id 7");

        let err = FieldError::Mismatch {
            field: "next",
            source: ValueError::Kind {
                expected: ValueKind::Object,
                found: ValueKind::Number,
            },
        };
        assert_eq!(err.to_string(), "field `next`: expected object, found number");
    }
}
