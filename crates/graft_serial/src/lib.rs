#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Compilation config

mod cfg;

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `graft_serial`, which must also resolve
// inside the crate itself (unit tests and the crate's own derives).
extern crate self as graft_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod capability;
mod path;

pub mod callback;
pub mod de;
pub mod error;
pub mod identity;
pub mod node;
pub mod registry;
pub mod ser;
pub mod snapshot;
pub mod value;

#[doc(hidden)]
pub mod __macro_exports;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use capability::{Fields, Serializable};
pub use error::{FieldError, SerialError, ValueError};
pub use graft_serial_derive as derive;
pub use graft_serial_derive::{Serializable, impl_auto_register};

use callback::{Callback, CallbackFn, CallbackRegistry};
use node::Node;
use registry::{GetTypeMeta, TypeRegistry};
use value::{Object, Value};

// -----------------------------------------------------------------------------
// Global shortcuts

/// Registers `T` in the global [`TypeRegistry`].
///
/// Registration must be finished before serializing or reviving through the
/// global registry from other threads.
#[inline]
pub fn register<T: GetTypeMeta>() {
    TypeRegistry::global().write().register::<T>();
}

/// Registers `func` in the global [`CallbackRegistry`].
///
/// See [`CallbackRegistry::register`] for the naming rule.
#[inline]
pub fn register_callback(name: &str, func: CallbackFn) -> Callback {
    CallbackRegistry::global().write().register(name, func)
}

/// Serializes `root` with the global registries.
///
/// Hooks run while the global registries are read-locked and must not
/// register anything.
pub fn serialize(root: &Value) -> Result<Node, SerialError> {
    let registry = TypeRegistry::global().read();
    let callbacks = CallbackRegistry::global().read();
    ser::Serializer::new(&registry, &callbacks).serialize(root)
}

/// Revives `node` with the global registries.
pub fn revive(node: &Node) -> Result<Value, SerialError> {
    let registry = TypeRegistry::global().read();
    let callbacks = CallbackRegistry::global().read();
    de::Reviver::new(&registry, &callbacks).revive(node)
}

/// Revives `node` with the global registries; the root must be an object.
pub fn deserialize(node: &Node) -> Result<Object, SerialError> {
    let registry = TypeRegistry::global().read();
    let callbacks = CallbackRegistry::global().read();
    de::Reviver::new(&registry, &callbacks).deserialize(node)
}
