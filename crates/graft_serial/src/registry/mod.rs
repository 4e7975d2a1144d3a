//! Type tags, factories and the registry that maps between them.
//!
//! ## Menu
//!
//! - [`Factory`]: how an instance is created on revive.
//! - [`TypeMeta`]: a registry entry (tag, Rust type, factory).
//! - [`GetTypeMeta`]: provides the default `TypeMeta` of a type.
//! - [`TypeRegistry`]: tag -> `TypeMeta`, and `TypeId` -> tag.
//! - [`TypeRegistryArc`]: a shared, lockable registry.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! The [`inventory`] crate collects the types annotated with
//! `#[serial(auto_register)]`. Not every platform supports it; on those
//! that do not, the call returns `false` and registers nothing.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod type_meta;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use type_meta::{ConstructArgsFn, ConstructFn, DefaultFn, FromJsonFn};
pub use type_meta::{Factory, GetTypeMeta, TypeMeta};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
