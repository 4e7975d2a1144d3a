//! Provide some tools for parsing the derive input.

// -----------------------------------------------------------------------------
// Modules

mod field_attributes;
mod serial_struct;
mod type_attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use field_attributes::FieldAttributes;
pub(crate) use serial_struct::SerialStruct;
pub(crate) use type_attributes::{FactoryAttr, TypeAttributes};
