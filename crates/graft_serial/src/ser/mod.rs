//! Live graph -> wire tree.
//!
//! [`Serializer`] walks a [`Value`](crate::value::Value) once, giving every
//! array, record and object an id on first encounter. A record or object met
//! again becomes a [`Node::Ref`](crate::node::Node::Ref) marker; an array met
//! again is an error. A second walk over the produced tree then drops the
//! ids of every record nobody refers to.

// -----------------------------------------------------------------------------
// Modules

mod mark;
mod serializer;

// -----------------------------------------------------------------------------
// Exports

pub use serializer::Serializer;
