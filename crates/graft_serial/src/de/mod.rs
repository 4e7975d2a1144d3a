//! Wire tree -> live graph.
//!
//! Revival runs in two passes:
//!
//! 1. **Construct.** Every node is rebuilt bottom-up. A record that carries
//!    a `__refId` is stored in a [`RefTable`] once its subtree is complete.
//!    Reference markers are left in place as [`Value::Pending`].
//!    Fields of a default-constructed object whose value contains such a
//!    marker are held back instead of assigned.
//! 2. **Patch.** Every pending marker left in arrays and records is replaced
//!    by the value stored under its id, the held-back fields are assigned,
//!    and `after_revive` runs for the objects that waited for them.
//!
//! A marker with no matching definition fails the whole call.
//!
//! [`Value::Pending`]: crate::value::Value::Pending

// -----------------------------------------------------------------------------
// Modules

mod ref_table;
mod reviver;

// -----------------------------------------------------------------------------
// Exports

pub use ref_table::RefTable;
pub use reviver::Reviver;
