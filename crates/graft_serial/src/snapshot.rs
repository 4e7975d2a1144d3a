//! Captured states that can be restored any number of times.

use crate::callback::{CallbackRegistry, CallbackRegistryArc};
use crate::de::Reviver;
use crate::error::SerialError;
use crate::node::Node;
use crate::registry::{TypeRegistry, TypeRegistryArc};
use crate::ser::Serializer;
use crate::value::{Object, Value};

/// A serialized graph.
///
/// Capturing detaches the state from the live graph: later changes to the
/// graph do not affect the snapshot, and every [`restore`](Self::restore)
/// builds a fresh, independent graph.
///
/// # Examples
///
/// ```
/// use graft_serial::{Serializable, snapshot::Snapshot, value::Value};
///
/// #[derive(Serializable, Default)]
/// #[serial(auto_register)]
/// struct Board {
///     round: i64,
/// }
///
/// let board = Value::object(Board { round: 3 });
/// let snapshot = Snapshot::capture(&board).unwrap();
///
/// board.as_object().unwrap().borrow_mut_as::<Board>().unwrap().round = 4;
///
/// let restored = snapshot.restore_object().unwrap();
/// assert_eq!(restored.borrow_as::<Board>().unwrap().round, 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    node: Node,
}

impl Snapshot {
    /// Serializes `root` with the global registries.
    pub fn capture(root: &Value) -> Result<Self, SerialError> {
        Self::capture_in(root, TypeRegistry::global(), CallbackRegistry::global())
    }

    /// Serializes `root` with the given shared registries.
    pub fn capture_in(
        root: &Value,
        registry: &TypeRegistryArc,
        callbacks: &CallbackRegistryArc,
    ) -> Result<Self, SerialError> {
        let registry = registry.read();
        let callbacks = callbacks.read();
        Self::capture_with(root, &registry, &callbacks)
    }

    /// Serializes `root` with the given registries.
    pub fn capture_with(
        root: &Value,
        registry: &TypeRegistry,
        callbacks: &CallbackRegistry,
    ) -> Result<Self, SerialError> {
        let node = Serializer::new(registry, callbacks).serialize(root)?;
        Ok(Self { node })
    }

    /// Revives a new graph with the global registries.
    pub fn restore(&self) -> Result<Value, SerialError> {
        let registry = TypeRegistry::global().read();
        let callbacks = CallbackRegistry::global().read();
        self.restore_with(&registry, &callbacks)
    }

    /// Revives a new graph with the given registries.
    #[inline]
    pub fn restore_with(
        &self,
        registry: &TypeRegistry,
        callbacks: &CallbackRegistry,
    ) -> Result<Value, SerialError> {
        Reviver::new(registry, callbacks).revive(&self.node)
    }

    /// Revives a new graph whose root must be an object.
    pub fn restore_object(&self) -> Result<Object, SerialError> {
        let registry = TypeRegistry::global().read();
        let callbacks = CallbackRegistry::global().read();
        Reviver::new(&registry, &callbacks).deserialize(&self.node)
    }

    /// The captured tree.
    #[inline]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Wraps an existing tree, e.g. one read from storage.
    #[inline]
    pub fn from_node(node: Node) -> Self {
        Self { node }
    }

    #[inline]
    pub fn into_node(self) -> Node {
        self.node
    }
}

#[cfg(feature = "json")]
impl Snapshot {
    /// Encodes the snapshot as JSON text.
    pub fn to_json_string(&self) -> Result<alloc::string::String, SerialError> {
        Ok(serde_json::to_string(&self.node)?)
    }

    /// Decodes a snapshot from JSON text.
    ///
    /// Only the text is checked here. Type tags and references are checked
    /// on [`restore`](Self::restore).
    pub fn from_json_str(text: &str) -> Result<Self, SerialError> {
        Ok(Self {
            node: serde_json::from_str(text)?,
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Snapshot;
    use crate::Serializable;
    use crate::callback::CallbackRegistry;
    use crate::registry::TypeRegistry;
    use crate::value::{Object, Value};

    #[derive(Serializable, Default)]
    #[serial(tag = "SnapCell")]
    struct Cell {
        v: i64,
        other: Option<Object>,
    }

    #[test]
    fn restores_are_independent() {
        let mut registry = TypeRegistry::new();
        registry.register::<Cell>();
        let callbacks = CallbackRegistry::new();

        let inner = Object::new(Cell { v: 1, other: None });
        let root = Value::object(Cell {
            v: 0,
            other: Some(inner.clone()),
        });
        let snapshot = Snapshot::capture_with(&root, &registry, &callbacks).unwrap();

        inner.borrow_mut_as::<Cell>().unwrap().v = 100;

        let first = snapshot.restore_with(&registry, &callbacks).unwrap();
        let second = snapshot.restore_with(&registry, &callbacks).unwrap();
        assert!(Value::structural_eq(&first, &second));
        assert_ne!(first, second);
        assert!(!Value::structural_eq(&first, &root));

        let first = first.as_object().unwrap().borrow_as::<Cell>().unwrap().other.clone().unwrap();
        assert_eq!(first.borrow_as::<Cell>().unwrap().v, 1);
    }

    #[test]
    fn from_node_round_trip() {
        let snapshot = Snapshot::from_node(crate::node::Node::from(3_i64));
        let registry = TypeRegistry::new();
        let callbacks = CallbackRegistry::new();
        assert_eq!(
            snapshot.restore_with(&registry, &callbacks).unwrap().as_i64(),
            Some(3),
        );
        assert!(snapshot.clone().into_node().as_i64().is_some());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_text() {
        let snapshot = Snapshot::from_node(crate::node::Node::from("hi"));
        let text = snapshot.to_json_string().unwrap();
        assert_eq!(text, "\"hi\"");
        assert_eq!(Snapshot::from_json_str(&text).unwrap(), snapshot);
        assert!(Snapshot::from_json_str("{").is_err());
    }
}
