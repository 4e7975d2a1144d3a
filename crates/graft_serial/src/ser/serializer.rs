use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use graft_utils::hash::HashSet;

use super::mark::retain_referenced;
use crate::callback::{Callback, CallbackRegistry};
use crate::error::SerialError;
use crate::identity::{IdentityTracker, RefId, Visit};
use crate::node::{Node, NodeFields, PlainNode, Scalar, TypedNode, is_reserved};
use crate::path;
use crate::registry::TypeRegistry;
use crate::value::{Array, Object, Record, Value};

// -----------------------------------------------------------------------------
// Serializer

/// Converts a live graph into a [`Node`] tree.
///
/// Holds no per-call state: every [`serialize`](Self::serialize) call uses
/// its own identity tracker, so one serializer may be reused freely.
///
/// # Examples
///
/// ```
/// use graft_serial::{Serializable, ser::Serializer};
/// use graft_serial::callback::CallbackRegistry;
/// use graft_serial::registry::TypeRegistry;
/// use graft_serial::value::{Object, Value};
///
/// #[derive(Serializable, Default)]
/// struct Leaf {
///     v: i64,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Leaf>();
/// let callbacks = CallbackRegistry::new();
///
/// let leaf = Value::object(Leaf { v: 3 });
/// let pair = Value::array([leaf.clone(), leaf]);
///
/// // The same object twice in one array: the second slot is a marker.
/// let node = Serializer::new(&registry, &callbacks).serialize(&pair).unwrap();
/// let json = serde_json::to_string(&node).unwrap();
/// assert_eq!(
///     json,
///     r#"[{"__registeredType":"Leaf","v":3,"__refId":1},{"__registeredType":"__circleRef","__toRefId":1}]"#,
/// );
/// ```
#[derive(Clone, Copy)]
pub struct Serializer<'a> {
    registry: &'a TypeRegistry,
    callbacks: &'a CallbackRegistry,
}

/// Per-call bookkeeping.
#[derive(Default)]
struct SerializeState {
    tracker: IdentityTracker,
    referenced: HashSet<RefId>,
}

impl<'a> Serializer<'a> {
    #[inline]
    pub const fn new(registry: &'a TypeRegistry, callbacks: &'a CallbackRegistry) -> Self {
        Self {
            registry,
            callbacks,
        }
    }

    /// Serializes the graph reachable from `root`.
    ///
    /// # Errors
    ///
    /// - [`SerialError::CircularArray`] if an array is reached twice.
    /// - [`SerialError::UnresolvedTypeTag`] for an object of an unregistered type.
    /// - [`SerialError::TypeContractViolation`] if a hook breaks its contract.
    /// - [`SerialError::UnknownCallback`] for an unregistered callback.
    pub fn serialize(&self, root: &Value) -> Result<Node, SerialError> {
        path::clear();
        let mut state = SerializeState::default();

        let result = self.walk(&mut state, root);
        if let Err(err) = &result {
            path::report("serialize", err);
        }
        path::clear();

        let mut node = result?;
        retain_referenced(&mut node, &state.referenced);
        log::debug!(
            "serialized graph of {} containers, {} referenced more than once",
            state.tracker.len(),
            state.referenced.len(),
        );
        Ok(node)
    }

    /// Serializes the graph reachable from `root`.
    #[inline]
    pub fn serialize_object(&self, root: &Object) -> Result<Node, SerialError> {
        self.serialize(&Value::Object(root.clone()))
    }

    fn walk(&self, state: &mut SerializeState, value: &Value) -> Result<Node, SerialError> {
        match value {
            Value::Null => Ok(Node::Scalar(Scalar::Null)),
            Value::Bool(v) => Ok(Node::Scalar(Scalar::Bool(*v))),
            Value::Number(v) => Ok(Node::Scalar(Scalar::Number(*v))),
            Value::String(v) => Ok(Node::Scalar(Scalar::String(v.clone()))),
            Value::Callback(callback) => self.callback_name(callback).map(Node::Callback),
            Value::Pending(ref_id) => Err(SerialError::DanglingReference { ref_id: *ref_id }),
            Value::Array(array) => self.walk_array(state, array),
            Value::Record(record) => self.walk_record(state, record),
            Value::Object(object) => self.walk_object(state, object),
        }
    }

    /// The name `callback` is registered under, by name first, then by function.
    fn callback_name(&self, callback: &Callback) -> Result<String, SerialError> {
        if self.callbacks.is_registered(callback) {
            return Ok(callback.name().to_string());
        }
        match self.callbacks.key_of(callback.func()) {
            Some(key) => Ok(key.to_string()),
            None => Err(SerialError::UnknownCallback {
                name: callback.name().to_string(),
            }),
        }
    }

    fn walk_array(&self, state: &mut SerializeState, array: &Array) -> Result<Node, SerialError> {
        if let Visit::Seen(ref_id) = state.tracker.visit(array.rc()) {
            return Err(SerialError::CircularArray { ref_id });
        }

        let items: Vec<Value> = array.borrow().clone();
        let mut nodes = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path::push_index(index);
            nodes.push(self.walk(state, item)?);
            path::pop();
        }
        Ok(Node::Sequence(nodes))
    }

    fn walk_record(&self, state: &mut SerializeState, record: &Record) -> Result<Node, SerialError> {
        let ref_id = match state.tracker.visit(record.rc()) {
            Visit::Seen(ref_id) => return Ok(Self::reference(state, ref_id)),
            Visit::New(ref_id) => ref_id,
        };

        let entries: Vec<(String, Value)> = {
            let map = record.borrow();
            record
                .sorted_keys()
                .into_iter()
                .filter_map(|key| map.get(&key).cloned().map(|value| (key, value)))
                .collect()
        };

        let fields = self.walk_fields(state, entries, "record")?;
        Ok(Node::Plain(PlainNode {
            ref_id: Some(ref_id),
            fields,
        }))
    }

    fn walk_object(&self, state: &mut SerializeState, object: &Object) -> Result<Node, SerialError> {
        let ref_id = match state.tracker.visit(object.rc()) {
            Visit::Seen(ref_id) => return Ok(Self::reference(state, ref_id)),
            Visit::New(ref_id) => ref_id,
        };

        let tag = self
            .registry
            .tag_of(object.type_id())
            .ok_or_else(|| SerialError::UnresolvedTypeTag {
                type_name: object.type_name(),
            })?;

        // Collect first: no borrow may be held while walking children,
        // which can reach this object again.
        let entries = Self::object_entries(tag, object)?;

        let fields = self.walk_fields(state, entries, tag)?;
        Ok(Node::Typed(TypedNode {
            tag: tag.to_string(),
            ref_id: Some(ref_id),
            fields,
        }))
    }

    fn object_entries(tag: &str, object: &Object) -> Result<Vec<(String, Value)>, SerialError> {
        let inner = object.borrow();

        if let Some(json) = inner.to_json() {
            let record = match json {
                Value::Record(record) => record,
                other => {
                    return Err(SerialError::contract(
                        tag,
                        format!("`to_json` returned {} instead of a record", other.kind()),
                    ));
                }
            };
            let map = record.borrow();
            return Ok(record
                .sorted_keys()
                .into_iter()
                .filter_map(|key| map.get(&key).cloned().map(|value| (key, value)))
                .collect());
        }

        let keys = inner.serialize_keys();
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys.iter() {
            let Some(value) = inner.field(key) else {
                return Err(SerialError::contract(
                    tag,
                    format!("serialize key `{key}` is not a field"),
                ));
            };
            entries.push((key.to_string(), value));
        }
        Ok(entries)
    }

    fn walk_fields(
        &self,
        state: &mut SerializeState,
        entries: Vec<(String, Value)>,
        owner: &str,
    ) -> Result<NodeFields, SerialError> {
        let mut fields = NodeFields::with_capacity(entries.len());
        for (key, value) in entries {
            if is_reserved(&key) {
                return Err(SerialError::contract(
                    owner,
                    format!("`{key}` is a reserved key"),
                ));
            }
            path::push_field(&key);
            let node = self.walk(state, &value)?;
            path::pop();
            fields.insert(key, node);
        }
        Ok(fields)
    }

    #[inline]
    fn reference(state: &mut SerializeState, ref_id: RefId) -> Node {
        log::trace!("revisited container {ref_id}, emitting marker");
        state.referenced.insert(ref_id);
        Node::Ref(ref_id)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::Serializer;
    use crate::callback::CallbackRegistry;
    use crate::error::SerialError;
    use crate::identity::RefId;
    use crate::node::Node;
    use crate::registry::TypeRegistry;
    use crate::value::{Array, Object, Value};
    use crate::Serializable;

    #[derive(Serializable, Default)]
    #[serial(tag = "Link")]
    struct Link {
        value: i64,
        next: Option<Object>,
    }

    #[derive(Serializable, Default)]
    #[serial(Serializable = false)]
    struct Masked {
        shown: i64,
        hidden: i64,
    }

    impl Serializable for Masked {
        fn serialize_keys(&self) -> Cow<'static, [&'static str]> {
            Cow::Borrowed(&["shown"])
        }
    }

    #[derive(Serializable, Default)]
    #[serial(Serializable = false)]
    struct BadJson {
        v: i64,
    }

    impl Serializable for BadJson {
        fn to_json(&self) -> Option<Value> {
            Some(Value::from(self.v))
        }
    }

    #[derive(Serializable, Default)]
    struct Unregistered {
        v: i64,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Link>();
        registry.register::<Masked>();
        registry.register::<BadJson>();
        registry
    }

    fn to_json(value: &Value) -> Result<serde_json::Value, SerialError> {
        let registry = registry();
        let callbacks = CallbackRegistry::new();
        let node = Serializer::new(&registry, &callbacks).serialize(value)?;
        Ok(serde_json::to_value(&node).unwrap())
    }

    #[test]
    fn unreferenced_ids_are_dropped() {
        let tail = Value::object(Link { value: 2, next: None });
        let head = Value::object(Link {
            value: 1,
            next: tail.as_object().cloned(),
        });
        assert_eq!(
            to_json(&head).unwrap(),
            serde_json::json!({
                "__registeredType": "Link",
                "value": 1,
                "next": { "__registeredType": "Link", "value": 2, "next": null },
            }),
        );
    }

    #[test]
    fn shared_record_is_written_once() {
        let shared = Value::record([("k", Value::from(1_i64))]);
        let outer = Value::record([("a", shared.clone()), ("b", shared)]);
        assert_eq!(
            to_json(&outer).unwrap(),
            serde_json::json!({
                "a": { "k": 1, "__refId": 1 },
                "b": { "__registeredType": "__circleRef", "__toRefId": 1 },
            }),
        );
    }

    #[test]
    fn array_revisit_fails() {
        let array = Array::new();
        array.push(Value::Array(array.clone()));
        let result = to_json(&Value::Array(array.clone()));
        assert!(matches!(
            result,
            Err(SerialError::CircularArray { ref_id: RefId(0) }),
        ));
        array.borrow_mut().clear();

        let shared = Value::array([Value::from(1_i64)]);
        let twice = Value::array([shared.clone(), shared]);
        assert!(matches!(to_json(&twice), Err(SerialError::CircularArray { .. })));
    }

    #[test]
    fn serialize_keys_limit_fields() {
        let value = Value::object(Masked { shown: 1, hidden: 2 });
        assert_eq!(
            to_json(&value).unwrap(),
            serde_json::json!({ "__registeredType": "Masked", "shown": 1 }),
        );
    }

    #[test]
    fn to_json_must_return_record() {
        let value = Value::object(BadJson { v: 1 });
        assert!(matches!(
            to_json(&value),
            Err(SerialError::TypeContractViolation { type_tag, .. }) if type_tag == "BadJson",
        ));
    }

    #[test]
    fn unregistered_type() {
        let value = Value::array([Value::object(Unregistered { v: 1 })]);
        assert!(matches!(
            to_json(&value),
            Err(SerialError::UnresolvedTypeTag { type_name }) if type_name.ends_with("Unregistered"),
        ));
    }

    #[test]
    fn reserved_record_key() {
        let value = Value::record([("__refId", Value::from(1_i64))]);
        assert!(matches!(
            to_json(&value),
            Err(SerialError::TypeContractViolation { .. }),
        ));
    }

    #[test]
    fn callbacks_by_name_or_function() {
        fn noop(_: &[Value]) -> Value {
            Value::Null
        }

        let registry = registry();
        let mut callbacks = CallbackRegistry::new();
        let registered = callbacks.register("noop", noop);
        let serializer = Serializer::new(&registry, &callbacks);

        let node = serializer.serialize(&Value::Callback(registered)).unwrap();
        assert_eq!(node, Node::Callback("noop".into()));

        let renamed = crate::callback::Callback::new("other", noop);
        let node = serializer.serialize(&Value::Callback(renamed)).unwrap();
        assert_eq!(node, Node::Callback("noop".into()));

        fn unknown(_: &[Value]) -> Value {
            Value::Bool(true)
        }
        let missing = crate::callback::Callback::new("unknown", unknown);
        assert!(matches!(
            serializer.serialize(&Value::Callback(missing)),
            Err(SerialError::UnknownCallback { name }) if name == "unknown",
        ));
    }
}
