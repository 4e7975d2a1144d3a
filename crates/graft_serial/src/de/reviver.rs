use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::RefTable;
use crate::callback::CallbackRegistry;
use crate::error::SerialError;
use crate::identity::IdentityTracker;
use crate::node::{Node, PlainNode, Scalar, TypedNode, is_reserved};
use crate::path;
use crate::registry::{Factory, TypeRegistry};
use crate::value::{Array, Object, Record, Value};

// -----------------------------------------------------------------------------
// Reviver

/// Rebuilds a live graph from a [`Node`] tree.
///
/// See the [module docs](crate::de) for the two-pass algorithm. Like
/// [`Serializer`](crate::ser::Serializer), a reviver keeps no state between
/// calls.
#[derive(Clone, Copy)]
pub struct Reviver<'a> {
    registry: &'a TypeRegistry,
    callbacks: &'a CallbackRegistry,
}

/// An object whose fields wait for pass 2.
struct Deferred {
    object: Object,
    tag: String,
    fields: Vec<(String, Value)>,
}

/// Per-call bookkeeping.
#[derive(Default)]
struct ReviveState {
    table: RefTable,
    deferred: Vec<Deferred>,
    /// Number of pending markers created so far.
    pending: usize,
    /// Containers already patched in pass 2.
    patched: IdentityTracker,
}

impl<'a> Reviver<'a> {
    #[inline]
    pub const fn new(registry: &'a TypeRegistry, callbacks: &'a CallbackRegistry) -> Self {
        Self {
            registry,
            callbacks,
        }
    }

    /// Revives `node` into a value of any kind.
    ///
    /// # Errors
    ///
    /// - [`SerialError::UnknownType`] for an unregistered type tag.
    /// - [`SerialError::DanglingReference`] for a marker without definition.
    /// - [`SerialError::TypeContractViolation`] if a hook or field breaks
    ///   its contract.
    /// - [`SerialError::UnknownCallback`] for an unregistered callback name.
    ///
    /// Nothing built before the failure is returned.
    pub fn revive(&self, node: &Node) -> Result<Value, SerialError> {
        path::clear();
        let mut state = ReviveState::default();

        let result = self
            .build(&mut state, node)
            .and_then(|root| self.finish(&mut state, root));
        if let Err(err) = &result {
            path::report("revive", err);
        }
        path::clear();

        log::debug!("revived graph with {} ref ids", state.table.len());
        result
    }

    /// Revives `node`, which must produce an object.
    pub fn deserialize(&self, node: &Node) -> Result<Object, SerialError> {
        match self.revive(node)? {
            Value::Object(object) => Ok(object),
            other => Err(SerialError::contract(
                node.as_typed().map_or("<root>", |typed| typed.tag.as_str()),
                format!("expected an object at the root, found {}", other.kind()),
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Pass 1

    fn build(&self, state: &mut ReviveState, node: &Node) -> Result<Value, SerialError> {
        match node {
            Node::Scalar(Scalar::Null) => Ok(Value::Null),
            Node::Scalar(Scalar::Bool(v)) => Ok(Value::Bool(*v)),
            Node::Scalar(Scalar::Number(v)) => Ok(Value::Number(*v)),
            Node::Scalar(Scalar::String(v)) => Ok(Value::String(v.clone())),
            Node::Callback(name) => self
                .callbacks
                .get(name)
                .map(Value::Callback)
                .ok_or_else(|| SerialError::UnknownCallback { name: name.clone() }),
            Node::Ref(ref_id) => {
                state.pending += 1;
                Ok(Value::Pending(*ref_id))
            }
            Node::Sequence(items) => {
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path::push_index(index);
                    values.push(self.build(state, item)?);
                    path::pop();
                }
                Ok(Value::Array(Array::from_vec(values)))
            }
            Node::Plain(plain) => self.build_plain(state, plain),
            Node::Typed(typed) => self.build_typed(state, typed),
        }
    }

    fn build_plain(&self, state: &mut ReviveState, plain: &PlainNode) -> Result<Value, SerialError> {
        let record = Record::new();
        for (key, child) in plain.fields.iter() {
            path::push_field(key);
            let value = self.build(state, child)?;
            path::pop();
            record.insert(key, value);
        }

        let value = Value::Record(record);
        if let Some(ref_id) = plain.ref_id {
            state.table.define(ref_id, value.clone());
        }
        Ok(value)
    }

    fn build_typed(&self, state: &mut ReviveState, typed: &TypedNode) -> Result<Value, SerialError> {
        let meta = self.registry.lookup(&typed.tag)?;

        let object = match meta.factory() {
            Factory::FromJson(from_json) => self.checked(typed, Object::from_boxed(from_json(typed)?))?,
            Factory::ConstructArgs { args, construct } => {
                let args = args(typed)?;
                self.checked(typed, Object::from_boxed(construct(args)?))?
            }
            Factory::Default(default) => {
                let object = Object::from_boxed(default());
                self.assign_fields(state, typed, &object)?;
                object
            }
        };

        let value = Value::Object(object);
        if let Some(ref_id) = typed.ref_id {
            state.table.define(ref_id, value.clone());
        }
        Ok(value)
    }

    /// Rejects hook results that could not be serialized again.
    fn checked(&self, typed: &TypedNode, object: Object) -> Result<Object, SerialError> {
        if self.registry.contains_type(object.type_id()) {
            Ok(object)
        } else {
            Err(SerialError::contract(
                &*typed.tag,
                format!("hook returned unregistered type `{}`", object.type_name()),
            ))
        }
    }

    fn assign_fields(
        &self,
        state: &mut ReviveState,
        typed: &TypedNode,
        object: &Object,
    ) -> Result<(), SerialError> {
        let mut waiting = Vec::new();

        for (key, child) in typed.fields.iter() {
            if is_reserved(key) {
                continue;
            }
            let before = state.pending;
            path::push_field(key);
            let value = self.build(state, child)?;
            path::pop();

            if state.pending == before {
                Self::set_field(&typed.tag, object, key, value)?;
            } else {
                waiting.push((key.to_string(), value));
            }
        }

        if waiting.is_empty() {
            object.borrow_mut().after_revive();
        } else {
            state.deferred.push(Deferred {
                object: object.clone(),
                tag: typed.tag.clone(),
                fields: waiting,
            });
        }
        Ok(())
    }

    fn set_field(tag: &str, object: &Object, key: &str, value: Value) -> Result<(), SerialError> {
        object
            .borrow_mut()
            .set_field(key, value)
            .map_err(|err| SerialError::contract(tag, err.to_string()))
    }

    // -------------------------------------------------------------------------
    // Pass 2

    fn finish(&self, state: &mut ReviveState, root: Value) -> Result<Value, SerialError> {
        let root = self.patch(state, root)?;

        // Children were pushed before their parents.
        let deferred = core::mem::take(&mut state.deferred);
        let count = deferred.len();
        for Deferred { object, tag, fields } in deferred {
            let mut resolved = Vec::with_capacity(fields.len());
            for (key, value) in fields {
                resolved.push((key, self.patch(state, value)?));
            }
            for (key, value) in resolved {
                Self::set_field(&tag, &object, &key, value)?;
            }
            object.borrow_mut().after_revive();
        }
        log::trace!("assigned held back fields of {count} objects");

        Ok(root)
    }

    /// Resolves `value` if it is a marker, then patches the markers inside it.
    fn patch(&self, state: &mut ReviveState, value: Value) -> Result<Value, SerialError> {
        let value = match value {
            Value::Pending(ref_id) => {
                log::trace!("resolving marker for ref id {ref_id}");
                state.table.resolve(ref_id)?
            }
            other => other,
        };

        match &value {
            Value::Array(array) => {
                if state.patched.visit(array.rc()).is_new() {
                    self.patch_array(state, array)?;
                }
            }
            Value::Record(record) => {
                if state.patched.visit(record.rc()).is_new() {
                    self.patch_record(state, record)?;
                }
            }
            _ => {}
        }
        Ok(value)
    }

    fn patch_array(&self, state: &mut ReviveState, array: &Array) -> Result<(), SerialError> {
        for index in 0..array.len() {
            let Some(item) = array.get(index) else {
                break;
            };
            let item = self.patch(state, item)?;
            array.borrow_mut()[index] = item;
        }
        Ok(())
    }

    fn patch_record(&self, state: &mut ReviveState, record: &Record) -> Result<(), SerialError> {
        let keys: Vec<String> = record.borrow().keys().cloned().collect();
        for key in keys {
            let Some(item) = record.get(&key) else {
                continue;
            };
            let item = self.patch(state, item)?;
            record.insert(key, item);
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::Reviver;
    use crate::Serializable;
    use crate::callback::CallbackRegistry;
    use crate::error::SerialError;
    use crate::identity::RefId;
    use crate::node::{Node, TypedNode};
    use crate::registry::{Factory, TypeMeta, TypeRegistry};
    use crate::value::{Object, Value};

    #[derive(Serializable, Default)]
    #[serial(Serializable = false)]
    struct Watcher {
        peer: Option<Object>,
        items: Vec<i64>,
        #[serial(skip)]
        revived_with_peer: bool,
    }

    impl Serializable for Watcher {
        fn after_revive(&mut self) {
            self.revived_with_peer = self.peer.is_some();
        }
    }

    #[derive(Serializable)]
    #[serial(from_json = Point::from_node)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Point {
        fn from_node(node: &TypedNode) -> Result<Self, SerialError> {
            Ok(Point {
                x: node.require_i64("x")?,
                y: node.require_i64("y")? * 10,
            })
        }
    }

    #[derive(Serializable)]
    #[serial(construct_args = Sum::args, construct = Sum::construct)]
    struct Sum {
        a: i64,
        b: i64,
        #[serial(skip)]
        total: i64,
    }

    impl Sum {
        fn args(node: &TypedNode) -> Result<Vec<Value>, SerialError> {
            Ok(vec![
                Value::from(node.require_i64("a")?),
                Value::from(node.require_i64("b")?),
            ])
        }

        fn construct(args: Vec<Value>) -> Result<Self, SerialError> {
            let a = args.first().and_then(Value::as_i64).unwrap_or_default();
            let b = args.get(1).and_then(Value::as_i64).unwrap_or_default();
            Ok(Sum { a, b, total: a + b })
        }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Watcher>();
        registry.register::<Point>();
        registry.register::<Sum>();
        registry
    }

    fn revive(json: &str) -> Result<Value, SerialError> {
        let node: Node = serde_json::from_str(json).unwrap();
        let registry = registry();
        let callbacks = CallbackRegistry::new();
        Reviver::new(&registry, &callbacks).revive(&node)
    }

    #[test]
    fn shared_plain_records() {
        let value = revive(
            r#"{"a":{"k":1,"__refId":1},"b":{"__registeredType":"__circleRef","__toRefId":1}}"#,
        )
        .unwrap();
        let root = value.as_record().unwrap();
        let a = root.get("a").unwrap();
        let b = root.get("b").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_record().unwrap().get("k").and_then(|v| v.as_i64()), Some(1));
    }

    #[test]
    fn marker_before_definition() {
        let value = revive(
            r#"[{"__toRefId":4},{"x":true,"__refId":4}]"#,
        )
        .unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.get(0), array.get(1));
    }

    #[test]
    fn self_cycle_defers_after_revive() {
        let value = revive(
            r#"{"__registeredType":"Watcher","items":[1,2],
                "peer":{"__registeredType":"__circleRef","__toRefId":0},"__refId":0}"#,
        )
        .unwrap();
        let object = value.as_object().unwrap();
        let watcher = object.borrow_as::<Watcher>().unwrap();
        assert!(watcher.revived_with_peer);
        assert_eq!(watcher.items, [1, 2]);
        assert!(watcher.peer.as_ref().unwrap().ptr_eq(object));
    }

    #[test]
    fn after_revive_without_references() {
        let value = revive(r#"{"__registeredType":"Watcher","items":[],"peer":null}"#).unwrap();
        let watcher = value.as_object().unwrap().borrow_as::<Watcher>().map(|w| w.revived_with_peer);
        assert_eq!(watcher, Some(false));
    }

    #[test]
    fn from_json_owns_revival() {
        let value = revive(r#"{"__registeredType":"Point","x":1,"y":2}"#).unwrap();
        let point = value.as_object().unwrap().borrow_as::<Point>().map(|p| (p.x, p.y));
        assert_eq!(point, Some((1, 20)));

        let err = revive(r#"{"__registeredType":"Point","x":1}"#).unwrap_err();
        assert!(matches!(err, SerialError::TypeContractViolation { .. }));
    }

    #[test]
    fn construct_args_skip_field_assignment() {
        let value = revive(r#"{"__registeredType":"Sum","a":2,"b":3}"#).unwrap();
        let sum = value.as_object().unwrap().borrow_as::<Sum>().map(|s| (s.a, s.b, s.total));
        assert_eq!(sum, Some((2, 3, 5)));
    }

    #[test]
    fn failures() {
        assert!(matches!(
            revive(r#"{"__registeredType":"DoesNotExist","a":1}"#),
            Err(SerialError::UnknownType { tag }) if tag == "DoesNotExist",
        ));
        assert!(matches!(
            revive(r#"[{"__registeredType":"__circleRef","__toRefId":9}]"#),
            Err(SerialError::DanglingReference { ref_id: RefId(9) }),
        ));
        assert!(matches!(
            revive(r#"{"__registeredType":"Watcher","items":"no"}"#),
            Err(SerialError::TypeContractViolation { .. }),
        ));
        assert!(matches!(
            revive(r#"{"__registeredType":"Watcher","unknown":1}"#),
            Err(SerialError::TypeContractViolation { .. }),
        ));
        assert!(matches!(
            revive(r#""<REGISTERED FUNCTION>missing""#),
            Err(SerialError::UnknownCallback { name }) if name == "missing",
        ));
    }

    #[test]
    fn deserialize_requires_object() {
        let registry = registry();
        let callbacks = CallbackRegistry::new();
        let reviver = Reviver::new(&registry, &callbacks);
        assert!(reviver.deserialize(&Node::from(1_i64)).is_err());
        assert!(reviver.deserialize(&Node::Typed(TypedNode::new("Sum").with("a", 1_i64).with("b", 1_i64))).is_ok());
    }

    /// Never registered; only produced by the hooks below.
    #[derive(Serializable, Default)]
    #[serial(GetTypeMeta = false)]
    struct Stray {
        n: i64,
    }

    fn stray_from_node(_: &TypedNode) -> Result<Box<dyn Serializable>, SerialError> {
        Ok(Box::new(Stray::default()))
    }

    fn no_args(_: &TypedNode) -> Result<Vec<Value>, SerialError> {
        Ok(Vec::new())
    }

    fn stray_from_args(_: Vec<Value>) -> Result<Box<dyn Serializable>, SerialError> {
        Ok(Box::new(Stray { n: 1 }))
    }

    #[test]
    fn hooks_must_return_registered_types() {
        let mut registry = registry();
        registry.insert(TypeMeta::new::<Point>("Forged", Factory::FromJson(stray_from_node)));
        registry.insert(TypeMeta::new::<Sum>(
            "Assembled",
            Factory::ConstructArgs {
                args: no_args,
                construct: stray_from_args,
            },
        ));
        let callbacks = CallbackRegistry::new();
        let reviver = Reviver::new(&registry, &callbacks);

        for tag in ["Forged", "Assembled"] {
            let result = reviver.revive(&Node::Typed(TypedNode::new(tag)));
            assert!(
                matches!(
                    &result,
                    Err(SerialError::TypeContractViolation { type_tag, .. }) if type_tag == tag,
                ),
                "{tag}: {result:?}",
            );
        }
    }
}
