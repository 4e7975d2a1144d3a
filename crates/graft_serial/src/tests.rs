//! End-to-end round trips through serialize, JSON text and revive.

use alloc::string::String;
use alloc::vec::Vec;

use crate::callback::CallbackRegistry;
use crate::de::Reviver;
use crate::node::Node;
use crate::registry::TypeRegistry;
use crate::ser::Serializer;
use crate::value::{Array, Object, Value};
use crate::{SerialError, Serializable};

#[derive(Serializable, Default)]
#[serial(tag = "Node")]
struct ListNode {
    value: i64,
    next: Option<Object>,
}

#[derive(Serializable, Default)]
struct Branch {
    left: Option<Object>,
    right: Option<Object>,
}

#[derive(Serializable, Default)]
struct Leaf {
    name: String,
    weights: Vec<f64>,
}

#[derive(Serializable, Default)]
struct Wide {
    big: u64,
    size: usize,
    low: i64,
}

#[derive(Serializable, Default)]
#[serial(Serializable = false)]
struct Hooked {
    a: i64,
    b: i64,
}

impl Serializable for Hooked {
    fn to_json(&self) -> Option<Value> {
        Some(Value::record([("sum", Value::from(self.a + self.b))]))
    }
}

#[cfg(feature = "auto_register")]
#[derive(Serializable, Default)]
#[serial(auto_register, tag = "GlobalCounter")]
struct Counter {
    #[serial(rename = "n")]
    count: u32,
    on_tick: Option<crate::callback::Callback>,
}

struct Env {
    registry: TypeRegistry,
    callbacks: CallbackRegistry,
}

impl Env {
    fn new() -> Self {
        let mut registry = TypeRegistry::new();
        registry.register::<ListNode>();
        registry.register::<Branch>();
        registry.register::<Leaf>();
        registry.register::<Hooked>();
        registry.register::<Wide>();
        Self {
            registry,
            callbacks: CallbackRegistry::new(),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Node, SerialError> {
        Serializer::new(&self.registry, &self.callbacks).serialize(value)
    }

    /// Serialize, go through JSON text, revive.
    fn round_trip(&self, value: &Value) -> Result<Value, SerialError> {
        let text = serde_json::to_string(&self.serialize(value)?).unwrap();
        let node: Node = serde_json::from_str(&text).unwrap();
        Reviver::new(&self.registry, &self.callbacks).revive(&node)
    }
}

fn next_of(object: &Object) -> Option<Object> {
    object.borrow_as::<ListNode>().and_then(|node| node.next.clone())
}

fn break_cycle(object: &Object) {
    if let Some(mut node) = object.borrow_mut_as::<ListNode>() {
        node.next = None;
    }
}

#[test]
fn round_trip_is_structurally_equal() {
    let env = Env::new();
    let leaf = Value::object(Leaf {
        name: "leaf".into(),
        weights: alloc::vec![0.5, 2.0],
    });
    let root = Value::record([
        ("leaf", leaf),
        ("list", Value::array([Value::from(1_i64), Value::Null, Value::from("x")])),
        ("flag", Value::from(true)),
    ]);

    let revived = env.round_trip(&root).unwrap();
    assert!(Value::structural_eq(&root, &revived));
    assert_ne!(root, revived);
}

#[test]
fn integer_extremes_round_trip() {
    let env = Env::new();
    let wide = Value::object(Wide {
        big: u64::MAX,
        size: usize::MAX,
        low: i64::MIN,
    });

    let node = env.serialize(&wide).unwrap();
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["big"], serde_json::json!(u64::MAX));

    let revived = env.round_trip(&wide).unwrap();
    let revived = revived.as_object().unwrap().borrow_as::<Wide>().unwrap();
    assert_eq!(revived.big, u64::MAX);
    assert_eq!(revived.size, usize::MAX);
    assert_eq!(revived.low, i64::MIN);
}

#[test]
fn aliasing_is_preserved() {
    let env = Env::new();
    let shared = Object::new(Leaf::default());
    let branch = Value::object(Branch {
        left: Some(shared.clone()),
        right: Some(shared),
    });

    let revived = env.round_trip(&branch).unwrap();
    let branch = revived.as_object().unwrap().borrow_as::<Branch>().unwrap();
    let left = branch.left.as_ref().unwrap();
    let right = branch.right.as_ref().unwrap();
    assert!(left.ptr_eq(right));
    assert!(left.is::<Leaf>());
}

#[test]
fn self_cycle() {
    let env = Env::new();
    let a = Object::new(ListNode { value: 7, next: None });
    a.borrow_mut_as::<ListNode>().unwrap().next = Some(a.clone());

    let node = env.serialize(&Value::Object(a.clone())).unwrap();
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        serde_json::json!({
            "__registeredType": "Node",
            "__refId": 0,
            "value": 7,
            "next": { "__registeredType": "__circleRef", "__toRefId": 0 },
        }),
    );

    let revived = env.round_trip(&Value::Object(a.clone())).unwrap();
    let root = revived.as_object().unwrap();
    assert!(next_of(root).unwrap().ptr_eq(root));

    break_cycle(&a);
    break_cycle(root);
}

#[test]
fn two_node_cycle() {
    let env = Env::new();
    let n1 = Object::new(ListNode { value: 1, next: None });
    let n2 = Object::new(ListNode {
        value: 2,
        next: Some(n1.clone()),
    });
    n1.borrow_mut_as::<ListNode>().unwrap().next = Some(n2.clone());

    let node = env.serialize(&Value::Object(n1.clone())).unwrap();
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        serde_json::json!({
            "__registeredType": "Node",
            "__refId": 0,
            "value": 1,
            "next": {
                "__registeredType": "Node",
                "value": 2,
                "next": { "__registeredType": "__circleRef", "__toRefId": 0 },
            },
        }),
    );

    let r1 = Reviver::new(&env.registry, &env.callbacks)
        .deserialize(&node)
        .unwrap();
    let r2 = next_of(&r1).unwrap();
    assert_eq!(r1.borrow_as::<ListNode>().unwrap().value, 1);
    assert_eq!(r2.borrow_as::<ListNode>().unwrap().value, 2);
    assert!(next_of(&r2).unwrap().ptr_eq(&r1));

    break_cycle(&n1);
    break_cycle(&r1);
}

#[test]
fn array_cycle_is_rejected() {
    let env = Env::new();
    let array = Array::new();
    array.push(Value::Array(array.clone()));

    let err = env.serialize(&Value::Array(array.clone())).unwrap_err();
    assert!(matches!(err, SerialError::CircularArray { .. }));

    array.borrow_mut().clear();
}

#[test]
fn to_json_takes_precedence() {
    let env = Env::new();
    let node = env.serialize(&Value::object(Hooked { a: 2, b: 3 })).unwrap();
    assert_eq!(
        serde_json::to_value(&node).unwrap(),
        serde_json::json!({ "__registeredType": "Hooked", "sum": 5 }),
    );
}

#[test]
fn unknown_tag_builds_nothing() {
    let env = Env::new();
    let node: Node = serde_json::from_str(
        r#"{"__registeredType":"Node","value":1,"next":{"__registeredType":"DoesNotExist"}}"#,
    )
    .unwrap();

    let result = Reviver::new(&env.registry, &env.callbacks).revive(&node);
    assert!(matches!(
        result,
        Err(SerialError::UnknownType { tag }) if tag == "DoesNotExist",
    ));
}

#[test]
fn ids_are_per_call() {
    let env = Env::new();
    let shared = Object::new(Leaf::default());
    let value = Value::array([Value::Object(shared.clone()), Value::Object(shared)]);

    let first = env.serialize(&value).unwrap();
    let second = env.serialize(&value).unwrap();
    assert_eq!(first, second);
}

#[cfg(feature = "auto_register")]
#[test]
fn global_registries() {
    fn tick(args: &[Value]) -> Value {
        Value::from(args.len() as i64)
    }

    let callback = crate::register_callback("tick", tick);
    let counter = Value::object(Counter {
        count: 3,
        on_tick: Some(callback),
    });

    let node = crate::serialize(&counter).unwrap();
    let json = serde_json::to_value(&node).unwrap();
    assert_eq!(json["__registeredType"], "GlobalCounter");
    assert_eq!(json["n"], 3);
    assert!(json["on_tick"].as_str().unwrap().starts_with("<REGISTERED FUNCTION>tick"));

    let object = crate::deserialize(&node).unwrap();
    let counter = object.borrow_as::<Counter>().unwrap();
    assert_eq!(counter.count, 3);
    let revived = counter.on_tick.as_ref().unwrap();
    assert_eq!(revived.call(&[Value::Null]).as_i64(), Some(1));
}
