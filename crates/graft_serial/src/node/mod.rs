//! The wire tree produced by serialize and consumed by revive.
//!
//! [`Node`] implements [`Serialize`](serde_core::Serialize) and
//! [`Deserialize`](serde_core::Deserialize), so any serde data format can
//! carry it. In JSON a node looks like:
//!
//! ```json
//! {
//!   "__registeredType": "ListNode",
//!   "value": 1,
//!   "next": {
//!     "__registeredType": "ListNode",
//!     "value": 2,
//!     "next": { "__registeredType": "__circleRef", "__toRefId": 0 },
//!     "__refId": 1
//!   },
//!   "__refId": 0
//! }
//! ```
//!
//! - `__registeredType` holds the type tag of a typed record.
//! - `__refId` is present only on records referenced elsewhere in the tree.
//! - `{ "__registeredType": "__circleRef", "__toRefId": id }` is a reference marker.
//! - A string starting with `<REGISTERED FUNCTION>` names a callback.

// -----------------------------------------------------------------------------
// Modules

mod de;
mod ser;

// -----------------------------------------------------------------------------
// Constants

/// Key of the type tag.
pub const TYPE_KEY: &str = "__registeredType";

/// Key of the id of a referenced record.
pub const REF_ID_KEY: &str = "__refId";

/// Key of the target id inside a reference marker.
pub const TO_REF_ID_KEY: &str = "__toRefId";

/// Type tag of a reference marker.
pub const CIRCLE_REF_TAG: &str = "__circleRef";

/// Keys no field of a serializable type may use.
pub const RESERVED_KEYS: [&str; 3] = [TYPE_KEY, REF_ID_KEY, TO_REF_ID_KEY];

/// Returns `true` if `key` is a reserved wire key.
#[inline]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

// -----------------------------------------------------------------------------
// Node

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::SerialError;
use crate::identity::RefId;
use crate::value::Number;

/// A primitive leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// One node of the wire tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Plain(PlainNode),
    Typed(TypedNode),
    /// A placeholder for the record defined elsewhere with this id.
    Ref(RefId),
    /// The name of a registered callback.
    Callback(String),
}

/// An untyped record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlainNode {
    pub ref_id: Option<RefId>,
    pub fields: NodeFields,
}

/// A record carrying a type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedNode {
    pub tag: String,
    pub ref_id: Option<RefId>,
    pub fields: NodeFields,
}

impl TypedNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ref_id: None,
            fields: NodeFields::new(),
        }
    }

    /// Adds a field, replacing any field with the same key.
    #[inline]
    pub fn with(mut self, key: impl Into<String>, node: impl Into<Node>) -> Self {
        self.fields.insert(key, node.into());
        self
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.get(key)
    }

    /// Returns the field `key`, or a contract violation naming it.
    ///
    /// Intended for `from_json` and `construct_args` hooks.
    pub fn require(&self, key: &str) -> Result<&Node, SerialError> {
        self.fields
            .get(key)
            .ok_or_else(|| SerialError::contract(&*self.tag, alloc::format!("missing field `{key}`")))
    }

    /// Returns the field `key` as `i64`, or a contract violation.
    pub fn require_i64(&self, key: &str) -> Result<i64, SerialError> {
        self.require(key)?.as_i64().ok_or_else(|| {
            SerialError::contract(&*self.tag, alloc::format!("field `{key}` is not an integer"))
        })
    }

    /// Returns the field `key` as `&str`, or a contract violation.
    pub fn require_str(&self, key: &str) -> Result<&str, SerialError> {
        self.require(key)?.as_str().ok_or_else(|| {
            SerialError::contract(&*self.tag, alloc::format!("field `{key}` is not a string"))
        })
    }
}

impl Node {
    pub const NULL: Node = Node::Scalar(Scalar::Null);

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Scalar(Scalar::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Scalar(Scalar::Number(n)) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_typed(&self) -> Option<&TypedNode> {
        match self {
            Node::Typed(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn as_plain(&self) -> Option<&PlainNode> {
        match self {
            Node::Plain(node) => Some(node),
            _ => None,
        }
    }

    /// Field `key` of a plain or typed record.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Plain(node) => node.fields.get(key),
            Node::Typed(node) => node.fields.get(key),
            _ => None,
        }
    }

    /// The definition id of a plain or typed record.
    pub fn ref_id(&self) -> Option<RefId> {
        match self {
            Node::Plain(node) => node.ref_id,
            Node::Typed(node) => node.ref_id,
            _ => None,
        }
    }
}

impl From<bool> for Node {
    #[inline]
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    #[inline]
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Number(Number::Int(value)))
    }
}

impl From<f64> for Node {
    #[inline]
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Number(Number::Float(value)))
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    #[inline]
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::String(value))
    }
}

impl From<TypedNode> for Node {
    #[inline]
    fn from(value: TypedNode) -> Self {
        Node::Typed(value)
    }
}

impl From<PlainNode> for Node {
    #[inline]
    fn from(value: PlainNode) -> Self {
        Node::Plain(value)
    }
}

impl From<Vec<Node>> for Node {
    #[inline]
    fn from(value: Vec<Node>) -> Self {
        Node::Sequence(value)
    }
}

// -----------------------------------------------------------------------------
// NodeFields

/// Fields of a record node, in insertion order.
///
/// Keys are unique; order carries no meaning and is ignored by `==`.
#[derive(Debug, Clone, Default)]
pub struct NodeFields(Vec<(String, Node)>);

impl NodeFields {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts a field, returning the replaced node if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(core::mem::replace(slot, node)),
            None => {
                self.0.push((key, node));
                None
            }
        }
    }

    /// Appends a field whose key the caller knows to be absent.
    #[inline]
    pub(crate) fn push_unchecked(&mut self, key: String, node: Node) {
        debug_assert!(!self.contains_key(&key), "duplicate key `{key}`");
        self.0.push((key, node));
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Node)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (&str, &mut Node)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for NodeFields {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, node)| other.get(key).is_some_and(|o| o == node))
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for NodeFields {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut fields = NodeFields::new();
        for (key, node) in iter {
            fields.insert(key, node);
        }
        fields
    }
}
