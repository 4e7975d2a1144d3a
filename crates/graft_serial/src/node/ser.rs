use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Serialize, Serializer};

use super::{CIRCLE_REF_TAG, REF_ID_KEY, TO_REF_ID_KEY, TYPE_KEY};
use super::{Node, NodeFields, PlainNode, Scalar, TypedNode};
use crate::callback::encode_name;
use crate::identity::RefId;
use crate::value::Number;

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Plain(node) => node.serialize(serializer),
            Node::Typed(node) => node.serialize(serializer),
            Node::Ref(id) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(TYPE_KEY, CIRCLE_REF_TAG)?;
                map.serialize_entry(TO_REF_ID_KEY, &id.get())?;
                map.end()
            }
            Node::Callback(name) => serializer.serialize_str(&encode_name(name)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::Number(Number::Int(v)) => serializer.serialize_i64(*v),
            Scalar::Number(Number::UInt(v)) => serializer.serialize_u64(*v),
            Scalar::Number(Number::Float(v)) => serializer.serialize_f64(*v),
            Scalar::String(v) => serializer.serialize_str(v),
        }
    }
}

fn serialize_record<S: Serializer>(
    serializer: S,
    tag: Option<&str>,
    fields: &NodeFields,
    ref_id: Option<RefId>,
) -> Result<S::Ok, S::Error> {
    let len = fields.len() + usize::from(tag.is_some()) + usize::from(ref_id.is_some());
    let mut map = serializer.serialize_map(Some(len))?;
    if let Some(tag) = tag {
        map.serialize_entry(TYPE_KEY, tag)?;
    }
    for (key, node) in fields.iter() {
        map.serialize_entry(key, node)?;
    }
    if let Some(id) = ref_id {
        map.serialize_entry(REF_ID_KEY, &id.get())?;
    }
    map.end()
}

impl Serialize for PlainNode {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_record(serializer, None, &self.fields, self.ref_id)
    }
}

impl Serialize for TypedNode {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_record(serializer, Some(&self.tag), &self.fields, self.ref_id)
    }
}
