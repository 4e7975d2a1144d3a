use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use graft_utils::hash::HashSet;
use serde_core::de::{Error, MapAccess, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer};

use super::{CIRCLE_REF_TAG, REF_ID_KEY, TO_REF_ID_KEY, TYPE_KEY};
use super::{Node, NodeFields, PlainNode, Scalar, TypedNode};
use crate::callback::decode_name;
use crate::identity::RefId;
use crate::value::Number;

impl<'de> Deserialize<'de> for Node {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

#[inline]
fn string_node(s: &str) -> Node {
    match decode_name(s) {
        Some(name) => Node::Callback(name.into()),
        None => Node::Scalar(Scalar::String(s.into())),
    }
}

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a serialized node")
    }

    #[inline]
    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Node::NULL)
    }

    #[inline]
    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(Node::NULL)
    }

    #[inline]
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Node::deserialize(deserializer)
    }

    #[inline]
    fn visit_bool<E: Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Node::Scalar(Scalar::Bool(v)))
    }

    #[inline]
    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Node::Scalar(Scalar::Number(Number::Int(v))))
    }

    #[inline]
    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Node::Scalar(Scalar::Number(Number::from_u64(v))))
    }

    #[inline]
    fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Node::Scalar(Scalar::Number(Number::Float(v))))
    }

    #[inline]
    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(string_node(v))
    }

    fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
        if decode_name(&v).is_some() {
            Ok(string_node(&v))
        } else {
            Ok(Node::Scalar(Scalar::String(v)))
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut tag: Option<String> = None;
        let mut ref_id: Option<u32> = None;
        let mut to_ref_id: Option<u32> = None;
        let capacity = map.size_hint().unwrap_or(0).min(64);
        let mut fields = NodeFields::with_capacity(capacity);
        let mut seen: HashSet<String> = HashSet::with_capacity_and_hasher(capacity, Default::default());

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                TYPE_KEY => {
                    if tag.is_some() {
                        return Err(Error::duplicate_field(TYPE_KEY));
                    }
                    tag = Some(map.next_value()?);
                }
                REF_ID_KEY => {
                    if ref_id.is_some() {
                        return Err(Error::duplicate_field(REF_ID_KEY));
                    }
                    ref_id = Some(map.next_value()?);
                }
                TO_REF_ID_KEY => {
                    if to_ref_id.is_some() {
                        return Err(Error::duplicate_field(TO_REF_ID_KEY));
                    }
                    to_ref_id = Some(map.next_value()?);
                }
                _ => {
                    if !seen.insert(key.clone()) {
                        return Err(Error::custom(format_args!("duplicate field `{key}` in record")));
                    }
                    let node = map.next_value::<Node>()?;
                    fields.push_unchecked(key, node);
                }
            }
        }

        if to_ref_id.is_some() && (ref_id.is_some() || !fields.is_empty()) {
            return Err(Error::custom(format_args!(
                "a reference marker carries only `{TYPE_KEY}` and `{TO_REF_ID_KEY}`"
            )));
        }

        match (tag, to_ref_id) {
            (Some(tag), Some(id)) if tag == CIRCLE_REF_TAG => Ok(Node::Ref(RefId(id))),
            (None, Some(id)) => Ok(Node::Ref(RefId(id))),
            (Some(tag), None) if tag == CIRCLE_REF_TAG => Err(Error::missing_field(TO_REF_ID_KEY)),
            (Some(tag), Some(_)) => Err(Error::custom(format_args!(
                "`{TO_REF_ID_KEY}` is only valid on reference markers, found it on type `{tag}`"
            ))),
            (Some(tag), None) => Ok(Node::Typed(TypedNode {
                tag,
                ref_id: ref_id.map(RefId),
                fields,
            })),
            (None, None) => Ok(Node::Plain(PlainNode {
                ref_id: ref_id.map(RefId),
                fields,
            })),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::identity::RefId;
    use crate::node::{Node, NodeFields, PlainNode, Scalar, TypedNode};
    use crate::value::Number;

    fn parse(s: &str) -> Result<Node, serde_json::Error> {
        serde_json::from_str(s)
    }

    #[test]
    fn markers_and_definitions() {
        let node = parse(
            r#"{"__registeredType":"Cell","v":[1,2.5,"s",null,true],
                "next":{"__registeredType":"__circleRef","__toRefId":0},"__refId":0}"#,
        )
        .unwrap();

        let expected = TypedNode {
            tag: "Cell".into(),
            ref_id: Some(RefId(0)),
            fields: [
                (
                    "v",
                    Node::Sequence(vec![
                        Node::from(1_i64),
                        Node::from(2.5),
                        Node::from("s"),
                        Node::NULL,
                        Node::from(true),
                    ]),
                ),
                ("next", Node::Ref(RefId(0))),
            ]
            .into_iter()
            .collect(),
        };
        assert_eq!(node, Node::Typed(expected));
    }

    #[test]
    fn plain_record_with_ref_id() {
        let node = parse(r#"{"a":1,"__refId":3}"#).unwrap();
        assert_eq!(
            node,
            Node::Plain(PlainNode {
                ref_id: Some(RefId(3)),
                fields: [("a", Node::from(1_i64))].into_iter().collect::<NodeFields>(),
            })
        );
    }

    #[test]
    fn callback_strings() {
        let node = parse(r#"["<REGISTERED FUNCTION>tick","plain"]"#).unwrap();
        assert_eq!(
            node,
            Node::Sequence(vec![Node::Callback("tick".into()), Node::from("plain")])
        );
    }

    #[test]
    fn malformed_markers() {
        assert!(parse(r#"{"__registeredType":"__circleRef"}"#).is_err());
        assert!(parse(r#"{"__registeredType":"Cell","__toRefId":1}"#).is_err());
        assert!(parse(r#"{"__refId":-1}"#).is_err());
    }

    #[test]
    fn serialize_key_order() {
        let node = Node::Typed(TypedNode {
            tag: "Cell".into(),
            ref_id: Some(RefId(2)),
            fields: [("v", Node::Ref(RefId(2)))].into_iter().collect(),
        });
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"__registeredType":"Cell","v":{"__registeredType":"__circleRef","__toRefId":2},"__refId":2}"#,
        );
    }

    #[test]
    fn other_formats() {
        let node = parse(
            r#"{"__registeredType":"Cell","v":[1,2.5],"next":{"__registeredType":"__circleRef","__toRefId":0},"__refId":0}"#,
        )
        .unwrap();

        let text = ron::to_string(&node).unwrap();
        let back: Node = ron::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn marker_with_extra_keys() {
        assert!(parse(r#"{"__toRefId":1,"x":5}"#).is_err());
        assert!(parse(r#"{"__registeredType":"__circleRef","__toRefId":1,"__refId":2}"#).is_err());
        assert_eq!(parse(r#"{"__toRefId":1}"#).unwrap(), Node::Ref(RefId(1)));
    }

    #[test]
    fn duplicate_record_keys() {
        let err = parse(r#"{"a":1,"b":2,"a":3}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate field `a`"));
    }

    #[test]
    fn unsigned_above_i64() {
        let node = parse("18446744073709551615").unwrap();
        assert_eq!(node, Node::Scalar(Scalar::Number(Number::UInt(u64::MAX))));
        assert_eq!(serde_json::to_string(&node).unwrap(), "18446744073709551615");
    }
}
