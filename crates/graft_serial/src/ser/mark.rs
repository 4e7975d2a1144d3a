use graft_utils::hash::HashSet;

use crate::identity::RefId;
use crate::node::Node;

/// Keeps `ref_id` only on records whose id is in `referenced`.
pub(super) fn retain_referenced(node: &mut Node, referenced: &HashSet<RefId>) {
    match node {
        Node::Sequence(items) => {
            for item in items {
                retain_referenced(item, referenced);
            }
        }
        Node::Plain(record) => {
            record.ref_id = record.ref_id.filter(|id| referenced.contains(id));
            for (_, child) in record.fields.iter_mut() {
                retain_referenced(child, referenced);
            }
        }
        Node::Typed(record) => {
            record.ref_id = record.ref_id.filter(|id| referenced.contains(id));
            for (_, child) in record.fields.iter_mut() {
                retain_referenced(child, referenced);
            }
        }
        Node::Scalar(_) | Node::Ref(_) | Node::Callback(_) => {}
    }
}
