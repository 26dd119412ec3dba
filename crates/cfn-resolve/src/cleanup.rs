use crate::document::{Document, Node};
use std::collections::HashSet;

/// Removes every deletion marker reachable from the root.
///
/// Object entries holding the marker are dropped; array elements holding it
/// are removed and later elements shift down. Shared nodes are visited once.
pub fn cleanup(doc: &mut Document) {
    let mut seen = HashSet::new();
    let mut pending = vec![doc.root()];
    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        match doc.node_mut(id) {
            Node::Object(entries) => {
                entries.retain(|_, child| *child != Document::DELETED);
                pending.extend(entries.values().copied());
            }
            Node::Array(items) => {
                items.retain(|child| *child != Document::DELETED);
                pending.extend(items.iter().copied());
            }
            _ => {}
        }
    }
}
