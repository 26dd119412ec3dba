//! Helpers for reading evaluated arguments.

use crate::document::{Document, Node, NodeId};
use crate::error::ResolveError;

/// Scalar as text: strings as-is, numbers and booleans formatted.
pub fn text(doc: &Document, id: NodeId) -> Option<String> {
    match doc.node(id) {
        Node::String(s) => Some(s.clone()),
        Node::Number(n) => Some(n.to_string()),
        Node::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Any value as text for string interpolation.
///
/// Scalars as in [`text`], the deletion marker as the empty string, `null`
/// and containers as compact JSON.
pub fn render(doc: &Document, id: NodeId, max_depth: usize) -> Result<String, ResolveError> {
    if let Some(s) = text(doc, id) {
        return Ok(s);
    }
    match doc.node(id) {
        Node::Deleted => Ok(String::new()),
        _ => Ok(doc.to_value(id, max_depth)?.to_string()),
    }
}

/// Elements of a list argument, skipping deletion markers.
pub fn list_values(doc: &Document, id: NodeId) -> Option<Vec<NodeId>> {
    let items = doc.items(id)?;
    Some(
        items
            .iter()
            .copied()
            .filter(|item| !doc.is_deleted(*item))
            .collect(),
    )
}

pub fn expect_str<'d>(
    doc: &'d Document,
    id: NodeId,
    function: &'static str,
) -> Result<&'d str, ResolveError> {
    doc.as_str(id).ok_or(ResolveError::NotString(function))
}
