//! `Fn::FindInMap`, `Fn::GetAtt` and `Fn::Select`.

use crate::document::{Document, Node, NodeId, Slot};
use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::types::Arity;
use crate::util;
use std::collections::HashSet;
use tracing::debug;

const FN_FIND_IN_MAP: &str = "Fn::FindInMap";
const FN_GET_ATT: &str = "Fn::GetAtt";
const FN_SELECT: &str = "Fn::Select";

/// `Fn::FindInMap: [map_name, key, ...]`. Every step is exploded before it
/// is walked into, so mapping values may themselves be functions.
pub(crate) fn find_in_map_eval(
    ctx: &mut Resolver<'_>,
    args: NodeId,
) -> Result<NodeId, ResolveError> {
    let keys = ctx.arguments(FN_FIND_IN_MAP, args, Arity::AtLeast(2))?;
    let mut current = ctx
        .doc
        .section("Mappings")
        .ok_or(ResolveError::MissingSection("Mappings"))?;
    for key in keys {
        let key = util::text(&ctx.doc, key).ok_or(ResolveError::NotString(FN_FIND_IN_MAP))?;
        current = ctx
            .exploded(current, Slot::Key(&key))?
            .ok_or(ResolveError::MissingKey(key))?;
    }
    Ok(current)
}

/// `Fn::GetAtt: [logical_id, attribute]` or `"logical_id.attribute"`.
pub(crate) fn get_att_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let dotted = ctx.doc.as_str(args).map(str::to_string);
    let (resource, attribute) = match dotted {
        Some(dotted) => match dotted.split_once('.') {
            Some((resource, attribute)) => (resource.to_string(), attribute.to_string()),
            None => {
                return Err(ResolveError::Arity {
                    function: FN_GET_ATT,
                    message: format!("expects \"resource.attribute\", got \"{}\".", dotted),
                })
            }
        },
        None => {
            let [resource, attribute] = ctx.fixed_arguments::<2>(FN_GET_ATT, args)?;
            (
                util::expect_str(&ctx.doc, resource, FN_GET_ATT)?.to_string(),
                util::expect_str(&ctx.doc, attribute, FN_GET_ATT)?.to_string(),
            )
        }
    };
    get_att(ctx, &resource, &attribute)
}

/// Resolves `resource` and returns the first `attribute` key found by a
/// depth-first search of it, or an `UNKNOWN ATT` sentinel. A key holding the
/// deletion marker is a match, so the `Fn::GetAtt` is removed as well.
pub(crate) fn get_att(
    ctx: &mut Resolver<'_>,
    resource: &str,
    attribute: &str,
) -> Result<NodeId, ResolveError> {
    let found = ctx
        .resource(resource)?
        .and_then(|id| find_att(&ctx.doc, id, attribute));
    match found {
        Some(id) => Ok(id),
        None => {
            debug!(resource, attribute, "unresolved attribute");
            Ok(ctx
                .doc
                .alloc_string(format!("UNKNOWN ATT: {}.{}", resource, attribute)))
        }
    }
}

fn find_att(doc: &Document, start: NodeId, attribute: &str) -> Option<NodeId> {
    let mut seen = HashSet::new();
    let mut pending = vec![start];
    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        match doc.node(id) {
            Node::Object(entries) => {
                if let Some(found) = entries.get(attribute) {
                    return Some(*found);
                }
                pending.extend(entries.values().rev().copied());
            }
            Node::Array(items) => pending.extend(items.iter().rev().copied()),
            _ => {}
        }
    }
    None
}

/// `Fn::Select: [index, values]`. The index may be a number or a numeric
/// string.
pub(crate) fn select_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let [index, values] = ctx.fixed_arguments::<2>(FN_SELECT, args)?;
    let index = match ctx.doc.node(index) {
        Node::Number(n) => n.as_i64(),
        Node::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or(ResolveError::InvalidIndex(FN_SELECT))?;
    let values = util::list_values(&ctx.doc, values).ok_or(ResolveError::NotArray(FN_SELECT))?;
    usize::try_from(index)
        .ok()
        .and_then(|i| values.get(i).copied())
        .ok_or(ResolveError::OutOfBounds {
            function: FN_SELECT,
            index,
            len: values.len(),
        })
}
