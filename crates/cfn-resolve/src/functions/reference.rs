//! `Ref` and the pseudo-parameter table.

use crate::document::{Document, Node, NodeId};
use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::util;
use tracing::debug;

const REF: &str = "Ref";

pub const NO_VALUE: &str = "AWS::NoValue";
pub const REGION: &str = "AWS::Region";
pub const PARTITION: &str = "AWS::Partition";
pub const URL_SUFFIX: &str = "AWS::URLSuffix";

pub(crate) fn ref_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let name = util::expect_str(&ctx.doc, args, REF)?.to_string();
    reference(ctx, &name)
}

/// Resolves a reference name, in order: pseudo-parameter, supplied
/// parameter, resource name property, else an `UNKNOWN REF` sentinel.
pub(crate) fn reference(ctx: &mut Resolver<'_>, name: &str) -> Result<NodeId, ResolveError> {
    if let Some(value) = pseudo_parameter(ctx, name) {
        return Ok(value);
    }
    if let Some(value) = ctx.options.parameters.get(name) {
        return Ok(ctx.doc.alloc_value(value.clone()));
    }
    if let Some(resource) = ctx.resource(name)? {
        if let Some(value) = resource_name(&ctx.doc, resource) {
            return Ok(value);
        }
    }
    debug!(name, "unresolved reference");
    Ok(ctx.doc.alloc_string(format!("UNKNOWN REF: {}", name)))
}

fn pseudo_parameter(ctx: &mut Resolver<'_>, name: &str) -> Option<NodeId> {
    if name == NO_VALUE {
        return Some(Document::DELETED);
    }
    let region = ctx.options.default_region.as_str();
    let value = match ctx.options.pseudo_parameters.get(name) {
        Some(value) => value.clone(),
        None => match name {
            REGION => region.to_string(),
            PARTITION => partition(region).to_string(),
            URL_SUFFIX => url_suffix(region).to_string(),
            _ => return None,
        },
    };
    Some(ctx.doc.alloc_string(value))
}

pub fn partition(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else {
        "aws"
    }
}

pub fn url_suffix(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    }
}

/// The `<ShortType>Name` property of a resource, e.g. `BucketName` for
/// `AWS::S3::Bucket`.
fn resource_name(doc: &Document, resource: NodeId) -> Option<NodeId> {
    let kind = doc.as_str(doc.get(resource, "Type")?)?;
    let (namespace, short) = kind.rsplit_once("::")?;
    if namespace.is_empty() || short.is_empty() {
        return None;
    }
    let properties = doc.get(resource, "Properties")?;
    let name = doc.get(properties, &format!("{}Name", short))?;
    match doc.node(name) {
        Node::Null | Node::Deleted => None,
        Node::String(s) if s.is_empty() => None,
        _ => Some(name),
    }
}
