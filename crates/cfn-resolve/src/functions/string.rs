//! `Fn::Base64`, `Fn::Join`, `Fn::Split` and `Fn::Sub`.

use crate::document::{Node, NodeId};
use crate::error::ResolveError;
use crate::functions::{lookup, reference};
use crate::resolver::Resolver;
use crate::util;
use base64::Engine;
use indexmap::IndexMap;

const FN_BASE64: &str = "Fn::Base64";
const FN_JOIN: &str = "Fn::Join";
const FN_SPLIT: &str = "Fn::Split";
const FN_SUB: &str = "Fn::Sub";

pub(crate) fn base64_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(util::expect_str(&ctx.doc, args, FN_BASE64)?);
    Ok(ctx.doc.alloc_string(encoded))
}

/// `Fn::Join: [delimiter, values]`. Deleted values are skipped.
pub(crate) fn join_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let [delimiter, values] = ctx.fixed_arguments::<2>(FN_JOIN, args)?;
    let delimiter = util::expect_str(&ctx.doc, delimiter, FN_JOIN)?;
    let parts = util::list_values(&ctx.doc, values)
        .ok_or(ResolveError::NotArray(FN_JOIN))?
        .into_iter()
        .map(|value| util::text(&ctx.doc, value).ok_or(ResolveError::NotString(FN_JOIN)))
        .collect::<Result<Vec<_>, _>>()?;
    let joined = parts.join(delimiter);
    Ok(ctx.doc.alloc_string(joined))
}

/// `Fn::Split: [delimiter, source]`. Empty fields are kept.
pub(crate) fn split_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let [delimiter, source] = ctx.fixed_arguments::<2>(FN_SPLIT, args)?;
    let delimiter = util::expect_str(&ctx.doc, delimiter, FN_SPLIT)?.to_string();
    if delimiter.is_empty() {
        return Err(ResolveError::EmptyDelimiter(FN_SPLIT));
    }
    let parts: Vec<String> = util::expect_str(&ctx.doc, source, FN_SPLIT)?
        .split(delimiter.as_str())
        .map(str::to_string)
        .collect();
    Ok(ctx.doc.alloc_strings(parts))
}

/// `Fn::Sub: template` or `Fn::Sub: [template, variables]`.
pub(crate) fn sub_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let (template, variables) = match ctx.doc.node(args) {
        Node::String(template) => (template.clone(), IndexMap::new()),
        Node::Array(_) => {
            let [template, variables] = ctx.fixed_arguments::<2>(FN_SUB, args)?;
            let template = util::expect_str(&ctx.doc, template, FN_SUB)?.to_string();
            let variables = ctx
                .doc
                .entries(variables)
                .ok_or(ResolveError::NotObject(FN_SUB))?
                .clone();
            (template, variables)
        }
        _ => return Err(ResolveError::NotString(FN_SUB)),
    };
    let substituted = substitute(ctx, &template, &variables)?;
    Ok(ctx.doc.alloc_string(substituted))
}

fn sub_variable_regex() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Replaces each `${name}` token of `template`.
///
/// `${!name}` is emitted as the literal `${name}`. Otherwise an entry of
/// `variables` wins, then `resource.attribute` goes through `Fn::GetAtt`
/// and any other name through `Ref`.
pub(crate) fn substitute(
    ctx: &mut Resolver<'_>,
    template: &str,
    variables: &IndexMap<String, NodeId>,
) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for captures in sub_variable_regex().captures_iter(template) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        out.push_str(&template[last..token.start()]);
        last = token.end();

        let name = name.as_str();
        if let Some(literal) = name.strip_prefix('!') {
            out.push_str("${");
            out.push_str(literal);
            out.push('}');
            continue;
        }
        let value = match variables.get(name) {
            Some(value) => *value,
            None => match name.split_once('.') {
                Some((resource, attribute)) => lookup::get_att(ctx, resource, attribute)?,
                None => reference::reference(ctx, name)?,
            },
        };
        out.push_str(&util::render(&ctx.doc, value, ctx.options.max_depth)?);
    }
    out.push_str(&template[last..]);
    Ok(out)
}
