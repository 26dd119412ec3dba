use crate::document::NodeId;
use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::util;

const FN_IF: &str = "Fn::If";

/// `Fn::If: [condition_name, when_true, when_false]`.
///
/// Both branches are already resolved; only the selection happens here.
pub(crate) fn if_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let [condition, when_true, when_false] = ctx.fixed_arguments::<3>(FN_IF, args)?;
    let name = util::expect_str(&ctx.doc, condition, FN_IF)?.to_string();
    if ctx.evaluate_named_condition(&name)? {
        Ok(when_true)
    } else {
        Ok(when_false)
    }
}
