//! Functions answered by the cloud provider: `Fn::GetAZs` and
//! `Fn::ImportValue`.

use crate::document::NodeId;
use crate::error::ResolveError;
use crate::resolver::Resolver;
use crate::util;
use tracing::debug;

const FN_GET_AZS: &str = "Fn::GetAZs";
const FN_IMPORT_VALUE: &str = "Fn::ImportValue";

/// `Fn::GetAZs: region`. The empty string selects the default region.
pub(crate) fn get_azs_eval(ctx: &mut Resolver<'_>, args: NodeId) -> Result<NodeId, ResolveError> {
    let region = match util::expect_str(&ctx.doc, args, FN_GET_AZS)? {
        "" => ctx.options.default_region.clone(),
        region => region.to_string(),
    };
    let zones = ctx.cloud.availability_zones(&region)?;
    Ok(ctx.doc.alloc_strings(zones))
}

/// `Fn::ImportValue: export_name`, or an `UNKNOWN IMPORT VALUE` sentinel.
pub(crate) fn import_value_eval(
    ctx: &mut Resolver<'_>,
    args: NodeId,
) -> Result<NodeId, ResolveError> {
    let name = util::expect_str(&ctx.doc, args, FN_IMPORT_VALUE)?.to_string();
    let value = match ctx.cloud.import_value(&name)? {
        Some(value) => value,
        None => {
            debug!(name = %name, "unresolved import");
            format!("UNKNOWN IMPORT VALUE: {}", name)
        }
    };
    Ok(ctx.doc.alloc_string(value))
}
