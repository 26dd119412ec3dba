//! Resolver for CloudFormation templates.
//!
//! # Overview
//!
//! A template is a JSON tree in which some single-key objects are intrinsic
//! function calls (`{"Fn::Join": [...]}`, `{"Ref": "..."}`) or condition
//! combinators (`{"Fn::Equals": [...]}`). Resolution replaces every such
//! object with its value, drops resources and properties gated on false
//! conditions and removes `AWS::NoValue` entries.
//!
//! It runs in two passes over an arena copy of the tree:
//!
//! 1. explode: post-order, each container visited once, children before
//!    their parent;
//! 2. cleanup: deletion markers are removed from objects and arrays.
//!
//! # Example
//!
//! ```
//! use cfn_resolve::{resolve, OfflineCloud, ResolveOptions};
//! use serde_json::json;
//!
//! let mut template = json!({
//!     "Conditions": {"IsProd": {"Fn::Equals": ["prod", "dev"]}},
//!     "Resources": {
//!         "Queue": {"Type": "AWS::SQS::Queue", "Condition": "IsProd"},
//!         "Bucket": {
//!             "Type": "AWS::S3::Bucket",
//!             "Properties": {
//!                 "BucketName": {"Fn::Join": ["-", ["logs", {"Ref": "AWS::Region"}]]},
//!                 "Tags": {"Fn::If": ["IsProd", [], {"Ref": "AWS::NoValue"}]}
//!             }
//!         }
//!     }
//! });
//! let options = ResolveOptions::new("eu-west-1");
//! resolve(&mut template, &options, &OfflineCloud).unwrap();
//!
//! assert_eq!(template, json!({
//!     "Conditions": {"IsProd": false},
//!     "Resources": {
//!         "Bucket": {
//!             "Type": "AWS::S3::Bucket",
//!             "Properties": {"BucketName": "logs-eu-west-1"}
//!         }
//!     }
//! }));
//! ```

pub mod cleanup;
pub mod cloud;
pub mod conditions;
pub mod config;
pub mod document;
pub mod error;
pub mod explode;
pub mod functions;
pub mod loaders;
pub mod resolver;
pub mod types;
pub mod util;

pub use cloud::{CloudError, CloudProvider, CloudSession, OfflineCloud, StaticCloud};
pub use conditions::ConditionKind;
pub use config::{ResolveOptions, DEFAULT_MAX_DEPTH};
pub use document::{Document, Node, NodeId, Slot};
pub use error::ResolveError;
pub use explode::Outcome;
pub use functions::FunctionKind;
pub use loaders::{load_json, load_yaml, parse_json, parse_yaml};
pub use resolver::Resolver;

use serde_json::Value;
use tracing::debug;

/// Resolves `template` in place.
///
/// On error `template` is left untouched.
pub fn resolve(
    template: &mut Value,
    options: &ResolveOptions,
    cloud: &dyn CloudProvider,
) -> Result<(), ResolveError> {
    *template = resolved(template.clone(), options, cloud)?;
    Ok(())
}

/// Resolves `template` and returns the result.
#[tracing::instrument(level = "debug", skip_all, fields(region = %options.default_region))]
pub fn resolved(
    template: Value,
    options: &ResolveOptions,
    cloud: &dyn CloudProvider,
) -> Result<Value, ResolveError> {
    options.validate()?;
    let doc = Resolver::new(Document::from_value(template), options, cloud)?.run()?;
    let out = doc.to_value(doc.root(), options.max_depth)?;
    debug!("template resolved");
    Ok(out)
}
