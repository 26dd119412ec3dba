//! Intrinsic functions.
//!
//! Each submodule holds one family. Every evaluator receives the already
//! exploded argument node and returns the id of its result, which may be
//! an existing node, a freshly allocated one or [`Document::DELETED`].
//!
//! [`Document::DELETED`]: crate::document::Document::DELETED

pub mod branching;
pub mod cloud;
pub mod lookup;
pub mod reference;
pub mod string;

use crate::document::NodeId;
use crate::error::ResolveError;
use crate::resolver::Resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Base64,
    FindInMap,
    GetAtt,
    GetAZs,
    If,
    ImportValue,
    Join,
    Ref,
    Select,
    Split,
    Sub,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 11] = [
        FunctionKind::Base64,
        FunctionKind::FindInMap,
        FunctionKind::GetAtt,
        FunctionKind::GetAZs,
        FunctionKind::If,
        FunctionKind::ImportValue,
        FunctionKind::Join,
        FunctionKind::Ref,
        FunctionKind::Select,
        FunctionKind::Split,
        FunctionKind::Sub,
    ];

    /// Function named by an object key, if any.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == key)
    }

    pub fn name(self) -> &'static str {
        match self {
            FunctionKind::Base64 => "Fn::Base64",
            FunctionKind::FindInMap => "Fn::FindInMap",
            FunctionKind::GetAtt => "Fn::GetAtt",
            FunctionKind::GetAZs => "Fn::GetAZs",
            FunctionKind::If => "Fn::If",
            FunctionKind::ImportValue => "Fn::ImportValue",
            FunctionKind::Join => "Fn::Join",
            FunctionKind::Ref => "Ref",
            FunctionKind::Select => "Fn::Select",
            FunctionKind::Split => "Fn::Split",
            FunctionKind::Sub => "Fn::Sub",
        }
    }
}

impl<'a> Resolver<'a> {
    pub fn evaluate_function(
        &mut self,
        kind: FunctionKind,
        args: NodeId,
    ) -> Result<NodeId, ResolveError> {
        match kind {
            FunctionKind::Base64 => string::base64_eval(self, args),
            FunctionKind::FindInMap => lookup::find_in_map_eval(self, args),
            FunctionKind::GetAtt => lookup::get_att_eval(self, args),
            FunctionKind::GetAZs => cloud::get_azs_eval(self, args),
            FunctionKind::If => branching::if_eval(self, args),
            FunctionKind::ImportValue => cloud::import_value_eval(self, args),
            FunctionKind::Join => string::join_eval(self, args),
            FunctionKind::Ref => reference::ref_eval(self, args),
            FunctionKind::Select => lookup::select_eval(self, args),
            FunctionKind::Split => string::split_eval(self, args),
            FunctionKind::Sub => string::sub_eval(self, args),
        }
    }
}
