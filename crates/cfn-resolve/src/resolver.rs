//! Per-resolution state shared by the engine and the evaluators.

use crate::cleanup::cleanup;
use crate::cloud::{CloudProvider, CloudSession};
use crate::config::ResolveOptions;
use crate::document::{Document, Node, NodeId, Slot};
use crate::error::ResolveError;
use crate::explode::Outcome;
use crate::types::{assert_arity, Arity};
use std::collections::HashSet;
use tracing::debug;

/// Resolves one document. Created per call and dropped afterwards, so the
/// visited set and the export cache never outlive a resolution.
pub struct Resolver<'a> {
    pub(crate) doc: Document,
    pub(crate) options: &'a ResolveOptions,
    pub(crate) cloud: CloudSession<'a>,
    /// Containers already explode-visited.
    pub(crate) visited: HashSet<NodeId>,
    /// Named conditions currently being evaluated, innermost last.
    pub(crate) evaluating: Vec<String>,
    depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(
        doc: Document,
        options: &'a ResolveOptions,
        provider: &'a dyn CloudProvider,
    ) -> Result<Self, ResolveError> {
        options.validate()?;
        Ok(Resolver {
            doc,
            options,
            cloud: CloudSession::new(provider),
            visited: HashSet::new(),
            evaluating: Vec::new(),
            depth: 0,
        })
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Explodes the whole document, then removes deletion markers.
    pub fn run(mut self) -> Result<Document, ResolveError> {
        let root = self.doc.root();
        match self.explode(root)? {
            Outcome::Unchanged => {}
            Outcome::Replace(id) => self.doc.set_root(id),
            Outcome::Delete => {
                debug!("template root deleted");
                let null = self.doc.alloc(Node::Null);
                self.doc.set_root(null);
            }
        }
        cleanup(&mut self.doc);
        Ok(self.doc)
    }

    pub(crate) fn enter(&mut self) -> Result<(), ResolveError> {
        if self.depth >= self.options.max_depth {
            return Err(ResolveError::DepthLimitExceeded(self.options.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Explodes every element of the argument list `args` and returns the
    /// resulting ids, deletion markers included.
    pub(crate) fn arguments(
        &mut self,
        function: &'static str,
        args: NodeId,
        arity: Arity,
    ) -> Result<Vec<NodeId>, ResolveError> {
        let len = self
            .doc
            .items(args)
            .ok_or(ResolveError::NotArray(function))?
            .len();
        assert_arity(function, arity, len)?;
        let mut out = Vec::with_capacity(len);
        for index in 0..len {
            out.push(
                self.exploded(args, Slot::Index(index))?
                    .unwrap_or(Document::DELETED),
            );
        }
        Ok(out)
    }

    /// Like [`Resolver::arguments`] with exactly `N` arguments.
    pub(crate) fn fixed_arguments<const N: usize>(
        &mut self,
        function: &'static str,
        args: NodeId,
    ) -> Result<[NodeId; N], ResolveError> {
        let list = self.arguments(function, args, Arity::Fixed(N))?;
        list.try_into().map_err(|list: Vec<NodeId>| ResolveError::Arity {
            function,
            message: format!("expects {} arguments, got {}.", N, list.len()),
        })
    }

    /// The exploded resource `logical_id`, unless it is absent or was
    /// removed by its condition.
    pub(crate) fn resource(&mut self, logical_id: &str) -> Result<Option<NodeId>, ResolveError> {
        let Some(resources) = self.doc.section("Resources") else {
            return Ok(None);
        };
        let resource = self.exploded(resources, Slot::Key(logical_id))?;
        Ok(resource.filter(|id| !self.doc.is_deleted(*id)))
    }
}
