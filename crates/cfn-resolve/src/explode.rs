//! The explosion pass: post-order, memoized evaluation of the whole tree.
//!
//! Children are exploded before their parent is classified, so both
//! branches of an `Fn::If` are resolved before the condition picks one.

use crate::conditions::ConditionKind;
use crate::document::{Document, Node, NodeId, Slot};
use crate::error::ResolveError;
use crate::functions::FunctionKind;
use crate::resolver::Resolver;
use tracing::trace;

/// Key that gates a node on a named condition.
pub const CONDITION_KEY: &str = "Condition";

/// What the caller must do with the slot holding an exploded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Replace(NodeId),
    Delete,
}

impl Outcome {
    fn from_result(id: NodeId) -> Self {
        if id == Document::DELETED {
            Outcome::Delete
        } else {
            Outcome::Replace(id)
        }
    }
}

/// How an object is interpreted once its children are resolved.
enum Dispatch {
    /// `{"Condition": name, ...}`: kept only if the condition holds.
    Gate(String),
    Function(FunctionKind, NodeId),
    Condition(ConditionKind, NodeId),
    Plain,
}

impl<'a> Resolver<'a> {
    /// Explodes the subtree at `id`. A container is visited at most once;
    /// later calls return [`Outcome::Unchanged`].
    pub fn explode(&mut self, id: NodeId) -> Result<Outcome, ResolveError> {
        if !matches!(self.doc.node(id), Node::Object(_) | Node::Array(_)) {
            return Ok(Outcome::Unchanged);
        }
        if !self.visited.insert(id) {
            return Ok(Outcome::Unchanged);
        }
        self.enter()?;
        let outcome = self.explode_container(id);
        self.leave();
        outcome
    }

    fn explode_container(&mut self, id: NodeId) -> Result<Outcome, ResolveError> {
        match self.doc.node(id) {
            Node::Array(items) => {
                for index in 0..items.len() {
                    self.exploded(id, Slot::Index(index))?;
                }
                Ok(Outcome::Unchanged)
            }
            Node::Object(entries) => {
                let keys: Vec<String> = entries.keys().cloned().collect();
                for key in &keys {
                    self.exploded(id, Slot::Key(key))?;
                }
                self.classify(id)
            }
            _ => Ok(Outcome::Unchanged),
        }
    }

    /// Explodes the child of `parent` at `slot` and stores the result back
    /// into the slot. Returns the child now held there, or `None` if the
    /// slot does not exist.
    pub fn exploded(
        &mut self,
        parent: NodeId,
        slot: Slot<'_>,
    ) -> Result<Option<NodeId>, ResolveError> {
        let Some(child) = self.doc.child(parent, slot) else {
            return Ok(None);
        };
        let resolved = match self.explode(child)? {
            Outcome::Unchanged => child,
            Outcome::Replace(id) => id,
            Outcome::Delete => Document::DELETED,
        };
        if resolved != child {
            self.doc.set_child(parent, slot, resolved);
        }
        Ok(Some(resolved))
    }

    fn dispatch_of(&self, id: NodeId) -> Dispatch {
        let Some(entries) = self.doc.entries(id) else {
            return Dispatch::Plain;
        };
        let gate = entries
            .get(CONDITION_KEY)
            .and_then(|condition| self.doc.as_str(*condition))
            .filter(|name| !name.is_empty());
        if let Some(name) = gate {
            return Dispatch::Gate(name.to_string());
        }
        if entries.len() != 1 {
            return Dispatch::Plain;
        }
        let Some((key, args)) = entries.first() else {
            return Dispatch::Plain;
        };
        if let Some(function) = FunctionKind::from_key(key) {
            return Dispatch::Function(function, *args);
        }
        // `Condition` with a non-string value is data, e.g. an IAM policy block.
        match ConditionKind::from_key(key) {
            Some(combinator) => Dispatch::Condition(combinator, *args),
            None => Dispatch::Plain,
        }
    }

    fn classify(&mut self, id: NodeId) -> Result<Outcome, ResolveError> {
        match self.dispatch_of(id) {
            Dispatch::Gate(name) => {
                trace!(condition = %name, "gated node");
                if self.evaluate_named_condition(&name)? {
                    Ok(Outcome::Unchanged)
                } else {
                    Ok(Outcome::Delete)
                }
            }
            Dispatch::Function(function, args) => {
                trace!(function = function.name(), "dispatching function");
                let result = self.evaluate_function(function, args)?;
                Ok(Outcome::from_result(result))
            }
            Dispatch::Condition(combinator, args) => {
                trace!(condition = combinator.name(), "dispatching condition");
                let holds = self.evaluate_combinator(combinator, args)?;
                Ok(Outcome::Replace(self.doc.alloc_bool(holds)))
            }
            Dispatch::Plain => Ok(Outcome::Unchanged),
        }
    }
}
