//! Condition evaluation: `Fn::And`, `Fn::Or`, `Fn::Not`, `Fn::Equals` and
//! named conditions from the `Conditions` section.

use crate::document::{Document, Node, NodeId, Slot};
use crate::error::ResolveError;
use crate::explode::CONDITION_KEY;
use crate::resolver::Resolver;
use crate::types::Arity;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    And,
    Equals,
    Not,
    Or,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 4] = [
        ConditionKind::And,
        ConditionKind::Equals,
        ConditionKind::Not,
        ConditionKind::Or,
    ];

    /// Combinator named by an object key. `Condition` is not a combinator.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Fn::And" => Some(ConditionKind::And),
            "Fn::Equals" => Some(ConditionKind::Equals),
            "Fn::Not" => Some(ConditionKind::Not),
            "Fn::Or" => Some(ConditionKind::Or),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConditionKind::And => "Fn::And",
            ConditionKind::Equals => "Fn::Equals",
            ConditionKind::Not => "Fn::Not",
            ConditionKind::Or => "Fn::Or",
        }
    }

    fn arity(self) -> Arity {
        match self {
            ConditionKind::And | ConditionKind::Or => Arity::Any,
            ConditionKind::Equals => Arity::Fixed(2),
            ConditionKind::Not => Arity::Fixed(1),
        }
    }
}

/// Shape of a condition expression.
enum Form {
    Literal(bool),
    Named(String),
    Wrapper(NodeId),
    Combinator(ConditionKind, NodeId),
}

impl<'a> Resolver<'a> {
    /// Evaluates a condition expression to a boolean.
    ///
    /// Accepts an evaluated boolean, a condition name, the deletion marker
    /// (always false), `{"Condition": name}` or a single-key combinator.
    pub fn evaluate_condition(&mut self, id: NodeId) -> Result<bool, ResolveError> {
        match self.form_of(id)? {
            Form::Literal(holds) => Ok(holds),
            Form::Named(name) => self.evaluate_named_condition(&name),
            Form::Wrapper(name) => self.evaluate_condition(name),
            Form::Combinator(kind, args) => self.evaluate_combinator(kind, args),
        }
    }

    fn form_of(&self, id: NodeId) -> Result<Form, ResolveError> {
        match self.doc.node(id) {
            Node::Bool(holds) => Ok(Form::Literal(*holds)),
            Node::Deleted => Ok(Form::Literal(false)),
            Node::String(name) => Ok(Form::Named(name.clone())),
            Node::Object(entries) if entries.len() == 1 => {
                let Some((key, value)) = entries.first() else {
                    return Err(malformed(&self.doc, id));
                };
                if key == CONDITION_KEY {
                    return Ok(Form::Wrapper(*value));
                }
                ConditionKind::from_key(key)
                    .map(|kind| Form::Combinator(kind, *value))
                    .ok_or_else(|| malformed(&self.doc, id))
            }
            _ => Err(malformed(&self.doc, id)),
        }
    }

    /// Looks `name` up in the `Conditions` section, exploding it on first
    /// use, and evaluates it.
    pub fn evaluate_named_condition(&mut self, name: &str) -> Result<bool, ResolveError> {
        if self.evaluating.iter().any(|active| active == name) {
            return Err(ResolveError::CyclicCondition(name.to_string()));
        }
        let conditions = self
            .doc
            .section("Conditions")
            .ok_or_else(|| ResolveError::UnknownCondition(name.to_string()))?;

        self.evaluating.push(name.to_string());
        let result = self
            .exploded(conditions, Slot::Key(name))
            .and_then(|found| match found {
                Some(condition) => self.evaluate_condition(condition),
                None => Err(ResolveError::UnknownCondition(name.to_string())),
            });
        self.evaluating.pop();

        trace!(condition = name, holds = ?result.as_ref().ok(), "named condition");
        result
    }

    /// Applies a combinator to its (exploded) operand list.
    pub fn evaluate_combinator(
        &mut self,
        kind: ConditionKind,
        args: NodeId,
    ) -> Result<bool, ResolveError> {
        let operands = self.arguments(kind.name(), args, kind.arity())?;
        match kind {
            ConditionKind::And => {
                for operand in operands {
                    if !self.evaluate_condition(operand)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionKind::Or => {
                for operand in operands {
                    if self.evaluate_condition(operand)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ConditionKind::Not => Ok(!self.evaluate_condition(operands[0])?),
            ConditionKind::Equals => {
                let (a, b) = (operands[0], operands[1]);
                if self.doc.is_deleted(a) || self.doc.is_deleted(b) {
                    return Ok(false);
                }
                self.doc.deep_equal(a, b, self.options.max_depth)
            }
        }
    }
}

fn malformed(doc: &Document, id: NodeId) -> ResolveError {
    let shown = doc
        .to_value(id, 8)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| "<nested>".to_string());
    ResolveError::MalformedCondition(shown)
}
