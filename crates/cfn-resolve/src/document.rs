//! Arena-backed template tree.
//!
//! Every value of the template lives in one [`Document`] and is addressed by
//! a [`NodeId`]. Resolution rewrites child slots in place, so one node may
//! end up referenced from several parents (an `Fn::If` branch, the target of
//! a `Ref`). Conversion back to JSON copies such a node out at each position.

use crate::error::ResolveError;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Index of a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single value of the template tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
    /// Removal signal. The slot holding it is dropped by the cleanup pass.
    Deleted,
}

/// Position of a child inside an object or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'k> {
    Key(&'k str),
    Index(usize),
}

/// The template tree, stored as an arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// The deletion marker. There is exactly one per document.
    pub const DELETED: NodeId = NodeId(0);

    /// Moves a JSON value into a fresh arena.
    ///
    /// Uses an explicit work list, so arbitrarily deep input does not grow
    /// the call stack.
    pub fn from_value(value: Value) -> Self {
        let mut doc = Document {
            nodes: vec![Node::Deleted],
            root: Self::DELETED,
        };
        doc.root = doc.alloc_value(value);
        doc
    }

    /// Moves a JSON value into this arena and returns its id.
    pub fn alloc_value(&mut self, value: Value) -> NodeId {
        let top = self.alloc(Node::Null);
        let mut pending = vec![(value, top)];
        while let Some((value, id)) = pending.pop() {
            let node = match value {
                Value::Null => Node::Null,
                Value::Bool(b) => Node::Bool(b),
                Value::Number(n) => Node::Number(n),
                Value::String(s) => Node::String(s),
                Value::Array(items) => {
                    let ids = items
                        .into_iter()
                        .map(|item| {
                            let child = self.alloc(Node::Null);
                            pending.push((item, child));
                            child
                        })
                        .collect();
                    Node::Array(ids)
                }
                Value::Object(map) => {
                    let entries = map
                        .into_iter()
                        .map(|(key, item)| {
                            let child = self.alloc(Node::Null);
                            pending.push((item, child));
                            (key, child)
                        })
                        .collect();
                    Node::Object(entries)
                }
            };
            self.nodes[id.index()] = node;
        }
        top
    }

    /// Copies the subtree at `id` out as JSON.
    ///
    /// Fails with [`ResolveError::Cycle`] if the subtree contains itself and
    /// with [`ResolveError::DepthLimitExceeded`] past `max_depth` levels.
    pub fn to_value(&self, id: NodeId, max_depth: usize) -> Result<Value, ResolveError> {
        let mut path = HashSet::new();
        self.export(id, max_depth, max_depth, &mut path)
    }

    fn export(
        &self,
        id: NodeId,
        remaining: usize,
        limit: usize,
        path: &mut HashSet<NodeId>,
    ) -> Result<Value, ResolveError> {
        let enter = |path: &mut HashSet<NodeId>| {
            if remaining == 0 {
                return Err(ResolveError::DepthLimitExceeded(limit));
            }
            if !path.insert(id) {
                return Err(ResolveError::Cycle);
            }
            Ok(())
        };
        match self.node(id) {
            Node::Null | Node::Deleted => Ok(Value::Null),
            Node::Bool(b) => Ok(Value::Bool(*b)),
            Node::Number(n) => Ok(Value::Number(n.clone())),
            Node::String(s) => Ok(Value::String(s.clone())),
            Node::Array(items) => {
                enter(path)?;
                let out = items
                    .iter()
                    .map(|child| self.export(*child, remaining - 1, limit, path))
                    .collect::<Result<Vec<_>, _>>()?;
                path.remove(&id);
                Ok(Value::Array(out))
            }
            Node::Object(entries) => {
                enter(path)?;
                let mut out = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    out.insert(key.clone(), self.export(*child, remaining - 1, limit, path)?);
                }
                path.remove(&id);
                Ok(Value::Object(out))
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Adds a node. Allocating [`Node::Deleted`] returns the shared marker.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        if matches!(node, Node::Deleted) && !self.nodes.is_empty() {
            return Self::DELETED;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn alloc_string(&mut self, s: impl Into<String>) -> NodeId {
        self.alloc(Node::String(s.into()))
    }

    pub fn alloc_bool(&mut self, b: bool) -> NodeId {
        self.alloc(Node::Bool(b))
    }

    /// Allocates an array of freshly allocated strings.
    pub fn alloc_strings<I, S>(&mut self, items: I) -> NodeId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = items.into_iter().map(|s| self.alloc_string(s)).collect();
        self.alloc(Node::Array(ids))
    }

    pub fn is_deleted(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Deleted)
    }

    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn items(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.node(id) {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn entries(&self, id: NodeId) -> Option<&IndexMap<String, NodeId>> {
        match self.node(id) {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Object member lookup. `None` for missing keys and non-objects.
    pub fn get(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.entries(id)?.get(key).copied()
    }

    /// A top-level section of the template (`Resources`, `Conditions`, ...).
    pub fn section(&self, name: &str) -> Option<NodeId> {
        self.get(self.root, name)
    }

    pub fn child(&self, parent: NodeId, slot: Slot<'_>) -> Option<NodeId> {
        match (self.node(parent), slot) {
            (Node::Object(entries), Slot::Key(key)) => entries.get(key).copied(),
            (Node::Array(items), Slot::Index(index)) => items.get(index).copied(),
            _ => None,
        }
    }

    pub fn set_child(&mut self, parent: NodeId, slot: Slot<'_>, child: NodeId) {
        match (self.node_mut(parent), slot) {
            (Node::Object(entries), Slot::Key(key)) => {
                if let Some(current) = entries.get_mut(key) {
                    *current = child;
                }
            }
            (Node::Array(items), Slot::Index(index)) => {
                if let Some(current) = items.get_mut(index) {
                    *current = child;
                }
            }
            _ => {}
        }
    }

    /// Structural equality of two subtrees.
    ///
    /// Numbers compare by numeric value, so `1` equals `1.0`. Fails with
    /// [`ResolveError::Cycle`] if a comparison reaches a pair of nodes it is
    /// already comparing, and with [`ResolveError::DepthLimitExceeded`]
    /// past `max_depth` levels.
    pub fn deep_equal(&self, a: NodeId, b: NodeId, max_depth: usize) -> Result<bool, ResolveError> {
        let mut path = HashSet::new();
        self.compare(a, b, max_depth, max_depth, &mut path)
    }

    fn compare(
        &self,
        a: NodeId,
        b: NodeId,
        remaining: usize,
        limit: usize,
        path: &mut HashSet<(NodeId, NodeId)>,
    ) -> Result<bool, ResolveError> {
        if a == b {
            return Ok(true);
        }
        let enter = |path: &mut HashSet<(NodeId, NodeId)>| {
            if remaining == 0 {
                return Err(ResolveError::DepthLimitExceeded(limit));
            }
            if !path.insert((a, b)) {
                return Err(ResolveError::Cycle);
            }
            Ok(())
        };
        match (self.node(a), self.node(b)) {
            (Node::Null, Node::Null) => Ok(true),
            (Node::Deleted, Node::Deleted) => Ok(true),
            (Node::Bool(x), Node::Bool(y)) => Ok(x == y),
            (Node::Number(x), Node::Number(y)) => {
                Ok(x == y || matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y))
            }
            (Node::String(x), Node::String(y)) => Ok(x == y),
            (Node::Array(x), Node::Array(y)) => {
                if x.len() != y.len() {
                    return Ok(false);
                }
                enter(path)?;
                let mut equal = true;
                for (x, y) in x.iter().zip(y) {
                    if !self.compare(*x, *y, remaining - 1, limit, path)? {
                        equal = false;
                        break;
                    }
                }
                path.remove(&(a, b));
                Ok(equal)
            }
            (Node::Object(x), Node::Object(y)) => {
                if x.len() != y.len() {
                    return Ok(false);
                }
                enter(path)?;
                let mut equal = true;
                for (key, x) in x {
                    let same = match y.get(key) {
                        Some(y) => self.compare(*x, *y, remaining - 1, limit, path)?,
                        None => false,
                    };
                    if !same {
                        equal = false;
                        break;
                    }
                }
                path.remove(&(a, b));
                Ok(equal)
            }
            _ => Ok(false),
        }
    }
}
