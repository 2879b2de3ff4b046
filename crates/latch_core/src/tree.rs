//! Node references and subtree containment
//!
//! Outside-click dismissal needs one question answered by the host: "is this
//! pointer target inside that subtree?". [`Containment`] is that question.
//!
//! Hosts with their own retained tree implement [`Containment`] directly and
//! map their handles through [`NodeId::from_raw`]. Hosts without one (tests,
//! the playground, immediate-mode renderers) can use [`NodeTree`], a small
//! parent-linked arena.

use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    ///
    /// This is useful for storing node IDs in type-erased host contexts.
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation
    ///
    /// The raw value should come from `to_raw()`; any other value yields an id
    /// that simply never matches a live node.
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Subtree containment test supplied by the host
pub trait Containment {
    /// Returns true when `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;
}

impl<F> Containment for F
where
    F: Fn(NodeId, NodeId) -> bool,
{
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self(ancestor, node)
    }
}

#[derive(Debug, Default)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parent-linked node arena implementing [`Containment`]
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeEntry>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parentless node
    pub fn create_root(&mut self) -> NodeId {
        self.nodes.insert(NodeEntry::default())
    }

    /// Create a node under `parent`
    ///
    /// Returns `None` if `parent` has been removed.
    pub fn create_child(&mut self, parent: NodeId) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let child = self.nodes.insert(NodeEntry {
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(entry) = self.nodes.get_mut(parent) {
            entry.children.push(child);
        }
        Some(child)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, node: NodeId) {
        let Some(entry) = self.nodes.get(node) else {
            return;
        };
        if let Some(parent) = entry.parent {
            if let Some(parent_entry) = self.nodes.get_mut(parent) {
                parent_entry.children.retain(|c| *c != node);
            }
        }

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(current) {
                stack.extend(removed.children);
            }
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|e| e.parent)
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Containment for NodeTree {
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}
