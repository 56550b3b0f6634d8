// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::node::{Node, NodeId};
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};
use core::{error, fmt};

/// Error type returned by [`NodePool`] allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The pool has a fixed capacity and every slot is in use.
    Exhausted {
        /// The fixed capacity of the pool.
        capacity: usize,
    },
    /// The pool already addresses as many nodes as a [`NodeId`] can represent.
    IndexOverflow,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::Exhausted { capacity } => {
                write!(f, "node pool exhausted (capacity {capacity})")
            }
            AllocError::IndexOverflow => write!(f, "node index overflow"),
        }
    }
}

impl error::Error for AllocError {}

/// A flat array of [`Node`]s.
///
/// `NodePool` is a convenience for callers that do not already have a natural place to keep
/// their nodes. It hands out zeroed nodes by [`NodeId`], recycles released ones, and
/// dereferences to the node slice expected by [`AvlTree`](crate::AvlTree) operations.
///
/// A pool created by [`NodePool::with_capacity`] never reallocates, which keeps every node at a
/// stable address and bounds the memory a tree can use.
pub struct NodePool<K> {
    pub(crate) nodes: Vec<Node<K>>,
    pub(crate) free: Vec<NodeId>,
    /// `vacant[i]` is set while slot `i` sits on the free list.
    pub(crate) vacant: Vec<bool>,
    fixed_capacity: Option<usize>,
    /// Pending node kept around between [`AvlTree::insert_pooled`](crate::AvlTree::insert_pooled)
    /// calls that did not consume it.
    pub(crate) spare: Option<NodeId>,
}

impl<K> Default for NodePool<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for NodePool<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("nodes", &self.nodes)
            .field("free", &self.free)
            .field("vacant", &self.vacant)
            .field("fixed_capacity", &self.fixed_capacity)
            .field("spare", &self.spare)
            .finish()
    }
}

impl<K> NodePool<K> {
    /// Creates a new, empty pool that grows on demand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            vacant: Vec::new(),
            fixed_capacity: None,
            spare: None,
        }
    }

    /// Creates a new, empty pool that holds at most `capacity` nodes.
    ///
    /// The backing storage is allocated once, up front.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            vacant: Vec::with_capacity(capacity),
            fixed_capacity: Some(capacity),
            spare: None,
        }
    }

    /// Returns the number of node slots handed out so far, including released ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever allocated from this pool.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the fixed capacity of this pool, `None` if it grows on demand.
    pub fn capacity(&self) -> Option<usize> {
        self.fixed_capacity
    }

    /// Returns a zeroed node, reusing previously released nodes first.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Exhausted`] if the pool has a fixed capacity and every slot is in
    /// use, [`AllocError::IndexOverflow`] if the new node could not be addressed by a [`NodeId`].
    pub fn alloc(&mut self) -> Result<NodeId, AllocError> {
        if let Some(id) = self.free.pop() {
            debug_assert!(!self.nodes[id.index()].is_claimed());
            self.vacant[id.index()] = false;
            return Ok(id);
        }

        if let Some(capacity) = self
            .fixed_capacity
            .filter(|&capacity| self.nodes.len() >= capacity)
        {
            return Err(AllocError::Exhausted { capacity });
        }

        let id = NodeId::from_index(self.nodes.len()).ok_or(AllocError::IndexOverflow)?;
        self.nodes.push(Node::new());
        self.vacant.push(false);
        tracing::trace!(%id, "allocated node");

        Ok(id)
    }

    /// Returns an unclaimed node to the pool so a later [`NodePool::alloc`] can hand it out
    /// again.
    ///
    /// Nodes that are part of a tree must not be released, tear the tree down first. Releasing
    /// a node that is already free does nothing.
    pub fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        debug_assert!(
            !node.is_claimed(),
            "released node {id} is still part of a tree"
        );
        node.reset();
        self.recycle(id);
    }

    /// Puts a zeroed node back on the free list, at most once.
    fn recycle(&mut self, id: NodeId) {
        if self.spare == Some(id) {
            self.spare = None;
        }
        if core::mem::replace(&mut self.vacant[id.index()], true) {
            tracing::trace!(%id, "node already released");
            return;
        }
        self.free.push(id);
    }

    /// Drops every node, invalidating all ids handed out so far.
    ///
    /// Trees using this pool must be torn down or forgotten before calling this.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.vacant.clear();
        self.spare = None;
    }

    /// Returns the cached pending node, allocating a fresh one if the last was consumed.
    pub(crate) fn take_spare(&mut self) -> Result<Option<NodeId>, AllocError> {
        match self.spare.take() {
            Some(id) => Ok(Some(id)),
            None => self.alloc().map(Some),
        }
    }
}

impl<K> Deref for NodePool<K> {
    type Target = [Node<K>];

    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

impl<K> DerefMut for NodePool<K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.nodes
    }
}
