// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::utils::Side;
use core::{fmt, mem};

/// Index of a [`Node`] within the caller's node storage.
///
/// Trees never hold pointers to their nodes, only `NodeId`s, so nodes may live in any flat array
/// (a `Vec`, a fixed-size array, a [`NodePool`](crate::NodePool), ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the id of the node at `index`.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the id of the node at `index`, or `None` if `index` cannot be represented.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Returns the position of this node within the node storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Link = Option<NodeId>;

/// Returns the size in bytes of one node record holding keys of type `K`.
///
/// Useful to pre-allocate raw storage for a fixed number of nodes without relying on the node
/// layout.
#[must_use]
pub const fn node_size<K>() -> usize {
    mem::size_of::<Node<K>>()
}

/// A node of an [`AvlTree`](crate::AvlTree).
///
/// Nodes are allocated by the caller, in the *zeroed* state returned by [`Node::new`], and handed
/// to [`AvlTree::insert`](crate::AvlTree::insert) as the pending node. A node that got claimed by
/// the tree holds the inserted key until the tree is torn down, at which point it returns to the
/// zeroed state.
pub struct Node<K> {
    key: Option<K>,
    pub(crate) links: Links,
}

/// Structural part of a [`Node`], owned by the tree while the node is linked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    left: Link,
    right: Link,
    /// `height(right) - height(left)`, always one of `-1`, `0` or `1` between tree operations.
    balance: i8,
}

impl<K> Default for Node<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("left", &self.links.left)
            .field("right", &self.links.right)
            .field("balance", &self.links.balance)
            .finish()
    }
}

impl<K> Node<K> {
    /// Returns a new, zeroed node that is not part of any tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            key: None,
            links: Links::new(),
        }
    }

    /// The key stored in this node, `None` if the node was never claimed by a tree.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Returns `true` if this node was claimed by a tree and holds a key.
    pub fn is_claimed(&self) -> bool {
        self.key.is_some()
    }

    /// The left child of this node.
    pub fn left(&self) -> Option<NodeId> {
        self.links.left
    }

    /// The right child of this node.
    pub fn right(&self) -> Option<NodeId> {
        self.links.right
    }

    /// The balance factor of this node, `height(right) - height(left)`.
    pub fn balance(&self) -> i8 {
        self.links.balance
    }

    pub(crate) fn claim(&mut self, key: K) {
        debug_assert!(
            self.key.is_none(),
            "pending node already holds a key, is it still part of a tree?"
        );
        self.key = Some(key);
        self.links = Links::new();
    }

    /// Returns the node to its zeroed state, handing back the key it held.
    pub(crate) fn reset(&mut self) -> Option<K> {
        self.links = Links::new();
        self.key.take()
    }

    pub(crate) fn claimed_key(&self) -> &K {
        match &self.key {
            Some(key) => key,
            None => unreachable!("linked node without a key"),
        }
    }
}

impl Links {
    pub(crate) const fn new() -> Self {
        Self {
            left: None,
            right: None,
            balance: 0,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn replace_child(&mut self, side: Side, child: Link) -> Link {
        match side {
            Side::Left => mem::replace(&mut self.left, child),
            Side::Right => mem::replace(&mut self.right, child),
        }
    }

    #[inline]
    pub(crate) fn balance(&self) -> i8 {
        self.balance
    }

    #[inline]
    pub(crate) fn set_balance(&mut self, balance: i8) {
        debug_assert!((-2..=2).contains(&balance), "balance out of range: {balance}");
        self.balance = balance;
    }
}
