//! # An index-linked AVL Tree.
//!
//! A Rust implementation of AVL trees whose nodes are allocated and owned by the *caller*,
//! primarily for use in the [k23 operating system][k23].
//!
//! AVL trees are *self-balancing binary search trees* that keep, for every node, the heights of
//! both subtrees within one level of each other. Their worst-case height is ~1.44log2(n), which
//! makes them a good fit for collections that are searched far more often than they are edited.
//!
//! Unlike most tree implementations, [`AvlTree`] never allocates. Nodes live in a flat array
//! provided by the caller and are referred to by [`NodeId`]. Inserting a new element requires a
//! *pending node*, a zeroed [`Node`] the tree claims only if the insertion actually happens. This
//! allows the use of flat arrays, static storage or arenas, which have much lower overhead than
//! individually allocated nodes.
//!
//! This crate is self-contained and fully `no_std` (the optional [`NodePool`] needs `alloc`).
//!
//! ## when to use this
//!
//! - **want binary search** - AVL trees are *sorted* collections that are efficient to search.
//! - **need the neighbors of a key** - [`AvlTree::find_neighbors`] returns the elements
//!   immediately before and after a key, whether or not the key is in the tree.
//! - **want to avoid hidden allocations** - Nodes are provided by the caller, so the tree itself
//!   never touches the allocator.
//! - **have no allocator at all** - When nodes live in a fixed-size array or a `static`, elements
//!   can be added without *any allocations at all*.
//!
//! ## when not to use this
//!
//! - **need to remove single elements** - Elements can only be released by tearing the whole
//!   tree down with [`AvlTree::destroy`].
//! - **need to iterate** - Besides neighbor lookup, there is no iteration API.
//! - **need concurrent access** - The tree requires exclusive access for every mutation.
//!
//! ## example
//!
//! ```rust
//! use avltree::{AvlTree, Natural, Neighbors, Node, NodeId};
//!
//! let mut nodes: Vec<Node<u32>> = (0..8).map(|_| Node::new()).collect();
//! let mut tree = AvlTree::new();
//!
//! let mut next_free = 0;
//! let mut pending = None;
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     if pending.is_none() {
//!         pending = NodeId::from_index(next_free);
//!         next_free += 1;
//!     }
//!     assert!(tree.insert(&mut nodes, key, Natural, &mut pending).is_none());
//! }
//!
//! let mut neighbors = Neighbors::default();
//! assert!(tree.find_neighbors(&nodes, &6, Natural, &mut neighbors).is_none());
//! assert_eq!(neighbors.prev.and_then(|id| nodes[id.index()].key()), Some(&5));
//! assert_eq!(neighbors.next.and_then(|id| nodes[id.index()].key()), Some(&7));
//!
//! let mut keys = Vec::new();
//! tree.destroy(&mut nodes, |key| keys.push(key));
//! assert_eq!(keys.len(), 7);
//! ```
//!
//! ## features
//!
//! The following features are available:
//!
//! | Feature | Default | Explanation                                                                        |
//! |:--------|:--------|:-----------------------------------------------------------------------------------|
//! | `dot`   | `false` | Enables the `AvlTree::dot` method, which renders the tree in [graphviz format]      |
//!
//! [k23]: https://github.com/JonasKruckenberg/k23
//! [graphviz format]: https://graphviz.org/doc/info/lang.html

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod compare;
#[cfg(feature = "dot")]
mod dot;
mod node;
mod pool;
mod utils;

use crate::node::Link;
use crate::utils::Side;
use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

pub use compare::{Comparator, Natural};
#[cfg(feature = "dot")]
pub use dot::Dot;
pub use node::{Node, NodeId, node_size};
pub use pool::{AllocError, NodePool};

/// The elements adjacent in sorted order to a search key, as reported by
/// [`AvlTree::find_neighbors`].
///
/// Slots for which no neighbor exists are left untouched, so start out with
/// [`Neighbors::default`] to tell "no neighbor" apart from a stale value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    /// The greatest element less than the search key.
    pub prev: Option<NodeId>,
    /// The least element greater than the search key.
    pub next: Option<NodeId>,
}

/// An AVL Tree over caller-owned nodes.
///
/// This data structure supports efficient O(log n) lookup of elements and may be used for binary
/// search. All operations complete in logarithmic time.
///
/// The tree itself only stores the id of its root node. Every operation takes the node storage
/// (`&[Node<K>]` or `&mut [Node<K>]`) as an argument, which must be the same storage for the
/// entire lifetime of the tree.
pub struct AvlTree<K> {
    root: Link,
    len: usize,
    _keys: PhantomData<fn() -> K>,
}

/// Result of inserting into a subtree.
enum Step {
    /// An element comparing equal to the key already exists, nothing was inserted.
    Found(NodeId),
    /// The key was inserted and the subtree grew by one level.
    Grew,
    /// The key was inserted without changing the height of the subtree.
    Settled,
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("root", &self.root)
            .field("len", &self.len)
            .finish()
    }
}

impl<K> AvlTree<K> {
    /// Creates a new, empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            len: 0,
            _keys: PhantomData,
        }
    }

    /// Returns the root node of the tree, `None` if the tree is empty.
    ///
    /// The root may change with every insertion.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_none(), self.len == 0);
        self.len == 0
    }

    /// Returns the height of the tree, `0` for an empty tree.
    pub fn height(&self, nodes: &[Node<K>]) -> usize {
        utils::height(nodes, self.root)
    }

    /// Returns the node holding an element that compares equal to `key`.
    pub fn find<Q, C>(&self, nodes: &[Node<K>], key: &Q, mut cmp: C) -> Option<NodeId>
    where
        Q: ?Sized,
        C: Comparator<Q, K>,
    {
        self.search(nodes, key, &mut cmp, None)
    }

    /// Returns the node holding an element that compares equal to `key`, recording the elements
    /// immediately before and after `key` in sorted order in `neighbors`.
    ///
    /// If `key` is in the tree, the neighbors are the in-order predecessor and successor of the
    /// found element. A neighbor slot is only written when such an element exists, otherwise it
    /// keeps whatever value it had before the call.
    pub fn find_neighbors<Q, C>(
        &self,
        nodes: &[Node<K>],
        key: &Q,
        mut cmp: C,
        neighbors: &mut Neighbors,
    ) -> Option<NodeId>
    where
        Q: ?Sized,
        C: Comparator<Q, K>,
    {
        self.search(nodes, key, &mut cmp, Some(neighbors))
    }

    /// Inserts `key` into the tree, unless an element comparing equal is already present.
    ///
    /// `pending` must hold a zeroed node (see [`Node::new`]) that is not part of any tree. If the
    /// key gets inserted, the tree claims that node to store it and sets `pending` to `None`.
    /// Otherwise `pending` is left untouched and the node may be reused for the next insertion.
    ///
    /// Returns `None` if the key was inserted, or the node of the existing element if it was
    /// already present (in which case `key` is dropped and the tree is not modified).
    ///
    /// The root node may change, as the tree rebalances itself after every insertion.
    ///
    /// # Panics
    ///
    /// Panics if the key needs to be inserted but `pending` is `None`, or if a node id is out of
    /// bounds of `nodes`.
    pub fn insert<C>(
        &mut self,
        nodes: &mut [Node<K>],
        key: K,
        mut cmp: C,
        pending: &mut Option<NodeId>,
    ) -> Option<NodeId>
    where
        C: Comparator<K, K>,
    {
        let (root, step) = Self::insert_at(nodes, self.root, key, &mut cmp, pending);
        match step {
            Step::Found(existing) => Some(existing),
            Step::Grew | Step::Settled => {
                self.root = Some(root);
                self.len += 1;
                None
            }
        }
    }

    /// Inserts `key` into the tree, drawing the pending node from `pool`.
    ///
    /// The pool keeps a spare pending node between calls, a new one is only allocated once the
    /// previous spare got claimed. See [`AvlTree::insert`] for the insertion semantics.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the key is not yet in the tree and no node could be
    /// allocated for it.
    pub fn insert_pooled<C>(
        &mut self,
        pool: &mut NodePool<K>,
        key: K,
        mut cmp: C,
    ) -> Result<Option<NodeId>, AllocError>
    where
        C: Comparator<K, K>,
    {
        let mut pending = match pool.take_spare() {
            Ok(pending) => pending,
            // a full pool can still answer for keys that are already present
            Err(err) => {
                return self
                    .search(pool, &key, &mut cmp, None)
                    .map(Some)
                    .ok_or(err);
            }
        };

        let existing = self.insert(pool, key, cmp, &mut pending);
        pool.spare = pending;

        Ok(existing)
    }

    /// Tears the tree down, passing every element to `destructor`.
    ///
    /// Nodes are visited in post-order (left subtree, right subtree, node). Each node is returned
    /// to its zeroed state, so the caller may reuse or free the node storage afterwards.
    pub fn destroy<F>(mut self, nodes: &mut [Node<K>], mut destructor: F)
    where
        F: FnMut(K),
    {
        if let Some(root) = self.root.take() {
            Self::destroy_inner(nodes, root, &mut |_, key| destructor(key));
        }
    }

    /// Tears the tree down like [`AvlTree::destroy`] and hands every node back to `pool`, so later
    /// allocations reuse them.
    pub fn destroy_pooled<F>(mut self, pool: &mut NodePool<K>, mut destructor: F)
    where
        F: FnMut(K),
    {
        if let Some(root) = self.root.take() {
            Self::destroy_into_pool(pool, root, &mut destructor);
        }
    }

    /// Removes all elements from the tree, dropping them and handing every node back to `pool`.
    pub fn clear_pooled(&mut self, pool: &mut NodePool<K>) {
        if let Some(root) = self.root.take() {
            Self::destroy_into_pool(pool, root, &mut drop);
        }
        self.len = 0;
    }

    /// Removes all elements from the tree, dropping them.
    ///
    /// Like [`AvlTree::destroy`], every node is returned to its zeroed state.
    pub fn clear(&mut self, nodes: &mut [Node<K>]) {
        if let Some(root) = self.root.take() {
            Self::destroy_inner(nodes, root, &mut |_, key| drop(key));
        }
        self.len = 0;
    }

    /// Asserts as many of the tree's invariants as possible.
    ///
    /// This checks that the elements are ordered according to `cmp`, that every stored balance
    /// factor matches the actual subtree heights and lies within `-1..=1`, and that the tree holds
    /// exactly [`AvlTree::len`] elements.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    #[track_caller]
    pub fn assert_valid<C>(&self, nodes: &[Node<K>], mut cmp: C)
    where
        C: Comparator<K, K>,
    {
        let mut count = 0;
        if let Some(root) = self.root {
            self.assert_valid_inner(nodes, root, &mut cmp, &mut count, (None, None));
        }

        assert_eq!(
            count, self.len,
            "tree holds {count} elements but believes to hold {}",
            self.len
        );
    }

    /// Returns a [`Dot`] that renders this tree in graphviz format.
    #[cfg(feature = "dot")]
    pub fn dot<'a>(&'a self, nodes: &'a [Node<K>]) -> Dot<'a, K> {
        Dot { tree: self, nodes }
    }

    fn search<Q, C>(
        &self,
        nodes: &[Node<K>],
        key: &Q,
        cmp: &mut C,
        mut neighbors: Option<&mut Neighbors>,
    ) -> Option<NodeId>
    where
        Q: ?Sized,
        C: Comparator<Q, K>,
    {
        let mut link = self.root;
        while let Some(curr) = link {
            let curr_node = &nodes[curr.index()];

            let Some(side) = Side::of(cmp.compare(key, curr_node.claimed_key())) else {
                if let Some(neighbors) = neighbors {
                    if let Some(left) = curr_node.left() {
                        neighbors.prev = Some(utils::find_maximum(nodes, left));
                    }
                    if let Some(right) = curr_node.right() {
                        neighbors.next = Some(utils::find_minimum(nodes, right));
                    }
                }
                return Some(curr);
            };

            if let Some(neighbors) = neighbors.as_deref_mut() {
                match side {
                    Side::Left => neighbors.next = Some(curr),
                    Side::Right => neighbors.prev = Some(curr),
                }
            }

            link = curr_node.links.child(side);
        }

        None
    }

    /// Inserts `key` into the subtree rooted at `link`, returning the (possibly new) root of the
    /// subtree.
    fn insert_at<C>(
        nodes: &mut [Node<K>],
        link: Link,
        key: K,
        cmp: &mut C,
        pending: &mut Option<NodeId>,
    ) -> (NodeId, Step)
    where
        C: Comparator<K, K>,
    {
        let Some(curr) = link else {
            let Some(new) = pending.take() else {
                panic!("inserting a new element requires a pending node");
            };

            nodes[new.index()].claim(key);
            tracing::trace!(node = %new, "claimed pending node");

            return (new, Step::Grew);
        };

        let Some(side) = Side::of(cmp.compare(&key, nodes[curr.index()].claimed_key())) else {
            return (curr, Step::Found(curr));
        };

        let child = nodes[curr.index()].links.child(side);
        match Self::insert_at(nodes, child, key, cmp, pending) {
            (_, Step::Found(existing)) => (curr, Step::Found(existing)),
            (child, step) => {
                nodes[curr.index()].links.replace_child(side, Some(child));

                match step {
                    Step::Grew => Self::balance_after_insert(nodes, curr, side),
                    step => (curr, step),
                }
            }
        }
    }

    /// Accounts for the `side` subtree of `node` having grown by one level.
    fn balance_after_insert(nodes: &mut [Node<K>], node: NodeId, side: Side) -> (NodeId, Step) {
        let links = &mut nodes[node.index()].links;
        let balance = links.balance() + side.weight();

        match balance {
            0 => {
                links.set_balance(0);
                (node, Step::Settled)
            }
            -1 | 1 => {
                links.set_balance(balance);
                (node, Step::Grew)
            }
            // A rotation always restores the height the subtree had before the insertion, so
            // nothing above this node changes.
            _ => (Self::rotate_at(nodes, node, side), Step::Settled),
        }
    }

    /// Restores the balance of `z` whose `side` subtree is two levels higher than the other one.
    ///
    /// Returns the new root of the subtree.
    fn rotate_at(nodes: &mut [Node<K>], z: NodeId, side: Side) -> NodeId {
        let weight = side.weight();

        let Some(x) = nodes[z.index()].links.child(side) else {
            unreachable!("heavy side of {z} has no child");
        };
        let x_balance = nodes[x.index()].links.balance();

        if x_balance == weight {
            // X leans the same way as Z, a single rotation lifts X above Z
            tracing::trace!(node = %z, %side, "single rotation");

            let inner = nodes[x.index()]
                .links
                .replace_child(side.opposite(), Some(z));
            nodes[z.index()].links.replace_child(side, inner);

            nodes[z.index()].links.set_balance(0);
            nodes[x.index()].links.set_balance(0);

            x
        } else {
            // X leans the other way, lift its inner child Y above both X and Z
            debug_assert_eq!(x_balance, -weight, "grown subtree {x} is balanced");
            tracing::trace!(node = %z, %side, "double rotation");

            let Some(y) = nodes[x.index()].links.child(side.opposite()) else {
                unreachable!("inner side of {x} has no child");
            };

            let y_links = nodes[y.index()].links;
            nodes[x.index()]
                .links
                .replace_child(side.opposite(), y_links.child(side));
            nodes[z.index()]
                .links
                .replace_child(side, y_links.child(side.opposite()));

            {
                let y_links = &mut nodes[y.index()].links;
                y_links.replace_child(side, Some(x));
                y_links.replace_child(side.opposite(), Some(z));
                y_links.set_balance(0);
            }

            // whichever of X and Z received Y's shorter subtree now leans away from it
            let y_balance = y_links.balance();
            nodes[z.index()]
                .links
                .set_balance(if y_balance == weight { -weight } else { 0 });
            nodes[x.index()]
                .links
                .set_balance(if y_balance == -weight { weight } else { 0 });

            y
        }
    }

    fn destroy_into_pool<F>(pool: &mut NodePool<K>, root: NodeId, destructor: &mut F)
    where
        F: FnMut(K),
    {
        let NodePool {
            nodes, free, vacant, ..
        } = pool;
        Self::destroy_inner(nodes, root, &mut |id, key| {
            debug_assert!(!vacant[id.index()], "tree node {id} is marked as released");
            vacant[id.index()] = true;
            free.push(id);
            destructor(key);
        });
    }

    fn destroy_inner<F>(nodes: &mut [Node<K>], node: NodeId, destructor: &mut F)
    where
        F: FnMut(NodeId, K),
    {
        let (left, right) = {
            let node = &nodes[node.index()];
            (node.left(), node.right())
        };

        if let Some(left) = left {
            Self::destroy_inner(nodes, left, destructor);
        }
        if let Some(right) = right {
            Self::destroy_inner(nodes, right, destructor);
        }

        if let Some(key) = nodes[node.index()].reset() {
            destructor(node, key);
        }
    }

    /// Checks the subtree rooted at `node`, whose elements must lie strictly between the
    /// elements of `bounds`, and returns its height.
    #[track_caller]
    fn assert_valid_inner<C>(
        &self,
        nodes: &[Node<K>],
        node: NodeId,
        cmp: &mut C,
        count: &mut usize,
        bounds: (Link, Link),
    ) -> usize
    where
        C: Comparator<K, K>,
    {
        *count += 1;
        assert!(
            *count <= self.len,
            "tree holds more than {} elements, does it contain a cycle?",
            self.len
        );

        let curr = &nodes[node.index()];
        let Some(key) = curr.key() else {
            panic!("linked node {node} holds no key");
        };

        let (lower, upper) = bounds;
        if let Some(lower) = lower {
            assert_eq!(
                cmp.compare(key, nodes[lower.index()].claimed_key()),
                Ordering::Greater,
                "Ordering violation: {node} is in the right subtree of {lower} but not greater"
            );
        }
        if let Some(upper) = upper {
            assert_eq!(
                cmp.compare(key, nodes[upper.index()].claimed_key()),
                Ordering::Less,
                "Ordering violation: {node} is in the left subtree of {upper} but not less"
            );
        }

        let left_height = curr.left().map_or(0, |left| {
            self.assert_valid_inner(nodes, left, cmp, count, (lower, Some(node)))
        });
        let right_height = curr.right().map_or(0, |right| {
            self.assert_valid_inner(nodes, right, cmp, count, (Some(node), upper))
        });

        let expected = match left_height.abs_diff(right_height) {
            0 => 0,
            1 if right_height > left_height => 1,
            1 => -1,
            diff => panic!(
                "AVL balance violation: subtree heights of {node} differ by {diff} (left = {left_height}, right = {right_height})"
            ),
        };
        assert_eq!(
            curr.balance(),
            expected,
            "balance factor of {node} does not match its subtree heights"
        );

        1 + left_height.max(right_height)
    }
}
