// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::borrow::Borrow;
use core::cmp::Ordering;

/// A three-way ordering between a search key and an element stored in an
/// [`AvlTree`](crate::AvlTree).
///
/// The tree never looks at keys itself, every descent is steered by the comparator: `Less` goes
/// left, `Greater` goes right and `Equal` means the element *is* the key. The comparator must
/// describe a strict total order that stays the same for as long as the elements are in the
/// tree, otherwise lookups and insertions will silently misbehave (they will never cause memory
/// unsafety though).
///
/// Any `FnMut(&Q, &K) -> Ordering` closure is a comparator. [`Natural`] orders keys by their
/// [`Ord`] implementation.
///
/// # Example
///
/// Ordering entries by a field:
///
/// ```rust
/// use avltree::{AvlTree, Node};
///
/// struct Mapping {
///     start: u64,
///     name: &'static str,
/// }
///
/// let by_start = |a: &Mapping, b: &Mapping| a.start.cmp(&b.start);
///
/// let mut nodes: Vec<Node<Mapping>> = (0..2).map(|_| Node::new()).collect();
/// let mut tree = AvlTree::new();
///
/// let mut pending = avltree::NodeId::from_index(0);
/// tree.insert(&mut nodes, Mapping { start: 0x1000, name: "text" }, by_start, &mut pending);
/// assert!(pending.is_none());
/// ```
pub trait Comparator<Q: ?Sized, K: ?Sized> {
    /// Compares the search `key` against a stored `element`.
    fn compare(&mut self, key: &Q, element: &K) -> Ordering;
}

impl<Q, K, F> Comparator<Q, K> for F
where
    Q: ?Sized,
    K: ?Sized,
    F: FnMut(&Q, &K) -> Ordering,
{
    #[inline]
    fn compare(&mut self, key: &Q, element: &K) -> Ordering {
        self(key, element)
    }
}

/// Orders elements by their [`Ord`] implementation.
///
/// The search key may be any borrowed form of the element type, but the ordering on the
/// borrowed form *must* match the ordering on the element type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<Q, K> Comparator<Q, K> for Natural
where
    Q: Ord + ?Sized,
    K: Borrow<Q>,
{
    #[inline]
    fn compare(&mut self, key: &Q, element: &K) -> Ordering {
        key.cmp(element.borrow())
    }
}
