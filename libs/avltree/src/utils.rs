use crate::node::{Link, Node, NodeId};
use core::cmp::Ordering;
use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The side to descend into when the search key compares `ord` to a node's key, `None` for a
    /// match.
    pub(crate) fn of(ord: Ordering) -> Option<Side> {
        match ord {
            Ordering::Less => Some(Side::Left),
            Ordering::Equal => None,
            Ordering::Greater => Some(Side::Right),
        }
    }

    /// Balance factor contribution of this side growing by one level.
    pub(crate) fn weight(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// Returns the height of the subtree rooted at `link`, counting an absent subtree as 0.
pub fn height<K>(nodes: &[Node<K>], link: Link) -> usize {
    link.map_or(0, |id| {
        let node = &nodes[id.index()];
        1 + height(nodes, node.left()).max(height(nodes, node.right()))
    })
}

pub fn find_minimum<K>(nodes: &[Node<K>], mut curr: NodeId) -> NodeId {
    while let Some(left) = nodes[curr.index()].left() {
        curr = left;
    }

    curr
}

pub fn find_maximum<K>(nodes: &[Node<K>], mut curr: NodeId) -> NodeId {
    while let Some(right) = nodes[curr.index()].right() {
        curr = right;
    }

    curr
}
