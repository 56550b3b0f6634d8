#![allow(unused, reason = "not used by all tests")]

use avltree::{AvlTree, Natural, Node, NodeId};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An [`AvlTree`] over a growable flat array, allocating a node whenever the last pending node got
/// claimed.
pub struct FlatTree<K> {
    pub tree: AvlTree<K>,
    pub nodes: Vec<Node<K>>,
    pub pending: Option<NodeId>,
}

impl<K: Ord> FlatTree<K> {
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(),
            nodes: Vec::new(),
            pending: None,
        }
    }

    pub fn insert(&mut self, key: K) -> Option<NodeId> {
        if self.pending.is_none() {
            self.pending = NodeId::from_index(self.nodes.len());
            self.nodes.push(Node::new());
        }

        self.tree
            .insert(&mut self.nodes, key, Natural, &mut self.pending)
    }

    pub fn key(&self, id: Option<NodeId>) -> Option<&K> {
        id.and_then(|id| self.nodes[id.index()].key())
    }

    pub fn in_order(&self) -> Vec<&K> {
        fn walk<'a, K>(nodes: &'a [Node<K>], link: Option<NodeId>, out: &mut Vec<&'a K>) {
            if let Some(id) = link {
                let node = &nodes[id.index()];
                walk(nodes, node.left(), out);
                out.extend(node.key());
                walk(nodes, node.right(), out);
            }
        }

        let mut out = Vec::with_capacity(self.tree.len());
        walk(&self.nodes, self.tree.root(), &mut out);
        out
    }

    pub fn assert_valid(&self) {
        self.tree.assert_valid(&self.nodes, Natural);
    }
}
