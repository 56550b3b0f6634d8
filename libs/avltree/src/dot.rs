use crate::AvlTree;
use crate::node::{Node, NodeId};
use crate::utils::Side;
use core::fmt;

/// Renders an [`AvlTree`] in graphviz format, see [`AvlTree::dot`].
pub struct Dot<'a, K> {
    pub(crate) tree: &'a AvlTree<K>,
    pub(crate) nodes: &'a [Node<K>],
}

impl<K> Dot<'_, K>
where
    K: fmt::Debug,
{
    fn node_fmt(&self, f: &mut fmt::Formatter, id: NodeId) -> fmt::Result {
        let node = &self.nodes[id.index()];

        f.write_fmt(format_args!(
            r#"{id} [label="key = {key:?} balance = {balance}"];"#,
            id = id.index(),
            key = node.key(),
            balance = node.balance(),
        ))?;

        let mut print_side = |side: Side| -> fmt::Result {
            if let Some(child) = node.links.child(side) {
                f.write_fmt(format_args!(
                    r#"{} -> {} [label="{side}"];"#,
                    id.index(),
                    child.index(),
                ))?;
                self.node_fmt(f, child)?;
            }
            Ok(())
        };
        print_side(Side::Left)?;
        print_side(Side::Right)
    }
}

impl<K> fmt::Display for Dot<'_, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("digraph {")?;
        if let Some(root) = self.tree.root() {
            self.node_fmt(f, root)?;
        }
        f.write_str("}")
    }
}

impl<K> fmt::Debug for Dot<'_, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
