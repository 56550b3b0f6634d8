mod common;

use std::cmp::Ordering;

use avltree::{AvlTree, Neighbors, Node, NodeId, NodePool, node_size};
use rand::seq::SliceRandom;

use crate::common::{FlatTree, init_tracing};

#[test]
fn smoke() {
    init_tracing();

    let mut flat = FlatTree::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        tracing::debug!("inserting {key}");
        assert_eq!(flat.insert(key), None);
        flat.assert_valid();
    }

    assert_eq!(flat.in_order(), [&1, &3, &4, &5, &7, &8, &9]);

    let mut neighbors = Neighbors::default();
    let found = flat
        .tree
        .find_neighbors(&flat.nodes, &6, avltree::Natural, &mut neighbors);
    assert_eq!(found, None);
    assert_eq!(flat.key(neighbors.prev), Some(&5));
    assert_eq!(flat.key(neighbors.next), Some(&7));

    let five = flat.tree.find(&flat.nodes, &5, avltree::Natural);
    assert_eq!(flat.key(five), Some(&5));

    assert_eq!(flat.insert(5), five);
    assert_eq!(flat.tree.len(), 7);
    flat.assert_valid();
}

#[test]
fn shuffled() {
    init_tracing();

    let mut input: Vec<u64> = (0..1000).map(|i| i * 3).collect();
    input.shuffle(&mut rand::rng());

    let mut flat = FlatTree::new();
    for key in &input {
        assert_eq!(flat.insert(*key), None);
    }
    flat.assert_valid();

    input.sort_unstable();
    assert_eq!(flat.in_order(), input.iter().collect::<Vec<_>>());

    // every key is its own predecessor's successor
    for pair in input.windows(2) {
        let mut neighbors = Neighbors::default();
        let gap = pair[0] + 1;
        assert_eq!(
            flat.tree
                .find_neighbors(&flat.nodes, &gap, avltree::Natural, &mut neighbors),
            None
        );
        assert_eq!(flat.key(neighbors.prev), Some(&pair[0]));
        assert_eq!(flat.key(neighbors.next), Some(&pair[1]));
    }
}

#[test]
fn borrowed_lookups() {
    let mut flat = FlatTree::new();
    for name in ["kernel", "loader", "libs", "build"] {
        flat.insert(name.to_string());
    }
    flat.assert_valid();

    let found = flat.tree.find(&flat.nodes, "libs", avltree::Natural);
    assert_eq!(flat.key(found).map(String::as_str), Some("libs"));
    assert_eq!(flat.tree.find(&flat.nodes, "fuzz", avltree::Natural), None);
}

struct Mapping {
    start: u64,
    len: u64,
}

#[test]
fn lookup_by_foreign_key() {
    let mappings = [
        Mapping { start: 0x4000, len: 0x1000 },
        Mapping { start: 0x1000, len: 0x2000 },
        Mapping { start: 0x8000, len: 0x800 },
    ];

    let by_start = |a: &&Mapping, b: &&Mapping| a.start.cmp(&b.start);
    let containing = |addr: &u64, m: &&Mapping| {
        if *addr < m.start {
            Ordering::Less
        } else if *addr >= m.start + m.len {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    };

    // elements are borrowed, the tree never owns them
    let mut nodes: [Node<&Mapping>; 3] = [Node::new(), Node::new(), Node::new()];
    let mut tree = AvlTree::new();
    for (i, mapping) in mappings.iter().enumerate() {
        let mut pending = NodeId::from_index(i);
        assert_eq!(tree.insert(&mut nodes, mapping, by_start, &mut pending), None);
        assert_eq!(pending, None);
    }
    tree.assert_valid(&nodes, by_start);

    let hit = tree.find(&nodes, &0x2345, containing).unwrap();
    assert_eq!(nodes[hit.index()].key().map(|m| m.start), Some(0x1000));

    let mut neighbors = Neighbors::default();
    assert_eq!(
        tree.find_neighbors(&nodes, &0x6000, containing, &mut neighbors),
        None
    );
    let start_of = |id: Option<NodeId>| id.and_then(|id| nodes[id.index()].key().map(|m| m.start));
    assert_eq!(start_of(neighbors.prev), Some(0x4000));
    assert_eq!(start_of(neighbors.next), Some(0x8000));

    let mut released = 0;
    tree.destroy(&mut nodes, |_mapping| released += 1);
    assert_eq!(released, 3);
}

#[test]
fn fixed_array_storage() {
    const CAPACITY: usize = 64;

    let mut nodes: [Node<u16>; CAPACITY] = core::array::from_fn(|_| Node::new());
    let mut tree = AvlTree::new();

    let mut next_free = 0;
    let mut pending = None;
    for key in (0..200u16).map(|i| i.wrapping_mul(37) % 64) {
        if pending.is_none() {
            pending = NodeId::from_index(next_free);
            next_free += 1;
        }
        tree.insert(&mut nodes, key, avltree::Natural, &mut pending);
    }

    // 200 inserts of 64 distinct keys claim exactly 64 nodes, the 65th id is still pending
    assert_eq!(tree.len(), CAPACITY);
    assert_eq!(pending, NodeId::from_index(CAPACITY));
    tree.assert_valid(&nodes, avltree::Natural);
    assert!(nodes.iter().all(Node::is_claimed));

    assert!(node_size::<u16>() * CAPACITY <= core::mem::size_of_val(&nodes));
}

#[test]
fn pooled_tree_teardown() {
    init_tracing();

    let mut pool = NodePool::with_capacity(128);
    let mut tree = AvlTree::new();

    let mut keys: Vec<u32> = (0..128).collect();
    keys.shuffle(&mut rand::rng());
    for key in &keys {
        assert_eq!(tree.insert_pooled(&mut pool, *key, avltree::Natural), Ok(None));
    }
    tree.assert_valid(&pool, avltree::Natural);

    let mut destroyed = Vec::new();
    tree.destroy_pooled(&mut pool, |key| destroyed.push(key));

    destroyed.sort_unstable();
    assert_eq!(destroyed, (0..128).collect::<Vec<_>>());
    assert!(pool.iter().all(|node| !node.is_claimed()));

    // the full pool serves a second tree from the recycled nodes
    let mut tree = AvlTree::new();
    for key in &keys {
        assert_eq!(tree.insert_pooled(&mut pool, *key, avltree::Natural), Ok(None));
    }
    tree.assert_valid(&pool, avltree::Natural);
    assert_eq!(pool.len(), 128);
}
