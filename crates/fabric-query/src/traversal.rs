//! Breadth-first walks over the fabric store.
//!
//! A walk follows either every edge touching a node or only its outgoing
//! edges. Each node is visited at most once; every newly discovered node
//! yields a `CrossReference` in discovery order.

use std::collections::{HashSet, VecDeque};

use fabric_core::{Edge, EdgeId, NodeId};
use fabric_store::GraphStore;

use crate::types::{CrossReference, Resolution};

/// Which edges a walk may cross from the node it is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Only edges whose `from_id` is the current node.
    Outgoing,
    /// Every edge touching the current node.
    Both,
}

impl Direction {
    fn permits(self, edge: &Edge, node: &NodeId) -> bool {
        match self {
            Direction::Outgoing => &edge.from_id == node,
            Direction::Both => edge.touches(node),
        }
    }
}

/// Walk from `start` up to `max_depth` hops in `direction`, following only
/// edges `accept` allows.
///
/// Returns an empty resolution if `start` is not in the store. The start node
/// is the first node in the result and has no cross-reference.
pub fn breadth_first<F>(
    store: &GraphStore,
    start: &NodeId,
    max_depth: usize,
    direction: Direction,
    accept: F,
) -> Resolution
where
    F: Fn(&Edge) -> bool,
{
    let Some(start_node) = store.get_node(start) else {
        return Resolution::default();
    };

    let mut resolution = Resolution {
        nodes: vec![start_node.clone()],
        ..Default::default()
    };

    let mut visited: HashSet<NodeId> = HashSet::new();
    visited.insert(*start);
    let mut seen_edges: HashSet<EdgeId> = HashSet::new();

    // BFS queue: (node_id, hops)
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    queue.push_back((*start, 0));

    while let Some((node_id, hops)) = queue.pop_front() {
        if hops >= max_depth {
            continue;
        }

        for edge in store.edges_touching(&node_id) {
            if !direction.permits(edge, &node_id) || !accept(edge) {
                continue;
            }
            let Some(next) = edge.other_end(&node_id) else {
                continue;
            };

            if seen_edges.insert(edge.id) {
                resolution.edges.push(edge.clone());
            }

            if !visited.insert(next) {
                continue;
            }
            let Some(next_node) = store.get_node(&next) else {
                continue;
            };

            resolution.references.push(CrossReference {
                node_id: next,
                entity_type: next_node.entity_type,
                entity_id: next_node.entity_id.clone(),
                subsystem: next_node.source.subsystem,
                depth: hops + 1,
                via_edge: edge.id,
                relationship: edge.edge_type,
            });
            resolution.nodes.push(next_node.clone());
            queue.push_back((next, hops + 1));
        }
    }

    resolution
}
