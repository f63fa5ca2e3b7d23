//! Deterministic Kahn ordering.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use conduit_component::Version;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::{DependencyGraph, Node, cycle};
use crate::BuildError;

/// A node whose predecessors have all been placed.
///
/// The derived order is the placement order: structural nodes first, then members by
/// priority (higher first), name, version and insertion index.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Ready<'g> {
	Structural(NodeIndex),
	Member {
		priority: Reverse<i32>,
		name: &'g str,
		version: &'g Version,
		index: usize,
	},
}

impl<'g> Ready<'g> {
	fn of(graph: &'g DiGraph<Node, ()>, node: NodeIndex) -> Self {
		match &graph[node] {
			Node::Member { index, id, priority } => Self::Member {
				priority: Reverse(*priority),
				name: id.name(),
				version: id.version(),
				index: *index,
			},
			_ => Self::Structural(node),
		}
	}

	fn node(&self) -> NodeIndex {
		match self {
			Self::Structural(node) => *node,
			Self::Member { index, .. } => NodeIndex::new(*index),
		}
	}
}

pub(super) fn order(graph: &DependencyGraph) -> Result<Vec<usize>, BuildError> {
	let g = &graph.graph;
	let mut pending: Vec<usize> = g
		.node_indices()
		.map(|node| g.neighbors_directed(node, Direction::Incoming).count())
		.collect();

	let mut ready: BinaryHeap<Reverse<Ready<'_>>> = g
		.node_indices()
		.filter(|node| pending[node.index()] == 0)
		.map(|node| Reverse(Ready::of(g, node)))
		.collect();

	let mut order = Vec::with_capacity(graph.members);
	let mut placed = 0;
	while let Some(Reverse(next)) = ready.pop() {
		let node = next.node();
		placed += 1;
		if let Ready::Member { index, .. } = next {
			order.push(index);
		}
		for successor in g.neighbors_directed(node, Direction::Outgoing) {
			let count = &mut pending[successor.index()];
			*count -= 1;
			if *count == 0 {
				ready.push(Reverse(Ready::of(g, successor)));
			}
		}
	}

	if placed < g.node_count() {
		return Err(cycle::report(graph));
	}
	debug_assert_eq!(order.len(), graph.members);
	Ok(order)
}
