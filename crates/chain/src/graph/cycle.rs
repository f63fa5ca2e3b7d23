use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};

use super::DependencyGraph;
use crate::BuildError;

/// Describes one concrete cycle of `graph` as a closed path.
///
/// Picks the smallest non-trivial strongly connected component and returns the shortest
/// cycle through its lowest-indexed node, so the same graph always yields the same path.
pub(super) fn report(graph: &DependencyGraph) -> BuildError {
	let g = &graph.graph;
	let smallest = tarjan_scc(g)
		.into_iter()
		.filter(|scc| scc.len() > 1)
		.min_by_key(|scc| (scc.len(), scc.iter().min().copied()));

	let cycle = match smallest {
		Some(scc) => shortest_cycle(graph, &scc),
		None => Vec::new(),
	};
	BuildError::CyclicDependency {
		chain: graph.chain.clone(),
		cycle: cycle.into_iter().map(|node| g[node].to_string()).collect(),
	}
}

fn shortest_cycle(graph: &DependencyGraph, scc: &[NodeIndex]) -> Vec<NodeIndex> {
	let g = &graph.graph;
	let inside: FxHashSet<NodeIndex> = scc.iter().copied().collect();
	let Some(start) = scc.iter().min().copied() else {
		return Vec::new();
	};

	let mut parent: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
	let mut queue = VecDeque::from([start]);
	while let Some(node) = queue.pop_front() {
		let mut successors: Vec<NodeIndex> = g.neighbors(node).filter(|n| inside.contains(n)).collect();
		successors.sort_unstable();
		for successor in successors {
			if successor == start {
				let mut back = Vec::new();
				let mut current = node;
				while current != start {
					back.push(current);
					match parent.get(&current) {
						Some(&previous) => current = previous,
						None => break,
					}
				}
				let mut path = vec![start];
				path.extend(back.into_iter().rev());
				path.push(start);
				return path;
			}
			if !parent.contains_key(&successor) {
				parent.insert(successor, node);
				queue.push_back(successor);
			}
		}
	}
	scc.to_vec()
}
