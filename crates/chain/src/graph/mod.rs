//! Dependency graph over chain members, phases and shared provided names.
//!
//! # Role
//!
//! [`DependencyGraph::build`] turns the symbolic declarations of a set of members into
//! concrete "must precede" edges. [`DependencyGraph::order`] sorts the graph into the
//! final member order.
//!
//! # Node kinds
//!
//! - **Member**: a component or nested chain. The only kind that survives ordering.
//! - **Phase**: a declared phase or an outer phase name used as an anchor.
//! - **Provided**: one synthetic node per name with several providers. Every provider
//!   precedes it and every `after(name)` requester follows it, so the requester waits
//!   for all providers without one edge per pair.
//!
//! Phase and provided nodes are structural: they are placed as soon as they become ready
//! and are dropped from the result.
//!
//! # Invariants
//!
//! - No self-edges and no parallel edges.
//! - Every edge stems from a declared constraint; unresolved soft constraints add none.
//! - Member node `i` holds member index `i` of the input slice.

use std::fmt;

use conduit_component::ComponentId;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::{BuildError, Orderable, Phase};

mod build;
mod cycle;
mod order;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
	Member {
		index: usize,
		id: ComponentId,
		priority: i32,
	},
	Phase(Box<str>),
	Provided(Box<str>),
}

impl Node {
	fn kind(&self) -> &'static str {
		match self {
			Self::Member { .. } => "member",
			Self::Phase(_) => "phase",
			Self::Provided(_) => "provided",
		}
	}
}

impl fmt::Display for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Member { id, .. } => write!(f, "{id}"),
			Self::Phase(name) => write!(f, "[{name}]"),
			Self::Provided(name) => write!(f, "<{name}>"),
		}
	}
}

/// The resolved "must precede" relation of one chain.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
	chain: String,
	graph: DiGraph<Node, ()>,
	members: usize,
}

impl DependencyGraph {
	/// Resolves the declarations of `members` and `phases` into edges.
	///
	/// `outer_phases` are names declared by an enclosing context; constraints on them
	/// resolve to empty phase nodes unless something in this chain provides the name.
	pub fn build<M: Orderable>(
		chain: &ComponentId,
		members: &[M],
		phases: &[Phase],
		outer_phases: &[Box<str>],
	) -> Result<Self, BuildError> {
		build::build(chain, members, phases, outer_phases)
	}

	/// Returns member indices in execution order.
	pub fn order(&self) -> Result<Vec<usize>, BuildError> {
		order::order(self)
	}

	pub fn chain(&self) -> &str {
		&self.chain
	}

	/// Number of member nodes.
	pub fn member_count(&self) -> usize {
		self.members
	}

	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// Returns true if an edge requires `before` to run ahead of `after`.
	pub fn has_edge(&self, before: &ComponentId, after: &ComponentId) -> bool {
		match (self.member_node(before), self.member_node(after)) {
			(Some(a), Some(b)) => self.graph.contains_edge(a, b),
			_ => false,
		}
	}

	/// Serializable snapshot of every node and edge.
	pub fn dump(&self) -> GraphDump {
		let nodes = self
			.graph
			.node_indices()
			.map(|ix| {
				let node = &self.graph[ix];
				NodeDump {
					index: ix.index(),
					kind: node.kind(),
					label: node.to_string(),
					priority: match node {
						Node::Member { priority, .. } => Some(*priority),
						_ => None,
					},
				}
			})
			.collect();
		let edges = self
			.graph
			.edge_references()
			.map(|e| EdgeDump {
				from: e.source().index(),
				to: e.target().index(),
			})
			.collect();
		GraphDump {
			chain: self.chain.clone(),
			nodes,
			edges,
		}
	}

	/// Renders the graph in Graphviz DOT syntax.
	pub fn to_dot(&self) -> String {
		let labelled = self.graph.map(|_, node| node.to_string(), |_, _| "");
		format!("{}", Dot::with_config(&labelled, &[Config::EdgeNoLabel]))
	}

	fn member_node(&self, id: &ComponentId) -> Option<NodeIndex> {
		self.graph
			.node_indices()
			.take(self.members)
			.find(|&ix| matches!(&self.graph[ix], Node::Member { id: node_id, .. } if node_id == id))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDump {
	pub chain: String,
	pub nodes: Vec<NodeDump>,
	pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDump {
	pub index: usize,
	pub kind: &'static str,
	pub label: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub priority: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeDump {
	pub from: usize,
	pub to: usize,
}
