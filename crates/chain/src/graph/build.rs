//! Name resolution: declarations in, edges out.

use conduit_component::ComponentId;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{DependencyGraph, Node};
use crate::{BuildError, Orderable, Phase, Relation, Strength, Target};

pub(super) fn build<M: Orderable>(
	chain: &ComponentId,
	members: &[M],
	phases: &[Phase],
	outer_phases: &[Box<str>],
) -> Result<DependencyGraph, BuildError> {
	let chain_label = chain.to_string();
	let mut graph = DiGraph::with_capacity(members.len() + phases.len(), members.len());

	let mut seen = FxHashSet::default();
	for (index, member) in members.iter().enumerate() {
		if !seen.insert(member.id()) {
			return Err(BuildError::DuplicateMember {
				chain: chain_label,
				member: member.id().clone(),
			});
		}
		graph.add_node(Node::Member {
			index,
			id: member.id().clone(),
			priority: member.priority(),
		});
	}

	let mut merged: Vec<Phase> = Vec::with_capacity(phases.len());
	for phase in phases {
		match merged.iter_mut().find(|p| p.name() == phase.name()) {
			Some(existing) => existing.absorb(phase),
			None => merged.push(phase.clone()),
		}
	}
	let phase_nodes: Vec<NodeIndex> = merged
		.iter()
		.map(|p| graph.add_node(Node::Phase(p.name().into())))
		.collect();

	let mut providers = Providers::default();
	for (index, member) in members.iter().enumerate() {
		let node = NodeIndex::new(index);
		providers.add(member.id().name(), node);
		for name in member.dependencies().provided() {
			providers.add(name, node);
		}
	}
	for (phase, &node) in merged.iter().zip(&phase_nodes) {
		providers.add(phase.name(), node);
	}
	for name in outer_phases {
		if !providers.by_name.contains_key(&**name) {
			let node = graph.add_node(Node::Phase(name.clone()));
			providers.add(name, node);
		}
	}

	let mut linker = Linker {
		graph,
		providers,
		collectors: FxHashMap::default(),
	};

	let requesters = members
		.iter()
		.enumerate()
		.map(|(index, m)| (NodeIndex::new(index), m.dependencies()))
		.chain(merged.iter().zip(&phase_nodes).map(|(p, &node)| (node, p.dependencies())));

	for (node, dependencies) in requesters {
		for constraint in dependencies.constraints() {
			let name = match &constraint.target {
				Target::All => {
					linker.wildcard(node, constraint.relation, members);
					continue;
				}
				Target::Name(name) => name,
			};
			if linker.providers.by_name.contains_key(&**name) {
				linker.link(node, constraint.relation, name);
				continue;
			}
			let requester = linker.graph[node].to_string();
			match constraint.strength {
				Strength::Hard => {
					return Err(BuildError::UnresolvedDependency {
						chain: chain_label,
						requester,
						target: name.to_string(),
					});
				}
				Strength::Soft => {
					tracing::debug!(chain = %chain_label, %requester, target = %name, "dropping soft constraint on missing target");
				}
			}
		}
	}

	Ok(DependencyGraph {
		chain: chain_label,
		graph: linker.graph,
		members: members.len(),
	})
}

#[derive(Default)]
struct Providers<'a> {
	/// Provider nodes per name, in declaration order.
	by_name: FxHashMap<&'a str, Vec<NodeIndex>>,
}

impl<'a> Providers<'a> {
	fn add(&mut self, name: &'a str, node: NodeIndex) {
		let list = self.by_name.entry(name).or_default();
		if !list.contains(&node) {
			list.push(node);
		}
	}
}

struct Linker<'a> {
	graph: DiGraph<Node, ()>,
	providers: Providers<'a>,
	/// Synthetic node per multi-provider name, created on first use.
	collectors: FxHashMap<&'a str, NodeIndex>,
}

impl<'a> Linker<'a> {
	fn edge(&mut self, from: NodeIndex, to: NodeIndex) {
		if from != to {
			self.graph.update_edge(from, to, ());
		}
	}

	fn link(&mut self, node: NodeIndex, relation: Relation, name: &'a str) {
		let providers = self.providers.by_name[name].clone();
		match relation {
			Relation::Before => {
				for provider in providers {
					self.edge(node, provider);
				}
			}
			// A requester among the providers follows the others directly; the collector
			// would route its own edge back to itself.
			Relation::After if providers.len() == 1 || providers.contains(&node) => {
				for provider in providers {
					self.edge(provider, node);
				}
			}
			Relation::After => {
				let collector = self.collector(name, &providers);
				self.edge(collector, node);
			}
		}
	}

	fn collector(&mut self, name: &'a str, providers: &[NodeIndex]) -> NodeIndex {
		if let Some(&node) = self.collectors.get(name) {
			return node;
		}
		let node = self.graph.add_node(Node::Provided(name.into()));
		for &provider in providers {
			self.edge(provider, node);
		}
		self.collectors.insert(name, node);
		node
	}

	/// Orders `node` against every member that does not declare the same wildcard.
	fn wildcard<M: Orderable>(&mut self, node: NodeIndex, relation: Relation, members: &[M]) {
		for (index, member) in members.iter().enumerate() {
			if member.dependencies().has_wildcard(relation) {
				continue;
			}
			let other = NodeIndex::new(index);
			match relation {
				Relation::Before => self.edge(node, other),
				Relation::After => self.edge(other, node),
			}
		}
	}
}
