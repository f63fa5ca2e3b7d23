use std::fmt;
use std::sync::Arc;

use conduit_component::{ComponentId, Identified};

use crate::{
	BuildError, ChainMember, Component, Dependencies, DependencyGraph, Execution, ExecutionFault, Orderable, Phase,
};

/// An ordered, immutable sequence of members.
///
/// A chain carries an identifier and ordering declarations of its own so it can be nested
/// inside another chain. The executable sequence is the flattening of all nested chains,
/// computed once at construction.
pub struct Chain<Req, Resp> {
	id: ComponentId,
	dependencies: Dependencies,
	priority: i32,
	members: Vec<ChainMember<Req, Resp>>,
	components: Vec<Arc<Component<Req, Resp>>>,
}

impl<Req, Resp> Chain<Req, Resp> {
	pub fn builder(id: ComponentId) -> ChainBuilder<Req, Resp> {
		ChainBuilder::new(id)
	}

	/// Members in execution order, nested chains unexpanded.
	pub fn members(&self) -> &[ChainMember<Req, Resp>] {
		&self.members
	}

	/// Executable components in execution order, nested chains expanded.
	pub fn components(&self) -> &[Arc<Component<Req, Resp>>] {
		&self.components
	}

	/// Identifiers of [`Self::components`].
	pub fn component_ids(&self) -> Vec<&ComponentId> {
		self.components.iter().map(|c| c.id()).collect()
	}

	pub fn contains(&self, id: &ComponentId) -> bool {
		self.components.iter().any(|c| c.id() == id)
	}

	pub fn len(&self) -> usize {
		self.components.len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.is_empty()
	}

	/// Runs `request` through a fresh execution of this chain.
	pub fn process(&self, request: &mut Req) -> Result<Resp, ExecutionFault>
	where
		Resp: Default,
	{
		Execution::start(self).run(request)
	}
}

impl<Req, Resp> Identified for Chain<Req, Resp> {
	fn id(&self) -> &ComponentId {
		&self.id
	}
}

impl<Req, Resp> Orderable for Chain<Req, Resp> {
	fn dependencies(&self) -> &Dependencies {
		&self.dependencies
	}

	fn priority(&self) -> i32 {
		self.priority
	}
}

impl<Req, Resp> fmt::Debug for Chain<Req, Resp> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Chain")
			.field("id", &self.id)
			.field("members", &self.members)
			.finish_non_exhaustive()
	}
}

/// Collects members and phases, then orders them into a [`Chain`].
pub struct ChainBuilder<Req, Resp> {
	id: ComponentId,
	dependencies: Dependencies,
	priority: i32,
	members: Vec<ChainMember<Req, Resp>>,
	phases: Vec<Phase>,
	outer_phases: Vec<Box<str>>,
}

impl<Req, Resp> ChainBuilder<Req, Resp> {
	pub fn new(id: ComponentId) -> Self {
		Self {
			id,
			dependencies: Dependencies::new(),
			priority: 0,
			members: Vec::new(),
			phases: Vec::new(),
			outer_phases: Vec::new(),
		}
	}

	pub fn component(self, component: Arc<Component<Req, Resp>>) -> Self {
		self.member(ChainMember::Leaf(component))
	}

	pub fn nested(self, chain: Arc<Chain<Req, Resp>>) -> Self {
		self.member(ChainMember::Nested(chain))
	}

	pub fn member(mut self, member: ChainMember<Req, Resp>) -> Self {
		self.members.push(member);
		self
	}

	pub fn phase(mut self, phase: Phase) -> Self {
		self.phases.push(phase);
		self
	}

	/// Declares a name from an enclosing context that members may order against.
	pub fn outer_phase(mut self, name: &str) -> Self {
		if !self.outer_phases.iter().any(|p| &**p == name) {
			self.outer_phases.push(name.into());
		}
		self
	}

	/// Ordering declarations of the chain itself, used when it is nested.
	pub fn dependencies(mut self, dependencies: Dependencies) -> Self {
		self.dependencies = dependencies;
		self
	}

	pub fn priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	/// Resolves the declarations without ordering them.
	pub fn graph(&self) -> Result<DependencyGraph, BuildError> {
		DependencyGraph::build(&self.id, &self.members, &self.phases, &self.outer_phases)
	}

	pub fn build(self) -> Result<Chain<Req, Resp>, BuildError> {
		let order = self.graph()?.order()?;

		let mut slots: Vec<Option<ChainMember<Req, Resp>>> = self.members.into_iter().map(Some).collect();
		let members: Vec<ChainMember<Req, Resp>> = order.into_iter().filter_map(|ix| slots[ix].take()).collect();

		let mut components = Vec::with_capacity(members.len());
		for member in &members {
			member.flatten_into(&mut components);
		}
		let mut seen = rustc_hash::FxHashSet::default();
		for component in &components {
			if !seen.insert(component.id()) {
				return Err(BuildError::DuplicateMember {
					chain: self.id.to_string(),
					member: component.id().clone(),
				});
			}
		}

		tracing::debug!(chain = %self.id, members = members.len(), components = components.len(), "chain built");
		Ok(Chain {
			id: self.id,
			dependencies: self.dependencies,
			priority: self.priority,
			members,
			components,
		})
	}
}
