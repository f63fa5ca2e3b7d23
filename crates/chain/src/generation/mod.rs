//! Whole-deployment builds.
//!
//! # Role
//!
//! A [`Generation`] holds every component and chain built from one [`ChainsConfig`].
//! [`GenerationBuilder::build`] is all-or-nothing: any error aborts the build and nothing
//! is returned. [`Generations`] publishes finished generations atomically; executions
//! keep the `Arc<Generation>` they started with.
//!
//! # Chain assembly
//!
//! A chain's members are the members of every chain it inherits (recursively), plus its
//! own component and nested-chain references, minus everything matching its excludes.
//! Top-level phases take part in every chain. Nested chains are built before the chains
//! that contain them.

use std::sync::Arc;

use conduit_component::{ComponentId, ComponentRegistry, ComponentSpecification, Identified, RegistryError, select_best};

use crate::{
	BuildError, Chain, ChainBuilder, ChainDecl, ChainRegistry, ChainsConfig, Component, Phase, Processor,
};

mod publish;

pub use publish::Generations;


/// Creates the processor for a declared component.
pub trait ComponentFactory<Req, Resp>: Send + Sync {
	fn create(&self, id: &ComponentId) -> Result<Arc<dyn Processor<Req, Resp>>, BuildError>;
}

impl<Req, Resp, F> ComponentFactory<Req, Resp> for F
where
	F: Fn(&ComponentId) -> Result<Arc<dyn Processor<Req, Resp>>, BuildError> + Send + Sync,
{
	fn create(&self, id: &ComponentId) -> Result<Arc<dyn Processor<Req, Resp>>, BuildError> {
		self(id)
	}
}

/// One complete build of all components and chains. Immutable once built.
pub struct Generation<Req, Resp> {
	number: u64,
	components: ComponentRegistry<Component<Req, Resp>>,
	chains: ChainRegistry<Req, Resp>,
}

impl<Req, Resp> Generation<Req, Resp> {
	/// A generation without components or chains.
	pub fn empty() -> Self {
		let mut components = ComponentRegistry::new("components");
		components.freeze();
		let mut chains = ChainRegistry::new();
		chains.freeze();
		Self {
			number: 0,
			components,
			chains,
		}
	}

	/// Publication number; 0 until published.
	pub fn number(&self) -> u64 {
		self.number
	}

	pub fn components(&self) -> &ComponentRegistry<Component<Req, Resp>> {
		&self.components
	}

	pub fn chains(&self) -> &ChainRegistry<Req, Resp> {
		&self.chains
	}

	/// Resolves a chain by specification text.
	pub fn chain(&self, spec: &str) -> Result<&Arc<Chain<Req, Resp>>, BuildError> {
		self.chains.lookup(spec)
	}

	pub(crate) fn set_number(&mut self, number: u64) {
		self.number = number;
	}
}

impl<Req, Resp> std::fmt::Debug for Generation<Req, Resp> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Generation")
			.field("number", &self.number)
			.field("components", &self.components.len())
			.field("chains", &self.chains.ids())
			.finish()
	}
}

pub struct GenerationBuilder;

impl GenerationBuilder {
	pub fn build<Req, Resp>(
		config: &ChainsConfig,
		factory: &dyn ComponentFactory<Req, Resp>,
	) -> Result<Generation<Req, Resp>, BuildError> {
		let mut components = ComponentRegistry::new("components");
		for decl in &config.components {
			let id = decl.component_id()?;
			let processor = factory.create(&id)?;
			let component = Component::new(id, processor)
				.with_dependencies(decl.dependencies()?)
				.with_priority(decl.priority);
			components.register(Arc::new(component))?;
		}
		components.freeze();

		let phases = config
			.phases
			.iter()
			.map(|p| p.phase())
			.collect::<Result<Vec<_>, _>>()?;

		let mut ids: Vec<ComponentId> = Vec::with_capacity(config.chains.len());
		for decl in &config.chains {
			let id = decl.chain_id()?;
			if ids.contains(&id) {
				return Err(RegistryError::DuplicateIdentifier { registry: "chains", id }.into());
			}
			ids.push(id);
		}

		let mut assembly = Assembly {
			decls: &config.chains,
			ids,
			components: &components,
			phases,
			built: vec![None; config.chains.len()],
		};
		let mut chains = ChainRegistry::new();
		for index in 0..config.chains.len() {
			let chain = assembly.chain(index, &mut Vec::new())?;
			chains.register(chain)?;
		}
		chains.freeze();

		tracing::debug!(components = components.len(), chains = chains.len(), "generation built");
		Ok(Generation {
			number: 0,
			components,
			chains,
		})
	}
}

/// What a chain declaration expands to after inheritance and exclusion.
struct Expanded<Req, Resp> {
	components: Vec<Arc<Component<Req, Resp>>>,
	nested: Vec<usize>,
	phases: Vec<Phase>,
	outer_phases: Vec<Box<str>>,
}

struct Assembly<'a, Req, Resp> {
	decls: &'a [ChainDecl],
	ids: Vec<ComponentId>,
	components: &'a ComponentRegistry<Component<Req, Resp>>,
	phases: Vec<Phase>,
	built: Vec<Option<Arc<Chain<Req, Resp>>>>,
}

impl<Req, Resp> Assembly<'_, Req, Resp> {
	fn resolve(&self, spec: &ComponentSpecification) -> Result<usize, BuildError> {
		select_best(&self.ids, spec)
			.and_then(|best| self.ids.iter().position(|id| id == best))
			.ok_or_else(|| {
				RegistryError::NotFound {
					registry: "chains",
					spec: spec.clone(),
				}
				.into()
			})
	}

	fn cycle(&self, path: &[usize], index: usize) -> BuildError {
		let start = path.iter().position(|&i| i == index).unwrap_or(0);
		let cycle = path[start..]
			.iter()
			.chain(std::iter::once(&index))
			.map(|&i| self.ids[i].to_string())
			.collect();
		BuildError::CyclicDependency {
			chain: self.ids[index].to_string(),
			cycle,
		}
	}

	/// Builds chain `index` after every chain nested in it. `building` holds the chains
	/// currently under construction.
	fn chain(&mut self, index: usize, building: &mut Vec<usize>) -> Result<Arc<Chain<Req, Resp>>, BuildError> {
		if let Some(chain) = &self.built[index] {
			return Ok(Arc::clone(chain));
		}
		if building.contains(&index) {
			return Err(self.cycle(building, index));
		}
		building.push(index);

		let decls = self.decls;
		let decl = &decls[index];
		let expanded = self.expand(index, &mut Vec::new())?;
		let mut builder = ChainBuilder::new(self.ids[index].clone())
			.dependencies(decl.dependencies()?)
			.priority(decl.priority);
		for phase in self.phases.iter().chain(&expanded.phases) {
			builder = builder.phase(phase.clone());
		}
		for name in &expanded.outer_phases {
			builder = builder.outer_phase(name);
		}
		for component in expanded.components {
			builder = builder.component(component);
		}
		for nested in expanded.nested {
			builder = builder.nested(self.chain(nested, building)?);
		}
		let chain = Arc::new(builder.build()?);

		building.pop();
		self.built[index] = Some(Arc::clone(&chain));
		Ok(chain)
	}

	/// Collects the members of chain `index` through inheritance. `path` holds the
	/// inheritance chain currently being expanded.
	fn expand(&self, index: usize, path: &mut Vec<usize>) -> Result<Expanded<Req, Resp>, BuildError> {
		if path.contains(&index) {
			return Err(self.cycle(path, index));
		}
		path.push(index);
		let decl = &self.decls[index];

		let mut expanded = Expanded {
			components: Vec::new(),
			nested: Vec::new(),
			phases: Vec::new(),
			outer_phases: Vec::new(),
		};
		for parent in decl.inherited_specs()? {
			let parent = self.expand(self.resolve(&parent)?, path)?;
			expanded.absorb(parent);
		}
		for spec in decl.component_specs()? {
			let component = self.components.resolve(&spec)?;
			if !expanded.components.iter().any(|c| c.id() == component.id()) {
				expanded.components.push(Arc::clone(component));
			}
		}
		for spec in decl.chain_specs()? {
			let nested = self.resolve(&spec)?;
			if !expanded.nested.contains(&nested) {
				expanded.nested.push(nested);
			}
		}
		for phase in &decl.phases {
			expanded.phases.push(phase.phase()?);
		}
		for name in &decl.outer_phases {
			expanded.outer_phases.push(name.as_str().into());
		}

		let excludes = decl.excluded_specs()?;
		if !excludes.is_empty() {
			let excluded = |id: &ComponentId| excludes.iter().any(|spec| spec.matches(id));
			expanded.components.retain(|c| !excluded(c.id()));
			expanded.nested.retain(|&n| !excluded(&self.ids[n]));
		}

		path.pop();
		Ok(expanded)
	}
}

impl<Req, Resp> Expanded<Req, Resp> {
	fn absorb(&mut self, other: Expanded<Req, Resp>) {
		for component in other.components {
			if !self.components.iter().any(|c| c.id() == component.id()) {
				self.components.push(component);
			}
		}
		for nested in other.nested {
			if !self.nested.contains(&nested) {
				self.nested.push(nested);
			}
		}
		self.phases.extend(other.phases);
		self.outer_phases.extend(other.outer_phases);
	}
}
