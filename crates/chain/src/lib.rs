//! Processing chains: assembly, ordering, registration and execution.
//!
//! # Mental Model
//!
//! 1. **Declare:** every [`Component`] carries [`Dependencies`] (names it provides, names
//!    and phases it must run before or after) and an optional priority. [`Phase`]s are
//!    named milestones that components order themselves around.
//! 2. **Order:** [`ChainBuilder`] feeds members and phases to the
//!    [`graph`] builder, which resolves symbolic names into a [`DependencyGraph`] and
//!    sorts it deterministically into a [`Chain`].
//! 3. **Publish:** a [`Generation`] holds every component and chain of one deployment,
//!    built all-or-nothing from a [`ChainsConfig`] and a [`ComponentFactory`], and
//!    [`Generations`] swaps it in atomically.
//! 4. **Execute:** an [`Execution`] walks a request through a chain. Each component
//!    decides whether to continue downstream, short-circuit, or fail. Freeze listeners
//!    observe the final response exactly once.
//!
//! # Concurrency
//!
//! Chains, registries and generations are immutable once built and shared through
//! `Arc`. Executions are per request and never shared.

mod chain;
mod component;
pub mod config;
mod dependencies;
mod error;
mod exec;
pub mod generation;
pub mod graph;
mod phase;
mod registry;

pub use chain::{Chain, ChainBuilder};
pub use component::{ChainMember, Component, Orderable, Processor};
pub use config::{ChainDecl, ChainsConfig, ComponentDecl, PhaseDecl};
pub use conduit_component::{
	ComponentId, ComponentRegistry, ComponentSpecification, Identified, RegistryError,
	SpecificationError, Version, VersionSpecification,
};
pub use dependencies::{Constraint, Dependencies, Relation, Strength, Target};
pub use error::{BuildError, ExecutionFault};
pub use exec::{Execution, ExecutionState, FreezeListener, Trace, TraceEntry};
pub use generation::{ComponentFactory, Generation, GenerationBuilder, Generations};
pub use graph::DependencyGraph;
pub use phase::Phase;
pub use registry::ChainRegistry;
