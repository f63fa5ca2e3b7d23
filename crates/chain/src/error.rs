use std::fmt::Display;

use conduit_component::{ComponentId, RegistryError, SpecificationError};

/// Failure while building a chain or a generation. Nothing is published on failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
	#[error(transparent)]
	Specification(#[from] SpecificationError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	/// A hard constraint names something no member or phase provides.
	#[error("{requester} in {chain} must be ordered relative to {target:?}, which nothing provides")]
	UnresolvedDependency {
		chain: String,
		requester: String,
		target: String,
	},

	/// The constraints contradict each other. `cycle` starts and ends with the same node.
	#[error("cyclic dependency in {chain}: {}", .cycle.join(" -> "))]
	CyclicDependency { chain: String, cycle: Vec<String> },

	#[error("{chain} lists {member} more than once")]
	DuplicateMember { chain: String, member: ComponentId },

	#[error("cannot create component {id}: {message}")]
	Factory { id: ComponentId, message: String },

	#[error("invalid chain configuration: {0}")]
	Config(String),
}

impl BuildError {
	/// Creates a factory error for component `id`.
	pub fn factory(id: &ComponentId, message: impl Display) -> Self {
		Self::Factory {
			id: id.clone(),
			message: message.to_string(),
		}
	}
}

/// Failure of a single request execution. Never affects other executions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionFault {
	/// A component reported an error.
	#[error("{component} failed: {message}")]
	Component { component: ComponentId, message: String },

	/// A component observed the cancellation flag and gave up.
	#[error("execution cancelled")]
	Cancelled,

	/// A component invoked its continuation a second time.
	#[error("{component} invoked the rest of the chain more than once")]
	ContinuationReused { component: ComponentId },

	/// `run` was called on an execution that already completed.
	#[error("execution already completed")]
	AlreadyCompleted,
}
