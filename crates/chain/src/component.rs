//! Executable chain members and the ordering capability they share.

use std::fmt;
use std::sync::Arc;

use conduit_component::{ComponentId, Identified};

use crate::{Chain, Dependencies, Execution, ExecutionFault};

/// Anything the dependency graph can place: an identifier, ordering declarations and a
/// tie-breaking priority.
pub trait Orderable: Identified {
	fn dependencies(&self) -> &Dependencies;

	/// Higher runs earlier among otherwise unordered members.
	fn priority(&self) -> i32 {
		0
	}
}

/// The executable body of a component.
///
/// A processor either calls [`Execution::proceed`] to obtain the downstream response,
/// returns a response of its own without proceeding, or returns an error.
pub trait Processor<Req, Resp>: Send + Sync {
	fn process(&self, request: &mut Req, execution: &mut Execution<'_, Req, Resp>) -> Result<Resp, ExecutionFault>;
}

impl<Req, Resp, F> Processor<Req, Resp> for F
where
	F: Fn(&mut Req, &mut Execution<'_, Req, Resp>) -> Result<Resp, ExecutionFault> + Send + Sync,
{
	fn process(&self, request: &mut Req, execution: &mut Execution<'_, Req, Resp>) -> Result<Resp, ExecutionFault> {
		self(request, execution)
	}
}

/// A named, versioned processing unit plus its ordering metadata.
pub struct Component<Req, Resp> {
	id: ComponentId,
	dependencies: Dependencies,
	priority: i32,
	processor: Arc<dyn Processor<Req, Resp>>,
}

impl<Req, Resp> Component<Req, Resp> {
	pub fn new(id: ComponentId, processor: Arc<dyn Processor<Req, Resp>>) -> Self {
		Self {
			id,
			dependencies: Dependencies::new(),
			priority: 0,
			processor,
		}
	}

	/// Wraps a closure as the processor.
	pub fn from_fn<F>(id: ComponentId, f: F) -> Self
	where
		F: Fn(&mut Req, &mut Execution<'_, Req, Resp>) -> Result<Resp, ExecutionFault> + Send + Sync + 'static,
		Req: 'static,
		Resp: 'static,
	{
		Self::new(id, Arc::new(f))
	}

	pub fn with_dependencies(mut self, dependencies: Dependencies) -> Self {
		self.dependencies = dependencies;
		self
	}

	pub fn with_priority(mut self, priority: i32) -> Self {
		self.priority = priority;
		self
	}

	pub fn processor(&self) -> &dyn Processor<Req, Resp> {
		&*self.processor
	}
}

impl<Req, Resp> Identified for Component<Req, Resp> {
	fn id(&self) -> &ComponentId {
		&self.id
	}
}

impl<Req, Resp> Orderable for Component<Req, Resp> {
	fn dependencies(&self) -> &Dependencies {
		&self.dependencies
	}

	fn priority(&self) -> i32 {
		self.priority
	}
}

impl<Req, Resp> fmt::Debug for Component<Req, Resp> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("id", &self.id)
			.field("dependencies", &self.dependencies)
			.field("priority", &self.priority)
			.finish_non_exhaustive()
	}
}

/// One entry of a chain: a component, or a whole chain nested as a single unit.
///
/// The outer graph orders a nested chain by its own declarations; the nested chain's
/// internal order stays as it was built.
pub enum ChainMember<Req, Resp> {
	Leaf(Arc<Component<Req, Resp>>),
	Nested(Arc<Chain<Req, Resp>>),
}

impl<Req, Resp> Clone for ChainMember<Req, Resp> {
	fn clone(&self) -> Self {
		match self {
			Self::Leaf(c) => Self::Leaf(Arc::clone(c)),
			Self::Nested(c) => Self::Nested(Arc::clone(c)),
		}
	}
}

impl<Req, Resp> ChainMember<Req, Resp> {
	/// Appends the executable components of this member, in execution order.
	pub(crate) fn flatten_into(&self, out: &mut Vec<Arc<Component<Req, Resp>>>) {
		match self {
			Self::Leaf(c) => out.push(Arc::clone(c)),
			Self::Nested(chain) => out.extend(chain.components().iter().cloned()),
		}
	}
}

impl<Req, Resp> Identified for ChainMember<Req, Resp> {
	fn id(&self) -> &ComponentId {
		match self {
			Self::Leaf(c) => c.id(),
			Self::Nested(c) => c.id(),
		}
	}
}

impl<Req, Resp> Orderable for ChainMember<Req, Resp> {
	fn dependencies(&self) -> &Dependencies {
		match self {
			Self::Leaf(c) => c.dependencies(),
			Self::Nested(c) => c.dependencies(),
		}
	}

	fn priority(&self) -> i32 {
		match self {
			Self::Leaf(c) => c.priority(),
			Self::Nested(c) => c.priority(),
		}
	}
}

impl<Req, Resp> From<Arc<Component<Req, Resp>>> for ChainMember<Req, Resp> {
	fn from(component: Arc<Component<Req, Resp>>) -> Self {
		Self::Leaf(component)
	}
}

impl<Req, Resp> From<Arc<Chain<Req, Resp>>> for ChainMember<Req, Resp> {
	fn from(chain: Arc<Chain<Req, Resp>>) -> Self {
		Self::Nested(chain)
	}
}

impl<Req, Resp> fmt::Debug for ChainMember<Req, Resp> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Leaf(c) => write!(f, "Leaf({})", c.id()),
			Self::Nested(c) => write!(f, "Nested({})", c.id()),
		}
	}
}
