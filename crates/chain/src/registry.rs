use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use conduit_component::{ComponentRegistry, ComponentSpecification};

use crate::{BuildError, Chain};

/// Registry of built chains, looked up by identifier or specification.
pub struct ChainRegistry<Req, Resp>(ComponentRegistry<Chain<Req, Resp>>);

impl<Req, Resp> ChainRegistry<Req, Resp> {
	pub fn new() -> Self {
		Self(ComponentRegistry::new("chains"))
	}

	/// Resolves a chain by text such as `default` or `search:2`.
	pub fn lookup(&self, spec: &str) -> Result<&Arc<Chain<Req, Resp>>, BuildError> {
		let spec = ComponentSpecification::parse(spec)?;
		Ok(self.0.resolve(&spec)?)
	}

	/// Like [`ComponentRegistry::resolve`] but `None` when nothing matches.
	pub fn find(&self, spec: &ComponentSpecification) -> Option<&Arc<Chain<Req, Resp>>> {
		self.0.resolve(spec).ok()
	}
}

impl<Req, Resp> Default for ChainRegistry<Req, Resp> {
	fn default() -> Self {
		Self::new()
	}
}

impl<Req, Resp> Deref for ChainRegistry<Req, Resp> {
	type Target = ComponentRegistry<Chain<Req, Resp>>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<Req, Resp> DerefMut for ChainRegistry<Req, Resp> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl<Req, Resp> std::fmt::Debug for ChainRegistry<Req, Resp> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}
