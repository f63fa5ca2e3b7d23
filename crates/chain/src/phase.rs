use crate::Dependencies;

/// A named ordering checkpoint with no behavior of its own.
///
/// Phases take part in ordering like components do, then disappear from the finished
/// chain. Components say `after("validation")` instead of naming every validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
	name: Box<str>,
	dependencies: Dependencies,
}

impl Phase {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			dependencies: Dependencies::new(),
		}
	}

	/// The phase runs before `other`.
	pub fn before(mut self, other: &str) -> Self {
		self.dependencies = self.dependencies.before(other);
		self
	}

	/// The phase runs after `other`.
	pub fn after(mut self, other: &str) -> Self {
		self.dependencies = self.dependencies.after(other);
		self
	}

	pub fn with_dependencies(mut self, dependencies: Dependencies) -> Self {
		self.dependencies = dependencies;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn dependencies(&self) -> &Dependencies {
		&self.dependencies
	}

	/// Combines two declarations of the same phase.
	pub(crate) fn absorb(&mut self, other: &Phase) {
		debug_assert_eq!(self.name, other.name);
		self.dependencies = std::mem::take(&mut self.dependencies).merge(&other.dependencies);
	}
}
