//! Ordering declarations: provided names and before/after constraints.

use std::fmt;

use conduit_component::{ComponentId, SpecificationError};

/// What a constraint refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
	/// A provided name, identifier name or phase name.
	Name(Box<str>),
	/// Every other component in the chain (`*`).
	All,
}

impl Target {
	/// Parses `*` or a symbolic name.
	pub fn parse(text: &str) -> Result<Self, SpecificationError> {
		let text = text.trim();
		if text == "*" {
			return Ok(Self::All);
		}
		// Reuse identifier name validation; targets never carry a version.
		let id = ComponentId::named(text).map_err(|e| SpecificationError {
			kind: "constraint target",
			..e
		})?;
		Ok(Self::Name(id.name().into()))
	}
}

impl From<&str> for Target {
	fn from(name: &str) -> Self {
		if name == "*" { Self::All } else { Self::Name(name.into()) }
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => f.write_str(name),
			Self::All => f.write_str("*"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
	/// The declaring node runs before the target.
	Before,
	/// The declaring node runs after the target.
	After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
	/// The target must exist; otherwise building fails.
	#[default]
	Hard,
	/// Ignored when nothing provides the target.
	Soft,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
	pub relation: Relation,
	pub target: Target,
	pub strength: Strength,
}

/// Names a node provides plus the constraints it places on its position.
///
/// The builder methods take names verbatim; `*` is the wildcard. Use [`Target::parse`]
/// when names come from untrusted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
	provides: Vec<Box<str>>,
	constraints: Vec<Constraint>,
}

impl Dependencies {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an alias other nodes can be ordered against.
	pub fn provides(mut self, name: &str) -> Self {
		if !self.provides.iter().any(|p| &**p == name) {
			self.provides.push(name.into());
		}
		self
	}

	/// Must run before `target`; fails the build if nothing provides it.
	pub fn before(self, target: impl Into<Target>) -> Self {
		self.constrain(Relation::Before, target.into(), Strength::Hard)
	}

	/// Must run after `target`; fails the build if nothing provides it.
	pub fn after(self, target: impl Into<Target>) -> Self {
		self.constrain(Relation::After, target.into(), Strength::Hard)
	}

	/// Runs before `target` when it exists.
	pub fn before_if_present(self, target: impl Into<Target>) -> Self {
		self.constrain(Relation::Before, target.into(), Strength::Soft)
	}

	/// Runs after `target` when it exists.
	pub fn after_if_present(self, target: impl Into<Target>) -> Self {
		self.constrain(Relation::After, target.into(), Strength::Soft)
	}

	pub fn constrain(mut self, relation: Relation, target: Target, strength: Strength) -> Self {
		let constraint = Constraint {
			relation,
			target,
			strength,
		};
		if !self.constraints.contains(&constraint) {
			self.constraints.push(constraint);
		}
		self
	}

	/// Returns the explicitly provided names (the owner's own name is implied).
	pub fn provided(&self) -> &[Box<str>] {
		&self.provides
	}

	pub fn constraints(&self) -> &[Constraint] {
		&self.constraints
	}

	/// Returns true if some constraint uses the wildcard with `relation`.
	pub fn has_wildcard(&self, relation: Relation) -> bool {
		self.constraints
			.iter()
			.any(|c| c.relation == relation && c.target == Target::All)
	}

	/// Appends every name and constraint of `other`.
	pub fn merge(mut self, other: &Dependencies) -> Self {
		for name in &other.provides {
			self = self.provides(name);
		}
		for c in &other.constraints {
			self = self.constrain(c.relation, c.target.clone(), c.strength);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.provides.is_empty() && self.constraints.is_empty()
	}
}
