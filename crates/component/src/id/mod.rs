//! Component identifiers, specifications and best-version selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SpecificationError;

mod version;

pub use version::{Version, VersionSpecification};


/// Immutable identity of a component: a name plus a version.
///
/// The text form is `name` or `name:version`. Identifiers order by name, then version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId {
	name: Box<str>,
	version: Version,
}

impl ComponentId {
	/// Creates an identifier after validating the name.
	pub fn new(name: &str, version: Version) -> Result<Self, SpecificationError> {
		check_name("identifier", name, name)?;
		Ok(Self {
			name: name.into(),
			version,
		})
	}

	/// Creates an unversioned identifier.
	pub fn named(name: &str) -> Result<Self, SpecificationError> {
		Self::new(name, Version::default())
	}

	/// Parses `name[:version]`.
	pub fn parse(text: &str) -> Result<Self, SpecificationError> {
		let text = text.trim();
		let (name, version) = split_name("identifier", text)?;
		let version = match version {
			Some(v) => Version::parse(v).map_err(|e| SpecificationError::new("identifier", text, e.reason))?,
			None => Version::default(),
		};
		Ok(Self {
			name: name.into(),
			version,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> &Version {
		&self.version
	}

	/// Returns the specification matching exactly this identifier.
	pub fn to_specification(&self) -> ComponentSpecification {
		ComponentSpecification {
			name: self.name.clone(),
			version: VersionSpecification::exact(&self.version),
		}
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)?;
		if !self.version.is_empty() {
			write!(f, ":{}", self.version)?;
		}
		Ok(())
	}
}

impl TryFrom<String> for ComponentId {
	type Error = SpecificationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<ComponentId> for String {
	fn from(id: ComponentId) -> Self {
		id.to_string()
	}
}

/// Lookup form of an identifier: a name plus a version constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentSpecification {
	name: Box<str>,
	version: VersionSpecification,
}

impl ComponentSpecification {
	/// A specification matching every version of `name`.
	pub fn any_version(name: &str) -> Result<Self, SpecificationError> {
		check_name("specification", name, name)?;
		Ok(Self {
			name: name.into(),
			version: VersionSpecification::any(),
		})
	}

	/// Parses `name[:version-specification]`.
	pub fn parse(text: &str) -> Result<Self, SpecificationError> {
		let text = text.trim();
		let (name, version) = split_name("specification", text)?;
		let version = match version {
			Some(v) => VersionSpecification::parse(v)
				.map_err(|e| SpecificationError::new("specification", text, e.reason))?,
			None => VersionSpecification::any(),
		};
		Ok(Self {
			name: name.into(),
			version,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> &VersionSpecification {
		&self.version
	}

	/// Returns true if `id` has this name and a version satisfying the constraint.
	pub fn matches(&self, id: &ComponentId) -> bool {
		*self.name == *id.name && self.version.matches(&id.version)
	}
}

impl From<&ComponentId> for ComponentSpecification {
	fn from(id: &ComponentId) -> Self {
		id.to_specification()
	}
}

impl fmt::Display for ComponentSpecification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)?;
		if !self.version.is_any() {
			write!(f, ":{}", self.version)?;
		}
		Ok(())
	}
}

impl TryFrom<String> for ComponentSpecification {
	type Error = SpecificationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<ComponentSpecification> for String {
	fn from(spec: ComponentSpecification) -> Self {
		spec.to_string()
	}
}

/// Picks the highest version among `candidates` that satisfies `spec`.
///
/// Candidates are expected in registration order. Two candidates with the same name and
/// version should never coexist; if they do, the later one wins and a warning is logged.
pub fn select_best<'a, I>(candidates: I, spec: &ComponentSpecification) -> Option<&'a ComponentId>
where
	I: IntoIterator<Item = &'a ComponentId>,
{
	let mut best: Option<&'a ComponentId> = None;
	for id in candidates.into_iter().filter(|id| spec.matches(id)) {
		match best {
			Some(current) if id.version < current.version => {}
			Some(current) if id.version == current.version => {
				tracing::warn!(%id, %spec, "identical identifiers among candidates; using the most recently registered");
				best = Some(id);
			}
			_ => best = Some(id),
		}
	}
	best
}

/// Returns true for characters allowed in component names.
pub(crate) fn is_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '$')
}

fn check_name(kind: &'static str, text: &str, name: &str) -> Result<(), SpecificationError> {
	if name.is_empty() {
		return Err(SpecificationError::new(kind, text, "empty name"));
	}
	match name.chars().find(|c| !is_name_char(*c)) {
		Some(c) => Err(SpecificationError::new(
			kind,
			text,
			format!("name contains illegal character {c:?}"),
		)),
		None => Ok(()),
	}
}

fn split_name<'t>(kind: &'static str, text: &'t str) -> Result<(&'t str, Option<&'t str>), SpecificationError> {
	let (name, version) = match text.split_once(':') {
		Some((name, version)) => (name, Some(version)),
		None => (text, None),
	};
	check_name(kind, text, name)?;
	if version.is_some_and(|v| v.contains(':')) {
		return Err(SpecificationError::new(kind, text, "more than one ':' separator"));
	}
	Ok((name, version))
}
