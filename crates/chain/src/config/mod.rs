//! Declarative chain configuration.
//!
//! Plain serde types; any serde format works and TOML is supported out of the box:
//!
//! ```toml
//! [[phases]]
//! name = "validation"
//! before = ["routing"]
//!
//! [[phases]]
//! name = "routing"
//!
//! [[components]]
//! id = "auth:1.2"
//! before = ["validation"]
//!
//! [[components]]
//! id = "router"
//! after = ["routing"]
//! priority = 5
//!
//! [[chains]]
//! id = "default"
//! components = ["auth", "router"]
//!
//! [[chains]]
//! id = "internal"
//! inherits = ["default"]
//! excludes = ["auth"]
//! ```
//!
//! Top-level phases take part in every chain. Chains may add phases of their own.

use serde::{Deserialize, Serialize};

use conduit_component::{ComponentId, ComponentSpecification, SpecificationError};

use crate::{BuildError, Dependencies, Phase, Target};

#[cfg(test)]
mod tests;

/// Every declaration of one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainsConfig {
	pub components: Vec<ComponentDecl>,
	pub phases: Vec<PhaseDecl>,
	pub chains: Vec<ChainDecl>,
}

impl ChainsConfig {
	pub fn from_toml_str(text: &str) -> Result<Self, BuildError> {
		toml::from_str(text).map_err(|e| BuildError::Config(e.to_string()))
	}

	pub fn to_toml_string(&self) -> Result<String, BuildError> {
		toml::to_string(self).map_err(|e| BuildError::Config(e.to_string()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDecl {
	/// `name[:version]`.
	pub id: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub provides: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub before: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub after: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub before_if_present: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub after_if_present: Vec<String>,
	#[serde(default)]
	pub priority: i32,
}

impl ComponentDecl {
	pub fn component_id(&self) -> Result<ComponentId, SpecificationError> {
		ComponentId::parse(&self.id)
	}

	pub fn dependencies(&self) -> Result<Dependencies, SpecificationError> {
		declared_dependencies(
			&self.provides,
			&self.before,
			&self.after,
			&self.before_if_present,
			&self.after_if_present,
		)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseDecl {
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub before: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub after: Vec<String>,
}

impl PhaseDecl {
	pub fn phase(&self) -> Result<Phase, SpecificationError> {
		let name = match Target::parse(&self.name)? {
			Target::Name(name) => name,
			Target::All => {
				return Err(SpecificationError {
					kind: "phase",
					input: self.name.clone(),
					reason: "the wildcard cannot name a phase".to_owned(),
				});
			}
		};
		let dependencies = declared_dependencies(&[], &self.before, &self.after, &[], &[])?;
		Ok(Phase::new(&name).with_dependencies(dependencies))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainDecl {
	/// `name[:version]`.
	pub id: String,
	/// Component specifications; the highest matching version is used.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub components: Vec<String>,
	/// Specifications of chains nested as single members.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub chains: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub phases: Vec<PhaseDecl>,
	/// Names constraints may refer to although this chain does not provide them.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub outer_phases: Vec<String>,
	/// Chains whose components and phases this chain starts from.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub inherits: Vec<String>,
	/// Component specifications removed after inheritance.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub excludes: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub provides: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub before: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub after: Vec<String>,
	#[serde(default)]
	pub priority: i32,
}

impl ChainDecl {
	pub fn chain_id(&self) -> Result<ComponentId, SpecificationError> {
		ComponentId::parse(&self.id)
	}

	/// Ordering declarations used when this chain is nested in another.
	pub fn dependencies(&self) -> Result<Dependencies, SpecificationError> {
		declared_dependencies(&self.provides, &self.before, &self.after, &[], &[])
	}

	pub fn component_specs(&self) -> Result<Vec<ComponentSpecification>, SpecificationError> {
		parse_specs(&self.components)
	}

	pub fn chain_specs(&self) -> Result<Vec<ComponentSpecification>, SpecificationError> {
		parse_specs(&self.chains)
	}

	pub fn inherited_specs(&self) -> Result<Vec<ComponentSpecification>, SpecificationError> {
		parse_specs(&self.inherits)
	}

	pub fn excluded_specs(&self) -> Result<Vec<ComponentSpecification>, SpecificationError> {
		parse_specs(&self.excludes)
	}
}

fn parse_specs(texts: &[String]) -> Result<Vec<ComponentSpecification>, SpecificationError> {
	texts.iter().map(|t| ComponentSpecification::parse(t)).collect()
}

fn declared_dependencies(
	provides: &[String],
	before: &[String],
	after: &[String],
	before_if_present: &[String],
	after_if_present: &[String],
) -> Result<Dependencies, SpecificationError> {
	let mut dependencies = Dependencies::new();
	for name in provides {
		let id = ComponentId::named(name)?;
		dependencies = dependencies.provides(id.name());
	}
	for target in before {
		dependencies = dependencies.before(Target::parse(target)?);
	}
	for target in after {
		dependencies = dependencies.after(Target::parse(target)?);
	}
	for target in before_if_present {
		dependencies = dependencies.before_if_present(Target::parse(target)?);
	}
	for target in after_if_present {
		dependencies = dependencies.after_if_present(Target::parse(target)?);
	}
	Ok(dependencies)
}
