use crate::id::{ComponentId, ComponentSpecification};

/// Malformed identifier, version or specification text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} {input:?}: {reason}")]
pub struct SpecificationError {
	/// What was being parsed (`identifier`, `version`, ...).
	pub kind: &'static str,
	/// The rejected input.
	pub input: String,
	/// Why it was rejected.
	pub reason: String,
}

impl SpecificationError {
	pub(crate) fn new(kind: &'static str, input: &str, reason: impl Into<String>) -> Self {
		Self {
			kind,
			input: input.to_owned(),
			reason: reason.into(),
		}
	}
}

/// Registry lookup and mutation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// An entry with the identical identifier is already registered.
	#[error("registry {registry}: duplicate identifier {id}")]
	DuplicateIdentifier {
		registry: &'static str,
		id: ComponentId,
	},
	/// No entry matches the requested identifier or specification.
	#[error("registry {registry}: nothing matches {spec}")]
	NotFound {
		registry: &'static str,
		spec: ComponentSpecification,
	},
	/// The registry was frozen and no longer accepts mutation.
	#[error("registry {registry} is frozen")]
	Frozen { registry: &'static str },
}
