//! Component identities and versioned component registries.
//!
//! # Purpose
//!
//! Every pluggable unit in a chain is addressed by a [`ComponentId`]: a name plus a
//! [`Version`]. Lookups use a [`ComponentSpecification`], which may leave parts of the
//! version open and therefore match several registered identifiers. The
//! [`ComponentRegistry`] stores components by identifier and resolves specifications to
//! the best (highest) matching version.
//!
//! # Lifecycle
//!
//! Registries are filled by a single writer while a deployment generation is built, then
//! [`ComponentRegistry::freeze`] is called and the registry is shared read-only. Mutation
//! after freezing fails with [`RegistryError::Frozen`].

mod error;
mod id;
mod registry;

pub use error::{RegistryError, SpecificationError};
pub use id::{ComponentId, ComponentSpecification, Version, VersionSpecification, select_best};
pub use registry::{ComponentRegistry, Identified};
