//! Generic identifier-keyed component registry.
//!
//! # Role
//!
//! A [`ComponentRegistry`] maps [`ComponentId`]s to shared component instances. It is a
//! lookup structure only: iteration order carries no meaning, ordering is the dependency
//! graph's job.
//!
//! # Invariants
//!
//! - At most one entry per identifier (`register` rejects duplicates).
//! - Per-name candidate lists stay in registration order so that version ties resolve
//!   to the most recently registered entry.
//! - A frozen registry never changes again.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{ComponentId, ComponentSpecification, RegistryError, select_best};

#[cfg(test)]
mod tests;

/// Anything that carries a component identifier.
pub trait Identified {
	fn id(&self) -> &ComponentId;
}

impl<T: Identified + ?Sized> Identified for Arc<T> {
	fn id(&self) -> &ComponentId {
		(**self).id()
	}
}

/// Registry of components keyed by identifier.
pub struct ComponentRegistry<T: ?Sized> {
	label: &'static str,
	by_id: FxHashMap<ComponentId, Arc<T>>,
	/// Identifiers per name, in registration order.
	by_name: FxHashMap<Box<str>, Vec<ComponentId>>,
	frozen: bool,
}

impl<T: Identified + ?Sized> ComponentRegistry<T> {
	/// Creates an empty registry; `label` names it in errors and logs.
	pub fn new(label: &'static str) -> Self {
		Self {
			label,
			by_id: FxHashMap::default(),
			by_name: FxHashMap::default(),
			frozen: false,
		}
	}

	/// Registers a component under its own identifier.
	pub fn register(&mut self, component: Arc<T>) -> Result<(), RegistryError> {
		self.ensure_mutable()?;
		let id = component.id().clone();
		if self.by_id.contains_key(&id) {
			return Err(RegistryError::DuplicateIdentifier {
				registry: self.label,
				id,
			});
		}
		self.by_name
			.entry(id.name().into())
			.or_default()
			.push(id.clone());
		self.by_id.insert(id, component);
		Ok(())
	}

	/// Removes the component with this identifier, returning it if present.
	pub fn unregister(&mut self, id: &ComponentId) -> Result<Option<Arc<T>>, RegistryError> {
		self.ensure_mutable()?;
		let Some(removed) = self.by_id.remove(id) else {
			return Ok(None);
		};
		if let Some(ids) = self.by_name.get_mut(id.name()) {
			ids.retain(|existing| existing != id);
			if ids.is_empty() {
				self.by_name.remove(id.name());
			}
		}
		Ok(Some(removed))
	}

	/// Exact lookup.
	pub fn get(&self, id: &ComponentId) -> Result<&Arc<T>, RegistryError> {
		self.by_id
			.get(id)
			.ok_or_else(|| RegistryError::NotFound {
				registry: self.label,
				spec: id.to_specification(),
			})
	}

	/// Best-version lookup: the highest registered version satisfying `spec`.
	pub fn resolve(&self, spec: &ComponentSpecification) -> Result<&Arc<T>, RegistryError> {
		let not_found = || RegistryError::NotFound {
			registry: self.label,
			spec: spec.clone(),
		};
		let candidates = self.by_name.get(spec.name()).ok_or_else(not_found)?;
		let best = select_best(candidates, spec).ok_or_else(not_found)?;
		self.get(best)
	}

	/// Returns true if some entry satisfies `spec`.
	pub fn contains(&self, spec: &ComponentSpecification) -> bool {
		self.by_name
			.get(spec.name())
			.is_some_and(|ids| ids.iter().any(|id| spec.matches(id)))
	}

	/// Enumerates every entry whose name starts with `name_prefix`, sorted by identifier.
	pub fn all_of(&self, name_prefix: &str) -> Vec<&Arc<T>> {
		let mut found: Vec<(&ComponentId, &Arc<T>)> = self
			.by_id
			.iter()
			.filter(|(id, _)| id.name().starts_with(name_prefix))
			.collect();
		found.sort_unstable_by(|a, b| a.0.cmp(b.0));
		found.into_iter().map(|(_, value)| value).collect()
	}

	/// Iterates over all entries in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
		self.by_id.values()
	}

	/// Returns the registered identifiers, sorted.
	pub fn ids(&self) -> Vec<&ComponentId> {
		let mut ids: Vec<&ComponentId> = self.by_id.keys().collect();
		ids.sort_unstable();
		ids
	}

	/// Stops accepting mutation. Idempotent.
	pub fn freeze(&mut self) {
		if !self.frozen {
			tracing::debug!(registry = self.label, entries = self.by_id.len(), "registry frozen");
		}
		self.frozen = true;
	}

	pub fn is_frozen(&self) -> bool {
		self.frozen
	}

	pub fn len(&self) -> usize {
		self.by_id.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_id.is_empty()
	}

	fn ensure_mutable(&self) -> Result<(), RegistryError> {
		if self.frozen {
			return Err(RegistryError::Frozen { registry: self.label });
		}
		Ok(())
	}
}

impl<T: ?Sized> std::fmt::Debug for ComponentRegistry<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComponentRegistry")
			.field("label", &self.label)
			.field("len", &self.by_id.len())
			.field("frozen", &self.frozen)
			.finish()
	}
}
