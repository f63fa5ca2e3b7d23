use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::Version;

#[derive(Debug)]
struct Searcher {
	id: ComponentId,
	tag: &'static str,
}

impl Identified for Searcher {
	fn id(&self) -> &ComponentId {
		&self.id
	}
}

fn searcher(id: &str, tag: &'static str) -> Arc<Searcher> {
	Arc::new(Searcher {
		id: ComponentId::parse(id).unwrap(),
		tag,
	})
}

fn spec(text: &str) -> ComponentSpecification {
	ComponentSpecification::parse(text).unwrap()
}

#[test]
fn register_rejects_duplicate_identifier() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("a:1", "first")).unwrap();
	let err = registry.register(searcher("a:1.0.0", "second")).unwrap_err();
	assert_eq!(
		err,
		RegistryError::DuplicateIdentifier {
			registry: "searchers",
			id: ComponentId::parse("a:1").unwrap(),
		}
	);
	assert_eq!(registry.len(), 1);
	registry.register(searcher("a:2", "other version")).unwrap();
	assert_eq!(registry.len(), 2);
}

#[test]
fn get_is_exact() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("a:1", "v1")).unwrap();
	registry.register(searcher("a:2", "v2")).unwrap();

	let found = registry.get(&ComponentId::parse("a:1").unwrap()).unwrap();
	assert_eq!(found.tag, "v1");
	let err = registry.get(&ComponentId::parse("a").unwrap()).unwrap_err();
	assert_eq!(err.to_string(), "registry searchers: nothing matches a:=0.0.0");
}

#[test]
fn resolve_unconstrained_picks_highest_version() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("a:1.5", "v1.5")).unwrap();
	registry.register(searcher("a:2.0.1", "v2")).unwrap();
	registry.register(searcher("a:1.9", "v1.9")).unwrap();
	registry.register(searcher("b:7", "b")).unwrap();

	assert_eq!(registry.resolve(&spec("a")).unwrap().tag, "v2");
	assert_eq!(registry.resolve(&spec("a:1")).unwrap().tag, "v1.9");
	assert!(registry.contains(&spec("a:1.5")));
	assert!(!registry.contains(&spec("a:3")));
}

#[test]
fn resolve_unregistered_name_fails() {
	let registry: ComponentRegistry<Searcher> = ComponentRegistry::new("searchers");
	let err = registry.resolve(&spec("missing")).unwrap_err();
	assert_eq!(err.to_string(), "registry searchers: nothing matches missing");
}

#[test]
fn unregister_is_noop_when_absent_and_updates_resolution() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("a:1", "v1")).unwrap();
	registry.register(searcher("a:2", "v2")).unwrap();

	assert!(registry.unregister(&ComponentId::parse("zzz").unwrap()).unwrap().is_none());
	let removed = registry.unregister(&ComponentId::parse("a:2").unwrap()).unwrap();
	assert_eq!(removed.map(|s| s.tag), Some("v2"));
	assert_eq!(registry.resolve(&spec("a")).unwrap().tag, "v1");

	registry.unregister(&ComponentId::parse("a:1").unwrap()).unwrap();
	assert!(registry.resolve(&spec("a")).is_err());
	assert!(registry.is_empty());
}

#[test]
fn all_of_filters_by_name_prefix() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("vespa.federation", "f")).unwrap();
	registry.register(searcher("vespa.blend", "b")).unwrap();
	registry.register(searcher("custom.rank", "r")).unwrap();

	let tags: Vec<&str> = registry.all_of("vespa.").iter().map(|s| s.tag).collect();
	assert_eq!(tags, ["b", "f"]);
	assert_eq!(registry.all_of("").len(), 3);
	assert!(registry.all_of("nothing").is_empty());
}

#[test]
fn frozen_registry_rejects_mutation() {
	let mut registry = ComponentRegistry::new("searchers");
	registry.register(searcher("a", "a")).unwrap();
	registry.freeze();
	assert!(registry.is_frozen());

	assert_eq!(
		registry.register(searcher("b", "b")).unwrap_err(),
		RegistryError::Frozen { registry: "searchers" }
	);
	assert!(registry.unregister(&ComponentId::parse("a").unwrap()).is_err());
	assert_eq!(registry.resolve(&spec("a")).unwrap().tag, "a");
}

proptest! {
	#[test]
	fn resolve_returns_maximum_registered_version(versions in proptest::collection::btree_set((0u32..5, 0u32..5, 0u32..5), 1..12)) {
		let mut registry = ComponentRegistry::new("searchers");
		for (major, minor, micro) in &versions {
			registry
				.register(searcher(&format!("c:{major}.{minor}.{micro}"), "x"))
				.unwrap();
		}
		let (major, minor, micro) = versions.iter().max().copied().unwrap();
		let best = registry.resolve(&spec("c")).unwrap();
		prop_assert_eq!(best.id.version(), &Version::new(major, minor, micro));
	}
}
