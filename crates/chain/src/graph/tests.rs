use conduit_component::Identified;
use pretty_assertions::assert_eq;

use super::*;
use crate::Dependencies;

struct Member {
	id: ComponentId,
	dependencies: Dependencies,
	priority: i32,
}

impl Identified for Member {
	fn id(&self) -> &ComponentId {
		&self.id
	}
}

impl Orderable for Member {
	fn dependencies(&self) -> &Dependencies {
		&self.dependencies
	}

	fn priority(&self) -> i32 {
		self.priority
	}
}

fn member(id: &str, dependencies: Dependencies) -> Member {
	Member {
		id: ComponentId::parse(id).unwrap(),
		dependencies,
		priority: 0,
	}
}

fn prioritized(id: &str, priority: i32, dependencies: Dependencies) -> Member {
	Member {
		priority,
		..member(id, dependencies)
	}
}

fn chain_id() -> ComponentId {
	ComponentId::parse("test").unwrap()
}

fn graph(members: &[Member], phases: &[Phase], outer: &[&str]) -> Result<DependencyGraph, BuildError> {
	let outer: Vec<Box<str>> = outer.iter().map(|&s| s.into()).collect();
	DependencyGraph::build(&chain_id(), members, phases, &outer)
}

fn order(members: &[Member], phases: &[Phase]) -> Result<Vec<String>, BuildError> {
	let indices = graph(members, phases, &[])?.order()?;
	Ok(indices.into_iter().map(|i| members[i].id.to_string()).collect())
}

fn deps() -> Dependencies {
	Dependencies::new()
}

#[test]
fn follows_provided_names_and_priorities() {
	let members = [
		prioritized("c", 1, deps().provides("route").after("log")),
		prioritized("d", 5, deps().provides("route").after("log")),
		member("b", deps().provides("log").after("auth")),
		member("a", deps().provides("auth")),
	];
	assert_eq!(order(&members, &[]).unwrap(), ["a", "b", "d", "c"]);
}

#[test]
fn higher_priority_runs_first_when_unconstrained() {
	let members = [
		prioritized("beta", 5, deps()),
		prioritized("alpha", 5, deps()),
		prioritized("zeta", 10, deps()),
		prioritized("omega", -1, deps()),
	];
	assert_eq!(order(&members, &[]).unwrap(), ["zeta", "alpha", "beta", "omega"]);
}

#[test]
fn lower_version_runs_first_among_equal_names() {
	let members = [member("x:2", deps()), member("x:1.5", deps()), member("w:9", deps())];
	assert_eq!(order(&members, &[]).unwrap(), ["w:9.0.0", "x:1.5.0", "x:2.0.0"]);
}

#[test]
fn constraints_override_priority() {
	let members = [
		prioritized("important", 100, deps().after("plain")),
		member("plain", deps()),
	];
	assert_eq!(order(&members, &[]).unwrap(), ["plain", "important"]);
}

#[test]
fn missing_soft_target_is_ignored() {
	let members = [
		member("a", deps().after_if_present("metrics").before_if_present("nowhere")),
		member("b", deps()),
	];
	assert_eq!(order(&members, &[]).unwrap(), ["a", "b"]);
	assert_eq!(graph(&members, &[], &[]).unwrap().edge_count(), 0);
}

#[test]
fn missing_hard_target_fails() {
	let members = [member("a", deps()), member("b", deps().after("metrics"))];
	let err = graph(&members, &[], &[]).unwrap_err();
	assert_eq!(
		err,
		BuildError::UnresolvedDependency {
			chain: "test".to_owned(),
			requester: "b".to_owned(),
			target: "metrics".to_owned(),
		}
	);
}

#[test]
fn wildcard_orders_against_all_other_members() {
	let members = [
		member("last", deps().after("*")),
		member("m2", deps()),
		member("first", deps().before("*")),
		member("m1", deps()),
		member("early", deps().before("*")),
	];
	// Members sharing a wildcard stay unordered among themselves.
	assert_eq!(order(&members, &[]).unwrap(), ["early", "first", "m1", "m2", "last"]);
}

#[test]
fn wildcard_in_empty_neighbourhood_is_harmless() {
	let members = [member("alone", deps().before("*").after_if_present("*"))];
	assert_eq!(order(&members, &[]).unwrap(), ["alone"]);
}

#[test]
fn phases_anchor_members_and_vanish() {
	let phases = [Phase::new("validation").before("routing"), Phase::new("routing")];
	let members = [
		member("router", deps().after("routing")),
		member("validator", deps().after("validation").before("routing")),
		member("auth", deps().before("validation")),
	];
	assert_eq!(order(&members, &phases).unwrap(), ["auth", "validator", "router"]);
}

#[test]
fn repeated_phase_declarations_merge() {
	let phases = [Phase::new("late"), Phase::new("early"), Phase::new("late").after("early")];
	let members = [member("a", deps().after("late")), member("b", deps().before("early"))];
	let g = graph(&members, &phases, &[]).unwrap();
	assert_eq!(g.node_count(), 4);
	assert_eq!(order(&members, &phases).unwrap(), ["b", "a"]);
}

#[test]
fn outer_phases_resolve_constraints() {
	let members = [member("a", deps().after("transport"))];
	assert!(graph(&members, &[], &[]).is_err());

	let g = graph(&members, &[], &["transport"]).unwrap();
	assert_eq!(g.node_count(), 2);
	assert_eq!(g.order().unwrap(), [0]);
}

#[test]
fn outer_phase_defers_to_local_provider() {
	let members = [member("a", deps().provides("transport")), member("b", deps().after("transport"))];
	let g = graph(&members, &[], &["transport"]).unwrap();
	assert_eq!(g.node_count(), 2);
	assert!(g.has_edge(&members[0].id, &members[1].id));
}

#[test]
fn self_references_are_dropped() {
	let members = [member("a", deps().provides("alias").after("alias").before("a"))];
	let g = graph(&members, &[], &[]).unwrap();
	assert_eq!(g.edge_count(), 0);
	assert_eq!(g.order().unwrap(), [0]);
}

#[test]
fn shared_names_get_a_collector_node() {
	let members = [
		member("consumer", deps().after("stage")),
		member("p1", deps().provides("stage").after("stage")),
		member("p2", deps().provides("stage")),
	];
	let g = graph(&members, &[], &[]).unwrap();
	let dump = g.dump();
	let provided: Vec<&str> = dump
		.nodes
		.iter()
		.filter(|n| n.kind == "provided")
		.map(|n| n.label.as_str())
		.collect();
	assert_eq!(provided, ["<stage>"]);
	// A provider ordered after its own name follows the other providers only.
	assert!(g.has_edge(&members[2].id, &members[1].id));
	assert_eq!(order(&members, &[]).unwrap(), ["p2", "p1", "consumer"]);
}

#[test]
fn before_reaches_every_provider() {
	let members = [
		member("p1", deps().provides("stage")),
		member("p2", deps().provides("stage")),
		member("z", deps().before("stage")),
	];
	let g = graph(&members, &[], &[]).unwrap();
	assert!(g.has_edge(&members[2].id, &members[0].id));
	assert!(g.has_edge(&members[2].id, &members[1].id));
	assert_eq!(order(&members, &[]).unwrap(), ["z", "p1", "p2"]);
}

#[test]
fn cycle_is_reported_as_a_path() {
	let members = [
		member("a", deps().after("b")),
		member("b", deps().after("c")),
		member("c", deps().after("a")),
		member("d", deps()),
	];
	let err = order(&members, &[]).unwrap_err();
	assert_eq!(
		err,
		BuildError::CyclicDependency {
			chain: "test".to_owned(),
			cycle: vec!["a".into(), "c".into(), "b".into(), "a".into()],
		}
	);
	assert_eq!(err.to_string(), "cyclic dependency in test: a -> c -> b -> a");
}

#[test]
fn smallest_cycle_is_reported() {
	let members = [
		member("a", deps().after("b")),
		member("b", deps().after("c")),
		member("c", deps().after("a")),
		member("x", deps().before("y")),
		member("y", deps().before("x")),
	];
	let BuildError::CyclicDependency { cycle, .. } = order(&members, &[]).unwrap_err() else {
		panic!("expected a cycle");
	};
	assert_eq!(cycle, ["x", "y", "x"]);
}

#[test]
fn contradictory_before_and_after_is_a_cycle() {
	let members = [member("a", deps().before("b").after("b")), member("b", deps())];
	assert!(matches!(order(&members, &[]), Err(BuildError::CyclicDependency { .. })));
}

#[test]
fn cycle_through_phase_names_the_phase() {
	let phases = [Phase::new("p")];
	let members = [member("a", deps().before("p").after("p"))];
	let BuildError::CyclicDependency { cycle, .. } = order(&members, &phases).unwrap_err() else {
		panic!("expected a cycle");
	};
	assert_eq!(cycle, ["a", "[p]", "a"]);
}

#[test]
fn duplicate_members_are_rejected() {
	let members = [member("a:1", deps()), member("a:1.0.0", deps())];
	let err = graph(&members, &[], &[]).unwrap_err();
	assert!(matches!(err, BuildError::DuplicateMember { .. }), "{err}");
}

#[test]
fn order_does_not_depend_on_insertion_order() {
	let forward = [
		member("a", deps().provides("x")),
		member("b", deps().after("x")),
		prioritized("c", 3, deps()),
		member("d", deps().before("b")),
	];
	let backward = [
		member("d", deps().before("b")),
		prioritized("c", 3, deps()),
		member("b", deps().after("x")),
		member("a", deps().provides("x")),
	];
	assert_eq!(order(&forward, &[]).unwrap(), order(&backward, &[]).unwrap());
}

#[test]
fn dump_serializes_nodes_and_edges() {
	let members = [member("a", deps()), prioritized("b", 2, deps().after("a"))];
	let dump = graph(&members, &[], &[]).unwrap().dump();
	let json = serde_json::to_value(&dump).unwrap();
	assert_eq!(json["chain"], "test");
	assert_eq!(json["nodes"][1]["label"], "b");
	assert_eq!(json["nodes"][1]["priority"], 2);
	assert_eq!(json["edges"][0]["from"], 0);
	assert_eq!(json["edges"][0]["to"], 1);
}

#[test]
fn dot_lists_labels() {
	let phases = [Phase::new("p")];
	let members = [member("a", deps().before("p"))];
	let dot = graph(&members, &phases, &[]).unwrap().to_dot();
	assert!(dot.starts_with("digraph"), "{dot}");
	assert!(dot.contains("\"a\""), "{dot}");
	assert!(dot.contains("\"[p]\""), "{dot}");
	assert!(dot.contains("0 -> 1"), "{dot}");
}
