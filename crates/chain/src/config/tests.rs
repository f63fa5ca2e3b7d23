use pretty_assertions::assert_eq;

use super::*;
use crate::{Relation, Strength};

const CONFIG: &str = r#"
	[[phases]]
	name = "validation"
	before = ["routing"]

	[[phases]]
	name = "routing"

	[[components]]
	id = "auth:1.2"
	provides = ["security"]
	before = ["validation"]

	[[components]]
	id = "router"
	after = ["routing", "*"]
	after_if_present = ["metrics"]
	priority = 5

	[[chains]]
	id = "default"
	components = ["auth", "router"]

	[[chains]]
	id = "internal:2"
	inherits = ["default"]
	excludes = ["auth"]
	outer_phases = ["transport"]
"#;

#[test]
fn parses_every_section() {
	let config = ChainsConfig::from_toml_str(CONFIG).unwrap();

	assert_eq!(config.phases.len(), 2);
	assert_eq!(config.components.len(), 2);
	assert_eq!(config.chains.len(), 2);

	let auth = &config.components[0];
	assert_eq!(auth.component_id().unwrap().to_string(), "auth:1.2.0");
	assert_eq!(auth.priority, 0);
	assert_eq!(config.components[1].priority, 5);

	let internal = &config.chains[1];
	assert_eq!(internal.chain_id().unwrap().name(), "internal");
	assert_eq!(internal.inherits, vec!["default".to_owned()]);
	assert_eq!(internal.outer_phases, vec!["transport".to_owned()]);
	assert!(internal.components.is_empty());
}

#[test]
fn component_declarations_become_dependencies() {
	let config = ChainsConfig::from_toml_str(CONFIG).unwrap();

	let auth = config.components[0].dependencies().unwrap();
	assert_eq!(auth.provided(), [Box::<str>::from("security")]);
	assert_eq!(auth.constraints().len(), 1);
	assert_eq!(auth.constraints()[0].relation, Relation::Before);

	let router = config.components[1].dependencies().unwrap();
	let strengths: Vec<_> = router
		.constraints()
		.iter()
		.map(|c| (c.target.to_string(), c.relation, c.strength))
		.collect();
	assert_eq!(
		strengths,
		vec![
			("routing".to_owned(), Relation::After, Strength::Hard),
			("*".to_owned(), Relation::After, Strength::Hard),
			("metrics".to_owned(), Relation::After, Strength::Soft),
		]
	);
	assert!(router.has_wildcard(Relation::After));
}

#[test]
fn phase_declarations_become_phases() {
	let config = ChainsConfig::from_toml_str(CONFIG).unwrap();
	let validation = config.phases[0].phase().unwrap();
	assert_eq!(validation.name(), "validation");
	assert_eq!(validation.dependencies().constraints().len(), 1);
}

#[test]
fn wildcard_is_not_a_phase_name() {
	let decl = PhaseDecl {
		name: "*".to_owned(),
		..Default::default()
	};
	let err = decl.phase().unwrap_err();
	assert_eq!(err.kind, "phase");
}

#[test]
fn unknown_fields_are_rejected() {
	let err = ChainsConfig::from_toml_str(
		r#"
		[[components]]
		id = "auth"
		befor = ["x"]
		"#,
	)
	.unwrap_err();
	assert!(matches!(err, BuildError::Config(_)), "{err}");
}

#[test]
fn missing_identifier_is_rejected() {
	let err = ChainsConfig::from_toml_str("[[chains]]\ncomponents = [\"a\"]\n").unwrap_err();
	assert!(matches!(err, BuildError::Config(_)), "{err}");
}

#[test]
fn malformed_targets_surface_as_specification_errors() {
	let decl = ComponentDecl {
		id: "auth".to_owned(),
		after: vec!["bad name".to_owned()],
		..Default::default()
	};
	let err = decl.dependencies().unwrap_err();
	assert_eq!(err.kind, "constraint target");
	assert_eq!(err.input, "bad name");
}

#[test]
fn chain_specifications_parse_versions() {
	let decl = ChainDecl {
		id: "search".to_owned(),
		components: vec!["router:2".to_owned(), "auth".to_owned()],
		excludes: vec!["legacy:1.0.3".to_owned()],
		..Default::default()
	};
	let specs = decl.component_specs().unwrap();
	assert_eq!(specs[0].to_string(), "router:2");
	assert!(specs[1].version().is_any());
	assert_eq!(decl.excluded_specs().unwrap()[0].name(), "legacy");
}

#[test]
fn empty_document_is_an_empty_config() {
	assert_eq!(ChainsConfig::from_toml_str("").unwrap(), ChainsConfig::default());
}

#[test]
fn serializes_back_to_equivalent_toml() {
	let config = ChainsConfig::from_toml_str(CONFIG).unwrap();
	let text = config.to_toml_string().unwrap();
	assert_eq!(ChainsConfig::from_toml_str(&text).unwrap(), config);
}
