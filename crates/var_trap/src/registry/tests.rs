use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::config::{DELETE, STORE};
use crate::test_fixtures::{array, blank};
use crate::{DefinitionBody, TrapDefinition};

fn names(registry: &Registry) -> Vec<String> {
	registry.names().iter().map(ToString::to_string).collect()
}

#[test]
fn missing_required_properties_are_listed_in_order() {
	let registry = Registry::new();
	let err = registry.register(("definition", TrapDefinition::<()>::new())).unwrap_err();
	assert_eq!(
		err,
		TrapError::MissingRequiredProperty {
			missing: "store_factory, value_adder".into()
		}
	);
	assert_eq!(
		err.to_string(),
		"var-trap: provide the following trap definition properties: store_factory, value_adder"
	);
}

#[test]
fn reports_only_the_missing_property() {
	let registry = Registry::new();
	let def = TrapDefinition::<()>::new().store_factory(|| ());
	let err = registry.register(("definition", def)).unwrap_err();
	assert_eq!(
		err,
		TrapError::MissingRequiredProperty {
			missing: "value_adder".into()
		}
	);
	assert!(registry.is_empty());
}

#[test]
fn duplicate_name_is_rejected() {
	let registry = Registry::new();
	registry.register(("name", blank())).unwrap();
	let err = registry.register(("name", blank())).unwrap_err();
	assert_eq!(err, TrapError::DuplicateDefinition { name: "name".into() });
	assert_eq!(err.to_string(), "var-trap: trap definition 'name' already exists");
}

#[test]
fn missing_properties_win_over_duplicate() {
	let registry = Registry::new();
	registry.register(("name", blank())).unwrap();
	let err = registry.register(("name", TrapDefinition::<()>::new())).unwrap_err();
	assert!(matches!(err, TrapError::MissingRequiredProperty { .. }));
}

#[rstest]
#[case(STORE)]
#[case(DELETE)]
fn reserved_method_names_abort_registration(#[case] reserved: &str) {
	let registry = Registry::new();
	let err = registry
		.register(("name", blank().method(reserved, |_, _| {})))
		.unwrap_err();
	assert_eq!(err.to_string(), format!("var-trap: '{reserved}' method name is reserved"));
	assert!(!registry.contains("name"));
}

#[test]
fn every_configured_reserved_method_is_rejected() {
	let registry = Registry::new();
	for reserved in &registry.config().reserved_methods {
		let err = registry
			.register(("name", blank().method(&**reserved, |_, _| {})))
			.unwrap_err();
		assert_eq!(
			err,
			TrapError::ReservedMethodName {
				method: reserved.clone()
			}
		);
	}
}

#[test]
fn accepts_a_single_definition() {
	let registry = Registry::new();
	registry.register(("name", blank())).unwrap();
	let def = registry.get("name").unwrap();
	assert_eq!(def.name(), "name");
	assert_eq!(def.store_type(), "()");
}

#[test]
fn accepts_several_definitions_at_once() {
	let registry = Registry::new();
	registry.register([("one", blank()), ("two", blank())]).unwrap();
	assert_eq!(names(&registry), vec!["one", "two"]);
}

#[test]
fn registration_is_sequential_not_transactional() {
	let registry = Registry::new();
	let defs: Definitions = [
		("one", DefinitionBody::from(blank())),
		("two", TrapDefinition::<()>::new().into()),
		("three", blank().into()),
	]
	.into();
	assert!(registry.register(defs).is_err());
	assert_eq!(names(&registry), vec!["one"]);
}

#[test]
fn blank_definition_has_no_methods() {
	let registry = Registry::new();
	registry.register(("name", blank())).unwrap();
	assert!(registry.get("name").unwrap().dispatcher().is_empty());
}

#[test]
fn declared_methods_are_compiled() {
	let registry = Registry::new();
	registry
		.register(("name", blank().method("one", |_, _| {}).method("two", |_, _| {})))
		.unwrap();
	let def = registry.get("name").unwrap();
	let methods: Vec<&str> = def.dispatcher().method_names().collect();
	assert_eq!(methods, vec!["one", "two"]);
}

#[test]
fn unregister_unknown_name_fails() {
	let registry = Registry::new();
	let err = registry.unregister(["none"]).unwrap_err();
	assert_eq!(err, TrapError::UnknownDefinition { name: "none".into() });
	assert_eq!(err.to_string(), "var-trap: trap definition 'none' does not exist");
}

#[test]
fn unregister_removes_definitions() {
	let registry = Registry::new();
	registry.register([("one", blank()), ("two", blank())]).unwrap();
	registry.unregister(["one", "two"]).unwrap();
	assert!(registry.is_empty());
	assert!(registry.names().is_empty());
}

#[test]
fn unregister_stops_at_first_unknown_name() {
	let registry = Registry::new();
	registry.register([("one", blank()), ("two", blank())]).unwrap();
	assert!(registry.unregister(["one", "none", "two"]).is_err());
	assert_eq!(names(&registry), vec!["two"]);
}

#[test]
fn name_can_be_reused_after_unregister() {
	let registry = Registry::new();
	registry.register(("name", blank())).unwrap();
	registry.unregister(["name"]).unwrap();
	registry.register(("name", array())).unwrap();
	assert_eq!(registry.get("name").unwrap().store_type(), std::any::type_name::<Vec<i64>>());
}

#[test]
fn clear_empties_the_registry() {
	let registry = Registry::new();
	registry.register([("one", blank()), ("two", blank())]).unwrap();
	registry.clear();
	assert_eq!(registry.len(), 0);
	registry.register(("one", blank())).unwrap();
	assert_eq!(registry.len(), 1);
}

#[test]
fn custom_configuration_changes_reserved_methods() {
	let config = TrapConfig::from_toml_str(r#"reserved_methods = ["store", "delete", "reset"]"#).unwrap();
	let registry = Registry::with_config(config);
	let err = registry
		.register(("name", blank().method("reset", |_, _| {})))
		.unwrap_err();
	assert_eq!(err, TrapError::ReservedMethodName { method: "reset".into() });
}

#[test]
fn custom_configuration_changes_required_properties() {
	let config = TrapConfig::from_toml_str(
		r#"required_properties = ["methods", "store_factory", "value_adder"]"#,
	)
	.unwrap();
	let registry = Registry::with_config(config);
	let err = registry.register(("name", blank())).unwrap_err();
	assert_eq!(
		err,
		TrapError::MissingRequiredProperty {
			missing: "methods".into()
		}
	);
}
