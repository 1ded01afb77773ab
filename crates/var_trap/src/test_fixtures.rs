//! Definitions shared by unit tests.

use std::sync::Arc;

use serde_json::json;

use crate::{DefinitionBody, Registry, TrapDefinition, Value};

/// Definition with both required properties and no methods.
pub(crate) fn blank() -> TrapDefinition<()> {
	TrapDefinition::new().store_factory(|| ()).value_adder(|_, _| {})
}

/// Accumulating integer array with `add` (chainable) and `sum` (returning).
///
/// `sum(true)` renders the total as a string.
pub(crate) fn array() -> TrapDefinition<Vec<i64>> {
	TrapDefinition::new()
		.store_factory(Vec::new)
		.value_adder(|value, store| store.extend(value.as_i64()))
		.method("add", |store, args| {
			let addition = args.first().and_then(Value::as_i64).unwrap_or_default();
			store.iter_mut().for_each(|value| *value += addition);
		})
		.method_returning("sum", |store, args| {
			let sum: i64 = store.iter().sum();
			match args.first().and_then(Value::as_bool) {
				Some(true) => json!(sum.to_string()),
				_ => json!(sum),
			}
		})
}

pub(crate) fn registry_with(name: &str, def: impl Into<DefinitionBody>) -> Arc<Registry> {
	let registry = Arc::new(Registry::new());
	let def: DefinitionBody = def.into();
	registry.register((name, def)).unwrap();
	registry
}
