//! Reserved names and required definition properties.
//!
//! The sets are configurable so hosts can reserve additional names. Only a
//! few entries are load-bearing: the facade's bulk-add operation, and the
//! store accessor and deletion operation on handles.
//!
//! ```toml
//! reserved_keywords = ["add_fields", "registry"]
//! reserved_methods = ["store", "delete"]
//! required_properties = ["store_factory", "value_adder"]
//! ```

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::Result;

/// Name of the facade's bulk-add operation.
pub const ADD_FIELDS: &str = "add_fields";
/// Name of the handle's store accessor.
pub const STORE: &str = "store";
/// Name of the handle's deletion operation.
pub const DELETE: &str = "delete";
/// Property name of a definition's store constructor.
pub const STORE_FACTORY: &str = "store_factory";
/// Property name of a definition's value-folding rule.
pub const VALUE_ADDER: &str = "value_adder";
/// Property name of a definition's method table.
pub const METHODS: &str = "methods";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrapConfig {
	/// Names a facade field may not take.
	pub reserved_keywords: FxHashSet<Box<str>>,
	/// Names a definition method may not take.
	pub reserved_methods: FxHashSet<Box<str>>,
	/// Properties every definition must provide, in reporting order.
	pub required_properties: Vec<Box<str>>,
}

impl Default for TrapConfig {
	fn default() -> Self {
		Self {
			reserved_keywords: [ADD_FIELDS].into_iter().map(Box::from).collect(),
			reserved_methods: [STORE, DELETE].into_iter().map(Box::from).collect(),
			required_properties: vec![STORE_FACTORY.into(), VALUE_ADDER.into()],
		}
	}
}

impl TrapConfig {
	/// Parses a TOML document. Omitted keys keep their defaults.
	pub fn from_toml_str(src: &str) -> Result<Self> {
		Ok(toml::from_str(src)?)
	}

	#[inline]
	pub fn is_reserved_keyword(&self, name: &str) -> bool {
		self.reserved_keywords.contains(name)
	}

	#[inline]
	pub fn is_reserved_method(&self, name: &str) -> bool {
		self.reserved_methods.contains(name)
	}
}
