//! Trap definitions and field-intercepting facades.
//!
//! A trap definition bundles a private store, a rule for folding assigned
//! values into that store, and a set of methods operating on the store.
//! Facades expose named fields backed by definitions: reading a field yields
//! a [`Handle`] bound to the field's store, writing folds the value into the
//! store, and removing a field discards the store.
//!
//! # Mental Model
//!
//! 1. **Definition:** [`TrapDefinition`] is authored against a concrete store
//!    type and erased into a [`DefinitionBody`] on registration.
//! 2. **Compilation:** [`Registry::register`] validates each body and compiles
//!    its methods into a [`Dispatcher`] exactly once.
//! 3. **Instantiation:** [`Facade::add_fields`] allocates a fresh store per
//!    field and binds the dispatcher to it, producing a [`Handle`].
//! 4. **Access:** [`Facade::get`], [`Facade::set`], and [`Facade::remove`]
//!    stand in for property read, assignment, and deletion.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use var_trap::{Facade, Registry, TrapDefinition};
//!
//! let registry = Arc::new(Registry::new());
//! registry
//! 	.register((
//! 		"array",
//! 		TrapDefinition::<Vec<i64>>::new()
//! 			.store_factory(Vec::new)
//! 			.value_adder(|value, store| store.extend(value.as_i64()))
//! 			.method_returning("sum", |store, _| json!(store.iter().sum::<i64>())),
//! 	))
//! 	.unwrap();
//!
//! let facade = Facade::with_fields(&registry, [("a", "array")]).unwrap();
//! facade.set("a", 1).unwrap();
//! facade.set("a", 2).unwrap();
//!
//! let sum = facade.get("a").unwrap().call("sum", &[]).unwrap();
//! assert_eq!(sum.into_value(), Some(json!(3)));
//! ```
//!
//! # Concurrency
//!
//! Operations are synchronous. The types are `Send + Sync`, but concurrent
//! mutation of one registry or facade is not part of the contract.

pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod handle;
pub mod registry;
pub mod util;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use config::TrapConfig;
pub use definition::{DefinitionBody, Definitions, Method, TrapDefinition};
pub use dispatch::{BoundMethod, Dispatcher};
pub use error::{Result, TrapError};
pub use facade::{Facade, FieldSpec, IntoFieldSpec};
pub use handle::{Handle, Reply};
pub use registry::{CompiledDefinition, Registry};
pub use serde_json::Value;

/// Prefix carried by every error message.
pub const LIBRARY_NAME: &str = "var-trap";

/// Type-erased field store.
pub type Store = Box<dyn std::any::Any + Send>;
