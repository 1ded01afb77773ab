//! Trap object facade.
//!
//! # Role
//!
//! A [`Facade`] is a per-object table of named fields, each backed by a
//! registered definition. The table stands in for native property
//! interception: [`Facade::get`], [`Facade::set`], and [`Facade::remove`] are
//! the read, assignment, and deletion hooks of a field.
//!
//! # Invariants
//!
//! - Field names are unique within a facade and never a reserved keyword.
//!   - Enforced in: [`Facade::add_fields`].
//! - Writing a field never replaces its binding; the value is folded into the
//!   store and the same [`Handle`] is returned by later reads.
//!   - Enforced in: [`Facade::set`].
//! - Deleting through the facade and through [`Handle::delete`] are the same
//!   operation.
//!   - Enforced in: [`Facade::remove`] (delegates to the handle).
//!
//! Adding fields is sequential: a failing pair leaves the pairs before it
//! installed. Store factories run with no facade lock held.

mod spec;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
pub use spec::{FieldSpec, IntoFieldSpec};

use crate::definition::ValueAdderFn;
use crate::{Handle, Registry, Result, TrapError, Value};

pub(crate) type FieldTable = Mutex<IndexMap<Box<str>, Field, FxBuildHasher>>;

/// One active field: its handle (which owns the store) and the fold rule.
pub(crate) struct Field {
	pub(crate) handle: Handle,
	value_adder: ValueAdderFn,
}

pub struct Facade {
	registry: Arc<Registry>,
	fields: Arc<FieldTable>,
}

impl Facade {
	/// Creates a facade with no fields.
	pub fn new(registry: &Arc<Registry>) -> Self {
		Self {
			registry: registry.clone(),
			fields: Arc::default(),
		}
	}

	/// Creates a facade and adds the fields of `spec`.
	pub fn with_fields(registry: &Arc<Registry>, spec: impl IntoFieldSpec) -> Result<Self> {
		let facade = Self::new(registry);
		facade.add_fields(spec)?;
		Ok(facade)
	}

	/// Adds one field per `(field, definition)` pair, in order.
	pub fn add_fields(&self, spec: impl IntoFieldSpec) -> Result<()> {
		let spec = spec.into_field_spec()?;
		let config = self.registry.config();

		for (name, definition) in spec.iter() {
			if config.is_reserved_keyword(name) {
				return Err(TrapError::ReservedKeyword { field: name.into() });
			}
			let Some(def) = self.registry.get(definition) else {
				return Err(TrapError::UnknownDefinition {
					name: definition.into(),
				});
			};

			if self.contains(name) {
				return Err(TrapError::FieldAlreadyExists { field: name.into() });
			}
			// The factory is user code and may read this facade.
			let store = def.new_store();

			let mut fields = self.fields.lock();
			if fields.contains_key(name) {
				return Err(TrapError::FieldAlreadyExists { field: name.into() });
			}
			let handle = def.dispatcher().instantiate(store);
			handle.attach(Arc::downgrade(&self.fields), name);
			fields.insert(
				name.into(),
				Field {
					handle,
					value_adder: def.value_adder.clone(),
				},
			);
			tracing::debug!(field = name, definition, "added field");
		}
		Ok(())
	}

	/// Reads a field.
	pub fn get(&self, name: &str) -> Option<Handle> {
		self.fields.lock().get(name).map(|field| field.handle.clone())
	}

	/// Folds `value` into the field's store.
	pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
		if self.registry.config().is_reserved_keyword(name) {
			return Err(TrapError::ReservedKeyword { field: name.into() });
		}
		let (handle, adder) = {
			let fields = self.fields.lock();
			let field = fields
				.get(name)
				.ok_or_else(|| TrapError::UnknownField { field: name.into() })?;
			(field.handle.clone(), field.value_adder.clone())
		};
		handle.fold(&adder, value.into())
	}

	/// Deletes a field. Removing an absent field is a no-op.
	pub fn remove(&self, name: &str) -> Result<()> {
		if self.registry.config().is_reserved_keyword(name) {
			return Err(TrapError::ReservedPropertyDeletion { field: name.into() });
		}
		if let Some(handle) = self.get(name) {
			handle.delete();
		}
		Ok(())
	}

	#[inline]
	pub fn contains(&self, name: &str) -> bool {
		self.fields.lock().contains_key(name)
	}

	/// Field names in insertion order.
	pub fn field_names(&self) -> Vec<Box<str>> {
		self.fields.lock().keys().cloned().collect()
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.fields.lock().len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.fields.lock().is_empty()
	}

	#[inline]
	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}
}

impl fmt::Debug for Facade {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let fields = self.fields.lock();
		f.debug_map()
			.entries(fields.iter().map(|(name, field)| (name, field.handle.definition())))
			.finish()
	}
}
