//! Method dispatcher compiler.
//!
//! # Role
//!
//! Each registered definition gets one [`Dispatcher`]: a table of method name
//! to [`BoundMethod`], built once at registration. Instantiating a
//! [`Handle`] binds the shared table to one field's store; no per-field
//! method table is built.
//!
//! # Invariants
//!
//! - No method name appears in the reserved method set.
//!   - Enforced in: [`Dispatcher::compile`].
//!   - Failure symptom: a definition method shadows the handle's store accessor
//!     or deletion operation.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::definition::{HandlerFn, MethodSpec, MethodTable};
use crate::{Handle, Result, Store, TrapError, Value};

/// Compiled method: calls the raw handler with the store prepended.
#[derive(Clone)]
pub struct BoundMethod {
	handler: HandlerFn,
	returns_value: bool,
}

impl BoundMethod {
	/// Runs the handler against `store`.
	///
	/// Returns `Some` with the handler's result for value-returning methods and
	/// `None` for chainable ones.
	pub fn call(&self, store: &mut (dyn Any + Send), args: &[Value]) -> Result<Option<Value>> {
		let out = (self.handler)(store, args)?;
		Ok(self.returns_value.then_some(out))
	}

	#[inline]
	pub fn returns_value(&self) -> bool {
		self.returns_value
	}
}

impl From<MethodSpec> for BoundMethod {
	fn from(spec: MethodSpec) -> Self {
		Self {
			handler: spec.handler,
			returns_value: spec.returns_value,
		}
	}
}

/// Per-definition method table.
pub struct Dispatcher {
	definition: Box<str>,
	methods: MethodTable<BoundMethod>,
}

impl Dispatcher {
	/// Compiles `methods` (possibly absent) for the definition named `definition`.
	pub fn compile(
		definition: &str,
		methods: Option<MethodTable<MethodSpec>>,
		reserved: &FxHashSet<Box<str>>,
	) -> Result<Self> {
		let mut table = MethodTable::default();
		for (name, spec) in methods.into_iter().flatten() {
			if reserved.contains(&name) {
				return Err(TrapError::ReservedMethodName { method: name });
			}
			table.insert(name, BoundMethod::from(spec));
		}
		Ok(Self {
			definition: definition.into(),
			methods: table,
		})
	}

	/// Binds this table to a store. The deletion hook is attached by the facade.
	pub fn instantiate(self: &Arc<Self>, store: Store) -> Handle {
		Handle::new(self.clone(), store)
	}

	#[inline]
	pub fn definition(&self) -> &str {
		&self.definition
	}

	#[inline]
	pub fn method(&self, name: &str) -> Option<&BoundMethod> {
		self.methods.get(name)
	}

	#[inline]
	pub fn has_method(&self, name: &str) -> bool {
		self.methods.contains_key(name)
	}

	/// Method names in declaration order.
	pub fn method_names(&self) -> impl Iterator<Item = &str> {
		self.methods.keys().map(AsRef::as_ref)
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.methods.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
	}
}

impl std::fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("definition", &self.definition)
			.field("methods", &self.method_names().collect::<Vec<_>>())
			.finish()
	}
}
