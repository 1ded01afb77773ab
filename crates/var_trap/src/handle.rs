//! Field handles.
//!
//! A [`Handle`] is what reading a facade field yields. It owns the field's
//! store, shares its definition's [`Dispatcher`], and carries a deletion hook
//! back to the facade that created it. Clones refer to the same field.
//!
//! Methods and value adders run with the store locked. They must not call back
//! into their own handle; other fields and the facade table are free.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::definition::ValueAdderFn;
use crate::facade::FieldTable;
use crate::{Dispatcher, Result, Store, TrapError, Value};

#[derive(Clone)]
pub struct Handle {
	inner: Arc<HandleInner>,
}

struct HandleInner {
	dispatcher: Arc<Dispatcher>,
	store: Mutex<Store>,
	owner: OnceLock<Owner>,
}

/// Back-reference to the facade field that owns a handle.
struct Owner {
	fields: Weak<FieldTable>,
	name: Box<str>,
}

impl Handle {
	pub(crate) fn new(dispatcher: Arc<Dispatcher>, store: Store) -> Self {
		Self {
			inner: Arc::new(HandleInner {
				dispatcher,
				store: Mutex::new(store),
				owner: OnceLock::new(),
			}),
		}
	}

	/// Wires the deletion hook. Only the first call has an effect.
	pub(crate) fn attach(&self, fields: Weak<FieldTable>, name: &str) {
		let _ = self.inner.owner.set(Owner {
			fields,
			name: name.into(),
		});
	}

	/// Folds `value` into the store.
	pub(crate) fn fold(&self, adder: &ValueAdderFn, value: Value) -> Result<()> {
		let mut store = self.inner.store.lock();
		adder(value, &mut **store)
	}

	/// Calls a definition method with the store prepended to `args`.
	pub fn call(&self, method: &str, args: &[Value]) -> Result<Reply> {
		let dispatcher = &self.inner.dispatcher;
		let Some(bound) = dispatcher.method(method) else {
			return Err(TrapError::UnknownMethod {
				definition: dispatcher.definition().into(),
				method: method.into(),
			});
		};
		tracing::trace!(definition = dispatcher.definition(), method, "dispatch");

		let out = {
			let mut store = self.inner.store.lock();
			bound.call(&mut **store, args)?
		};
		Ok(match out {
			Some(value) => Reply::Value(value),
			None => Reply::Handle(self.clone()),
		})
	}

	/// Locks the store and views it as `S`.
	pub fn store<S: Any>(&self) -> Result<MappedMutexGuard<'_, S>> {
		MutexGuard::try_map(self.inner.store.lock(), |store| (**store).downcast_mut::<S>()).map_err(
			|_| TrapError::StoreType {
				expected: type_name::<S>(),
			},
		)
	}

	/// Removes the owning field from its facade.
	///
	/// Does nothing if the field is already gone or the facade was dropped.
	pub fn delete(&self) {
		let Some(owner) = self.inner.owner.get() else {
			return;
		};
		let Some(fields) = owner.fields.upgrade() else {
			return;
		};
		let removed = {
			let mut fields = fields.lock();
			// A re-added field under the same name belongs to another handle.
			let current = fields
				.get(&owner.name)
				.is_some_and(|field| field.handle.ptr_eq(self));
			if current {
				fields.shift_remove(&owner.name)
			} else {
				None
			}
		};
		if removed.is_some() {
			tracing::debug!(field = %owner.name, "removed field");
		}
	}

	/// Name of the definition this handle was built from.
	#[inline]
	pub fn definition(&self) -> &str {
		self.inner.dispatcher.definition()
	}

	/// Name of the owning field, once attached to a facade.
	pub fn field(&self) -> Option<&str> {
		self.inner.owner.get().map(|owner| &*owner.name)
	}

	#[inline]
	pub fn has_method(&self, name: &str) -> bool {
		self.inner.dispatcher.has_method(name)
	}

	pub fn method_names(&self) -> Vec<&str> {
		self.inner.dispatcher.method_names().collect()
	}

	/// Whether both handles refer to the same field instance.
	#[inline]
	pub fn ptr_eq(&self, other: &Handle) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Handle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handle")
			.field("definition", &self.definition())
			.field("field", &self.field())
			.field("methods", &self.method_names())
			.finish_non_exhaustive()
	}
}

/// Result of [`Handle::call`].
#[derive(Debug, Clone)]
pub enum Reply {
	/// A chainable method ran; carries the handle it ran on.
	Handle(Handle),
	/// A value-returning method ran.
	Value(Value),
}

impl Reply {
	/// Chains another call. Fails with [`TrapError::NotChainable`] on a value.
	pub fn call(self, method: &str, args: &[Value]) -> Result<Reply> {
		match self {
			Reply::Handle(handle) => handle.call(method, args),
			Reply::Value(_) => Err(TrapError::NotChainable {
				method: method.into(),
			}),
		}
	}

	pub fn into_value(self) -> Option<Value> {
		match self {
			Reply::Value(value) => Some(value),
			Reply::Handle(_) => None,
		}
	}

	pub fn into_handle(self) -> Option<Handle> {
		match self {
			Reply::Handle(handle) => Some(handle),
			Reply::Value(_) => None,
		}
	}

	pub fn value(&self) -> Option<&Value> {
		match self {
			Reply::Value(value) => Some(value),
			Reply::Handle(_) => None,
		}
	}
}
