//! Trap definition authoring and type erasure.
//!
//! # Role
//!
//! Authors describe a definition against a concrete store type with
//! [`TrapDefinition`]. Registration erases it into a [`DefinitionBody`] so
//! definitions over different store types can share one registry.
//!
//! # Invariants
//!
//! - An erased handler only ever receives stores produced by the store
//!   factory of the same definition. The downcast in each erased closure
//!   still reports [`TrapError::StoreType`] instead of panicking.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::config::{METHODS, STORE_FACTORY, VALUE_ADDER};
use crate::{Result, Store, TrapError, Value};

pub(crate) type StoreFactoryFn = Arc<dyn Fn() -> Store + Send + Sync>;
pub(crate) type ValueAdderFn = Arc<dyn Fn(Value, &mut (dyn Any + Send)) -> Result<()> + Send + Sync>;
pub(crate) type HandlerFn = Arc<dyn Fn(&mut (dyn Any + Send), &[Value]) -> Result<Value> + Send + Sync>;

pub(crate) type MethodTable<M> = IndexMap<Box<str>, M, FxBuildHasher>;

type TypedHandler<S> = Arc<dyn Fn(&mut S, &[Value]) -> Value + Send + Sync>;

/// Normalized method: a handler plus whether its result is returned.
pub struct Method<S> {
	handler: TypedHandler<S>,
	returns_value: bool,
}

impl<S> Clone for Method<S> {
	fn clone(&self) -> Self {
		Self {
			handler: self.handler.clone(),
			returns_value: self.returns_value,
		}
	}
}

impl<S: Any + Send> Method<S> {
	/// Runs for its side effect; the call yields the handle for chaining.
	pub fn chain<F>(handler: F) -> Self
	where
		F: Fn(&mut S, &[Value]) + Send + Sync + 'static,
	{
		Self {
			handler: Arc::new(move |store: &mut S, args: &[Value]| {
				handler(store, args);
				Value::Null
			}),
			returns_value: false,
		}
	}

	/// The call yields the handler's result.
	pub fn returning<F>(handler: F) -> Self
	where
		F: Fn(&mut S, &[Value]) -> Value + Send + Sync + 'static,
	{
		Self {
			handler: Arc::new(handler),
			returns_value: true,
		}
	}

	#[inline]
	pub fn returns_value(&self) -> bool {
		self.returns_value
	}

	fn erase(self) -> MethodSpec {
		let handler = self.handler;
		let erased: HandlerFn = Arc::new(move |store: &mut (dyn Any + Send), args: &[Value]| -> Result<Value> {
			let store = downcast::<S>(store)?;
			Ok(handler(store, args))
		});
		MethodSpec {
			handler: erased,
			returns_value: self.returns_value,
		}
	}
}

/// Typed builder for a trap definition over store type `S`.
///
/// `store_factory` and `value_adder` are required; the registry rejects a
/// definition missing either of them.
pub struct TrapDefinition<S> {
	store_factory: Option<Arc<dyn Fn() -> S + Send + Sync>>,
	value_adder: Option<Arc<dyn Fn(Value, &mut S) + Send + Sync>>,
	methods: Option<MethodTable<Method<S>>>,
}

impl<S: Any + Send> Default for TrapDefinition<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: Any + Send> TrapDefinition<S> {
	pub fn new() -> Self {
		Self {
			store_factory: None,
			value_adder: None,
			methods: None,
		}
	}

	/// Sets the constructor for each field's fresh store.
	pub fn store_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> S + Send + Sync + 'static,
	{
		self.store_factory = Some(Arc::new(factory));
		self
	}

	/// Sets the rule folding an assigned value into the store.
	pub fn value_adder<F>(mut self, adder: F) -> Self
	where
		F: Fn(Value, &mut S) + Send + Sync + 'static,
	{
		self.value_adder = Some(Arc::new(adder));
		self
	}

	/// Declares a chainable method. Redeclaring a name replaces the handler.
	pub fn method<F>(self, name: impl Into<Box<str>>, handler: F) -> Self
	where
		F: Fn(&mut S, &[Value]) + Send + Sync + 'static,
	{
		self.with_method(name, Method::chain(handler))
	}

	/// Declares a method whose result is returned to the caller.
	pub fn method_returning<F>(self, name: impl Into<Box<str>>, handler: F) -> Self
	where
		F: Fn(&mut S, &[Value]) -> Value + Send + Sync + 'static,
	{
		self.with_method(name, Method::returning(handler))
	}

	pub fn with_method(mut self, name: impl Into<Box<str>>, method: Method<S>) -> Self {
		self.methods
			.get_or_insert_with(MethodTable::default)
			.insert(name.into(), method);
		self
	}
}

impl<S> fmt::Debug for TrapDefinition<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrapDefinition")
			.field("store", &type_name::<S>())
			.field("store_factory", &self.store_factory.is_some())
			.field("value_adder", &self.value_adder.is_some())
			.field(
				"methods",
				&self.methods.iter().flat_map(|m| m.keys()).collect::<Vec<_>>(),
			)
			.finish()
	}
}

/// Erased `{handler, returns_value}` pair, input to the dispatcher compiler.
#[derive(Clone)]
pub struct MethodSpec {
	pub(crate) handler: HandlerFn,
	pub(crate) returns_value: bool,
}

/// Type-erased trap definition as consumed by the registry.
#[derive(Clone)]
pub struct DefinitionBody {
	pub(crate) store_factory: Option<StoreFactoryFn>,
	pub(crate) value_adder: Option<ValueAdderFn>,
	pub(crate) methods: Option<MethodTable<MethodSpec>>,
	pub(crate) store_type: &'static str,
}

impl DefinitionBody {
	/// Names of the properties this body provides.
	pub fn properties(&self) -> Vec<&'static str> {
		let mut props = Vec::with_capacity(3);
		if self.store_factory.is_some() {
			props.push(STORE_FACTORY);
		}
		if self.value_adder.is_some() {
			props.push(VALUE_ADDER);
		}
		if self.methods.is_some() {
			props.push(METHODS);
		}
		props
	}

	#[inline]
	pub fn store_type(&self) -> &'static str {
		self.store_type
	}
}

impl fmt::Debug for DefinitionBody {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DefinitionBody")
			.field("store", &self.store_type)
			.field("properties", &self.properties())
			.finish()
	}
}

impl<S: Any + Send> From<TrapDefinition<S>> for DefinitionBody {
	fn from(def: TrapDefinition<S>) -> Self {
		let store_factory = def.store_factory.map(|factory| -> StoreFactoryFn {
			Arc::new(move || Box::new(factory()) as Store)
		});
		let value_adder = def.value_adder.map(|adder| -> ValueAdderFn {
			Arc::new(move |value: Value, store: &mut (dyn Any + Send)| -> Result<()> {
				adder(value, downcast::<S>(store)?);
				Ok(())
			})
		});
		let methods = def.methods.map(|methods| {
			methods
				.into_iter()
				.map(|(name, method)| (name, method.erase()))
				.collect()
		});
		Self {
			store_factory,
			value_adder,
			methods,
			store_type: type_name::<S>(),
		}
	}
}

/// One or more named definitions, in caller order.
///
/// Built from a single `(name, definition)` pair or any collection of pairs.
#[derive(Debug, Default)]
pub struct Definitions(Vec<(Box<str>, DefinitionBody)>);

impl Definitions {
	#[inline]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl IntoIterator for Definitions {
	type Item = (Box<str>, DefinitionBody);
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<N, D> From<(N, D)> for Definitions
where
	N: Into<Box<str>>,
	D: Into<DefinitionBody>,
{
	fn from((name, def): (N, D)) -> Self {
		Self(vec![(name.into(), def.into())])
	}
}

impl<N, D, const LEN: usize> From<[(N, D); LEN]> for Definitions
where
	N: Into<Box<str>>,
	D: Into<DefinitionBody>,
{
	fn from(defs: [(N, D); LEN]) -> Self {
		defs.into_iter().collect()
	}
}

impl<N, D> From<Vec<(N, D)>> for Definitions
where
	N: Into<Box<str>>,
	D: Into<DefinitionBody>,
{
	fn from(defs: Vec<(N, D)>) -> Self {
		defs.into_iter().collect()
	}
}

impl<N, D> FromIterator<(N, D)> for Definitions
where
	N: Into<Box<str>>,
	D: Into<DefinitionBody>,
{
	fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, def)| (name.into(), def.into()))
				.collect(),
		)
	}
}

fn downcast<S: Any>(store: &mut (dyn Any + Send)) -> Result<&mut S> {
	store.downcast_mut::<S>().ok_or(TrapError::StoreType {
		expected: type_name::<S>(),
	})
}
