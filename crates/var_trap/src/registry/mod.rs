//! Trap definition registry with atomic publication.
//!
//! # Role
//!
//! Maps definition names to [`CompiledDefinition`]s. Readers load the current
//! snapshot without locking; writers build an extended snapshot and swap it
//! in. Each registered or removed name is published on its own, so a batch
//! that fails part way keeps the entries processed before the failure.
//!
//! # Invariants
//!
//! - A name maps to at most one definition until it is unregistered.
//!   - Enforced in: [`Registry::register`].
//!   - Tested by: `registry::tests::duplicate_name_is_rejected`
//! - Required properties are checked before the duplicate check.
//!   - Enforced in: [`Registry::register`].
//!   - Tested by: `registry::tests::missing_properties_win_over_duplicate`
//! - Fields built from a definition outlive its unregistration.
//!   - Enforced in: [`CompiledDefinition`] (shared through `Arc`).

use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

use crate::config::{STORE_FACTORY, VALUE_ADDER};
use crate::definition::{StoreFactoryFn, ValueAdderFn};
use crate::util::difference;
use crate::{Definitions, Dispatcher, Result, Store, TrapConfig, TrapError};

/// A validated definition together with its compiled dispatcher.
pub struct CompiledDefinition {
	name: Box<str>,
	store_type: &'static str,
	pub(crate) store_factory: StoreFactoryFn,
	pub(crate) value_adder: ValueAdderFn,
	dispatcher: Arc<Dispatcher>,
}

impl CompiledDefinition {
	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn store_type(&self) -> &'static str {
		self.store_type
	}

	#[inline]
	pub fn dispatcher(&self) -> &Arc<Dispatcher> {
		&self.dispatcher
	}

	/// Allocates a fresh store.
	pub fn new_store(&self) -> Store {
		(self.store_factory)()
	}
}

impl std::fmt::Debug for CompiledDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompiledDefinition")
			.field("name", &self.name)
			.field("store", &self.store_type)
			.field("dispatcher", &self.dispatcher)
			.finish()
	}
}

#[derive(Clone, Default)]
struct Snapshot {
	by_name: IndexMap<Box<str>, Arc<CompiledDefinition>, FxBuildHasher>,
}

pub struct Registry {
	config: Arc<TrapConfig>,
	snap: ArcSwap<Snapshot>,
	/// Serializes writers; readers never take it.
	write: Mutex<()>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	/// Creates an empty registry with the default configuration.
	pub fn new() -> Self {
		Self::with_config(TrapConfig::default())
	}

	pub fn with_config(config: TrapConfig) -> Self {
		Self {
			config: Arc::new(config),
			snap: ArcSwap::from_pointee(Snapshot::default()),
			write: Mutex::new(()),
		}
	}

	#[inline]
	pub fn config(&self) -> &TrapConfig {
		&self.config
	}

	/// Registers one or more definitions, in order.
	pub fn register(&self, defs: impl Into<Definitions>) -> Result<()> {
		let defs: Definitions = defs.into();
		let _guard = self.write.lock();

		for (name, body) in defs {
			let present = body.properties();
			let required: Vec<&str> = self.config.required_properties.iter().map(AsRef::as_ref).collect();
			let missing = difference(&required, &present);
			if !missing.is_empty() {
				let missing = missing.into_iter().copied().collect::<Vec<_>>().join(", ");
				return Err(TrapError::MissingRequiredProperty { missing });
			}

			if self.contains(&name) {
				return Err(TrapError::DuplicateDefinition { name });
			}

			let dispatcher = Dispatcher::compile(&name, body.methods, &self.config.reserved_methods)?;
			let (Some(store_factory), Some(value_adder)) = (body.store_factory, body.value_adder)
			else {
				let missing = difference(&[STORE_FACTORY, VALUE_ADDER], &present)
					.into_iter()
					.copied()
					.collect::<Vec<_>>()
					.join(", ");
				return Err(TrapError::MissingRequiredProperty { missing });
			};

			let compiled = Arc::new(CompiledDefinition {
				name: name.clone(),
				store_type: body.store_type,
				store_factory,
				value_adder,
				dispatcher: Arc::new(dispatcher),
			});

			let mut next = Snapshot::clone(&self.snap.load());
			next.by_name.insert(name.clone(), compiled);
			self.snap.store(Arc::new(next));
			tracing::debug!(definition = %name, "registered trap definition");
		}
		Ok(())
	}

	/// Unregisters definitions, in order.
	pub fn unregister<I>(&self, names: I) -> Result<()>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let _guard = self.write.lock();

		for name in names {
			let name = name.as_ref();
			let current = self.snap.load();
			if !current.by_name.contains_key(name) {
				return Err(TrapError::UnknownDefinition { name: name.into() });
			}
			let mut next = Snapshot::clone(&current);
			next.by_name.shift_remove(name);
			self.snap.store(Arc::new(next));
			tracing::debug!(definition = name, "unregistered trap definition");
		}
		Ok(())
	}

	/// Removes every definition.
	pub fn clear(&self) {
		let _guard = self.write.lock();
		self.snap.store(Arc::default());
		tracing::debug!("cleared trap definitions");
	}

	#[inline]
	pub fn get(&self, name: &str) -> Option<Arc<CompiledDefinition>> {
		self.snap.load().by_name.get(name).cloned()
	}

	#[inline]
	pub fn contains(&self, name: &str) -> bool {
		self.snap.load().by_name.contains_key(name)
	}

	/// Registered names in registration order.
	pub fn names(&self) -> Vec<Box<str>> {
		self.snap.load().by_name.keys().cloned().collect()
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.snap.load().by_name.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.snap.load().by_name.is_empty()
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("definitions", &self.names())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
