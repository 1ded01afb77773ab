//! Error taxonomy.
//!
//! Every message is prefixed with [`LIBRARY_NAME`] so callers can surface it
//! verbatim.

use crate::LIBRARY_NAME;

pub type Result<T, E = TrapError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrapError {
	/// Definition lacks one or more required properties.
	#[error("{lib}: provide the following trap definition properties: {missing}", lib = LIBRARY_NAME)]
	MissingRequiredProperty {
		/// Missing property names, comma-joined in configured order.
		missing: String,
	},

	#[error("{lib}: trap definition '{name}' already exists", lib = LIBRARY_NAME)]
	DuplicateDefinition { name: Box<str> },

	#[error("{lib}: '{method}' method name is reserved", lib = LIBRARY_NAME)]
	ReservedMethodName { method: Box<str> },

	#[error("{lib}: trap definition '{name}' does not exist", lib = LIBRARY_NAME)]
	UnknownDefinition { name: Box<str> },

	#[error(
		"{lib}: field specification should be a mapping of field name and trap definition name pairs",
		lib = LIBRARY_NAME
	)]
	InvalidSpec,

	#[error("{lib}: '{field}' field name is a reserved keyword", lib = LIBRARY_NAME)]
	ReservedKeyword { field: Box<str> },

	#[error("{lib}: '{field}' field name already exists", lib = LIBRARY_NAME)]
	FieldAlreadyExists { field: Box<str> },

	#[error("{lib}: '{field}' is a reserved facade property and cannot be deleted", lib = LIBRARY_NAME)]
	ReservedPropertyDeletion { field: Box<str> },

	#[error("{lib}: field '{field}' does not exist", lib = LIBRARY_NAME)]
	UnknownField { field: Box<str> },

	#[error("{lib}: trap definition '{definition}' has no method '{method}'", lib = LIBRARY_NAME)]
	UnknownMethod { definition: Box<str>, method: Box<str> },

	/// A call was chained onto a reply that carries a value, not a handle.
	#[error("{lib}: cannot call '{method}' on a returned value", lib = LIBRARY_NAME)]
	NotChainable { method: Box<str> },

	#[error("{lib}: store is not of type {expected}", lib = LIBRARY_NAME)]
	StoreType { expected: &'static str },

	#[error("{lib}: invalid configuration: {0}", lib = LIBRARY_NAME)]
	Config(String),
}

impl From<toml::de::Error> for TrapError {
	fn from(err: toml::de::Error) -> Self {
		Self::Config(err.to_string())
	}
}
