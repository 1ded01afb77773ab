//! Field specifications: ordered field name -> definition name pairs.

use std::str::FromStr;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{Result, TrapError, Value};

/// Mapping of field name to definition name, in insertion order.
///
/// Untyped input converts through [`TryFrom<Value>`] or [`FromStr`] (JSON
/// text); anything other than an object of string values is rejected with
/// [`TrapError::InvalidSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
	fields: IndexMap<Box<str>, Box<str>, FxBuildHasher>,
}

impl FieldSpec {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a pair. A repeated field name keeps its position and takes the
	/// new definition.
	pub fn field(mut self, name: impl Into<Box<str>>, definition: impl Into<Box<str>>) -> Self {
		self.fields.insert(name.into(), definition.into());
		self
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(k, v)| (&**k, &**v))
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl<F, D> FromIterator<(F, D)> for FieldSpec
where
	F: Into<Box<str>>,
	D: Into<Box<str>>,
{
	fn from_iter<I: IntoIterator<Item = (F, D)>>(iter: I) -> Self {
		Self {
			fields: iter.into_iter().map(|(f, d)| (f.into(), d.into())).collect(),
		}
	}
}

impl TryFrom<Value> for FieldSpec {
	type Error = TrapError;

	fn try_from(value: Value) -> Result<Self> {
		let Value::Object(map) = value else {
			return Err(TrapError::InvalidSpec);
		};
		map.into_iter()
			.map(|(field, definition)| match definition {
				Value::String(definition) => Ok((field, definition)),
				_ => Err(TrapError::InvalidSpec),
			})
			.collect()
	}
}

impl FromStr for FieldSpec {
	type Err = TrapError;

	fn from_str(s: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(s).map_err(|_| TrapError::InvalidSpec)?;
		Self::try_from(value)
	}
}

/// Conversion accepted by [`super::Facade::add_fields`].
pub trait IntoFieldSpec {
	fn into_field_spec(self) -> Result<FieldSpec>;
}

impl IntoFieldSpec for FieldSpec {
	fn into_field_spec(self) -> Result<FieldSpec> {
		Ok(self)
	}
}

impl IntoFieldSpec for Value {
	fn into_field_spec(self) -> Result<FieldSpec> {
		FieldSpec::try_from(self)
	}
}

impl IntoFieldSpec for &str {
	fn into_field_spec(self) -> Result<FieldSpec> {
		self.parse()
	}
}

impl<F, D, const N: usize> IntoFieldSpec for [(F, D); N]
where
	F: Into<Box<str>>,
	D: Into<Box<str>>,
{
	fn into_field_spec(self) -> Result<FieldSpec> {
		Ok(self.into_iter().collect())
	}
}

impl<F, D> IntoFieldSpec for Vec<(F, D)>
where
	F: Into<Box<str>>,
	D: Into<Box<str>>,
{
	fn into_field_spec(self) -> Result<FieldSpec> {
		Ok(self.into_iter().collect())
	}
}
