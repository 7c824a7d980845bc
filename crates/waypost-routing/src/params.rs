//! Typed path parameters.
//!
//! Placeholders are compiled into [`ParamSpec`]s that know how to convert the
//! captured text. Matches expose the converted values as [`Params`], and
//! [`FromParam`] extracts them into concrete Rust types.

use crate::error::{Result, RouterError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Captured parameters, ordered by their position in the pattern.
pub type Params = IndexMap<String, ParamValue>;

/// The declared type of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
	/// `{i:name}`: digits only, converted to an integer
	Integer,
	/// `{name}` or `{s:name}`: any non-slash text
	Text,
}

impl ParamKind {
	/// Regex fragment capturing this kind of placeholder.
	pub(crate) fn fragment(self, nullable: bool) -> &'static str {
		match (self, nullable) {
			(Self::Integer, false) => "([0-9]+)",
			(Self::Integer, true) => "([0-9]*)",
			(Self::Text, false) => "([^/]+)",
			(Self::Text, true) => "([^/]*)",
		}
	}
}

/// A compiled placeholder: its name, type and capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
	name: String,
	kind: ParamKind,
	nullable: bool,
	index: usize,
}

impl ParamSpec {
	pub(crate) fn new(name: impl Into<String>, kind: ParamKind, nullable: bool, index: usize) -> Self {
		Self {
			name: name.into(),
			kind,
			nullable,
			index,
		}
	}

	/// The placeholder name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The declared type.
	pub fn kind(&self) -> ParamKind {
		self.kind
	}

	/// Whether the placeholder accepts an empty segment.
	pub fn is_nullable(&self) -> bool {
		self.nullable
	}

	/// 1-based capture group index.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Converts captured text into a typed value.
	///
	/// An empty capture of a nullable integer yields `None`; there is no
	/// integer to report.
	pub fn convert(&self, raw: &str) -> Result<Option<ParamValue>> {
		match self.kind {
			ParamKind::Text => Ok(Some(ParamValue::Text(raw.to_string()))),
			ParamKind::Integer if raw.is_empty() => Ok(None),
			ParamKind::Integer => raw
				.parse::<i64>()
				.map(|n| Some(ParamValue::Integer(n)))
				.map_err(|e| RouterError::ParamConversion {
					name: self.name.clone(),
					raw: raw.to_string(),
					reason: e.to_string(),
				}),
		}
	}
}

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Value of an integer placeholder
	Integer(i64),
	/// Value of a free-text placeholder
	Text(String),
}

impl ParamValue {
	/// Returns the integer, if this is an integer value.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Integer(n) => Some(*n),
			Self::Text(_) => None,
		}
	}

	/// Returns the text, if this is a text value.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			Self::Integer(_) => None,
		}
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Integer(n) => write!(f, "{}", n),
			Self::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<ParamValue> for serde_json::Value {
	fn from(value: ParamValue) -> Self {
		match value {
			ParamValue::Integer(n) => serde_json::Value::from(n),
			ParamValue::Text(s) => serde_json::Value::String(s),
		}
	}
}

/// Trait for extracting typed values from a matched parameter.
pub trait FromParam: Sized {
	/// Converts the named parameter value.
	///
	/// # Errors
	///
	/// Returns [`RouterError::ParamConversion`] when the value does not fit `Self`.
	fn from_param(name: &str, value: &ParamValue) -> Result<Self>;
}

fn conversion_error(name: &str, value: &ParamValue, reason: impl fmt::Display) -> RouterError {
	RouterError::ParamConversion {
		name: name.to_string(),
		raw: value.to_string(),
		reason: reason.to_string(),
	}
}

// Macro for implementing FromParam for integer types
macro_rules! impl_from_param_for_integer {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromParam for $ty {
				fn from_param(name: &str, value: &ParamValue) -> Result<Self> {
					match value {
						ParamValue::Integer(n) => {
							<$ty>::try_from(*n).map_err(|e| conversion_error(name, value, e))
						}
						ParamValue::Text(s) => s.parse::<$ty>().map_err(|e| conversion_error(name, value, e)),
					}
				}
			}
		)*
	};
}

impl_from_param_for_integer!(i32, i64, u32, u64, usize);

impl FromParam for String {
	fn from_param(_name: &str, value: &ParamValue) -> Result<Self> {
		Ok(value.to_string())
	}
}

impl FromParam for bool {
	fn from_param(name: &str, value: &ParamValue) -> Result<Self> {
		match value {
			ParamValue::Integer(0) => Ok(false),
			ParamValue::Integer(1) => Ok(true),
			ParamValue::Integer(_) => Err(conversion_error(name, value, "expected 0 or 1")),
			ParamValue::Text(s) => s.parse::<bool>().map_err(|e| conversion_error(name, value, e)),
		}
	}
}

impl FromParam for ParamValue {
	fn from_param(_name: &str, value: &ParamValue) -> Result<Self> {
		Ok(value.clone())
	}
}
