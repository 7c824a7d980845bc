//! Error types for route registration and dispatch.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the routing crate.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Error type for router operations.
///
/// [`RouterError::HandlerInvocation`] is the only error dispatch raises;
/// [`RouterError::ParamConversion`] comes from binding a rule directly or
/// from typed parameter extraction. Everything else is a configuration error
/// raised while routes are being registered. A path that matches no route is
/// not an error.
#[derive(Debug, Clone, Error)]
pub enum RouterError {
	/// The same placeholder name appears twice in one pattern
	#[error("Parameter name \"{name}\" is duplicated in route \"/{pattern}\"")]
	DuplicateParameter {
		/// The repeated placeholder name.
		name: String,
		/// The offending pattern.
		pattern: String,
	},

	/// An identical compiled pattern was already registered, or an alias
	/// was reused
	#[error("{0} already exists")]
	DuplicateRoute(Duplicate),

	/// No route carries the requested alias
	#[error("Router alias \"{0}\" does not exist")]
	UnknownAlias(String),

	/// A handler could not be run
	#[error("Router \"{path}\" error occurred when triggering action: {reason}")]
	HandlerInvocation {
		/// The dispatched path.
		path: String,
		/// What went wrong.
		reason: String,
	},

	/// A nested group was declared with a blank relative path
	#[error("Router rule cannot be empty (inside group \"{group}\")")]
	EmptyPattern {
		/// Rule of the enclosing group.
		group: String,
	},

	/// Pattern longer than the configured limit
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	PatternTooLong {
		/// Length of the rejected pattern.
		length: usize,
		/// Configured maximum.
		max: usize,
	},

	/// Pattern with more segments than the configured limit
	#[error("Pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Segment count of the rejected pattern.
		count: usize,
		/// Configured maximum.
		max: usize,
	},

	/// The compiled expression was rejected by the regex engine
	#[error("Failed to compile pattern \"{pattern}\": {source}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Regex engine error.
		#[source]
		source: regex::Error,
	},

	/// A captured value could not be converted to its declared type
	#[error("Failed to convert parameter \"{name}\" from '{raw}': {reason}")]
	ParamConversion {
		/// Parameter name.
		name: String,
		/// Raw captured text.
		raw: String,
		/// Conversion failure.
		reason: String,
	},

	/// URL generation found no value for a required placeholder
	#[error("Missing parameter \"{name}\" for route \"/{pattern}\"")]
	MissingParameter {
		/// Placeholder name.
		name: String,
		/// Pattern being reversed.
		pattern: String,
	},
}

/// What a [`RouterError::DuplicateRoute`] clashed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Duplicate {
	/// A rule with the same compiled pattern, shown with its leading slash
	Rule(String),
	/// An alias already bound to another route
	Alias(String),
}

impl fmt::Display for Duplicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Rule(rule) => write!(f, "Router \"{}\"", rule),
			Self::Alias(alias) => write!(f, "Router alias \"{}\"", alias),
		}
	}
}

impl RouterError {
	/// Whether this error reports a name or pattern declared twice.
	///
	/// A placeholder name repeated within one pattern counts as well.
	pub fn is_duplicate(&self) -> bool {
		matches!(self, Self::DuplicateRoute(_) | Self::DuplicateParameter { .. })
	}
}
