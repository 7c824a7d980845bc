//! Settings error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating [`RouterSettings`](crate::RouterSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
	/// The settings file could not be read
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		/// Path that was being read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The settings document is not valid TOML for the settings schema
	#[error("Failed to parse settings: {0}")]
	Parse(#[from] toml::de::Error),

	/// A setting holds a value the router cannot work with
	#[error("Invalid setting `{field}`: {reason}")]
	Invalid {
		/// Dotted name of the offending field.
		field: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_invalid_display() {
		let err = SettingsError::Invalid {
			field: "limits.max_segments",
			reason: "must be greater than zero".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Invalid setting `limits.max_segments`: must be greater than zero"
		);
	}

	#[rstest]
	fn test_io_display_mentions_path() {
		let err = SettingsError::Io {
			path: PathBuf::from("/nowhere/waypost.toml"),
			source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
		};
		assert!(err.to_string().contains("/nowhere/waypost.toml"));
	}
}
