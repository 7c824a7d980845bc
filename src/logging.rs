//! Logger installation.
//!
//! waypost only emits `tracing` events; applications that do not install a
//! subscriber of their own can call [`init`] with the `[logging]` section of
//! their settings.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use waypost_conf::{LogFormat, LoggingSettings};

/// Errors raised while installing the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
	/// The filter directive string could not be parsed
	#[error("Invalid log filter \"{filter}\": {source}")]
	InvalidFilter {
		/// The rejected directives.
		filter: String,
		/// Parser error.
		#[source]
		source: tracing_subscriber::filter::ParseError,
	},

	/// Another global subscriber is already installed
	#[error("Failed to install the global subscriber: {0}")]
	AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Parses the filter directives of `settings`.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
	EnvFilter::try_new(&settings.filter).map_err(|source| LoggingError::InvalidFilter {
		filter: settings.filter.clone(),
		source,
	})
}

/// Installs a global `tracing` subscriber configured by `settings`.
///
/// # Errors
///
/// [`LoggingError::InvalidFilter`] for unparsable directives and
/// [`LoggingError::AlreadyInitialized`] when a global subscriber exists.
pub fn init(settings: &LoggingSettings) -> Result<(), LoggingError> {
	let registry = tracing_subscriber::registry().with(env_filter(settings)?);

	match settings.format {
		LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init()?,
		LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
		LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
	}

	tracing::debug!(filter = %settings.filter, format = ?settings.format, "Logger installed");
	Ok(())
}
