//! Router settings.

use crate::error::SettingsError;
use crate::table::RouteTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`LoggingSettings::filter`].
pub const ENV_LOG_FILTER: &str = "WAYPOST_LOG";

/// Environment variable overriding [`ResourceSettings::root`].
pub const ENV_RESOURCE_ROOT: &str = "WAYPOST_RESOURCE_ROOT";

/// Main settings structure for a waypost router
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Limits applied when compiling route patterns
	pub limits: PatternLimits,

	/// Where resource handlers are looked up
	pub resources: ResourceSettings,

	/// Logger configuration used by the facade's `logging::init`
	pub logging: LoggingSettings,

	/// Declarative routes registered by `Registry::load_table`
	pub routes: RouteTable,
}

/// Bounds on route patterns accepted by the compiler.
///
/// Patterns are compiled into regular expressions, so both the source length
/// and the segment count are capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternLimits {
	/// Maximum pattern length in bytes
	pub max_pattern_length: usize,

	/// Maximum number of `/`-separated segments
	pub max_segments: usize,
}

impl Default for PatternLimits {
	fn default() -> Self {
		Self {
			max_pattern_length: 1024,
			max_segments: 32,
		}
	}
}

/// Resource handler lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
	/// Directory relative resource paths are resolved against.
	/// `None` resolves them against the process working directory.
	pub root: Option<PathBuf>,
}

impl ResourceSettings {
	/// Resolves a resource identifier against the configured root.
	pub fn resolve(&self, resource: &Path) -> PathBuf {
		match &self.root {
			Some(root) if resource.is_relative() => root.join(resource),
			_ => resource.to_path_buf(),
		}
	}
}

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	/// Multi-line, human oriented output
	Pretty,
	/// Single-line output
	#[default]
	Compact,
	/// Newline-delimited JSON
	Json,
}

/// Logger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// `EnvFilter` directive string, e.g. `"waypost_routing=debug"`
	pub filter: String,

	/// Output format
	pub format: LogFormat,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			filter: "waypost=info,waypost_routing=info".to_string(),
			format: LogFormat::default(),
		}
	}
}

impl RouterSettings {
	/// Parses settings from a TOML document and validates them.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: RouterSettings = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads, parses and validates a TOML settings file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let settings = Self::from_toml_str(&source)?;
		tracing::debug!(
			path = %path.display(),
			routes = settings.routes.len(),
			"Loaded router settings"
		);
		Ok(settings)
	}

	/// Applies [`ENV_LOG_FILTER`] and [`ENV_RESOURCE_ROOT`] from the process environment.
	pub fn with_env_overrides(self) -> Self {
		self.with_overrides_from(|key| std::env::var(key).ok())
	}

	/// Applies overrides from an arbitrary variable lookup.
	pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|v| !v.trim().is_empty()) {
			self.logging.filter = filter;
		}
		if let Some(root) = lookup(ENV_RESOURCE_ROOT).filter(|v| !v.trim().is_empty()) {
			self.resources.root = Some(PathBuf::from(root));
		}
		self
	}

	/// Semantic checks serde cannot express.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.limits.max_pattern_length == 0 {
			return Err(SettingsError::Invalid {
				field: "limits.max_pattern_length",
				reason: "must be greater than zero".to_string(),
			});
		}
		if self.limits.max_segments == 0 {
			return Err(SettingsError::Invalid {
				field: "limits.max_segments",
				reason: "must be greater than zero".to_string(),
			});
		}
		self.routes.validate()
	}
}
