//! # Waypost Conf
//!
//! Settings for the waypost router.
//!
//! Settings are plain serde structures with defaults for every field, so a
//! TOML file only needs to mention what it changes:
//!
//! ```
//! use waypost_conf::RouterSettings;
//!
//! let settings = RouterSettings::from_toml_str(
//! 	r#"
//! [limits]
//! max_segments = 8
//!
//! [[routes]]
//! path = "/docs/{page}"
//! alias = "docs"
//! resource = "docs.html"
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(settings.limits.max_segments, 8);
//! assert_eq!(settings.limits.max_pattern_length, 1024);
//! assert_eq!(settings.routes.len(), 1);
//! ```

pub mod error;
pub mod settings;
pub mod table;

pub use error::SettingsError;
pub use settings::{
	ENV_LOG_FILTER, ENV_RESOURCE_ROOT, LogFormat, LoggingSettings, PatternLimits, ResourceSettings,
	RouterSettings,
};
pub use table::{RouteDecl, RouteTable};
