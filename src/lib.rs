//! # Waypost
//!
//! A layered URI router: typed placeholders, nested groups, specificity
//! ordering and reverse URL generation.
//!
//! This crate re-exports the routing engine from `waypost-routing` and the
//! settings from `waypost-conf`, and installs a `tracing` subscriber from
//! those settings.
//!
//! ## Feature Flags
//!
//! - `logging` (default) - [`logging::init`] backed by `tracing-subscriber`
//!
//! ## Quick Example
//!
//! ```
//! use waypost::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry
//! 	.add("", handler(|_| Some("home".into())), Some("home"))?
//! 	.add_group_with("/member", Handler::Empty, None, |member| {
//! 		member.add("/u-{i:id}", handler(|m| Some(m.param::<i64>("id").ok()?.into())), Some("member"))?;
//! 		Ok(())
//! 	})?;
//!
//! let dispatched = registry.dispatch("member/u-42")?.expect("route matched");
//! assert_eq!(dispatched.output(), Some(&serde_json::json!(42)));
//!
//! let mut args = Params::new();
//! args.insert("id".to_string(), 7.into());
//! assert_eq!(registry.url_for("member", &args)?, "/member/u-7");
//! # Ok::<(), RouterError>(())
//! ```
//!
//! Routes can also be declared in a settings file:
//!
//! ```
//! use waypost::prelude::*;
//!
//! let settings = RouterSettings::from_toml_str(r#"
//! [[routes]]
//! path = "/docs/{page}"
//! alias = "docs"
//! "#).unwrap();
//!
//! let registry = Registry::from_settings(&settings).unwrap();
//! let route_match = registry.resolve("docs/intro").unwrap().unwrap();
//! assert_eq!(route_match.param::<String>("page").unwrap(), "intro");
//! ```

pub use waypost_conf as conf;
pub use waypost_routing as routing;

pub use waypost_conf::{
	LogFormat, LoggingSettings, PatternLimits, ResourceSettings, RouteDecl, RouteTable,
	RouterSettings, SettingsError,
};
pub use waypost_routing::{
	CompiledPattern, DispatchContext, Dispatched, Duplicate, FileResourceRunner, Fingerprint, FromParam,
	GroupScope, Handler, HandlerFn, ParamKind, ParamSpec, ParamValue, Params, Registry,
	ResourceRunner, Result, Routable, Route, RouteInfo, RouteMatch, RouteSet, RouterError, Rule,
	RuleGroup, RuleKind, Terminal, handler, specificity,
};

#[cfg(feature = "logging")]
pub mod logging;

/// Commonly used types.
pub mod prelude {
	pub use crate::{
		Dispatched, FromParam, GroupScope, Handler, ParamValue, Params, Registry, ResourceRunner,
		RouteMatch, RouterError, RouterSettings, Rule, handler,
	};
}
