//! # waypost-routing
//!
//! Rule compiler, specificity ordering and dispatch engine.
//!
//! Patterns such as `/member/u-{i:id}` compile into anchored regular
//! expressions with typed parameters. Routes registered on a [`Registry`]
//! are kept sorted by specificity, so the most specific route always wins
//! regardless of registration order. Groups share a path prefix, run their
//! own handlers on entry and delegate to their children.
//!
//! ## Example
//!
//! ```
//! use waypost_routing::{handler, Handler, Params, ParamValue, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//! 	.add_group_with("/api", Handler::Empty, None, |api| {
//! 		api.add_group_with("/member", Handler::Empty, None, |member| {
//! 			member.add("/u/{i:id}", handler(|_| Some("grouped".into())), Some("member"))?;
//! 			Ok(())
//! 		})?
//! 		.add("/member/u-{i:id}", handler(|_| Some("flat".into())), None)?;
//! 		Ok(())
//! 	})
//! 	.unwrap();
//!
//! let dispatched = registry.dispatch("api/member/u/42").unwrap().unwrap();
//! assert_eq!(dispatched.output(), Some(&serde_json::json!("grouped")));
//! assert_eq!(dispatched.route_match().get("id"), Some(&ParamValue::Integer(42)));
//!
//! let mut args = Params::new();
//! args.insert("id".to_string(), ParamValue::Integer(7));
//! assert_eq!(registry.url_for("member", &args).unwrap(), "/api/member/u/7");
//! ```

pub mod error;
pub mod group;
pub mod handler;
pub mod params;
pub mod pattern;
pub mod registry;
mod reverse;
pub mod route;
pub mod rule;
mod table;

pub use error::{Duplicate, Result, RouterError};
pub use group::{GroupScope, RuleGroup};
pub use handler::{FileResourceRunner, Handler, HandlerFn, ResourceRunner, handler};
pub use params::{FromParam, ParamKind, ParamSpec, ParamValue, Params};
pub use pattern::{CompiledPattern, Fingerprint, specificity};
pub use registry::{Registry, RouteInfo};
pub use route::{DispatchContext, Dispatched, Routable, Route, RouteSet, Terminal};
pub use rule::{RouteMatch, Rule, RuleKind};
