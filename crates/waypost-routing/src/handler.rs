//! Route handlers.
//!
//! A route carries one of three kinds of handler: nothing, a callable, or a
//! resource identifier. Resources are executed by a [`ResourceRunner`]
//! owned by the registry, so applications decide what "running" a resource
//! means; the default [`FileResourceRunner`] reads the file.

use crate::error::{Result, RouterError};
use crate::rule::RouteMatch;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use waypost_conf::ResourceSettings;

/// Signature of a callable handler.
///
/// Returning `None` signals success without output; dispatch reports it as
/// `true`.
pub type HandlerFn = dyn Fn(&RouteMatch) -> Option<Value> + Send + Sync;

/// What runs when a route is dispatched.
#[derive(Clone, Default)]
pub enum Handler {
	/// No-op; dispatch of the route produces no output.
	#[default]
	Empty,
	/// A closure receiving the match.
	Callable(Arc<HandlerFn>),
	/// A resource executed through the registry's [`ResourceRunner`].
	Resource(PathBuf),
}

impl Handler {
	/// Wraps a closure.
	pub fn from_fn<F>(f: F) -> Self
	where
		F: Fn(&RouteMatch) -> Option<Value> + Send + Sync + 'static,
	{
		Self::Callable(Arc::new(f))
	}

	/// Refers to a resource.
	pub fn resource(path: impl Into<PathBuf>) -> Self {
		Self::Resource(path.into())
	}

	/// Whether this is [`Handler::Empty`].
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	/// Runs the handler against a match.
	///
	/// A callable returning `None` yields `Some(Value::Bool(true))`.
	pub(crate) fn invoke(
		&self,
		route_match: &RouteMatch,
		runner: &dyn ResourceRunner,
	) -> Result<Option<Value>> {
		match self {
			Self::Empty => Ok(None),
			Self::Callable(f) => Ok(Some(f(route_match).unwrap_or(Value::Bool(true)))),
			Self::Resource(resource) => runner.run(resource, route_match),
		}
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Callable(_) => f.write_str("Callable(..)"),
			Self::Resource(path) => f.debug_tuple("Resource").field(path).finish(),
		}
	}
}

impl From<PathBuf> for Handler {
	fn from(path: PathBuf) -> Self {
		Self::Resource(path)
	}
}

impl From<&Path> for Handler {
	fn from(path: &Path) -> Self {
		Self::Resource(path.to_path_buf())
	}
}

impl From<Option<Handler>> for Handler {
	fn from(handler: Option<Handler>) -> Self {
		handler.unwrap_or_default()
	}
}

/// Helper function to create a callable handler.
///
/// # Examples
///
/// ```
/// use waypost_routing::{handler, Registry};
///
/// let mut registry = Registry::new();
/// registry
/// 	.add("/profile", handler(|_| Some("profile".into())), None)
/// 	.unwrap();
///
/// let dispatched = registry.dispatch("profile").unwrap().unwrap();
/// assert_eq!(dispatched.output(), Some(&serde_json::json!("profile")));
/// ```
pub fn handler<F>(f: F) -> Handler
where
	F: Fn(&RouteMatch) -> Option<Value> + Send + Sync + 'static,
{
	Handler::from_fn(f)
}

/// Executes resource handlers.
pub trait ResourceRunner: Send + Sync {
	/// Runs `resource` for a dispatched match.
	///
	/// # Errors
	///
	/// Returns [`RouterError::HandlerInvocation`] when the resource cannot
	/// be executed.
	fn run(&self, resource: &Path, route_match: &RouteMatch) -> Result<Option<Value>>;
}

/// Reads resources from disk and returns their contents as a string.
#[derive(Debug, Clone, Default)]
pub struct FileResourceRunner {
	resources: ResourceSettings,
}

impl FileResourceRunner {
	/// Creates a runner resolving relative paths through `resources`.
	pub fn new(resources: ResourceSettings) -> Self {
		Self { resources }
	}

	/// Where relative resource paths are resolved.
	pub fn settings(&self) -> &ResourceSettings {
		&self.resources
	}
}

impl ResourceRunner for FileResourceRunner {
	fn run(&self, resource: &Path, route_match: &RouteMatch) -> Result<Option<Value>> {
		let path = self.resources.resolve(resource);
		if !path.is_file() {
			return Err(RouterError::HandlerInvocation {
				path: route_match.path().to_string(),
				reason: format!("resource {} does not exist", path.display()),
			});
		}

		let contents =
			std::fs::read_to_string(&path).map_err(|e| RouterError::HandlerInvocation {
				path: route_match.path().to_string(),
				reason: format!("resource {} could not be read: {}", path.display(), e),
			})?;
		Ok(Some(Value::String(contents)))
	}
}
