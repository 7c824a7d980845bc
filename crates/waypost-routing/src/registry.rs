//! The route registry.
//!
//! [`Registry`] owns the root route set, the alias table and the
//! fingerprints of every registered terminal route. Registration takes
//! `&mut self`; dispatch only needs `&self`.

use crate::error::{Duplicate, Result, RouterError};
use crate::group::{GroupScope, insert_terminal, upsert_group};
use crate::handler::{FileResourceRunner, Handler, ResourceRunner};
use crate::params::Params;
use crate::pattern::{self, Fingerprint};
use crate::route::{DispatchContext, Dispatched, Routable, Route, RouteSet};
use crate::rule::{RouteMatch, Rule, RuleKind};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use waypost_conf::{PatternLimits, RouterSettings};

/// Registry-wide bookkeeping shared by every scope.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ledger {
	aliases: HashMap<String, Arc<Rule>>,
	fingerprints: HashSet<Fingerprint>,
}

impl Ledger {
	pub(crate) fn check_route(&self, rule: &Rule) -> Result<()> {
		if self.fingerprints.contains(&rule.fingerprint()) {
			return Err(RouterError::DuplicateRoute(Duplicate::Rule(rule.to_string())));
		}
		Ok(())
	}

	pub(crate) fn check_alias(&self, alias: Option<&str>) -> Result<()> {
		match alias {
			Some(alias) if self.aliases.contains_key(alias) => {
				Err(RouterError::DuplicateRoute(Duplicate::Alias(alias.to_string())))
			}
			_ => Ok(()),
		}
	}

	pub(crate) fn commit_route(&mut self, rule: &Rule) {
		self.fingerprints.insert(rule.fingerprint());
	}

	pub(crate) fn commit_alias(&mut self, alias: &str, rule: Arc<Rule>) {
		self.aliases.insert(alias.to_string(), rule);
	}

	pub(crate) fn resolve_alias(&self, alias: &str) -> Result<Arc<Rule>> {
		self.aliases
			.get(alias)
			.cloned()
			.ok_or_else(|| RouterError::UnknownAlias(alias.to_string()))
	}

	fn aliases_by_fingerprint(&self) -> HashMap<Fingerprint, Vec<String>> {
		let mut by_fingerprint: HashMap<Fingerprint, Vec<String>> = HashMap::new();
		for (alias, rule) in &self.aliases {
			by_fingerprint
				.entry(rule.fingerprint())
				.or_default()
				.push(alias.clone());
		}
		for aliases in by_fingerprint.values_mut() {
			aliases.sort();
		}
		by_fingerprint
	}
}

/// One registered route, as listed by [`Registry::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
	/// Pattern with its leading slash.
	pub path: String,
	/// Terminal or group.
	pub kind: RuleKind,
	/// Rank among siblings.
	pub specificity: i64,
	/// Aliases bound to the route, sorted.
	pub aliases: Vec<String>,
	/// Nesting depth; root routes are at depth 0.
	pub depth: usize,
}

/// The top-level route container and dispatcher.
///
/// # Examples
///
/// ```
/// use waypost_routing::{handler, Registry};
///
/// let mut registry = Registry::new();
/// registry
/// 	.add("", handler(|_| Some("home".into())), Some("home"))
/// 	.unwrap()
/// 	.add("/profile", handler(|_| Some("profile".into())), None)
/// 	.unwrap();
///
/// let dispatched = registry.dispatch("").unwrap().unwrap();
/// assert_eq!(dispatched.output(), Some(&serde_json::json!("home")));
/// assert!(registry.dispatch("profile/1").unwrap().is_none());
/// ```
pub struct Registry {
	roots: RouteSet,
	ledger: Ledger,
	current: Mutex<Option<RouteMatch>>,
	limits: PatternLimits,
	runner: Arc<dyn ResourceRunner>,
}

impl Registry {
	/// Creates an empty registry with default settings.
	pub fn new() -> Self {
		Self::with_settings(&RouterSettings::default())
	}

	/// Creates an empty registry using the limits and resource root from
	/// `settings`. Declared routes are not loaded; see [`Registry::load_table`].
	pub fn with_settings(settings: &RouterSettings) -> Self {
		Self {
			roots: RouteSet::new(),
			ledger: Ledger::default(),
			current: Mutex::new(None),
			limits: settings.limits,
			runner: Arc::new(FileResourceRunner::new(settings.resources.clone())),
		}
	}

	/// Replaces the pattern limits applied to later registrations.
	pub fn with_limits(mut self, limits: PatternLimits) -> Self {
		self.limits = limits;
		self
	}

	/// Replaces the runner used for resource handlers.
	pub fn with_resource_runner<R>(mut self, runner: R) -> Self
	where
		R: ResourceRunner + 'static,
	{
		self.runner = Arc::new(runner);
		self
	}

	/// Limits applied when compiling patterns.
	pub fn limits(&self) -> &PatternLimits {
		&self.limits
	}

	/// Registers a terminal route.
	///
	/// # Errors
	///
	/// - [`RouterError::DuplicateRoute`] if an identical pattern is registered
	///   or `alias` is taken
	/// - any compile error of the pattern
	///
	/// A failed registration leaves the registry unchanged.
	pub fn add(
		&mut self,
		path: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
	) -> Result<&mut Self> {
		insert_terminal(
			&mut self.roots,
			&mut self.ledger,
			&self.limits,
			path,
			handler.into(),
			alias,
		)?;
		Ok(self)
	}

	/// Registers a top-level group without children.
	pub fn add_group(
		&mut self,
		path: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
	) -> Result<&mut Self> {
		self.add_group_with(path, handler, alias, |_| Ok(()))
	}

	/// Registers a top-level group and declares its children in `configure`.
	///
	/// Declaring an identical group again reuses the existing one and
	/// appends `handler` to its handler list.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_routing::{handler, Handler, Registry};
	///
	/// let mut registry = Registry::new();
	/// registry
	/// 	.add_group_with("/api", Handler::Empty, Some("api"), |api| {
	/// 		api.add("/member/u-{i:id}", handler(|m| m.get("id").cloned().map(Into::into)), None)?;
	/// 		Ok(())
	/// 	})
	/// 	.unwrap();
	///
	/// let dispatched = registry.dispatch("api/member/u-42").unwrap().unwrap();
	/// assert_eq!(dispatched.output(), Some(&serde_json::json!(42)));
	/// ```
	pub fn add_group_with<F>(
		&mut self,
		path: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
		configure: F,
	) -> Result<&mut Self>
	where
		F: FnOnce(&mut GroupScope<'_>) -> Result<()>,
	{
		let position = upsert_group(
			&mut self.roots,
			&mut self.ledger,
			&self.limits,
			path,
			handler.into(),
			alias,
		)?;

		if let Some(group) = self.roots.get_mut(position).and_then(Route::as_group_mut) {
			configure(&mut GroupScope::new(group, &mut self.ledger, self.limits))?;
		}
		Ok(self)
	}

	/// Compiles a terminal rule under this registry's limits without
	/// registering it.
	pub fn build(&self, path: &str) -> Result<Rule> {
		Rule::compile(path, RuleKind::Terminal, &self.limits)
	}

	/// Fails with [`RouterError::DuplicateRoute`] if a terminal route with the
	/// same compiled pattern is already registered.
	pub fn validate_unique(&self, rule: &Rule) -> Result<()> {
		self.ledger.check_route(rule)
	}

	/// Looks up the rule bound to `alias`.
	pub fn resolve_alias(&self, alias: &str) -> Result<Arc<Rule>> {
		self.ledger.resolve_alias(alias)
	}

	/// Builds a URL for the route bound to `alias` from `args` alone.
	///
	/// # Errors
	///
	/// [`RouterError::UnknownAlias`], or [`RouterError::MissingParameter`]
	/// when `args` lacks a required placeholder.
	pub fn url_for(&self, alias: &str, args: &Params) -> Result<String> {
		self.url_for_with(alias, args, None)
	}

	/// Builds a URL for the route bound to `alias`, back-filling
	/// placeholders missing from `args` with the parameters of `reference`.
	///
	/// Passing [`Registry::current`] lets a page link to siblings sharing
	/// its parameters.
	pub fn url_for_with(
		&self,
		alias: &str,
		args: &Params,
		reference: Option<&RouteMatch>,
	) -> Result<String> {
		self.resolve_alias(alias)?.url(args, reference)
	}

	/// Dispatches `path` to the best matching route.
	///
	/// Leading slashes are ignored. Returns `Ok(None)` when no terminal
	/// route matches; group handlers on the way may still have run.
	///
	/// # Errors
	///
	/// Whatever a handler on the matched chain raises. A route whose integer
	/// capture overflows is skipped like any other non-matching route.
	pub fn dispatch(&self, path: &str) -> Result<Option<Dispatched>> {
		let path = pattern::normalize(path);
		let _span = tracing::debug_span!("dispatch", path = %path).entered();

		let ctx = DispatchContext::new(self.runner.as_ref(), &self.current);
		let dispatched = self.roots.dispatch(path, &ctx)?;
		if dispatched.is_none() {
			tracing::debug!(path = %path, "No route matched");
		}
		Ok(dispatched)
	}

	/// Finds the terminal match for `path` without running handlers or
	/// touching [`Registry::current`].
	pub fn resolve(&self, path: &str) -> Result<Option<RouteMatch>> {
		self.roots.resolve(pattern::normalize(path))
	}

	/// The last terminal match whose handler was invoked.
	pub fn current(&self) -> Option<RouteMatch> {
		self.current.lock().clone()
	}

	/// Every registered route, depth first in dispatch order.
	pub fn routes(&self) -> Vec<RouteInfo> {
		fn walk(
			set: &RouteSet,
			depth: usize,
			aliases: &HashMap<Fingerprint, Vec<String>>,
			out: &mut Vec<RouteInfo>,
		) {
			for route in set {
				let rule = route.rule();
				out.push(RouteInfo {
					path: rule.to_string(),
					kind: rule.kind(),
					specificity: rule.specificity(),
					aliases: aliases.get(&rule.fingerprint()).cloned().unwrap_or_default(),
					depth,
				});
				if let Some(group) = route.as_group() {
					walk(group.children(), depth + 1, aliases, out);
				}
			}
		}

		let mut out = Vec::new();
		walk(&self.roots, 0, &self.ledger.aliases_by_fingerprint(), &mut out);
		out
	}

	/// Root routes in dispatch order.
	pub fn roots(&self) -> &RouteSet {
		&self.roots
	}

	/// Number of registered routes, nested ones included.
	pub fn len(&self) -> usize {
		fn count(set: &RouteSet) -> usize {
			set.iter()
				.map(|route| 1 + route.as_group().map_or(0, |g| count(g.children())))
				.sum()
		}
		count(&self.roots)
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("roots", &self.roots.len())
			.field("aliases", &self.ledger.aliases.len())
			.field("limits", &self.limits)
			.finish_non_exhaustive()
	}
}
