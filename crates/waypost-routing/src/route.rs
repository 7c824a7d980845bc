//! Route nodes and sibling ordering.

use crate::error::Result;
use crate::group::RuleGroup;
use crate::handler::{Handler, ResourceRunner};
use crate::pattern::Fingerprint;
use crate::rule::{RouteMatch, Rule, RuleKind};
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared behaviour of terminal routes and groups.
pub trait Routable {
	/// The compiled rule of this node.
	fn rule(&self) -> &Arc<Rule>;

	/// Whether the node accepts `path`, integer captures included.
	fn is_match(&self, path: &str) -> bool {
		self.rule().accepts(path)
	}

	/// Rank among siblings.
	fn specificity(&self) -> i64 {
		self.rule().specificity()
	}

	/// Runs the node's handlers for `path`.
	///
	/// Callers check [`Routable::is_match`] first.
	fn dispatch(&self, path: &str, ctx: &DispatchContext<'_>) -> Result<Option<Dispatched>>;

	/// Finds the terminal match for `path` without running any handler.
	fn resolve(&self, path: &str) -> Result<Option<RouteMatch>>;
}

/// State shared by one dispatch walk.
pub struct DispatchContext<'a> {
	runner: &'a dyn ResourceRunner,
	current: &'a Mutex<Option<RouteMatch>>,
}

impl<'a> DispatchContext<'a> {
	pub(crate) fn new(
		runner: &'a dyn ResourceRunner,
		current: &'a Mutex<Option<RouteMatch>>,
	) -> Self {
		Self { runner, current }
	}

	pub(crate) fn runner(&self) -> &dyn ResourceRunner {
		self.runner
	}

	pub(crate) fn set_current(&self, route_match: RouteMatch) {
		*self.current.lock() = Some(route_match);
	}
}

/// Result of a dispatch that reached a terminal route.
#[derive(Debug, Clone)]
pub struct Dispatched {
	route_match: RouteMatch,
	output: Option<Value>,
}

impl Dispatched {
	/// The terminal match.
	pub fn route_match(&self) -> &RouteMatch {
		&self.route_match
	}

	/// What the terminal handler produced. `None` for an empty handler.
	pub fn output(&self) -> Option<&Value> {
		self.output.as_ref()
	}

	/// Splits into match and output.
	pub fn into_parts(self) -> (RouteMatch, Option<Value>) {
		(self.route_match, self.output)
	}
}

/// A route with exactly one handler that matches whole paths.
#[derive(Debug, Clone)]
pub struct Terminal {
	rule: Arc<Rule>,
	handler: Handler,
}

impl Terminal {
	pub(crate) fn new(rule: Arc<Rule>, handler: Handler) -> Self {
		Self { rule, handler }
	}

	/// The handler run on dispatch.
	pub fn handler(&self) -> &Handler {
		&self.handler
	}
}

impl Routable for Terminal {
	fn rule(&self) -> &Arc<Rule> {
		&self.rule
	}

	fn dispatch(&self, path: &str, ctx: &DispatchContext<'_>) -> Result<Option<Dispatched>> {
		let Some(route_match) = self.rule.bind(path)? else {
			return Ok(None);
		};

		tracing::debug!(
			path = %path,
			rule = %self.rule,
			params = route_match.params().len(),
			"Matched route"
		);

		ctx.set_current(route_match.clone());
		let output = self
			.handler
			.invoke(&route_match, ctx.runner())
			.inspect_err(|e| tracing::warn!(rule = %self.rule, error = %e, "Handler failed"))?;

		Ok(Some(Dispatched {
			route_match,
			output,
		}))
	}

	fn resolve(&self, path: &str) -> Result<Option<RouteMatch>> {
		self.rule.bind(path)
	}
}

/// A node in a route set.
#[derive(Debug, Clone)]
pub enum Route {
	/// Whole-path route.
	Terminal(Terminal),
	/// Prefix route with children.
	Group(RuleGroup),
}

impl Route {
	/// Returns the group, if this node is one.
	pub fn as_group(&self) -> Option<&RuleGroup> {
		match self {
			Self::Group(group) => Some(group),
			Self::Terminal(_) => None,
		}
	}

	pub(crate) fn as_group_mut(&mut self) -> Option<&mut RuleGroup> {
		match self {
			Self::Group(group) => Some(group),
			Self::Terminal(_) => None,
		}
	}

	/// Terminal or group.
	pub fn kind(&self) -> RuleKind {
		self.rule().kind()
	}
}

impl Routable for Route {
	fn rule(&self) -> &Arc<Rule> {
		match self {
			Self::Terminal(terminal) => terminal.rule(),
			Self::Group(group) => group.rule(),
		}
	}

	fn dispatch(&self, path: &str, ctx: &DispatchContext<'_>) -> Result<Option<Dispatched>> {
		match self {
			Self::Terminal(terminal) => terminal.dispatch(path, ctx),
			Self::Group(group) => group.dispatch(path, ctx),
		}
	}

	fn resolve(&self, path: &str) -> Result<Option<RouteMatch>> {
		match self {
			Self::Terminal(terminal) => terminal.resolve(path),
			Self::Group(group) => group.resolve(path),
		}
	}
}

/// Siblings ordered by descending specificity.
///
/// Equal specificity puts terminals before groups, then keeps registration
/// order. Every node is also indexed by fingerprint so an identical group
/// declaration finds the existing node.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
	routes: Vec<Route>,
	index: HashMap<Fingerprint, usize>,
}

impl RouteSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of direct children.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the set is empty.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Nodes in dispatch order.
	pub fn iter(&self) -> std::slice::Iter<'_, Route> {
		self.routes.iter()
	}

	/// Position of the node with this fingerprint.
	pub fn position(&self, fingerprint: &Fingerprint) -> Option<usize> {
		self.index.get(fingerprint).copied()
	}

	pub(crate) fn get_mut(&mut self, position: usize) -> Option<&mut Route> {
		self.routes.get_mut(position)
	}

	/// Inserts a node and re-sorts; returns its new position.
	pub(crate) fn insert(&mut self, route: Route) -> usize {
		let fingerprint = route.rule().fingerprint();
		self.routes.push(route);
		self.sort();
		// The index was rebuilt by sort, so the entry exists
		self.index
			.get(&fingerprint)
			.copied()
			.unwrap_or(self.routes.len() - 1)
	}

	fn sort(&mut self) {
		self.routes
			.sort_by_key(|route| (Reverse(route.specificity()), route.kind().tie_rank()));
		self.index = self
			.routes
			.iter()
			.enumerate()
			.map(|(position, route)| (route.rule().fingerprint(), position))
			.collect();
	}

	/// Dispatches to the first node matching `path`.
	///
	/// Later siblings are never tried, even when the first match produces
	/// no result.
	pub(crate) fn dispatch(&self, path: &str, ctx: &DispatchContext<'_>) -> Result<Option<Dispatched>> {
		match self.first_match(path) {
			Some(route) => route.dispatch(path, ctx),
			None => Ok(None),
		}
	}

	pub(crate) fn resolve(&self, path: &str) -> Result<Option<RouteMatch>> {
		match self.first_match(path) {
			Some(route) => route.resolve(path),
			None => Ok(None),
		}
	}

	fn first_match(&self, path: &str) -> Option<&Route> {
		self.routes.iter().find(|route| {
			let matched = route.is_match(path);
			tracing::trace!(
				path = %path,
				candidate = %route.rule(),
				specificity = route.specificity(),
				matched,
				"Trying route"
			);
			matched
		})
	}
}

impl<'a> IntoIterator for &'a RouteSet {
	type Item = &'a Route;
	type IntoIter = std::slice::Iter<'a, Route>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
