//! Rule groups.
//!
//! A group matches a path prefix, runs all of its handlers, then hands the
//! full path to its children. Children carry absolute patterns built from
//! the group's own path, so no remainder is threaded through.

use crate::error::{Duplicate, Result, RouterError};
use crate::handler::Handler;
use crate::registry::Ledger;
use crate::route::{DispatchContext, Dispatched, Routable, Route, RouteSet, Terminal};
use crate::rule::{RouteMatch, Rule, RuleKind};
use std::sync::Arc;
use waypost_conf::PatternLimits;

/// A prefix route owning an ordered set of children.
#[derive(Debug, Clone)]
pub struct RuleGroup {
	rule: Arc<Rule>,
	handlers: Vec<Handler>,
	children: RouteSet,
}

impl RuleGroup {
	pub(crate) fn new(rule: Arc<Rule>, handler: Handler) -> Self {
		let mut group = Self {
			rule,
			handlers: Vec::new(),
			children: RouteSet::new(),
		};
		group.push_handler(handler);
		group
	}

	/// Handlers fired on entry, in registration order.
	pub fn handlers(&self) -> &[Handler] {
		&self.handlers
	}

	/// Children in dispatch order.
	pub fn children(&self) -> &RouteSet {
		&self.children
	}

	pub(crate) fn push_handler(&mut self, handler: Handler) {
		if !handler.is_empty() {
			self.handlers.push(handler);
		}
	}

	/// Absolute pattern of a child declared at `relative`.
	///
	/// An empty relative path is the group's own path. Otherwise the
	/// relative path, stripped of surrounding slashes, is joined to the
	/// group path with exactly one `/`.
	pub fn child_path(&self, relative: &str) -> String {
		let base = self.rule.path();
		if relative.is_empty() {
			return base.to_string();
		}

		let relative = relative.trim_matches('/');
		if base.is_empty() || base.ends_with('/') {
			format!("{}{}", base, relative)
		} else {
			format!("{}/{}", base, relative)
		}
	}
}

impl Routable for RuleGroup {
	fn rule(&self) -> &Arc<Rule> {
		&self.rule
	}

	fn dispatch(&self, path: &str, ctx: &DispatchContext<'_>) -> Result<Option<Dispatched>> {
		let Some(group_match) = self.rule.bind(path)? else {
			return Ok(None);
		};

		tracing::debug!(
			path = %path,
			group = %self.rule,
			handlers = self.handlers.len(),
			"Entering group"
		);

		for handler in &self.handlers {
			handler
				.invoke(&group_match, ctx.runner())
				.inspect_err(|e| tracing::warn!(group = %self.rule, error = %e, "Group handler failed"))?;
		}

		self.children.dispatch(path, ctx)
	}

	fn resolve(&self, path: &str) -> Result<Option<RouteMatch>> {
		self.children.resolve(path)
	}
}

/// Compiles and registers a terminal route in `set`.
///
/// Nothing is modified unless both the fingerprint and the alias are free.
pub(crate) fn insert_terminal(
	set: &mut RouteSet,
	ledger: &mut Ledger,
	limits: &PatternLimits,
	path: &str,
	handler: Handler,
	alias: Option<&str>,
) -> Result<Arc<Rule>> {
	let rule = Arc::new(Rule::compile(path, RuleKind::Terminal, limits)?);
	ledger.check_route(&rule)?;
	ledger.check_alias(alias)?;

	ledger.commit_route(&rule);
	if let Some(alias) = alias {
		ledger.commit_alias(alias, Arc::clone(&rule));
	}
	set.insert(Route::Terminal(Terminal::new(Arc::clone(&rule), handler)));

	tracing::debug!(
		rule = %rule,
		specificity = rule.specificity(),
		kind = %RuleKind::Terminal,
		alias = alias.unwrap_or_default(),
		"Registered route"
	);
	Ok(rule)
}

/// Registers a group in `set`, or finds the identical group declared
/// earlier and appends `handler` to it. Returns the group's position.
pub(crate) fn upsert_group(
	set: &mut RouteSet,
	ledger: &mut Ledger,
	limits: &PatternLimits,
	path: &str,
	handler: Handler,
	alias: Option<&str>,
) -> Result<usize> {
	let rule = Rule::compile(path, RuleKind::Group, limits)?;
	ledger.check_alias(alias)?;

	let (position, shared) = match set.position(&rule.fingerprint()) {
		Some(position) => {
			let Some(group) = set.get_mut(position).and_then(Route::as_group_mut) else {
				return Err(RouterError::DuplicateRoute(Duplicate::Rule(rule.to_string())));
			};
			group.push_handler(handler);
			tracing::debug!(group = %group.rule, handlers = group.handlers.len(), "Reusing group");
			(position, Arc::clone(&group.rule))
		}
		None => {
			let rule = Arc::new(rule);
			let position = set.insert(Route::Group(RuleGroup::new(Arc::clone(&rule), handler)));
			tracing::debug!(
				rule = %rule,
				specificity = rule.specificity(),
				kind = %RuleKind::Group,
				alias = alias.unwrap_or_default(),
				"Registered route"
			);
			(position, rule)
		}
	};

	if let Some(alias) = alias {
		ledger.commit_alias(alias, shared);
	}
	Ok(position)
}

/// Registration handle for the children of one group.
///
/// Obtained inside the configure callback of `add_group_with`.
pub struct GroupScope<'a> {
	group: &'a mut RuleGroup,
	ledger: &'a mut Ledger,
	limits: PatternLimits,
}

impl<'a> GroupScope<'a> {
	pub(crate) fn new(group: &'a mut RuleGroup, ledger: &'a mut Ledger, limits: PatternLimits) -> Self {
		Self {
			group,
			ledger,
			limits,
		}
	}

	/// The group being configured.
	pub fn rule(&self) -> &Arc<Rule> {
		&self.group.rule
	}

	/// Registers a terminal child at `relative`.
	///
	/// # Errors
	///
	/// [`RouterError::DuplicateRoute`] when the same pattern is already
	/// registered anywhere or the alias is taken, and any compile error.
	pub fn add(
		&mut self,
		relative: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
	) -> Result<&mut Self> {
		let path = self.group.child_path(relative);
		insert_terminal(
			&mut self.group.children,
			self.ledger,
			&self.limits,
			&path,
			handler.into(),
			alias,
		)?;
		Ok(self)
	}

	/// Registers a nested group at `relative`.
	pub fn add_group(
		&mut self,
		relative: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
	) -> Result<&mut Self> {
		self.add_group_with(relative, handler, alias, |_| Ok(()))
	}

	/// Registers a nested group and configures its children.
	///
	/// Declaring the same nested path twice reuses the first group; the new
	/// handler is appended to it.
	///
	/// # Errors
	///
	/// [`RouterError::EmptyPattern`] for a blank `relative`, plus whatever
	/// `configure` returns.
	pub fn add_group_with<F>(
		&mut self,
		relative: &str,
		handler: impl Into<Handler>,
		alias: Option<&str>,
		configure: F,
	) -> Result<&mut Self>
	where
		F: FnOnce(&mut GroupScope<'_>) -> Result<()>,
	{
		if relative.trim().is_empty() {
			return Err(RouterError::EmptyPattern {
				group: self.group.rule.to_string(),
			});
		}

		let path = self.group.child_path(relative);
		let position = upsert_group(
			&mut self.group.children,
			self.ledger,
			&self.limits,
			&path,
			handler.into(),
			alias,
		)?;

		if let Some(child) = self
			.group
			.children
			.get_mut(position)
			.and_then(Route::as_group_mut)
		{
			configure(&mut GroupScope::new(child, self.ledger, self.limits))?;
		}
		Ok(self)
	}

	/// Looks up an alias in the owning registry.
	pub fn resolve_alias(&self, alias: &str) -> Result<Arc<Rule>> {
		self.ledger.resolve_alias(alias)
	}
}
