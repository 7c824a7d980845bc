//! Compiled rules and match results.
//!
//! A [`Rule`] is immutable once compiled and shared behind an [`Arc`].
//! Binding a path never mutates it; every successful match yields a fresh
//! [`RouteMatch`].

use crate::error::{Result, RouterError};
use crate::params::{FromParam, ParamSpec, ParamValue, Params};
use crate::pattern::{CompiledPattern, Fingerprint};
use crate::reverse;
use std::fmt;
use std::sync::Arc;
use waypost_conf::PatternLimits;

/// Whether a rule matches a whole path or a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
	/// Matches the entire path.
	Terminal,
	/// Matches a prefix and delegates the path to its children.
	Group,
}

impl RuleKind {
	/// Sort rank among routes of equal specificity; terminals come first.
	pub(crate) fn tie_rank(self) -> u8 {
		match self {
			Self::Terminal => 0,
			Self::Group => 1,
		}
	}
}

impl fmt::Display for RuleKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Terminal => f.write_str("terminal"),
			Self::Group => f.write_str("group"),
		}
	}
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Rule {
	pattern: CompiledPattern,
	kind: RuleKind,
}

impl Rule {
	/// Compiles a rule of the given kind under `limits`.
	pub fn compile(pattern: &str, kind: RuleKind, limits: &PatternLimits) -> Result<Self> {
		Ok(Self {
			pattern: CompiledPattern::compile(pattern, kind, limits)?,
			kind,
		})
	}

	/// Compiles a terminal rule with default limits.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_routing::Rule;
	///
	/// let rule = Rule::terminal("/member/u-{i:id}").unwrap();
	/// assert!(rule.is_match("member/u-7"));
	/// assert!(!rule.is_match("member/u-x"));
	/// ```
	pub fn terminal(pattern: &str) -> Result<Self> {
		Self::compile(pattern, RuleKind::Terminal, &PatternLimits::default())
	}

	/// Compiles a group rule with default limits.
	pub fn group(pattern: &str) -> Result<Self> {
		Self::compile(pattern, RuleKind::Group, &PatternLimits::default())
	}

	/// Terminal or group.
	pub fn kind(&self) -> RuleKind {
		self.kind
	}

	/// The registered pattern, leading slashes stripped.
	pub fn path(&self) -> &str {
		self.pattern.source()
	}

	/// The pattern as it reads in a URL, with its leading slash.
	pub fn display_path(&self) -> String {
		format!("/{}", self.pattern.source())
	}

	/// The compiled pattern.
	pub fn pattern(&self) -> &CompiledPattern {
		&self.pattern
	}

	/// The anchored match expression.
	pub fn expression(&self) -> &str {
		self.pattern.expression()
	}

	/// Reverse-generation template.
	pub fn template(&self) -> &str {
		self.pattern.template()
	}

	/// Parameter descriptors in capture order.
	pub fn params(&self) -> &[ParamSpec] {
		self.pattern.params()
	}

	/// Rank among siblings.
	pub fn specificity(&self) -> i64 {
		self.pattern.specificity()
	}

	/// Content fingerprint.
	pub fn fingerprint(&self) -> Fingerprint {
		self.pattern.fingerprint()
	}

	/// Whether the rule matches `path` in its entirety.
	pub fn is_match(&self, path: &str) -> bool {
		self.pattern.regex().is_match(path)
	}

	/// Whether `path` matches and every integer capture fits an `i64`.
	///
	/// Dispatch selects candidates with this, so an oversized number makes
	/// the route a non-match instead of a failed dispatch.
	pub fn accepts(&self, path: &str) -> bool {
		let Some(captures) = self.pattern.regex().captures(path) else {
			return false;
		};
		self.params().iter().all(|spec| {
			captures
				.get(spec.index())
				.is_none_or(|raw| spec.convert(raw.as_str()).is_ok())
		})
	}

	/// Matches `path` and converts every described capture.
	///
	/// Captures without a descriptor, such as a group's remainder, are
	/// ignored. Returns `Ok(None)` when the path does not match.
	///
	/// # Errors
	///
	/// Returns [`RouterError::ParamConversion`] when an integer capture
	/// overflows. Dispatch never sees this, it filters with
	/// [`Rule::accepts`] first.
	pub fn bind(self: &Arc<Self>, path: &str) -> Result<Option<RouteMatch>> {
		let Some(captures) = self.pattern.regex().captures(path) else {
			return Ok(None);
		};

		let mut params = Params::with_capacity(self.params().len());
		for spec in self.params() {
			let Some(raw) = captures.get(spec.index()) else {
				continue;
			};
			if let Some(value) = spec.convert(raw.as_str())? {
				params.insert(spec.name().to_string(), value);
			}
		}

		Ok(Some(RouteMatch {
			rule: Arc::clone(self),
			path: path.to_string(),
			params,
		}))
	}

	/// Builds a URL from caller arguments.
	///
	/// Placeholders missing from `args` are back-filled from `reference`;
	/// arguments that name no placeholder are appended as a query string.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingParameter`] for a required placeholder
	/// left without a value.
	pub fn url(&self, args: &Params, reference: Option<&RouteMatch>) -> Result<String> {
		reverse::build_url(self, None, args, reference.map(RouteMatch::params))
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "/{}", self.path())
	}
}

/// The outcome of matching a path against a rule.
#[derive(Debug, Clone)]
pub struct RouteMatch {
	rule: Arc<Rule>,
	path: String,
	params: Params,
}

impl RouteMatch {
	/// The matched rule.
	pub fn rule(&self) -> &Arc<Rule> {
		&self.rule
	}

	/// The dispatched path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Converted parameters in capture order.
	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Returns a parameter value by name.
	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.params.get(name)
	}

	/// Extracts a typed parameter.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use waypost_routing::Rule;
	///
	/// let rule = Arc::new(Rule::terminal("u/{i:id}").unwrap());
	/// let route_match = rule.bind("u/42").unwrap().unwrap();
	/// let id: u32 = route_match.param("id").unwrap();
	/// assert_eq!(id, 42);
	/// ```
	///
	/// # Errors
	///
	/// [`RouterError::MissingParameter`] when the parameter was not captured,
	/// [`RouterError::ParamConversion`] when it does not fit `T`.
	pub fn param<T: FromParam>(&self, name: &str) -> Result<T> {
		let value = self.params.get(name).ok_or_else(|| RouterError::MissingParameter {
			name: name.to_string(),
			pattern: self.rule.path().to_string(),
		})?;
		T::from_param(name, value)
	}

	/// Builds a URL for the matched rule.
	///
	/// The match's own parameters are the base, `args` override them, and
	/// parameters still unset are back-filled from `reference`.
	pub fn url(&self, args: &Params, reference: Option<&RouteMatch>) -> Result<String> {
		reverse::build_url(
			&self.rule,
			Some(&self.params),
			args,
			reference.map(RouteMatch::params),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn arc_terminal(pattern: &str) -> Arc<Rule> {
		Arc::new(Rule::terminal(pattern).unwrap())
	}

	#[rstest]
	#[case("member/u-{i:id}", "member/u-7", true)]
	#[case("member/u-{i:id}", "member/u-", false)]
	#[case("member/u-{i:id}", "member/u-7/", false)]
	#[case("{name}", "", false)]
	#[case("{name?}", "", true)]
	#[case("p/{i:n?}", "p/", true)]
	#[case("p/{i:n?}", "p/x", false)]
	#[case("profile/", "profile", false)]
	#[case("", "", true)]
	fn test_is_match(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		assert_eq!(Rule::terminal(pattern).unwrap().is_match(path), expected);
	}

	#[rstest]
	fn test_bind_converts_integers() {
		let rule = arc_terminal("/member/u-{i:id}");
		let route_match = rule.bind("member/u-7").unwrap().unwrap();

		assert_eq!(route_match.get("id"), Some(&ParamValue::Integer(7)));
		assert_eq!(route_match.path(), "member/u-7");
		assert!(Arc::ptr_eq(route_match.rule(), &rule));
	}

	#[rstest]
	fn test_bind_mismatch_is_none() {
		let rule = arc_terminal("a/{i:id}");
		assert!(rule.bind("a/b").unwrap().is_none());
	}

	#[rstest]
	fn test_bind_nullable_integer_absent() {
		let rule = arc_terminal("list/{i:page?}");
		let route_match = rule.bind("list/").unwrap().unwrap();
		assert!(route_match.params().is_empty());
	}

	#[rstest]
	fn test_bind_overflow_fails() {
		let rule = arc_terminal("a/{i:id}");
		let result = rule.bind("a/123456789012345678901234567890");
		assert!(matches!(result, Err(RouterError::ParamConversion { .. })));
	}

	#[rstest]
	#[case("a/{i:id}", "a/7", true)]
	#[case("a/{i:id}", "a/123456789012345678901234567890", false)]
	#[case("a/{id}", "a/123456789012345678901234567890", true)]
	#[case("a/{i:id?}", "a/", true)]
	#[case("a/{i:id}", "b/7", false)]
	fn test_accepts(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		assert_eq!(Rule::terminal(pattern).unwrap().accepts(path), expected);
	}

	#[rstest]
	fn test_group_bind_ignores_remainder() {
		let rule = Arc::new(Rule::group("/org/{i:org}").unwrap());
		let route_match = rule.bind("org/5/members").unwrap().unwrap();
		assert_eq!(route_match.params().len(), 1);
		assert_eq!(route_match.get("org"), Some(&ParamValue::Integer(5)));
	}

	#[rstest]
	fn test_matches_are_independent() {
		let rule = arc_terminal("u/{i:id}");
		let first = rule.bind("u/1").unwrap().unwrap();
		let second = rule.bind("u/2").unwrap().unwrap();
		assert_eq!(first.get("id"), Some(&ParamValue::Integer(1)));
		assert_eq!(second.get("id"), Some(&ParamValue::Integer(2)));
	}

	#[rstest]
	fn test_typed_param() {
		let rule = arc_terminal("u/{i:id}/{slug}");
		let route_match = rule.bind("u/9/hello").unwrap().unwrap();

		assert_eq!(route_match.param::<i64>("id").unwrap(), 9);
		assert_eq!(route_match.param::<String>("slug").unwrap(), "hello");
		assert!(matches!(
			route_match.param::<i64>("missing"),
			Err(RouterError::MissingParameter { .. })
		));
	}

	#[rstest]
	fn test_display() {
		let rule = Rule::group("//api").unwrap();
		assert_eq!(rule.to_string(), "/api");
		assert_eq!(rule.kind().to_string(), "group");
	}
}
