//! Rule compiler.
//!
//! Turns a declarative pattern into an anchored regular expression, typed
//! parameter descriptors, a URI template for reverse generation and a
//! specificity rank used to order sibling routes.
//!
//! # Grammar
//!
//! - `{name}` - one or more non-slash characters
//! - `{name?}` - zero or more non-slash characters
//! - `{i:name}` - one or more digits, converted to an integer
//! - `{i:name?}` - zero or more digits
//! - `{s:name}` - explicit spelling of `{name}`
//!
//! Names are ASCII letters, digits and underscores. Brace text that does not
//! fit the grammar is matched literally.

use crate::error::{Result, RouterError};
use crate::params::{ParamKind, ParamSpec};
use crate::rule::RuleKind;
use regex::{Regex, RegexBuilder};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use waypost_conf::PatternLimits;

/// Maximum allowed size for a compiled route regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Specificity of the empty pattern.
const EMPTY_PATTERN_SPECIFICITY: i64 = -1;

/// Amount subtracted from a group's specificity.
const GROUP_PENALTY: i64 = 10;

/// A placeholder token parsed from `{...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placeholder {
	pub(crate) name: String,
	pub(crate) kind: ParamKind,
	pub(crate) nullable: bool,
}

impl Placeholder {
	/// Parses the text between braces. Returns `None` for anything outside
	/// the grammar.
	pub(crate) fn parse(inner: &str) -> Option<Self> {
		let (kind, rest) = if let Some(rest) = inner.strip_prefix("i:") {
			(ParamKind::Integer, rest)
		} else if let Some(rest) = inner.strip_prefix("s:") {
			(ParamKind::Text, rest)
		} else {
			(ParamKind::Text, inner)
		};

		let (name, nullable) = match rest.strip_suffix('?') {
			Some(name) => (name, true),
			None => (rest, false),
		};

		let valid = !name.is_empty()
			&& name
				.bytes()
				.all(|b| b.is_ascii_alphanumeric() || b == b'_');

		valid.then(|| Self {
			name: name.to_string(),
			kind,
			nullable,
		})
	}
}

/// A lexical unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
	Literal(&'a str),
	Placeholder(Placeholder),
}

/// Splits a pattern into literal runs and placeholders.
pub(crate) fn tokenize(pattern: &str) -> Vec<Token<'_>> {
	let mut tokens = Vec::new();
	let mut literal_start = 0;
	let mut cursor = 0;

	while let Some(offset) = pattern[cursor..].find('{') {
		let open = cursor + offset;
		let Some(close_offset) = pattern[open + 1..].find('}') else {
			break;
		};
		let close = open + 1 + close_offset;

		match Placeholder::parse(&pattern[open + 1..close]) {
			Some(placeholder) => {
				if literal_start < open {
					tokens.push(Token::Literal(&pattern[literal_start..open]));
				}
				tokens.push(Token::Placeholder(placeholder));
				literal_start = close + 1;
				cursor = close + 1;
			}
			// Not a placeholder: keep the brace as literal text and rescan after it
			None => cursor = open + 1,
		}
	}

	if literal_start < pattern.len() {
		tokens.push(Token::Literal(&pattern[literal_start..]));
	}
	tokens
}

/// SHA-256 digest of a compiled match expression.
///
/// Two patterns compiling to the same expression match exactly the same
/// paths, so the fingerprint identifies a route by content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
	/// Fingerprints a match expression.
	pub fn of(expression: &str) -> Self {
		let digest = Sha256::digest(expression.as_bytes());
		let mut bytes = [0u8; 32];
		bytes.copy_from_slice(&digest);
		Self(bytes)
	}

	/// Raw digest bytes.
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl fmt::Debug for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Fingerprint({})", &hex::encode(self.0)[..12])
	}
}

/// Computes the specificity of a pattern (leading slashes already stripped).
///
/// Each `/`-separated segment contributes, left to right:
///
/// - a literal segment before any placeholder segment: `+1_000_000`
/// - a literal segment after a placeholder segment: `+10_000`
/// - an empty literal segment: a further `-10`
/// - a segment holding a placeholder: `+100`, or `+101` when one of its
///   placeholders is an integer
///
/// The empty pattern ranks `-1`.
pub fn specificity(pattern: &str) -> i64 {
	if pattern.is_empty() {
		return EMPTY_PATTERN_SPECIFICITY;
	}

	let mut seen_placeholder = false;
	let mut rank = 0i64;

	for segment in pattern.split('/') {
		let placeholders: Vec<Placeholder> = tokenize(segment)
			.into_iter()
			.filter_map(|token| match token {
				Token::Placeholder(p) => Some(p),
				Token::Literal(_) => None,
			})
			.collect();

		if placeholders.is_empty() {
			rank += if seen_placeholder { 10_000 } else { 1_000_000 };
			if segment.is_empty() {
				rank -= 10;
			}
		} else {
			rank += 100;
			if placeholders.iter().any(|p| p.kind == ParamKind::Integer) {
				rank += 1;
			}
			seen_placeholder = true;
		}
	}

	rank
}

/// Strips every leading slash from a registered path.
pub(crate) fn normalize(pattern: &str) -> &str {
	pattern.trim_start_matches('/')
}

/// The output of compiling a pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	source: String,
	expression: String,
	regex: Regex,
	params: Vec<ParamSpec>,
	template: String,
	specificity: i64,
	fingerprint: Fingerprint,
}

impl CompiledPattern {
	/// Compiles `pattern` for the given kind of rule.
	///
	/// Leading slashes are stripped first; a trailing slash is kept and is
	/// significant.
	///
	/// # Errors
	///
	/// - [`RouterError::PatternTooLong`] / [`RouterError::TooManySegments`]
	///   when `limits` are exceeded
	/// - [`RouterError::DuplicateParameter`] when a name repeats
	/// - [`RouterError::InvalidPattern`] when the regex engine rejects the
	///   expression
	pub fn compile(pattern: &str, kind: RuleKind, limits: &PatternLimits) -> Result<Self> {
		let source = normalize(pattern);

		if source.len() > limits.max_pattern_length {
			return Err(RouterError::PatternTooLong {
				length: source.len(),
				max: limits.max_pattern_length,
			});
		}

		let segment_count = source.split('/').count();
		if segment_count > limits.max_segments {
			return Err(RouterError::TooManySegments {
				count: segment_count,
				max: limits.max_segments,
			});
		}

		let mut expression = String::from("^");
		let mut template = String::with_capacity(source.len());
		let mut params: Vec<ParamSpec> = Vec::new();
		let mut names = HashSet::new();

		for token in tokenize(source) {
			match token {
				Token::Literal(text) => {
					expression.push_str(&regex::escape(text));
					template.push_str(text);
				}
				Token::Placeholder(placeholder) => {
					if !names.insert(placeholder.name.clone()) {
						return Err(RouterError::DuplicateParameter {
							name: placeholder.name,
							pattern: source.to_string(),
						});
					}
					expression.push_str(placeholder.kind.fragment(placeholder.nullable));
					template.push('{');
					template.push_str(&placeholder.name);
					template.push('}');
					params.push(ParamSpec::new(
						placeholder.name,
						placeholder.kind,
						placeholder.nullable,
						params.len() + 1,
					));
				}
			}
		}

		let mut specificity = specificity(source);
		match kind {
			RuleKind::Terminal => expression.push('$'),
			RuleKind::Group => {
				expression.push_str("(.*)$");
				specificity -= GROUP_PENALTY;
			}
		}

		let regex = RegexBuilder::new(&expression)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|source_err| RouterError::InvalidPattern {
				pattern: source.to_string(),
				source: source_err,
			})?;

		let fingerprint = Fingerprint::of(&expression);

		Ok(Self {
			source: source.to_string(),
			expression,
			regex,
			params,
			template,
			specificity,
			fingerprint,
		})
	}

	/// The pattern with leading slashes stripped.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// The anchored regular expression.
	pub fn expression(&self) -> &str {
		&self.expression
	}

	/// Compiled matcher.
	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Parameter descriptors in capture order.
	pub fn params(&self) -> &[ParamSpec] {
		&self.params
	}

	/// Looks up a descriptor by name.
	pub fn param(&self, name: &str) -> Option<&ParamSpec> {
		self.params.iter().find(|p| p.name() == name)
	}

	/// The pattern with placeholders reduced to bare `{name}`.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Rank among siblings; higher is tried first.
	pub fn specificity(&self) -> i64 {
		self.specificity
	}

	/// Content fingerprint of [`Self::expression`].
	pub fn fingerprint(&self) -> Fingerprint {
		self.fingerprint
	}
}
