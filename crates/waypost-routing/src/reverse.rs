//! Reverse URL generation.

use crate::error::{Result, RouterError};
use crate::params::Params;
use crate::rule::Rule;
use url::form_urlencoded;

/// Builds a URL for `rule`.
///
/// Values are layered: the rule's own bound parameters, then caller `args`,
/// then `reference` for whatever placeholder is still unset. Caller
/// arguments that name no placeholder become the query string, in insertion
/// order.
pub(crate) fn build_url(
	rule: &Rule,
	own: Option<&Params>,
	args: &Params,
	reference: Option<&Params>,
) -> Result<String> {
	let mut values = own.cloned().unwrap_or_default();
	for (name, value) in args {
		values.insert(name.clone(), value.clone());
	}

	if let Some(reference) = reference {
		for spec in rule.params() {
			if !values.contains_key(spec.name())
				&& let Some(value) = reference.get(spec.name())
			{
				values.insert(spec.name().to_string(), value.clone());
			}
		}
	}

	let mut url = String::with_capacity(rule.template().len() + 1);
	url.push('/');
	url.push_str(&substitute(rule, &values)?);

	let mut leftovers = args
		.iter()
		.filter(|(name, _)| rule.pattern().param(name).is_none())
		.peekable();
	if leftovers.peek().is_some() {
		let mut query = form_urlencoded::Serializer::new(String::new());
		for (name, value) in leftovers {
			query.append_pair(name, &value.to_string());
		}
		url.push('?');
		url.push_str(&query.finish());
	}

	Ok(url)
}

/// Substitutes placeholder values into the rule's template in a single pass.
///
/// Brace text naming no placeholder of the rule is copied verbatim.
fn substitute(rule: &Rule, values: &Params) -> Result<String> {
	let template = rule.template();
	let mut result = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		let Some(close) = rest[open + 1..].find('}').map(|offset| open + 1 + offset) else {
			break;
		};
		let name = &rest[open + 1..close];

		let Some(spec) = rule.pattern().param(name) else {
			result.push_str(&rest[..=open]);
			rest = &rest[open + 1..];
			continue;
		};

		result.push_str(&rest[..open]);
		match values.get(name) {
			Some(value) => result.push_str(&value.to_string()),
			None if spec.is_nullable() => {}
			None => {
				return Err(RouterError::MissingParameter {
					name: name.to_string(),
					pattern: rule.path().to_string(),
				});
			}
		}
		rest = &rest[close + 1..];
	}

	result.push_str(rest);
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::ParamValue;
	use rstest::rstest;
	use std::sync::Arc;

	fn params(pairs: &[(&str, ParamValue)]) -> Params {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[rstest]
	fn test_round_trip_integer() {
		let rule = Rule::terminal("/member/u-{i:id}").unwrap();
		let url = rule
			.url(&params(&[("id", ParamValue::Integer(7))]), None)
			.unwrap();
		assert_eq!(url, "/member/u-7");
	}

	#[rstest]
	fn test_leftover_args_become_query() {
		let rule = Rule::terminal("u/{i:id}").unwrap();
		let url = rule
			.url(
				&params(&[
					("id", ParamValue::Integer(3)),
					("tab", "posts".into()),
					("q", "a b&c".into()),
				]),
				None,
			)
			.unwrap();
		assert_eq!(url, "/u/3?tab=posts&q=a+b%26c");
	}

	#[rstest]
	fn test_missing_required_parameter() {
		let rule = Rule::terminal("u/{i:id}").unwrap();
		let err = rule.url(&Params::new(), None).unwrap_err();
		assert!(matches!(err, RouterError::MissingParameter { ref name, .. } if name == "id"));
	}

	#[rstest]
	fn test_missing_nullable_parameter_is_empty() {
		let rule = Rule::terminal("list/{i:page?}").unwrap();
		assert_eq!(rule.url(&Params::new(), None).unwrap(), "/list/");
	}

	#[rstest]
	fn test_reference_back_fills_unset_params() {
		let org = Arc::new(Rule::group("org/{i:org}").unwrap());
		let reference = org.bind("org/5/x").unwrap().unwrap();

		let rule = Rule::terminal("org/{i:org}/u/{i:id}").unwrap();
		let url = rule
			.url(&params(&[("id", ParamValue::Integer(9))]), Some(&reference))
			.unwrap();
		assert_eq!(url, "/org/5/u/9");
	}

	#[rstest]
	fn test_caller_args_win_over_reference() {
		let org = Arc::new(Rule::terminal("org/{i:org}").unwrap());
		let reference = org.bind("org/5").unwrap().unwrap();

		let url = org
			.url(&params(&[("org", ParamValue::Integer(6))]), Some(&reference))
			.unwrap();
		assert_eq!(url, "/org/6");
	}

	#[rstest]
	fn test_match_url_overrides_own_params() {
		let rule = Arc::new(Rule::terminal("u/{i:id}/{tab}").unwrap());
		let route_match = rule.bind("u/1/posts").unwrap().unwrap();

		assert_eq!(route_match.url(&Params::new(), None).unwrap(), "/u/1/posts");
		assert_eq!(
			route_match
				.url(&params(&[("tab", "likes".into())]), None)
				.unwrap(),
			"/u/1/likes"
		);
	}

	#[rstest]
	fn test_literal_braces_survive() {
		let rule = Rule::terminal("a{b-c}/{x{id}").unwrap();
		let url = rule.url(&params(&[("id", "7".into())]), None).unwrap();
		assert_eq!(url, "/a{b-c}/{x7");
	}

	#[rstest]
	fn test_empty_template() {
		let rule = Rule::terminal("").unwrap();
		assert_eq!(rule.url(&Params::new(), None).unwrap(), "/");
	}
}
