//! Property tests for the rule compiler.

use proptest::prelude::*;
use std::sync::Arc;
use waypost_routing::{ParamValue, Params, Rule, specificity};

fn literal() -> impl Strategy<Value = String> {
	"[a-z][a-z0-9_-]{0,7}"
}

proptest! {
	#[test]
	fn prop_integer_placeholder_binds_integer(lit in literal(), id in 0u32..=u32::MAX) {
		let rule = Arc::new(Rule::terminal(&format!("/{}/{{i:id}}", lit)).unwrap());
		let route_match = rule.bind(&format!("{}/{}", lit, id)).unwrap().unwrap();
		prop_assert_eq!(route_match.get("id"), Some(&ParamValue::Integer(i64::from(id))));
	}

	#[test]
	fn prop_integer_placeholder_rejects_text(lit in literal(), text in "[a-z]{1,6}") {
		let rule = Rule::terminal(&format!("{}/{{i:id}}", lit)).unwrap();
		let path = format!("{}/{}", lit, text);
		prop_assert!(!rule.is_match(&path), "matched {}", path);
	}

	#[test]
	fn prop_text_placeholder_matches_one_segment(lit in literal(), value in "[^/]{1,12}") {
		let rule = Arc::new(Rule::terminal(&format!("{}/{{name}}", lit)).unwrap());
		let route_match = rule.bind(&format!("{}/{}", lit, value)).unwrap().unwrap();
		prop_assert_eq!(route_match.get("name"), Some(&ParamValue::Text(value.clone())));
		let deeper = format!("{}/{}/more", lit, value);
		let empty = format!("{}/", lit);
		prop_assert!(!rule.is_match(&deeper), "matched {}", deeper);
		prop_assert!(!rule.is_match(&empty), "matched {}", empty);
	}

	#[test]
	fn prop_nullable_placeholder_matches_empty(lit in literal()) {
		let text = Rule::terminal(&format!("{}/{{name?}}", lit)).unwrap();
		let int = Rule::terminal(&format!("{}/{{i:n?}}", lit)).unwrap();
		let empty = format!("{}/", lit);
		prop_assert!(text.is_match(&empty), "text rule missed {}", empty);
		prop_assert!(int.is_match(&empty), "integer rule missed {}", empty);
	}

	#[test]
	fn prop_literal_text_matches_only_itself(text in "[a-z.+*?()|^$\\[\\]]{1,12}") {
		let rule = Rule::terminal(&text).unwrap();
		prop_assert!(rule.is_match(&text), "missed {}", text);
		let extended = format!("{}x", text);
		prop_assert!(!rule.is_match(&extended), "matched {}", extended);
	}

	#[test]
	fn prop_url_then_bind_round_trips(
		lit in literal(),
		id in 0i64..=i64::MAX,
		slug in "[a-z0-9]{1,10}",
	) {
		let rule = Arc::new(Rule::terminal(&format!("{}/{{i:id}}/{{slug}}", lit)).unwrap());
		let mut args = Params::new();
		args.insert("id".to_string(), ParamValue::Integer(id));
		args.insert("slug".to_string(), ParamValue::Text(slug.clone()));

		let url = rule.url(&args, None).unwrap();
		let route_match = rule.bind(url.trim_start_matches('/')).unwrap().unwrap();
		prop_assert_eq!(route_match.params(), &args);
	}

	#[test]
	fn prop_literal_outranks_placeholder_at_same_depth(
		segments in prop::collection::vec(literal(), 1..5),
		last in literal(),
	) {
		let prefix = segments.join("/");
		let literal_only = format!("{}/{}", prefix, last);
		let with_text = format!("{}/{{x}}", prefix);
		let with_int = format!("{}/{{i:x}}", prefix);

		prop_assert!(specificity(&literal_only) > specificity(&with_int));
		prop_assert!(specificity(&with_int) > specificity(&with_text));
	}

	#[test]
	fn prop_group_ranks_below_equal_terminal(lit in literal()) {
		let terminal = Rule::terminal(&lit).unwrap();
		let group = Rule::group(&lit).unwrap();
		prop_assert_eq!(terminal.specificity() - group.specificity(), 10);
	}
}
