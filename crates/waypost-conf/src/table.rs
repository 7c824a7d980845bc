//! Declarative route tables.
//!
//! A table lists routes the same way code registers them: terminal routes
//! and groups, where groups nest further declarations under their own path.
//! Handlers declared here are always resource identifiers, since closures
//! cannot be written in a settings file.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One declared route.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecl {
	/// Pattern, relative to the enclosing group (absolute at top level)
	pub path: String,

	/// Optional alias for reverse lookups
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alias: Option<String>,

	/// Resource executed when the route is dispatched
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource: Option<PathBuf>,

	/// Declares a group instead of a terminal route
	#[serde(default)]
	pub group: bool,

	/// Nested declarations, only meaningful for groups
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<RouteDecl>,
}

impl RouteDecl {
	/// Declares a terminal route.
	pub fn route(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Declares a group.
	pub fn group(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			group: true,
			..Self::default()
		}
	}

	/// Sets the alias.
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = Some(alias.into());
		self
	}

	/// Sets the resource handler.
	pub fn with_resource(mut self, resource: impl Into<PathBuf>) -> Self {
		self.resource = Some(resource.into());
		self
	}

	/// Appends a nested declaration.
	pub fn with_child(mut self, child: RouteDecl) -> Self {
		self.children.push(child);
		self
	}

	fn validate(&self) -> Result<(), SettingsError> {
		if !self.group && !self.children.is_empty() {
			return Err(SettingsError::Invalid {
				field: "routes.children",
				reason: format!("route '{}' has children but is not a group", self.path),
			});
		}
		if let Some(alias) = &self.alias
			&& alias.trim().is_empty()
		{
			return Err(SettingsError::Invalid {
				field: "routes.alias",
				reason: format!("route '{}' has a blank alias", self.path),
			});
		}
		self.children.iter().try_for_each(RouteDecl::validate)
	}
}

/// The top-level list of declared routes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
	routes: Vec<RouteDecl>,
}

impl RouteTable {
	/// Creates a table from declarations.
	pub fn new(routes: Vec<RouteDecl>) -> Self {
		Self { routes }
	}

	/// Top-level declarations in declaration order.
	pub fn iter(&self) -> std::slice::Iter<'_, RouteDecl> {
		self.routes.iter()
	}

	/// Number of top-level declarations.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Whether the table declares nothing.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Number of declarations including nested ones.
	pub fn total(&self) -> usize {
		fn count(decls: &[RouteDecl]) -> usize {
			decls.iter().map(|d| 1 + count(&d.children)).sum()
		}
		count(&self.routes)
	}

	pub(crate) fn validate(&self) -> Result<(), SettingsError> {
		self.routes.iter().try_for_each(RouteDecl::validate)
	}
}

impl<'a> IntoIterator for &'a RouteTable {
	type Item = &'a RouteDecl;
	type IntoIter = std::slice::Iter<'a, RouteDecl>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RouterSettings;
	use rstest::rstest;

	const NESTED: &str = r#"
[[routes]]
path = "/api"
alias = "api"
group = true

  [[routes.children]]
  path = "/member"
  group = true

    [[routes.children.children]]
    path = "/u/{i:id}"
    alias = "member"
    resource = "member.html"

  [[routes.children]]
  path = "/"
  resource = "api-index.html"

[[routes]]
path = ""
alias = "home"
resource = "index.html"
"#;

	#[rstest]
	fn test_nested_table_parses() {
		let settings = RouterSettings::from_toml_str(NESTED).unwrap();
		let table = &settings.routes;

		assert_eq!(table.len(), 2);
		assert_eq!(table.total(), 5);

		let api = table.iter().next().unwrap();
		assert!(api.group);
		assert_eq!(api.alias.as_deref(), Some("api"));
		assert_eq!(api.children[0].children[0].path, "/u/{i:id}");
		assert_eq!(
			api.children[0].children[0].resource,
			Some(PathBuf::from("member.html"))
		);
	}

	#[rstest]
	fn test_builder_matches_parsed_table() {
		let built = RouteTable::new(vec![
			RouteDecl::group("/api")
				.with_alias("api")
				.with_child(
					RouteDecl::group("/member").with_child(
						RouteDecl::route("/u/{i:id}")
							.with_alias("member")
							.with_resource("member.html"),
					),
				)
				.with_child(RouteDecl::route("/").with_resource("api-index.html")),
			RouteDecl::route("")
				.with_alias("home")
				.with_resource("index.html"),
		]);

		let parsed = RouterSettings::from_toml_str(NESTED).unwrap().routes;
		assert_eq!(built, parsed);
	}

	#[rstest]
	fn test_children_on_terminal_rejected() {
		let table = RouteTable::new(vec![
			RouteDecl::route("/a").with_child(RouteDecl::route("/b")),
		]);
		assert!(matches!(
			table.validate(),
			Err(SettingsError::Invalid {
				field: "routes.children",
				..
			})
		));
	}

	#[rstest]
	fn test_blank_alias_rejected() {
		let table = RouteTable::new(vec![RouteDecl::route("/a").with_alias(" ")]);
		assert!(table.validate().is_err());
	}
}
