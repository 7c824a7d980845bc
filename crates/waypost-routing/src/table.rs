//! Registration from declarative route tables.

use crate::error::Result;
use crate::group::GroupScope;
use crate::handler::Handler;
use crate::registry::Registry;
use waypost_conf::{RouteDecl, RouteTable, RouterSettings};

fn decl_handler(decl: &RouteDecl) -> Handler {
	decl.resource.clone().map(Handler::Resource).unwrap_or_default()
}

fn load_children(scope: &mut GroupScope<'_>, decls: &[RouteDecl]) -> Result<()> {
	for decl in decls {
		if decl.group {
			scope.add_group_with(
				&decl.path,
				decl_handler(decl),
				decl.alias.as_deref(),
				|nested| load_children(nested, &decl.children),
			)?;
		} else {
			scope.add(&decl.path, decl_handler(decl), decl.alias.as_deref())?;
		}
	}
	Ok(())
}

impl Registry {
	/// Registers every declaration of `table`, groups recursively.
	///
	/// Declarations are registered in table order and stop at the first
	/// error; routes registered before it stay registered.
	pub fn load_table(&mut self, table: &RouteTable) -> Result<&mut Self> {
		for decl in table {
			if decl.group {
				self.add_group_with(
					&decl.path,
					decl_handler(decl),
					decl.alias.as_deref(),
					|scope| load_children(scope, &decl.children),
				)?;
			} else {
				self.add(&decl.path, decl_handler(decl), decl.alias.as_deref())?;
			}
		}

		tracing::debug!(declared = table.total(), registered = self.len(), "Loaded route table");
		Ok(self)
	}

	/// Creates a registry from settings and registers their route table.
	///
	/// # Examples
	///
	/// ```
	/// use waypost_conf::RouterSettings;
	/// use waypost_routing::Registry;
	///
	/// let settings = RouterSettings::from_toml_str(r#"
	/// [[routes]]
	/// path = "/docs"
	/// group = true
	///
	///   [[routes.children]]
	///   path = "/{page}"
	///   alias = "doc"
	/// "#).unwrap();
	///
	/// let registry = Registry::from_settings(&settings).unwrap();
	/// assert!(registry.resolve("docs/intro").unwrap().is_some());
	/// ```
	pub fn from_settings(settings: &RouterSettings) -> Result<Self> {
		let mut registry = Self::with_settings(settings);
		registry.load_table(&settings.routes)?;
		Ok(registry)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RouterError;
	use crate::route::Routable;
	use rstest::rstest;

	#[rstest]
	fn test_nested_groups_loaded() {
		let table = RouteTable::new(vec![
			RouteDecl::group("/api").with_alias("api").with_child(
				RouteDecl::group("/member").with_child(RouteDecl::route("/u/{i:id}").with_alias("member")),
			),
			RouteDecl::route("").with_alias("home"),
		]);

		let mut registry = Registry::new();
		registry.load_table(&table).unwrap();

		assert_eq!(registry.len(), 4);
		assert_eq!(registry.resolve_alias("member").unwrap().path(), "api/member/u/{i:id}");
		assert_eq!(registry.resolve_alias("api").unwrap().kind(), crate::RuleKind::Group);
	}

	#[rstest]
	fn test_resource_handlers_attached() {
		let table = RouteTable::new(vec![
			RouteDecl::group("/g")
				.with_resource("enter.html")
				.with_child(RouteDecl::route("x").with_resource("x.html")),
		]);

		let mut registry = Registry::new();
		registry.load_table(&table).unwrap();

		let group = registry.roots().iter().next().and_then(|r| r.as_group()).unwrap();
		assert_eq!(group.handlers().len(), 1);
		let child = group.children().iter().next().unwrap();
		assert_eq!(child.rule().path(), "g/x");
	}

	#[rstest]
	fn test_blank_nested_group_rejected() {
		let table = RouteTable::new(vec![
			RouteDecl::group("/api").with_child(RouteDecl::group("")),
		]);

		let err = Registry::new().load_table(&table).err().unwrap();
		assert!(matches!(err, RouterError::EmptyPattern { .. }));
	}

	#[rstest]
	fn test_duplicate_in_table_rejected() {
		let table = RouteTable::new(vec![RouteDecl::route("/a"), RouteDecl::route("a")]);
		let err = Registry::new().load_table(&table).err().unwrap();
		assert!(err.is_duplicate());
	}
}
