//! Resource handlers and route tables loaded from settings.

use parking_lot::Mutex;
use rstest::rstest;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use waypost_conf::RouterSettings;
use waypost_routing::{Handler, Registry, ResourceRunner, Result, RouteMatch, RouterError};

const TABLE: &str = r#"
[[routes]]
path = "/docs"
group = true
resource = "enter.txt"

  [[routes.children]]
  path = "/{page}"
  alias = "doc"
  resource = "page.txt"

  [[routes.children]]
  path = ""
  resource = "index.txt"

[[routes]]
path = ""
alias = "home"
resource = "home.txt"
"#;

fn site_dir() -> tempfile::TempDir {
	let dir = tempfile::tempdir().unwrap();
	for (name, body) in [
		("enter.txt", "entered"),
		("page.txt", "a page"),
		("index.txt", "docs index"),
		("home.txt", "home"),
	] {
		fs::write(dir.path().join(name), body).unwrap();
	}
	dir
}

fn settings_for(dir: &Path) -> RouterSettings {
	let mut settings = RouterSettings::from_toml_str(TABLE).unwrap();
	settings.resources.root = Some(dir.to_path_buf());
	settings
}

#[rstest]
#[case("", "home")]
#[case("docs", "docs index")]
#[case("docs/intro", "a page")]
fn test_resource_output(#[case] path: &str, #[case] expected: &str) {
	let dir = site_dir();
	let registry = Registry::from_settings(&settings_for(dir.path())).unwrap();

	let dispatched = registry.dispatch(path).unwrap().unwrap();
	assert_eq!(dispatched.output(), Some(&json!(expected)));
}

#[rstest]
fn test_missing_group_resource_fails_dispatch() {
	let dir = site_dir();
	fs::remove_file(dir.path().join("enter.txt")).unwrap();
	let registry = Registry::from_settings(&settings_for(dir.path())).unwrap();

	let err = registry.dispatch("docs/intro").unwrap_err();
	assert!(matches!(err, RouterError::HandlerInvocation { .. }));
	// The terminal handler never ran
	assert!(registry.current().is_none());
}

#[rstest]
fn test_settings_file_round_trip() {
	let dir = site_dir();
	let settings_path = dir.path().join("router.toml");
	fs::write(
		&settings_path,
		format!(
			"[resources]\nroot = {:?}\n{}",
			dir.path().display().to_string(),
			TABLE
		),
	)
	.unwrap();

	let settings = RouterSettings::from_file(&settings_path).unwrap();
	let registry = Registry::from_settings(&settings).unwrap();
	assert_eq!(registry.len(), 4);

	let mut args = waypost_routing::Params::new();
	args.insert("page".to_string(), "setup".into());
	assert_eq!(registry.url_for("doc", &args).unwrap(), "/docs/setup");
}

#[derive(Default)]
struct RecordingRunner {
	seen: Mutex<Vec<(PathBuf, String)>>,
}

impl ResourceRunner for RecordingRunner {
	fn run(&self, resource: &Path, route_match: &RouteMatch) -> Result<Option<Value>> {
		self.seen
			.lock()
			.push((resource.to_path_buf(), route_match.path().to_string()));
		Ok(None)
	}
}

#[rstest]
fn test_custom_runner_receives_group_and_terminal() {
	let runner = Arc::new(RecordingRunner::default());

	struct Shared(Arc<RecordingRunner>);
	impl ResourceRunner for Shared {
		fn run(&self, resource: &Path, route_match: &RouteMatch) -> Result<Option<Value>> {
			self.0.run(resource, route_match)
		}
	}

	let mut registry = Registry::new().with_resource_runner(Shared(Arc::clone(&runner)));
	registry
		.add_group_with("/shop", Handler::resource("shop.php"), None, |shop| {
			shop.add("/item/{i:id}", Handler::resource("item.php"), None)?;
			Ok(())
		})
		.unwrap();

	let dispatched = registry.dispatch("shop/item/3").unwrap().unwrap();
	assert_eq!(dispatched.output(), None);

	let seen = runner.seen.lock().clone();
	assert_eq!(
		seen,
		vec![
			(PathBuf::from("shop.php"), "shop/item/3".to_string()),
			(PathBuf::from("item.php"), "shop/item/3".to_string()),
		]
	);
}
