//! Global logger installation. Kept in its own test binary since it
//! installs process-wide state.

#![cfg(feature = "logging")]

use waypost::logging::{self, LoggingError};
use waypost::{LogFormat, LoggingSettings, Registry, handler};

#[test]
fn test_init_once_then_refuse() {
	let settings = LoggingSettings {
		filter: "waypost_routing=trace".to_string(),
		format: LogFormat::Json,
	};

	logging::init(&settings).unwrap();

	// Events flow through the installed subscriber without panicking
	let mut registry = Registry::new();
	registry
		.add("/ping", handler(|_| None), None)
		.unwrap();
	registry.dispatch("ping").unwrap().unwrap();

	let again = logging::init(&settings);
	assert!(matches!(again, Err(LoggingError::AlreadyInitialized(_))));
}
