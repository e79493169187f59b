//! Builder for constructing order desks.
//!
//! Every configured source implementation with a known factory is created
//! (which also validates its configuration); the primary one backs the desk.

use crate::engine::{
	clock::{Clock, SystemClock},
	event_bus::EventBus,
	OrderDesk,
};
use homechef_config::Config;
use homechef_source::{OrderSourceInterface, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Capacity of the desk event channel.
const EVENT_BUS_CAPACITY: usize = 1000;

/// Errors that can occur during desk construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions needed to build an `OrderDesk`, keyed by
/// implementation name.
pub struct DeskFactories<SF> {
	pub source_factories: HashMap<String, SF>,
}

pub struct DeskBuilder {
	config: Config,
	clock: Arc<dyn Clock>,
}

impl DeskBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			clock: Arc::new(SystemClock),
		}
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn build<SF>(self, factories: DeskFactories<SF>) -> Result<OrderDesk, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>,
	{
		let mut source_impls = HashMap::new();
		for (name, config) in &self.config.source.implementations {
			let Some(factory) = factories.source_factories.get(name) else {
				tracing::warn!(component = "source", implementation = %name, "No factory registered, skipping");
				continue;
			};

			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.source.primary == name;
					tracing::info!(component = "source", implementation = %name, enabled = %is_primary, "Loaded");
					source_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "source",
						implementation = %name,
						error = %e,
						"Failed to create source implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create source implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary = &self.config.source.primary;
		let source = source_impls.remove(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"Primary source '{}' has no registered implementation",
				primary
			))
		})?;

		Ok(OrderDesk::new(
			self.config,
			Arc::from(source),
			self.clock,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{AnySchema, MockSource};
	use homechef_config::ConfigBuilder;

	type TestFactory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

	fn ok_factory(_: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
		let mut source = MockSource::new();
		source
			.expect_config_schema()
			.returning(|| Box::new(AnySchema));
		Ok(Box::new(source))
	}

	fn failing_factory(_: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
		Err(SourceError::Configuration("base_url is required".into()))
	}

	fn factories(name: &str, factory: TestFactory) -> DeskFactories<TestFactory> {
		DeskFactories {
			source_factories: HashMap::from([(name.to_string(), factory)]),
		}
	}

	#[test]
	fn test_build_with_primary_source() {
		let config = ConfigBuilder::new().build();
		let desk = DeskBuilder::new(config)
			.build(factories("memory", ok_factory))
			.unwrap();
		assert_eq!(desk.config().source.primary, "memory");
	}

	#[test]
	fn test_factory_error_is_config_error() {
		let config = ConfigBuilder::new().build();
		let result = DeskBuilder::new(config).build(factories("memory", failing_factory));
		match result {
			Err(BuilderError::Config(message)) => assert!(message.contains("base_url")),
			_ => panic!("expected a configuration error"),
		}
	}

	#[test]
	fn test_unregistered_primary() {
		let config = ConfigBuilder::new().build();
		let result = DeskBuilder::new(config).build(factories("http", ok_factory));
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}
}
