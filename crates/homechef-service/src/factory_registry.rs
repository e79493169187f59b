//! Dynamic factory registry for order desk implementations.
//!
//! Data source implementations register themselves through
//! `homechef_source::get_all_implementations`; the desk is built from the
//! ones named in the configuration.

use homechef_config::Config;
use homechef_core::{DeskBuilder, DeskFactories, OrderDesk};
use homechef_source::SourceFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub source: HashMap<String, SourceFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			source: HashMap::new(),
		}
	}

	pub fn register_source(&mut self, name: impl Into<String>, factory: SourceFactory) {
		self.source.insert(name.into(), factory);
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Returns the global registry, populating it on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();
		for (name, factory) in homechef_source::get_all_implementations() {
			tracing::debug!("Registering source implementation: {}", name);
			registry.register_source(name, factory);
		}
		registry
	})
}

/// Macro to build factories from config implementations
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let mut available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				available.sort();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Builds the desk from the registry and configuration.
pub fn build_desk_from_config(config: Config) -> Result<OrderDesk, Box<dyn std::error::Error>> {
	let registry = get_registry();
	let source_factories =
		build_factories!(registry, config.source.implementations, source, "source");

	Ok(DeskBuilder::new(config).build(DeskFactories { source_factories })?)
}
