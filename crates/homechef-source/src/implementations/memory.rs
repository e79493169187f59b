//! In-memory order source.
//!
//! Keeps orders in a `RwLock`-protected list, optionally seeded from a JSON
//! fixture file. Useful for demos and tests where no order API is available.
//! Status changes are checked against the lifecycle before being applied.

use crate::{
	decode_orders, decode_settings, OrderSourceInterface, SourceError, SourceFactory,
	SourceRegistry,
};
use async_trait::async_trait;
use homechef_order::validate_transition;
use homechef_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Order, OrderBatch, OrderId,
	OrderStatus, Schema, Session, Settings, ValidationError,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const DEFAULT_CANCELLATION_MINUTES: i64 = 15;
const DEFAULT_CONFIRMATION_MINUTES: i64 = 10;

/// In-memory source implementation.
pub struct MemorySource {
	orders: Arc<RwLock<Vec<Order>>>,
	settings: Option<Settings>,
	validate_transitions: bool,
	/// Fixture records that could not be used, reported with every fetch.
	skipped: usize,
}

impl MemorySource {
	/// Creates a source serving `orders`. Without settings every settings
	/// request fails, which exercises the degraded path of callers.
	pub fn new(orders: Vec<Order>, settings: Option<Settings>) -> Self {
		Self {
			orders: Arc::new(RwLock::new(orders)),
			settings,
			validate_transitions: true,
			skipped: 0,
		}
	}

	/// Creates a source serving a decoded batch, keeping its skip count.
	pub fn from_batch(batch: OrderBatch, settings: Option<Settings>) -> Self {
		Self {
			skipped: batch.skipped,
			..Self::new(batch.orders, settings)
		}
	}

	/// Accepts any status change, including ones the lifecycle forbids.
	pub fn without_transition_checks(mut self) -> Self {
		self.validate_transitions = false;
		self
	}

	/// Loads orders, and settings if present, from a JSON fixture.
	///
	/// The file holds either an order array or an object with `orders` and
	/// an optional `settings` entry.
	pub fn from_fixture(path: &Path) -> Result<(OrderBatch, Option<Settings>), SourceError> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			SourceError::Configuration(format!("Cannot read fixture {}: {}", path.display(), e))
		})?;
		let mut body: Value =
			serde_json::from_str(&content).map_err(|e| SourceError::Decode(e.to_string()))?;

		let settings = match body.as_object_mut().and_then(|map| map.remove("settings")) {
			Some(raw) => Some(decode_settings(raw)?),
			None => None,
		};
		let batch = decode_orders(body)?;

		info!(
			path = %path.display(),
			orders = batch.len(),
			skipped = batch.skipped,
			"Loaded order fixture"
		);
		Ok((batch, settings))
	}
}

#[async_trait]
impl OrderSourceInterface for MemorySource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemorySourceSchema)
	}

	async fn fetch_orders(&self, _session: &Session) -> Result<OrderBatch, SourceError> {
		Ok(OrderBatch {
			orders: self.orders.read().await.clone(),
			skipped: self.skipped,
		})
	}

	async fn fetch_default_settings(&self, _session: &Session) -> Result<Settings, SourceError> {
		self.settings
			.ok_or_else(|| SourceError::NotFound("default settings".into()))
	}

	async fn update_order_status(
		&self,
		_session: &Session,
		order_id: &OrderId,
		status: OrderStatus,
	) -> Result<(), SourceError> {
		let mut orders = self.orders.write().await;
		let order = orders
			.iter_mut()
			.find(|order| &order.id == order_id)
			.ok_or_else(|| SourceError::NotFound(order_id.to_string()))?;

		if self.validate_transitions {
			validate_transition(order.status, status)
				.map_err(|e| SourceError::Rejected(e.to_string()))?;
		}

		debug!(order_id = %order_id, from = %order.status, to = %status, "Updated order status");
		order.status = status;
		Ok(())
	}
}

/// Configuration schema for MemorySource.
pub struct MemorySourceSchema;

impl ConfigSchema for MemorySourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let minutes = || FieldType::Integer {
			min: Some(0),
			max: Some(7 * 24 * 60),
		};
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("fixture", FieldType::String),
				Field::new("cancellation_time_span", minutes()),
				Field::new("confirmation_time_span", minutes()),
				Field::new("validate_transitions", FieldType::Boolean),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a memory source from configuration.
///
/// Configuration parameters:
/// - `fixture`: JSON file to seed orders (and optionally settings) from
/// - `cancellation_time_span`, `confirmation_time_span`: settings in minutes
///   (defaults 15 and 10, used when the fixture has no settings)
/// - `validate_transitions`: reject lifecycle violations (default true)
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	MemorySourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let (batch, fixture_settings) = match config.get("fixture").and_then(|v| v.as_str()) {
		Some(path) => MemorySource::from_fixture(Path::new(path))?,
		None => (OrderBatch::default(), None),
	};

	let minutes = |key: &str, default: i64| {
		config
			.get(key)
			.and_then(|v| v.as_integer())
			.unwrap_or(default) as u32
	};
	let settings = fixture_settings.unwrap_or_else(|| {
		Settings::new(
			minutes("cancellation_time_span", DEFAULT_CANCELLATION_MINUTES),
			minutes("confirmation_time_span", DEFAULT_CONFIRMATION_MINUTES),
		)
	});

	let mut source = MemorySource::from_batch(batch, Some(settings));
	if !config
		.get("validate_transitions")
		.and_then(|v| v.as_bool())
		.unwrap_or(true)
	{
		source = source.without_transition_checks();
	}

	Ok(Box::new(source))
}

/// Registry for the memory source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}
