//! Order data source module for the homechef order desk.
//!
//! A data source supplies raw orders and the chef's default settings and
//! accepts status changes. Implementations are selected by name from the
//! `[source]` configuration section; every record they return has already
//! passed through the normalization boundary in `homechef_types::normalize`.

use async_trait::async_trait;
use homechef_types::{
	normalize_orders, ConfigSchema, ImplementationRegistry, OrderBatch, OrderId, OrderStatus,
	RawOrder, RawSettings, Session, Settings,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to a data source.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// The source answered with a non-success status.
	#[error("HTTP {status}: {message}")]
	Http { status: u16, message: String },
	/// The response body could not be interpreted.
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The source refused the requested change.
	#[error("Rejected: {0}")]
	Rejected(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for order data sources.
#[async_trait]
pub trait OrderSourceInterface: Send + Sync {
	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Fetches every order visible to `session`.
	async fn fetch_orders(&self, session: &Session) -> Result<OrderBatch, SourceError>;

	/// Fetches the settings gating time-bound actions.
	async fn fetch_default_settings(&self, session: &Session) -> Result<Settings, SourceError>;

	/// Requests that `order_id` move to `status`.
	async fn update_order_status(
		&self,
		session: &Session,
		order_id: &OrderId,
		status: OrderStatus,
	) -> Result<(), SourceError>;
}

/// Type alias for source factory functions.
pub type SourceFactory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

/// Registry trait for source implementations.
pub trait SourceRegistry: ImplementationRegistry<Factory = SourceFactory> {}

/// Get all registered source implementations.
///
/// Returns a vector of (name, factory) tuples for all available source implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SourceFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Extracts the order array from a response body.
///
/// Accepts a bare array or an object wrapping it under `data` or `orders`.
/// Records are returned untyped; each one is decoded on its own later.
pub fn extract_order_records(body: Value) -> Result<Vec<Value>, SourceError> {
	let records = match body {
		Value::Array(_) => body,
		Value::Object(mut map) => map
			.remove("data")
			.or_else(|| map.remove("orders"))
			.ok_or_else(|| SourceError::Decode("expected 'data' or 'orders' array".into()))?,
		other => {
			return Err(SourceError::Decode(format!(
				"expected an order array, got {}",
				json_kind(&other)
			)))
		},
	};

	match records {
		Value::Array(records) => Ok(records),
		other => Err(SourceError::Decode(format!(
			"expected an order array, got {}",
			json_kind(&other)
		))),
	}
}

/// Decodes and normalizes an order response body.
///
/// Only an unusable body fails; a record that is not even an object is
/// skipped and counted like any other unusable record.
pub fn decode_orders(body: Value) -> Result<OrderBatch, SourceError> {
	let records = extract_order_records(body)?;
	let received = records.len();

	let mut unreadable = 0;
	let raw: Vec<RawOrder> = records
		.into_iter()
		.filter_map(|record| match serde_json::from_value(record) {
			Ok(raw) => Some(raw),
			Err(e) => {
				warn!(error = %e, "Skipping unreadable order record");
				unreadable += 1;
				None
			},
		})
		.collect();

	let mut batch = normalize_orders(raw);
	batch.skipped += unreadable;
	debug!(received, kept = batch.len(), skipped = batch.skipped, "Decoded orders");
	Ok(batch)
}

/// Decodes a settings response body, with or without a `data` wrapper.
pub fn decode_settings(body: Value) -> Result<Settings, SourceError> {
	let body = match body {
		Value::Object(mut map) if map.contains_key("data") => {
			map.remove("data").unwrap_or(Value::Null)
		},
		other => other,
	};

	let raw: RawSettings =
		serde_json::from_value(body).map_err(|e| SourceError::Decode(e.to_string()))?;
	Settings::try_from(raw).map_err(|e| SourceError::Decode(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
