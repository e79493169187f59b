//! HTTP order source.
//!
//! Talks to the remote order API with bearer authentication. Paths are
//! templates: `{role}` and `{id}` expand to the session's role and principal,
//! `{order_id}` to the order being updated.

use crate::{
	decode_orders, decode_settings, OrderSourceInterface, SourceError, SourceFactory,
	SourceRegistry,
};
use async_trait::async_trait;
use homechef_types::{
	truncate_id, ConfigSchema, Field, FieldType, ImplementationRegistry, OrderBatch, OrderId,
	OrderStatus, Schema, Session, Settings, ValidationError,
};
use reqwest::{header::AUTHORIZATION, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_ORDERS_PATH: &str = "/{role}s/{id}/orders";
const DEFAULT_SETTINGS_PATH: &str = "/settings/default";
const DEFAULT_STATUS_PATH: &str = "/orders/{order_id}/status";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// Longest error body echoed into a `SourceError`.
const MAX_ERROR_BODY: usize = 200;

/// Order source backed by the remote order API.
pub struct HttpSource {
	client: reqwest::Client,
	base_url: String,
	orders_path: String,
	settings_path: String,
	status_path: String,
}

impl HttpSource {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.pool_idle_timeout(Duration::from_secs(90))
			.build()
			.map_err(|e| SourceError::Configuration(format!("HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			orders_path: DEFAULT_ORDERS_PATH.to_string(),
			settings_path: DEFAULT_SETTINGS_PATH.to_string(),
			status_path: DEFAULT_STATUS_PATH.to_string(),
		})
	}

	pub fn with_paths(
		mut self,
		orders: Option<&str>,
		settings: Option<&str>,
		status: Option<&str>,
	) -> Self {
		if let Some(path) = orders {
			self.orders_path = path.to_string();
		}
		if let Some(path) = settings {
			self.settings_path = path.to_string();
		}
		if let Some(path) = status {
			self.status_path = path.to_string();
		}
		self
	}

	fn url(&self, template: &str, session: &Session, order_id: Option<&OrderId>) -> String {
		let mut path = template
			.replace("{role}", session.role.as_str())
			.replace("{id}", &session.principal_id);
		if let Some(order_id) = order_id {
			path = path.replace("{order_id}", order_id.as_str());
		}
		format!("{}{}", self.base_url, path)
	}

	fn authorize(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
		if session.auth_token.is_empty() {
			request
		} else {
			request.header(AUTHORIZATION, session.auth_token.bearer().as_str())
		}
	}

	async fn send(&self, request: RequestBuilder) -> Result<Response, SourceError> {
		let response = request
			.send()
			.await
			.map_err(|e| SourceError::Network(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		let message: String = body.chars().take(MAX_ERROR_BODY).collect();
		warn!(status = status.as_u16(), "Order API returned an error");

		Err(match status {
			StatusCode::NOT_FOUND => SourceError::NotFound(message),
			StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
				SourceError::Rejected(message)
			},
			_ => SourceError::Http {
				status: status.as_u16(),
				message,
			},
		})
	}

	async fn get_json(&self, url: &str, session: &Session) -> Result<Value, SourceError> {
		debug!(url, "GET");
		let response = self.send(self.authorize(self.client.get(url), session)).await?;
		response
			.json()
			.await
			.map_err(|e| SourceError::Decode(e.to_string()))
	}
}

#[async_trait]
impl OrderSourceInterface for HttpSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpSourceSchema)
	}

	async fn fetch_orders(&self, session: &Session) -> Result<OrderBatch, SourceError> {
		let url = self.url(&self.orders_path, session, None);
		let body = self.get_json(&url, session).await?;
		decode_orders(body)
	}

	async fn fetch_default_settings(&self, session: &Session) -> Result<Settings, SourceError> {
		let url = self.url(&self.settings_path, session, None);
		let body = self.get_json(&url, session).await?;
		decode_settings(body)
	}

	async fn update_order_status(
		&self,
		session: &Session,
		order_id: &OrderId,
		status: OrderStatus,
	) -> Result<(), SourceError> {
		let url = self.url(&self.status_path, session, Some(order_id));
		debug!(order_id = %truncate_id(order_id.as_str()), %status, "PUT order status");

		let request = self
			.client
			.put(&url)
			.json(&json!({ "status": status.as_str() }));
		self.send(self.authorize(request, session)).await?;
		Ok(())
	}
}

/// Configuration schema for HttpSource.
pub struct HttpSourceSchema;

impl ConfigSchema for HttpSourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let path = |name: &str| {
			Field::new(name, FieldType::String).with_validator(|v| match v.as_str() {
				Some(p) if p.starts_with('/') => Ok(()),
				_ => Err("must start with '/'".to_string()),
			})
		};
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::Url)],
			vec![
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
				path("orders_path"),
				path("settings_path"),
				path("status_path"),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP source from configuration.
///
/// Configuration parameters:
/// - `base_url`: root of the order API (required)
/// - `timeout_seconds`: per-request timeout (default 30)
/// - `orders_path`, `settings_path`, `status_path`: path templates
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	HttpSourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| SourceError::Configuration("base_url is required".into()))?;
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|secs| secs as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
	let path = |key: &str| config.get(key).and_then(|v| v.as_str());

	let source = HttpSource::new(base_url, Duration::from_secs(timeout))?.with_paths(
		path("orders_path"),
		path("settings_path"),
		path("status_path"),
	);

	Ok(Box::new(source))
}

/// Registry for the HTTP source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}
