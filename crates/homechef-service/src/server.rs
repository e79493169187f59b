//! HTTP server for the order desk API.

use axum::{
	extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
	response::Json,
	routing::{get, post},
	Router,
};
use homechef_config::ApiConfig;
use homechef_core::OrderDesk;
use homechef_types::{
	APIError, ActionRequest, ActionResponse, OrderId, OrderListResponse, RefreshResponse,
	ViewParams,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::apis::orders::{self, ListQuery};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub desk: Arc<OrderDesk>,
	/// View parameters used where a request leaves them out.
	pub view_defaults: ViewParams,
}

/// Builds the API router.
pub fn router(desk: Arc<OrderDesk>, request_timeout: Duration) -> Router {
	let view_defaults = desk.config().view_defaults();
	let state = AppState {
		desk,
		view_defaults,
	};

	Router::new()
		.route("/health", get(handle_health))
		.nest(
			"/api",
			Router::new()
				.route("/orders", get(handle_list_orders))
				.route("/orders/{id}/actions", post(handle_order_action))
				.route("/refresh", post(handle_refresh)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(request_timeout))
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	desk: Arc<OrderDesk>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(desk, Duration::from_secs(api_config.timeout_seconds));

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order desk API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles GET /health requests.
async fn handle_health(State(state): State<AppState>) -> Json<Value> {
	let board = state.desk.board().snapshot().await;
	Json(json!({
		"status": "ok",
		"desk": state.desk.config().desk.id,
		"orders": board.orders.len(),
		"settings_loaded": board.settings.is_some(),
		"refreshed_at": board.refreshed_at,
	}))
}

/// Handles GET /api/orders requests.
async fn handle_list_orders(
	State(state): State<AppState>,
	query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<OrderListResponse>, APIError> {
	let Query(query) = query.map_err(|e| APIError::bad_request("INVALID_QUERY", e.body_text()))?;

	match orders::list_orders(query, &state.view_defaults, &state.desk).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order list request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/actions requests.
async fn handle_order_action(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, APIError> {
	let Json(request) =
		body.map_err(|e| APIError::bad_request("INVALID_ACTION", e.body_text()))?;

	match orders::apply_action(OrderId::from(id), request.action, &state.desk).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order action failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/refresh requests.
async fn handle_refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, APIError> {
	match orders::refresh(&state.desk).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Manual refresh failed: {}", e);
			Err(e)
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use homechef_config::ConfigBuilder;
	use homechef_core::{DeskBuilder, DeskFactories, FixedClock};
	use homechef_source::SourceFactory;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;
	use tower::ServiceExt;

	const FIXTURE: &str = r#"{
		"orders": [
			{"id": 1, "order_code": "HC-1", "status": "pending",
			 "customer_name": "John Smith", "created_at": "2024-05-01T11:55:00Z",
			 "delivery_date": "2024-05-01", "delivery_time": "18:00",
			 "order_delivery_address": {"street": "Main St", "house_number": "5", "city": "Springfield"}},
			{"id": 2, "order_code": "HC-2", "status": "delivered",
			 "customer_name": "Ann Lee", "created_at": "2024-04-30T10:00:00Z"}
		],
		"settings": {"cancellation_time_span": 15, "confirmation_time_span": 10}
	}"#;

	async fn app() -> (Router, NamedTempFile) {
		let mut fixture = NamedTempFile::new().unwrap();
		fixture.write_all(FIXTURE.as_bytes()).unwrap();

		let mut table = toml::map::Map::new();
		table.insert(
			"fixture".into(),
			toml::Value::String(fixture.path().display().to_string()),
		);
		let config = ConfigBuilder::new()
			.source("memory", toml::Value::Table(table))
			.build();

		let source_factories: HashMap<String, SourceFactory> =
			homechef_source::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect();
		let clock = Arc::new(FixedClock::new(
			"2024-05-01T12:00:00Z".parse().unwrap(),
		));
		let desk = DeskBuilder::new(config)
			.with_clock(clock)
			.build(DeskFactories { source_factories })
			.unwrap();
		desk.initialize().await.unwrap();

		(router(Arc::new(desk), Duration::from_secs(5)), fixture)
	}

	async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
		let response = app.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
		(status, body)
	}

	fn get(uri: &str) -> Request<Body> {
		Request::get(uri).body(Body::empty()).unwrap()
	}

	fn post_json(uri: &str, body: &str) -> Request<Body> {
		Request::post(uri)
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	#[tokio::test]
	async fn test_health() {
		let (app, _fixture) = app().await;
		let (status, body) = call(&app, get("/health")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["orders"], 2);
		assert_eq!(body["settings_loaded"], true);
	}

	#[tokio::test]
	async fn test_list_orders_with_query() {
		let (app, _fixture) = app().await;

		let (status, body) = call(&app, get("/api/orders")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["total_count"], 2);
		assert_eq!(body["page"][0]["order"]["id"], "1");
		assert_eq!(body["page"][0]["actions"]["can_confirm"], true);

		let (status, body) = call(&app, get("/api/orders?tab=delivered&search=ann")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["total_count"], 1);

		let (status, body) = call(&app, get("/api/orders?group=area")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["page"][0]["kind"], "header");
	}

	#[tokio::test]
	async fn test_list_orders_rejects_bad_query() {
		let (app, _fixture) = app().await;

		let (status, body) = call(&app, get("/api/orders?date=yesterday")).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_QUERY");

		let (status, _) = call(&app, get("/api/orders?sort=random")).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, body) = call(&app, get("/api/orders?page=0")).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_VIEW");
	}

	#[tokio::test]
	async fn test_actions() {
		let (app, _fixture) = app().await;

		let (status, body) = call(
			&app,
			post_json("/api/orders/1/actions", r#"{"action": "confirm"}"#),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "accepted");

		// The board was reloaded, so confirming again is a lifecycle conflict.
		let (status, body) = call(
			&app,
			post_json("/api/orders/1/actions", r#"{"action": "confirm"}"#),
		)
		.await;
		assert_eq!(status, StatusCode::CONFLICT);
		assert_eq!(body["error"], "ACTION_NOT_PERMITTED");

		let (status, _) = call(
			&app,
			post_json("/api/orders/404/actions", r#"{"action": "cancel"}"#),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (status, _) = call(
			&app,
			post_json("/api/orders/1/actions", r#"{"action": "teleport"}"#),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_manual_refresh() {
		let (app, _fixture) = app().await;
		let (status, body) = call(&app, post_json("/api/refresh", "")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["order_count"], 2);
		assert_eq!(body["skipped_records"], 1);
		assert_eq!(body["settings_loaded"], true);
	}
}
