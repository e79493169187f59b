//! API types for the order desk HTTP API.
//!
//! Defines the request and response bodies of the list and action endpoints
//! and the structured error type mapped onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{OrderAction, OrderId, OrderStatus, ProcessedView, Settings};

/// Body of `POST /api/orders/{id}/actions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
	pub action: OrderAction,
}

/// Response of a successful status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
	pub order_id: OrderId,
	pub status: OrderStatus,
}

/// Response of the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
	#[serde(flatten)]
	pub view: ProcessedView,
	/// Settings in effect; absent while they could not be loaded.
	pub settings: Option<Settings>,
	/// When the cached list was last replaced.
	pub refreshed_at: Option<DateTime<Utc>>,
}

/// Response of the manual refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
	pub order_count: usize,
	pub skipped_records: usize,
	pub settings_loaded: bool,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Suggested retry delay in seconds
	#[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
	pub retry_after: Option<u64>,
}

/// Structured API error type with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed request parameters (400)
	BadRequest { error_type: String, message: String },
	/// Unknown order (404)
	NotFound { error_type: String, message: String },
	/// Action not permitted in the order's current state (409)
	Conflict { error_type: String, message: String },
	/// Upstream order API failed (502)
	BadGateway { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	pub fn bad_request(error_type: &str, message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::Conflict { .. } => StatusCode::CONFLICT,
			APIError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::BadRequest {
				error_type,
				message,
			}
			| APIError::NotFound {
				error_type,
				message,
			}
			| APIError::Conflict {
				error_type,
				message,
			}
			| APIError::BadGateway {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => (error_type, message),
		};

		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
			retry_after: match self {
				APIError::BadGateway { .. } => Some(30),
				_ => None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let response = self.to_error_response();
		write!(f, "{}: {}", response.error, response.message)
	}
}

impl std::error::Error for APIError {}

impl IntoResponse for APIError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(
			APIError::bad_request("INVALID_DATE", "bad").status_code(),
			StatusCode::BAD_REQUEST
		);
		let conflict = APIError::Conflict {
			error_type: "ACTION_NOT_PERMITTED".into(),
			message: "too late".into(),
		};
		assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
		assert_eq!(conflict.to_error_response().retry_after, None);
	}

	#[test]
	fn test_bad_gateway_suggests_retry() {
		let err = APIError::BadGateway {
			error_type: "UPSTREAM_ERROR".into(),
			message: "timeout".into(),
		};
		let body = err.to_error_response();
		assert_eq!(body.retry_after, Some(30));
		assert_eq!(err.to_string(), "UPSTREAM_ERROR: timeout");
	}
}
