//! Order list and action endpoints.
//!
//! Translates query strings into view parameters and desk errors into API
//! errors. All list processing happens in the desk.

use chrono::NaiveDate;
use homechef_config::MAX_PAGE_SIZE;
use homechef_core::{ActionError, DeskError, OrderDesk, RefreshError};
use homechef_order::ProcessError;
use homechef_source::SourceError;
use homechef_types::{
	APIError, ActionResponse, GroupKey, OrderAction, OrderId, OrderListResponse, RefreshResponse,
	SortKey, StatusTab, ViewParams,
};
use serde::Deserialize;
use thiserror::Error;

/// Query string of `GET /api/orders`. Absent values fall back to the
/// configured view defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
	pub search: Option<String>,
	/// `YYYY-MM-DD`; empty means no date filter.
	pub date: Option<String>,
	pub sort: Option<SortKey>,
	pub group: Option<GroupKey>,
	pub tab: Option<StatusTab>,
	pub page: Option<usize>,
	pub page_size: Option<usize>,
}

#[derive(Debug, Error)]
pub enum QueryError {
	#[error("Invalid date '{0}', expected YYYY-MM-DD")]
	InvalidDate(String),
	#[error("page_size must be between 1 and {max}, got {0}", max = MAX_PAGE_SIZE)]
	PageSizeOutOfRange(usize),
}

impl ListQuery {
	pub fn into_params(self, defaults: &ViewParams) -> Result<ViewParams, QueryError> {
		let date = match self.date.as_deref().map(str::trim) {
			None | Some("") => None,
			Some(raw) => Some(
				NaiveDate::parse_from_str(raw, "%Y-%m-%d")
					.map_err(|_| QueryError::InvalidDate(raw.to_string()))?,
			),
		};

		let page_size = self.page_size.unwrap_or(defaults.page_size);
		if page_size > MAX_PAGE_SIZE {
			return Err(QueryError::PageSizeOutOfRange(page_size));
		}

		Ok(ViewParams {
			search: self.search.unwrap_or_default(),
			date,
			sort: self.sort.unwrap_or(defaults.sort),
			group: self.group.unwrap_or(defaults.group),
			tab: self.tab.unwrap_or(defaults.tab),
			page: self.page.unwrap_or(defaults.page),
			page_size,
		})
	}
}

/// Handles GET /api/orders.
pub async fn list_orders(
	query: ListQuery,
	defaults: &ViewParams,
	desk: &OrderDesk,
) -> Result<OrderListResponse, APIError> {
	let params = query
		.into_params(defaults)
		.map_err(|e| APIError::bad_request("INVALID_QUERY", e.to_string()))?;

	desk.view(&params).await.map_err(to_api_error)
}

/// Handles POST /api/orders/{id}/actions.
pub async fn apply_action(
	order_id: OrderId,
	action: OrderAction,
	desk: &OrderDesk,
) -> Result<ActionResponse, APIError> {
	let status = desk
		.apply_action(&order_id, action)
		.await
		.map_err(to_api_error)?;

	Ok(ActionResponse { order_id, status })
}

/// Handles POST /api/refresh.
pub async fn refresh(desk: &OrderDesk) -> Result<RefreshResponse, APIError> {
	let summary = desk.refresh().await.map_err(to_api_error)?;
	Ok(RefreshResponse {
		order_count: summary.order_count,
		skipped_records: summary.skipped,
		settings_loaded: summary.settings_loaded,
	})
}

fn to_api_error(error: DeskError) -> APIError {
	let message = error.to_string();
	match error {
		DeskError::View(ProcessError::InvalidPage(_) | ProcessError::InvalidPageSize(_)) => {
			APIError::bad_request("INVALID_VIEW", message)
		},
		DeskError::Action(ActionError::NotFound(_))
		| DeskError::Action(ActionError::Source(SourceError::NotFound(_))) => APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message,
		},
		DeskError::Action(ActionError::Denied(_)) => APIError::Conflict {
			error_type: "ACTION_NOT_PERMITTED".to_string(),
			message,
		},
		DeskError::Action(ActionError::Source(SourceError::Rejected(_))) => APIError::Conflict {
			error_type: "ACTION_REJECTED".to_string(),
			message,
		},
		DeskError::Action(ActionError::Source(SourceError::Configuration(_)))
		| DeskError::Refresh(RefreshError::Source(SourceError::Configuration(_))) => {
			APIError::InternalServerError {
				error_type: "SOURCE_MISCONFIGURED".to_string(),
				message,
			}
		},
		DeskError::Action(ActionError::Source(_)) | DeskError::Refresh(RefreshError::Source(_)) => {
			APIError::BadGateway {
				error_type: "UPSTREAM_ERROR".to_string(),
				message,
			}
		},
	}
}
