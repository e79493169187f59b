//! Refresh handler.
//!
//! Pulls the order list (and, until they are known, the settings) from the
//! data source and replaces the board with the result. A failed order fetch
//! leaves the previous board untouched; a failed settings fetch leaves the
//! settings absent so every time-gated action stays disabled.
//!
//! Refreshes run one at a time no matter who triggers them, so a slow fetch
//! started before a status change can never overwrite the list fetched
//! after it.

use crate::engine::{clock::Clock, event_bus::EventBus};
use crate::state::OrderBoard;
use homechef_source::{OrderSourceInterface, SourceError};
use homechef_types::{DeskEvent, RefreshEvent, Session};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum RefreshError {
	#[error("Failed to fetch orders: {0}")]
	Source(#[from] SourceError),
}

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
	pub order_count: usize,
	/// Records the source sent that were left out of the list.
	pub skipped: usize,
	pub settings_loaded: bool,
}

pub struct RefreshHandler {
	source: Arc<dyn OrderSourceInterface>,
	session: Session,
	board: Arc<OrderBoard>,
	clock: Arc<dyn Clock>,
	event_bus: EventBus,
	in_flight: Mutex<()>,
}

impl RefreshHandler {
	pub fn new(
		source: Arc<dyn OrderSourceInterface>,
		session: Session,
		board: Arc<OrderBoard>,
		clock: Arc<dyn Clock>,
		event_bus: EventBus,
	) -> Self {
		Self {
			source,
			session,
			board,
			clock,
			event_bus,
			in_flight: Mutex::new(()),
		}
	}

	/// Fetches orders and missing settings concurrently and updates the board.
	#[instrument(skip_all, fields(principal = %self.session.principal_id, role = %self.session.role))]
	pub async fn handle(&self) -> Result<RefreshSummary, RefreshError> {
		let _serialized = self.in_flight.lock().await;

		let (settings_loaded, fetched) = tokio::join!(
			self.ensure_settings(),
			self.source.fetch_orders(&self.session)
		);

		let batch = match fetched {
			Ok(batch) => batch,
			Err(e) => {
				tracing::warn!(error = %e, "Order refresh failed, keeping previous list");
				self.event_bus
					.publish(DeskEvent::Refresh(RefreshEvent::Failed {
						error: e.to_string(),
					}))
					.ok();
				return Err(e.into());
			},
		};

		let order_count = batch.len();
		let skipped = batch.skipped;
		self.board.replace_orders(batch.orders, self.clock.now()).await;
		if skipped > 0 {
			tracing::warn!(skipped, "Source sent order records that could not be used");
		}
		tracing::info!(orders = order_count, settings_loaded, "Refreshed order list");

		self.event_bus
			.publish(DeskEvent::Refresh(RefreshEvent::Completed {
				order_count,
				skipped,
			}))
			.ok();

		Ok(RefreshSummary {
			order_count,
			skipped,
			settings_loaded,
		})
	}

	/// Loads settings once; later refreshes reuse them.
	async fn ensure_settings(&self) -> bool {
		if self.board.settings().await.is_some() {
			return true;
		}

		match self.source.fetch_default_settings(&self.session).await {
			Ok(settings) => {
				tracing::debug!(
					cancellation_minutes = settings.cancellation_time_span,
					confirmation_minutes = settings.confirmation_time_span,
					"Loaded settings"
				);
				self.board.set_settings(Some(settings)).await;
				true
			},
			Err(e) => {
				tracing::warn!(error = %e, "Settings unavailable, time-gated actions disabled");
				self.event_bus
					.publish(DeskEvent::Refresh(RefreshEvent::SettingsUnavailable {
						error: e.to_string(),
					}))
					.ok();
				false
			},
		}
	}
}
