//! The order desk engine.
//!
//! `OrderDesk` ties a data source to the cached board and the list
//! processor. It owns the refresh and action handlers, publishes every
//! outcome on the event bus, and drives periodic polling until shutdown.

pub mod clock;
pub mod event_bus;
pub mod lifecycle;

use crate::handlers::{ActionError, ActionHandler, RefreshError, RefreshHandler, RefreshSummary};
use crate::monitoring::{PollHandle, RefreshPoller};
use crate::state::{BoardSnapshot, OrderBoard};
use clock::Clock;
use homechef_config::Config;
use homechef_order::{OrderListProcessor, ProcessError};
use homechef_source::OrderSourceInterface;
use homechef_types::{
	DeskEvent, OrderAction, OrderId, OrderListResponse, OrderStatus, RefreshEvent, ViewParams,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

/// Errors that can occur during desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	#[error(transparent)]
	Action(#[from] ActionError),
	#[error("Invalid view parameters: {0}")]
	View(#[from] ProcessError),
}

/// Main engine for one desk session.
#[derive(Clone)]
pub struct OrderDesk {
	pub(crate) config: Config,
	pub(crate) board: Arc<OrderBoard>,
	pub(crate) clock: Arc<dyn Clock>,
	pub(crate) processor: OrderListProcessor,
	pub(crate) event_bus: event_bus::EventBus,
	pub(crate) refresh_handler: Arc<RefreshHandler>,
	pub(crate) action_handler: Arc<ActionHandler>,
}

impl OrderDesk {
	pub fn new(
		config: Config,
		source: Arc<dyn OrderSourceInterface>,
		clock: Arc<dyn Clock>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let session = config.session();
		let board = Arc::new(OrderBoard::new());
		let processor = OrderListProcessor::new(session.role);

		let refresh_handler = Arc::new(RefreshHandler::new(
			source.clone(),
			session.clone(),
			board.clone(),
			clock.clone(),
			event_bus.clone(),
		));

		let action_handler = Arc::new(ActionHandler::new(
			source,
			session,
			board.clone(),
			clock.clone(),
			event_bus.clone(),
		));

		Self {
			config,
			board,
			clock,
			processor,
			event_bus,
			refresh_handler,
			action_handler,
		}
	}

	/// Reloads the board from the data source.
	pub async fn refresh(&self) -> Result<RefreshSummary, DeskError> {
		Ok(self.refresh_handler.handle().await?)
	}

	/// Runs the list pipeline over the cached board.
	pub async fn view(&self, params: &ViewParams) -> Result<OrderListResponse, DeskError> {
		let BoardSnapshot {
			orders,
			settings,
			refreshed_at,
		} = self.board.snapshot().await;

		let view = self
			.processor
			.process(&orders, params, settings.as_ref(), self.clock.now())?;

		Ok(OrderListResponse {
			view,
			settings,
			refreshed_at,
		})
	}

	/// Applies a user action and reloads the board on success.
	///
	/// A failed reload does not undo the status change; the board catches up
	/// on the next refresh.
	pub async fn apply_action(
		&self,
		order_id: &OrderId,
		action: OrderAction,
	) -> Result<OrderStatus, DeskError> {
		let status = self.action_handler.handle(order_id, action).await?;

		if let Err(e) = self.refresh_handler.handle().await {
			tracing::warn!(error = %e, "Reload after status change failed");
		}
		Ok(status)
	}

	/// Starts refreshing the board every configured poll interval.
	pub fn start_polling(&self) -> PollHandle {
		RefreshPoller::new(self.refresh_handler.clone(), self.config.poll_interval()).spawn()
	}

	/// Polls and reports desk events until Ctrl-C.
	pub async fn run(&self) -> Result<(), DeskError> {
		let mut event_receiver = self.event_bus.subscribe();
		let poller = self.start_polling();

		loop {
			tokio::select! {
				received = event_receiver.recv() => {
					match received {
						Ok(event) => log_event(&event),
						Err(RecvError::Lagged(skipped)) => {
							tracing::warn!(skipped, "Event listener fell behind");
						}
						Err(RecvError::Closed) => break,
					}
				}

				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		poller.stop();
		self.shutdown().await
	}

	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn board(&self) -> &Arc<OrderBoard> {
		&self.board
	}
}

fn log_event(event: &DeskEvent) {
	match event {
		DeskEvent::Refresh(RefreshEvent::Completed {
			order_count,
			skipped,
		}) => {
			tracing::debug!(order_count, skipped, "Board refreshed");
		},
		DeskEvent::Refresh(RefreshEvent::Failed { error }) => {
			tracing::warn!(%error, "Board refresh failed");
		},
		DeskEvent::Refresh(RefreshEvent::SettingsUnavailable { error }) => {
			tracing::warn!(%error, "Running without settings");
		},
		DeskEvent::Action(action) => {
			tracing::debug!(?action, "Order action");
		},
	}
}
