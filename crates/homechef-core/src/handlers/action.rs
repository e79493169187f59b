//! Action handler for user-triggered status changes.
//!
//! An action is checked against the cached board first: the order must be
//! known, and the caller's role, the lifecycle and the settings windows must
//! all allow it. Only then is the data source asked to change the status.
//! The board itself is not touched here; the caller refreshes it afterwards.

use crate::engine::{clock::Clock, event_bus::EventBus};
use crate::state::OrderBoard;
use homechef_order::{authorize, PermissionError};
use homechef_source::{OrderSourceInterface, SourceError};
use homechef_types::{
	truncate_id, ActionEvent, DeskEvent, OrderAction, OrderId, OrderStatus, Session,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ActionError {
	#[error("Order not found: {0}")]
	NotFound(OrderId),
	#[error("Action not permitted: {0}")]
	Denied(#[from] PermissionError),
	#[error("Status update failed: {0}")]
	Source(#[from] SourceError),
}

pub struct ActionHandler {
	source: Arc<dyn OrderSourceInterface>,
	session: Session,
	board: Arc<OrderBoard>,
	clock: Arc<dyn Clock>,
	event_bus: EventBus,
}

impl ActionHandler {
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
		}
	}

	/// Applies `action` to the order, returning the status it was moved to.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id.as_str()), action = %action))]
	pub async fn handle(
		&self,
		order_id: &OrderId,
		action: OrderAction,
	) -> Result<OrderStatus, ActionError> {
		let result = self.try_handle(order_id, action).await;

		let event = match &result {
			Ok(status) => {
				tracing::info!(status = %status, "Order status changed");
				ActionEvent::StatusChanged {
					order_id: order_id.clone(),
					action,
					status: *status,
				}
			},
			Err(e) => {
				tracing::warn!(error = %e, "Order action failed");
				ActionEvent::Failed {
					order_id: order_id.clone(),
					action,
					error: e.to_string(),
				}
			},
		};
		self.event_bus.publish(DeskEvent::Action(event)).ok();

		result
	}

	async fn try_handle(
		&self,
		order_id: &OrderId,
		action: OrderAction,
	) -> Result<OrderStatus, ActionError> {
		let snapshot = self.board.snapshot().await;
		let order = snapshot
			.find(order_id)
			.ok_or_else(|| ActionError::NotFound(order_id.clone()))?;

		let target = authorize(
			order,
			action,
			snapshot.settings.as_ref(),
			self.clock.now(),
			self.session.role,
		)?;

		self.source
			.update_order_status(&self.session, order_id, target)
			.await?;
		Ok(target)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{chef_session, clock, noon, pending, MockSource};
	use homechef_types::{Order, Role, SecretString, Settings};
	use mockall::predicate::{always, eq};

	async fn board_with(orders: Vec<Order>, settings: Option<Settings>) -> Arc<OrderBoard> {
		let board = Arc::new(OrderBoard::new());
		board.replace_orders(orders, noon()).await;
		board.set_settings(settings).await;
		board
	}

	fn handler(source: MockSource, board: Arc<OrderBoard>, session: Session) -> ActionHandler {
		ActionHandler::new(Arc::new(source), session, board, clock(), EventBus::new(8))
	}

	#[tokio::test]
	async fn test_confirm_inside_window() {
		let mut source = MockSource::new();
		source
			.expect_update_order_status()
			.with(always(), eq(OrderId::from(1u64)), eq(OrderStatus::Accepted))
			.times(1)
			.returning(|_, _, _| Ok(()));

		let board = board_with(vec![pending(1, 5)], Some(Settings::new(15, 10))).await;
		let handler = handler(source, board, chef_session());
		let mut events = handler.event_bus.subscribe();

		let status = handler
			.handle(&OrderId::from(1u64), OrderAction::Confirm)
			.await
			.unwrap();
		assert_eq!(status, OrderStatus::Accepted);
		assert_eq!(
			events.recv().await.unwrap(),
			DeskEvent::Action(ActionEvent::StatusChanged {
				order_id: OrderId::from(1u64),
				action: OrderAction::Confirm,
				status: OrderStatus::Accepted,
			})
		);
	}

	#[tokio::test]
	async fn test_denied_actions_never_reach_source() {
		let mut source = MockSource::new();
		source.expect_update_order_status().never();

		let board = board_with(vec![pending(1, 30)], Some(Settings::new(15, 10))).await;
		let handler = handler(source, board, chef_session());

		let late = handler
			.handle(&OrderId::from(1u64), OrderAction::Confirm)
			.await;
		assert!(matches!(
			late,
			Err(ActionError::Denied(PermissionError::WindowElapsed(_)))
		));

		let missing = handler
			.handle(&OrderId::from(2u64), OrderAction::Cancel)
			.await;
		assert!(matches!(missing, Err(ActionError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_cancel_without_settings_is_denied() {
		let mut source = MockSource::new();
		source.expect_update_order_status().never();

		let board = board_with(vec![pending(1, 1)], None).await;
		let result = handler(source, board, chef_session())
			.handle(&OrderId::from(1u64), OrderAction::Cancel)
			.await;
		assert!(matches!(
			result,
			Err(ActionError::Denied(PermissionError::SettingsUnavailable))
		));
	}

	#[tokio::test]
	async fn test_customer_may_cancel_but_not_advance() {
		let mut source = MockSource::new();
		source
			.expect_update_order_status()
			.with(always(), eq(OrderId::from(1u64)), eq(OrderStatus::Canceled))
			.times(1)
			.returning(|_, _, _| Ok(()));

		let board = board_with(vec![pending(1, 1)], Some(Settings::new(15, 10))).await;
		let customer = Session::new("u-1", Role::Customer, SecretString::from("t"));
		let handler = handler(source, board, customer);

		let denied = handler
			.handle(&OrderId::from(1u64), OrderAction::Advance)
			.await;
		assert!(matches!(
			denied,
			Err(ActionError::Denied(PermissionError::RoleDenied(..)))
		));

		let canceled = handler
			.handle(&OrderId::from(1u64), OrderAction::Cancel)
			.await
			.unwrap();
		assert_eq!(canceled, OrderStatus::Canceled);
	}

	#[tokio::test]
	async fn test_source_rejection_is_reported() {
		let mut source = MockSource::new();
		source
			.expect_update_order_status()
			.returning(|_, _, _| Err(SourceError::Rejected("already accepted".into())));

		let accepted = Order::new(1u64, OrderStatus::Accepted)
			.with_created_at(noon() - chrono::Duration::minutes(1));
		let board = board_with(vec![accepted], Some(Settings::new(15, 10))).await;
		let handler = handler(source, board, chef_session());
		let mut events = handler.event_bus.subscribe();

		let result = handler
			.handle(&OrderId::from(1u64), OrderAction::Advance)
			.await;
		assert!(matches!(
			result,
			Err(ActionError::Source(SourceError::Rejected(_)))
		));
		assert!(matches!(
			events.recv().await.unwrap(),
			DeskEvent::Action(ActionEvent::Failed { .. })
		));
	}
}
