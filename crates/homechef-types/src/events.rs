//! Event types published by the desk engine.
//!
//! Events are the non-blocking notification channel of the desk: refresh
//! failures, degraded settings and completed status changes are announced
//! here so that any listener (logs, the HTTP layer, a UI bridge) can react
//! without the engine waiting on it.

use serde::{Deserialize, Serialize};

use crate::{OrderAction, OrderId, OrderStatus};

/// Main event type encompassing all desk events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeskEvent {
	/// Events from refreshing the order list.
	Refresh(RefreshEvent),
	/// Events from user-triggered status changes.
	Action(ActionEvent),
}

/// Events related to fetching orders and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RefreshEvent {
	/// A new order list replaced the cached one. `skipped` counts records
	/// the source sent that could not be turned into orders.
	Completed { order_count: usize, skipped: usize },
	/// Fetching orders failed; the previous list is kept.
	Failed { error: String },
	/// Settings could not be fetched; time-gated actions are denied.
	SettingsUnavailable { error: String },
}

/// Events related to order status changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionEvent {
	/// The data source accepted the new status.
	StatusChanged {
		order_id: OrderId,
		action: OrderAction,
		status: OrderStatus,
	},
	/// The action was refused or the data source rejected it.
	Failed {
		order_id: OrderId,
		action: OrderAction,
		error: String,
	},
}
