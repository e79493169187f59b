//! Time-window and role checks deciding which actions an order offers.
//!
//! All checks take `now` explicitly and never read the system clock, so the
//! same inputs always produce the same answer.

use chrono::{DateTime, TimeDelta, Utc};
use homechef_types::{Order, OrderAction, OrderStatus, PermittedActions, Role, Settings};
use thiserror::Error;

use crate::transitions::{target_status, TransitionError};

/// Reasons an action is refused for a specific order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
	#[error("Settings are not loaded")]
	SettingsUnavailable,
	#[error("The {0} window has passed")]
	WindowElapsed(&'static str),
	#[error("A {0} may not {1} orders")]
	RoleDenied(Role, OrderAction),
	#[error(transparent)]
	Transition(#[from] TransitionError),
}

fn within_window(order: &Order, span_minutes: u32, now: DateTime<Utc>) -> bool {
	// Unknown creation time cannot be proven to be inside the window.
	order
		.age(now)
		.is_some_and(|elapsed| elapsed <= TimeDelta::minutes(i64::from(span_minutes)))
}

/// Returns true if a pending order may still be confirmed.
pub fn can_confirm(order: &Order, settings: Option<&Settings>, now: DateTime<Utc>) -> bool {
	match settings {
		Some(settings) => {
			order.status == OrderStatus::Pending
				&& within_window(order, settings.confirmation_time_span, now)
		},
		None => false,
	}
}

/// Returns true if the order may still be canceled.
pub fn can_cancel(order: &Order, settings: Option<&Settings>, now: DateTime<Utc>) -> bool {
	match settings {
		Some(settings) => {
			matches!(order.status, OrderStatus::Pending | OrderStatus::Accepted)
				&& within_window(order, settings.cancellation_time_span, now)
		},
		None => false,
	}
}

/// The single forward status offered for an order, if any.
pub fn next_status_action(order: &Order) -> Option<OrderStatus> {
	order.status.next()
}

/// Computes every action flag for one order as seen by `role`.
pub fn permitted_actions(
	order: &Order,
	settings: Option<&Settings>,
	now: DateTime<Utc>,
	role: Role,
) -> PermittedActions {
	let can_confirm = role.can_advance() && can_confirm(order, settings, now);
	let next_status = if role.can_advance() {
		next_status_action(order)
	} else {
		None
	};

	PermittedActions {
		can_confirm,
		can_cancel: can_cancel(order, settings, now),
		next_status,
	}
}

/// Authorizes `action` on `order` and returns the status to request.
///
/// Advancing a pending order is a confirmation and is gated by the
/// confirmation window.
pub fn authorize(
	order: &Order,
	action: OrderAction,
	settings: Option<&Settings>,
	now: DateTime<Utc>,
	role: Role,
) -> Result<OrderStatus, PermissionError> {
	let target = target_status(action, order.status)?;

	if !role.can_advance() && target != OrderStatus::Canceled {
		return Err(PermissionError::RoleDenied(role, action));
	}

	let window = match target {
		OrderStatus::Accepted => Some(("confirmation", can_confirm(order, settings, now))),
		OrderStatus::Canceled => Some(("cancellation", can_cancel(order, settings, now))),
		_ => None,
	};

	if let Some((name, allowed)) = window {
		if settings.is_none() {
			return Err(PermissionError::SettingsUnavailable);
		}
		if !allowed {
			return Err(PermissionError::WindowElapsed(name));
		}
	}

	Ok(target)
}
