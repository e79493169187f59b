//! Order status transition rules.
//!
//! The lifecycle is linear (`pending → accepted → preparing → delivering →
//! delivered`) with a side exit to `canceled` from the first two states.
//! This module only answers whether a transition is legal; time windows and
//! roles are checked in [`crate::permissions`].

use homechef_types::{OrderAction, OrderStatus};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when a requested transition is not allowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
	#[error("Invalid transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	#[error("Order is already {0}")]
	Terminal(OrderStatus),
	#[error("Action '{action}' does not apply to a {status} order")]
	NotApplicable {
		action: OrderAction,
		status: OrderStatus,
	},
}

static TRANSITIONS: Lazy<HashMap<OrderStatus, Vec<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();

	m.insert(
		OrderStatus::Pending,
		vec![OrderStatus::Accepted, OrderStatus::Canceled],
	);
	m.insert(
		OrderStatus::Accepted,
		vec![OrderStatus::Preparing, OrderStatus::Canceled],
	);
	m.insert(OrderStatus::Preparing, vec![OrderStatus::Delivering]);
	m.insert(OrderStatus::Delivering, vec![OrderStatus::Delivered]);
	m.insert(OrderStatus::Delivered, vec![]);
	m.insert(OrderStatus::Canceled, vec![]);

	m
});

/// Returns true if `from → to` is an edge of the lifecycle.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

/// Checks that `from → to` is legal.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
	if from.is_terminal() {
		return Err(TransitionError::Terminal(from));
	}
	if !is_valid_transition(from, to) {
		return Err(TransitionError::InvalidTransition { from, to });
	}
	Ok(())
}

/// Resolves the status an action would move an order in `current` to.
///
/// `Advance` on a pending order is the same move as `Confirm`.
pub fn target_status(
	action: OrderAction,
	current: OrderStatus,
) -> Result<OrderStatus, TransitionError> {
	if current.is_terminal() {
		return Err(TransitionError::Terminal(current));
	}

	let target = match action {
		OrderAction::Confirm if current == OrderStatus::Pending => OrderStatus::Accepted,
		OrderAction::Confirm => {
			return Err(TransitionError::NotApplicable {
				action,
				status: current,
			})
		},
		OrderAction::Advance => current.next().ok_or(TransitionError::Terminal(current))?,
		OrderAction::Cancel => OrderStatus::Canceled,
	};

	validate_transition(current, target)?;
	Ok(target)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_forward_chain_is_valid() {
		for pair in [
			(OrderStatus::Pending, OrderStatus::Accepted),
			(OrderStatus::Accepted, OrderStatus::Preparing),
			(OrderStatus::Preparing, OrderStatus::Delivering),
			(OrderStatus::Delivering, OrderStatus::Delivered),
		] {
			assert!(is_valid_transition(pair.0, pair.1), "{:?}", pair);
		}
	}

	#[test]
	fn test_cancel_only_early() {
		assert!(is_valid_transition(OrderStatus::Pending, OrderStatus::Canceled));
		assert!(is_valid_transition(OrderStatus::Accepted, OrderStatus::Canceled));
		assert!(!is_valid_transition(OrderStatus::Preparing, OrderStatus::Canceled));
		assert!(!is_valid_transition(OrderStatus::Delivering, OrderStatus::Canceled));
	}

	#[test]
	fn test_no_skipping_or_going_back() {
		assert!(!is_valid_transition(OrderStatus::Pending, OrderStatus::Preparing));
		assert!(!is_valid_transition(OrderStatus::Delivering, OrderStatus::Accepted));
	}

	#[test]
	fn test_terminal_states_reject_everything() {
		for to in OrderStatus::ALL {
			assert_eq!(
				validate_transition(OrderStatus::Delivered, to),
				Err(TransitionError::Terminal(OrderStatus::Delivered))
			);
		}
	}

	#[test]
	fn test_target_status() {
		assert_eq!(
			target_status(OrderAction::Confirm, OrderStatus::Pending),
			Ok(OrderStatus::Accepted)
		);
		assert_eq!(
			target_status(OrderAction::Advance, OrderStatus::Pending),
			Ok(OrderStatus::Accepted)
		);
		assert_eq!(
			target_status(OrderAction::Advance, OrderStatus::Delivering),
			Ok(OrderStatus::Delivered)
		);
		assert!(matches!(
			target_status(OrderAction::Confirm, OrderStatus::Accepted),
			Err(TransitionError::NotApplicable { .. })
		));
		assert!(matches!(
			target_status(OrderAction::Cancel, OrderStatus::Preparing),
			Err(TransitionError::InvalidTransition { .. })
		));
		assert_eq!(
			target_status(OrderAction::Cancel, OrderStatus::Canceled),
			Err(TransitionError::Terminal(OrderStatus::Canceled))
		);
	}
}
