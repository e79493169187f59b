//! Chef-level settings that gate time-bound order actions.

use serde::{Deserialize, Serialize};

/// Time windows, in minutes, measured from order placement.
///
/// An order may be confirmed only while
/// `now - created_at <= confirmation_time_span`, and canceled only while
/// `now - created_at <= cancellation_time_span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
	/// Minutes after placement during which an order may be canceled.
	pub cancellation_time_span: u32,
	/// Minutes after placement during which an order may be confirmed.
	pub confirmation_time_span: u32,
}

impl Settings {
	pub fn new(cancellation_time_span: u32, confirmation_time_span: u32) -> Self {
		Self {
			cancellation_time_span,
			confirmation_time_span,
		}
	}
}
