//! String formatting utilities.
//!
//! Provides functions for formatting values for display, including id
//! truncation for log lines and price rendering.

use rust_decimal::Decimal;

/// Truncates an identifier for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	if id.chars().count() <= 8 {
		id.to_string()
	} else {
		format!("{}..", id.chars().take(8).collect::<String>())
	}
}

/// Formats a price with exactly two decimal places.
///
/// # Arguments
///
/// * `amount` - The amount to format
///
/// # Returns
///
/// A string like "12.50" or "0.00"
pub fn format_price(amount: Decimal) -> String {
	format!("{:.2}", amount.round_dp(2))
}
