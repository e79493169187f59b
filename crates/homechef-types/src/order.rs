//! Order types for the order desk.
//!
//! This module defines the strict, normalized order model. Loosely shaped API
//! records are converted into these types by [`crate::normalize`] so that the
//! list pipeline never deals with optional or untyped wire fields directly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::{format_price, NOT_SPECIFIED, UNKNOWN_AREA, UNKNOWN_CUSTOMER};

/// Unique identifier of an order.
///
/// The API sends ids either as integers or strings; both are kept in their
/// decimal/string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OrderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for OrderId {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

impl From<String> for OrderId {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<u64> for OrderId {
	fn from(n: u64) -> Self {
		Self(n.to_string())
	}
}

/// Error returned when a status string is not one of the known statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct ParseStatusError(pub String);

/// Lifecycle status of an order.
///
/// Happy path: `Pending -> Accepted -> Preparing -> Delivering -> Delivered`.
/// `Canceled` is reachable from `Pending` or `Accepted` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	Pending,
	Accepted,
	Preparing,
	Delivering,
	Delivered,
	Canceled,
}

impl OrderStatus {
	/// Every status, in lifecycle order.
	pub const ALL: [OrderStatus; 6] = [
		OrderStatus::Pending,
		OrderStatus::Accepted,
		OrderStatus::Preparing,
		OrderStatus::Delivering,
		OrderStatus::Delivered,
		OrderStatus::Canceled,
	];

	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Accepted => "accepted",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Delivering => "delivering",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Canceled => "canceled",
		}
	}

	/// Returns true for statuses with no further transition.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
	}

	/// Returns true for statuses listed after all active orders.
	///
	/// This is wider than [`OrderStatus::is_terminal`]: an order out for
	/// delivery no longer needs the chef's attention.
	pub fn sinks_in_listing(&self) -> bool {
		matches!(
			self,
			OrderStatus::Delivering | OrderStatus::Delivered | OrderStatus::Canceled
		)
	}

	/// Returns the next status on the happy path, if any.
	pub fn next(&self) -> Option<OrderStatus> {
		match self {
			OrderStatus::Pending => Some(OrderStatus::Accepted),
			OrderStatus::Accepted => Some(OrderStatus::Preparing),
			OrderStatus::Preparing => Some(OrderStatus::Delivering),
			OrderStatus::Delivering => Some(OrderStatus::Delivered),
			OrderStatus::Delivered | OrderStatus::Canceled => None,
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ParseStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"pending" => Ok(OrderStatus::Pending),
			"accepted" => Ok(OrderStatus::Accepted),
			"preparing" => Ok(OrderStatus::Preparing),
			"delivering" => Ok(OrderStatus::Delivering),
			"delivered" => Ok(OrderStatus::Delivered),
			"canceled" | "cancelled" => Ok(OrderStatus::Canceled),
			_ => Err(ParseStatusError(s.to_string())),
		}
	}
}

/// Delivery address of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
	pub street: Option<String>,
	pub house_number: Option<String>,
	pub city: Option<String>,
}

impl DeliveryAddress {
	/// Formats the address as `street house_number, city`, skipping missing parts.
	///
	/// Returns `None` when every part is missing or blank.
	pub fn formatted(&self) -> Option<String> {
		let line = [self.street.as_deref(), self.house_number.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.collect::<Vec<_>>()
			.join(" ");
		let city = self.city.as_deref().map(str::trim).unwrap_or("");

		match (line.is_empty(), city.is_empty()) {
			(true, true) => None,
			(false, true) => Some(line),
			(true, false) => Some(city.to_string()),
			(false, false) => Some(format!("{}, {}", line, city)),
		}
	}

	/// Returns the delivery area token (the city), if present.
	pub fn area(&self) -> Option<&str> {
		self.city.as_deref().map(str::trim).filter(|s| !s.is_empty())
	}
}

/// A single line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
	/// Dish name as shown to the chef.
	pub name: String,
	/// Number of portions.
	pub quantity: u32,
}

/// A normalized customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: OrderId,
	/// Human-facing order code, when the API provides one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Current status of the order.
	pub status: OrderStatus,
	/// When the order was placed.
	pub created_at: Option<DateTime<Utc>>,
	/// Scheduled delivery date.
	pub delivery_date: Option<NaiveDate>,
	/// Scheduled delivery date and time, when a time is known.
	pub delivery_at: Option<NaiveDateTime>,
	/// Name of the ordering customer.
	pub customer_name: Option<String>,
	/// Total amount charged for the order.
	pub total_price: Decimal,
	/// Where the order is delivered.
	pub delivery_address: Option<DeliveryAddress>,
	/// Ordered dishes.
	#[serde(default)]
	pub items: Vec<OrderItem>,
}

impl Order {
	/// Creates a minimal order with the given id and status.
	///
	/// Every optional field starts empty; use the `with_*` helpers to fill them.
	pub fn new(id: impl Into<OrderId>, status: OrderStatus) -> Self {
		Self {
			id: id.into(),
			code: None,
			status,
			created_at: None,
			delivery_date: None,
			delivery_at: None,
			customer_name: None,
			total_price: Decimal::ZERO,
			delivery_address: None,
			items: Vec::new(),
		}
	}

	pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
		self.created_at = Some(created_at);
		self
	}

	pub fn with_customer(mut self, name: impl Into<String>) -> Self {
		self.customer_name = Some(name.into());
		self
	}

	pub fn with_total_price(mut self, total: Decimal) -> Self {
		self.total_price = total;
		self
	}

	/// Sets the delivery schedule from a full date and time.
	pub fn with_delivery_at(mut self, at: NaiveDateTime) -> Self {
		self.delivery_date = Some(at.date());
		self.delivery_at = Some(at);
		self
	}

	/// Sets a delivery date without a known time.
	pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
		self.delivery_date = Some(date);
		self.delivery_at = None;
		self
	}

	pub fn with_address(mut self, address: DeliveryAddress) -> Self {
		self.delivery_address = Some(address);
		self
	}

	pub fn with_item(mut self, name: impl Into<String>, quantity: u32) -> Self {
		self.items.push(OrderItem {
			name: name.into(),
			quantity,
		});
		self
	}

	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(code.into());
		self
	}

	/// Code shown to users; falls back to the id.
	pub fn display_code(&self) -> &str {
		self.code.as_deref().unwrap_or_else(|| self.id.as_str())
	}

	/// Customer name, or the "Unknown Customer" placeholder.
	pub fn display_customer(&self) -> &str {
		self.customer_name
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.unwrap_or(UNKNOWN_CUSTOMER)
	}

	/// Formatted delivery address, or the "Not specified" placeholder.
	pub fn display_address(&self) -> String {
		self.delivery_address
			.as_ref()
			.and_then(DeliveryAddress::formatted)
			.unwrap_or_else(|| NOT_SPECIFIED.to_string())
	}

	/// Delivery date as `YYYY-MM-DD`, or the "Not specified" placeholder.
	pub fn display_delivery_date(&self) -> String {
		self.delivery_date
			.map(|d| d.format("%Y-%m-%d").to_string())
			.unwrap_or_else(|| NOT_SPECIFIED.to_string())
	}

	/// Total price with two decimals, e.g. "24.50".
	pub fn display_total(&self) -> String {
		format_price(self.total_price)
	}

	/// Delivery area token used for grouping.
	pub fn display_area(&self) -> &str {
		self.delivery_address
			.as_ref()
			.and_then(DeliveryAddress::area)
			.unwrap_or(UNKNOWN_AREA)
	}

	/// Effective delivery timestamp used for ordering.
	///
	/// A date without a time counts as the start of that day.
	pub fn delivery_timestamp(&self) -> Option<NaiveDateTime> {
		self.delivery_at
			.or_else(|| self.delivery_date.map(|d| d.and_time(NaiveTime::MIN)))
	}

	/// Time elapsed between order placement and `now`, at full precision.
	///
	/// Returns `None` when the creation time is unknown.
	pub fn age(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
		self.created_at.map(|created| now - created)
	}
}
