//! Normalization of loosely shaped API records.
//!
//! The order API is inconsistent: ids arrive as numbers or strings, the
//! customer name is sometimes `customer_name` and sometimes `name`, prices may
//! be strings, and the delivery schedule comes in one of three shapes. Raw
//! records are accepted as-is and converted into [`Order`] with explicit
//! defaults, so nothing downstream handles optional wire fields.
//!
//! Only a missing id or an unrecognised status rejects a record; every other
//! gap is tolerated and rendered with a placeholder later on.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use crate::{DeliveryAddress, Order, OrderId, OrderItem, OrderStatus, Settings};

/// Errors that can occur while normalizing API records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
	/// The record carries no usable id.
	#[error("Order record has no id")]
	MissingId,
	/// The record carries no status.
	#[error("Order {0} has no status")]
	MissingStatus(String),
	/// The record's status is not one of the known statuses.
	#[error("Order {id} has unknown status '{status}'")]
	UnknownStatus { id: String, status: String },
	/// The settings record is incomplete or malformed.
	#[error("Invalid settings: {0}")]
	InvalidSettings(String),
}

/// Order record exactly as the API sends it.
///
/// Every field is kept as untyped JSON so a single mistyped field never
/// fails the record, let alone the batch it arrived in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
	#[serde(default)]
	pub id: Value,
	#[serde(default, alias = "code")]
	pub order_code: Option<Value>,
	#[serde(default)]
	pub status: Option<Value>,
	#[serde(default)]
	pub created_at: Option<Value>,
	#[serde(default)]
	pub delivery_date_time: Option<Value>,
	#[serde(default)]
	pub delivery_date: Option<Value>,
	#[serde(default)]
	pub delivery_time: Option<Value>,
	#[serde(default)]
	pub customer_name: Option<Value>,
	#[serde(default)]
	pub name: Option<Value>,
	#[serde(default)]
	pub total_price: Option<Value>,
	#[serde(default)]
	pub order_delivery_address: Option<Value>,
	#[serde(default)]
	pub items: Option<Value>,
	#[serde(default)]
	pub order_items: Option<Value>,
}

/// Address record as the API sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
	#[serde(default)]
	pub street: Option<Value>,
	#[serde(default)]
	pub house_number: Option<Value>,
	#[serde(default)]
	pub city: Option<Value>,
}

/// Order item as the API sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
	#[serde(default)]
	pub name: Option<Value>,
	#[serde(default)]
	pub dish_name: Option<Value>,
	#[serde(default)]
	pub quantity: Option<Value>,
}

/// Normalized orders of one fetch, with the number of records left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBatch {
	pub orders: Vec<Order>,
	/// Records that had no id or no recognisable status.
	pub skipped: usize,
}

impl OrderBatch {
	pub fn len(&self) -> usize {
		self.orders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}
}

impl From<Vec<Order>> for OrderBatch {
	fn from(orders: Vec<Order>) -> Self {
		Self { orders, skipped: 0 }
	}
}

/// Settings record as the API sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
	#[serde(default)]
	pub cancellation_time_span: Option<Value>,
	#[serde(default)]
	pub confirmation_time_span: Option<Value>,
}

impl TryFrom<RawOrder> for Order {
	type Error = NormalizeError;

	fn try_from(raw: RawOrder) -> Result<Self, Self::Error> {
		let id = value_to_string(&raw.id).ok_or(NormalizeError::MissingId)?;

		let status_text = text(raw.status.as_ref())
			.ok_or_else(|| NormalizeError::MissingStatus(id.clone()))?;
		let status =
			OrderStatus::from_str(&status_text).map_err(|_| NormalizeError::UnknownStatus {
				id: id.clone(),
				status: status_text.clone(),
			})?;

		let (delivery_date, delivery_at) = parse_schedule(
			text(raw.delivery_date_time.as_ref()).as_deref(),
			text(raw.delivery_date.as_ref()).as_deref(),
			text(raw.delivery_time.as_ref()).as_deref(),
		);

		let customer_name =
			text(raw.customer_name.as_ref()).or_else(|| text(raw.name.as_ref()));

		let total_price = raw
			.total_price
			.as_ref()
			.and_then(parse_decimal)
			.unwrap_or(Decimal::ZERO);

		let delivery_address = raw
			.order_delivery_address
			.and_then(|value| serde_json::from_value::<RawAddress>(value).ok())
			.map(|a| DeliveryAddress {
				street: text(a.street.as_ref()),
				house_number: text(a.house_number.as_ref()),
				city: text(a.city.as_ref()),
			});

		let items = match raw.items.or(raw.order_items) {
			Some(Value::Array(items)) => items
				.into_iter()
				.filter_map(|item| serde_json::from_value::<RawItem>(item).ok())
				.filter_map(|item| {
					let name = text(item.name.as_ref()).or_else(|| text(item.dish_name.as_ref()))?;
					let quantity = text(item.quantity.as_ref())
						.and_then(|q| q.parse::<u32>().ok())
						.unwrap_or(1);
					Some(OrderItem { name, quantity })
				})
				.collect(),
			_ => Vec::new(),
		};

		Ok(Order {
			id: OrderId(id),
			code: text(raw.order_code.as_ref()),
			status,
			created_at: raw.created_at.as_ref().and_then(parse_created_at),
			delivery_date,
			delivery_at,
			customer_name,
			total_price,
			delivery_address,
			items,
		})
	}
}

impl TryFrom<RawSettings> for Settings {
	type Error = NormalizeError;

	fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
		let minutes = |field: &str, value: Option<&Value>| -> Result<u32, NormalizeError> {
			let value = value.ok_or_else(|| {
				NormalizeError::InvalidSettings(format!("missing {}", field))
			})?;
			value_to_string(value)
				.and_then(|s| s.parse::<u32>().ok())
				.ok_or_else(|| {
					NormalizeError::InvalidSettings(format!(
						"{} must be a non-negative whole number of minutes, got {}",
						field, value
					))
				})
		};

		Ok(Settings {
			cancellation_time_span: minutes(
				"cancellation_time_span",
				raw.cancellation_time_span.as_ref(),
			)?,
			confirmation_time_span: minutes(
				"confirmation_time_span",
				raw.confirmation_time_span.as_ref(),
			)?,
		})
	}
}

/// Normalizes a batch of raw records, skipping the ones that cannot be used.
///
/// Skipped records are logged with the reason and counted in the batch.
pub fn normalize_orders(raw: Vec<RawOrder>) -> OrderBatch {
	let mut batch = OrderBatch::default();
	for record in raw {
		match Order::try_from(record) {
			Ok(order) => batch.orders.push(order),
			Err(e) => {
				tracing::warn!(error = %e, "Skipping order record");
				batch.skipped += 1;
			},
		}
	}
	batch
}

fn text(value: Option<&Value>) -> Option<String> {
	value.and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Creation time from a timestamp string or from epoch seconds.
fn parse_created_at(value: &Value) -> Option<DateTime<Utc>> {
	match value {
		Value::String(s) => parse_utc_timestamp(s),
		Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
		_ => None,
	}
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
	let text = value_to_string(value)?;
	Decimal::from_str(&text)
		.or_else(|_| Decimal::from_scientific(&text))
		.ok()
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M",
];

/// Parses a creation timestamp; naive values are taken as UTC.
fn parse_utc_timestamp(text: &str) -> Option<DateTime<Utc>> {
	let text = text.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Some(dt.with_timezone(&Utc));
	}
	parse_naive_datetime(text).map(|naive| naive.and_utc())
}

/// Parses a wall-clock date and time; an explicit offset is dropped, keeping
/// the local reading the customer was shown.
fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
	let text = text.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Some(dt.naive_local());
	}
	NAIVE_DATETIME_FORMATS
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
	let text = text.trim();
	NaiveDate::parse_from_str(text, "%Y-%m-%d")
		.ok()
		.or_else(|| parse_naive_datetime(text).map(|dt| dt.date()))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
	let text = text.trim();
	NaiveTime::parse_from_str(text, "%H:%M:%S")
		.or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
		.ok()
}

/// Resolves the delivery schedule from whichever representation is present.
///
/// `delivery_date_time` takes precedence over `delivery_date` (+ optional
/// `delivery_time`), which takes precedence over a full timestamp stored in
/// `delivery_time`.
fn parse_schedule(
	date_time: Option<&str>,
	date: Option<&str>,
	time: Option<&str>,
) -> (Option<NaiveDate>, Option<NaiveDateTime>) {
	if let Some(at) = date_time.and_then(parse_naive_datetime) {
		return (Some(at.date()), Some(at));
	}

	if let Some(day) = date.and_then(parse_date) {
		let at = time.and_then(parse_time).map(|t| day.and_time(t));
		return (Some(day), at);
	}

	if let Some(at) = time.and_then(parse_naive_datetime) {
		return (Some(at.date()), Some(at));
	}

	(None, None)
}
