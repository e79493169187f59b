//! List view parameters and processed view output.
//!
//! A view is recomputed from scratch whenever the order list or the view
//! parameters change; nothing in this module is persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Order, OrderStatus, ParseStatusError};

/// Secondary sort key of the order list.
///
/// The primary key is always "active orders first"; see
/// [`OrderStatus::sinks_in_listing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
	/// Scheduled delivery time, earliest first.
	#[default]
	DeliveryTime,
	/// Order placement time, most recent first.
	CreatedAt,
	/// Total price, cheapest first.
	TotalPrice,
	/// Customer name, alphabetical.
	CustomerName,
}

/// Grouping applied after sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
	#[default]
	None,
	/// Delivery area (address city).
	Area,
	Status,
	/// Delivery date formatted as `YYYY-MM-DD`.
	DeliveryDate,
	CustomerName,
}

/// Status tab selected in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusTab {
	#[default]
	All,
	Only(OrderStatus),
}

impl StatusTab {
	/// Returns true if an order with `status` is shown under this tab.
	pub fn admits(&self, status: OrderStatus) -> bool {
		match self {
			StatusTab::All => true,
			StatusTab::Only(tab) => *tab == status,
		}
	}
}

impl fmt::Display for StatusTab {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StatusTab::All => f.write_str("all"),
			StatusTab::Only(status) => f.write_str(status.as_str()),
		}
	}
}

impl FromStr for StatusTab {
	type Err = ParseStatusError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim().eq_ignore_ascii_case("all") {
			Ok(StatusTab::All)
		} else {
			s.parse().map(StatusTab::Only)
		}
	}
}

impl TryFrom<String> for StatusTab {
	type Error = ParseStatusError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<StatusTab> for String {
	fn from(tab: StatusTab) -> Self {
		tab.to_string()
	}
}

/// Parameters of a single list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
	/// Free-text search; empty matches everything.
	#[serde(default)]
	pub search: String,
	/// Only orders delivered on this date.
	#[serde(default)]
	pub date: Option<NaiveDate>,
	#[serde(default)]
	pub sort: SortKey,
	#[serde(default)]
	pub group: GroupKey,
	#[serde(default)]
	pub tab: StatusTab,
	/// 1-based page number.
	pub page: usize,
	/// Number of real orders per page.
	pub page_size: usize,
}

impl Default for ViewParams {
	fn default() -> Self {
		Self {
			search: String::new(),
			date: None,
			sort: SortKey::default(),
			group: GroupKey::default(),
			tab: StatusTab::default(),
			page: 1,
			page_size: 10,
		}
	}
}

/// Actions the UI may offer for one order right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermittedActions {
	/// The pending order may still be accepted.
	pub can_confirm: bool,
	/// The order may still be canceled.
	pub can_cancel: bool,
	/// Target of the single forward-transition button, if any.
	pub next_status: Option<OrderStatus>,
}

/// A user-triggered status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
	/// Accept a pending order.
	Confirm,
	/// Move the order one step along the happy path.
	Advance,
	/// Cancel the order.
	Cancel,
}

impl fmt::Display for OrderAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderAction::Confirm => f.write_str("confirm"),
			OrderAction::Advance => f.write_str("advance"),
			OrderAction::Cancel => f.write_str("cancel"),
		}
	}
}

/// Synthetic marker preceding the members of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHeader {
	/// The group key, e.g. a city or a status.
	pub key: String,
	/// Number of orders in the whole group, across pages.
	pub count: usize,
}

/// An order together with the actions currently permitted on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
	pub order: Order,
	pub actions: PermittedActions,
}

/// One entry of the rendered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayEntry {
	Header(GroupHeader),
	Order(OrderRow),
}

impl DisplayEntry {
	/// Returns the order row, or `None` for headers.
	pub fn as_order(&self) -> Option<&OrderRow> {
		match self {
			DisplayEntry::Order(row) => Some(row),
			DisplayEntry::Header(_) => None,
		}
	}

	/// Returns the header, or `None` for order rows.
	pub fn as_header(&self) -> Option<&GroupHeader> {
		match self {
			DisplayEntry::Header(header) => Some(header),
			DisplayEntry::Order(_) => None,
		}
	}
}

/// Result of running the list pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedView {
	/// Entries of the requested page, headers included.
	pub page: Vec<DisplayEntry>,
	/// Number of real orders after filtering; headers excluded.
	pub total_count: usize,
	/// Number of pages for the current page size.
	pub total_pages: usize,
}

impl ProcessedView {
	/// An empty view.
	pub fn empty() -> Self {
		Self {
			page: Vec::new(),
			total_count: 0,
			total_pages: 0,
		}
	}

	/// Iterates over the real orders on this page.
	pub fn orders(&self) -> impl Iterator<Item = &OrderRow> {
		self.page.iter().filter_map(DisplayEntry::as_order)
	}

	/// Iterates over the headers on this page.
	pub fn headers(&self) -> impl Iterator<Item = &GroupHeader> {
		self.page.iter().filter_map(DisplayEntry::as_header)
	}
}
