//! Order list processing for the homechef order desk.
//!
//! Turns a flat list of normalized orders plus view parameters into a
//! filtered, sorted, optionally grouped and paginated page, and computes the
//! actions each visible order currently offers. Processing is a pure
//! function of its inputs: the current time is always passed in.

use chrono::{DateTime, Utc};
use homechef_types::{
	DisplayEntry, Order, OrderRow, PermittedActions, ProcessedView, Role, Settings, ViewParams,
};
use thiserror::Error;
use tracing::debug;

pub mod filter;
pub mod group;
pub mod paginate;
pub mod permissions;
pub mod sort;
pub mod transitions;

pub use permissions::{
	authorize, can_cancel, can_confirm, next_status_action, permitted_actions, PermissionError,
};
pub use transitions::{is_valid_transition, target_status, validate_transition, TransitionError};

use paginate::Slot;

/// Errors that can occur while building a view.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
	/// Pages are numbered from 1.
	#[error("Invalid page: {0}")]
	InvalidPage(usize),
	#[error("Invalid page size: {0}")]
	InvalidPageSize(usize),
}

/// Builds list views for one viewer role.
///
/// The role only affects which actions are reported; filtering, ordering
/// and pagination are the same for everyone.
#[derive(Debug, Clone, Copy)]
pub struct OrderListProcessor {
	role: Role,
}

impl Default for OrderListProcessor {
	fn default() -> Self {
		Self::new(Role::Chef)
	}
}

impl OrderListProcessor {
	pub fn new(role: Role) -> Self {
		Self { role }
	}

	pub fn role(&self) -> Role {
		self.role
	}

	/// Runs the full pipeline: search, date and tab filters, sort, group,
	/// paginate, then attaches permitted actions to every visible order.
	///
	/// # Errors
	///
	/// Returns an error if `params.page` or `params.page_size` is zero.
	pub fn process(
		&self,
		orders: &[Order],
		params: &ViewParams,
		settings: Option<&Settings>,
		now: DateTime<Utc>,
	) -> Result<ProcessedView, ProcessError> {
		if params.page == 0 {
			return Err(ProcessError::InvalidPage(params.page));
		}
		if params.page_size == 0 {
			return Err(ProcessError::InvalidPageSize(params.page_size));
		}

		let mut visible = filter::apply(orders, &params.search, params.date, params.tab);
		sort::sort_orders(&mut visible, params.sort);
		let groups = group::group_orders(visible, params.group);
		let page = paginate::paginate(&groups, params.page, params.page_size);

		debug!(
			total = orders.len(),
			matched = page.total_count,
			page = params.page,
			groups = groups.len(),
			"Processed order list"
		);

		let entries = page
			.slots
			.into_iter()
			.map(|slot| match slot {
				Slot::Header(header) => DisplayEntry::Header(header),
				Slot::Order(order) => DisplayEntry::Order(OrderRow {
					order: order.clone(),
					actions: self.actions_for(order, settings, now),
				}),
			})
			.collect();

		Ok(ProcessedView {
			page: entries,
			total_count: page.total_count,
			total_pages: page.total_pages,
		})
	}

	/// Actions `order` offers to this processor's role at `now`.
	pub fn actions_for(
		&self,
		order: &Order,
		settings: Option<&Settings>,
		now: DateTime<Utc>,
	) -> PermittedActions {
		permitted_actions(order, settings, now, self.role)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, NaiveDate, TimeZone};
	use homechef_types::{GroupKey, OrderStatus, SortKey, StatusTab};
	use rust_decimal::Decimal;

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
	}

	fn params() -> ViewParams {
		ViewParams::default()
	}

	fn fixture() -> Vec<Order> {
		let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
		vec![
			Order::new(1u64, OrderStatus::Pending)
				.with_customer("John Smith")
				.with_created_at(now() - Duration::minutes(3))
				.with_delivery_at(day.and_hms_opt(13, 0, 0).unwrap())
				.with_total_price(Decimal::new(1850, 2)),
			Order::new(2u64, OrderStatus::Delivered)
				.with_customer("Jane Doe")
				.with_created_at(now())
				.with_delivery_at(day.and_hms_opt(9, 0, 0).unwrap()),
			Order::new(3u64, OrderStatus::Accepted)
				.with_customer("Ann Lee")
				.with_created_at(now() - Duration::minutes(40)),
			Order::new(4u64, OrderStatus::Pending)
				.with_created_at(now() - Duration::minutes(20))
				.with_delivery_date(day),
		]
	}

	fn ids(view: &ProcessedView) -> Vec<String> {
		view.orders().map(|row| row.order.id.to_string()).collect()
	}

	#[test]
	fn test_empty_orders() {
		let view = OrderListProcessor::default()
			.process(&[], &params(), Some(&Settings::new(10, 10)), now())
			.unwrap();
		assert!(view.page.is_empty());
		assert_eq!(view.total_count, 0);
		assert_eq!(view.total_pages, 0);
	}

	#[test]
	fn test_all_tab_keeps_everything() {
		let orders = fixture();
		let view = OrderListProcessor::default()
			.process(&orders, &params(), None, now())
			.unwrap();
		assert_eq!(view.total_count, orders.len());
		assert_eq!(ids(&view), vec!["4", "1", "3", "2"]);
	}

	#[test]
	fn test_search_scenario() {
		let orders = fixture();
		let view = OrderListProcessor::default()
			.process(
				&orders,
				&ViewParams {
					search: "smith".into(),
					..params()
				},
				None,
				now(),
			)
			.unwrap();
		assert_eq!(ids(&view), vec!["1"]);
	}

	#[test]
	fn test_date_and_tab_filters() {
		let orders = fixture();
		let processor = OrderListProcessor::default();
		let dated = ViewParams {
			date: NaiveDate::from_ymd_opt(2024, 5, 2),
			..params()
		};
		let view = processor.process(&orders, &dated, None, now()).unwrap();
		assert_eq!(ids(&view), vec!["4", "1", "2"]);

		let pending = ViewParams {
			tab: StatusTab::Only(OrderStatus::Pending),
			sort: SortKey::CreatedAt,
			..params()
		};
		let view = processor.process(&orders, &pending, None, now()).unwrap();
		assert_eq!(ids(&view), vec!["1", "4"]);
	}

	#[test]
	fn test_group_by_status_scenario() {
		let orders = vec![
			Order::new(1u64, OrderStatus::Pending),
			Order::new(2u64, OrderStatus::Pending),
			Order::new(3u64, OrderStatus::Delivered),
		];
		let view = OrderListProcessor::default()
			.process(
				&orders,
				&ViewParams {
					group: GroupKey::Status,
					..params()
				},
				None,
				now(),
			)
			.unwrap();

		assert_eq!(view.headers().count(), 2);
		assert_eq!(view.orders().count(), 3);
		assert_eq!(view.total_count, 3);

		let kinds: Vec<String> = view
			.page
			.iter()
			.map(|entry| match entry {
				DisplayEntry::Header(h) => format!("#{}", h.key),
				DisplayEntry::Order(row) => row.order.status.to_string(),
			})
			.collect();
		assert_eq!(
			kinds,
			vec!["#delivered", "delivered", "#pending", "pending", "pending"]
		);
	}

	#[test]
	fn test_actions_are_attached() {
		let orders = fixture();
		let settings = Settings::new(10, 30);
		let view = OrderListProcessor::default()
			.process(&orders, &params(), Some(&settings), now())
			.unwrap();

		let row = |id: &str| {
			view.orders()
				.find(|row| row.order.id.as_str() == id)
				.map(|row| row.actions)
				.unwrap()
		};
		assert!(row("1").can_confirm);
		assert!(row("1").can_cancel);
		assert!(row("4").can_confirm);
		assert!(!row("4").can_cancel);
		assert!(!row("3").can_cancel);
		assert_eq!(row("3").next_status, Some(OrderStatus::Preparing));
		assert_eq!(row("2").next_status, None);
	}

	#[test]
	fn test_customer_view_offers_no_forward_moves() {
		let orders = fixture();
		let view = OrderListProcessor::new(Role::Customer)
			.process(&orders, &params(), Some(&Settings::new(10, 30)), now())
			.unwrap();
		assert!(view
			.orders()
			.all(|row| !row.actions.can_confirm && row.actions.next_status.is_none()));
		assert!(view.orders().any(|row| row.actions.can_cancel));
	}

	#[test]
	fn test_pagination_and_purity() {
		let orders = fixture();
		let processor = OrderListProcessor::default();
		let page = |n| ViewParams {
			page: n,
			page_size: 3,
			..params()
		};

		let first = processor.process(&orders, &page(1), None, now()).unwrap();
		let again = processor.process(&orders, &page(1), None, now()).unwrap();
		assert_eq!(first, again);
		assert_eq!(first.total_pages, 2);

		let second = processor.process(&orders, &page(2), None, now()).unwrap();
		let mut all = ids(&first);
		all.extend(ids(&second));
		assert_eq!(all, vec!["4", "1", "3", "2"]);
	}

	#[test]
	fn test_invalid_page_params() {
		let processor = OrderListProcessor::default();
		assert_eq!(
			processor.process(&[], &ViewParams { page: 0, ..params() }, None, now()),
			Err(ProcessError::InvalidPage(0))
		);
		assert_eq!(
			processor.process(
				&[],
				&ViewParams {
					page_size: 0,
					..params()
				},
				None,
				now()
			),
			Err(ProcessError::InvalidPageSize(0))
		);
	}
}
