//! Two-level ordering of the filtered list.
//!
//! Orders that are out of the chef's hands (delivering, delivered, canceled)
//! always sort after active ones; the selected [`SortKey`] orders within each
//! half. The sort is stable, so equal keys keep their source order.

use homechef_types::{Order, SortKey};
use std::cmp::Ordering;

/// Orders `Some` before `None`, comparing present values with `cmp`.
fn missing_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => cmp(a, b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

fn compare_by(a: &Order, b: &Order, key: SortKey) -> Ordering {
	match key {
		SortKey::DeliveryTime => {
			missing_last(a.delivery_timestamp(), b.delivery_timestamp(), |x, y| x.cmp(&y))
		},
		SortKey::CreatedAt => missing_last(a.created_at, b.created_at, |x, y| y.cmp(&x)),
		SortKey::TotalPrice => a.total_price.cmp(&b.total_price),
		SortKey::CustomerName => a
			.display_customer()
			.to_lowercase()
			.cmp(&b.display_customer().to_lowercase()),
	}
}

/// Full comparator: active orders first, then by `key`.
pub fn compare(a: &Order, b: &Order, key: SortKey) -> Ordering {
	a.status
		.sinks_in_listing()
		.cmp(&b.status.sinks_in_listing())
		.then_with(|| compare_by(a, b, key))
}

/// Sorts `orders` in place.
pub fn sort_orders(orders: &mut [&Order], key: SortKey) {
	orders.sort_by(|a, b| compare(a, b, key));
}
