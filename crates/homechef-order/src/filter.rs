//! Search, date and status-tab filters.

use chrono::NaiveDate;
use homechef_types::{Order, StatusTab};

/// Case-insensitive substring match against code, customer, address and
/// item names. A blank term matches every order.
pub fn matches_search(order: &Order, term: &str) -> bool {
	let needle = term.trim().to_lowercase();
	if needle.is_empty() {
		return true;
	}

	let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

	hit(order.display_code())
		|| order.customer_name.as_deref().is_some_and(hit)
		|| order
			.delivery_address
			.as_ref()
			.and_then(|address| address.formatted())
			.is_some_and(|address| hit(&address))
		|| order.items.iter().any(|item| hit(&item.name))
}

/// Exact match on the effective delivery date. Orders without one never
/// match a date filter.
pub fn matches_date(order: &Order, date: Option<NaiveDate>) -> bool {
	match date {
		Some(date) => order.delivery_date == Some(date),
		None => true,
	}
}

/// Applies the three filters in pipeline order.
pub fn apply<'a>(
	orders: &'a [Order],
	search: &str,
	date: Option<NaiveDate>,
	tab: StatusTab,
) -> Vec<&'a Order> {
	orders
		.iter()
		.filter(|order| matches_search(order, search))
		.filter(|order| matches_date(order, date))
		.filter(|order| tab.admits(order.status))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;
	use homechef_types::{DeliveryAddress, OrderStatus};

	fn date(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
	}

	fn sample() -> Vec<Order> {
		vec![
			Order::new(1u64, OrderStatus::Pending)
				.with_code("HC-001")
				.with_customer("John Smith")
				.with_delivery_date(date(1))
				.with_item("Lasagna", 2),
			Order::new(2u64, OrderStatus::Delivered)
				.with_customer("Jane Doe")
				.with_address(DeliveryAddress {
					street: Some("Main Street".into()),
					house_number: Some("4".into()),
					city: Some("Springfield".into()),
				}),
		]
	}

	#[test]
	fn test_search_by_customer() {
		let orders = sample();
		let kept = apply(&orders, "smith", None, StatusTab::All);
		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].customer_name.as_deref(), Some("John Smith"));
	}

	#[test]
	fn test_search_fields() {
		let orders = sample();
		assert!(matches_search(&orders[0], "hc-00"));
		assert!(matches_search(&orders[0], "LASAGNA"));
		assert!(matches_search(&orders[1], "springfield"));
		assert!(matches_search(&orders[1], "main street 4"));
		assert!(!matches_search(&orders[1], "not specified"));
	}

	#[test]
	fn test_blank_search_is_noop() {
		let orders = sample();
		assert_eq!(apply(&orders, "  ", None, StatusTab::All).len(), orders.len());
	}

	#[test]
	fn test_date_filter_excludes_undated() {
		let orders = sample();
		let kept = apply(&orders, "", Some(date(1)), StatusTab::All);
		assert_eq!(kept.len(), 1);
		assert!(apply(&orders, "", Some(date(2)), StatusTab::All).is_empty());
	}

	#[test]
	fn test_status_tab() {
		let orders = sample();
		let kept = apply(&orders, "", None, StatusTab::Only(OrderStatus::Delivered));
		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].status, OrderStatus::Delivered);
	}
}
