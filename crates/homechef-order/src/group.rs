//! Bucketing of the sorted list under group headers.

use homechef_types::{GroupKey, Order};
use std::collections::BTreeMap;

/// A run of orders sharing one group key.
///
/// `key` is `None` only for the single implicit group of an ungrouped view,
/// which renders without a header.
#[derive(Debug, Clone)]
pub struct Group<'a> {
	pub key: Option<String>,
	pub members: Vec<&'a Order>,
}

/// Derives the group label of an order.
pub fn group_label(order: &Order, key: GroupKey) -> Option<String> {
	match key {
		GroupKey::None => None,
		GroupKey::Area => Some(order.display_area().to_string()),
		GroupKey::Status => Some(order.status.as_str().to_string()),
		GroupKey::DeliveryDate => Some(order.display_delivery_date()),
		GroupKey::CustomerName => Some(order.display_customer().to_string()),
	}
}

/// Splits `sorted` into groups ordered by ascending label.
///
/// Labels compare case-insensitively, with the exact label as tie-break.
/// Members keep their relative order from `sorted`.
pub fn group_orders<'a>(sorted: Vec<&'a Order>, key: GroupKey) -> Vec<Group<'a>> {
	if key == GroupKey::None {
		if sorted.is_empty() {
			return Vec::new();
		}
		return vec![Group {
			key: None,
			members: sorted,
		}];
	}

	let mut buckets: BTreeMap<(String, String), Vec<&'a Order>> = BTreeMap::new();
	for order in sorted {
		let label = group_label(order, key).unwrap_or_default();
		buckets
			.entry((label.to_lowercase(), label))
			.or_default()
			.push(order);
	}

	buckets
		.into_iter()
		.map(|((_, label), members)| Group {
			key: Some(label),
			members,
		})
		.collect()
}
