//! Page slicing over grouped orders.
//!
//! Only real orders count toward the page size. A header is emitted in
//! front of every group that has members on the page, so a group split
//! across pages shows its header again on the next one.

use homechef_types::{GroupHeader, Order};

use crate::group::Group;

/// One rendered slot of a page before actions are attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<'a> {
	Header(GroupHeader),
	Order(&'a Order),
}

/// A page of slots plus the counts of the whole sequence.
#[derive(Debug, Clone)]
pub struct Page<'a> {
	pub slots: Vec<Slot<'a>>,
	pub total_count: usize,
	pub total_pages: usize,
}

/// Number of pages needed for `total` orders; zero when there are none.
pub fn total_pages(total: usize, page_size: usize) -> usize {
	if total == 0 || page_size == 0 {
		0
	} else {
		total.div_ceil(page_size)
	}
}

/// Cuts page `page` (1-based) out of `groups`.
///
/// A page past the end is empty but still reports the totals.
pub fn paginate<'a>(groups: &[Group<'a>], page: usize, page_size: usize) -> Page<'a> {
	let total_count: usize = groups.iter().map(|g| g.members.len()).sum();
	let start = page.saturating_sub(1).saturating_mul(page_size);
	let end = start.saturating_add(page_size).min(total_count);

	let mut slots = Vec::new();
	let mut offset = 0;
	for group in groups {
		let len = group.members.len();
		let (from, to) = (start.max(offset), end.min(offset + len));
		if from < to {
			if let Some(key) = &group.key {
				slots.push(Slot::Header(GroupHeader {
					key: key.clone(),
					count: len,
				}));
			}
			slots.extend(
				group.members[from - offset..to - offset]
					.iter()
					.map(|order| Slot::Order(*order)),
			);
		}
		offset += len;
		if offset >= end {
			break;
		}
	}

	Page {
		slots,
		total_count,
		total_pages: total_pages(total_count, page_size),
	}
}
