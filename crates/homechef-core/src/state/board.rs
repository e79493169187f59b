//! The order board: last good order list plus settings.

use chrono::{DateTime, Utc};
use homechef_types::{Order, OrderId, Settings};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Point-in-time copy of the board.
///
/// The order list is shared, so taking a snapshot does not copy orders.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
	pub orders: Arc<Vec<Order>>,
	pub settings: Option<Settings>,
	/// When the order list was last replaced; `None` before the first load.
	pub refreshed_at: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
	pub fn find(&self, order_id: &OrderId) -> Option<&Order> {
		self.orders.iter().find(|order| &order.id == order_id)
	}
}

#[derive(Debug, Default)]
pub struct OrderBoard {
	inner: RwLock<BoardSnapshot>,
}

impl OrderBoard {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn snapshot(&self) -> BoardSnapshot {
		self.inner.read().await.clone()
	}

	/// Replaces the whole order list.
	pub async fn replace_orders(&self, orders: Vec<Order>, at: DateTime<Utc>) {
		let mut board = self.inner.write().await;
		board.orders = Arc::new(orders);
		board.refreshed_at = Some(at);
	}

	pub async fn settings(&self) -> Option<Settings> {
		self.inner.read().await.settings
	}

	pub async fn set_settings(&self, settings: Option<Settings>) {
		self.inner.write().await.settings = settings;
	}

	pub async fn find(&self, order_id: &OrderId) -> Option<Order> {
		self.inner.read().await.find(order_id).cloned()
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.orders.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}
