//! Shared fixtures for engine tests.

use crate::engine::clock::FixedClock;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use homechef_source::{OrderSourceInterface, SourceError};
use homechef_types::{
	ConfigSchema, Order, OrderBatch, OrderId, OrderStatus, Role, SecretString, Session,
	Settings, ValidationError,
};
use std::sync::Arc;

mockall::mock! {
	pub Source {}

	#[async_trait]
	impl OrderSourceInterface for Source {
		fn config_schema(&self) -> Box<dyn ConfigSchema>;
		async fn fetch_orders(&self, session: &Session) -> Result<OrderBatch, SourceError>;
		async fn fetch_default_settings(&self, session: &Session) -> Result<Settings, SourceError>;
		async fn update_order_status(
			&self,
			session: &Session,
			order_id: &OrderId,
			status: OrderStatus,
		) -> Result<(), SourceError>;
	}
}

pub struct AnySchema;

impl ConfigSchema for AnySchema {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		Ok(())
	}
}

pub fn noon() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn clock() -> Arc<FixedClock> {
	Arc::new(FixedClock::new(noon()))
}

pub fn chef_session() -> Session {
	Session::new("7", Role::Chef, SecretString::from("token"))
}

/// A pending order placed `minutes_ago` minutes before noon.
pub fn pending(id: u64, minutes_ago: i64) -> Order {
	Order::new(id, OrderStatus::Pending)
		.with_created_at(noon() - chrono::Duration::minutes(minutes_ago))
}
