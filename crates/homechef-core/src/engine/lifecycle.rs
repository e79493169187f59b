//! Startup and shutdown of the order desk.

use super::{DeskError, OrderDesk};

impl OrderDesk {
	/// Loads the board once before polling starts.
	///
	/// A failed first load is not fatal: the desk serves an empty board and
	/// the poller keeps retrying.
	pub async fn initialize(&self) -> Result<(), DeskError> {
		tracing::info!(
			desk = %self.config.desk.id,
			role = %self.processor.role(),
			"Initializing order desk"
		);

		if let Err(e) = self.refresh().await {
			tracing::warn!(error = %e, "Initial refresh failed, starting with an empty board");
		}
		Ok(())
	}

	pub async fn shutdown(&self) -> Result<(), DeskError> {
		tracing::info!(desk = %self.config.desk.id, "Shutting down order desk");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::engine::{event_bus::EventBus, OrderDesk};
	use crate::test_utils::{clock, MockSource};
	use homechef_config::ConfigBuilder;
	use homechef_source::SourceError;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_initialize_tolerates_unreachable_source() {
		let mut source = MockSource::new();
		source
			.expect_fetch_orders()
			.returning(|_| Err(SourceError::Network("refused".into())));
		source
			.expect_fetch_default_settings()
			.returning(|_| Err(SourceError::Network("refused".into())));

		let desk = OrderDesk::new(
			ConfigBuilder::new().build(),
			Arc::new(source),
			clock(),
			EventBus::new(8),
		);
		desk.initialize().await.unwrap();
		assert!(desk.board().is_empty().await);
		desk.shutdown().await.unwrap();
	}
}
