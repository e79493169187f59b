//! Periodic refresh of the order board.
//!
//! The poller refreshes immediately, then once per interval. Each refresh
//! runs to completion before the next tick is awaited; refreshes triggered
//! elsewhere queue behind it on the handler. Failures are logged by the
//! refresh handler and do not stop the loop.

use crate::handlers::RefreshHandler;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct RefreshPoller {
	handler: Arc<RefreshHandler>,
	interval: Duration,
}

impl RefreshPoller {
	pub fn new(handler: Arc<RefreshHandler>, interval: Duration) -> Self {
		Self { handler, interval }
	}

	/// Starts the loop on the current runtime.
	pub fn spawn(self) -> PollHandle {
		let interval_secs = self.interval.as_secs();
		let task = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(self.interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				// Errors are already logged and published by the handler.
				let _ = self.handler.handle().await;
			}
		});

		tracing::info!(interval_secs, "Started order polling");
		PollHandle { task: Some(task) }
	}
}

/// Stop hook for a running poller. Dropping the handle also stops it.
pub struct PollHandle {
	task: Option<JoinHandle<()>>,
}

impl PollHandle {
	pub fn stop(mut self) {
		self.abort();
	}

	pub fn is_running(&self) -> bool {
		self.task.as_ref().is_some_and(|task| !task.is_finished())
	}

	fn abort(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
			tracing::info!("Stopped order polling");
		}
	}
}

impl Drop for PollHandle {
	fn drop(&mut self) {
		self.abort();
	}
}
