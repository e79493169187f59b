//! Broadcast channel for desk events.
//!
//! Publishing never waits on listeners. A listener that falls more than
//! `capacity` events behind skips the oldest ones.

use homechef_types::DeskEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<DeskEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
		self.sender.subscribe()
	}

	/// Sends `event` to every current subscriber.
	///
	/// Fails only when nobody is listening; callers usually ignore that.
	pub fn publish(
		&self,
		event: DeskEvent,
	) -> Result<usize, broadcast::error::SendError<DeskEvent>> {
		self.sender.send(event)
	}
}
