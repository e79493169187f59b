//! Background tasks that keep the board current.

pub mod poller;

pub use poller::{PollHandle, RefreshPoller};
