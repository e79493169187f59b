//! Core engine of the homechef order desk.
//!
//! Connects a data source to the list processor: keeps a cached board of the
//! last good order list and settings, refreshes it periodically, applies
//! user actions after checking them against the board, and publishes every
//! outcome as a [`homechef_types::DeskEvent`].

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod monitoring;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::{BuilderError, DeskBuilder, DeskFactories};
pub use engine::clock::{Clock, FixedClock, SystemClock};
pub use engine::event_bus::EventBus;
pub use engine::{DeskError, OrderDesk};
pub use handlers::{ActionError, RefreshError, RefreshSummary};
pub use monitoring::PollHandle;
pub use state::{BoardSnapshot, OrderBoard};
