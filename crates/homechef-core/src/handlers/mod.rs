//! Handlers for the two kinds of work the desk does: refreshing the cached
//! board from the data source, and applying a user action to one order.

pub mod action;
pub mod refresh;

pub use action::{ActionError, ActionHandler};
pub use refresh::{RefreshError, RefreshHandler, RefreshSummary};
