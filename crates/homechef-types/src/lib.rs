//! Common types module for the homechef order desk.
//!
//! This module defines the core data types shared by every desk component:
//! the normalized order model, settings, the caller session, list view
//! parameters and results, events, and configuration validation helpers.

/// API types for HTTP endpoints and error responses.
pub mod api;
/// Event types published by the desk engine.
pub mod events;
/// Normalization of loosely shaped API records into strict types.
pub mod normalize;
/// Order types including status, schedule, address and items.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Secure string type for auth tokens.
pub mod secret_string;
/// Caller session passed into every data source call.
pub mod session;
/// Chef-level settings gating time-bound order actions.
pub mod settings;
/// Utility functions for formatting and display.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;
/// List view parameters and processed view output.
pub mod view;

// Re-export all types for convenient access
pub use api::*;
pub use events::*;
pub use normalize::{
	normalize_orders, NormalizeError, OrderBatch, RawAddress, RawItem, RawOrder, RawSettings,
};
pub use order::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use session::{Role, Session};
pub use settings::Settings;
pub use utils::{format_price, truncate_id, NOT_SPECIFIED, UNKNOWN_AREA, UNKNOWN_CUSTOMER};
pub use validation::*;
pub use view::*;
