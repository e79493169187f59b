//! Utility functions for display formatting.
//!
//! This module provides the placeholders and formatting helpers used when
//! orders are shown to users or written to logs.

pub mod constants;
pub mod formatting;

pub use constants::{NOT_SPECIFIED, UNKNOWN_AREA, UNKNOWN_CUSTOMER};
pub use formatting::{format_price, truncate_id};
