//! API request handlers.

pub mod orders;
