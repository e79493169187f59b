//! Cached state of the desk.
//!
//! The board holds the last good order list and the settings the desk knows
//! about. It is only replaced by fetched data and never edited in place.

pub mod board;

pub use board::{BoardSnapshot, OrderBoard};
