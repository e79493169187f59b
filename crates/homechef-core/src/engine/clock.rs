//! Time source for the desk.
//!
//! Permission checks depend on "now"; the desk reads it through [`Clock`] so
//! tests can pin it.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
	now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
	pub fn new(now: DateTime<Utc>) -> Self {
		Self {
			now: RwLock::new(now),
		}
	}

	pub fn set(&self, now: DateTime<Utc>) {
		if let Ok(mut guard) = self.now.write() {
			*guard = now;
		}
	}

	pub fn advance(&self, by: Duration) {
		if let Ok(mut guard) = self.now.write() {
			*guard += by;
		}
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		match self.now.read() {
			Ok(guard) => *guard,
			Err(poisoned) => *poisoned.into_inner(),
		}
	}
}
