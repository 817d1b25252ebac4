//! Time source abstraction so expiry arithmetic stays deterministic in tests.

// self
use crate::_prelude::*;

/// Supplies the current instant for all expiry decisions.
///
/// The lifecycle manager never reads the system clock directly; it consults an injected
/// implementation of this trait instead, so tests can move time without sleeping.
pub trait Clock: Send + Sync + 'static {
	/// Returns the current wall-clock instant.
	fn now(&self) -> OffsetDateTime;
}

/// Real system clock used in production.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Settable clock for deterministic tests.
///
/// Shared freely behind an [`Arc`]; `set`/`advance` take effect for every holder
/// immediately.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at the provided instant.
	pub fn new(start: OffsetDateTime) -> Self {
		Self(Mutex::new(start))
	}

	/// Moves the clock to an absolute instant.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}

	/// Advances the clock by a relative duration.
	pub fn advance(&self, delta: Duration) {
		let mut now = self.0.lock();

		*now += delta;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn manual_clock_advances_and_resets() {
		let start = macros::datetime!(2025-06-01 12:00 UTC);
		let clock = ManualClock::new(start);

		assert_eq!(clock.now(), start);

		clock.advance(Duration::minutes(90));

		assert_eq!(clock.now(), macros::datetime!(2025-06-01 13:30 UTC));

		clock.set(start);

		assert_eq!(clock.now(), start);
	}
}
