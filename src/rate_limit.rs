//! Client-side call spacing.
//!
//! [`RateLimiter`] is a leaky bucket of one: it remembers when the previous call was
//! dispatched and, while enabled, asks the caller to wait until `cycle + buffer` has passed
//! since then. It does not queue or fair-share; the dispatcher holds it behind a mutex so
//! concurrent callers on one dispatcher are spaced one after another.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, config::RateLimitConfig};

/// Gate state plus the timestamp of the most recent dispatched call.
#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
	config: RateLimitConfig,
	last_request_at: Option<OffsetDateTime>,
}
impl RateLimiter {
	/// Creates a limiter from configuration; no call has been observed yet.
	pub fn new(config: RateLimitConfig) -> Self {
		Self { config, last_request_at: None }
	}

	/// Switches the gate on, optionally overriding the cycle and buffer.
	///
	/// Each override applies on its own; passing only a buffer keeps the current cycle.
	pub fn enable(&mut self, cycle_ms: Option<u64>, buffer_ms: Option<u64>) {
		self.config.enabled = true;

		if let Some(cycle_ms) = cycle_ms {
			self.config.cycle_ms = cycle_ms;
		}
		if let Some(buffer_ms) = buffer_ms {
			self.config.buffer_ms = buffer_ms;
		}
	}

	/// Switches the gate off. The last-request timestamp keeps being recorded.
	pub fn disable(&mut self) {
		self.config.enabled = false;
	}

	/// Whether the gate currently sleeps.
	pub fn is_enabled(&self) -> bool {
		self.config.enabled
	}

	/// Current configuration.
	pub fn config(&self) -> RateLimitConfig {
		self.config
	}

	/// Timestamp of the most recent dispatched call.
	pub fn last_request_at(&self) -> Option<OffsetDateTime> {
		self.last_request_at
	}

	/// Computes how long a call issued at `now` must wait, if at all.
	///
	/// Elapsed time is rounded to whole milliseconds before being compared with the cycle.
	/// The buffer is added on top of the remaining cycle, so a call made shortly after a full
	/// cycle still waits out the rest of the buffer.
	pub fn wait_for(&self, now: OffsetDateTime) -> Option<StdDuration> {
		if !self.config.enabled {
			return None;
		}

		let last = self.last_request_at?;
		let elapsed_ms = ((now - last).as_seconds_f64() * 1_000.).round() as i128;
		let wait_ms = i128::from(self.config.cycle_ms) - elapsed_ms.max(0)
			+ i128::from(self.config.buffer_ms);

		if wait_ms > 0 { Some(StdDuration::from_millis(wait_ms as u64)) } else { None }
	}

	/// Stores `now` as the last request time and returns the previous one.
	pub fn record(&mut self, now: OffsetDateTime) -> Option<OffsetDateTime> {
		self.last_request_at.replace(now)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::{Duration, macros::datetime};
	// self
	use super::*;

	const START: OffsetDateTime = datetime!(2025-01-01 00:00:00 UTC);

	fn limiter(cycle_ms: u64, buffer_ms: u64) -> RateLimiter {
		let config = RateLimitConfig::enabled().with_cycle_ms(cycle_ms).with_buffer_ms(buffer_ms);

		RateLimiter::new(config)
	}

	#[test]
	fn disabled_gate_never_waits() {
		let mut limiter = RateLimiter::default();

		assert!(!limiter.is_enabled());
		assert_eq!(limiter.record(START), None);
		assert_eq!(limiter.wait_for(START), None);
		assert_eq!(limiter.wait_for(START + Duration::milliseconds(1)), None);
	}

	#[test]
	fn first_call_never_waits() {
		let limiter = limiter(1_000, 100);

		assert_eq!(limiter.wait_for(START), None);
	}

	#[test]
	fn wait_covers_remaining_cycle_plus_buffer() {
		let mut limiter = limiter(1_000, 100);

		limiter.record(START);

		assert_eq!(
			limiter.wait_for(START + Duration::milliseconds(400)),
			Some(StdDuration::from_millis(700))
		);
		assert_eq!(
			limiter.wait_for(START + Duration::microseconds(399_600)),
			Some(StdDuration::from_millis(700)),
			"Elapsed time rounds to the nearest millisecond."
		);
	}

	#[test]
	fn buffer_extends_past_the_cycle() {
		let mut limiter = limiter(500, 100);

		limiter.record(START);

		assert_eq!(
			limiter.wait_for(START + Duration::milliseconds(550)),
			Some(StdDuration::from_millis(50))
		);
		assert_eq!(limiter.wait_for(START + Duration::milliseconds(600)), None);
		assert_eq!(limiter.wait_for(START + Duration::seconds(5)), None);
	}

	#[test]
	fn record_returns_previous_timestamp() {
		let mut limiter = RateLimiter::default();
		let later = START + Duration::seconds(1);

		assert_eq!(limiter.record(START), None);
		assert_eq!(limiter.record(later), Some(START));
		assert_eq!(limiter.last_request_at(), Some(later));
	}

	#[test]
	fn enable_applies_overrides_independently() {
		let mut limiter = RateLimiter::default();

		limiter.enable(None, Some(25));

		assert!(limiter.is_enabled());
		assert_eq!(limiter.config().cycle_ms, RateLimitConfig::DEFAULT_CYCLE_MS);
		assert_eq!(limiter.config().buffer_ms, 25);

		limiter.enable(Some(2_000), None);

		assert_eq!(limiter.config().cycle_ms, 2_000);
		assert_eq!(limiter.config().buffer_ms, 25);

		limiter.disable();

		assert!(!limiter.is_enabled());
	}
}
