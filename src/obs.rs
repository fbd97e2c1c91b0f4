//! Optional observability helpers for dispatched calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every pending call in a `crm_dispatch.call` span with `method`
//!   and `path` fields, and to emit request, response, and limiter events under the
//!   `crm_dispatch` target.
//! - Enable `metrics` to increment `crm_dispatch_call_total` for every
//!   attempt/success/failure (labeled by `outcome`). Whenever the gate sleeps it also
//!   increments `crm_dispatch_rate_limit_wait_total` and records the sleep in the
//!   `crm_dispatch_rate_limit_wait_seconds` histogram.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Target every log event is emitted under.
pub const LOG_TARGET: &str = "crm_dispatch";

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Request handed to the transport.
	Attempt,
	/// Normalized into a success.
	Success,
	/// Normalized into a failure.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
