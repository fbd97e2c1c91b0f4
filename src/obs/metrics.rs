// std
use std::time::Duration as StdDuration;
// self
use crate::obs::CallOutcome;

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("crm_dispatch_call_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Records a gate hit and how long the caller was held back.
pub fn record_rate_limited(wait: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("crm_dispatch_rate_limit_wait_total").increment(1);
		metrics::histogram!("crm_dispatch_rate_limit_wait_seconds").record(wait.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = wait;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_installed_recorder() {
		record_call_outcome(CallOutcome::Attempt);
		record_rate_limited(StdDuration::from_millis(10));
	}
}
