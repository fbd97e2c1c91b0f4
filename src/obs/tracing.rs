// std
use std::time::Duration as StdDuration;
// crates.io
use http::{HeaderMap, Method};
// self
use crate::{_prelude::*, obs::CallOutcome};
#[cfg(feature = "tracing")] use crate::obs::LOG_TARGET;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span covering one dispatched call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a span tagged with the request method and path.
	pub fn new(method: &Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				target: LOG_TARGET,
				"crm_dispatch.call",
				method = method.as_str(),
				path
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs an outgoing request. Sensitive header values print as `Sensitive`.
pub fn log_request(
	method: &Method,
	uri: &http::Uri,
	headers: &HeaderMap,
	params: Option<&Map<String, Value>>,
) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			target: LOG_TARGET,
			method = method.as_str(),
			%uri,
			?headers,
			?params,
			"Sending request."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, uri, headers, params);
	}
}

/// Logs a normalized response.
pub fn log_response(outcome: CallOutcome, status: Option<u16>, body: Option<&Value>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			target: LOG_TARGET,
			outcome = outcome.as_str(),
			?status,
			?body,
			"Received response."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, status, body);
	}
}

/// Logs a rate-limiter hit before the calling thread sleeps.
pub fn log_rate_limited(wait: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(
			target: LOG_TARGET,
			wait_ms = wait.as_millis() as u64,
			"Rate limit reached; waiting before the next call."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = wait;
	}
}
