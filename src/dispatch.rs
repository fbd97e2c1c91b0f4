//! The single call path: gate, send, normalize, and account for quota.

pub mod pending;
pub mod request;

pub use pending::*;
pub use request::*;

// std
use std::{sync::OnceLock, thread};
// crates.io
use http::HeaderMap;
use tokio::runtime::{Builder as RuntimeBuilder, Handle, Runtime};
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::ConfigError,
	obs::{self, CallOutcome, CallSpan},
	quota::{Quota, QuotaTracker, REST_FAMILY},
	rate_limit::RateLimiter,
	response::{CallResult, RequestTimestamps, normalize},
	transport::HttpTransport,
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Dispatcher specialized for the crate's default reqwest transport.
pub type ReqwestDispatcher = Dispatcher<ReqwestHttpClient>;

/// Rate-limited, quota-aware client for one CRM instance.
///
/// The dispatcher owns its rate limiter and quota tracker. Clones share both (plus the
/// transport and the lazily built blocking runtime), so every clone behaves as the same
/// logical client: calls made through any of them are spaced by one gate and counted
/// against one quota.
pub struct Dispatcher<T>
where
	T: ?Sized + HttpTransport,
{
	http_client: Arc<T>,
	config: Arc<ClientConfig>,
	default_headers: Arc<HeaderMap>,
	limiter: Arc<Mutex<RateLimiter>>,
	quota: Arc<QuotaTracker>,
	runtime: Arc<BlockingRuntime>,
}
impl<T> Dispatcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a dispatcher that reuses the caller-provided transport.
	///
	/// Default headers (including credentials) are rendered once here. The domain is not
	/// checked until a call is dispatched.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<T>>) -> Result<Self> {
		let default_headers = config.default_header_map()?;
		let limiter = RateLimiter::new(config.rate_limit);
		let quota = QuotaTracker::new(config.quota.clone());

		Ok(Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			default_headers: Arc::new(default_headers),
			limiter: Arc::new(Mutex::new(limiter)),
			quota: Arc::new(quota),
			runtime: Default::default(),
		})
	}

	/// Configuration the dispatcher was built from.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Transport every call is delegated to.
	pub fn http_client(&self) -> &T {
		&self.http_client
	}

	/// Dispatches `request` and returns a handle that completes the call when awaited.
	///
	/// The rate-limit gate runs first and may block the calling thread. Configuration and
	/// request-building problems are returned here, before the transport is invoked.
	/// Transport failures never surface as `Err`; they are captured in the [`CallResult`].
	pub fn dispatch(&self, request: RestRequest) -> Result<PendingCall> {
		let timestamps = self.gate();
		let origin = self.config.origin()?;
		let http_request = request.to_http(&origin, &self.default_headers)?;

		obs::log_request(
			http_request.method(),
			http_request.uri(),
			http_request.headers(),
			request.params.as_ref(),
		);
		obs::record_call_outcome(CallOutcome::Attempt);

		let span = CallSpan::new(http_request.method(), &request.path);
		let execution = self.http_client.execute(http_request);
		let quota = self.quota.clone();

		Ok(PendingCall::new(span.instrument(async move {
			let outcome = execution.await;
			let response = match &outcome {
				Ok(response) => Some(response),
				Err(failure) => failure.response.as_ref(),
			};

			if let Some(response) = response {
				quota.update(REST_FAMILY, response.headers());
			}

			let result = normalize(outcome, timestamps);
			let label = if result.is_error() { CallOutcome::Failure } else { CallOutcome::Success };

			obs::log_response(label, result.status, result.body());
			obs::record_call_outcome(label);

			result
		})))
	}

	/// Dispatches `request` and waits for the result on the calling thread.
	///
	/// Drives the call on a current-thread runtime built on first use. Inside an async
	/// runtime this returns [`ConfigError::BlockingInAsyncContext`] before the gate runs;
	/// await [`Dispatcher::dispatch`] there instead.
	pub fn call_blocking(&self, request: RestRequest) -> Result<CallResult> {
		if Handle::try_current().is_ok() {
			return Err(ConfigError::BlockingInAsyncContext.into());
		}

		let pending = self.dispatch(request)?;

		Ok(self.runtime.get()?.block_on(pending))
	}

	/// Dispatches `request` in the chosen mode.
	pub fn rest(&self, request: RestRequest, mode: CallMode) -> Result<Dispatched> {
		match mode {
			CallMode::Blocking =>
				self.call_blocking(request).map(|result| Dispatched::Ready(Box::new(result))),
			CallMode::Async => self.dispatch(request).map(Dispatched::Pending),
		}
	}

	/// Current REST quota counters.
	pub fn quota(&self) -> Quota {
		self.quota
			.get(REST_FAMILY)
			.unwrap_or_else(|_| Quota::with_limit(self.config.quota.default_limit))
	}

	/// Single REST quota counter: `left`, `made`, or `limit`.
	pub fn quota_counter(&self, key: &str) -> Result<u64> {
		Ok(self.quota.counter(REST_FAMILY, key)?)
	}

	/// Shared quota tracker.
	pub fn quota_tracker(&self) -> &QuotaTracker {
		&self.quota
	}

	/// Snapshot of the rate limiter.
	pub fn rate_limiter(&self) -> RateLimiter {
		self.limiter.lock().clone()
	}

	/// Switches the gate on, optionally overriding the cycle and buffer.
	pub fn enable_rate_limit(&self, cycle_ms: Option<u64>, buffer_ms: Option<u64>) {
		self.limiter.lock().enable(cycle_ms, buffer_ms);
	}

	/// Switches the gate off.
	pub fn disable_rate_limit(&self) {
		self.limiter.lock().disable();
	}

	/// Whether calls are currently spaced.
	pub fn is_rate_limited(&self) -> bool {
		self.limiter.lock().is_enabled()
	}

	// Wait check, sleep, and timestamp update share one lock so concurrent callers queue.
	fn gate(&self) -> RequestTimestamps {
		let mut limiter = self.limiter.lock();

		if let Some(wait) = limiter.wait_for(OffsetDateTime::now_utc()) {
			obs::log_rate_limited(wait);
			obs::record_rate_limited(wait);

			thread::sleep(wait);
		}

		let current = OffsetDateTime::now_utc();
		let previous = limiter.record(current);

		RequestTimestamps { previous, current }
	}
}
#[cfg(feature = "reqwest")]
impl Dispatcher<ReqwestHttpClient> {
	/// Creates a dispatcher backed by a reqwest client honoring the configured transport
	/// options.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_options(&config.transport)?;

		Self::with_http_client(config, http_client)
	}
}
// Shut down in the background: the last clone may be dropped inside async code.
#[derive(Debug, Default)]
struct BlockingRuntime(OnceLock<Runtime>);
impl BlockingRuntime {
	fn get(&self) -> Result<&Runtime, ConfigError> {
		if let Some(runtime) = self.0.get() {
			return Ok(runtime);
		}

		let runtime = RuntimeBuilder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|source| ConfigError::RuntimeBuild { source })?;

		Ok(self.0.get_or_init(|| runtime))
	}
}
impl Drop for BlockingRuntime {
	fn drop(&mut self) {
		if let Some(runtime) = self.0.take() {
			runtime.shutdown_background();
		}
	}
}

impl<T> Clone for Dispatcher<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			default_headers: self.default_headers.clone(),
			limiter: self.limiter.clone(),
			quota: self.quota.clone(),
			runtime: self.runtime.clone(),
		}
	}
}
impl<T> Debug for Dispatcher<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("domain", &self.config.domain)
			.field("credentials_set", &self.config.credentials.is_some())
			.field("rate_limiter", &*self.limiter.lock())
			.field("quota", &self.quota())
			.finish()
	}
}
