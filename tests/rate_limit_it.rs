// std
use std::{
	sync::Arc,
	thread,
	time::{Duration, Instant},
};
// crates.io
use parking_lot::Mutex;
// self
use crm_dispatch::{
	config::{ClientConfig, RateLimitConfig},
	dispatch::{CallMode, Dispatcher, RestRequest},
	error::{ConfigError, Error},
	transport::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
};

#[derive(Default)]
struct RecordingTransport {
	calls: Mutex<Vec<(Instant, String)>>,
}
impl RecordingTransport {
	fn instants(&self) -> Vec<Instant> {
		self.calls.lock().iter().map(|(at, _)| *at).collect()
	}

	fn uris(&self) -> Vec<String> {
		self.calls.lock().iter().map(|(_, uri)| uri.clone()).collect()
	}
}
impl HttpTransport for RecordingTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture {
		self.calls.lock().push((Instant::now(), request.uri().to_string()));

		Box::pin(async { Ok(HttpResponse::new(br#"{"ok":true}"#.to_vec())) })
	}
}

fn build_dispatcher(
	rate_limit: RateLimitConfig,
) -> (Dispatcher<RecordingTransport>, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::default());
	let config = ClientConfig::new("acme.crm.example").with_rate_limit(rate_limit);
	let dispatcher = Dispatcher::<RecordingTransport>::with_http_client(config, transport.clone())
		.expect("Dispatcher should build.");

	(dispatcher, transport)
}

#[test]
fn enabled_limiter_spaces_consecutive_calls() {
	let (dispatcher, transport) =
		build_dispatcher(RateLimitConfig::enabled().with_cycle_ms(200).with_buffer_ms(0));

	for _ in 0..3 {
		let result =
			dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");

		assert!(!result.is_error());
	}

	let instants = transport.instants();

	assert_eq!(instants.len(), 3);

	for pair in instants.windows(2) {
		assert!(
			pair[1].duration_since(pair[0]) >= Duration::from_millis(180),
			"Calls should be spaced by at least the cycle."
		);
	}
}

#[test]
fn buffer_adds_to_the_spacing() {
	let (dispatcher, transport) =
		build_dispatcher(RateLimitConfig::enabled().with_cycle_ms(100).with_buffer_ms(150));

	dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");
	dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");

	let instants = transport.instants();

	assert!(instants[1].duration_since(instants[0]) >= Duration::from_millis(230));
}

#[test]
fn disabled_limiter_injects_no_delay() {
	let (dispatcher, transport) = build_dispatcher(RateLimitConfig::default().with_cycle_ms(2_000));
	let started = Instant::now();

	for _ in 0..5 {
		dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");
	}

	assert_eq!(transport.instants().len(), 5);
	assert!(started.elapsed() < Duration::from_millis(1_000));
	assert!(dispatcher.rate_limiter().last_request_at().is_some());
}

#[test]
fn toggling_the_limiter_at_runtime() {
	let (dispatcher, transport) = build_dispatcher(RateLimitConfig::default());

	dispatcher.call_blocking(RestRequest::get("a")).expect("Call should complete.");
	dispatcher.enable_rate_limit(Some(150), Some(0));
	dispatcher.call_blocking(RestRequest::get("b")).expect("Call should complete.");
	dispatcher.disable_rate_limit();

	let started = Instant::now();

	dispatcher.call_blocking(RestRequest::get("c")).expect("Call should complete.");

	let instants = transport.instants();

	assert!(instants[1].duration_since(instants[0]) >= Duration::from_millis(130));
	assert!(started.elapsed() < Duration::from_millis(130));
	assert_eq!(
		transport.uris(),
		[
			"https://acme.crm.example/a",
			"https://acme.crm.example/b",
			"https://acme.crm.example/c"
		]
	);
}

#[test]
fn concurrent_callers_share_one_gate() {
	let (dispatcher, transport) =
		build_dispatcher(RateLimitConfig::enabled().with_cycle_ms(150).with_buffer_ms(0));
	let handles = (0..3)
		.map(|_| {
			let dispatcher = dispatcher.clone();

			thread::spawn(move || {
				dispatcher.call_blocking(RestRequest::get("contacts")).map(|r| r.is_error())
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		let is_error = handle.join().expect("Caller thread should not panic.");

		assert_eq!(is_error.ok(), Some(false));
	}

	let mut instants = transport.instants();

	instants.sort();

	for pair in instants.windows(2) {
		assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(130));
	}
}

#[test]
fn missing_domain_is_raised_before_the_transport_runs() {
	let transport = Arc::new(RecordingTransport::default());
	let dispatcher = Dispatcher::<RecordingTransport>::with_http_client(
		ClientConfig::default(),
		transport.clone(),
	)
	.expect("Dispatcher should build without a domain.");
	let err = dispatcher
		.call_blocking(RestRequest::get("contacts"))
		.expect_err("Call without a domain should fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingDomain)));
	assert!(transport.instants().is_empty());
}

#[test]
fn timestamps_chain_between_calls() {
	let (dispatcher, _) = build_dispatcher(RateLimitConfig::default());
	let first =
		dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");
	let second =
		dispatcher.call_blocking(RestRequest::get("contacts")).expect("Call should complete.");

	assert_eq!(first.timestamps.previous, None);
	assert_eq!(second.timestamps.previous, Some(first.timestamps.current));
	assert_eq!(first.body().and_then(|b| b["ok"].as_bool()), Some(true));
}

#[test]
fn blocking_mode_returns_a_ready_result() {
	let (dispatcher, transport) = build_dispatcher(RateLimitConfig::default());
	let result = dispatcher
		.rest(RestRequest::get("contacts"), CallMode::Blocking)
		.expect("Call should complete.")
		.ready()
		.expect("Blocking mode should return a completed call.");

	assert_eq!(result.status, Some(200));
	assert_eq!(transport.instants().len(), 1);
}
