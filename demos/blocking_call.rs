//! Sends two rate-limited blocking calls through the default reqwest transport and reads the
//! quota headers the mock CRM returns.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use crm_dispatch::{
	config::{ClientConfig, Credentials, RateLimitConfig},
	dispatch::{ReqwestDispatcher, RestRequest},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start();
	let contacts_mock = server.mock(|when, then| {
		when.method(GET).path("/api/v2/contacts").query_param("page", "1");
		then.status(200)
			.header("content-type", "application/json")
			.header("x-ratelimit-remaining", "1998")
			.header("x-ratelimit-limit", "2000")
			.body(r#"{"contacts":[{"id":1,"name":"Ada Lovelace"}]}"#);
	});
	let config = ClientConfig::new(server.url("/api/v2"))
		.with_credentials(Credentials::bearer("demo-token"))
		.with_rate_limit(RateLimitConfig::enabled().with_cycle_ms(250).with_buffer_ms(50));
	let dispatcher = ReqwestDispatcher::new(config)?;

	for _ in 0..2 {
		let result = dispatcher.call_blocking(RestRequest::get("contacts").with_param("page", 1))?;

		println!(
			"Status {:?} at {}, body {}.",
			result.status,
			result.timestamps.current,
			result.body().map(ToString::to_string).unwrap_or_default()
		);
	}

	println!("Quota after the calls: {:?}.", dispatcher.quota());

	contacts_mock.assert_hits(2);

	Ok(())
}
