//! Dispatches calls without blocking, awaits them together, and inspects a failed call.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use crm_dispatch::{
	config::{ClientConfig, Credentials},
	dispatch::{ReqwestDispatcher, RestRequest},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/deals").json_body_includes(r#"{"title":"Renewal"}"#);
			then.status(201)
				.header("content-type", "application/json")
				.header("x-ratelimit-remaining", "41")
				.header("x-ratelimit-limit", "50")
				.body(r#"{"id":9007199254740993,"title":"Renewal"}"#);
		})
		.await;
	let missing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/deals/404");
			then.status(404)
				.header("content-type", "application/json")
				.body(r#"{"error":"Deal not found"}"#);
		})
		.await;
	let dispatcher = ReqwestDispatcher::new(
		ClientConfig::new(server.base_url()).with_credentials(Credentials::basic("api-key", "X")),
	)?;
	let create = dispatcher.dispatch(RestRequest::post("deals").with_param("title", "Renewal"))?;
	let missing = dispatcher.dispatch(RestRequest::get("deals/404"))?;
	let (created, failed) = tokio::join!(create, missing);

	println!(
		"Created deal {:?}.",
		created.body().and_then(|body| body.get("id")).map(ToString::to_string)
	);
	println!(
		"Lookup failed: {} ({:?}, {:?}).",
		failed.is_error(),
		failed.error().map(ToString::to_string),
		failed.error_body()
	);
	println!("Quota: {:?}.", dispatcher.quota());

	create_mock.assert_async().await;
	missing_mock.assert_async().await;

	Ok(())
}
