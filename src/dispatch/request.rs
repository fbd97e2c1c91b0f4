//! Caller-facing request description and its translation into an HTTP request.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE, PROXY_AUTHORIZATION},
};
// self
use crate::{_prelude::*, error::RequestError, transport::HttpRequest};

/// One REST call: verb, relative path, optional parameters, and extra headers.
///
/// Parameters become the query string for `GET` and `HEAD` and a JSON body for every other
/// verb. Extra headers replace defaults of the same name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestRequest {
	/// HTTP verb, case-insensitive.
	pub method: String,
	/// Path relative to the configured origin.
	pub path: String,
	/// Query or body parameters.
	pub params: Option<Map<String, Value>>,
	/// Extra headers for this call only.
	pub headers: Vec<(String, String)>,
}
impl RestRequest {
	/// Creates a request with no parameters or extra headers.
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self { method: method.into(), path: path.into(), params: None, headers: Vec::new() }
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new("GET", path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new("POST", path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new("PUT", path)
	}

	/// `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new("PATCH", path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new("DELETE", path)
	}

	/// Replaces the parameter object.
	pub fn with_params(mut self, params: Map<String, Value>) -> Self {
		self.params = Some(params);

		self
	}

	/// Adds or replaces a single parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.get_or_insert_with(Map::new).insert(name.into(), value.into());

		self
	}

	/// Adds a header for this call only.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Parses the verb, uppercasing it first.
	pub fn http_method(&self) -> Result<Method, RequestError> {
		Method::from_bytes(self.method.trim().to_ascii_uppercase().as_bytes())
			.map_err(|_| RequestError::InvalidMethod { method: self.method.clone() })
	}

	/// Joins the path onto `origin`, refusing anything that lands outside it.
	///
	/// Absolute URLs, a different scheme, host, or port, and `..` segments climbing above the
	/// origin's path prefix all fail with [`RequestError::InvalidPath`], so default headers
	/// (credentials included) only ever travel to the configured CRM.
	pub fn resolve(&self, origin: &Url) -> Result<Url, RequestError> {
		let url = origin.join(self.path.trim_start_matches('/')).map_err(|source| {
			RequestError::InvalidPath { path: self.path.clone(), source: Some(source) }
		})?;

		if url.origin() != origin.origin() || !url.path().starts_with(origin.path()) {
			return Err(RequestError::InvalidPath { path: self.path.clone(), source: None });
		}

		Ok(url)
	}

	/// Builds the HTTP request sent to the transport.
	pub fn to_http(&self, origin: &Url, defaults: &HeaderMap) -> Result<HttpRequest, RequestError> {
		let method = self.http_method()?;
		let mut url = self.resolve(origin)?;
		let mut headers = defaults.clone();
		let body = match &self.params {
			Some(params) if method == Method::GET || method == Method::HEAD => {
				append_query(&mut url, params);

				Vec::new()
			},
			Some(params) => {
				headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

				serde_json::to_vec(params)?
			},
			None => Vec::new(),
		};

		for (name, value) in &self.headers {
			let invalid = || RequestError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let mut header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			if header_name == AUTHORIZATION || header_name == PROXY_AUTHORIZATION {
				header_value.set_sensitive(true);
			}

			headers.insert(header_name, header_value);
		}

		let mut request = http::Request::builder().method(method).uri(url.as_str()).body(body)?;

		*request.headers_mut() = headers;

		Ok(request)
	}
}

fn append_query(url: &mut Url, params: &Map<String, Value>) {
	let pairs = params
		.iter()
		.flat_map(|(name, value)| match value {
			Value::Array(items) => items.iter().map(|item| (name, item)).collect::<Vec<_>>(),
			other => vec![(name, other)],
		})
		.filter_map(|(name, value)| query_value(value).map(|value| (name, value)))
		.collect::<Vec<_>>();

	// An empty serializer would still leave a bare `?` behind.
	if pairs.is_empty() {
		return;
	}

	url.query_pairs_mut().extend_pairs(pairs);
}

fn query_value(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn origin() -> Url {
		Url::parse("https://acme.crm.example/api/v2/").expect("Origin fixture should parse.")
	}

	#[test]
	fn get_params_become_the_query_string() {
		let request = RestRequest::get("/contacts")
			.with_param("page", 2)
			.with_param("q", "ada lovelace")
			.with_param("tag", json!(["vip", "new"]))
			.to_http(&origin(), &HeaderMap::new())
			.expect("Request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.uri().to_string(),
			"https://acme.crm.example/api/v2/contacts?page=2&q=ada+lovelace&tag=vip&tag=new"
		);
		assert!(request.body().is_empty());
		assert!(request.headers().get(CONTENT_TYPE).is_none());
	}

	#[test]
	fn other_verbs_send_a_json_body() {
		let request = RestRequest::new("post", "contacts")
			.with_param("name", "x")
			.with_param("id", 1)
			.to_http(&origin(), &HeaderMap::new())
			.expect("Request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri().to_string(), "https://acme.crm.example/api/v2/contacts");
		assert_eq!(request.body().as_slice(), br#"{"name":"x","id":1}"#);
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some("application/json")
		);
	}

	#[test]
	fn extra_headers_override_defaults_and_hide_credentials() {
		let mut defaults = HeaderMap::new();

		defaults.insert("x-tenant", HeaderValue::from_static("a"));

		let request = RestRequest::delete("contacts/1")
			.with_header("X-Tenant", "b")
			.with_header("Authorization", "Bearer per-call")
			.to_http(&origin(), &defaults)
			.expect("Request should build.");
		let headers = request.headers();

		assert_eq!(headers.get("x-tenant").and_then(|v| v.to_str().ok()), Some("b"));
		assert!(headers.get(AUTHORIZATION).is_some_and(HeaderValue::is_sensitive));
		assert!(!format!("{headers:?}").contains("per-call"));
	}

	#[test]
	fn malformed_requests_are_rejected() {
		let err = RestRequest::new("GE T", "contacts")
			.to_http(&origin(), &HeaderMap::new())
			.expect_err("Invalid method should fail.");

		assert!(matches!(err, RequestError::InvalidMethod { .. }));

		let err = RestRequest::get("contacts")
			.with_header("bad header", "x")
			.to_http(&origin(), &HeaderMap::new())
			.expect_err("Invalid header should fail.");

		assert!(matches!(err, RequestError::InvalidHeader { name } if name == "bad header"));
	}

	#[test]
	fn null_params_are_left_out_of_the_query() {
		let request = RestRequest::get("contacts")
			.with_param("owner", Value::Null)
			.with_param("tag", json!(["vip", null]))
			.to_http(&origin(), &HeaderMap::new())
			.expect("Request should build.");

		assert_eq!(request.uri().to_string(), "https://acme.crm.example/api/v2/contacts?tag=vip");

		let request = RestRequest::get("contacts")
			.with_param("owner", Value::Null)
			.to_http(&origin(), &HeaderMap::new())
			.expect("Request should build.");

		assert_eq!(request.uri().to_string(), "https://acme.crm.example/api/v2/contacts");
	}

	#[test]
	fn paths_are_confined_to_the_origin() {
		for path in [
			"https://attacker.example/steal",
			"http://acme.crm.example/api/v2/contacts",
			"../../admin",
			"contacts/../../../v1/users",
		] {
			let err = RestRequest::get(path)
				.resolve(&origin())
				.expect_err("Paths outside the origin should fail.");
			let RequestError::InvalidPath { path: rejected, source } = &err else {
				panic!("Unexpected error for `{path}`: {err:?}.");
			};

			assert_eq!(rejected, path);
			assert!(source.is_none());
		}

		let url = RestRequest::get("contacts/../deals")
			.resolve(&origin())
			.expect("Paths staying under the prefix should resolve.");

		assert_eq!(url.as_str(), "https://acme.crm.example/api/v2/deals");
	}
}
