//! Transport primitives for CRM REST calls.
//!
//! The dispatcher's only dependency on an HTTP stack is [`HttpTransport`]. Implementations
//! receive a fully built [`HttpRequest`] (method, absolute URI, merged headers, encoded
//! body) and resolve to either an [`HttpResponse`] or a [`TransportFailure`]. A failure may
//! carry whatever partial response was received so the dispatcher can still read quota
//! headers from it. Returning `Ok` for a 4xx/5xx response is allowed; the normalizer
//! classifies status failures on its own.

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration as StdDuration};
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{config::TransportOptions, error::ConfigError};

/// Request shape handed to transports.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response shape produced by transports.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportFailure>> + 'static + Send>>;

/// Abstraction over HTTP stacks capable of executing CRM REST calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back several
/// dispatcher clones, and the futures they return must own everything they need so the
/// dispatcher can hand them to callers as `'static` pending calls.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once a response (or failure) is known.
	fn execute(&self, request: HttpRequest) -> TransportFuture;
}

/// Transport-level failure, optionally carrying the partial response received.
#[derive(Debug)]
pub struct TransportFailure {
	/// Classified failure.
	pub error: TransportError,
	/// Response received before the failure, if any.
	pub response: Option<HttpResponse>,
}
impl TransportFailure {
	/// Failure where nothing came back from the remote.
	pub fn without_response(error: TransportError) -> Self {
		Self { error, response: None }
	}

	/// Failure that still produced (part of) a response.
	pub fn with_response(error: TransportError, response: HttpResponse) -> Self {
		Self { error, response: Some(response) }
	}
}
impl From<TransportError> for TransportFailure {
	fn from(error: TransportError) -> Self {
		Self::without_response(error)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the pass-through [`TransportOptions`].
	pub fn from_options(options: &TransportOptions) -> Result<Self> {
		let mut builder = ReqwestClient::builder();

		if let Some(ms) = options.timeout_ms {
			builder = builder.timeout(StdDuration::from_millis(ms));
		}
		if let Some(ms) = options.connect_timeout_ms {
			builder = builder.connect_timeout(StdDuration::from_millis(ms));
		}

		let client = builder.build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request).map_err(TransportError::from)?;
			let response = client.execute(request).await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let version = response.version();
			let mut response_new = HttpResponse::new(Vec::new());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;
			*response_new.version_mut() = version;

			match response.bytes().await {
				Ok(bytes) => {
					*response_new.body_mut() = bytes.to_vec();

					Ok(response_new)
				},
				Err(e) => Err(TransportFailure::with_response(e.into(), response_new)),
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn failures_keep_partial_responses() {
		let mut partial = HttpResponse::new(Vec::new());

		*partial.status_mut() = http::StatusCode::BAD_GATEWAY;

		let failure =
			TransportFailure::with_response(TransportError::Status { status: 502 }, partial);

		assert_eq!(failure.response.as_ref().map(|r| r.status().as_u16()), Some(502));

		let bare: TransportFailure = TransportError::Status { status: 503 }.into();

		assert!(bare.response.is_none());
	}
}
