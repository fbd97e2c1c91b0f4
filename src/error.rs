//! Dispatcher-level error types.
//!
//! Only [`ConfigError`], [`RequestError`], and [`LookupError`] are ever raised to callers.
//! [`TransportError`] values never escape as faults; the dispatcher captures them inside
//! [`CallResult`](crate::response::CallResult) so success and failure share one inspection path.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied request could not be turned into an HTTP request.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Unknown quota family or counter.
	#[error(transparent)]
	Lookup(#[from] LookupError),
}

/// Configuration failures raised before any network activity.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No remote domain is configured.
	#[error("The CRM domain is not configured.")]
	MissingDomain,
	/// The configured domain cannot be turned into a base URL.
	#[error("The CRM domain `{domain}` is not a valid origin.")]
	InvalidDomain {
		/// Domain as configured.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A default header name or value is malformed.
	#[error("Default header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The runtime that drives blocking calls could not be started.
	#[error("Blocking runtime could not be started.")]
	RuntimeBuild {
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// A blocking call was made from inside an async runtime.
	#[error("Blocking calls cannot run inside an async runtime; await the dispatched call instead.")]
	BlockingInAsyncContext,
	/// An environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{var}` has an invalid value `{value}`.")]
	InvalidEnv {
		/// Variable name.
		var: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures turning a [`RestRequest`](crate::dispatch::RestRequest) into an HTTP request.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// Method is not a valid HTTP token.
	#[error("`{method}` is not a valid HTTP method.")]
	InvalidMethod {
		/// Method as supplied.
		method: String,
	},
	/// Extra header name or value is malformed.
	#[error("Request header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Path cannot be joined onto the base origin, or resolves outside it.
	#[error("Path `{path}` does not resolve inside the base origin.")]
	InvalidPath {
		/// Path as supplied.
		path: String,
		/// Underlying parsing failure; absent when the path parsed but left the origin.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Parameters could not be encoded as a JSON body.
	#[error("Request parameters could not be encoded.")]
	Encode(#[from] serde_json::Error),
	/// The HTTP request could not be assembled.
	#[error(transparent)]
	Build(#[from] http::Error),
}

/// Quota lookups that name something the tracker does not know.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LookupError {
	/// Counter name outside `left`, `made`, `limit`.
	#[error("Unknown quota counter `{key}`; expected one of left, made, limit.")]
	UnknownCounter {
		/// Requested counter name.
		key: String,
	},
	/// Family that was never registered with the tracker.
	#[error("Unknown quota family `{family}`.")]
	UnknownFamily {
		/// Requested family name.
		family: String,
	},
}

/// Transport-level failures captured inside a [`CallResult`](crate::response::CallResult).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Remote responded with a 4xx or 5xx status.
	#[error("Remote responded with HTTP status {status}.")]
	Status {
		/// Status code returned by the remote.
		status: u16,
	},
	/// Request timed out before a response arrived.
	#[error("Request to the CRM timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure (DNS, TCP, TLS, reset).
	#[error("Network error occurred while calling the CRM.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns the HTTP status carried by a [`TransportError::Status`].
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
