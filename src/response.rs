//! Uniform result shape returned by every dispatched call.
//!
//! A [`CallResult`] is either a success or a failure, never both: [`Outcome`] carries the
//! shape-specific fields, and [`CallResult::is_error`] is derived from the variant rather
//! than stored beside it.

pub mod body;
pub mod normalize;

pub use body::*;
pub use normalize::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	transport::HttpResponse,
};

/// Timestamps bracketing a dispatched call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTimestamps {
	/// When the previous call on the same dispatcher started; absent for the first call.
	pub previous: Option<OffsetDateTime>,
	/// When this call started (after any rate-limit wait).
	pub current: OffsetDateTime,
}

/// Shape-specific part of a [`CallResult`].
#[derive(Debug)]
pub enum Outcome {
	/// Transport produced a non-error response.
	Success {
		/// Decoded body; absent when empty or not JSON.
		body: Option<Value>,
		/// Raw transport response.
		response: HttpResponse,
	},
	/// Transport reported a failure, with or without a response.
	Failure {
		/// Unwrapped error body.
		body: ErrorBody,
		/// Raw (possibly partial) transport response.
		response: Option<HttpResponse>,
		/// Originating transport failure.
		error: TransportError,
	},
}

/// Normalized outcome of one dispatched call.
#[derive(Debug)]
pub struct CallResult {
	/// HTTP status; absent when no response was received.
	pub status: Option<u16>,
	/// Previous and current call timestamps.
	pub timestamps: RequestTimestamps,
	/// Success or failure fields.
	pub outcome: Outcome,
}
impl CallResult {
	/// Whether the call failed (4xx/5xx status or no response).
	pub fn is_error(&self) -> bool {
		matches!(self.outcome, Outcome::Failure { .. })
	}

	/// Loose decode of the body, object keys in document order.
	///
	/// For failures this is the unwrapped `errors`/`error` value.
	pub fn body(&self) -> Option<&Value> {
		match &self.outcome {
			Outcome::Success { body, .. } => body.as_ref(),
			Outcome::Failure { body, .. } => body.value(),
		}
	}

	/// Strict decode of the same body into `T`, reporting the JSON path of any mismatch.
	pub fn body_as<T>(&self) -> Result<Option<T>, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		self.body().map(|value| serde_path_to_error::deserialize(value.clone())).transpose()
	}

	/// Unwrapped error body for failures.
	pub fn error_body(&self) -> Option<&ErrorBody> {
		match &self.outcome {
			Outcome::Failure { body, .. } => Some(body),
			Outcome::Success { .. } => None,
		}
	}

	/// Raw transport response, when one was received.
	pub fn response(&self) -> Option<&HttpResponse> {
		match &self.outcome {
			Outcome::Success { response, .. } => Some(response),
			Outcome::Failure { response, .. } => response.as_ref(),
		}
	}

	/// Originating transport failure, present only when [`CallResult::is_error`] holds.
	pub fn error(&self) -> Option<&TransportError> {
		match &self.outcome {
			Outcome::Failure { error, .. } => Some(error),
			Outcome::Success { .. } => None,
		}
	}
}
