//! Converts raw transport outcomes into [`CallResult`] values.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	response::{CallResult, ErrorBody, Outcome, RequestTimestamps, decode_json},
	transport::{HttpResponse, TransportFailure},
};

/// Normalizes whatever the transport produced.
///
/// An `Ok` response with a 4xx/5xx status is treated as a failure carrying that response.
pub fn normalize(
	outcome: Result<HttpResponse, TransportFailure>,
	timestamps: RequestTimestamps,
) -> CallResult {
	match outcome {
		Ok(response) if is_failure_status(&response) => {
			let error = TransportError::Status { status: response.status().as_u16() };

			normalize_failure(TransportFailure::with_response(error, response), timestamps)
		},
		Ok(response) => normalize_success(response, timestamps),
		Err(failure) => normalize_failure(failure, timestamps),
	}
}

/// Success path: decode the body and keep the raw response.
pub fn normalize_success(response: HttpResponse, timestamps: RequestTimestamps) -> CallResult {
	let status = Some(response.status().as_u16());
	let body = decode_json(response.body());

	CallResult { status, timestamps, outcome: Outcome::Success { body, response } }
}

/// Error path: unwrap `errors`/`error` from whatever response came back.
pub fn normalize_failure(failure: TransportFailure, timestamps: RequestTimestamps) -> CallResult {
	let TransportFailure { error, response } = failure;
	let status = response.as_ref().map(|r| r.status().as_u16());
	let body = ErrorBody::from_decoded(response.as_ref().and_then(|r| decode_json(r.body())));

	CallResult { status, timestamps, outcome: Outcome::Failure { body, response, error } }
}

fn is_failure_status(response: &HttpResponse) -> bool {
	let status = response.status();

	status.is_client_error() || status.is_server_error()
}
