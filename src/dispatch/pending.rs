//! Call handles returned by the dispatcher.

// std
use std::task::{Context, Poll};
// self
use crate::{_prelude::*, response::CallResult};

/// In-flight call whose normalization and quota update run when it is polled to completion.
///
/// The handle owns everything it needs, so it can be moved to another task or thread.
pub struct PendingCall {
	inner: Pin<Box<dyn Future<Output = CallResult> + 'static + Send>>,
}
impl PendingCall {
	pub(crate) fn new<F>(fut: F) -> Self
	where
		F: 'static + Send + Future<Output = CallResult>,
	{
		Self { inner: Box::pin(fut) }
	}
}
impl Future for PendingCall {
	type Output = CallResult;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.inner.as_mut().poll(cx)
	}
}
impl Debug for PendingCall {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PendingCall(..)")
	}
}

/// How [`Dispatcher::rest`](crate::dispatch::Dispatcher::rest) hands back a call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
	/// Wait for the round trip on the calling thread.
	#[default]
	Blocking,
	/// Return a [`PendingCall`] immediately after the gate.
	Async,
}

/// Result of [`Dispatcher::rest`](crate::dispatch::Dispatcher::rest).
#[derive(Debug)]
pub enum Dispatched {
	/// Blocking mode: the call already completed.
	Ready(Box<CallResult>),
	/// Async mode: the call completes when awaited.
	Pending(PendingCall),
}
impl Dispatched {
	/// Resolves either variant into the final result.
	pub async fn into_result(self) -> CallResult {
		match self {
			Self::Ready(result) => *result,
			Self::Pending(pending) => pending.await,
		}
	}

	/// Completed result, if the call ran in blocking mode.
	pub fn ready(self) -> Option<CallResult> {
		match self {
			Self::Ready(result) => Some(*result),
			Self::Pending(_) => None,
		}
	}

	/// Pending handle, if the call ran in async mode.
	pub fn pending(self) -> Option<PendingCall> {
		match self {
			Self::Pending(pending) => Some(pending),
			Self::Ready(_) => None,
		}
	}
}
