//! Rate-limited, quota-aware request dispatch for CRM REST APIs.
//!
//! Every call goes through one path: the rate-limit gate, the injected transport, and a
//! normalizer that folds success and failure into a single result shape while call-quota
//! counters follow the response headers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod obs;
pub mod quota;
pub mod rate_limit;
pub mod response;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{ClientConfig, RateLimitConfig},
		dispatch::ReqwestDispatcher,
		transport::ReqwestHttpClient,
	};

	/// Builds a reqwest-backed dispatcher pointed at a mock server's base URL.
	pub fn build_reqwest_test_dispatcher(
		base_url: &str,
		rate_limit: RateLimitConfig,
	) -> ReqwestDispatcher {
		let config = ClientConfig::new(base_url).with_rate_limit(rate_limit);

		ReqwestDispatcher::with_http_client(config, ReqwestHttpClient::default())
			.expect("Failed to build reqwest test dispatcher.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
#[cfg(test)] use {color_eyre as _, httpmock as _};
