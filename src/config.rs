//! Client configuration: remote domain, credentials, default headers, pass-through transport
//! options, rate limiting, and quota header names.
//!
//! Every section deserializes with defaults so a partial TOML/JSON document (or the
//! environment via [`ClientConfig::from_env`]) is enough. The domain is optional here on
//! purpose: a missing domain is reported when a call is dispatched, never at construction.

pub mod secret;

pub use secret::ApiSecret;

// std
use std::env;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use http::{
	HeaderMap, HeaderName, HeaderValue,
	header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("crm-dispatch/", env!("CARGO_PKG_VERSION"));

/// Credential merged into the default `Authorization` header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
	/// `Authorization: Bearer <token>`.
	Bearer {
		/// API token.
		token: ApiSecret,
	},
	/// `Authorization: Basic base64(<username>:<password>)`.
	Basic {
		/// Account name or API key, depending on the CRM.
		username: String,
		/// Password or placeholder paired with the username.
		password: ApiSecret,
	},
}
impl Credentials {
	/// Builds bearer-token credentials.
	pub fn bearer(token: impl Into<String>) -> Self {
		Self::Bearer { token: ApiSecret::new(token) }
	}

	/// Builds HTTP basic credentials.
	pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self::Basic { username: username.into(), password: ApiSecret::new(password) }
	}

	/// Renders the `Authorization` header value, marked sensitive.
	pub fn header_value(&self) -> Result<HeaderValue, ConfigError> {
		let raw = match self {
			Self::Bearer { token } => format!("Bearer {}", token.expose()),
			Self::Basic { username, password } => {
				let pair = format!("{username}:{}", password.expose());

				format!("Basic {}", STANDARD.encode(pair))
			},
		};
		let mut value = HeaderValue::from_str(&raw)
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);

		Ok(value)
	}
}

/// Options passed straight through to the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
	/// Total request timeout in milliseconds.
	pub timeout_ms: Option<u64>,
	/// Connect timeout in milliseconds.
	pub connect_timeout_ms: Option<u64>,
}

/// Client-side spacing between consecutive calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
	/// Whether the gate sleeps at all.
	pub enabled: bool,
	/// Minimum spacing between calls, in milliseconds.
	pub cycle_ms: u64,
	/// Safety margin added to every computed wait, in milliseconds.
	pub buffer_ms: u64,
}
impl RateLimitConfig {
	/// Default spacing between calls.
	pub const DEFAULT_CYCLE_MS: u64 = 500;
	/// Default safety margin.
	pub const DEFAULT_BUFFER_MS: u64 = 100;

	/// Default configuration with the gate switched on.
	pub fn enabled() -> Self {
		Self { enabled: true, ..Self::default() }
	}

	/// Overrides the cycle.
	pub fn with_cycle_ms(mut self, cycle_ms: u64) -> Self {
		self.cycle_ms = cycle_ms;

		self
	}

	/// Overrides the buffer.
	pub fn with_buffer_ms(mut self, buffer_ms: u64) -> Self {
		self.buffer_ms = buffer_ms;

		self
	}
}
impl Default for RateLimitConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			cycle_ms: Self::DEFAULT_CYCLE_MS,
			buffer_ms: Self::DEFAULT_BUFFER_MS,
		}
	}
}

/// How a remaining-count header of exactly `0` is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroRemaining {
	/// Treat `0` like a missing header and keep the previous counters.
	#[default]
	Ignore,
	/// Treat `0` as real data and record the exhausted window.
	Record,
}

/// Quota header names and defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
	/// Header carrying the remaining call count.
	pub remaining_header: String,
	/// Header carrying the total call limit.
	pub limit_header: String,
	/// Limit assumed before any response has been seen.
	pub default_limit: u64,
	/// Interpretation of a zero remaining count.
	pub zero_remaining: ZeroRemaining,
}
impl QuotaConfig {
	/// Limit assumed before the first response.
	pub const DEFAULT_LIMIT: u64 = 2000;
}
impl Default for QuotaConfig {
	fn default() -> Self {
		Self {
			remaining_header: "x-ratelimit-remaining".into(),
			limit_header: "x-ratelimit-limit".into(),
			default_limit: Self::DEFAULT_LIMIT,
			zero_remaining: ZeroRemaining::default(),
		}
	}
}

/// Complete client configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	/// CRM domain: a bare host (`acme.crm.example`) or a full origin with optional path
	/// prefix (`https://acme.crm.example/api/v2`). Required when a call is dispatched.
	pub domain: Option<String>,
	/// Credential merged into the default headers.
	pub credentials: Option<Credentials>,
	/// Additional headers sent with every call.
	pub default_headers: BTreeMap<String, String>,
	/// User-Agent override.
	pub user_agent: Option<String>,
	/// Pass-through transport options.
	pub transport: TransportOptions,
	/// Client-side rate limiting.
	pub rate_limit: RateLimitConfig,
	/// Quota header names and defaults.
	pub quota: QuotaConfig,
}
impl ClientConfig {
	const ENV_DOMAIN: &'static str = "CRM_DOMAIN";
	const ENV_TOKEN: &'static str = "CRM_API_TOKEN";
	const ENV_RATE_LIMIT: &'static str = "CRM_RATE_LIMIT";
	const ENV_CYCLE_MS: &'static str = "CRM_RATE_LIMIT_CYCLE_MS";
	const ENV_BUFFER_MS: &'static str = "CRM_RATE_LIMIT_BUFFER_MS";
	const ENV_TIMEOUT_MS: &'static str = "CRM_HTTP_TIMEOUT_MS";
	const ENV_USER_AGENT: &'static str = "CRM_USER_AGENT";

	/// Creates a configuration for the provided domain with every other section defaulted.
	pub fn new(domain: impl Into<String>) -> Self {
		Self { domain: Some(domain.into()), ..Self::default() }
	}

	/// Loads configuration from the process environment.
	///
	/// Env vars:
	/// - `CRM_DOMAIN`
	/// - `CRM_API_TOKEN` (bearer credentials; blank values are ignored)
	/// - `CRM_RATE_LIMIT` (`true`/`false`, `1`/`0`, `on`/`off`, `yes`/`no`)
	/// - `CRM_RATE_LIMIT_CYCLE_MS` (default: 500)
	/// - `CRM_RATE_LIMIT_BUFFER_MS` (default: 100)
	/// - `CRM_HTTP_TIMEOUT_MS`
	/// - `CRM_USER_AGENT`
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self {
			domain: lookup(Self::ENV_DOMAIN).filter(|value| !value.trim().is_empty()),
			credentials: lookup(Self::ENV_TOKEN)
				.and_then(ApiSecret::from_env_value)
				.map(|token| Credentials::Bearer { token }),
			user_agent: lookup(Self::ENV_USER_AGENT),
			..Self::default()
		};

		if let Some(raw) = lookup(Self::ENV_RATE_LIMIT) {
			config.rate_limit.enabled = parse_flag(Self::ENV_RATE_LIMIT, raw)?;
		}
		if let Some(raw) = lookup(Self::ENV_CYCLE_MS) {
			config.rate_limit.cycle_ms = parse_env(Self::ENV_CYCLE_MS, raw)?;
		}
		if let Some(raw) = lookup(Self::ENV_BUFFER_MS) {
			config.rate_limit.buffer_ms = parse_env(Self::ENV_BUFFER_MS, raw)?;
		}
		if let Some(raw) = lookup(Self::ENV_TIMEOUT_MS) {
			config.transport.timeout_ms = Some(parse_env(Self::ENV_TIMEOUT_MS, raw)?);
		}

		Ok(config)
	}

	/// Sets or replaces the domain.
	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());

		self
	}

	/// Sets or replaces the credentials.
	pub fn with_credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = Some(credentials);

		self
	}

	/// Adds a header sent with every call.
	pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());

		self
	}

	/// Overrides the User-Agent.
	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Overrides the transport options.
	pub fn with_transport(mut self, transport: TransportOptions) -> Self {
		self.transport = transport;

		self
	}

	/// Overrides the rate limit configuration.
	pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
		self.rate_limit = rate_limit;

		self
	}

	/// Overrides the quota configuration.
	pub fn with_quota(mut self, quota: QuotaConfig) -> Self {
		self.quota = quota;

		self
	}

	/// Resolves the base origin every request path is joined onto.
	///
	/// The returned URL always ends with `/` so relative joins append instead of replacing
	/// the last path segment.
	pub fn origin(&self) -> Result<Url, ConfigError> {
		let domain = self
			.domain
			.as_deref()
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingDomain)?;
		let candidate =
			if domain.contains("://") { domain.to_owned() } else { format!("https://{domain}") };
		let mut origin = Url::parse(&candidate)
			.map_err(|source| ConfigError::InvalidDomain { domain: domain.to_owned(), source })?;

		if !origin.path().ends_with('/') {
			let path = format!("{}/", origin.path());

			origin.set_path(&path);
		}

		origin.set_query(None);
		origin.set_fragment(None);

		Ok(origin)
	}

	/// Builds the header map sent with every call: `Accept`, `User-Agent`, configured
	/// defaults, then credentials.
	pub fn default_header_map(&self) -> Result<HeaderMap, ConfigError> {
		let mut headers = HeaderMap::new();
		let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		headers.insert(
			USER_AGENT,
			HeaderValue::from_str(user_agent)
				.map_err(|_| ConfigError::InvalidHeader { name: USER_AGENT.to_string() })?,
		);

		for (name, value) in &self.default_headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			headers.insert(header_name, header_value);
		}

		if let Some(credentials) = &self.credentials {
			headers.insert(AUTHORIZATION, credentials.header_value()?);
		}

		Ok(headers)
	}
}

fn parse_env<T>(var: &'static str, raw: String) -> Result<T, ConfigError>
where
	T: FromStr,
{
	raw.trim().parse().map_err(|_| ConfigError::InvalidEnv { var, value: raw })
}

fn parse_flag(var: &'static str, raw: String) -> Result<bool, ConfigError> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidEnv { var, value: raw }),
	}
}
