//! Call-quota bookkeeping driven by rate-limit response headers.
//!
//! Counters live per API family (only [`REST_FAMILY`] is registered by the dispatcher).
//! They are never reset on a timer; the remote's window rollover shows up only through new
//! header values.

// crates.io
use http::HeaderMap;
// self
use crate::{
	_prelude::*,
	config::{QuotaConfig, ZeroRemaining},
	error::LookupError,
};

/// Family name used for every REST call.
pub const REST_FAMILY: &str = "rest";

/// Counter triple for one API family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
	/// Calls remaining in the current window.
	pub left: u64,
	/// Calls consumed in the current window, as of the last update.
	pub made: u64,
	/// Calls allowed per window.
	pub limit: u64,
}
impl Quota {
	/// Fresh counters before any response has been seen.
	pub fn with_limit(limit: u64) -> Self {
		Self { left: 0, made: 0, limit }
	}

	/// Reads a single counter.
	pub fn counter(&self, counter: QuotaCounter) -> u64 {
		match counter {
			QuotaCounter::Left => self.left,
			QuotaCounter::Made => self.made,
			QuotaCounter::Limit => self.limit,
		}
	}
}
impl Default for Quota {
	fn default() -> Self {
		Self::with_limit(QuotaConfig::DEFAULT_LIMIT)
	}
}

/// Named counter within a [`Quota`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaCounter {
	/// Remaining calls.
	Left,
	/// Consumed calls.
	Made,
	/// Total allowed calls.
	Limit,
}
impl QuotaCounter {
	/// Returns the stable counter name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Left => "left",
			Self::Made => "made",
			Self::Limit => "limit",
		}
	}
}
impl FromStr for QuotaCounter {
	type Err = LookupError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"left" => Ok(Self::Left),
			"made" => Ok(Self::Made),
			"limit" => Ok(Self::Limit),
			other => Err(LookupError::UnknownCounter { key: other.to_owned() }),
		}
	}
}
impl Display for QuotaCounter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Thread-safe quota counters keyed by family.
#[derive(Debug)]
pub struct QuotaTracker {
	config: QuotaConfig,
	families: RwLock<HashMap<String, Quota>>,
}
impl QuotaTracker {
	/// Creates a tracker with [`REST_FAMILY`] registered at the configured default limit.
	pub fn new(config: QuotaConfig) -> Self {
		Self::with_families(config, [REST_FAMILY])
	}

	/// Creates a tracker with the given families registered.
	pub fn with_families<I, S>(config: QuotaConfig, families: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let initial = Quota::with_limit(config.default_limit);
		let families = families.into_iter().map(|family| (family.into(), initial)).collect();

		Self { config, families: RwLock::new(families) }
	}

	/// Updates `family` from the first values of the remaining and limit headers.
	///
	/// Returns whether the counters changed. A missing or unparseable remaining count leaves
	/// the counters untouched, and so does a zero count under [`ZeroRemaining::Ignore`]. A
	/// missing limit header keeps the previous limit.
	pub fn update(&self, family: &str, headers: &HeaderMap) -> bool {
		let Some(remaining) = header_u64(headers, &self.config.remaining_header) else {
			return false;
		};

		if remaining == 0 && self.config.zero_remaining == ZeroRemaining::Ignore {
			return false;
		}

		let mut families = self.families.write();
		let quota = families
			.entry(family.to_owned())
			.or_insert_with(|| Quota::with_limit(self.config.default_limit));
		let limit = header_u64(headers, &self.config.limit_header).unwrap_or(quota.limit);

		*quota = Quota { left: remaining, made: limit.saturating_sub(remaining), limit };

		true
	}

	/// Returns the counter triple for `family`.
	pub fn get(&self, family: &str) -> Result<Quota, LookupError> {
		self.families
			.read()
			.get(family)
			.copied()
			.ok_or_else(|| LookupError::UnknownFamily { family: family.to_owned() })
	}

	/// Returns a single named counter (`left`, `made`, or `limit`) for `family`.
	pub fn counter(&self, family: &str, key: &str) -> Result<u64, LookupError> {
		let counter = key.parse::<QuotaCounter>()?;

		Ok(self.get(family)?.counter(counter))
	}
}
impl Default for QuotaTracker {
	fn default() -> Self {
		Self::new(QuotaConfig::default())
	}
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
	headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
