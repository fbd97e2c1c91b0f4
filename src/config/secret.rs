//! API token and password wrapper.

// self
use crate::_prelude::*;

/// Credential material that never prints itself.
///
/// Serializes as the bare string so config files stay readable, but `Debug` and `Display` only
/// show a mask.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiSecret(String);
impl ApiSecret {
	const MASK: &'static str = "***";

	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Reads a secret from an environment value, trimming surrounding whitespace.
	///
	/// Returns `None` when nothing is left, so an exported but empty variable does not
	/// produce an `Authorization: Bearer ` header.
	pub fn from_env_value(raw: impl AsRef<str>) -> Option<Self> {
		let trimmed = raw.as_ref().trim();

		(!trimmed.is_empty()).then(|| Self::new(trimmed))
	}

	/// Whether the secret is empty or whitespace only.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}

	/// Returns the inner secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ApiSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for ApiSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ApiSecret({})", Self::MASK)
	}
}
impl Display for ApiSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(Self::MASK)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::Credentials;

	#[test]
	fn formatters_mask_the_secret() {
		let secret = ApiSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "ApiSecret(***)");
		assert_eq!(format!("{secret}"), "***");
		assert_eq!(secret.expose(), "super-secret");
	}

	#[test]
	fn env_values_are_trimmed_and_blank_ones_dropped() {
		let secret = ApiSecret::from_env_value(" tok-123\n").expect("Token should be kept.");

		assert_eq!(secret.expose(), "tok-123");
		assert!(ApiSecret::from_env_value("").is_none());
		assert!(ApiSecret::from_env_value(" \t\n").is_none());
		assert!(ApiSecret::new("  ").is_blank());
		assert!(!secret.is_blank());
	}

	#[test]
	fn credentials_keep_the_secret_through_serde_but_not_debug() {
		let credentials = Credentials::basic("api-key", "pa55word");
		let json = serde_json::to_string(&credentials).expect("Credentials should serialize.");

		assert_eq!(json, r#"{"kind":"basic","username":"api-key","password":"pa55word"}"#);

		let restored: Credentials =
			serde_json::from_str(&json).expect("Credentials should deserialize.");

		assert_eq!(restored, credentials);

		let Credentials::Basic { password, .. } = &restored else {
			panic!("Basic credentials should stay basic.");
		};

		assert_eq!(password.expose(), "pa55word");
		assert!(!format!("{restored:?}").contains("pa55word"));
	}
}
