//! JSON body decoding and error-body unwrapping.

// self
use crate::_prelude::*;

/// Decodes a response body into a loose JSON value.
///
/// Empty or non-JSON bodies decode to `None`. Integer literals that do not fit in an `i64`
/// come back as strings holding the literal's exact digits instead of rounded floats.
pub fn decode_json(bytes: &[u8]) -> Option<Value> {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return None;
	}

	serde_json::from_slice::<Value>(bytes).ok().map(stringify_wide_integers)
}

fn stringify_wide_integers(value: Value) -> Value {
	match value {
		Value::Number(number) if is_wide_integer(&number) => Value::String(number.to_string()),
		Value::Array(items) => Value::Array(items.into_iter().map(stringify_wide_integers).collect()),
		Value::Object(map) => Value::Object(
			map.into_iter().map(|(key, value)| (key, stringify_wide_integers(value))).collect(),
		),
		other => other,
	}
}

fn is_wide_integer(number: &serde_json::Number) -> bool {
	let literal = number.to_string();
	let digits = literal.strip_prefix('-').unwrap_or(&literal);

	!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && number.as_i64().is_none()
}

/// Body reported for a failed call, resolved once during normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorBody {
	/// No response, undecodable body, or neither `errors` nor `error` present.
	#[default]
	Absent,
	/// Value of the body's `error` property.
	Single(Value),
	/// Value of the body's `errors` property.
	Collection(Value),
}
impl ErrorBody {
	/// Unwraps a decoded error body: `errors` wins over `error`; anything else is absent.
	pub fn from_decoded(decoded: Option<Value>) -> Self {
		let Some(Value::Object(mut map)) = decoded else {
			return Self::Absent;
		};

		if let Some(errors) = map.remove("errors") {
			Self::Collection(errors)
		} else if let Some(error) = map.remove("error") {
			Self::Single(error)
		} else {
			Self::Absent
		}
	}

	/// Borrows the unwrapped value, if any.
	pub fn value(&self) -> Option<&Value> {
		match self {
			Self::Absent => None,
			Self::Single(value) | Self::Collection(value) => Some(value),
		}
	}

	/// Whether no error body was found.
	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}
}
