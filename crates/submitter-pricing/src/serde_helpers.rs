//! Lenient numeric deserializers for pricing responses.
//!
//! The pricing service is not consistent about number encoding: amounts may
//! arrive as JSON numbers, decimal strings, or 0x-prefixed hex strings.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use submitter_types::U256;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
	Number(serde_json::Number),
	String(String),
}

fn parse_u256(value: NumberOrString) -> Result<U256, String> {
	let text = match value {
		NumberOrString::Number(n) => n.to_string(),
		NumberOrString::String(s) => s,
	};
	text.trim()
		.parse::<U256>()
		.map_err(|e| format!("invalid integer '{}': {}", text, e))
}

pub fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
	D: Deserializer<'de>,
{
	parse_u256(NumberOrString::deserialize(deserializer)?).map_err(D::Error::custom)
}

pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = parse_u256(NumberOrString::deserialize(deserializer)?).map_err(D::Error::custom)?;
	u64::try_from(value).map_err(|_| D::Error::custom(format!("{} does not fit in u64", value)))
}
