//! Formatting helpers shared across crates.

use alloy::primitives::B256;

/// Shortens a hash for log output, e.g. `0x1a2b3c4d..`.
pub fn truncate_hash(hash: &B256) -> String {
	let hex = hex::encode(hash);
	format!("0x{}..", &hex[..8])
}

/// Current unix time in seconds.
pub fn current_timestamp() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}
