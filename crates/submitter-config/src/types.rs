//! Configuration types for the order submitter.

use serde::{Deserialize, Serialize};
use submitter_types::Address;

/// Default ERC-4337 v0.6 entry point.
pub const DEFAULT_ENTRY_POINT: Address = Address::new([
	0x5f, 0xf1, 0x37, 0xd4, 0xb0, 0xfd, 0xcd, 0x49, 0xdc, 0xa3, 0x0c, 0x7c, 0xf5, 0x7e, 0x57, 0x8a,
	0x02, 0x6d, 0x27, 0x89,
]);

/// Complete submitter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitterConfig {
	#[serde(default)]
	pub submitter: SubmitterSettings,
	/// Chain and settlement contract
	pub network: NetworkConfig,
	/// Signing credential
	pub account: AccountConfig,
	/// Fee quoting service
	pub pricing: PricingConfig,
	#[serde(default)]
	pub permit: PermitConfig,
	/// Transaction dispatch strategy
	pub delivery: DeliveryConfig,
	/// Known asset addresses, resolvable by symbol
	#[serde(default)]
	pub assets: Vec<AssetConfig>,
}

impl SubmitterConfig {
	/// Resolves an asset given either its configured symbol or a hex address.
	pub fn resolve_asset(&self, symbol_or_address: &str) -> Option<Address> {
		if let Ok(address) = symbol_or_address.parse::<Address>() {
			return Some(address);
		}
		self.assets
			.iter()
			.find(|a| a.symbol.eq_ignore_ascii_case(symbol_or_address))
			.map(|a| a.address)
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitterSettings {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

impl Default for SubmitterSettings {
	fn default() -> Self {
		Self {
			log_level: default_log_level(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub chain_id: u64,
	pub rpc_url: String,
	/// Order processor (settlement contract)
	pub processor_address: Address,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Hex private key, 0x-prefixed
	pub private_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	pub base_url: String,
	#[serde(default = "default_fee_path")]
	pub fee_path: String,
	pub api_key: String,
	#[serde(default = "default_pricing_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PermitConfig {
	/// Seconds added to the latest block time
	#[serde(default = "default_permit_deadline_secs")]
	pub deadline_secs: u64,
}

impl Default for PermitConfig {
	fn default() -> Self {
		Self {
			deadline_secs: default_permit_deadline_secs(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStrategy {
	Direct,
	Sponsored,
}

impl std::str::FromStr for DeliveryStrategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"direct" => Ok(Self::Direct),
			"sponsored" => Ok(Self::Sponsored),
			other => Err(format!("unknown delivery strategy '{}'", other)),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
	pub strategy: DeliveryStrategy,
	/// Upper bound on waiting for a receipt
	#[serde(default = "default_delivery_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Required when `strategy = "sponsored"`
	pub sponsored: Option<SponsoredConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SponsoredConfig {
	/// Bundler JSON-RPC endpoint
	pub relayer_url: String,
	pub api_key: Option<String>,
	#[serde(default = "default_entry_point")]
	pub entry_point: Address,
	/// Smart account that executes the batch
	pub account_address: Address,
	/// Ask the paymaster to cover gas
	#[serde(default = "default_true")]
	pub sponsor: bool,
	/// Paymaster endpoint, defaults to the relayer
	pub sponsor_url: Option<String>,
	#[serde(default = "default_gas_price_method")]
	pub gas_price_method: String,
	#[serde(default = "default_sponsor_method")]
	pub sponsor_method: String,
	/// Fixed fee in wei; when set with `max_priority_fee_per_gas` the relayer
	/// is not asked for gas prices
	pub max_fee_per_gas: Option<u128>,
	pub max_priority_fee_per_gas: Option<u128>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
	pub symbol: String,
	pub address: Address,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_fee_path() -> String {
	"/api/v1/web3/orders/fee".to_string()
}

fn default_pricing_timeout_ms() -> u64 {
	30_000
}

fn default_permit_deadline_secs() -> u64 {
	300
}

fn default_delivery_timeout_ms() -> u64 {
	60_000
}

fn default_poll_interval_ms() -> u64 {
	2_000
}

fn default_entry_point() -> Address {
	DEFAULT_ENTRY_POINT
}

fn default_true() -> bool {
	true
}

fn default_gas_price_method() -> String {
	"pimlico_getUserOperationGasPrice".to_string()
}

fn default_sponsor_method() -> String {
	"pm_sponsorUserOperation".to_string()
}
