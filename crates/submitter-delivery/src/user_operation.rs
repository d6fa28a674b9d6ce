//! ERC-4337 (entry point v0.6) user operation.

use alloy::primitives::{hex, keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Placeholder signature bundlers accept during gas estimation and
/// sponsorship. It is replaced by the owner's signature before sending.
pub const DUMMY_SIGNATURE: [u8; 65] = hex!(
	"fffffffffffffffffffffffffffffff000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c"
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
	pub sender: Address,
	pub nonce: U256,
	pub init_code: Bytes,
	pub call_data: Bytes,
	pub call_gas_limit: U256,
	pub verification_gas_limit: U256,
	pub pre_verification_gas: U256,
	pub max_fee_per_gas: U256,
	pub max_priority_fee_per_gas: U256,
	pub paymaster_and_data: Bytes,
	pub signature: Bytes,
}

impl UserOperation {
	/// An unsigned operation for an already deployed account.
	pub fn new(sender: Address, nonce: U256, call_data: Bytes) -> Self {
		Self {
			sender,
			nonce,
			init_code: Bytes::new(),
			call_data,
			call_gas_limit: U256::ZERO,
			verification_gas_limit: U256::ZERO,
			pre_verification_gas: U256::ZERO,
			max_fee_per_gas: U256::ZERO,
			max_priority_fee_per_gas: U256::ZERO,
			paymaster_and_data: Bytes::new(),
			signature: Bytes::from_static(&DUMMY_SIGNATURE),
		}
	}

	/// `keccak256(abi.encode(keccak256(pack(op)), entryPoint, chainId))`.
	pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
		let packed = (
			self.sender,
			self.nonce,
			keccak256(&self.init_code),
			keccak256(&self.call_data),
			self.call_gas_limit,
			self.verification_gas_limit,
			self.pre_verification_gas,
			self.max_fee_per_gas,
			self.max_priority_fee_per_gas,
			keccak256(&self.paymaster_and_data),
		)
			.abi_encode();

		keccak256((keccak256(packed), entry_point, U256::from(chain_id)).abi_encode())
	}
}
