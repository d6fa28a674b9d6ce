//! EIP-2612 spend authorization types.

use crate::contracts;
use alloy::primitives::{Address, Signature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// EIP-712 domain of the payment token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitDomain {
	pub name: String,
	pub version: String,
	pub chain_id: u64,
	/// The payment token itself.
	pub verifying_contract: Address,
}

impl PermitDomain {
	pub fn to_eip712(&self) -> Eip712Domain {
		Eip712Domain::new(
			Some(Cow::Owned(self.name.clone())),
			Some(Cow::Owned(self.version.clone())),
			Some(U256::from(self.chain_id)),
			Some(self.verifying_contract),
			None,
		)
	}
}

/// The `Permit(owner,spender,value,nonce,deadline)` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitMessage {
	pub owner: Address,
	pub spender: Address,
	pub value: U256,
	pub nonce: U256,
	pub deadline: U256,
}

impl PermitMessage {
	pub fn to_contract(&self) -> contracts::Permit {
		contracts::Permit {
			owner: self.owner,
			spender: self.spender,
			value: self.value,
			nonce: self.nonce,
			deadline: self.deadline,
		}
	}

	/// EIP-712 digest of this message under `domain`.
	pub fn signing_hash(&self, domain: &PermitDomain) -> B256 {
		self.to_contract().eip712_signing_hash(&domain.to_eip712())
	}
}

/// A signed permit, ready to be passed to `selfPermit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitAuthorization {
	pub domain: PermitDomain,
	pub message: PermitMessage,
	/// Key that produced the signature. Equal to `message.owner` unless the
	/// owner is a smart account validating its key's signature via ERC-1271.
	pub signer: Address,
	/// 27 or 28.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

impl PermitAuthorization {
	/// Splits a 65-byte signature into the `(v, r, s)` form tokens expect.
	pub fn from_signature(
		domain: PermitDomain,
		message: PermitMessage,
		signer: Address,
		signature: &Signature,
	) -> Self {
		Self {
			domain,
			message,
			signer,
			v: 27 + signature.v() as u8,
			r: B256::from(signature.r()),
			s: B256::from(signature.s()),
		}
	}

	/// Whether the owner is a contract account rather than the signing key.
	pub fn is_delegated(&self) -> bool {
		self.signer != self.message.owner
	}

	pub fn token(&self) -> Address {
		self.domain.verifying_contract
	}

	/// Reassembles the split signature.
	pub fn signature(&self) -> Signature {
		Signature::new(self.r.into(), self.s.into(), self.v == 28)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;

	fn domain() -> PermitDomain {
		PermitDomain {
			name: "USD Coin".to_string(),
			version: "2".to_string(),
			chain_id: 8453,
			verifying_contract: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
		}
	}

	fn message(nonce: u64) -> PermitMessage {
		PermitMessage {
			owner: address!("1111111111111111111111111111111111111111"),
			spender: address!("2222222222222222222222222222222222222222"),
			value: U256::from(1_002_500),
			nonce: U256::from(nonce),
			deadline: U256::from(1_700_000_300u64),
		}
	}

	#[test]
	fn test_signing_hash_depends_on_nonce() {
		assert_ne!(
			message(0).signing_hash(&domain()),
			message(1).signing_hash(&domain())
		);
	}

	#[test]
	fn test_signing_hash_depends_on_domain_version() {
		let mut other = domain();
		other.version = "1".to_string();
		assert_ne!(
			message(0).signing_hash(&domain()),
			message(0).signing_hash(&other)
		);
	}

	#[test]
	fn test_split_signature_roundtrip() {
		let sig = Signature::new(U256::from(11), U256::from(22), true);
		let permit = PermitAuthorization::from_signature(
			domain(),
			message(0),
			address!("1111111111111111111111111111111111111111"),
			&sig,
		);

		assert_eq!(permit.v, 28);
		assert_eq!(permit.r, B256::from(U256::from(11)));
		assert_eq!(permit.signature(), sig);
		assert!(!permit.is_delegated());
	}
}
