//! Local private key wallet.

use crate::{AccountError, AccountInterface};
use alloy::primitives::{Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use submitter_config::AccountConfig;
use submitter_types::Address;

/// Local wallet backed by an in-memory private key.
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key (with or without 0x).
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	/// The underlying signer, used to build a signing provider for direct delivery.
	pub fn signer(&self) -> PrivateKeySigner {
		self.signer.clone()
	}
}

#[async_trait]
impl AccountInterface for LocalWallet {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		self.signer
			.sign_hash(hash)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign hash: {}", e)))
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError> {
		self.signer
			.sign_message(message)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign message: {}", e)))
	}
}

/// Creates the local wallet described by the account section.
pub fn create_account(config: &AccountConfig) -> Result<LocalWallet, AccountError> {
	LocalWallet::new(&config.private_key)
}
