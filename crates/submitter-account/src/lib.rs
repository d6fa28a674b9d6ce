//! Signing credentials for the order submitter.
//!
//! The pipeline signs two things: the EIP-712 permit digest and, on the
//! sponsored path, the user operation hash (EIP-191). Both go through
//! [`AccountInterface`] so the key source can be swapped.

use alloy::primitives::{Signature, B256};
use async_trait::async_trait;
use submitter_types::Address;
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

pub use implementations::local::{create_account, LocalWallet};

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address controlled by this account.
	fn address(&self) -> Address;
	/// Signs a 32-byte prehash without any prefix.
	async fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError>;
	/// Signs `message` with the EIP-191 personal-message prefix.
	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError>;
}
