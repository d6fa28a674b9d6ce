//! Typed node access for the order submitter.
//!
//! Every on-chain read or write the pipeline performs goes through
//! [`ChainInterface`]: token metadata for permits, processor reads for
//! precision and status, the entry point nonce for user operations, and
//! direct transaction broadcast.

use async_trait::async_trait;
use submitter_types::{Address, Bytes, ExecutionReceipt, B256, U256};
use thiserror::Error;

pub mod implementations {
	pub mod alloy;
}

pub use implementations::alloy::AlloyChain;

#[derive(Debug, Error)]
pub enum ChainError {
	/// Transport or node failure.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// The call or transaction reverted, with the decoded reason when present.
	#[error("Execution reverted: {}", .0.as_deref().unwrap_or("no reason"))]
	Revert(Option<String>),
	#[error("Decode error: {0}")]
	Decode(String),
	#[error("Invalid configuration: {0}")]
	Config(String),
	/// A write was attempted on a read-only client.
	#[error("No signer configured")]
	NoSigner,
}

#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ChainInterface: Send + Sync {
	async fn chain_id(&self) -> Result<u64, ChainError>;

	/// Timestamp of the latest block, unix seconds.
	async fn block_timestamp(&self) -> Result<u64, ChainError>;

	/// ERC-20 `name()`.
	async fn token_name(&self, token: Address) -> Result<String, ChainError>;

	/// EIP-712 `version()`. Not every token implements it.
	async fn token_version(&self, token: Address) -> Result<String, ChainError>;

	async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;

	/// EIP-2612 `nonces(owner)`.
	async fn permit_nonce(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

	/// Decimal places the processor strips from sell quantities of `token`.
	async fn order_decimal_reduction(
		&self,
		processor: Address,
		token: Address,
	) -> Result<u8, ChainError>;

	/// Raw `getOrderStatus(id)`.
	async fn order_status(&self, processor: Address, order_id: U256) -> Result<u8, ChainError>;

	/// Entry point `getNonce(sender, 0)`.
	async fn entry_point_nonce(
		&self,
		entry_point: Address,
		sender: Address,
	) -> Result<U256, ChainError>;

	/// Signs and broadcasts a transaction, returning its hash.
	async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<B256, ChainError>;

	/// Receipt for `hash`, or `None` while pending.
	async fn transaction_receipt(&self, hash: B256)
		-> Result<Option<ExecutionReceipt>, ChainError>;
}
