//! Transaction dispatch for the order submitter.
//!
//! An [`ExecutionBatch`] reaches the chain through one of two strategies:
//!
//! - [`DirectDelivery`] signs and broadcasts one transaction to the
//!   processor carrying the `multicall` calldata.
//! - [`SponsoredDelivery`] wraps the same calldata in a smart account
//!   `execute` call inside an ERC-4337 user operation and hands it to a
//!   relayer, optionally with a paymaster covering gas.
//!
//! Both converge on an [`ExecutionReceipt`] with decodable logs, and both
//! bound waiting with an explicit timeout.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use submitter_account::{AccountError, AccountInterface};
use submitter_chain::{ChainError, ChainInterface};
use submitter_config::{DeliveryConfig, DeliveryStrategy};
use submitter_types::{ExecutionBatch, ExecutionReceipt, SubmissionHandle, U256};
use thiserror::Error;

pub mod gas;
pub mod relayer;
pub mod user_operation;

#[cfg(test)]
mod test_utils;

pub mod implementations {
	pub mod direct;
	pub mod sponsored;
}

pub use gas::{FixedGasPriceOracle, GasPrice, GasPriceOracle, RelayerGasPriceOracle};
pub use implementations::direct::DirectDelivery;
pub use implementations::sponsored::SponsoredDelivery;
pub use relayer::{HttpRelayer, RelayerInterface};
pub use user_operation::UserOperation;

#[cfg(any(test, feature = "testing"))]
pub use relayer::MockRelayerInterface;

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Chain error: {0}")]
	Chain(#[from] ChainError),
	#[error("Signing error: {0}")]
	Signing(#[from] AccountError),
	/// JSON-RPC or transport failure talking to the relayer or paymaster.
	#[error("Relayer error: {0}")]
	Relayer(String),
	/// No receipt within the wait bound.
	#[error("Timed out after {waited_ms}ms waiting for {handle}")]
	Timeout {
		handle: SubmissionHandle,
		waited_ms: u64,
	},
	/// The handle was produced by a different strategy.
	#[error("Unsupported handle {0} for this delivery strategy")]
	UnsupportedHandle(SubmissionHandle),
	#[error("Invalid configuration: {0}")]
	Config(String),
}

#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DeliveryInterface: Send + Sync {
	/// Sends the batch on its way and returns a handle to wait on.
	async fn submit(&self, batch: &ExecutionBatch) -> Result<SubmissionHandle, DeliveryError>;

	/// Waits up to `timeout` for the handle to be included on chain.
	async fn wait(
		&self,
		handle: &SubmissionHandle,
		timeout: Duration,
	) -> Result<ExecutionReceipt, DeliveryError>;
}

/// The configured delivery strategy together with its wait bound.
pub struct DeliveryService {
	provider: Arc<dyn DeliveryInterface>,
	timeout: Duration,
}

impl DeliveryService {
	pub fn new(provider: Arc<dyn DeliveryInterface>, timeout: Duration) -> Self {
		Self { provider, timeout }
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub async fn submit(&self, batch: &ExecutionBatch) -> Result<SubmissionHandle, DeliveryError> {
		self.provider.submit(batch).await
	}

	pub async fn wait(&self, handle: &SubmissionHandle) -> Result<ExecutionReceipt, DeliveryError> {
		self.provider.wait(handle, self.timeout).await
	}

	/// Submits and waits with the configured timeout.
	pub async fn submit_and_wait(
		&self,
		batch: &ExecutionBatch,
	) -> Result<(SubmissionHandle, ExecutionReceipt), DeliveryError> {
		let handle = self.submit(batch).await?;
		let receipt = self.wait(&handle).await?;
		Ok((handle, receipt))
	}
}

/// Builds the configured delivery strategy.
///
/// `chain_id` binds user operation hashes and is only used by the sponsored
/// strategy.
pub fn create_delivery(
	config: &DeliveryConfig,
	chain: Arc<dyn ChainInterface>,
	account: Arc<dyn AccountInterface>,
	chain_id: u64,
) -> Result<DeliveryService, DeliveryError> {
	let timeout = Duration::from_millis(config.timeout_ms);
	let poll_interval = Duration::from_millis(config.poll_interval_ms);

	let provider: Arc<dyn DeliveryInterface> = match config.strategy {
		DeliveryStrategy::Direct => Arc::new(DirectDelivery::new(chain, poll_interval)),
		DeliveryStrategy::Sponsored => {
			let sponsored = config.sponsored.as_ref().ok_or_else(|| {
				DeliveryError::Config(
					"Sponsored delivery requires [delivery.sponsored]".to_string(),
				)
			})?;
			let relayer: Arc<dyn RelayerInterface> =
				Arc::new(HttpRelayer::new(sponsored, timeout)?);

			let gas_oracle: Arc<dyn GasPriceOracle> = match (
				sponsored.max_fee_per_gas,
				sponsored.max_priority_fee_per_gas,
			) {
				(Some(max_fee), Some(priority_fee)) => Arc::new(FixedGasPriceOracle(GasPrice {
					max_fee_per_gas: U256::from(max_fee),
					max_priority_fee_per_gas: U256::from(priority_fee),
				})),
				_ => Arc::new(RelayerGasPriceOracle::new(relayer.clone())),
			};

			Arc::new(SponsoredDelivery::new(
				chain,
				account,
				relayer,
				gas_oracle,
				sponsored.entry_point,
				sponsored.account_address,
				chain_id,
				sponsored.sponsor,
				poll_interval,
			))
		}
	};

	Ok(DeliveryService::new(provider, timeout))
}
