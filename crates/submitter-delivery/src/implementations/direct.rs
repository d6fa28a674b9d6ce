//! Direct delivery: the holder's key signs one transaction to the processor.

use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use submitter_chain::ChainInterface;
use submitter_types::{truncate_hash, ExecutionBatch, ExecutionReceipt, SubmissionHandle, B256};
use tokio::time::Instant;
use tracing::{debug, info};

/// Sends the batch as a plain transaction from the configured key.
pub struct DirectDelivery {
	/// Signing provider; the sender is its wallet address.
	chain: Arc<dyn ChainInterface>,
	/// Delay between receipt lookups.
	poll_interval: Duration,
}

impl DirectDelivery {
	pub fn new(chain: Arc<dyn ChainInterface>, poll_interval: Duration) -> Self {
		Self {
			chain,
			poll_interval,
		}
	}

	/// Polls until the node reports a receipt. Unbounded; callers apply the timeout.
	async fn poll_receipt(&self, tx_hash: B256) -> Result<ExecutionReceipt, DeliveryError> {
		loop {
			if let Some(receipt) = self.chain.transaction_receipt(tx_hash).await? {
				return Ok(receipt);
			}
			debug!(tx_hash = %truncate_hash(&tx_hash), "Receipt pending");
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

#[async_trait]
impl DeliveryInterface for DirectDelivery {
	async fn submit(&self, batch: &ExecutionBatch) -> Result<SubmissionHandle, DeliveryError> {
		let tx_hash = self
			.chain
			.send_transaction(batch.processor(), batch.multicall_calldata())
			.await?;

		Ok(SubmissionHandle::Transaction(tx_hash))
	}

	async fn wait(
		&self,
		handle: &SubmissionHandle,
		timeout: Duration,
	) -> Result<ExecutionReceipt, DeliveryError> {
		let SubmissionHandle::Transaction(tx_hash) = handle else {
			return Err(DeliveryError::UnsupportedHandle(*handle));
		};

		info!(
			tx_hash = %truncate_hash(tx_hash),
			"Waiting for receipt (timeout: {}ms)",
			timeout.as_millis()
		);
		let start = Instant::now();

		// Bounds the in-flight RPC call as well as the polling.
		let receipt = tokio::time::timeout(timeout, self.poll_receipt(*tx_hash))
			.await
			.map_err(|_| DeliveryError::Timeout {
				handle: *handle,
				waited_ms: start.elapsed().as_millis() as u64,
			})??;

		info!(
			tx_hash = %truncate_hash(tx_hash),
			block = receipt.block_number,
			success = receipt.success,
			"Transaction included"
		);
		Ok(receipt)
	}
}
