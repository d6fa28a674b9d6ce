//! Sponsored delivery through an ERC-4337 smart account.
//!
//! The processor multicall becomes `execute(processor, 0, multicall)` on the
//! holder's smart account, wrapped in a user operation signed by the account
//! owner and handed to a relayer. With sponsorship enabled a paymaster covers
//! gas; otherwise the relayer's gas estimate is used and the account pays.

use crate::gas::GasPriceOracle;
use crate::relayer::RelayerInterface;
use crate::user_operation::UserOperation;
use crate::{DeliveryError, DeliveryInterface};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use submitter_account::AccountInterface;
use submitter_chain::ChainInterface;
use submitter_types::contracts::ISmartAccount;
use submitter_types::{
	truncate_hash, Address, Bytes, ExecutionBatch, ExecutionReceipt, SubmissionHandle, B256, U256,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Submits the batch as a user operation from the holder's smart account.
pub struct SponsoredDelivery {
	/// Read-only node access for the entry point nonce and bundle receipts.
	chain: Arc<dyn ChainInterface>,
	/// Owner key of the smart account; signs the operation hash.
	account: Arc<dyn AccountInterface>,
	relayer: Arc<dyn RelayerInterface>,
	gas_oracle: Arc<dyn GasPriceOracle>,
	entry_point: Address,
	/// The smart account that executes the batch.
	account_address: Address,
	chain_id: u64,
	/// Ask the paymaster to cover gas.
	sponsor: bool,
	poll_interval: Duration,
}

impl SponsoredDelivery {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		account: Arc<dyn AccountInterface>,
		relayer: Arc<dyn RelayerInterface>,
		gas_oracle: Arc<dyn GasPriceOracle>,
		entry_point: Address,
		account_address: Address,
		chain_id: u64,
		sponsor: bool,
		poll_interval: Duration,
	) -> Self {
		Self {
			chain,
			account,
			relayer,
			gas_oracle,
			entry_point,
			account_address,
			chain_id,
			sponsor,
			poll_interval,
		}
	}

	/// Builds the unsigned, fully priced operation for `batch`.
	async fn build_operation(
		&self,
		batch: &ExecutionBatch,
	) -> Result<UserOperation, DeliveryError> {
		let call_data = ISmartAccount::executeCall {
			dest: batch.processor(),
			value: U256::ZERO,
			func: batch.multicall_calldata(),
		}
		.abi_encode();

		let nonce = self
			.chain
			.entry_point_nonce(self.entry_point, self.account_address)
			.await?;

		let mut op = UserOperation::new(self.account_address, nonce, call_data.into());

		let price = self.gas_oracle.gas_price().await?;
		op.max_fee_per_gas = price.max_fee_per_gas;
		op.max_priority_fee_per_gas = price.max_priority_fee_per_gas;

		if self.sponsor {
			let sponsorship = self
				.relayer
				.sponsor_user_operation(&op, self.entry_point)
				.await?;
			op.paymaster_and_data = sponsorship.paymaster_and_data;
			op.pre_verification_gas = sponsorship.pre_verification_gas;
			op.verification_gas_limit = sponsorship.verification_gas_limit;
			op.call_gas_limit = sponsorship.call_gas_limit;
		} else {
			let estimate = self
				.relayer
				.estimate_user_operation_gas(&op, self.entry_point)
				.await?;
			op.pre_verification_gas = estimate.pre_verification_gas;
			op.verification_gas_limit = estimate.verification_gas_limit;
			op.call_gas_limit = estimate.call_gas_limit;
		}

		Ok(op)
	}

	/// Waits for the relayer's receipt, then the bundle transaction's receipt.
	async fn poll_inclusion(&self, op_hash: B256) -> Result<ExecutionReceipt, DeliveryError> {
		let op_receipt = loop {
			if let Some(receipt) = self.relayer.user_operation_receipt(op_hash).await? {
				break receipt;
			}
			debug!(user_op_hash = %truncate_hash(&op_hash), "User operation pending");
			tokio::time::sleep(self.poll_interval).await;
		};

		let tx_hash = op_receipt.receipt.transaction_hash;
		if !op_receipt.success {
			warn!(
				user_op_hash = %truncate_hash(&op_hash),
				tx_hash = %truncate_hash(&tx_hash),
				reason = op_receipt.reason.as_deref().unwrap_or("none"),
				"User operation execution failed"
			);
		}

		// The node can trail the relayer by a block.
		let chain_receipt = loop {
			if let Some(receipt) = self.chain.transaction_receipt(tx_hash).await? {
				break receipt;
			}
			tokio::time::sleep(self.poll_interval).await;
		};

		info!(
			user_op_hash = %truncate_hash(&op_hash),
			tx_hash = %truncate_hash(&tx_hash),
			block = chain_receipt.block_number,
			success = op_receipt.success,
			"User operation included"
		);

		let revert_reason = if op_receipt.success {
			None
		} else {
			op_receipt.reason.clone()
		};
		let logs = if op_receipt.logs.is_empty() {
			chain_receipt.logs
		} else {
			op_receipt.logs.into_iter().map(Into::into).collect()
		};

		Ok(ExecutionReceipt {
			transaction_hash: tx_hash,
			block_number: chain_receipt.block_number,
			success: op_receipt.success,
			logs,
			revert_reason,
		})
	}
}

#[async_trait]
impl DeliveryInterface for SponsoredDelivery {
	async fn submit(&self, batch: &ExecutionBatch) -> Result<SubmissionHandle, DeliveryError> {
		let mut op = self.build_operation(batch).await?;

		let op_hash = op.hash(self.entry_point, self.chain_id);
		let signature = self.account.sign_message(op_hash.as_slice()).await?;
		op.signature = Bytes::copy_from_slice(&signature.as_bytes());

		let accepted = self
			.relayer
			.send_user_operation(&op, self.entry_point)
			.await?;

		if accepted != op_hash {
			warn!(
				local = %truncate_hash(&op_hash),
				relayer = %truncate_hash(&accepted),
				"Relayer returned a different user operation hash"
			);
		}

		info!(
			user_op_hash = %truncate_hash(&accepted),
			sponsored = self.sponsor,
			"Submitted user operation"
		);

		Ok(SubmissionHandle::UserOperation(accepted))
	}

	async fn wait(
		&self,
		handle: &SubmissionHandle,
		timeout: Duration,
	) -> Result<ExecutionReceipt, DeliveryError> {
		let SubmissionHandle::UserOperation(op_hash) = handle else {
			return Err(DeliveryError::UnsupportedHandle(*handle));
		};

		let start = Instant::now();
		// One bound covers the relayer wait and the node lookup together.
		tokio::time::timeout(timeout, self.poll_inclusion(*op_hash))
			.await
			.map_err(|_| DeliveryError::Timeout {
				handle: *handle,
				waited_ms: start.elapsed().as_millis() as u64,
			})?
	}
}
