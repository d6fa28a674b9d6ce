//! Confirmation decoding.

use crate::SubmissionError;
use alloy::sol_types::SolEvent;
use std::sync::Arc;
use submitter_chain::ChainInterface;
use submitter_types::contracts::IOrderProcessor;
use submitter_types::{truncate_hash, Address, CreatedOrder, ExecutionReceipt, OrderStatus, U256};
use tracing::{debug, warn};

/// Decodes confirmations and reads order state from the processor.
pub struct ReceiptParser {
	chain: Arc<dyn ChainInterface>,
	/// Only events emitted by this address are trusted.
	processor: Address,
}

impl ReceiptParser {
	pub fn new(chain: Arc<dyn ChainInterface>, processor: Address) -> Self {
		Self { chain, processor }
	}

	/// Decodes the first `OrderCreated` emitted by the processor.
	///
	/// Logs from other contracts and other events are skipped, including a
	/// look-alike `OrderCreated` from any address other than the processor.
	pub fn parse_order_created(
		&self,
		receipt: &ExecutionReceipt,
	) -> Result<CreatedOrder, SubmissionError> {
		let created = receipt
			.logs
			.iter()
			.filter(|log| log.address == self.processor)
			.filter(|log| {
				log.topics.first() == Some(&IOrderProcessor::OrderCreated::SIGNATURE_HASH)
			})
			.find_map(|log| {
				let topics = log.topics.iter().copied();
				match IOrderProcessor::OrderCreated::decode_raw_log(topics, &log.data) {
					Ok(event) => Some(event),
					Err(e) => {
						debug!(error = %e, "Skipping undecodable OrderCreated log");
						None
					}
				}
			});

		match created {
			Some(event) => Ok(CreatedOrder {
				order_id: event.id,
				requester: event.requester,
			}),
			None => {
				warn!(
					tx_hash = %truncate_hash(&receipt.transaction_hash),
					processor = %self.processor,
					"No OrderCreated event in receipt"
				);
				Err(SubmissionError::EventNotFound(receipt.transaction_hash))
			}
		}
	}

	/// Reads the order's current lifecycle state.
	pub async fn query_status(&self, order_id: U256) -> Result<OrderStatus, SubmissionError> {
		let raw = self.chain.order_status(self.processor, order_id).await?;
		OrderStatus::try_from(raw).map_err(|value| {
			SubmissionError::Validation(format!(
				"Unknown order status {} for order {}",
				value, order_id
			))
		})
	}
}
