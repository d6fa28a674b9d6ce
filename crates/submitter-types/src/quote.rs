//! Fee quote issued by the pricing service.

use crate::contracts;
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A signed, time-bounded fee quote.
///
/// The quote is consumed by the order-creation call and is deliberately not
/// `Clone`: each submission attempt must obtain its own.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
	/// Identifier the processor assigns to the order.
	pub order_id: U256,
	pub requester: Address,
	pub fee: U256,
	/// Issuance time, unix seconds.
	pub timestamp: u64,
	/// Expiry, unix seconds.
	pub deadline: u64,
	/// Pricing service signature over the quote.
	pub signature: Bytes,
}

impl FeeQuote {
	/// A quote is expired once `now` reaches its deadline.
	pub fn is_expired(&self, now: u64) -> bool {
		now >= self.deadline
	}

	pub fn to_contract(&self) -> contracts::FeeQuote {
		contracts::FeeQuote {
			orderId: self.order_id,
			requester: self.requester,
			fee: self.fee,
			timestamp: self.timestamp,
			deadline: self.deadline,
		}
	}
}
