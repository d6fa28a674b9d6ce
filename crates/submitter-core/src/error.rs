use submitter_account::AccountError;
use submitter_chain::ChainError;
use submitter_delivery::DeliveryError;
use submitter_permit::PermitError;
use submitter_pricing::PricingError;
use submitter_types::{BatchError, SubmissionHandle, B256, U256};
use thiserror::Error;

/// Every way a submission attempt can fail.
///
/// Collaborator errors are folded in by kind: a revert surfaces as
/// [`SubmissionError::ChainRevert`] whether it came from the node on send or
/// from a failed receipt, and both delivery paths time out the same way.
#[derive(Debug, Error)]
pub enum SubmissionError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Quantity {quantity} exceeds {max_decimals} decimal places allowed for sells")]
	Precision { max_decimals: u8, quantity: U256 },

	#[error("Quote service error: {0}")]
	QuoteService(String),

	#[error("Timed out after {waited_ms}ms waiting for {handle}")]
	Timeout {
		handle: SubmissionHandle,
		waited_ms: u64,
	},

	#[error("No OrderCreated event in transaction {0}")]
	EventNotFound(B256),

	#[error("Execution reverted: {}", .0.as_deref().unwrap_or("no reason"))]
	ChainRevert(Option<String>),

	#[error("Chain error: {0}")]
	Chain(ChainError),

	#[error("Signing error: {0}")]
	Signing(String),

	#[error("Delivery error: {0}")]
	Delivery(DeliveryError),

	#[error("Batch error: {0}")]
	Batch(#[from] BatchError),
}

impl From<ChainError> for SubmissionError {
	fn from(err: ChainError) -> Self {
		match err {
			ChainError::Revert(reason) => Self::ChainRevert(reason),
			other => Self::Chain(other),
		}
	}
}

impl From<AccountError> for SubmissionError {
	fn from(err: AccountError) -> Self {
		Self::Signing(err.to_string())
	}
}

impl From<PricingError> for SubmissionError {
	fn from(err: PricingError) -> Self {
		match err {
			PricingError::InvalidResponse(msg) => Self::Validation(msg),
			other => Self::QuoteService(other.to_string()),
		}
	}
}

impl From<PermitError> for SubmissionError {
	fn from(err: PermitError) -> Self {
		match err {
			PermitError::Chain(e) => e.into(),
			other => Self::Signing(other.to_string()),
		}
	}
}

impl From<DeliveryError> for SubmissionError {
	fn from(err: DeliveryError) -> Self {
		match err {
			DeliveryError::Timeout { handle, waited_ms } => Self::Timeout { handle, waited_ms },
			DeliveryError::Chain(e) => e.into(),
			DeliveryError::Signing(e) => e.into(),
			other => Self::Delivery(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pricing_errors_split_by_kind() {
		let http: SubmissionError = PricingError::Http {
			status: 503,
			body: "down".to_string(),
		}
		.into();
		assert!(matches!(http, SubmissionError::QuoteService(msg) if msg.contains("503")));

		let network: SubmissionError = PricingError::Network("refused".to_string()).into();
		assert!(matches!(network, SubmissionError::QuoteService(_)));

		let invalid: SubmissionError = PricingError::InvalidResponse("bad".to_string()).into();
		assert!(matches!(invalid, SubmissionError::Validation(_)));
	}

	#[test]
	fn test_revert_on_send_is_chain_revert() {
		let err: SubmissionError =
			DeliveryError::Chain(ChainError::Revert(Some("InvalidSignature".to_string()))).into();
		assert!(matches!(err, SubmissionError::ChainRevert(Some(reason)) if reason == "InvalidSignature"));
	}

	#[test]
	fn test_delivery_timeout_keeps_handle() {
		let handle = SubmissionHandle::UserOperation(B256::ZERO);
		let err: SubmissionError = DeliveryError::Timeout {
			handle,
			waited_ms: 60_000,
		}
		.into();
		assert!(matches!(err, SubmissionError::Timeout { handle: h, waited_ms: 60_000 } if h == handle));
	}

	#[test]
	fn test_stale_permit_is_signing_error() {
		let err: SubmissionError = PermitError::StaleNonce {
			signed: U256::from(4),
			current: U256::from(5),
		}
		.into();
		assert!(matches!(err, SubmissionError::Signing(_)));
	}
}
