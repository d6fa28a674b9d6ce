//! Order intent construction and validation.

use crate::SubmissionError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use submitter_chain::ChainInterface;
use submitter_types::{
	current_timestamp, Address, OrderIntent, OrderKind, OrderSide, TimeInForce, U256,
};
use tracing::debug;

/// Caller-supplied order parameters before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
	pub asset_token: Address,
	pub payment_token: Address,
	pub side: OrderSide,
	/// Asset units for sells, payment units for buys.
	pub quantity: U256,
	pub kind: OrderKind,
	pub limit_price: U256,
	pub tif: TimeInForce,
	pub recipient: Address,
}

/// Validates order requests and turns them into [`OrderIntent`]s.
///
/// Sell quantities are checked against the processor's decimal reduction
/// for the asset before anything is quoted.
pub struct OrderIntentBuilder {
	/// Read access for token decimals and the processor's precision rule.
	chain: Arc<dyn ChainInterface>,
	processor: Address,
}

impl OrderIntentBuilder {
	pub fn new(chain: Arc<dyn ChainInterface>, processor: Address) -> Self {
		Self { chain, processor }
	}

	/// Validates `request` and stamps it with the current time.
	///
	/// Static checks run before any chain access; sells additionally pass
	/// [`Self::validate_precision`].
	pub async fn build(&self, request: &OrderRequest) -> Result<OrderIntent, SubmissionError> {
		if request.quantity.is_zero() {
			return Err(SubmissionError::Validation(
				"Order quantity must be greater than zero".to_string(),
			));
		}

		match request.kind {
			OrderKind::Limit if request.limit_price.is_zero() => {
				return Err(SubmissionError::Validation(
					"Limit orders require a non-zero limit price".to_string(),
				));
			}
			OrderKind::Market if !request.limit_price.is_zero() => {
				return Err(SubmissionError::Validation(
					"Market orders must not carry a limit price".to_string(),
				));
			}
			_ => {}
		}

		if request.side == OrderSide::Sell {
			self.validate_precision(request.asset_token, request.quantity)
				.await?;
		}

		Ok(OrderIntent {
			asset_token: request.asset_token,
			payment_token: request.payment_token,
			side: request.side,
			quantity: request.quantity,
			kind: request.kind,
			limit_price: request.limit_price,
			tif: request.tif,
			recipient: request.recipient,
			request_timestamp: current_timestamp(),
		})
	}

	/// Rejects sell quantities the processor would truncate.
	///
	/// The processor drops `orderDecimalReduction(asset)` trailing decimals
	/// from sell quantities, so `quantity` must be a multiple of
	/// `10^reduction`.
	pub async fn validate_precision(
		&self,
		asset: Address,
		quantity: U256,
	) -> Result<(), SubmissionError> {
		let reduction = self
			.chain
			.order_decimal_reduction(self.processor, asset)
			.await?;
		let decimals = self.chain.token_decimals(asset).await?;

		if reduction > decimals {
			return Err(SubmissionError::Validation(format!(
				"Decimal reduction {} exceeds token decimals {} for {}",
				reduction, decimals, asset
			)));
		}

		let divisor = U256::from(10u64).pow(U256::from(reduction));
		debug!(asset = %asset, reduction, decimals, "Checking sell precision");

		if !(quantity % divisor).is_zero() {
			return Err(SubmissionError::Precision {
				max_decimals: decimals - reduction,
				quantity,
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{request, ASSET, PROCESSOR};
	use submitter_chain::MockChainInterface;

	fn precision_chain(reduction: u8, decimals: u8) -> MockChainInterface {
		let mut chain = MockChainInterface::new();
		chain
			.expect_order_decimal_reduction()
			.withf(|processor, token| *processor == PROCESSOR && *token == ASSET)
			.returning(move |_, _| Box::pin(async move { Ok(reduction) }));
		chain
			.expect_token_decimals()
			.returning(move |_| Box::pin(async move { Ok(decimals) }));
		chain
	}

	#[tokio::test]
	async fn test_zero_quantity_rejected_before_chain() {
		let mut chain = MockChainInterface::new();
		chain.expect_order_decimal_reduction().never();
		chain.expect_token_decimals().never();
		let builder = OrderIntentBuilder::new(Arc::new(chain), PROCESSOR);

		let mut req = request(OrderSide::Sell, 0);
		req.quantity = U256::ZERO;

		assert!(matches!(
			builder.build(&req).await,
			Err(SubmissionError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_price_rules_by_kind() {
		let builder = OrderIntentBuilder::new(Arc::new(MockChainInterface::new()), PROCESSOR);

		let mut limit = request(OrderSide::Buy, 1_000_000);
		limit.kind = OrderKind::Limit;
		assert!(matches!(
			builder.build(&limit).await,
			Err(SubmissionError::Validation(_))
		));

		limit.limit_price = U256::from(150);
		let intent = builder.build(&limit).await.unwrap();
		assert_eq!(intent.limit_price, U256::from(150));

		let mut market = request(OrderSide::Buy, 1_000_000);
		market.limit_price = U256::from(1);
		assert!(matches!(
			builder.build(&market).await,
			Err(SubmissionError::Validation(_))
		));
	}

	#[tokio::test]
	async fn test_buy_skips_precision_check() {
		let mut chain = MockChainInterface::new();
		chain.expect_order_decimal_reduction().never();
		let builder = OrderIntentBuilder::new(Arc::new(chain), PROCESSOR);

		let intent = builder.build(&request(OrderSide::Buy, 1_000_001)).await.unwrap();
		assert_eq!(intent.payment_quantity(), U256::from(1_000_001));
		assert!(intent.request_timestamp > 0);
	}

	#[tokio::test]
	async fn test_sell_precision_enforced() {
		// 18 decimals, 9 stripped: multiples of 10^9 only.
		let builder = OrderIntentBuilder::new(Arc::new(precision_chain(9, 18)), PROCESSOR);

		let ok = builder
			.build(&request(OrderSide::Sell, 5_000_000_000))
			.await
			.unwrap();
		assert_eq!(ok.asset_quantity(), U256::from(5_000_000_000u64));

		let err = builder
			.build(&request(OrderSide::Sell, 5_000_000_001))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			SubmissionError::Precision { max_decimals: 9, .. }
		));
	}

	#[tokio::test]
	async fn test_reduction_above_decimals_is_invalid() {
		let builder = OrderIntentBuilder::new(Arc::new(precision_chain(8, 6)), PROCESSOR);
		let err = builder
			.build(&request(OrderSide::Sell, 100_000_000))
			.await
			.unwrap_err();
		assert!(matches!(err, SubmissionError::Validation(_)));
	}
}
