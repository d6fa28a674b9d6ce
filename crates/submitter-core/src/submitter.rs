//! The staged submission pipeline.

use crate::bundler::{assemble_batch, encode_authorization_call, encode_order_creation_call};
use crate::intent::{OrderIntentBuilder, OrderRequest};
use crate::receipt::ReceiptParser;
use crate::SubmissionError;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use submitter_account::AccountInterface;
use submitter_chain::ChainInterface;
use submitter_delivery::DeliveryService;
use submitter_permit::PermitAuthorizer;
use submitter_pricing::PricingInterface;
use submitter_types::{
	current_timestamp, truncate_hash, Address, CreatedOrder, ExecutionReceipt, FeeQuote,
	OrderIntent, OrderStatus, SubmissionHandle, U256,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// A confirmed order.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
	pub order: CreatedOrder,
	pub status: OrderStatus,
	pub handle: SubmissionHandle,
	pub receipt: ExecutionReceipt,
	/// Payment quantity plus fee, as authorized by the permit.
	pub total_spend: U256,
}

/// Result of a dry run: the validated intent and its quote.
#[derive(Debug, Serialize)]
pub struct QuotePreview {
	pub intent: OrderIntent,
	pub quote: FeeQuote,
	pub total_spend: U256,
}

/// Runs orders through quote, permit, batch, dispatch and confirmation.
///
/// Holds one async lock per signer so concurrent submissions never sign
/// against the same permit nonce.
pub struct OrderSubmitter {
	account: Arc<dyn AccountInterface>,
	pricing: Arc<dyn PricingInterface>,
	intents: OrderIntentBuilder,
	permits: PermitAuthorizer,
	delivery: DeliveryService,
	receipts: ReceiptParser,
	processor: Address,
	chain_id: u64,
	/// Address that calls `createOrder` and owns the permit: the signer for
	/// direct delivery, the smart account for sponsored delivery.
	requester: Address,
	/// Keyed by signer address.
	locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl OrderSubmitter {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		chain: Arc<dyn ChainInterface>,
		account: Arc<dyn AccountInterface>,
		pricing: Arc<dyn PricingInterface>,
		permits: PermitAuthorizer,
		delivery: DeliveryService,
		processor: Address,
		chain_id: u64,
		requester: Address,
	) -> Self {
		Self {
			account,
			pricing,
			intents: OrderIntentBuilder::new(chain.clone(), processor),
			permits,
			delivery,
			receipts: ReceiptParser::new(chain, processor),
			processor,
			chain_id,
			requester,
			locks: DashMap::new(),
		}
	}

	pub fn processor(&self) -> Address {
		self.processor
	}

	/// Runs the full pipeline for one order and waits for confirmation.
	///
	/// Submissions from the same signer are serialized from intent
	/// construction through confirmation.
	pub async fn submit(
		&self,
		request: &OrderRequest,
	) -> Result<SubmissionOutcome, SubmissionError> {
		let signer = self.account.address();
		let lock = self.locks.entry(signer).or_default().clone();
		let _guard = lock.lock().await;

		let intent = self.intents.build(request).await?;
		let quote = self.request_quote(&intent).await?;

		let total_spend = intent.total_spend(&quote).ok_or_else(|| {
			SubmissionError::Validation("Payment quantity plus fee overflows".to_string())
		})?;

		let permit = self
			.permits
			.build(self.requester, intent.payment_token, self.processor, total_spend)
			.await?;

		let quote_id = quote.order_id;
		let quote_deadline = quote.deadline;
		let batch = assemble_batch(vec![
			encode_authorization_call(self.processor, &permit),
			encode_order_creation_call(self.processor, &intent, quote),
		])?;

		self.permits.verify_current(&permit).await?;
		if current_timestamp() >= quote_deadline {
			return Err(SubmissionError::Validation(format!(
				"Fee quote {} expired before dispatch",
				quote_id
			)));
		}

		info!(
			quote_id = %quote_id,
			total_spend = %total_spend,
			"Dispatching order batch"
		);

		let (handle, receipt) = self.delivery.submit_and_wait(&batch).await?;

		if !receipt.success {
			warn!(
				handle = %handle,
				tx_hash = %truncate_hash(&receipt.transaction_hash),
				reason = receipt.revert_reason.as_deref().unwrap_or("none"),
				"Order batch reverted"
			);
			return Err(SubmissionError::ChainRevert(receipt.revert_reason));
		}

		let order = self.receipts.parse_order_created(&receipt)?;
		let status = self.receipts.query_status(order.order_id).await?;

		info!(
			order_id = %order.order_id,
			status = %status,
			tx_hash = %truncate_hash(&receipt.transaction_hash),
			"Order created"
		);

		Ok(SubmissionOutcome {
			order,
			status,
			handle,
			receipt,
			total_spend,
		})
	}

	/// Validates the request and fetches a quote without signing anything.
	pub async fn quote(&self, request: &OrderRequest) -> Result<QuotePreview, SubmissionError> {
		let intent = self.intents.build(request).await?;
		let quote = self.request_quote(&intent).await?;
		let total_spend = intent.total_spend(&quote).ok_or_else(|| {
			SubmissionError::Validation("Payment quantity plus fee overflows".to_string())
		})?;

		Ok(QuotePreview {
			intent,
			quote,
			total_spend,
		})
	}

	pub async fn order_status(&self, order_id: U256) -> Result<OrderStatus, SubmissionError> {
		self.receipts.query_status(order_id).await
	}

	async fn request_quote(&self, intent: &OrderIntent) -> Result<FeeQuote, SubmissionError> {
		let quote = self
			.pricing
			.request_quote(self.chain_id, self.processor, intent)
			.await?;

		if quote.is_expired(current_timestamp()) {
			return Err(SubmissionError::Validation(format!(
				"Fee quote {} expired at {}",
				quote.order_id, quote.deadline
			)));
		}

		if quote.requester != self.requester {
			warn!(
				quoted = %quote.requester,
				expected = %self.requester,
				"Quote requester differs from submitting account"
			);
		}

		info!(
			quote_id = %quote.order_id,
			fee = %quote.fee,
			deadline = quote.deadline,
			"Received fee quote"
		);
		Ok(quote)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{order_created_log, quote, request, KEY, PAYMENT, PROCESSOR};
	use alloy::sol_types::SolCall;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;
	use submitter_account::LocalWallet;
	use submitter_chain::MockChainInterface;
	use submitter_delivery::{DeliveryError, MockDeliveryInterface};
	use submitter_pricing::{MockPricingInterface, PricingError};
	use submitter_types::contracts::IOrderProcessor;
	use submitter_types::{ExecutionBatch, OrderSide, B256};

	const TX_HASH: B256 = B256::repeat_byte(0x77);

	/// Chain mock answering every read the pipeline makes.
	fn chain() -> MockChainInterface {
		chain_with(|| 3, Duration::ZERO)
	}

	/// `nonce` answers each permit nonce read; the block timestamp read
	/// made while signing the permit takes `block_delay`.
	fn chain_with<F>(nonce: F, block_delay: Duration) -> MockChainInterface
	where
		F: Fn() -> u64 + Send + 'static,
	{
		let mut chain = MockChainInterface::new();
		chain.expect_permit_nonce().returning(move |_, _| {
			let nonce = nonce();
			Box::pin(async move { Ok(U256::from(nonce)) })
		});
		chain
			.expect_token_name()
			.returning(|_| Box::pin(async { Ok("USD Coin".to_string()) }));
		chain
			.expect_token_version()
			.returning(|_| Box::pin(async { Ok("2".to_string()) }));
		chain.expect_chain_id().returning(|| Box::pin(async { Ok(1) }));
		chain.expect_block_timestamp().returning(move || {
			Box::pin(async move {
				tokio::time::sleep(block_delay).await;
				Ok(1_700_000_000)
			})
		});
		chain
			.expect_order_decimal_reduction()
			.returning(|_, _| Box::pin(async { Ok(0) }));
		chain
			.expect_token_decimals()
			.returning(|_| Box::pin(async { Ok(6) }));
		chain
			.expect_order_status()
			.returning(|_, _| Box::pin(async { Ok(1) }));
		chain
	}

	fn pricing(fee: u64) -> MockPricingInterface {
		let mut pricing = MockPricingInterface::new();
		pricing
			.expect_request_quote()
			.returning(move |_, _, _| Box::pin(async move { Ok(quote(fee, u64::MAX)) }));
		pricing
	}

	fn confirmed_receipt(success: bool) -> ExecutionReceipt {
		ExecutionReceipt {
			transaction_hash: TX_HASH,
			block_number: 100,
			success,
			logs: vec![order_created_log(
				PROCESSOR,
				U256::from(42),
				Address::repeat_byte(0x0a),
			)],
			revert_reason: (!success).then(|| "InsufficientAllowance".to_string()),
		}
	}

	fn delivery_mock(success: bool) -> MockDeliveryInterface {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.returning(|_| Box::pin(async { Ok(SubmissionHandle::Transaction(TX_HASH)) }));
		delivery
			.expect_wait()
			.returning(move |_, _| Box::pin(async move { Ok(confirmed_receipt(success)) }));
		delivery
	}

	fn submitter(
		chain: MockChainInterface,
		pricing: MockPricingInterface,
		delivery: MockDeliveryInterface,
	) -> OrderSubmitter {
		build_submitter(chain, pricing, delivery, None)
	}

	/// Requester is the signer, or `smart_account` when set.
	fn build_submitter(
		chain: MockChainInterface,
		pricing: MockPricingInterface,
		delivery: MockDeliveryInterface,
		smart_account: Option<Address>,
	) -> OrderSubmitter {
		let chain: Arc<dyn ChainInterface> = Arc::new(chain);
		let account: Arc<dyn AccountInterface> = Arc::new(LocalWallet::new(KEY).unwrap());
		let requester = smart_account.unwrap_or_else(|| account.address());
		let mut permits = PermitAuthorizer::new(chain.clone(), account.clone());
		if let Some(smart_account) = smart_account {
			permits = permits.with_smart_account(smart_account);
		}
		OrderSubmitter::new(
			chain,
			account,
			Arc::new(pricing),
			permits,
			DeliveryService::new(Arc::new(delivery), Duration::from_secs(60)),
			PROCESSOR,
			1,
			requester,
		)
	}

	fn self_permit(batch: &ExecutionBatch) -> IOrderProcessor::selfPermitCall {
		IOrderProcessor::selfPermitCall::abi_decode(&batch.calls()[0].calldata).unwrap()
	}

	fn permit_value(batch: &ExecutionBatch) -> U256 {
		self_permit(batch).value
	}

	#[tokio::test]
	async fn test_submit_authorizes_quantity_plus_fee() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.withf(|batch| {
				batch.processor() == PROCESSOR && permit_value(batch) == U256::from(1_002_500)
			})
			.times(1)
			.returning(|_| Box::pin(async { Ok(SubmissionHandle::Transaction(TX_HASH)) }));
		delivery
			.expect_wait()
			.withf(|_, timeout| *timeout == Duration::from_secs(60))
			.returning(|_, _| Box::pin(async { Ok(confirmed_receipt(true)) }));

		let outcome = submitter(chain(), pricing(2_500), delivery)
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap();

		assert_eq!(outcome.total_spend, U256::from(1_002_500));
		assert_eq!(outcome.order.order_id, U256::from(42));
		assert_eq!(outcome.status, OrderStatus::Active);
		assert_eq!(outcome.handle, SubmissionHandle::Transaction(TX_HASH));
	}

	#[tokio::test]
	async fn test_precision_failure_skips_pricing() {
		let mut chain = MockChainInterface::new();
		chain
			.expect_order_decimal_reduction()
			.returning(|_, _| Box::pin(async { Ok(12) }));
		chain
			.expect_token_decimals()
			.returning(|_| Box::pin(async { Ok(18) }));

		let mut pricing = MockPricingInterface::new();
		pricing.expect_request_quote().never();
		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter(chain, pricing, delivery)
			.submit(&request(OrderSide::Sell, 1_500_000_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Precision { max_decimals: 6, .. }));
	}

	#[tokio::test]
	async fn test_expired_quote_rejected_before_signing() {
		let mut chain = MockChainInterface::new();
		chain.expect_permit_nonce().never();

		let mut pricing = MockPricingInterface::new();
		pricing
			.expect_request_quote()
			.returning(|_, _, _| Box::pin(async { Ok(quote(2_500, 1)) }));

		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter(chain, pricing, delivery)
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Validation(msg) if msg.contains("expired")));
	}

	#[tokio::test]
	async fn test_pricing_outage_is_quote_service_error() {
		let mut pricing = MockPricingInterface::new();
		pricing.expect_request_quote().returning(|_, _, _| {
			Box::pin(async {
				Err(PricingError::Http {
					status: 502,
					body: "bad gateway".to_string(),
				})
			})
		});

		let err = submitter(chain(), pricing, MockDeliveryInterface::new())
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::QuoteService(_)));
	}

	#[tokio::test]
	async fn test_failed_receipt_is_chain_revert() {
		let err = submitter(chain(), pricing(2_500), delivery_mock(false))
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::ChainRevert(Some(reason)) if reason == "InsufficientAllowance"));
	}

	#[tokio::test]
	async fn test_sponsored_permit_owned_by_smart_account() {
		let smart_account = Address::repeat_byte(0x66);
		let captured: Arc<std::sync::Mutex<Option<ExecutionBatch>>> = Default::default();

		let mut delivery = MockDeliveryInterface::new();
		let slot = captured.clone();
		delivery.expect_submit().times(1).returning(move |batch| {
			*slot.lock().unwrap() = Some(batch.clone());
			Box::pin(async { Ok(SubmissionHandle::UserOperation(TX_HASH)) })
		});
		delivery
			.expect_wait()
			.returning(|_, _| Box::pin(async { Ok(confirmed_receipt(true)) }));

		build_submitter(chain(), pricing(2_500), delivery, Some(smart_account))
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap();

		let batch = captured.lock().unwrap().take().unwrap();
		let permit = self_permit(&batch);
		assert_eq!(permit.owner, smart_account);
		assert_eq!(permit.token, PAYMENT);
		assert_eq!(permit.value, U256::from(1_002_500));
	}

	#[tokio::test]
	async fn test_nonce_consumed_before_dispatch_is_signing_error() {
		let reads = AtomicUsize::new(0);
		let chain = chain_with(
			move || 3 + reads.fetch_add(1, Ordering::SeqCst).min(1) as u64,
			Duration::ZERO,
		);

		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter(chain, pricing(2_500), delivery)
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Signing(_)));
	}

	#[tokio::test]
	async fn test_quote_expiring_during_signing_not_dispatched() {
		let mut pricing = MockPricingInterface::new();
		pricing.expect_request_quote().returning(|_, _, _| {
			let deadline = current_timestamp() + 2;
			Box::pin(async move { Ok(quote(2_500, deadline)) })
		});

		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let err = submitter(
			chain_with(|| 3, Duration::from_millis(2_100)),
			pricing,
			delivery,
		)
		.submit(&request(OrderSide::Buy, 1_000_000))
		.await
		.unwrap_err();

		assert!(matches!(err, SubmissionError::Validation(msg) if msg.contains("before dispatch")));
	}

	#[tokio::test]
	async fn test_delivery_timeout_surfaces() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.returning(|_| Box::pin(async { Ok(SubmissionHandle::UserOperation(TX_HASH)) }));
		delivery.expect_wait().returning(|handle, _| {
			let handle = *handle;
			Box::pin(async move {
				Err(DeliveryError::Timeout {
					handle,
					waited_ms: 60_000,
				})
			})
		});

		let err = submitter(chain(), pricing(2_500), delivery)
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Timeout { .. }));
	}

	#[tokio::test]
	async fn test_missing_event_after_success() {
		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.returning(|_| Box::pin(async { Ok(SubmissionHandle::Transaction(TX_HASH)) }));
		delivery.expect_wait().returning(|_, _| {
			Box::pin(async {
				Ok(ExecutionReceipt {
					transaction_hash: TX_HASH,
					block_number: 100,
					success: true,
					logs: vec![],
					revert_reason: None,
				})
			})
		});

		let err = submitter(chain(), pricing(2_500), delivery)
			.submit(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::EventNotFound(hash) if hash == TX_HASH));
	}

	#[tokio::test]
	async fn test_same_signer_submissions_are_serialized() {
		let in_flight = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));

		let mut delivery = MockDeliveryInterface::new();
		delivery
			.expect_submit()
			.times(2)
			.returning(|_| Box::pin(async { Ok(SubmissionHandle::Transaction(TX_HASH)) }));
		let (current, max) = (in_flight.clone(), peak.clone());
		delivery.expect_wait().times(2).returning(move |_, _| {
			let (current, max) = (current.clone(), max.clone());
			Box::pin(async move {
				let now = current.fetch_add(1, Ordering::SeqCst) + 1;
				max.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(20)).await;
				current.fetch_sub(1, Ordering::SeqCst);
				Ok(confirmed_receipt(true))
			})
		});

		let submitter = submitter(chain(), pricing(2_500), delivery);
		let req = request(OrderSide::Buy, 1_000_000);
		let (a, b) = tokio::join!(submitter.submit(&req), submitter.submit(&req));

		assert!(a.is_ok() && b.is_ok());
		assert_eq!(peak.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_quote_dry_run_signs_nothing() {
		let mut chain = MockChainInterface::new();
		chain.expect_permit_nonce().never();

		let mut delivery = MockDeliveryInterface::new();
		delivery.expect_submit().never();

		let preview = submitter(chain, pricing(2_500), delivery)
			.quote(&request(OrderSide::Buy, 1_000_000))
			.await
			.unwrap();

		assert_eq!(preview.total_spend, U256::from(1_002_500));
		assert_eq!(preview.intent.payment_token, PAYMENT);
	}

	#[tokio::test]
	async fn test_order_status_query() {
		let status = submitter(chain(), pricing(0), MockDeliveryInterface::new())
			.order_status(U256::from(42))
			.await
			.unwrap();
		assert_eq!(status, OrderStatus::Active);
	}
}
