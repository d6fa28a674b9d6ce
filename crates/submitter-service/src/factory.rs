//! Wires configured components into an [`OrderSubmitter`].

use crate::OrderArgs;
use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use submitter_account::{create_account, AccountInterface};
use submitter_chain::{AlloyChain, ChainInterface};
use submitter_config::{DeliveryStrategy, SubmitterConfig};
use submitter_core::{OrderRequest, OrderSubmitter, ReceiptParser};
use submitter_delivery::create_delivery;
use submitter_permit::PermitAuthorizer;
use submitter_pricing::create_pricing;
use submitter_types::Address;
use tracing::info;

pub struct Components {
	pub submitter: OrderSubmitter,
	/// Address of the signing key.
	pub signer: Address,
}

pub async fn build_submitter(config: &SubmitterConfig) -> Result<Components> {
	let wallet = create_account(&config.account).context("Failed to load account")?;
	let chain_id = config.network.chain_id;

	let chain: Arc<dyn ChainInterface> = Arc::new(
		AlloyChain::with_signer(&config.network.rpc_url, chain_id, wallet.signer())
			.context("Failed to create chain client")?,
	);

	let remote_chain_id = chain.chain_id().await.context("Failed to read chain ID")?;
	if remote_chain_id != chain_id {
		bail!(
			"RPC endpoint is on chain {} but configuration expects {}",
			remote_chain_id,
			chain_id
		);
	}

	let account: Arc<dyn AccountInterface> = Arc::new(wallet);
	let signer = account.address();

	let pricing =
		Arc::new(create_pricing(&config.pricing).context("Failed to create pricing client")?);
	let requester = requester(config, signer);
	let mut permits = PermitAuthorizer::new(chain.clone(), account.clone())
		.with_deadline_secs(config.permit.deadline_secs);
	if requester != signer {
		permits = permits.with_smart_account(requester);
	}
	let delivery = create_delivery(&config.delivery, chain.clone(), account.clone(), chain_id)
		.context("Failed to create delivery")?;

	info!(
		signer = %signer,
		requester = %requester,
		strategy = ?config.delivery.strategy,
		"Submitter ready"
	);

	let submitter = OrderSubmitter::new(
		chain,
		account,
		pricing,
		permits,
		delivery,
		config.network.processor_address,
		chain_id,
		requester,
	);

	Ok(Components { submitter, signer })
}

/// Read-only access for status queries; no key required.
pub fn build_status_reader(config: &SubmitterConfig) -> Result<ReceiptParser> {
	let chain = AlloyChain::new(&config.network.rpc_url)?;
	Ok(ReceiptParser::new(
		Arc::new(chain),
		config.network.processor_address,
	))
}

/// The address that calls `createOrder` under the configured strategy, and
/// so the permit owner.
fn requester(config: &SubmitterConfig, signer: Address) -> Address {
	match (&config.delivery.strategy, &config.delivery.sponsored) {
		(DeliveryStrategy::Sponsored, Some(sponsored)) => sponsored.account_address,
		_ => signer,
	}
}

/// Resolves symbols against `[[assets]]` and fills in the recipient.
pub fn order_request(
	config: &SubmitterConfig,
	args: &OrderArgs,
	signer: Address,
) -> Result<OrderRequest> {
	let resolve = |value: &str| {
		config.resolve_asset(value).ok_or_else(|| {
			anyhow!(
				"Unknown asset '{}': not an address or configured symbol",
				value
			)
		})
	};

	Ok(OrderRequest {
		asset_token: resolve(&args.asset)?,
		payment_token: resolve(&args.payment)?,
		side: args.side,
		quantity: args.quantity,
		kind: args.kind,
		limit_price: args.limit_price,
		tif: args.tif,
		recipient: args.recipient.unwrap_or(signer),
	})
}
