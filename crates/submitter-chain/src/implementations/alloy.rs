//! Alloy-backed chain client.
//!
//! Reads go through `eth_call` with ABI-encoded calldata from the
//! compiled-in contract bindings. Writes are signed by the wallet attached
//! to the provider, when one is configured.

use crate::{ChainError, ChainInterface};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{decode_revert_reason, SolCall};
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportError;
use async_trait::async_trait;
use submitter_types::contracts::{IERC20Permit, IEntryPoint, IOrderProcessor};
use submitter_types::{truncate_hash, ExecutionReceipt, ReceiptLog};
use tracing::{debug, info};

/// Chain client over a single HTTP endpoint.
pub struct AlloyChain {
	provider: DynProvider,
	can_sign: bool,
}

impl AlloyChain {
	/// Read-only client.
	pub fn new(rpc_url: &str) -> Result<Self, ChainError> {
		let url = parse_url(rpc_url)?;
		let provider = ProviderBuilder::new().connect_http(url).erased();

		Ok(Self {
			provider,
			can_sign: false,
		})
	}

	/// Client whose provider signs outgoing transactions with `signer`.
	pub fn with_signer(
		rpc_url: &str,
		chain_id: u64,
		signer: PrivateKeySigner,
	) -> Result<Self, ChainError> {
		let url = parse_url(rpc_url)?;
		let signer = alloy::signers::Signer::with_chain_id(signer, Some(chain_id));
		let wallet = EthereumWallet::from(signer);

		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(url)
			.erased();

		Ok(Self {
			provider,
			can_sign: true,
		})
	}

	async fn call<C: SolCall + Send>(&self, to: Address, call: C) -> Result<C::Return, ChainError> {
		let request = TransactionRequest::default()
			.with_to(to)
			.with_input(call.abi_encode());

		let output = self.provider.call(request).await.map_err(map_transport_error)?;

		C::abi_decode_returns(&output).map_err(|e| {
			ChainError::Decode(format!("Failed to decode {} return: {}", C::SIGNATURE, e))
		})
	}
}

#[async_trait]
impl ChainInterface for AlloyChain {
	async fn chain_id(&self) -> Result<u64, ChainError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get chain ID: {}", e)))
	}

	async fn block_timestamp(&self) -> Result<u64, ChainError> {
		let block = self
			.provider
			.get_block_by_number(BlockNumberOrTag::Latest)
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get latest block: {}", e)))?
			.ok_or_else(|| ChainError::Rpc("Latest block not available".to_string()))?;

		Ok(block.header.timestamp)
	}

	async fn token_name(&self, token: Address) -> Result<String, ChainError> {
		self.call(token, IERC20Permit::nameCall {}).await
	}

	async fn token_version(&self, token: Address) -> Result<String, ChainError> {
		self.call(token, IERC20Permit::versionCall {}).await
	}

	async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
		self.call(token, IERC20Permit::decimalsCall {}).await
	}

	async fn permit_nonce(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
		self.call(token, IERC20Permit::noncesCall { owner }).await
	}

	async fn order_decimal_reduction(
		&self,
		processor: Address,
		token: Address,
	) -> Result<u8, ChainError> {
		self.call(processor, IOrderProcessor::orderDecimalReductionCall { token })
			.await
	}

	async fn order_status(&self, processor: Address, order_id: U256) -> Result<u8, ChainError> {
		self.call(processor, IOrderProcessor::getOrderStatusCall { id: order_id })
			.await
	}

	async fn entry_point_nonce(
		&self,
		entry_point: Address,
		sender: Address,
	) -> Result<U256, ChainError> {
		self.call(
			entry_point,
			IEntryPoint::getNonceCall {
				sender,
				key: Default::default(),
			},
		)
		.await
	}

	async fn send_transaction(&self, to: Address, calldata: Bytes) -> Result<B256, ChainError> {
		if !self.can_sign {
			return Err(ChainError::NoSigner);
		}

		let request = TransactionRequest::default()
			.with_to(to)
			.with_input(calldata);

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(map_transport_error)?;

		let tx_hash = *pending.tx_hash();
		info!(tx_hash = %truncate_hash(&tx_hash), "Submitted transaction");

		Ok(tx_hash)
	}

	async fn transaction_receipt(
		&self,
		hash: B256,
	) -> Result<Option<ExecutionReceipt>, ChainError> {
		let receipt = self
			.provider
			.get_transaction_receipt(hash)
			.await
			.map_err(|e| ChainError::Rpc(format!("Failed to get receipt: {}", e)))?;

		if receipt.is_none() {
			debug!(tx_hash = %truncate_hash(&hash), "Receipt not yet available");
		}

		Ok(receipt.map(|r| convert_receipt(&r)))
	}
}

fn parse_url(rpc_url: &str) -> Result<Url, ChainError> {
	rpc_url
		.parse()
		.map_err(|e| ChainError::Config(format!("Invalid RPC URL: {}", e)))
}

/// Surfaces revert data from an RPC error response as [`ChainError::Revert`].
fn map_transport_error(error: TransportError) -> ChainError {
	if let Some(payload) = error.as_error_resp() {
		if let Some(data) = payload.as_revert_data() {
			return ChainError::Revert(decode_revert_reason(&data));
		}
		if payload.message.contains("revert") {
			return ChainError::Revert(Some(payload.message.to_string()));
		}
	}
	ChainError::Rpc(error.to_string())
}

fn convert_receipt(receipt: &TransactionReceipt) -> ExecutionReceipt {
	ExecutionReceipt {
		transaction_hash: receipt.transaction_hash,
		block_number: receipt.block_number.unwrap_or(0),
		success: receipt.status(),
		logs: receipt
			.logs()
			.iter()
			.map(|log| ReceiptLog {
				address: log.inner.address,
				topics: log.inner.data.topics().to_vec(),
				data: log.inner.data.data.clone(),
			})
			.collect(),
		revert_reason: None,
	}
}
