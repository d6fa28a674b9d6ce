//! Relayer (bundler) and paymaster JSON-RPC client.

use crate::gas::GasPrice;
use crate::user_operation::UserOperation;
use crate::DeliveryError;
use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use submitter_config::SponsoredConfig;
use submitter_types::ReceiptLog;
use tracing::debug;

/// Gas limits returned by `eth_estimateUserOperationGas`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
	pub pre_verification_gas: U256,
	pub verification_gas_limit: U256,
	pub call_gas_limit: U256,
}

/// Paymaster response: sponsorship data plus the limits it was priced at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
	pub paymaster_and_data: Bytes,
	pub pre_verification_gas: U256,
	pub verification_gas_limit: U256,
	pub call_gas_limit: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReceipt {
	pub transaction_hash: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayerLog {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
}

impl From<RelayerLog> for ReceiptLog {
	fn from(log: RelayerLog) -> Self {
		Self {
			address: log.address,
			topics: log.topics,
			data: log.data,
		}
	}
}

/// Result of `eth_getUserOperationReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
	pub user_op_hash: B256,
	pub success: bool,
	#[serde(default)]
	pub reason: Option<String>,
	/// Logs emitted by this operation only.
	#[serde(default)]
	pub logs: Vec<RelayerLog>,
	/// The bundle transaction that included the operation.
	pub receipt: BundleReceipt,
}

#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RelayerInterface: Send + Sync {
	async fn send_user_operation(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<B256, DeliveryError>;

	/// `None` until the operation is included.
	async fn user_operation_receipt(
		&self,
		hash: B256,
	) -> Result<Option<UserOperationReceipt>, DeliveryError>;

	async fn estimate_user_operation_gas(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<GasEstimate, DeliveryError>;

	async fn sponsor_user_operation(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<Sponsorship, DeliveryError>;

	async fn gas_price(&self) -> Result<GasPrice, DeliveryError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a, P> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: P,
}

#[derive(Deserialize)]
struct JsonRpcResponse<R> {
	result: Option<R>,
	error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
}

#[derive(Deserialize)]
struct GasPriceTiers {
	standard: GasPrice,
}

/// JSON-RPC relayer over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRelayer {
	client: Client,
	relayer_url: String,
	sponsor_url: String,
	api_key: Option<String>,
	gas_price_method: String,
	sponsor_method: String,
}

impl HttpRelayer {
	pub fn new(config: &SponsoredConfig, timeout: Duration) -> Result<Self, DeliveryError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| DeliveryError::Config(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			relayer_url: config.relayer_url.clone(),
			sponsor_url: config
				.sponsor_url
				.clone()
				.unwrap_or_else(|| config.relayer_url.clone()),
			api_key: config.api_key.clone(),
			gas_price_method: config.gas_price_method.clone(),
			sponsor_method: config.sponsor_method.clone(),
		})
	}

	async fn rpc<P, R>(
		&self,
		url: &str,
		method: &str,
		params: P,
	) -> Result<Option<R>, DeliveryError>
	where
		P: Serialize + Send,
		R: DeserializeOwned + Send,
	{
		let body = JsonRpcRequest {
			jsonrpc: "2.0",
			id: 1,
			method,
			params,
		};

		let mut request = self.client.post(url).json(&body);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		debug!(method, "Relayer request");

		let response = request
			.send()
			.await
			.map_err(|e| DeliveryError::Relayer(format!("{} failed: {}", method, e)))?;

		let status = response.status();
		if !status.is_success() {
			let text = response
				.text()
				.await
				.unwrap_or_else(|_| "Unknown error".to_string());
			return Err(DeliveryError::Relayer(format!(
				"{} returned {}: {}",
				method, status, text
			)));
		}

		let parsed: JsonRpcResponse<R> = response.json().await.map_err(|e| {
			DeliveryError::Relayer(format!("{} returned invalid JSON: {}", method, e))
		})?;

		if let Some(error) = parsed.error {
			return Err(DeliveryError::Relayer(format!(
				"{} error {}: {}",
				method, error.code, error.message
			)));
		}

		Ok(parsed.result)
	}

	async fn rpc_required<P, R>(
		&self,
		url: &str,
		method: &str,
		params: P,
	) -> Result<R, DeliveryError>
	where
		P: Serialize + Send,
		R: DeserializeOwned + Send,
	{
		self.rpc(url, method, params)
			.await?
			.ok_or_else(|| DeliveryError::Relayer(format!("{} returned no result", method)))
	}
}

#[async_trait]
impl RelayerInterface for HttpRelayer {
	async fn send_user_operation(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<B256, DeliveryError> {
		self.rpc_required(&self.relayer_url, "eth_sendUserOperation", (op, entry_point))
			.await
	}

	async fn user_operation_receipt(
		&self,
		hash: B256,
	) -> Result<Option<UserOperationReceipt>, DeliveryError> {
		self.rpc(&self.relayer_url, "eth_getUserOperationReceipt", [hash])
			.await
	}

	async fn estimate_user_operation_gas(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<GasEstimate, DeliveryError> {
		self.rpc_required(
			&self.relayer_url,
			"eth_estimateUserOperationGas",
			(op, entry_point),
		)
		.await
	}

	async fn sponsor_user_operation(
		&self,
		op: &UserOperation,
		entry_point: Address,
	) -> Result<Sponsorship, DeliveryError> {
		self.rpc_required(&self.sponsor_url, &self.sponsor_method, (op, entry_point))
			.await
	}

	async fn gas_price(&self) -> Result<GasPrice, DeliveryError> {
		let tiers: GasPriceTiers = self
			.rpc_required(
				&self.relayer_url,
				&self.gas_price_method,
				Vec::<serde_json::Value>::new(),
			)
			.await?;
		Ok(tiers.standard)
	}
}
