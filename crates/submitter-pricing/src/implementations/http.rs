//! HTTP client for the pricing service's fee endpoint.

use crate::serde_helpers::{deserialize_u256, deserialize_u64};
use crate::{PricingError, PricingInterface};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use submitter_config::PricingConfig;
use submitter_types::{Address, Bytes, FeeQuote, OrderIntent, U256};
use tracing::{debug, warn};

/// Fee request body.
#[derive(Debug, Serialize)]
struct FeeRequest {
	chain_id: u64,
	contract_address: Address,
	order_data: OrderData,
}

/// The order tuple as the pricing service expects it. Integer amounts are
/// sent as decimal strings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderData {
	request_timestamp: u64,
	recipient: Address,
	asset_token: Address,
	payment_token: Address,
	sell: bool,
	order_type: u8,
	asset_token_quantity: String,
	payment_token_quantity: String,
	price: String,
	tif: u8,
}

impl From<&OrderIntent> for OrderData {
	fn from(intent: &OrderIntent) -> Self {
		Self {
			request_timestamp: intent.request_timestamp,
			recipient: intent.recipient,
			asset_token: intent.asset_token,
			payment_token: intent.payment_token,
			sell: intent.is_sell(),
			order_type: intent.kind as u8,
			asset_token_quantity: intent.asset_quantity().to_string(),
			payment_token_quantity: intent.payment_quantity().to_string(),
			price: intent.limit_price.to_string(),
			tif: intent.tif as u8,
		}
	}
}

#[derive(Debug, Deserialize)]
struct FeeResponse {
	fee_quote: WireFeeQuote,
	fee_quote_signature: Bytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFeeQuote {
	#[serde(deserialize_with = "deserialize_u256")]
	order_id: U256,
	requester: Address,
	#[serde(deserialize_with = "deserialize_u256")]
	fee: U256,
	#[serde(deserialize_with = "deserialize_u64")]
	timestamp: u64,
	#[serde(deserialize_with = "deserialize_u64")]
	deadline: u64,
}

/// Pricing client authenticated with a bearer API key.
#[derive(Debug, Clone)]
pub struct HttpPricingClient {
	client: Client,
	endpoint: String,
	api_key: String,
}

impl HttpPricingClient {
	pub fn new(
		base_url: &str,
		fee_path: &str,
		api_key: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, PricingError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| PricingError::Config(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint: format!("{}{}", base_url.trim_end_matches('/'), fee_path),
			api_key: api_key.into(),
		})
	}
}

#[async_trait]
impl PricingInterface for HttpPricingClient {
	async fn request_quote(
		&self,
		chain_id: u64,
		processor: Address,
		intent: &OrderIntent,
	) -> Result<FeeQuote, PricingError> {
		let body = FeeRequest {
			chain_id,
			contract_address: processor,
			order_data: intent.into(),
		};

		debug!(endpoint = %self.endpoint, chain_id, "Requesting fee quote");

		let response = self
			.client
			.post(&self.endpoint)
			.bearer_auth(&self.api_key)
			.json(&body)
			.send()
			.await
			.map_err(|e| PricingError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let text = response
				.text()
				.await
				.unwrap_or_else(|_| "Unknown error".to_string());
			warn!(status = status.as_u16(), "Fee quote request rejected");
			return Err(PricingError::Http {
				status: status.as_u16(),
				body: text,
			});
		}

		let text = response
			.text()
			.await
			.map_err(|e| PricingError::Network(e.to_string()))?;
		let parsed: FeeResponse = serde_json::from_str(&text)
			.map_err(|e| PricingError::InvalidResponse(e.to_string()))?;

		let quote = into_fee_quote(parsed)?;
		debug!(
			order_id = %quote.order_id,
			fee = %quote.fee,
			deadline = quote.deadline,
			"Parsed fee quote response"
		);

		Ok(quote)
	}
}

fn into_fee_quote(response: FeeResponse) -> Result<FeeQuote, PricingError> {
	let FeeResponse {
		fee_quote,
		fee_quote_signature,
	} = response;

	if fee_quote_signature.is_empty() {
		return Err(PricingError::InvalidResponse(
			"fee quote signature is empty".to_string(),
		));
	}
	if fee_quote.deadline <= fee_quote.timestamp {
		return Err(PricingError::InvalidResponse(format!(
			"quote deadline {} is not after its timestamp {}",
			fee_quote.deadline, fee_quote.timestamp
		)));
	}

	Ok(FeeQuote {
		order_id: fee_quote.order_id,
		requester: fee_quote.requester,
		fee: fee_quote.fee,
		timestamp: fee_quote.timestamp,
		deadline: fee_quote.deadline,
		signature: fee_quote_signature,
	})
}

/// Creates the pricing client described by the pricing section.
pub fn create_pricing(config: &PricingConfig) -> Result<HttpPricingClient, PricingError> {
	HttpPricingClient::new(
		&config.base_url,
		&config.fee_path,
		config.api_key.clone(),
		Duration::from_millis(config.timeout_ms),
	)
}
