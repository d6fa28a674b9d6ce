//! Gas pricing for user operations.

use crate::relayer::RelayerInterface;
use crate::DeliveryError;
use alloy::primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// EIP-1559 fee pair for a user operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPrice {
	pub max_fee_per_gas: U256,
	pub max_priority_fee_per_gas: U256,
}

/// Source of fee parameters for sponsored delivery.
#[async_trait]
pub trait GasPriceOracle: Send + Sync {
	async fn gas_price(&self) -> Result<GasPrice, DeliveryError>;
}

/// Asks the relayer for its current standard-tier price.
pub struct RelayerGasPriceOracle {
	relayer: Arc<dyn RelayerInterface>,
}

impl RelayerGasPriceOracle {
	pub fn new(relayer: Arc<dyn RelayerInterface>) -> Self {
		Self { relayer }
	}
}

#[async_trait]
impl GasPriceOracle for RelayerGasPriceOracle {
	async fn gas_price(&self) -> Result<GasPrice, DeliveryError> {
		self.relayer.gas_price().await
	}
}

/// Always returns the same price.
pub struct FixedGasPriceOracle(pub GasPrice);

#[async_trait]
impl GasPriceOracle for FixedGasPriceOracle {
	async fn gas_price(&self) -> Result<GasPrice, DeliveryError> {
		Ok(self.0)
	}
}
