//! Order intent types.
//!
//! An [`OrderIntent`] is the validated, immutable description of one trade
//! request. It maps one-to-one onto the processor's `Order` struct.

use crate::contracts;
use crate::quote::FeeQuote;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
	Buy,
	Sell,
}

impl FromStr for OrderSide {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"buy" => Ok(Self::Buy),
			"sell" => Ok(Self::Sell),
			other => Err(format!("unknown order side '{}'", other)),
		}
	}
}

/// Execution kind. Encoded as the processor's `orderType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
	Market = 0,
	Limit = 1,
}

impl FromStr for OrderKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"market" => Ok(Self::Market),
			"limit" => Ok(Self::Limit),
			other => Err(format!("unknown order kind '{}'", other)),
		}
	}
}

/// Time-in-force policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
	Day = 0,
	Gtc = 1,
	Ioc = 2,
	Fok = 3,
}

impl FromStr for TimeInForce {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"day" => Ok(Self::Day),
			"gtc" => Ok(Self::Gtc),
			"ioc" => Ok(Self::Ioc),
			"fok" => Ok(Self::Fok),
			other => Err(format!("unknown time in force '{}'", other)),
		}
	}
}

/// A validated trade request.
///
/// `quantity` is denominated in the smallest unit of the asset token for
/// sells and of the payment token for buys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
	pub asset_token: Address,
	pub payment_token: Address,
	pub side: OrderSide,
	pub quantity: U256,
	pub kind: OrderKind,
	/// Zero for market orders.
	pub limit_price: U256,
	pub tif: TimeInForce,
	pub recipient: Address,
	/// Unix seconds at construction.
	pub request_timestamp: u64,
}

impl OrderIntent {
	pub fn is_sell(&self) -> bool {
		self.side == OrderSide::Sell
	}

	pub fn asset_quantity(&self) -> U256 {
		match self.side {
			OrderSide::Sell => self.quantity,
			OrderSide::Buy => U256::ZERO,
		}
	}

	pub fn payment_quantity(&self) -> U256 {
		match self.side {
			OrderSide::Buy => self.quantity,
			OrderSide::Sell => U256::ZERO,
		}
	}

	/// Amount of payment token the processor pulls: payment quantity plus fee.
	///
	/// Returns `None` on overflow.
	pub fn total_spend(&self, quote: &FeeQuote) -> Option<U256> {
		self.payment_quantity().checked_add(quote.fee)
	}

	/// Converts the intent into the processor's ABI struct.
	pub fn to_contract_order(&self) -> contracts::Order {
		contracts::Order {
			requestTimestamp: self.request_timestamp,
			recipient: self.recipient,
			assetToken: self.asset_token,
			paymentToken: self.payment_token,
			sell: self.is_sell(),
			orderType: self.kind as u8,
			assetTokenQuantity: self.asset_quantity(),
			paymentTokenQuantity: self.payment_quantity(),
			price: self.limit_price,
			tif: self.tif as u8,
		}
	}
}

/// Lifecycle state of an order on the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	None,
	Active,
	Fulfilled,
	Cancelled,
}

impl TryFrom<u8> for OrderStatus {
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::None),
			1 => Ok(Self::Active),
			2 => Ok(Self::Fulfilled),
			3 => Ok(Self::Cancelled),
			other => Err(other),
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::None => "NONE",
			Self::Active => "ACTIVE",
			Self::Fulfilled => "FULFILLED",
			Self::Cancelled => "CANCELLED",
		};
		f.write_str(s)
	}
}

/// Order identity decoded from the processor's `OrderCreated` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
	pub order_id: U256,
	pub requester: Address,
}
