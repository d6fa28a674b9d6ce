//! Fee quoting for the order submitter.
//!
//! A quote binds an order identifier, requester and fee under the pricing
//! service's signature. The processor rejects orders whose quote does not
//! verify, so the quote is requested before anything is signed.

use async_trait::async_trait;
use submitter_types::{Address, FeeQuote, OrderIntent};
use thiserror::Error;

pub mod implementations {
	pub mod http;
}
mod serde_helpers;

pub use implementations::http::{create_pricing, HttpPricingClient};

#[derive(Debug, Error)]
pub enum PricingError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// The service answered with a non-success status.
	#[error("Pricing service returned {status}: {body}")]
	Http { status: u16, body: String },
	/// The response could not be turned into a usable quote.
	#[error("Invalid quote response: {0}")]
	InvalidResponse(String),
	#[error("Invalid configuration: {0}")]
	Config(String),
}

#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait PricingInterface: Send + Sync {
	/// Requests a signed fee quote for `intent` on `processor`.
	async fn request_quote(
		&self,
		chain_id: u64,
		processor: Address,
		intent: &OrderIntent,
	) -> Result<FeeQuote, PricingError>;
}
