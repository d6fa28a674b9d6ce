use alloy::sol_types::SolEvent;
use submitter_types::contracts::IOrderProcessor;
use submitter_types::{
	Address, Bytes, FeeQuote, OrderKind, OrderSide, ReceiptLog, TimeInForce, U256,
};

pub const PROCESSOR: Address = Address::repeat_byte(0x44);
pub const ASSET: Address = Address::repeat_byte(0x11);
pub const PAYMENT: Address = Address::repeat_byte(0x22);
pub const RECIPIENT: Address = Address::repeat_byte(0x33);

/// Anvil's first account.
pub const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn request(side: OrderSide, quantity: u64) -> crate::OrderRequest {
	crate::OrderRequest {
		asset_token: ASSET,
		payment_token: PAYMENT,
		side,
		quantity: U256::from(quantity),
		kind: OrderKind::Market,
		limit_price: U256::ZERO,
		tif: TimeInForce::Gtc,
		recipient: RECIPIENT,
	}
}

pub fn quote(fee: u64, deadline: u64) -> FeeQuote {
	FeeQuote {
		order_id: U256::from(42),
		requester: Address::ZERO,
		fee: U256::from(fee),
		timestamp: 1_700_000_000,
		deadline,
		signature: Bytes::from_static(&[0x5a; 65]),
	}
}

pub fn order_created_log(emitter: Address, id: U256, requester: Address) -> ReceiptLog {
	let event = IOrderProcessor::OrderCreated {
		id,
		requester,
		order: Default::default(),
		feesEscrowed: U256::from(2_500),
	};
	let data = event.encode_log_data();
	ReceiptLog {
		address: emitter,
		topics: data.topics().to_vec(),
		data: data.data,
	}
}
