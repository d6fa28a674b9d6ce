//! Call encoding and batch assembly.
//!
//! The permit and the order creation travel together through the
//! processor's `multicall`, so the allowance can never outlive a failed
//! order and an order can never be created without its allowance.

use alloy::sol_types::SolCall;
use submitter_types::contracts::IOrderProcessor;
use submitter_types::{
	Address, BatchError, Call, ExecutionBatch, FeeQuote, OrderIntent, PermitAuthorization,
};

/// `selfPermit(token, owner, value, deadline, v, r, s)` on the processor.
pub fn encode_authorization_call(processor: Address, permit: &PermitAuthorization) -> Call {
	let call = IOrderProcessor::selfPermitCall {
		token: permit.token(),
		owner: permit.message.owner,
		value: permit.message.value,
		deadline: permit.message.deadline,
		v: permit.v,
		r: permit.r,
		s: permit.s,
	};
	Call::new(processor, call.abi_encode())
}

/// `createOrder(order, feeQuote, feeQuoteSignature)` on the processor.
///
/// Consumes the quote: it is valid for exactly one order.
pub fn encode_order_creation_call(
	processor: Address,
	intent: &OrderIntent,
	quote: FeeQuote,
) -> Call {
	let call = IOrderProcessor::createOrderCall {
		order: intent.to_contract_order(),
		feeQuote: quote.to_contract(),
		feeQuoteSignature: quote.signature,
	};
	Call::new(processor, call.abi_encode())
}

pub fn assemble_batch(calls: Vec<Call>) -> Result<ExecutionBatch, BatchError> {
	ExecutionBatch::new(calls)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{quote, request, PAYMENT, PROCESSOR};
	use submitter_types::{
		OrderKind, OrderSide, PermitDomain, PermitMessage, TimeInForce, B256, U256,
	};

	fn permit(value: u64) -> PermitAuthorization {
		PermitAuthorization {
			domain: PermitDomain {
				name: "USD Coin".to_string(),
				version: "2".to_string(),
				chain_id: 1,
				verifying_contract: PAYMENT,
			},
			message: PermitMessage {
				owner: Address::repeat_byte(0x0a),
				spender: PROCESSOR,
				value: U256::from(value),
				nonce: U256::ZERO,
				deadline: U256::from(1_700_000_300u64),
			},
			signer: Address::repeat_byte(0x0a),
			v: 28,
			r: B256::repeat_byte(0x01),
			s: B256::repeat_byte(0x02),
		}
	}

	fn intent() -> OrderIntent {
		let req = request(OrderSide::Buy, 1_000_000);
		OrderIntent {
			asset_token: req.asset_token,
			payment_token: req.payment_token,
			side: req.side,
			quantity: req.quantity,
			kind: OrderKind::Market,
			limit_price: U256::ZERO,
			tif: TimeInForce::Gtc,
			recipient: req.recipient,
			request_timestamp: 1_700_000_000,
		}
	}

	#[test]
	fn test_authorization_call_carries_permit_fields() {
		let call = encode_authorization_call(PROCESSOR, &permit(1_002_500));
		assert_eq!(call.target, PROCESSOR);

		let decoded = IOrderProcessor::selfPermitCall::abi_decode(&call.calldata).unwrap();
		assert_eq!(decoded.token, PAYMENT);
		assert_eq!(decoded.value, U256::from(1_002_500));
		assert_eq!(decoded.v, 28);
		assert_eq!(decoded.r, B256::repeat_byte(0x01));
	}

	#[test]
	fn test_order_creation_call_carries_quote() {
		let call = encode_order_creation_call(PROCESSOR, &intent(), quote(2_500, u64::MAX));

		let decoded = IOrderProcessor::createOrderCall::abi_decode(&call.calldata).unwrap();
		assert_eq!(decoded.order.paymentTokenQuantity, U256::from(1_000_000));
		assert!(!decoded.order.sell);
		assert_eq!(decoded.order.tif, TimeInForce::Gtc as u8);
		assert_eq!(decoded.feeQuote.fee, U256::from(2_500));
		assert!(!decoded.feeQuoteSignature.is_empty());
	}

	#[test]
	fn test_batch_is_permit_then_order() {
		let auth = encode_authorization_call(PROCESSOR, &permit(1));
		let order = encode_order_creation_call(PROCESSOR, &intent(), quote(0, u64::MAX));

		let batch = assemble_batch(vec![auth.clone(), order.clone()]).unwrap();
		assert_eq!(batch.calls(), &[auth.clone(), order.clone()]);

		assert!(assemble_batch(vec![order, auth]).is_err());
	}
}
