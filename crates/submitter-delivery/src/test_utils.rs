use alloy::sol_types::SolCall;
use submitter_types::contracts::IOrderProcessor;
use submitter_types::{Address, Bytes, Call, ExecutionBatch, B256, U256};

pub fn processor() -> Address {
	"0x4444444444444444444444444444444444444444".parse().unwrap()
}

/// A well-formed `[selfPermit, createOrder]` batch against [`processor`].
pub fn batch() -> ExecutionBatch {
	let permit = IOrderProcessor::selfPermitCall {
		token: Address::ZERO,
		owner: Address::ZERO,
		value: U256::from(1),
		deadline: U256::from(2),
		v: 27,
		r: B256::ZERO,
		s: B256::ZERO,
	};
	let create = IOrderProcessor::createOrderCall {
		order: Default::default(),
		feeQuote: Default::default(),
		feeQuoteSignature: Bytes::new(),
	};
	ExecutionBatch::new(vec![
		Call::new(processor(), permit.abi_encode()),
		Call::new(processor(), create.abi_encode()),
	])
	.unwrap()
}
