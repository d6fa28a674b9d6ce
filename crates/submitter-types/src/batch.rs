//! Atomic execution batch types.
//!
//! A batch always holds exactly two calls against the order processor:
//! the spend authorization followed by the order creation. Both run inside
//! one `multicall` so they succeed or revert together.

use crate::contracts::IOrderProcessor;
use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
	#[error("Batch must contain exactly 2 calls, got {0}")]
	WrongLength(usize),
	#[error("Call {index} has unexpected selector 0x{selector}, expected {expected}")]
	UnexpectedCall {
		index: usize,
		selector: String,
		expected: &'static str,
	},
	#[error("Calls target different contracts: {0} and {1}")]
	MixedTargets(Address, Address),
}

/// A single contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
	pub target: Address,
	pub calldata: Bytes,
}

impl Call {
	pub fn new(target: Address, calldata: impl Into<Bytes>) -> Self {
		Self {
			target,
			calldata: calldata.into(),
		}
	}

	/// First four calldata bytes, if present.
	pub fn selector(&self) -> Option<[u8; 4]> {
		self.calldata.get(..4)?.try_into().ok()
	}
}

/// The `[authorization, orderCreation]` pair executed through `multicall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionBatch {
	processor: Address,
	calls: [Call; 2],
}

impl ExecutionBatch {
	/// Validates the shape of `calls` and builds the batch.
	pub fn new(calls: Vec<Call>) -> Result<Self, BatchError> {
		let [authorization, creation]: [Call; 2] = calls
			.try_into()
			.map_err(|calls: Vec<Call>| BatchError::WrongLength(calls.len()))?;

		expect_selector(
			0,
			&authorization,
			IOrderProcessor::selfPermitCall::SELECTOR,
			"selfPermit",
		)?;
		expect_selector(
			1,
			&creation,
			IOrderProcessor::createOrderCall::SELECTOR,
			"createOrder",
		)?;

		if authorization.target != creation.target {
			return Err(BatchError::MixedTargets(authorization.target, creation.target));
		}

		Ok(Self {
			processor: authorization.target,
			calls: [authorization, creation],
		})
	}

	/// The settlement contract both calls target.
	pub fn processor(&self) -> Address {
		self.processor
	}

	/// The calls in execution order: authorization first.
	pub fn calls(&self) -> &[Call] {
		&self.calls
	}

	/// `multicall(bytes[])` calldata, preserving call order.
	pub fn multicall_calldata(&self) -> Bytes {
		IOrderProcessor::multicallCall {
			data: self.calls.iter().map(|c| c.calldata.clone()).collect(),
		}
		.abi_encode()
		.into()
	}
}

fn expect_selector(
	index: usize,
	call: &Call,
	expected: [u8; 4],
	name: &'static str,
) -> Result<(), BatchError> {
	match call.selector() {
		Some(selector) if selector == expected => Ok(()),
		other => Err(BatchError::UnexpectedCall {
			index,
			selector: other.map(hex::encode).unwrap_or_default(),
			expected: name,
		}),
	}
}
