//! Submission handles and execution receipts.
//!
//! Both delivery strategies converge on [`ExecutionReceipt`], which carries
//! the raw logs the receipt parser decodes.

use crate::utils::truncate_hash;
use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier returned by a delivery strategy on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "hash", rename_all = "snake_case")]
pub enum SubmissionHandle {
	/// Hash of a directly broadcast transaction.
	Transaction(B256),
	/// Hash of a user operation handed to the relayer.
	UserOperation(B256),
}

impl SubmissionHandle {
	pub fn hash(&self) -> B256 {
		match self {
			Self::Transaction(hash) | Self::UserOperation(hash) => *hash,
		}
	}
}

impl fmt::Display for SubmissionHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Transaction(hash) => write!(f, "tx:{}", truncate_hash(hash)),
			Self::UserOperation(hash) => write!(f, "userop:{}", truncate_hash(hash)),
		}
	}
}

/// A log entry as emitted on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
}

/// Outcome of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
	/// Hash of the transaction that carried the batch.
	pub transaction_hash: B256,
	pub block_number: u64,
	pub success: bool,
	pub logs: Vec<ReceiptLog>,
	/// Failure reason when the executor reports one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub revert_reason: Option<String>,
}
