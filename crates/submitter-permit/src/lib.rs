//! EIP-2612 spend authorization.
//!
//! Builds and signs the `Permit` typed message that lets the order
//! processor pull `payment quantity + fee` from the owner inside the same
//! `multicall` that creates the order. Every signed field must match what
//! the token checks on chain: the domain comes from the token itself, the
//! nonce is the owner's current counter, and the deadline is anchored to
//! chain time rather than the local clock.
//!
//! The owner is the account `createOrder` is called from. For sponsored
//! delivery that is the smart account, which accepts its owner key's
//! signature over the permit digest through ERC-1271.

use std::sync::Arc;
use submitter_account::{AccountError, AccountInterface};
use submitter_chain::{ChainError, ChainInterface};
use submitter_types::{Address, PermitAuthorization, PermitDomain, PermitMessage, U256};
use thiserror::Error;
use tracing::{debug, info};

/// Domain version used when the token does not expose `version()`.
pub const DEFAULT_PERMIT_VERSION: &str = "1";

/// Seconds a permit stays valid after the latest block.
pub const DEFAULT_DEADLINE_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum PermitError {
	#[error("Chain error: {0}")]
	Chain(#[from] ChainError),
	#[error("Signing error: {0}")]
	Signing(#[from] AccountError),
	#[error("Signer {signer} is not the permit owner {owner}")]
	OwnerMismatch { signer: Address, owner: Address },
	#[error("Permit signed for nonce {signed} but current nonce is {current}")]
	StaleNonce { signed: U256, current: U256 },
	#[error("Permit signature does not recover to owner {0}")]
	InvalidSignature(Address),
}

/// Builds and verifies permits for the configured signer.
pub struct PermitAuthorizer {
	chain: Arc<dyn ChainInterface>,
	account: Arc<dyn AccountInterface>,
	deadline_secs: u64,
	/// Smart account controlled by the signing key, if any.
	smart_account: Option<Address>,
}

impl PermitAuthorizer {
	pub fn new(chain: Arc<dyn ChainInterface>, account: Arc<dyn AccountInterface>) -> Self {
		Self {
			chain,
			account,
			deadline_secs: DEFAULT_DEADLINE_SECS,
			smart_account: None,
		}
	}

	pub fn with_deadline_secs(mut self, deadline_secs: u64) -> Self {
		self.deadline_secs = deadline_secs;
		self
	}

	/// Allows permits owned by `account`, signed with the account's owner key.
	pub fn with_smart_account(mut self, account: Address) -> Self {
		self.smart_account = Some(account);
		self
	}

	/// Signs a permit letting `spender` pull `value` of `token` from `owner`.
	///
	/// `owner` must be the signing key or the configured smart account.
	pub async fn build(
		&self,
		owner: Address,
		token: Address,
		spender: Address,
		value: U256,
	) -> Result<PermitAuthorization, PermitError> {
		let signer = self.account.address();
		if signer != owner && self.smart_account != Some(owner) {
			return Err(PermitError::OwnerMismatch { signer, owner });
		}

		let nonce = self.chain.permit_nonce(token, owner).await?;
		let name = self.chain.token_name(token).await?;
		let version = self.probe_version(token).await;
		let chain_id = self.chain.chain_id().await?;
		let block_time = self.chain.block_timestamp().await?;

		let domain = PermitDomain {
			name,
			version,
			chain_id,
			verifying_contract: token,
		};
		let message = PermitMessage {
			owner,
			spender,
			value,
			nonce,
			deadline: U256::from(block_time.saturating_add(self.deadline_secs)),
		};

		let digest = message.signing_hash(&domain);
		let signature = self.account.sign_hash(&digest).await?;

		let permit = PermitAuthorization::from_signature(domain, message, signer, &signature);
		info!(
			token = %token,
			owner = %owner,
			delegated = permit.is_delegated(),
			value = %value,
			nonce = %nonce,
			deadline = %permit.message.deadline,
			"Signed permit"
		);

		Ok(permit)
	}

	/// Checks that `permit` is still usable against the token's current nonce.
	pub async fn verify_current(&self, permit: &PermitAuthorization) -> Result<(), PermitError> {
		let current = self
			.chain
			.permit_nonce(permit.token(), permit.message.owner)
			.await?;
		verify(permit, current)
	}

	async fn probe_version(&self, token: Address) -> String {
		match self.chain.token_version(token).await {
			Ok(version) => version,
			Err(e) => {
				debug!(token = %token, error = %e, "Token has no version(), using default");
				DEFAULT_PERMIT_VERSION.to_string()
			}
		}
	}
}

/// Recomputes the digest with `current_nonce` and checks it recovers to the
/// owner's signing key. A permit whose nonce has been consumed no longer
/// verifies.
pub fn verify(permit: &PermitAuthorization, current_nonce: U256) -> Result<(), PermitError> {
	let mut message = permit.message.clone();
	message.nonce = current_nonce;
	let digest = message.signing_hash(&permit.domain);

	let recovered = permit.signature().recover_address_from_prehash(&digest).ok();
	if recovered == Some(permit.message.owner) {
		return Ok(());
	}

	if current_nonce != permit.message.nonce {
		Err(PermitError::StaleNonce {
			signed: permit.message.nonce,
			current: current_nonce,
		})
	} else {
		Err(PermitError::InvalidSignature(permit.message.owner))
	}
}
