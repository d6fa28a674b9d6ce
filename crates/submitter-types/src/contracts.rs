//! Solidity bindings for the contracts the submitter talks to.
//!
//! Covers the order processor (settlement contract), permit-capable ERC-20
//! tokens, the ERC-4337 entry point and the smart account used by sponsored
//! delivery.

use alloy::sol;

sol! {
	/// Order parameters as accepted by `createOrder`.
	#[derive(Debug, Default, PartialEq, Eq)]
	struct Order {
		uint64 requestTimestamp;
		address recipient;
		address assetToken;
		address paymentToken;
		bool sell;
		uint8 orderType;
		uint256 assetTokenQuantity;
		uint256 paymentTokenQuantity;
		uint256 price;
		uint8 tif;
	}

	/// Fee quote as signed by the pricing service.
	#[derive(Debug, Default, PartialEq, Eq)]
	struct FeeQuote {
		uint256 orderId;
		address requester;
		uint256 fee;
		uint64 timestamp;
		uint64 deadline;
	}

	/// Order processor surface used by the pipeline.
	interface IOrderProcessor {
		event OrderCreated(uint256 indexed id, address indexed requester, Order order, uint256 feesEscrowed);

		function orderDecimalReduction(address token) external view returns (uint8);
		function getOrderStatus(uint256 id) external view returns (uint8);
		function selfPermit(
			address token,
			address owner,
			uint256 value,
			uint256 deadline,
			uint8 v,
			bytes32 r,
			bytes32 s
		) external;
		function createOrder(Order order, FeeQuote feeQuote, bytes feeQuoteSignature) external returns (uint256 id);
		function multicall(bytes[] data) external returns (bytes[] results);
	}

	/// Token reads needed to sign an EIP-2612 permit.
	interface IERC20Permit {
		function name() external view returns (string);
		function version() external view returns (string);
		function decimals() external view returns (uint8);
		function nonces(address owner) external view returns (uint256);
	}

	/// EIP-2612 permit message.
	#[derive(Debug, PartialEq, Eq)]
	struct Permit {
		address owner;
		address spender;
		uint256 value;
		uint256 nonce;
		uint256 deadline;
	}

	/// ERC-4337 entry point nonce lookup.
	interface IEntryPoint {
		function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
	}

	/// Smart account execution entry.
	interface ISmartAccount {
		function execute(address dest, uint256 value, bytes func) external;
	}
}
