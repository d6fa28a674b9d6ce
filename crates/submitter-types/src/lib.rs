pub mod batch;
pub mod contracts;
pub mod order;
pub mod permit;
pub mod quote;
pub mod receipt;
pub mod utils;

pub use alloy::primitives::{Address, Bytes, B256, U256};
pub use batch::*;
pub use order::*;
pub use permit::*;
pub use quote::*;
pub use receipt::*;
pub use utils::*;
