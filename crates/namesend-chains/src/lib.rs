pub mod balances;
pub mod client_provider;
pub mod error;
pub mod ethereum;
pub mod traits;

pub use balances::{fetch_balance, fetch_balances, TokenBalance};
pub use client_provider::ChainClientProvider;
pub use error::{ChainError, Result};
pub use ethereum::EvmChainOperations;
pub use traits::{ChainOperations, ReceiptStatus};
