use crate::Result;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use namesend_models::TokenIdentifier;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

// implementors of this trait should be stateless
#[async_trait]
pub trait ChainOperations: Send + Sync {
    /// Dry-run a call from `tx.from` against the latest block without
    /// broadcasting it. A revert is reported as `ChainError::Revert`.
    async fn simulate(&self, chain_id: u64, tx: &TransactionRequest) -> Result<()>;

    /// Read `decimals()` from a token contract
    async fn token_decimals(&self, chain_id: u64, token: Address) -> Result<u8>;

    /// Balance of `owner` in base units, native or token
    async fn balance_of(&self, chain_id: u64, token: &TokenIdentifier, owner: Address)
        -> Result<U256>;

    /// Wait until the transaction has a receipt. `None` waits indefinitely.
    async fn wait_for_receipt(
        &self,
        chain_id: u64,
        tx_hash: TxHash,
        timeout: Option<Duration>,
    ) -> Result<ReceiptStatus>;
}
