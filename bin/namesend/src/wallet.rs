use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum WalletError {
    #[snafu(display("Request rejected by the signer: {}", reason))]
    Rejected { reason: String },

    #[snafu(display("Failed to broadcast transaction: {}", reason))]
    Broadcast { reason: String },
}

pub type Result<T, E = WalletError> = std::result::Result<T, E>;

/// The connected account that signs on behalf of the sender.
#[async_trait]
pub trait SigningWallet: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast `tx`. Returns once the node has accepted it; a
    /// declined signature is `WalletError::Rejected`.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;
}
