use alloy::primitives::TxHash;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ChainError {
    #[snafu(display("Chain {chain_id} is not configured"))]
    UnknownChain { chain_id: u64 },

    #[snafu(display("Failed to create client for chain {chain_id}: {source}"))]
    ClientCreation {
        chain_id: u64,
        source: common::ProviderError,
    },

    #[snafu(display("Execution reverted: {message}"))]
    Revert { message: String },

    #[snafu(display("RPC error on chain {chain_id}: {message}"))]
    Rpc { chain_id: u64, message: String },

    #[snafu(display("Contract call failed: {message}"))]
    ContractCall { message: String },

    #[snafu(display("Timed out waiting for the receipt of {tx_hash}"))]
    ReceiptTimeout { tx_hash: TxHash },
}

pub type Result<T, E = ChainError> = std::result::Result<T, E>;
