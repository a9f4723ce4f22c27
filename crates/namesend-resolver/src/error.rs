use alloy::primitives::{Address, Bytes};
use namesend_chains::ChainError;
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ResolveError {
    #[snafu(display("No client for chain {chain_id}: {source}"))]
    Client { chain_id: u64, source: ChainError },

    #[snafu(display("{protocol} lookup of {domain} failed: {message}"))]
    Lookup {
        protocol: &'static str,
        domain: String,
        message: String,
    },

    #[snafu(display("RPC error on chain {chain_id}: {message}"))]
    Rpc { chain_id: u64, message: String },

    #[snafu(display("Call to {contract} reverted: {data:?}"))]
    CallReverted { contract: Address, data: Bytes },

    #[snafu(display("Unexpected return data from {contract}: {message}"))]
    Decode { contract: Address, message: String },

    #[snafu(display("Offchain lookup from {sender} was raised while calling {contract}"))]
    LookupSenderMismatch { sender: Address, contract: Address },

    #[snafu(display("Too many offchain lookups while calling {contract}"))]
    TooManyOffchainLookups { contract: Address },

    #[snafu(display("Gateway {url} failed: {message}"))]
    Gateway { url: String, message: String },

    #[snafu(display("No gateway answered the offchain lookup from {sender}"))]
    GatewaysExhausted { sender: Address },

    #[snafu(display("Failed to build gateway HTTP client: {source}"))]
    GatewayClient { source: reqwest::Error },

    #[snafu(display("Resolution layer {layer} failed: {message}"))]
    LayerRead { layer: String, message: String },

    #[snafu(display("Suffix {suffix} has no resolver contract"))]
    MissingResolverContract { suffix: String },

    #[snafu(display("No resolution layer could answer for {domain}"))]
    LayersExhausted { domain: String },
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
