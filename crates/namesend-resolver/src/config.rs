use alloy::primitives::{address, Address};
use namesend_models::{ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID};
use serde::{Deserialize, Serialize};

pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
pub const UNS_MAINNET_PROXY_READER: Address = address!("578853aa776Eef10CeE6c4dd2B5862bdcE767A8B");
pub const UNS_POLYGON_PROXY_READER: Address = address!("91EDd8708062bd4233f4Dd0FCE15A7cb4d500091");
pub const DEFAULT_RECORD_KEY: &str = "crypto.ETH.address";

/// Where name-service lookups go, regardless of the chain the sender is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameServiceConfig {
    pub chain_id: u64,
    pub registry: Address,
}

impl Default for NameServiceConfig {
    fn default() -> Self {
        Self {
            chain_id: ETHEREUM_CHAIN_ID,
            registry: ENS_REGISTRY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionLayerConfig {
    pub name: String,
    pub chain_id: u64,
    pub proxy_reader: Address,
}

/// Layers are tried in order until one of them holds a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalResolutionConfig {
    pub record_key: String,
    pub layers: Vec<ResolutionLayerConfig>,
}

impl Default for ExternalResolutionConfig {
    fn default() -> Self {
        Self {
            record_key: DEFAULT_RECORD_KEY.to_string(),
            layers: vec![
                ResolutionLayerConfig {
                    name: "Layer1".to_string(),
                    chain_id: ETHEREUM_CHAIN_ID,
                    proxy_reader: UNS_MAINNET_PROXY_READER,
                },
                ResolutionLayerConfig {
                    name: "Layer2".to_string(),
                    chain_id: POLYGON_CHAIN_ID,
                    proxy_reader: UNS_POLYGON_PROXY_READER,
                },
            ],
        }
    }
}
