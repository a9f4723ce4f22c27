use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::collections::HashMap;

use crate::domain::{DuplicateChainSnafu, RegistryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub native_currency: String,
    pub block_explorer: String,
}

impl ChainConfig {
    pub fn tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.block_explorer.trim_end_matches('/'), tx_hash)
    }
}

/// Ordered list of chains, unique by chain id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChainConfig>", into = "Vec<ChainConfig>")]
pub struct ChainTable {
    chains: Vec<ChainConfig>,
    index: HashMap<u64, usize>,
}

impl ChainTable {
    pub fn new(chains: impl IntoIterator<Item = ChainConfig>) -> Result<Self, RegistryError> {
        let mut table = Self::default();
        for chain in chains {
            ensure!(
                !table.index.contains_key(&chain.chain_id),
                DuplicateChainSnafu {
                    chain_id: chain.chain_id,
                }
            );
            table.index.insert(chain.chain_id, table.chains.len());
            table.chains.push(chain);
        }
        Ok(table)
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.index.get(&chain_id).map(|&i| &self.chains[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.iter()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl TryFrom<Vec<ChainConfig>> for ChainTable {
    type Error = RegistryError;

    fn try_from(chains: Vec<ChainConfig>) -> Result<Self, Self::Error> {
        Self::new(chains)
    }
}

impl From<ChainTable> for Vec<ChainConfig> {
    fn from(table: ChainTable) -> Self {
        table.chains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(chain_id: u64, name: &str) -> ChainConfig {
        ChainConfig {
            chain_id,
            name: name.to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            native_currency: "ETH".to_string(),
            block_explorer: "https://etherscan.io/".to_string(),
        }
    }

    #[test]
    fn test_chain_table_keeps_order_and_indexes() {
        let table = ChainTable::new([chain(10, "Optimism"), chain(1, "Ethereum")]).unwrap();
        let names: Vec<_> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Optimism", "Ethereum"]);
        assert_eq!(table.get(1).unwrap().name, "Ethereum");
        assert!(table.get(137).is_none());
    }

    #[test]
    fn test_chain_table_rejects_duplicate_ids() {
        let result = ChainTable::new([chain(1, "Ethereum"), chain(1, "Mainnet")]);
        assert_eq!(result, Err(RegistryError::DuplicateChain { chain_id: 1 }));
    }

    #[test]
    fn test_tx_url_trims_trailing_slash() {
        let hash = TxHash::repeat_byte(0xab);
        let url = chain(1, "Ethereum").tx_url(&hash);
        assert_eq!(url, format!("https://etherscan.io/tx/{hash}"));
    }
}
