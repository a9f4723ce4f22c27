use alloy::providers::DynProvider;
use common::create_http_provider;
use dashmap::DashMap;
use namesend_models::{ChainConfig, ChainTable};
use snafu::{OptionExt, ResultExt};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClientCreationSnafu, Result, UnknownChainSnafu};

/// Hands out read-only RPC clients, built once per chain id and reused.
/// Clients hold no session state, so sharing them across concurrent reads is
/// fine.
pub struct ChainClientProvider {
    chains: Arc<ChainTable>,
    clients: DashMap<u64, DynProvider>,
}

impl ChainClientProvider {
    pub fn new(chains: Arc<ChainTable>) -> Self {
        Self {
            chains,
            clients: DashMap::new(),
        }
    }

    pub fn get_client(&self, chain_id: u64) -> Result<DynProvider> {
        if let Some(client) = self.clients.get(&chain_id) {
            return Ok(client.clone());
        }

        let config = self.chains.get(chain_id).context(UnknownChainSnafu { chain_id })?;
        let client = create_http_provider(&config.rpc_url).context(ClientCreationSnafu { chain_id })?;
        debug!(chain_id, rpc_url = %config.rpc_url, "Created chain client");

        // a concurrent caller may have won the race; keep whichever landed first
        Ok(self.clients.entry(chain_id).or_insert(client).clone())
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.get(chain_id)
    }

    pub fn chains(&self) -> &ChainTable {
        &self.chains
    }

    pub fn cached_clients(&self) -> usize {
        self.clients.len()
    }
}
