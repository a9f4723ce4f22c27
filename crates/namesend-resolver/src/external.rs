use crate::contracts::ProxyReader;
use crate::error::{ClientSnafu, LayersExhaustedSnafu, ResolveError};
use crate::{namehash, ExternalResolutionConfig, ProtocolResolver, ResolutionLayerConfig, Result};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use namesend_chains::ChainClientProvider;
use namesend_models::{DomainName, DomainRecord};
use snafu::{ensure, ResultExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// A single backing layer of the resolution protocol.
#[async_trait]
pub trait RecordReader: Send + Sync {
    fn name(&self) -> &str;

    /// Raw record value for `key` on the token, empty when unset.
    async fn read(&self, key: &str, token_id: U256) -> Result<String>;
}

/// Reads records through a UNS ProxyReader contract.
pub struct ProxyReaderLayer {
    name: String,
    chain_id: u64,
    proxy_reader: Address,
    clients: Arc<ChainClientProvider>,
}

impl ProxyReaderLayer {
    pub fn new(config: &ResolutionLayerConfig, clients: Arc<ChainClientProvider>) -> Self {
        Self {
            name: config.name.clone(),
            chain_id: config.chain_id,
            proxy_reader: config.proxy_reader,
            clients,
        }
    }
}

#[async_trait]
impl RecordReader for ProxyReaderLayer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, key: &str, token_id: U256) -> Result<String> {
        let chain_id = self.chain_id;
        let client = self.clients.get_client(chain_id).context(ClientSnafu { chain_id })?;
        ProxyReader::new(self.proxy_reader, client)
            .get(key.to_string(), token_id)
            .call()
            .await
            .map_err(|e| ResolveError::LayerRead {
                layer: self.name.clone(),
                message: e.to_string(),
            })
    }
}

pub struct ExternalResolver {
    layers: Vec<Arc<dyn RecordReader>>,
    record_key: String,
}

impl ExternalResolver {
    pub fn new(layers: Vec<Arc<dyn RecordReader>>, record_key: impl Into<String>) -> Self {
        Self {
            layers,
            record_key: record_key.into(),
        }
    }

    pub fn from_config(config: &ExternalResolutionConfig, clients: Arc<ChainClientProvider>) -> Self {
        let layers = config
            .layers
            .iter()
            .map(|layer| Arc::new(ProxyReaderLayer::new(layer, clients.clone())) as Arc<dyn RecordReader>)
            .collect();
        Self::new(layers, config.record_key.clone())
    }
}

#[async_trait]
impl ProtocolResolver for ExternalResolver {
    /// A failing layer falls through to the next one. Without a record, the
    /// lookup errors if any layer failed, since that layer may hold the name.
    async fn lookup(&self, domain: &DomainName, _record: &DomainRecord) -> Result<Option<Address>> {
        let token_id = U256::from_be_bytes(namehash(domain.as_str()).0);
        let mut failed = false;

        for layer in &self.layers {
            match layer.read(&self.record_key, token_id).await {
                Ok(value) => {
                    let value = value.trim();
                    if value.is_empty() {
                        debug!(%domain, layer = layer.name(), "No record on layer");
                        continue;
                    }
                    match value.parse::<Address>() {
                        Ok(owner) => {
                            debug!(%domain, layer = layer.name(), %owner, "Record found");
                            return Ok(Some(owner));
                        }
                        Err(e) => {
                            warn!(%domain, layer = layer.name(), %value, error = %e, "Record is not an address")
                        }
                    }
                }
                Err(e) => {
                    failed = true;
                    warn!(%domain, layer = layer.name(), error = %e, "Resolution layer failed, trying next")
                }
            }
        }

        ensure!(!failed, LayersExhaustedSnafu { domain: domain.as_str() });
        Ok(None)
    }
}
