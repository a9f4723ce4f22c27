use crate::contracts::DomainHolderRegistry;
use crate::error::{ClientSnafu, MissingResolverContractSnafu, ResolveError};
use crate::{ProtocolResolver, Result};
use alloy::primitives::Address;
use async_trait::async_trait;
use namesend_chains::ChainClientProvider;
use namesend_models::{DomainName, DomainRecord};
use snafu::{OptionExt, ResultExt};
use std::sync::Arc;

/// Calls `getDomainHolder(label)` on the suffix's resolver contract, on the
/// chain the suffix is deployed to.
pub struct ContractRegistryResolver {
    clients: Arc<ChainClientProvider>,
}

impl ContractRegistryResolver {
    pub fn new(clients: Arc<ChainClientProvider>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl ProtocolResolver for ContractRegistryResolver {
    async fn lookup(&self, domain: &DomainName, record: &DomainRecord) -> Result<Option<Address>> {
        let contract = record.resolver_contract.context(MissingResolverContractSnafu {
            suffix: record.suffix.clone(),
        })?;
        let chain_id = record.chain_id;
        let client = self.clients.get_client(chain_id).context(ClientSnafu { chain_id })?;

        let holder = DomainHolderRegistry::new(contract, client)
            .getDomainHolder(domain.label().to_string())
            .call()
            .await
            .map_err(|e| ResolveError::Lookup {
                protocol: "contract registry",
                domain: domain.to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(holder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namesend_models::{ChainConfig, ChainTable, ProtocolKind};

    fn resolver() -> ContractRegistryResolver {
        let chains = ChainTable::new([ChainConfig {
            chain_id: 137,
            name: "Polygon".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            native_currency: "POL".to_string(),
            block_explorer: "https://polygonscan.com".to_string(),
        }])
        .unwrap();
        ContractRegistryResolver::new(Arc::new(ChainClientProvider::new(Arc::new(chains))))
    }

    fn record(chain_id: u64, resolver_contract: Option<Address>) -> DomainRecord {
        DomainRecord {
            suffix: ".ape".to_string(),
            protocol: ProtocolKind::ContractRegistry,
            chain_id,
            resolver_contract,
        }
    }

    #[tokio::test]
    async fn test_missing_contract_is_an_error() {
        let result = resolver()
            .lookup(&DomainName::parse("carol.ape").unwrap(), &record(137, None))
            .await;
        assert!(matches!(result, Err(ResolveError::MissingResolverContract { .. })));
    }

    #[tokio::test]
    async fn test_unknown_chain_is_an_error() {
        let result = resolver()
            .lookup(
                &DomainName::parse("carol.ape").unwrap(),
                &record(8453, Some(Address::repeat_byte(0xaa))),
            )
            .await;
        assert!(matches!(result, Err(ResolveError::Client { chain_id: 8453, .. })));
    }
}
