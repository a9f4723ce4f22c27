use crate::ccip::{call_with_offchain_lookups, HttpGateway, DEFAULT_GATEWAY_TIMEOUT};
use crate::contracts::{EnsRegistry, EnsResolver, ExtendedResolver};
use crate::error::{CallRevertedSnafu, ClientSnafu, ResolveError};
use crate::namehash::dns_encode;
use crate::{namehash, CallOutcome, ContractReader, NameServiceConfig, OffchainGateway, ProtocolResolver, Result};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::RpcError;
use async_trait::async_trait;
use namesend_chains::ChainClientProvider;
use namesend_models::{DomainName, DomainRecord};
use snafu::ResultExt;
use std::sync::Arc;
use tracing::debug;

/// `eth_call` on one chain through the cached clients.
pub struct RpcContractReader {
    clients: Arc<ChainClientProvider>,
    chain_id: u64,
}

impl RpcContractReader {
    pub fn new(clients: Arc<ChainClientProvider>, chain_id: u64) -> Self {
        Self { clients, chain_id }
    }
}

#[async_trait]
impl ContractReader for RpcContractReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<CallOutcome> {
        let chain_id = self.chain_id;
        let client = self.clients.get_client(chain_id).context(ClientSnafu { chain_id })?;
        let tx = TransactionRequest::default().with_to(to).with_input(data);

        match client.call(tx).await {
            Ok(output) => Ok(CallOutcome::Returned(output)),
            Err(RpcError::ErrorResp(payload)) => match payload.as_revert_data() {
                Some(revert) => Ok(CallOutcome::Reverted(revert)),
                None if payload.message.contains("revert") => Ok(CallOutcome::Reverted(Bytes::new())),
                None => Err(ResolveError::Rpc {
                    chain_id,
                    message: payload.message.to_string(),
                }),
            },
            Err(e) => Err(ResolveError::Rpc {
                chain_id,
                message: e.to_string(),
            }),
        }
    }
}

/// ENS lookup on a fixed chain.
///
/// The resolver is taken from the closest name in the registry, walking up
/// from the full name. Resolvers that implement ENSIP-10 are asked through
/// `resolve(dnsname, addr(node))`, which is also the only way a resolver
/// found on a parent name may answer. Offchain lookups are followed on every
/// resolver call.
pub struct NameServiceResolver {
    reader: Arc<dyn ContractReader>,
    gateway: Arc<dyn OffchainGateway>,
    registry: Address,
}

impl NameServiceResolver {
    pub fn new(reader: Arc<dyn ContractReader>, gateway: Arc<dyn OffchainGateway>, registry: Address) -> Self {
        Self {
            reader,
            gateway,
            registry,
        }
    }

    pub fn onchain(clients: Arc<ChainClientProvider>, config: &NameServiceConfig) -> Result<Self> {
        let reader = RpcContractReader::new(clients, config.chain_id);
        let gateway = HttpGateway::new(DEFAULT_GATEWAY_TIMEOUT)?;
        Ok(Self::new(Arc::new(reader), Arc::new(gateway), config.registry))
    }

    /// Resolver of the closest configured ancestor of `name`, along with the
    /// name it was found at.
    async fn find_resolver<'a>(&self, name: &'a str) -> Result<Option<(Address, &'a str)>> {
        let mut current = name;
        loop {
            let data = EnsRegistry::resolverCall {
                node: namehash(current),
            }
            .abi_encode();
            let output = match self.reader.call(self.registry, data.into()).await? {
                CallOutcome::Returned(output) => output,
                CallOutcome::Reverted(data) => {
                    return CallRevertedSnafu {
                        contract: self.registry,
                        data,
                    }
                    .fail()
                }
            };
            let resolver = EnsRegistry::resolverCall::abi_decode_returns(&output)
                .map_err(|e| decode_error(self.registry, e))?;
            if !resolver.is_zero() {
                return Ok(Some((resolver, current)));
            }

            match current.split_once('.') {
                Some((_, parent)) if !parent.is_empty() => current = parent,
                _ => return Ok(None),
            }
        }
    }

    async fn supports_wildcard(&self, resolver: Address) -> Result<bool> {
        let data = ExtendedResolver::supportsInterfaceCall {
            interfaceID: ExtendedResolver::resolveCall::SELECTOR.into(),
        }
        .abi_encode();
        match self.reader.call(resolver, data.into()).await? {
            // resolvers predating ERC-165 return nothing decodable
            CallOutcome::Returned(output) => {
                Ok(ExtendedResolver::supportsInterfaceCall::abi_decode_returns(&output).unwrap_or(false))
            }
            CallOutcome::Reverted(_) => Ok(false),
        }
    }

    async fn call_resolver(&self, resolver: Address, data: Vec<u8>) -> Result<Bytes> {
        call_with_offchain_lookups(self.reader.as_ref(), self.gateway.as_ref(), resolver, data.into()).await
    }
}

fn decode_error(contract: Address, error: impl std::fmt::Display) -> ResolveError {
    ResolveError::Decode {
        contract,
        message: error.to_string(),
    }
}

#[async_trait]
impl ProtocolResolver for NameServiceResolver {
    async fn lookup(&self, domain: &DomainName, _record: &DomainRecord) -> Result<Option<Address>> {
        let name = domain.as_str().to_lowercase();
        let node = namehash(&name);

        let Some((resolver, found_at)) = self.find_resolver(&name).await? else {
            debug!(%domain, "Name has no resolver");
            return Ok(None);
        };
        let addr_call = EnsResolver::addrCall { node }.abi_encode();

        let record = if self.supports_wildcard(resolver).await? {
            let data = ExtendedResolver::resolveCall {
                name: dns_encode(&name),
                data: addr_call.into(),
            }
            .abi_encode();
            let output = self.call_resolver(resolver, data).await?;
            ExtendedResolver::resolveCall::abi_decode_returns(&output).map_err(|e| decode_error(resolver, e))?
        } else if found_at != name {
            debug!(%domain, parent = found_at, %resolver, "Parent resolver does not support wildcards");
            return Ok(None);
        } else {
            self.call_resolver(resolver, addr_call).await?
        };

        if record.is_empty() {
            return Ok(None);
        }
        let owner = EnsResolver::addrCall::abi_decode_returns(&record).map_err(|e| decode_error(resolver, e))?;
        debug!(%domain, %resolver, wildcard = found_at != name, %owner, "Name service record found");
        Ok(Some(owner))
    }
}
