use crate::{
    ContractRegistryResolver, ExternalResolutionConfig, ExternalResolver, NameServiceConfig,
    NameServiceResolver, ProtocolResolver, Result,
};
use alloy::primitives::Address;
use namesend_chains::ChainClientProvider;
use namesend_models::{DomainName, DomainRegistry, ProtocolKind};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Owner(Address),
    /// Malformed name, unknown suffix, or the backend has no owner on record.
    NoOwner,
    /// The backend could not be reached or returned garbage.
    Unavailable,
}

impl Resolution {
    pub fn owner(self) -> Option<Address> {
        match self {
            Resolution::Owner(owner) => Some(owner),
            Resolution::NoOwner | Resolution::Unavailable => None,
        }
    }
}

/// One implementation per protocol, built once and shared by every lookup.
#[derive(Clone)]
pub struct ResolverBackends {
    pub name_service: Arc<dyn ProtocolResolver>,
    pub external: Arc<dyn ProtocolResolver>,
    pub contract_registry: Arc<dyn ProtocolResolver>,
}

impl ResolverBackends {
    pub fn onchain(
        clients: Arc<ChainClientProvider>,
        name_service: NameServiceConfig,
        external: &ExternalResolutionConfig,
    ) -> Result<Self> {
        Ok(Self {
            name_service: Arc::new(NameServiceResolver::onchain(clients.clone(), &name_service)?),
            external: Arc::new(ExternalResolver::from_config(external, clients.clone())),
            contract_registry: Arc::new(ContractRegistryResolver::new(clients)),
        })
    }

    fn for_protocol(&self, protocol: ProtocolKind) -> &dyn ProtocolResolver {
        match protocol {
            ProtocolKind::NameService => self.name_service.as_ref(),
            ProtocolKind::ExternalResolution => self.external.as_ref(),
            ProtocolKind::ContractRegistry => self.contract_registry.as_ref(),
        }
    }
}

/// Maps a domain to the address that owns it, dispatching on the suffix's
/// protocol. Never returns an error: failures are logged and reported as
/// `Unavailable`.
pub struct DomainResolver {
    registry: Arc<DomainRegistry>,
    backends: ResolverBackends,
}

impl DomainResolver {
    pub fn new(registry: Arc<DomainRegistry>, backends: ResolverBackends) -> Self {
        Self { registry, backends }
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub async fn resolve(&self, domain: &str) -> Resolution {
        let Some(name) = DomainName::parse(domain) else {
            debug!(domain, "Domain has no suffix");
            return Resolution::NoOwner;
        };
        let Some(record) = self.registry.record_for(&name) else {
            debug!(domain, suffix = name.suffix(), "Unknown domain suffix");
            return Resolution::NoOwner;
        };

        let protocol = record.protocol;
        match self.backends.for_protocol(protocol).lookup(&name, record).await {
            Ok(Some(owner)) if !owner.is_zero() => {
                info!(domain, ?protocol, %owner, "Resolved domain owner");
                Resolution::Owner(owner)
            }
            Ok(_) => {
                info!(domain, ?protocol, "Domain has no owner");
                Resolution::NoOwner
            }
            Err(e) => {
                warn!(domain, ?protocol, error = %e, "Domain resolution failed");
                Resolution::Unavailable
            }
        }
    }

    /// Collapsed form of [`resolve`](Self::resolve).
    pub async fn resolve_owner(&self, domain: &str) -> Option<Address> {
        self.resolve(domain).await.owner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResolveError, Result};
    use alloy::primitives::address;
    use async_trait::async_trait;
    use namesend_models::DomainRecord;
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Answer {
        Owner(Address),
        Empty,
        Fail,
    }

    struct FakeProtocol {
        answer: Answer,
        // (label, chain id, resolver contract) of every lookup
        seen: Mutex<Vec<(String, u64, Option<Address>)>>,
    }

    impl FakeProtocol {
        fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProtocolResolver for FakeProtocol {
        async fn lookup(&self, domain: &DomainName, record: &DomainRecord) -> Result<Option<Address>> {
            self.seen.lock().unwrap().push((
                domain.label().to_string(),
                record.chain_id,
                record.resolver_contract,
            ));
            match self.answer {
                Answer::Owner(owner) => Ok(Some(owner)),
                Answer::Empty => Ok(None),
                Answer::Fail => Err(ResolveError::Lookup {
                    protocol: "fake",
                    domain: domain.to_string(),
                    message: "rpc unreachable".to_string(),
                }),
            }
        }
    }

    const APE_REGISTRY: Address = address!("00000000000000000000000000000000000000ae");

    struct Harness {
        name_service: Arc<FakeProtocol>,
        external: Arc<FakeProtocol>,
        contract_registry: Arc<FakeProtocol>,
        resolver: DomainResolver,
    }

    fn harness(name_service: Answer, external: Answer, contract_registry: Answer) -> Harness {
        let registry = DomainRegistry::new([
            DomainRecord {
                suffix: ".eth".to_string(),
                protocol: ProtocolKind::NameService,
                chain_id: 1,
                resolver_contract: None,
            },
            DomainRecord {
                suffix: ".crypto".to_string(),
                protocol: ProtocolKind::ExternalResolution,
                chain_id: 1,
                resolver_contract: None,
            },
            DomainRecord {
                suffix: ".ape".to_string(),
                protocol: ProtocolKind::ContractRegistry,
                chain_id: 137,
                resolver_contract: Some(APE_REGISTRY),
            },
        ])
        .unwrap();

        let name_service = FakeProtocol::new(name_service);
        let external = FakeProtocol::new(external);
        let contract_registry = FakeProtocol::new(contract_registry);
        let resolver = DomainResolver::new(
            Arc::new(registry),
            ResolverBackends {
                name_service: name_service.clone(),
                external: external.clone(),
                contract_registry: contract_registry.clone(),
            },
        );
        Harness {
            name_service,
            external,
            contract_registry,
            resolver,
        }
    }

    impl Harness {
        fn total_calls(&self) -> usize {
            self.name_service.calls() + self.external.calls() + self.contract_registry.calls()
        }
    }

    const OWNER: Address = address!("abcdef0000000000000000000000000000000001");

    #[tokio::test]
    async fn test_domain_without_dot_never_dispatches() {
        let h = harness(Answer::Owner(OWNER), Answer::Owner(OWNER), Answer::Owner(OWNER));
        assert_eq!(h.resolver.resolve("alice").await, Resolution::NoOwner);
        assert_eq!(h.resolver.resolve_owner("").await, None);
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_suffix_never_dispatches() {
        let h = harness(Answer::Owner(OWNER), Answer::Owner(OWNER), Answer::Owner(OWNER));
        assert_eq!(h.resolver.resolve_owner("alice.sol").await, None);
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_name_service_domain() {
        let h = harness(Answer::Owner(OWNER), Answer::Fail, Answer::Fail);
        assert_eq!(h.resolver.resolve("alice.eth").await, Resolution::Owner(OWNER));
        assert_eq!(h.name_service.calls(), 1);
        assert_eq!(h.external.calls() + h.contract_registry.calls(), 0);
    }

    #[tokio::test]
    async fn test_suffix_match_ignores_case() {
        let h = harness(Answer::Owner(OWNER), Answer::Fail, Answer::Fail);
        assert_eq!(h.resolver.resolve_owner("Alice.ETH").await, Some(OWNER));
    }

    #[tokio::test]
    async fn test_contract_registry_gets_label_and_record() {
        let holder = Address::repeat_byte(0x11);
        let h = harness(Answer::Fail, Answer::Fail, Answer::Owner(holder));

        assert_eq!(h.resolver.resolve_owner("carol.ape").await, Some(holder));
        let seen = h.contract_registry.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![("carol".to_string(), 137, Some(APE_REGISTRY))]);
    }

    #[tokio::test]
    async fn test_label_keeps_inner_dots() {
        let h = harness(Answer::Fail, Answer::Fail, Answer::Owner(OWNER));
        h.resolver.resolve("pay.carol.ape").await;
        assert_eq!(h.contract_registry.seen.lock().unwrap()[0].0, "pay.carol");
    }

    #[tokio::test]
    async fn test_zero_address_is_no_owner_for_every_protocol() {
        let h = harness(
            Answer::Owner(Address::ZERO),
            Answer::Owner(Address::ZERO),
            Answer::Owner(Address::ZERO),
        );
        for domain in ["alice.eth", "bob.crypto", "carol.ape"] {
            assert_eq!(h.resolver.resolve(domain).await, Resolution::NoOwner, "{domain}");
        }
        assert_eq!(h.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_backend_failure_collapses_to_none() {
        let h = harness(Answer::Fail, Answer::Empty, Answer::Fail);
        assert_eq!(h.resolver.resolve("alice.eth").await, Resolution::Unavailable);
        assert_eq!(h.resolver.resolve_owner("alice.eth").await, None);
        assert_eq!(h.resolver.resolve("bob.crypto").await, Resolution::NoOwner);
    }
}
