pub mod ccip;
pub mod config;
pub mod contract_registry;
pub mod contracts;
pub mod error;
pub mod external;
pub mod name_service;
pub mod namehash;
pub mod resolver;
pub mod traits;

pub use ccip::{HttpGateway, MAX_OFFCHAIN_LOOKUPS};
pub use config::{ExternalResolutionConfig, NameServiceConfig, ResolutionLayerConfig};
pub use contract_registry::ContractRegistryResolver;
pub use error::{ResolveError, Result};
pub use external::{ExternalResolver, ProxyReaderLayer, RecordReader};
pub use name_service::{NameServiceResolver, RpcContractReader};
pub use namehash::{dns_encode, namehash};
pub use resolver::{DomainResolver, Resolution, ResolverBackends};
pub use traits::{CallOutcome, ContractReader, OffchainGateway, ProtocolResolver};
