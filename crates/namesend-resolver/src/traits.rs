use crate::Result;
use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use namesend_models::{DomainName, DomainRecord};

/// One naming protocol. `Ok(None)` means the backend answered and no owner
/// is recorded; `Err` means the backend could not be asked.
#[async_trait]
pub trait ProtocolResolver: Send + Sync {
    async fn lookup(&self, domain: &DomainName, record: &DomainRecord) -> Result<Option<Address>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Returned(Bytes),
    /// The call reverted with this revert data.
    Reverted(Bytes),
}

/// Raw `eth_call` against one chain. Reverts are an outcome, not an error,
/// so callers can inspect the revert data.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<CallOutcome>;
}

/// Answers EIP-3668 offchain lookups.
#[async_trait]
pub trait OffchainGateway: Send + Sync {
    /// Fetches the response for `data` from one gateway URL template.
    async fn fetch(&self, url: &str, sender: Address, data: &Bytes) -> Result<Bytes>;
}
