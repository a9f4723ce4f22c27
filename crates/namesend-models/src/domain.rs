use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use snafu::{ensure, Snafu};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RegistryError {
    #[snafu(display("Domain suffix {suffix:?} must start with '.' and contain no other dot"))]
    InvalidSuffix { suffix: String },

    #[snafu(display("Domain suffix {suffix} is registered twice"))]
    DuplicateSuffix { suffix: String },

    #[snafu(display("Contract registry suffix {suffix} has no resolver contract"))]
    MissingResolverContract { suffix: String },

    #[snafu(display("Chain {chain_id} is configured twice"))]
    DuplicateChain { chain_id: u64 },

    #[snafu(display("Token {ticker} is configured twice on chain {chain_id}"))]
    DuplicateToken { chain_id: u64, ticker: String },
}

/// The naming system a suffix belongs to. Each variant has exactly one
/// resolver implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// ENS-style name service on a fixed reference chain.
    NameService,
    /// Multi-layer resolution protocol (UNS) with internal fallback.
    ExternalResolution,
    /// A contract exposing `getDomainHolder(string)` on a specific chain.
    ContractRegistry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub suffix: String,
    pub protocol: ProtocolKind,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver_contract: Option<Address>,
}

/// A domain split on its last dot, e.g. `carol.ape` -> (`carol`, `.ape`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    full: String,
    dot: usize,
}

impl DomainName {
    /// Returns `None` when the input has no dot at all.
    pub fn parse(domain: &str) -> Option<Self> {
        let dot = domain.rfind('.')?;
        Some(Self {
            full: domain.to_string(),
            dot,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Everything before the suffix.
    pub fn label(&self) -> &str {
        &self.full[..self.dot]
    }

    /// The suffix including its leading dot.
    pub fn suffix(&self) -> &str {
        &self.full[self.dot..]
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Suffix -> record lookup. Suffixes are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DomainRecord>", into = "Vec<DomainRecord>")]
pub struct DomainRegistry {
    records: HashMap<String, DomainRecord>,
}

impl DomainRegistry {
    pub fn new(records: impl IntoIterator<Item = DomainRecord>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for record in records {
            registry.insert(record)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, mut record: DomainRecord) -> Result<(), RegistryError> {
        record.suffix = record.suffix.to_lowercase();
        ensure!(
            record.suffix.len() > 1
                && record.suffix.starts_with('.')
                && record.suffix.matches('.').count() == 1,
            InvalidSuffixSnafu {
                suffix: record.suffix.clone(),
            }
        );
        ensure!(
            record.protocol != ProtocolKind::ContractRegistry || record.resolver_contract.is_some(),
            MissingResolverContractSnafu {
                suffix: record.suffix.clone(),
            }
        );
        ensure!(
            !self.records.contains_key(&record.suffix),
            DuplicateSuffixSnafu {
                suffix: record.suffix.clone(),
            }
        );
        self.records.insert(record.suffix.clone(), record);
        Ok(())
    }

    pub fn lookup(&self, suffix: &str) -> Option<&DomainRecord> {
        self.records.get(&suffix.to_lowercase())
    }

    pub fn record_for(&self, domain: &DomainName) -> Option<&DomainRecord> {
        self.lookup(domain.suffix())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

impl TryFrom<Vec<DomainRecord>> for DomainRegistry {
    type Error = RegistryError;

    fn try_from(records: Vec<DomainRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<DomainRegistry> for Vec<DomainRecord> {
    fn from(registry: DomainRegistry) -> Self {
        let mut records: Vec<_> = registry.records.into_values().collect();
        records.sort_by(|a, b| a.suffix.cmp(&b.suffix));
        records
    }
}
