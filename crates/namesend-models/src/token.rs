use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use snafu::{ensure, Snafu};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::domain::{DuplicateTokenSnafu, RegistryError};

/// Marker used in token tables for the chain's native currency.
pub const NATIVE_MARKER: &str = "native";
// Legacy spelling found in older token lists.
const LEGACY_NATIVE_MARKER: &str = "0x0";

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("Invalid token address {input:?}: expected \"native\" or a 20-byte hex address"))]
pub struct ParseTokenError {
    input: String,
}

/// Either the native currency or an ERC-20 contract. The native marker can
/// never collide with a contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenIdentifier {
    Native,
    Address(Address),
}

impl TokenIdentifier {
    pub fn is_native(&self) -> bool {
        matches!(self, TokenIdentifier::Native)
    }

    pub fn contract(&self) -> Option<Address> {
        match self {
            TokenIdentifier::Native => None,
            TokenIdentifier::Address(address) => Some(*address),
        }
    }
}

impl FromStr for TokenIdentifier {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(NATIVE_MARKER) || trimmed == LEGACY_NATIVE_MARKER {
            return Ok(TokenIdentifier::Native);
        }
        trimmed
            .parse::<Address>()
            .map(TokenIdentifier::Address)
            .map_err(|_| ParseTokenError {
                input: s.to_string(),
            })
    }
}

impl TryFrom<String> for TokenIdentifier {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenIdentifier> for String {
    fn from(token: TokenIdentifier) -> Self {
        token.to_string()
    }
}

impl fmt::Display for TokenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenIdentifier::Native => f.write_str(NATIVE_MARKER),
            TokenIdentifier::Address(address) => write!(f, "{address}"),
        }
    }
}

/// One row of a token list as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub chain_id: u64,
    pub ticker: String,
    pub address: TokenIdentifier,
}

/// chain id -> (ticker -> token). Ticker sets are independent per chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TokenEntry>", into = "Vec<TokenEntry>")]
pub struct TokenTable {
    by_chain: HashMap<u64, BTreeMap<String, TokenIdentifier>>,
}

impl TokenTable {
    pub fn new(entries: impl IntoIterator<Item = TokenEntry>) -> Result<Self, RegistryError> {
        let mut by_chain: HashMap<u64, BTreeMap<String, TokenIdentifier>> = HashMap::new();
        for entry in entries {
            let tokens = by_chain.entry(entry.chain_id).or_default();
            ensure!(
                !tokens.contains_key(&entry.ticker),
                DuplicateTokenSnafu {
                    chain_id: entry.chain_id,
                    ticker: entry.ticker.clone(),
                }
            );
            tokens.insert(entry.ticker, entry.address);
        }
        Ok(Self { by_chain })
    }

    pub fn lookup(&self, chain_id: u64, ticker: &str) -> Option<TokenIdentifier> {
        self.by_chain.get(&chain_id)?.get(ticker).copied()
    }

    pub fn tokens_for(&self, chain_id: u64) -> Option<&BTreeMap<String, TokenIdentifier>> {
        self.by_chain.get(&chain_id)
    }

    pub fn native_ticker(&self, chain_id: u64) -> Option<&str> {
        self.by_chain
            .get(&chain_id)?
            .iter()
            .find(|(_, token)| token.is_native())
            .map(|(ticker, _)| ticker.as_str())
    }
}

impl TryFrom<Vec<TokenEntry>> for TokenTable {
    type Error = RegistryError;

    fn try_from(entries: Vec<TokenEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<TokenTable> for Vec<TokenEntry> {
    fn from(table: TokenTable) -> Self {
        let mut entries: Vec<_> = table
            .by_chain
            .into_iter()
            .flat_map(|(chain_id, tokens)| {
                tokens.into_iter().map(move |(ticker, address)| TokenEntry {
                    chain_id,
                    ticker,
                    address,
                })
            })
            .collect();
        entries.sort_by(|a, b| (a.chain_id, &a.ticker).cmp(&(b.chain_id, &b.ticker)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    #[test]
    fn test_native_marker_parsing() {
        assert_eq!("native".parse::<TokenIdentifier>().unwrap(), TokenIdentifier::Native);
        assert_eq!("0x0".parse::<TokenIdentifier>().unwrap(), TokenIdentifier::Native);
        assert_eq!(
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
                .parse::<TokenIdentifier>()
                .unwrap(),
            TokenIdentifier::Address(USDC)
        );
        assert!("0x1234".parse::<TokenIdentifier>().is_err());
    }

    #[test]
    fn test_zero_address_is_not_the_native_marker() {
        let zero = "0x0000000000000000000000000000000000000000"
            .parse::<TokenIdentifier>()
            .unwrap();
        assert_eq!(zero, TokenIdentifier::Address(Address::ZERO));
        assert!(!zero.is_native());
    }

    #[test]
    fn test_tickers_are_independent_per_chain() {
        let table = TokenTable::new([
            TokenEntry {
                chain_id: 1,
                ticker: "ETH".to_string(),
                address: TokenIdentifier::Native,
            },
            TokenEntry {
                chain_id: 1,
                ticker: "USDC".to_string(),
                address: TokenIdentifier::Address(USDC),
            },
            TokenEntry {
                chain_id: 137,
                ticker: "POL".to_string(),
                address: TokenIdentifier::Native,
            },
        ])
        .unwrap();

        assert_eq!(table.lookup(1, "USDC"), Some(TokenIdentifier::Address(USDC)));
        assert_eq!(table.lookup(137, "USDC"), None);
        assert_eq!(table.native_ticker(137), Some("POL"));
        assert!(table.tokens_for(10).is_none());
    }

    #[test]
    fn test_duplicate_ticker_on_same_chain_is_rejected() {
        let entry = TokenEntry {
            chain_id: 1,
            ticker: "ETH".to_string(),
            address: TokenIdentifier::Native,
        };
        assert!(matches!(
            TokenTable::new([entry.clone(), entry]),
            Err(RegistryError::DuplicateToken { chain_id: 1, .. })
        ));
    }

    #[test]
    fn test_token_table_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            tokens: TokenTable,
        }
        let raw = r#"
            [[tokens]]
            chain_id = 1
            ticker = "ETH"
            address = "native"

            [[tokens]]
            chain_id = 1
            ticker = "USDC"
            address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
        "#;
        let wrapper: Wrapper = toml::from_str(raw).unwrap();
        assert_eq!(wrapper.tokens.lookup(1, "ETH"), Some(TokenIdentifier::Native));
    }
}
