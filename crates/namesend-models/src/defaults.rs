use alloy::primitives::{address, Address};

use crate::{ChainConfig, DomainRecord, ProtocolKind, TokenEntry, TokenIdentifier};

pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const POLYGON_CHAIN_ID: u64 = 137;

const USDC_ETHEREUM: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
const USDC_POLYGON: Address = address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359");
const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
const USDC_ARBITRUM: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
const USDC_OPTIMISM: Address = address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85");

/// Suffixes served by the multi-layer resolution protocol.
const UNS_SUFFIXES: [&str; 9] = [
    ".crypto",
    ".nft",
    ".wallet",
    ".x",
    ".bitcoin",
    ".dao",
    ".888",
    ".blockchain",
    ".zil",
];

fn chain(
    chain_id: u64,
    name: &str,
    rpc_url: &str,
    native_currency: &str,
    block_explorer: &str,
) -> ChainConfig {
    ChainConfig {
        chain_id,
        name: name.to_string(),
        rpc_url: rpc_url.to_string(),
        native_currency: native_currency.to_string(),
        block_explorer: block_explorer.to_string(),
    }
}

pub fn default_chains() -> Vec<ChainConfig> {
    vec![
        chain(42161, "Arbitrum", "https://arb1.arbitrum.io/rpc", "ETH", "https://arbiscan.io"),
        chain(8453, "Base", "https://mainnet.base.org", "ETH", "https://basescan.org"),
        chain(666666666, "Degen", "https://rpc.degen.tips", "DEGEN", "https://explorer.degen.tips"),
        chain(100, "Gnosis", "https://rpc.gnosischain.com", "xDAI", "https://gnosisscan.io"),
        chain(
            ETHEREUM_CHAIN_ID,
            "Ethereum",
            "https://ethereum-rpc.publicnode.com",
            "ETH",
            "https://etherscan.io",
        ),
        chain(10, "Optimism", "https://mainnet.optimism.io", "ETH", "https://optimistic.etherscan.io"),
        chain(POLYGON_CHAIN_ID, "Polygon", "https://polygon-rpc.com", "POL", "https://polygonscan.com"),
        chain(7777777, "Zora", "https://rpc.zora.energy", "ETH", "https://explorer.zora.energy"),
    ]
}

pub fn default_tokens() -> Vec<TokenEntry> {
    let native = [
        (42161, "ETH"),
        (8453, "ETH"),
        (666666666, "DEGEN"),
        (100, "xDAI"),
        (ETHEREUM_CHAIN_ID, "ETH"),
        (10, "ETH"),
        (POLYGON_CHAIN_ID, "POL"),
        (7777777, "ETH"),
    ];
    let usdc = [
        (ETHEREUM_CHAIN_ID, USDC_ETHEREUM),
        (POLYGON_CHAIN_ID, USDC_POLYGON),
        (8453, USDC_BASE),
        (42161, USDC_ARBITRUM),
        (10, USDC_OPTIMISM),
    ];

    native
        .into_iter()
        .map(|(chain_id, ticker)| TokenEntry {
            chain_id,
            ticker: ticker.to_string(),
            address: TokenIdentifier::Native,
        })
        .chain(usdc.into_iter().map(|(chain_id, contract)| TokenEntry {
            chain_id,
            ticker: "USDC".to_string(),
            address: TokenIdentifier::Address(contract),
        }))
        .collect()
}

/// Name-service and resolution-protocol suffixes. Contract-registry suffixes
/// need a deployed resolver address and are only added through settings.
pub fn default_domains() -> Vec<DomainRecord> {
    let ens = DomainRecord {
        suffix: ".eth".to_string(),
        protocol: ProtocolKind::NameService,
        chain_id: ETHEREUM_CHAIN_ID,
        resolver_contract: None,
    };
    std::iter::once(ens)
        .chain(UNS_SUFFIXES.iter().map(|suffix| DomainRecord {
            suffix: suffix.to_string(),
            protocol: ProtocolKind::ExternalResolution,
            chain_id: ETHEREUM_CHAIN_ID,
            resolver_contract: None,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChainTable, DomainRegistry, TokenTable};

    #[test]
    fn test_defaults_build_valid_tables() {
        let chains = ChainTable::new(default_chains()).unwrap();
        let tokens = TokenTable::new(default_tokens()).unwrap();
        let domains = DomainRegistry::new(default_domains()).unwrap();

        // every chain has a native token and every token chain is known
        for chain in chains.iter() {
            assert!(tokens.native_ticker(chain.chain_id).is_some(), "{}", chain.name);
        }
        assert!(tokens.lookup(POLYGON_CHAIN_ID, "USDC").is_some());
        assert_eq!(
            domains.lookup(".eth").unwrap().protocol,
            ProtocolKind::NameService
        );
        assert_eq!(
            domains.lookup(".crypto").unwrap().protocol,
            ProtocolKind::ExternalResolution
        );
    }
}
