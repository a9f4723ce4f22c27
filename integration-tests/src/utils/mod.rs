use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use ctor::ctor;
use namesend::services::TransferOrchestrator;
use namesend::wallet::{self, SigningWallet, WalletError};
use namesend_chains::{ChainError, ChainOperations, ReceiptStatus};
use namesend_models::{
    ChainConfig, ChainTable, DomainName, DomainRecord, DomainRegistry, ProtocolKind,
    TokenEntry, TokenIdentifier, TokenTable, TransferRequest, TransferState, TransferUpdate,
};
use namesend_resolver::{DomainResolver, ProtocolResolver, ResolveError, ResolverBackends};
use tokio::sync::{broadcast, Notify};
use tracing_subscriber::EnvFilter;

pub const SENDER: Address = address!("5e00000000000000000000000000000000000001");
pub const OWNER: Address = address!("abcdef0000000000000000000000000000000001");
pub const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
pub const TX_HASH: TxHash = TxHash::repeat_byte(0x42);

/// Everything that reached the chain or the wallet, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Decimals(Address),
    Simulate(TransactionRequest),
    Submit(TransactionRequest),
    WaitForReceipt(TxHash, Option<Duration>),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

#[derive(Clone, Copy)]
pub enum Lookup {
    Owner(Address),
    Empty,
    Fail,
}

pub struct FakeProtocol {
    answer: Lookup,
    calls: Mutex<usize>,
}

impl FakeProtocol {
    pub fn new(answer: Lookup) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ProtocolResolver for FakeProtocol {
    async fn lookup(
        &self,
        domain: &DomainName,
        _record: &DomainRecord,
    ) -> namesend_resolver::Result<Option<Address>> {
        *self.calls.lock().unwrap() += 1;
        match self.answer {
            Lookup::Owner(owner) => Ok(Some(owner)),
            Lookup::Empty => Ok(None),
            Lookup::Fail => Err(ResolveError::Lookup {
                protocol: "fake",
                domain: domain.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy)]
pub enum Receipt {
    Success,
    Reverted,
    Timeout,
}

pub struct MockChain {
    pub decimals: u8,
    pub revert: Option<&'static str>,
    pub receipt: Receipt,
    events: EventLog,
}

#[async_trait]
impl ChainOperations for MockChain {
    async fn simulate(&self, _chain_id: u64, tx: &TransactionRequest) -> namesend_chains::Result<()> {
        self.events.lock().unwrap().push(Event::Simulate(tx.clone()));
        match self.revert {
            Some(message) => Err(ChainError::Revert {
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn token_decimals(&self, _chain_id: u64, token: Address) -> namesend_chains::Result<u8> {
        self.events.lock().unwrap().push(Event::Decimals(token));
        Ok(self.decimals)
    }

    async fn balance_of(
        &self,
        _chain_id: u64,
        _token: &TokenIdentifier,
        _owner: Address,
    ) -> namesend_chains::Result<U256> {
        Ok(U256::ZERO)
    }

    async fn wait_for_receipt(
        &self,
        _chain_id: u64,
        tx_hash: TxHash,
        timeout: Option<Duration>,
    ) -> namesend_chains::Result<ReceiptStatus> {
        self.events
            .lock()
            .unwrap()
            .push(Event::WaitForReceipt(tx_hash, timeout));
        match self.receipt {
            Receipt::Success => Ok(ReceiptStatus::Success),
            Receipt::Reverted => Ok(ReceiptStatus::Reverted),
            Receipt::Timeout => Err(ChainError::ReceiptTimeout { tx_hash }),
        }
    }
}

#[derive(Clone, Copy)]
pub enum Signer {
    Accept,
    Reject,
    BroadcastFails,
}

pub struct MockWallet {
    pub signer: Signer,
    /// When set, signing waits for `release` after notifying `entered`.
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
    events: EventLog,
}

#[async_trait]
impl SigningWallet for MockWallet {
    fn address(&self) -> Address {
        SENDER
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> wallet::Result<TxHash> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }
        self.events.lock().unwrap().push(Event::Submit(tx));
        match self.signer {
            Signer::Accept => Ok(TX_HASH),
            Signer::Reject => Err(WalletError::Rejected {
                reason: "User denied transaction signature".to_string(),
            }),
            Signer::BroadcastFails => Err(WalletError::Broadcast {
                reason: "nonce too low".to_string(),
            }),
        }
    }
}

pub struct Harness {
    pub orchestrator: Arc<TransferOrchestrator>,
    pub name_service: Arc<FakeProtocol>,
    pub events: EventLog,
}

pub struct HarnessBuilder {
    pub lookup: Lookup,
    pub decimals: u8,
    pub revert: Option<&'static str>,
    pub receipt: Receipt,
    pub signer: Signer,
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
    pub receipt_timeout: Option<Duration>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            lookup: Lookup::Owner(OWNER),
            decimals: 6,
            revert: None,
            receipt: Receipt::Success,
            signer: Signer::Accept,
            gate: None,
            receipt_timeout: None,
        }
    }
}

impl HarnessBuilder {
    pub fn build(self) -> Harness {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));

        let chains = ChainTable::new([ChainConfig {
            chain_id: 1,
            name: "Ethereum".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            native_currency: "ETH".to_string(),
            block_explorer: "https://etherscan.io".to_string(),
        }])
        .unwrap();
        let tokens = TokenTable::new([
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
        ])
        .unwrap();
        let domains = DomainRegistry::new([DomainRecord {
            suffix: ".eth".to_string(),
            protocol: ProtocolKind::NameService,
            chain_id: 1,
            resolver_contract: None,
        }])
        .unwrap();

        let name_service = FakeProtocol::new(self.lookup);
        let unused = FakeProtocol::new(Lookup::Fail);
        let resolver = DomainResolver::new(
            Arc::new(domains),
            ResolverBackends {
                name_service: name_service.clone(),
                external: unused.clone(),
                contract_registry: unused,
            },
        );

        let chain = MockChain {
            decimals: self.decimals,
            revert: self.revert,
            receipt: self.receipt,
            events: events.clone(),
        };
        let wallet = MockWallet {
            signer: self.signer,
            gate: self.gate,
            events: events.clone(),
        };

        let orchestrator = TransferOrchestrator::new(
            Arc::new(resolver),
            Arc::new(chain),
            Arc::new(wallet),
            Arc::new(chains),
            Arc::new(tokens),
        )
        .with_receipt_timeout(self.receipt_timeout);

        Harness {
            orchestrator: Arc::new(orchestrator),
            name_service,
            events,
        }
    }
}

impl Harness {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Submit(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }
}

pub fn request(receiver: &str, ticker: &str, amount: &str, balance: &str) -> TransferRequest {
    TransferRequest {
        receiver_domain: receiver.to_string(),
        token_ticker: ticker.to_string(),
        amount: amount.to_string(),
        available_balance: balance.to_string(),
        chain_id: 1,
        sender: SENDER,
    }
}

/// Drains the updates published so far.
pub fn states(updates: &mut broadcast::Receiver<TransferUpdate>) -> Vec<TransferState> {
    let mut states = Vec::new();
    while let Ok(update) = updates.try_recv() {
        states.push(update.state);
    }
    states
}

#[ctor]
fn init_test_tracing() {
    let has_nocapture = std::env::args().any(|arg| arg == "--nocapture" || arg == "--show-output");
    if has_nocapture {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .try_init()
            .ok();
    }
}
