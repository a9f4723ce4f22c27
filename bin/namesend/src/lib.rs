pub mod config;
pub mod evm_wallet;
pub mod services;
pub mod wallet;

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use namesend_chains::{fetch_balance, fetch_balances, ChainClientProvider, EvmChainOperations};
use namesend_models::{TransferForm, ETHEREUM_CHAIN_ID};
use namesend_resolver::{DomainResolver, Resolution, ResolverBackends};
use snafu::prelude::*;
use tracing::info;

use crate::config::{Settings, Tables, DEFAULT_CONFIG_FILE};
use crate::evm_wallet::{Approval, EvmWallet, PrivateKey};
use crate::services::TransferOrchestrator;
use crate::wallet::SigningWallet;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Configuration error: {}", source))]
    Settings { source: config::SettingsError },

    #[snafu(display("Chain {} is not configured", chain_id))]
    UnknownChain { chain_id: u64 },

    #[snafu(display("No token {} on chain {}", ticker, chain_id))]
    UnknownToken { chain_id: u64, ticker: String },

    #[snafu(display("Resolver setup failed: {}", source))]
    Resolver {
        source: namesend_resolver::ResolveError,
    },

    #[snafu(display("Balance query failed: {}", source))]
    Balance { source: namesend_chains::ChainError },

    #[snafu(display("Wallet error: {}", source))]
    Key { source: evm_wallet::KeyError },

    #[snafu(display("Orchestrator error: {}", source))]
    Orchestrator {
        source: services::OrchestratorError,
    },

    #[snafu(display("{}", message))]
    TransferFailed { message: String },
}

impl From<config::SettingsError> for Error {
    fn from(error: config::SettingsError) -> Self {
        Error::Settings { source: error }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Parser, Debug)]
#[command(name = "namesend")]
#[command(about = "Send tokens to whoever owns a domain name")]
pub struct NamesendArgs {
    /// Settings file; defaults to ./namesend.toml when present
    #[arg(long, env = "NAMESEND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the address that owns a domain
    Resolve { domain: String },

    /// Print every configured token balance of an address
    Balances {
        #[arg(long, default_value_t = ETHEREUM_CHAIN_ID)]
        chain_id: u64,

        #[arg(long)]
        address: Address,
    },

    /// Send tokens to the owner of a domain
    Send(SendArgs),

    /// Write the built-in settings to a file
    InitConfig {
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Receiver domain, e.g. alice.eth
    pub receiver: String,

    /// Human-readable amount, e.g. 1.5
    pub amount: String,

    /// Token ticker; the chain's native currency when omitted
    #[arg(long, short)]
    pub token: Option<String>,

    #[arg(long, default_value_t = ETHEREUM_CHAIN_ID)]
    pub chain_id: u64,

    /// Hex private key of the sending account
    #[arg(long, env = "NAMESEND_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: PrivateKey,

    /// Sign without asking for confirmation
    #[arg(long, default_value = "false")]
    pub yes: bool,
}

struct AppContext {
    settings: Settings,
    tables: Arc<Tables>,
    clients: Arc<ChainClientProvider>,
}

impl AppContext {
    fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let settings = Settings::load(path)?;
        let tables = Arc::new(settings.tables()?);
        let clients = Arc::new(ChainClientProvider::new(Arc::new(tables.chains.clone())));
        Ok(Self {
            settings,
            tables,
            clients,
        })
    }

    fn resolver(&self) -> Result<DomainResolver> {
        let backends = ResolverBackends::onchain(
            self.clients.clone(),
            self.settings.name_service.clone(),
            &self.settings.external_resolution,
        )
        .context(ResolverSnafu)?;
        Ok(DomainResolver::new(Arc::new(self.tables.domains.clone()), backends))
    }
}

pub async fn run(args: NamesendArgs) -> Result<()> {
    match args.command {
        Command::InitConfig { path } => {
            Settings::write_default(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Command::Resolve { domain } => {
            let context = AppContext::load(args.config.as_deref())?;
            match context.resolver()?.resolve(&domain).await {
                Resolution::Owner(owner) => println!("{domain} -> {owner}"),
                Resolution::NoOwner => println!("{domain} has no owner"),
                Resolution::Unavailable => println!("{domain} could not be resolved right now"),
            }
            Ok(())
        }
        Command::Balances { chain_id, address } => {
            let context = AppContext::load(args.config.as_deref())?;
            let tokens = context
                .tables
                .tokens
                .tokens_for(chain_id)
                .context(UnknownChainSnafu { chain_id })?;
            let ops = EvmChainOperations::new(context.clients.clone());
            for balance in fetch_balances(&ops, chain_id, tokens, address).await {
                match balance.error {
                    Some(error) => println!("{:>8}  unavailable ({error})", balance.ticker),
                    None => println!("{:>8}  {}", balance.ticker, balance.formatted),
                }
            }
            Ok(())
        }
        Command::Send(send) => {
            let context = AppContext::load(args.config.as_deref())?;
            run_send(context, send).await
        }
    }
}

async fn run_send(context: AppContext, args: SendArgs) -> Result<()> {
    let chain_id = args.chain_id;
    let chain = context
        .tables
        .chains
        .get(chain_id)
        .context(UnknownChainSnafu { chain_id })?;
    let ticker = match args.token {
        Some(ticker) => ticker,
        None => context
            .tables
            .tokens
            .native_ticker(chain_id)
            .context(UnknownTokenSnafu {
                chain_id,
                ticker: chain.native_currency.clone(),
            })?
            .to_string(),
    };
    let token = context
        .tables
        .tokens
        .lookup(chain_id, &ticker)
        .context(UnknownTokenSnafu {
            chain_id,
            ticker: ticker.clone(),
        })?;

    let approval = if args.yes {
        Approval::AutoApprove
    } else {
        Approval::Prompt
    };
    let wallet = EvmWallet::new(&chain.rpc_url, &args.private_key, approval).context(KeySnafu)?;
    let sender = wallet.address();
    let ops = Arc::new(EvmChainOperations::new(context.clients.clone()));

    let balance = fetch_balance(ops.as_ref(), chain_id, &ticker, token, sender)
        .await
        .context(BalanceSnafu)?;
    info!(%sender, %ticker, balance = %balance.formatted, "Sender balance");

    let mut form = TransferForm {
        receiver: args.receiver,
        token_ticker: ticker,
        amount: args.amount,
    };
    let request = form.to_request(chain_id, sender, &balance.formatted);

    let orchestrator = TransferOrchestrator::new(
        Arc::new(context.resolver()?),
        ops,
        Arc::new(wallet),
        Arc::new(context.tables.chains.clone()),
        Arc::new(context.tables.tokens.clone()),
    )
    .with_receipt_timeout(context.settings.receipt_timeout());

    let mut updates = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(update) = updates.recv().await {
            println!("[{:?}] {}", update.state, update.message);
        }
    });

    let result = orchestrator.orchestrate(request).await.context(OrchestratorSnafu)?;
    drop(orchestrator);
    let _ = printer.await;

    form.apply(&result);
    ensure!(
        result.is_success(),
        TransferFailedSnafu {
            message: result.message
        }
    );
    Ok(())
}
