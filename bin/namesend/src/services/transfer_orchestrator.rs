use crate::services::{RunGuard, Session, SessionError};
use crate::wallet::{SigningWallet, WalletError};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use chrono::Utc;
use common::GenericERC20;
use namesend_chains::{ChainError, ChainOperations, ReceiptStatus};
use namesend_models::{
    parse_units, validate_amount, validate_receiver, ChainTable, TokenIdentifier, TokenTable,
    TransferFailure, TransferOutcome, TransferRequest, TransferResult, TransferState,
    TransferUpdate, ValidationError, NATIVE_DECIMALS,
};
use namesend_resolver::{DomainResolver, Resolution};
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Snafu)]
pub enum OrchestratorError {
    #[snafu(display("Transfer rejected: {}", source))]
    Session { source: SessionError },
}

/// Drives one transfer from validation to a confirmed receipt. At most one
/// run is in flight per orchestrator; every other outcome is reported inside
/// the returned `TransferResult`.
pub struct TransferOrchestrator {
    resolver: Arc<DomainResolver>,
    chain: Arc<dyn ChainOperations>,
    wallet: Arc<dyn SigningWallet>,
    chains: Arc<ChainTable>,
    tokens: Arc<TokenTable>,
    session: Arc<Session>,
    updates: broadcast::Sender<TransferUpdate>,
    receipt_timeout: Option<Duration>,
}

impl TransferOrchestrator {
    pub fn new(
        resolver: Arc<DomainResolver>,
        chain: Arc<dyn ChainOperations>,
        wallet: Arc<dyn SigningWallet>,
        chains: Arc<ChainTable>,
        tokens: Arc<TokenTable>,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            resolver,
            chain,
            wallet,
            chains,
            tokens,
            session: Arc::new(Session::new()),
            updates,
            receipt_timeout: None,
        }
    }

    pub fn with_receipt_timeout(mut self, receipt_timeout: Option<Duration>) -> Self {
        self.receipt_timeout = receipt_timeout;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransferUpdate> {
        self.updates.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn state(&self) -> TransferState {
        self.session.state()
    }

    pub fn resolver(&self) -> &DomainResolver {
        &self.resolver
    }

    pub async fn resolve_owner(&self, domain: &str) -> Option<Address> {
        self.resolver.resolve_owner(domain).await
    }

    /// Runs `request` to a terminal state. Only a concurrent run makes this
    /// return an error.
    pub async fn orchestrate(&self, request: TransferRequest) -> Result<TransferResult, OrchestratorError> {
        let guard = self.session.begin().context(SessionSnafu)?;
        let mut run = Run {
            run_id: Uuid::new_v4(),
            guard,
            updates: self.updates.clone(),
            tx_hash: None,
            recipient: None,
        };
        info!(
            run_id = %run.run_id,
            receiver = %request.receiver_domain,
            token = %request.token_ticker,
            amount = %request.amount,
            chain_id = request.chain_id,
            "Starting transfer"
        );
        run.publish(TransferState::Validating, "Validating transfer".to_string());

        let outcome = self.execute(&request, &mut run).await;
        Ok(self.finish(&request, run, outcome))
    }

    async fn execute(&self, request: &TransferRequest, run: &mut Run) -> Result<(), TransferFailure> {
        let token = self.validate(request)?;

        run.enter(
            TransferState::Resolving,
            format!("Resolving {}", request.receiver_domain),
        );
        let recipient = self.resolve_recipient(request, run).await?;

        let tx = match token {
            TokenIdentifier::Native => native_transfer(request, recipient)?,
            TokenIdentifier::Address(contract) => {
                run.enter(
                    TransferState::Simulating,
                    format!("Simulating {} transfer", request.token_ticker),
                );
                self.simulate_token_transfer(request, contract, recipient).await?
            }
        };

        run.enter(
            TransferState::Submitting,
            "Waiting for the wallet to sign".to_string(),
        );
        let tx_hash = self.wallet.send_transaction(tx).await.map_err(|e| match e {
            WalletError::Rejected { reason } => TransferFailure::UserRejected { message: reason },
            WalletError::Broadcast { reason } => TransferFailure::Broadcast { message: reason },
        })?;
        run.tx_hash = Some(tx_hash);

        run.enter(
            TransferState::Confirming,
            format!("Waiting for {tx_hash} to confirm"),
        );
        self.confirm(request.chain_id, tx_hash).await
    }

    /// Local checks only. Nothing here touches the network.
    fn validate(&self, request: &TransferRequest) -> Result<TokenIdentifier, TransferFailure> {
        validate_receiver(&request.receiver_domain)?;
        validate_amount(&request.amount, &request.available_balance)?;
        let token = self
            .tokens
            .lookup(request.chain_id, &request.token_ticker)
            .ok_or_else(|| ValidationError::UnsupportedToken {
                chain_id: request.chain_id,
                ticker: request.token_ticker.clone(),
            })?;
        Ok(token)
    }

    async fn resolve_recipient(
        &self,
        request: &TransferRequest,
        run: &mut Run,
    ) -> Result<Address, TransferFailure> {
        let domain = &request.receiver_domain;
        let owner = match self.resolver.resolve(domain).await {
            Resolution::Owner(owner) => owner,
            Resolution::NoOwner => {
                return Err(TransferFailure::NoOwner {
                    domain: domain.clone(),
                })
            }
            Resolution::Unavailable => {
                warn!(run_id = %run.run_id, %domain, "Resolver unavailable, treating as no owner");
                return Err(TransferFailure::NoOwner {
                    domain: domain.clone(),
                });
            }
        };

        // Address equality is byte equality, so checksum casing never matters
        if owner == request.sender {
            return Err(TransferFailure::SelfSend {
                domain: domain.clone(),
            });
        }
        run.recipient = Some(owner);
        Ok(owner)
    }

    async fn simulate_token_transfer(
        &self,
        request: &TransferRequest,
        contract: Address,
        recipient: Address,
    ) -> Result<TransactionRequest, TransferFailure> {
        let decimals = self
            .chain
            .token_decimals(request.chain_id, contract)
            .await
            .map_err(|e| TransferFailure::Contract {
                message: e.to_string(),
            })?;
        let amount = parse_units(&request.amount, decimals)
            .map_err(|source| ValidationError::InvalidAmount { source })?;
        // an amount that passed validation at 18 decimals can still
        // truncate to nothing at the token's precision
        if amount.is_zero() {
            return Err(TransferFailure::BelowTokenPrecision {
                ticker: request.token_ticker.clone(),
                decimals,
            });
        }

        let call = GenericERC20::transferCall {
            to: recipient,
            amount,
        };
        let tx = TransactionRequest::default()
            .with_from(request.sender)
            .with_to(contract)
            .with_input(call.abi_encode());

        self.chain
            .simulate(request.chain_id, &tx)
            .await
            .map_err(|e| TransferFailure::Contract {
                message: e.to_string(),
            })?;
        Ok(tx)
    }

    async fn confirm(&self, chain_id: u64, tx_hash: TxHash) -> Result<(), TransferFailure> {
        match self
            .chain
            .wait_for_receipt(chain_id, tx_hash, self.receipt_timeout)
            .await
        {
            Ok(ReceiptStatus::Success) => Ok(()),
            Ok(ReceiptStatus::Reverted) => Err(TransferFailure::ConfirmationFailed { tx_hash }),
            Err(ChainError::ReceiptTimeout { tx_hash }) => {
                Err(TransferFailure::ConfirmationTimeout { tx_hash })
            }
            Err(e) => Err(TransferFailure::ReceiptUnavailable {
                tx_hash,
                message: e.to_string(),
            }),
        }
    }

    fn finish(
        &self,
        request: &TransferRequest,
        run: Run,
        outcome: Result<(), TransferFailure>,
    ) -> TransferResult {
        let (outcome, message) = match outcome {
            Ok(()) => {
                let mut message = format!(
                    "Sent {} {} to {}",
                    request.amount, request.token_ticker, request.receiver_domain
                );
                if let (Some(chain), Some(tx_hash)) = (self.chains.get(request.chain_id), run.tx_hash) {
                    message.push_str(&format!(": {}", chain.tx_url(&tx_hash)));
                }
                info!(run_id = %run.run_id, tx_hash = ?run.tx_hash, "Transfer succeeded");
                run.enter(TransferState::Succeeded, message.clone());
                (TransferOutcome::Succeeded, message)
            }
            Err(failure) => {
                let message = failure.user_message();
                warn!(
                    run_id = %run.run_id,
                    kind = ?failure.kind(),
                    error = %failure,
                    "Transfer failed"
                );
                run.enter(TransferState::Failed, message.clone());
                (TransferOutcome::Failed(failure), message)
            }
        };

        TransferResult {
            run_id: run.run_id,
            outcome,
            tx_hash: run.tx_hash,
            recipient: run.recipient,
            message,
            finished_at: Utc::now(),
        }
    }
}

/// Per-run bookkeeping, owned by a single `orchestrate` call.
struct Run {
    run_id: Uuid,
    guard: RunGuard,
    updates: broadcast::Sender<TransferUpdate>,
    tx_hash: Option<TxHash>,
    recipient: Option<Address>,
}

impl Run {
    /// Moves the session to `state` and publishes it. The stages only ever
    /// request valid transitions, so a rejected one is a bug.
    fn enter(&self, state: TransferState, message: String) {
        if let Err(e) = self.guard.advance(state) {
            error!(run_id = %self.run_id, error = %e, "Unexpected transfer state change");
            debug_assert!(false, "invalid transfer state change: {e}");
            return;
        }
        self.publish(state, message);
    }

    fn publish(&self, state: TransferState, message: String) {
        // no subscribers is fine
        let _ = self.updates.send(TransferUpdate {
            run_id: self.run_id,
            state,
            message,
        });
    }
}

fn native_transfer(request: &TransferRequest, recipient: Address) -> Result<TransactionRequest, TransferFailure> {
    let value: U256 = parse_units(&request.amount, NATIVE_DECIMALS)
        .map_err(|source| ValidationError::InvalidAmount { source })?;
    Ok(TransactionRequest::default()
        .with_from(request.sender)
        .with_to(recipient)
        .with_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> (Run, broadcast::Receiver<TransferUpdate>) {
        let session = Arc::new(Session::new());
        let (updates, receiver) = broadcast::channel(8);
        let run = Run {
            run_id: Uuid::new_v4(),
            guard: session.begin().unwrap(),
            updates,
            tx_hash: None,
            recipient: None,
        };
        (run, receiver)
    }

    #[test]
    fn test_enter_publishes_the_new_state() {
        let (run, mut receiver) = run();
        run.enter(TransferState::Resolving, "Resolving alice.eth".to_string());

        assert_eq!(run.guard.state(), TransferState::Resolving);
        let update = receiver.try_recv().unwrap();
        assert_eq!(update.state, TransferState::Resolving);
        assert_eq!(update.run_id, run.run_id);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid transfer state change")]
    fn test_invalid_state_change_is_a_bug() {
        let (run, _receiver) = run();
        run.enter(TransferState::Confirming, "Confirming".to_string());
    }
}
