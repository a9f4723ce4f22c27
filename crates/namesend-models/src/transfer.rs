use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TransferFailure;

/// One user-initiated send. Lives only for the duration of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub receiver_domain: String,
    pub token_ticker: String,
    /// Human-readable decimal amount, e.g. "1.5".
    pub amount: String,
    /// Balance of the selected token as shown to the user, same format as `amount`.
    pub available_balance: String,
    pub chain_id: u64,
    pub sender: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    Idle,
    Validating,
    Resolving,
    /// Token path only.
    Simulating,
    Submitting,
    Confirming,
    Succeeded,
    Failed,
}

/// Progress event published for every state change of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferUpdate {
    pub run_id: Uuid,
    pub state: TransferState,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Succeeded,
    Failed(TransferFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub run_id: Uuid,
    pub outcome: TransferOutcome,
    /// Set once a transaction has been broadcast, even if it later failed.
    pub tx_hash: Option<TxHash>,
    pub recipient: Option<Address>,
    pub message: String,
    pub finished_at: DateTime<Utc>,
}

impl TransferResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Succeeded)
    }

    pub fn failure(&self) -> Option<&TransferFailure> {
        match &self.outcome {
            TransferOutcome::Succeeded => None,
            TransferOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn final_state(&self) -> TransferState {
        match self.outcome {
            TransferOutcome::Succeeded => TransferState::Succeeded,
            TransferOutcome::Failed(_) => TransferState::Failed,
        }
    }
}
