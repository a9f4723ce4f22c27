use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{validate_amount, validate_receiver, TransferRequest, TransferResult, ValidationError};

/// The editable send inputs owned by the caller between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferForm {
    pub receiver: String,
    pub token_ticker: String,
    pub amount: String,
}

impl TransferForm {
    /// Local checks only; the send action stays disabled while this fails.
    pub fn check(&self, available_balance: &str) -> Result<(), ValidationError> {
        validate_receiver(&self.receiver)?;
        validate_amount(&self.amount, available_balance)
    }

    pub fn is_sendable(&self, available_balance: &str) -> bool {
        self.check(available_balance).is_ok()
    }

    pub fn to_request(
        &self,
        chain_id: u64,
        sender: Address,
        available_balance: &str,
    ) -> TransferRequest {
        TransferRequest {
            receiver_domain: self.receiver.clone(),
            token_ticker: self.token_ticker.clone(),
            amount: self.amount.clone(),
            available_balance: available_balance.to_string(),
            chain_id,
            sender,
        }
    }

    /// A successful run consumes the amount; everything else is kept so the
    /// user can retry.
    pub fn apply(&mut self, result: &TransferResult) {
        if result.is_success() {
            self.amount.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransferFailure, TransferOutcome};
    use chrono::Utc;
    use uuid::Uuid;

    fn form() -> TransferForm {
        TransferForm {
            receiver: "alice.eth".to_string(),
            token_ticker: "ETH".to_string(),
            amount: "1.5".to_string(),
        }
    }

    fn result(outcome: TransferOutcome) -> TransferResult {
        TransferResult {
            run_id: Uuid::new_v4(),
            outcome,
            tx_hash: None,
            recipient: None,
            message: String::new(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_success_clears_amount() {
        let mut form = form();
        form.apply(&result(TransferOutcome::Succeeded));
        assert!(form.amount.is_empty());
        assert_eq!(form.receiver, "alice.eth");
    }

    #[test]
    fn test_failure_keeps_amount() {
        let mut form = form();
        form.apply(&result(TransferOutcome::Failed(TransferFailure::NoOwner {
            domain: "alice.eth".to_string(),
        })));
        assert_eq!(form.amount, "1.5");
    }

    #[test]
    fn test_sendable_depends_on_balance() {
        let form = form();
        assert!(form.is_sendable("2"));
        assert!(!form.is_sendable("1"));
        assert!(!TransferForm::default().is_sendable("100"));
    }
}
