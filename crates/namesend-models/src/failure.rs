use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::ValidationError;

/// Error classes surfaced to the caller of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Resolution,
    Contract,
    UserRejection,
    Network,
    Confirmation,
}

/// Why a transfer ended in `Failed`. Each variant is produced by exactly one
/// stage and never escapes the orchestrator as an uncaught error.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum TransferFailure {
    #[snafu(display("Invalid transfer: {source}"))]
    Validation { source: ValidationError },

    #[snafu(display("{domain} has no owner"))]
    NoOwner { domain: String },

    #[snafu(display("{domain} is owned by the sender"))]
    SelfSend { domain: String },

    #[snafu(display("Transfer simulation failed: {message}"))]
    Contract { message: String },

    #[snafu(display("Amount is below the precision of {ticker} ({decimals} decimals)"))]
    BelowTokenPrecision { ticker: String, decimals: u8 },

    #[snafu(display("Wallet declined the request: {message}"))]
    UserRejected { message: String },

    #[snafu(display("Failed to broadcast transaction: {message}"))]
    Broadcast { message: String },

    #[snafu(display("Transaction {tx_hash} was included but did not succeed"))]
    ConfirmationFailed { tx_hash: TxHash },

    #[snafu(display("No receipt for {tx_hash} before the timeout elapsed"))]
    ConfirmationTimeout { tx_hash: TxHash },

    #[snafu(display("Could not fetch the receipt of {tx_hash}: {message}"))]
    ReceiptUnavailable { tx_hash: TxHash, message: String },
}

impl TransferFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransferFailure::Validation { .. } => FailureKind::Validation,
            TransferFailure::NoOwner { .. } | TransferFailure::SelfSend { .. } => {
                FailureKind::Resolution
            }
            TransferFailure::Contract { .. } | TransferFailure::BelowTokenPrecision { .. } => {
                FailureKind::Contract
            }
            TransferFailure::UserRejected { .. } => FailureKind::UserRejection,
            TransferFailure::Broadcast { .. } | TransferFailure::ReceiptUnavailable { .. } => {
                FailureKind::Network
            }
            TransferFailure::ConfirmationFailed { .. }
            | TransferFailure::ConfirmationTimeout { .. } => FailureKind::Confirmation,
        }
    }

    /// Text shown to the user once the run is over. Wallet rejections are
    /// reworded instead of echoing the signer's raw message.
    pub fn user_message(&self) -> String {
        match self {
            TransferFailure::Validation { source } => source.to_string(),
            TransferFailure::NoOwner { .. } => {
                "This name has no owner. Sending aborted.".to_string()
            }
            TransferFailure::SelfSend { .. } => {
                "The receiver name is yours: cannot send to self.".to_string()
            }
            TransferFailure::Contract { message } => {
                format!("The token contract rejected the transfer: {message}")
            }
            TransferFailure::BelowTokenPrecision { ticker, decimals } => {
                format!("The amount is smaller than the smallest unit of {ticker} ({decimals} decimals).")
            }
            TransferFailure::UserRejected { .. } => {
                "The request was rejected, try again.".to_string()
            }
            TransferFailure::Broadcast { message } => {
                format!("The transaction could not be broadcast: {message}")
            }
            TransferFailure::ConfirmationFailed { .. } => "Transaction failed.".to_string(),
            TransferFailure::ConfirmationTimeout { tx_hash } => {
                format!("Timed out waiting for transaction {tx_hash} to confirm.")
            }
            TransferFailure::ReceiptUnavailable { tx_hash, .. } => {
                format!("Transaction {tx_hash} was sent but its status could not be checked.")
            }
        }
    }
}

impl From<ValidationError> for TransferFailure {
    fn from(source: ValidationError) -> Self {
        TransferFailure::Validation { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_reworded() {
        let failure = TransferFailure::UserRejected {
            message: "MetaMask Tx Signature: User denied transaction signature.".to_string(),
        };
        assert_eq!(failure.kind(), FailureKind::UserRejection);
        assert_eq!(failure.user_message(), "The request was rejected, try again.");
    }

    #[test]
    fn test_confirmation_failure_differs_from_broadcast_failure() {
        let confirmation = TransferFailure::ConfirmationFailed {
            tx_hash: TxHash::repeat_byte(1),
        };
        let broadcast = TransferFailure::Broadcast {
            message: "connection refused".to_string(),
        };
        assert_eq!(confirmation.kind(), FailureKind::Confirmation);
        assert_eq!(broadcast.kind(), FailureKind::Network);
        assert_ne!(confirmation.user_message(), broadcast.user_message());
        assert!(confirmation.user_message().to_lowercase().contains("transaction failed"));
    }

    #[test]
    fn test_resolution_messages() {
        let no_owner = TransferFailure::NoOwner {
            domain: "ghost.eth".to_string(),
        };
        let self_send = TransferFailure::SelfSend {
            domain: "me.eth".to_string(),
        };
        assert_eq!(no_owner.kind(), FailureKind::Resolution);
        assert!(no_owner.user_message().contains("no owner"));
        assert!(self_send.user_message().contains("cannot send to self"));
    }

    #[test]
    fn test_below_precision_is_a_contract_failure() {
        let failure = TransferFailure::BelowTokenPrecision {
            ticker: "USDC".to_string(),
            decimals: 6,
        };
        assert_eq!(failure.kind(), FailureKind::Contract);
        assert!(failure.user_message().contains("smallest unit of USDC"));
    }
}
