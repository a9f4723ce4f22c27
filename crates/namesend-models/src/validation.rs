use alloy::primitives::U256;
use snafu::{ensure, Snafu};

use crate::units::{parse_units, UnitsError, NATIVE_DECIMALS};

/// Characters that can never appear in a receiver name.
pub const FORBIDDEN_RECEIVER_CHARS: [char; 6] = [' ', '%', '&', '?', '#', '/'];

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("Receiver name is empty"))]
    EmptyReceiver,

    #[snafu(display("Receiver name {receiver:?} has no domain suffix"))]
    MissingSuffix { receiver: String },

    #[snafu(display("Receiver name contains forbidden character {character:?}"))]
    ForbiddenCharacter { character: char },

    #[snafu(display("Amount is empty"))]
    EmptyAmount,

    #[snafu(display("Amount is not a valid number: {source}"))]
    InvalidAmount { source: UnitsError },

    #[snafu(display("Amount must be greater than zero"))]
    NonPositiveAmount,

    #[snafu(display("Available balance {balance:?} is not a valid number"))]
    InvalidBalance { balance: String },

    #[snafu(display("Amount {amount} exceeds available balance {balance}"))]
    InsufficientBalance { amount: String, balance: String },

    #[snafu(display("Token {ticker} is not configured on chain {chain_id}"))]
    UnsupportedToken { chain_id: u64, ticker: String },
}

pub fn validate_receiver(receiver: &str) -> Result<(), ValidationError> {
    ensure!(!receiver.is_empty(), EmptyReceiverSnafu);
    ensure!(receiver.contains('.'), MissingSuffixSnafu { receiver });
    if let Some(character) = receiver
        .chars()
        .find(|c| FORBIDDEN_RECEIVER_CHARS.contains(c))
    {
        return ForbiddenCharacterSnafu { character }.fail();
    }
    Ok(())
}

/// Checks that `amount` is a positive plain decimal not above `balance`.
/// Both are compared at native precision; digits past the 18th decimal are
/// ignored.
pub fn validate_amount(amount: &str, balance: &str) -> Result<(), ValidationError> {
    ensure!(!amount.trim().is_empty(), EmptyAmountSnafu);
    let requested =
        parse_units(amount, NATIVE_DECIMALS).map_err(|source| ValidationError::InvalidAmount { source })?;
    ensure!(requested > U256::ZERO, NonPositiveAmountSnafu);

    let available = parse_units(balance, NATIVE_DECIMALS).map_err(|_| {
        ValidationError::InvalidBalance {
            balance: balance.to_string(),
        }
    })?;
    ensure!(
        requested <= available,
        InsufficientBalanceSnafu {
            amount: amount.trim(),
            balance: balance.trim(),
        }
    );
    Ok(())
}
