use alloy::primitives::{Address, U256};
use futures_util::future::join_all;
use namesend_models::{format_units, TokenIdentifier, NATIVE_DECIMALS};
use std::collections::BTreeMap;
use tracing::warn;

use crate::{ChainOperations, Result};

/// One row of the balance display. A failed query keeps its row with a zero
/// amount and the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub ticker: String,
    pub token: TokenIdentifier,
    pub amount: U256,
    pub decimals: u8,
    pub formatted: String,
    pub error: Option<String>,
}

pub async fn fetch_balance(
    ops: &dyn ChainOperations,
    chain_id: u64,
    ticker: &str,
    token: TokenIdentifier,
    owner: Address,
) -> Result<TokenBalance> {
    let decimals = match token.contract() {
        Some(contract) => ops.token_decimals(chain_id, contract).await?,
        None => NATIVE_DECIMALS,
    };
    let amount = ops.balance_of(chain_id, &token, owner).await?;

    Ok(TokenBalance {
        ticker: ticker.to_string(),
        token,
        amount,
        decimals,
        formatted: format_units(amount, decimals),
        error: None,
    })
}

/// Queries every configured token concurrently. Entries come back in ticker
/// order and a single failure never fails the set.
pub async fn fetch_balances(
    ops: &dyn ChainOperations,
    chain_id: u64,
    tokens: &BTreeMap<String, TokenIdentifier>,
    owner: Address,
) -> Vec<TokenBalance> {
    let queries = tokens.iter().map(|(ticker, token)| async move {
        match fetch_balance(ops, chain_id, ticker, *token, owner).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(chain_id, %ticker, %owner, error = %e, "Balance query failed");
                let decimals = if token.is_native() { NATIVE_DECIMALS } else { 0 };
                TokenBalance {
                    ticker: ticker.clone(),
                    token: *token,
                    amount: U256::ZERO,
                    decimals,
                    formatted: format_units(U256::ZERO, decimals),
                    error: Some(e.to_string()),
                }
            }
        }
    });

    join_all(queries).await
}
