use crate::error::{ChainError, ReceiptTimeoutSnafu, RevertSnafu};
use crate::{ChainClientProvider, ChainOperations, ReceiptStatus, Result};
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::RpcError;
use async_trait::async_trait;
use common::GenericERC20::GenericERC20Instance;
use namesend_models::TokenIdentifier;
use snafu::OptionExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// `ChainOperations` over plain JSON-RPC, using the cached per-chain clients.
pub struct EvmChainOperations {
    clients: Arc<ChainClientProvider>,
    poll_interval: Duration,
}

impl EvmChainOperations {
    pub fn new(clients: Arc<ChainClientProvider>) -> Self {
        Self {
            clients,
            poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn poll_receipt(&self, client: &DynProvider, tx_hash: TxHash) -> ReceiptStatus {
        loop {
            match client.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    debug!(%tx_hash, block = ?receipt.block_number, "Receipt found");
                    return if receipt.status() {
                        ReceiptStatus::Success
                    } else {
                        ReceiptStatus::Reverted
                    };
                }
                Ok(None) => {}
                Err(e) => warn!(%tx_hash, error = %e, "Receipt poll failed"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl ChainOperations for EvmChainOperations {
    async fn simulate(&self, chain_id: u64, tx: &TransactionRequest) -> Result<()> {
        let client = self.clients.get_client(chain_id)?;

        match client.call(tx.clone()).await {
            Ok(_) => Ok(()),
            Err(RpcError::ErrorResp(error_payload)) => RevertSnafu {
                message: error_payload.message.to_string(),
            }
            .fail(),
            Err(e) => Err(ChainError::Rpc {
                chain_id,
                message: e.to_string(),
            }),
        }
    }

    async fn token_decimals(&self, chain_id: u64, token: Address) -> Result<u8> {
        let client = self.clients.get_client(chain_id)?;
        let contract = GenericERC20Instance::new(token, client);
        contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::ContractCall {
                message: e.to_string(),
            })
    }

    async fn balance_of(
        &self,
        chain_id: u64,
        token: &TokenIdentifier,
        owner: Address,
    ) -> Result<U256> {
        let client = self.clients.get_client(chain_id)?;
        match token {
            TokenIdentifier::Native => {
                client
                    .get_balance(owner)
                    .await
                    .map_err(|e| ChainError::Rpc {
                        chain_id,
                        message: e.to_string(),
                    })
            }
            TokenIdentifier::Address(address) => {
                let contract = GenericERC20Instance::new(*address, client);
                contract
                    .balanceOf(owner)
                    .call()
                    .await
                    .map_err(|e| ChainError::ContractCall {
                        message: e.to_string(),
                    })
            }
        }
    }

    async fn wait_for_receipt(
        &self,
        chain_id: u64,
        tx_hash: TxHash,
        timeout: Option<Duration>,
    ) -> Result<ReceiptStatus> {
        let client = self.clients.get_client(chain_id)?;
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_receipt(&client, tx_hash))
                .await
                .ok()
                .context(ReceiptTimeoutSnafu { tx_hash }),
            None => Ok(self.poll_receipt(&client, tx_hash).await),
        }
    }
}
