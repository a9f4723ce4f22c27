use alloy::{
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    providers::{Provider, WalletProvider},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use common::{create_http_wallet_provider, HttpWalletProvider, ProviderError};
use dialoguer::Confirm;
use secrecy::{ExposeSecret, SecretString};
use snafu::Snafu;
use tracing::info;
use zeroize::Zeroize;

use crate::wallet::{self, SigningWallet, WalletError};

#[derive(Debug, Snafu)]
pub enum KeyError {
    #[snafu(display("Private key is not valid hex: {}", source))]
    InvalidHex { source: alloy::hex::FromHexError },

    #[snafu(display("Expected a 32 byte private key, got {} bytes", len))]
    InvalidLength { len: usize },

    #[snafu(display("Failed to create wallet provider: {}", source))]
    Provider { source: ProviderError },
}

/// Hex private key as passed on the command line. Never printed.
#[derive(Debug)]
pub struct PrivateKey(SecretString);

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.0.expose_secret().to_string()))
    }
}

impl From<String> for PrivateKey {
    fn from(key: String) -> Self {
        Self(SecretString::from(key))
    }
}

/// How a transaction gets the user's consent before it is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Prompt,
    AutoApprove,
}

/// Local-key signer over HTTP for a single chain.
pub struct EvmWallet {
    provider: HttpWalletProvider,
    address: Address,
    approval: Approval,
}

impl EvmWallet {
    pub fn new(rpc_url: &str, key: &PrivateKey, approval: Approval) -> Result<Self, KeyError> {
        let mut bytes =
            alloy::hex::decode(key.0.expose_secret().trim()).map_err(|source| KeyError::InvalidHex { source })?;
        let len = bytes.len();
        let mut key_bytes: [u8; 32] = match bytes.as_slice().try_into() {
            Ok(key_bytes) => key_bytes,
            Err(_) => {
                bytes.zeroize();
                return Err(KeyError::InvalidLength { len });
            }
        };
        bytes.zeroize();

        let provider = create_http_wallet_provider(rpc_url, key_bytes);
        key_bytes.zeroize();
        let provider = provider.map_err(|source| KeyError::Provider { source })?;

        let address = provider.default_signer_address();
        Ok(Self {
            provider,
            address,
            approval,
        })
    }

    async fn approve(&self, tx: &TransactionRequest) -> wallet::Result<()> {
        if self.approval == Approval::AutoApprove {
            return Ok(());
        }

        let to = tx
            .to
            .and_then(|kind| kind.to().copied())
            .map(|to| to.to_string())
            .unwrap_or_else(|| "a new contract".to_string());
        let value = tx.value.unwrap_or_default();
        let prompt = match tx.input() {
            Some(data) if !data.is_empty() => {
                format!("Sign contract call to {to} ({} bytes of calldata)?", data.len())
            }
            _ => format!("Sign transfer of {value} wei to {to}?"),
        };

        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact()
        })
        .await
        .map_err(|e| WalletError::Rejected {
            reason: e.to_string(),
        })?
        .map_err(|e| WalletError::Rejected {
            reason: e.to_string(),
        })?;

        if !answer {
            return Err(WalletError::Rejected {
                reason: "declined at the confirmation prompt".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SigningWallet for EvmWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> wallet::Result<TxHash> {
        self.approve(&tx).await?;

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::Broadcast {
                reason: e.to_string(),
            })?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }
}
