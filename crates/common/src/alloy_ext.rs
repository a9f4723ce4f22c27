use alloy::{
    network::EthereumWallet,
    primitives::B256,
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        DynProvider, Identity, Provider, ProviderBuilder, RootProvider,
    },
    signers::local::PrivateKeySigner,
};
use snafu::{ResultExt, Snafu};
use url::Url;

pub type HttpWalletProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
>;

#[derive(Debug, Snafu)]
pub enum ProviderError {
    #[snafu(display("Invalid RPC URL {url}: {source}"))]
    InvalidRpcUrl {
        url: String,
        source: url::ParseError,
    },

    #[snafu(display("Failed to create local signer: {}", source))]
    LocalSigner {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<alloy::signers::local::LocalSignerError> for ProviderError {
    fn from(error: alloy::signers::local::LocalSignerError) -> Self {
        ProviderError::LocalSigner {
            source: Box::new(error),
        }
    }
}

fn parse_rpc_url(rpc_url: &str) -> Result<Url, ProviderError> {
    rpc_url.parse().context(InvalidRpcUrlSnafu { url: rpc_url })
}

/// Creates a type-erased, read-only provider over HTTP. No request is made
/// until the provider is used.
pub fn create_http_provider(rpc_url: &str) -> Result<DynProvider, ProviderError> {
    let url = parse_rpc_url(rpc_url)?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// Creates a provider that is both an HTTP provider and a wallet provider.
/// note NOT type erased so we can access the wallet methods of the provider
pub fn create_http_wallet_provider(
    rpc_url: &str,
    private_key: [u8; 32],
) -> Result<HttpWalletProvider, ProviderError> {
    let url = parse_rpc_url(rpc_url)?;
    let signer = PrivateKeySigner::from_bytes(&B256::from(private_key))
        .map_err(alloy::signers::local::LocalSignerError::from)?;

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::new(signer))
        .connect_http(url);

    Ok(provider)
}
