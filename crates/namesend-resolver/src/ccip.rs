//! EIP-3668 offchain lookups ("CCIP-read").
//!
//! A contract that keeps its data offchain reverts with `OffchainLookup`.
//! The caller fetches the answer from one of the listed gateways and hands it
//! back to the contract through the callback function, which either returns
//! the final result or asks for another lookup.

use crate::contracts::OffchainLookup;
use crate::error::{
    CallRevertedSnafu, GatewayClientSnafu, GatewaySnafu, GatewaysExhaustedSnafu,
    LookupSenderMismatchSnafu, TooManyOffchainLookupsSnafu,
};
use crate::{CallOutcome, ContractReader, OffchainGateway, Result};
use alloy::hex;
use alloy::primitives::{Address, Bytes, FixedBytes};
use alloy::sol_types::{SolError, SolValue};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::time::Duration;
use tracing::{debug, warn};

/// Lookups allowed for a single call before giving up.
pub const MAX_OFFCHAIN_LOOKUPS: usize = 4;

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Calls `contract`, following offchain lookups until it returns.
pub async fn call_with_offchain_lookups(
    reader: &dyn ContractReader,
    gateway: &dyn OffchainGateway,
    contract: Address,
    data: Bytes,
) -> Result<Bytes> {
    let mut data = data;
    for _ in 0..=MAX_OFFCHAIN_LOOKUPS {
        let revert = match reader.call(contract, data).await? {
            CallOutcome::Returned(output) => return Ok(output),
            CallOutcome::Reverted(revert) => revert,
        };
        let Ok(lookup) = OffchainLookup::abi_decode(&revert[..]) else {
            return CallRevertedSnafu { contract, data: revert }.fail();
        };
        ensure!(
            lookup.sender == contract,
            LookupSenderMismatchSnafu {
                sender: lookup.sender,
                contract,
            }
        );
        debug!(%contract, urls = ?lookup.urls, "Following offchain lookup");

        let response = fetch_from_gateways(gateway, &lookup).await?;
        data = callback_data(lookup.callbackFunction, response, lookup.extraData);
    }
    TooManyOffchainLookupsSnafu { contract }.fail()
}

async fn fetch_from_gateways(gateway: &dyn OffchainGateway, lookup: &OffchainLookup) -> Result<Bytes> {
    for url in &lookup.urls {
        match gateway.fetch(url, lookup.sender, &lookup.callData).await {
            Ok(response) => return Ok(response),
            Err(e) => warn!(%url, sender = %lookup.sender, error = %e, "Gateway failed, trying next"),
        }
    }
    GatewaysExhaustedSnafu {
        sender: lookup.sender,
    }
    .fail()
}

fn callback_data(callback: FixedBytes<4>, response: Bytes, extra_data: Bytes) -> Bytes {
    let mut data = callback.to_vec();
    data.extend_from_slice(&(response, extra_data).abi_encode_params());
    data.into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayBody {
    pub data: String,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    Get(String),
    Post { url: String, body: GatewayBody },
}

/// Fills a gateway URL template. Templates that carry `{data}` are fetched
/// with GET, the rest get the call data in a POST body.
pub fn gateway_request(template: &str, sender: Address, data: &Bytes) -> GatewayRequest {
    let sender = hex::encode_prefixed(sender);
    let data = hex::encode_prefixed(data);
    let url = template.replace("{sender}", &sender);
    if url.contains("{data}") {
        GatewayRequest::Get(url.replace("{data}", &data))
    } else {
        GatewayRequest::Post {
            url,
            body: GatewayBody { data, sender },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    data: Bytes,
}

pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context(GatewayClientSnafu)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OffchainGateway for HttpGateway {
    async fn fetch(&self, url: &str, sender: Address, data: &Bytes) -> Result<Bytes> {
        let request = match gateway_request(url, sender, data) {
            GatewayRequest::Get(url) => self.client.get(url),
            GatewayRequest::Post { url, body } => self.client.post(url).json(&body),
        };
        let gateway_error = |e: reqwest::Error| GatewaySnafu {
            url,
            message: e.to_string(),
        }
        .build();

        let response = request.send().await.map_err(gateway_error)?;
        let status = response.status();
        ensure!(
            status.is_success(),
            GatewaySnafu {
                url,
                message: format!("HTTP {status}"),
            }
        );
        let body = response
            .json::<GatewayResponse>()
            .await
            .map_err(gateway_error)?;
        Ok(body.data)
    }
}
