//! Faucet HTTP client.
//!
//! The faucet contract is a single "credit this address" request. The only
//! guarantee is success or failure; credited resources appear on the ledger
//! asynchronously, so callers poll holdings afterwards.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use localnet_types::Address;

use crate::error::RpcError;

#[derive(Serialize)]
struct CreditRequest {
    address: String,
}

/// Client for the node's optional funding faucet.
pub struct FaucetClient {
    client: Client,
    faucet_url: String,
}

impl FaucetClient {
    /// Creates a client for the given faucet base URL.
    pub fn new(faucet_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(RpcError::Http)?;
        Ok(Self { client, faucet_url: faucet_url.into() })
    }

    /// Returns the faucet endpoint URL.
    pub fn faucet_url(&self) -> &str {
        &self.faucet_url
    }

    /// Requests one credit for the given address.
    pub async fn credit(&self, address: Address) -> Result<(), RpcError> {
        let url = format!("{}/credit", self.faucet_url.trim_end_matches('/'));
        debug!(%address, url, "faucet credit request");

        let response = self
            .client
            .post(&url)
            .json(&CreditRequest { address: address.to_string() })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(format!("cannot connect to faucet at {url}"))
                } else {
                    RpcError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RpcError::FaucetRejected { status: status.as_u16(), body })
    }
}
