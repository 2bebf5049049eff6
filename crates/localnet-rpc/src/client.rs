//! Ledger JSON-RPC client.
//!
//! Read surface: latest sequence number, readiness snapshot, owned
//! resources, resource by id, operation by digest, events by digest or
//! type. Write surface: submit a signed operation requesting effects,
//! events, and resource changes in the response.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use localnet_types::{
    Address, EventRecord, ExecutionEffects, ObjectId, OperationDigest, ReadinessSnapshot,
    ResourceDescriptor, ResourceRecord, SignedOperation,
};

use crate::error::RpcError;
use crate::types::{JsonRpcRequest, JsonRpcResponse, SubmitOptions};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connect timeout. Short, because readiness polling leans on
/// connection-refused being reported quickly.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// JSON-RPC client bound to one node's RPC endpoint.
pub struct LedgerRpcClient {
    client: Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl LedgerRpcClient {
    /// Creates a client for the given RPC endpoint URL.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self { client, rpc_url: rpc_url.into(), request_id: AtomicU64::new(1) })
    }

    /// Returns the endpoint URL this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Calls a JSON-RPC method whose result must be present.
    async fn call<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        self.call_nullable(method, params)
            .await?
            .ok_or_else(|| RpcError::Parse("missing result in response".to_string()))
    }

    /// Calls a JSON-RPC method whose result may legitimately be `null`.
    async fn call_nullable<P: serde::Serialize, R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, RpcError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        debug!(method, url = %self.rpc_url, "rpc call");

        let response =
            self.client.post(&self.rpc_url).json(&request).send().await.map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(format!("cannot connect to {}", self.rpc_url))
                } else {
                    RpcError::Http(e)
                }
            })?;

        let rpc_response: JsonRpcResponse<serde_json::Value> =
            response.json().await.map_err(|e| RpcError::Parse(e.to_string()))?;

        decode_result(rpc_response)
    }

    /// Fetches the latest checkpoint/sequence number. Doubles as the
    /// readiness health probe.
    pub async fn latest_sequence(&self) -> Result<u64, RpcError> {
        self.call::<[(); 0], u64>("ledger_latestSequence", []).await
    }

    /// Fetches the readiness snapshot (epoch, sequence, validators, fee price).
    pub async fn readiness_snapshot(&self) -> Result<ReadinessSnapshot, RpcError> {
        self.call::<[(); 0], ReadinessSnapshot>("ledger_readinessSnapshot", []).await
    }

    /// Lists the spendable resource records owned by an account.
    pub async fn owned_resources(&self, owner: Address) -> Result<Vec<ResourceRecord>, RpcError> {
        self.call("account_ownedResources", [owner.to_string()]).await
    }

    /// Fetches the full descriptor of one object.
    pub async fn resource(&self, id: &ObjectId) -> Result<ResourceDescriptor, RpcError> {
        self.call("object_describe", [id.as_str()]).await
    }

    /// Fetches the effects of a previously submitted operation, if the node
    /// has it. A `null` result means the operation is not yet checkpointed.
    pub async fn operation(
        &self,
        digest: &OperationDigest,
    ) -> Result<Option<ExecutionEffects>, RpcError> {
        self.call_nullable("operation_byDigest", [digest.0.as_str()]).await
    }

    /// Queries events emitted by one operation.
    pub async fn events_by_digest(
        &self,
        digest: &OperationDigest,
    ) -> Result<Vec<EventRecord>, RpcError> {
        self.call("event_byOperation", [digest.0.as_str()]).await
    }

    /// Queries events by fully qualified event type.
    pub async fn events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>, RpcError> {
        self.call("event_byType", [event_type]).await
    }

    /// Submits a signed operation and returns its effects.
    ///
    /// Validation rejections (stale fee resource, contested objects) come
    /// back as [`RpcError::Rpc`] carrying the node's message; the execution
    /// wrapper classifies that text.
    pub async fn submit(
        &self,
        signed: &SignedOperation,
        options: SubmitOptions,
    ) -> Result<ExecutionEffects, RpcError> {
        #[derive(serde::Serialize)]
        struct SubmitParams<'a> {
            operation: &'a SignedOperation,
            options: SubmitOptions,
        }
        self.call("operation_submit", SubmitParams { operation: signed, options }).await
    }
}

/// Unpacks a JSON-RPC envelope: an `error` member wins, a `null` or absent
/// `result` decodes as `None`, anything else must deserialize as `R`.
fn decode_result<R: serde::de::DeserializeOwned>(
    response: JsonRpcResponse<serde_json::Value>,
) -> Result<Option<R>, RpcError> {
    if let Some(error) = response.error {
        return Err(RpcError::Rpc(error.to_string()));
    }
    match response.result {
        None => Ok(None),
        Some(value) => {
            serde_json::from_value(value).map(Some).map_err(|e| RpcError::Parse(e.to_string()))
        }
    }
}
