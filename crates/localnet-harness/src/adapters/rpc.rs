//! RPC-backed port adapters.
//!
//! Maps `localnet-rpc` errors onto the port taxonomy: connection failures
//! and transport errors become `Unavailable`, JSON-RPC error objects from
//! `submit` become `Rejected` (that is where stale/locked conflict text
//! arrives), and everything else keeps its message.

use async_trait::async_trait;

use localnet_rpc::{LedgerRpcClient, RpcError};
use localnet_rpc::types::SubmitOptions;
use localnet_types::{
    Address, EventRecord, ExecutionEffects, ObjectId, OperationDigest, ReadinessSnapshot,
    ResourceDescriptor, ResourceRecord, SignedOperation,
};

use crate::ports::{FaucetApi, LedgerError, LedgerReader, LedgerSubmitter};

fn map_read_error(err: RpcError) -> LedgerError {
    match err {
        RpcError::Connection(msg) => LedgerError::Unavailable(msg),
        RpcError::Http(e) => LedgerError::Unavailable(e.to_string()),
        RpcError::Rpc(msg) if msg.contains("not found") => LedgerError::NotFound(msg),
        RpcError::Rpc(msg) | RpcError::Parse(msg) => LedgerError::Unavailable(msg),
        RpcError::FaucetRejected { status, body } => {
            LedgerError::Rejected(format!("faucet status {status}: {body}"))
        }
    }
}

/// The real ledger node behind the reader/submitter ports.
pub struct RpcLedger {
    client: LedgerRpcClient,
}

impl RpcLedger {
    /// Wraps an RPC client.
    pub fn new(client: LedgerRpcClient) -> Self {
        Self { client }
    }

    /// The RPC endpoint URL.
    pub fn rpc_url(&self) -> &str {
        self.client.rpc_url()
    }
}

#[async_trait]
impl LedgerReader for RpcLedger {
    async fn latest_sequence(&self) -> Result<u64, LedgerError> {
        self.client.latest_sequence().await.map_err(map_read_error)
    }

    async fn readiness_snapshot(&self) -> Result<ReadinessSnapshot, LedgerError> {
        self.client.readiness_snapshot().await.map_err(map_read_error)
    }

    async fn owned_resources(&self, owner: Address) -> Result<Vec<ResourceRecord>, LedgerError> {
        self.client.owned_resources(owner).await.map_err(map_read_error)
    }

    async fn resource(&self, id: &ObjectId) -> Result<ResourceDescriptor, LedgerError> {
        self.client.resource(id).await.map_err(map_read_error)
    }

    async fn operation(
        &self,
        digest: &OperationDigest,
    ) -> Result<Option<ExecutionEffects>, LedgerError> {
        self.client.operation(digest).await.map_err(map_read_error)
    }

    async fn events_by_digest(
        &self,
        digest: &OperationDigest,
    ) -> Result<Vec<EventRecord>, LedgerError> {
        self.client.events_by_digest(digest).await.map_err(map_read_error)
    }

    async fn events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>, LedgerError> {
        self.client.events_by_type(event_type).await.map_err(map_read_error)
    }
}

#[async_trait]
impl LedgerSubmitter for RpcLedger {
    async fn submit(&self, signed: &SignedOperation) -> Result<ExecutionEffects, LedgerError> {
        self.client.submit(signed, SubmitOptions::default()).await.map_err(|err| match err {
            RpcError::Connection(msg) => LedgerError::Unavailable(msg),
            RpcError::Http(e) => LedgerError::Unavailable(e.to_string()),
            // Submission-time rejections carry the node's conflict text.
            RpcError::Rpc(msg) => LedgerError::Rejected(msg),
            RpcError::Parse(msg) => LedgerError::Unavailable(msg),
            RpcError::FaucetRejected { status, body } => {
                LedgerError::Rejected(format!("faucet status {status}: {body}"))
            }
        })
    }
}

/// The real faucet behind the faucet port.
pub struct RpcFaucet {
    client: localnet_rpc::FaucetClient,
}

impl RpcFaucet {
    /// Wraps a faucet client.
    pub fn new(client: localnet_rpc::FaucetClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FaucetApi for RpcFaucet {
    async fn credit(&self, address: Address) -> Result<(), LedgerError> {
        self.client.credit(address).await.map_err(|err| match err {
            RpcError::Connection(msg) => LedgerError::Unavailable(msg),
            RpcError::FaucetRejected { status, body } => {
                LedgerError::Rejected(format!("status {status}: {body}"))
            }
            other => LedgerError::Unavailable(other.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        self.client.faucet_url().to_string()
    }
}
