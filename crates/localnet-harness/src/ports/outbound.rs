//! Outbound port traits at the ledger boundary.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use localnet_types::{
    Address, EventRecord, ExecutionEffects, ObjectId, Operation, OperationDigest,
    ReadinessSnapshot, ResourceDescriptor, ResourceRecord, SignedOperation,
};

/// Errors crossing the ledger boundary.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Transport failure: the node is unreachable or the call failed in
    /// flight. Readiness polling treats this as "not ready yet".
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The node rejected the submission before execution. Stale and locked
    /// resource conflicts arrive here; the conflict classifier reads this
    /// message.
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// A lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Read operations against the ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Latest checkpoint/sequence number; doubles as the health probe.
    async fn latest_sequence(&self) -> Result<u64, LedgerError>;

    /// Point-in-time network health summary.
    async fn readiness_snapshot(&self) -> Result<ReadinessSnapshot, LedgerError>;

    /// Spendable resource records owned by an account.
    async fn owned_resources(&self, owner: Address) -> Result<Vec<ResourceRecord>, LedgerError>;

    /// Full descriptor of one object.
    async fn resource(&self, id: &ObjectId) -> Result<ResourceDescriptor, LedgerError>;

    /// Effects of a previously submitted operation, if known.
    async fn operation(
        &self,
        digest: &OperationDigest,
    ) -> Result<Option<ExecutionEffects>, LedgerError>;

    /// Events emitted by one operation.
    async fn events_by_digest(
        &self,
        digest: &OperationDigest,
    ) -> Result<Vec<EventRecord>, LedgerError>;

    /// Events by fully qualified event type.
    async fn events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>, LedgerError>;
}

/// The single write operation against the ledger.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Submits a signed operation, requesting effects, events, and resource
    /// changes in the response.
    async fn submit(&self, signed: &SignedOperation) -> Result<ExecutionEffects, LedgerError>;
}

/// The optional funding faucet.
#[async_trait]
pub trait FaucetApi: Send + Sync {
    /// Requests one credit for the address. No response-body guarantee
    /// beyond success/failure; credited resources appear asynchronously.
    async fn credit(&self, address: Address) -> Result<(), LedgerError>;

    /// The endpoint URL, for error messages.
    fn endpoint(&self) -> String;
}

/// Anything that can sign operations: synthetic accounts and keystore
/// (treasury) accounts.
pub trait OperationSigner: Send + Sync {
    /// The signer's address.
    fn address(&self) -> Address;

    /// Signs the canonical operation bytes, returning the signed envelope.
    fn sign_operation(&self, operation: &Operation) -> SignedOperation;
}

/// A package built by the external toolchain.
#[derive(Debug, Clone)]
pub struct BuiltPackage {
    /// Base64-encoded compiled modules.
    pub modules: Vec<String>,
    /// Object ids of the package's on-ledger dependencies.
    pub dependencies: Vec<ObjectId>,
}

/// The on-ledger result of publishing a package.
#[derive(Debug, Clone)]
pub struct PublishArtifact {
    /// Object id of the published package.
    pub package_id: ObjectId,
    /// Digest of the publishing operation.
    pub digest: OperationDigest,
}

/// External package build/publish toolchain. The harness never implements
/// build logic; it only invokes this with paths under the sandbox's private
/// source copy.
#[async_trait]
pub trait PackagePublisher: Send + Sync {
    /// Builds the package at `path`.
    async fn build(&self, path: &Path) -> Result<BuiltPackage, LedgerError>;

    /// Publishes the package at `path`, signed by `signer`.
    async fn publish(
        &self,
        path: &Path,
        signer: &dyn OperationSigner,
    ) -> Result<PublishArtifact, LedgerError>;
}
