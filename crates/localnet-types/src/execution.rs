//! # Execution Types
//!
//! State-mutating operations, their signed envelope, and the effects the
//! ledger reports back after execution.

use serde::{Deserialize, Serialize};

use crate::artifacts::ResourceChange;
use crate::ids::{Address, ObjectId, OperationDigest};

/// A state-mutating operation before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The account submitting the operation.
    pub sender: Address,
    /// What the operation does.
    pub kind: OperationKind,
    /// The resource record designated to cover the execution fee.
    ///
    /// Left empty by most callers; the execution wrapper assigns the
    /// freshest spendable record owned by the signer before submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_resource: Option<ObjectId>,
}

impl Operation {
    /// Builds an operation with no fee resource assigned yet.
    pub fn new(sender: Address, kind: OperationKind) -> Self {
        Self { sender, kind, fee_resource: None }
    }
}

/// The payload of a state-mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationKind {
    /// Split the sender's native resource into equal shares and transfer
    /// each share to the recipient. Used by the treasury funding path; the
    /// whole split-and-transfer is one atomic operation.
    PayShares { recipient: Address, share_amount: u64, share_count: u64 },
    /// Publish a built package to the ledger.
    PublishPackage { modules: Vec<String>, dependencies: Vec<ObjectId> },
    /// Call an entry function of a published package.
    Call { package: ObjectId, module: String, function: String, args: Vec<serde_json::Value> },
    /// An opaque pre-encoded operation body.
    Raw(serde_json::Value),
}

/// A signed operation ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    /// The operation body.
    pub operation: Operation,
    /// Hex-encoded ed25519 signature over the canonical JSON body.
    pub signature: String,
    /// Hex-encoded ed25519 public key of the signer.
    pub public_key: String,
}

/// Terminal status of an executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The ledger accepted and applied the operation.
    Success,
    /// The ledger executed the operation but it aborted.
    Failure { reason: String },
}

impl ExecutionStatus {
    /// Whether the operation was applied.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Effects reported by the ledger for one executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEffects {
    /// Digest of the submitted operation.
    pub digest: OperationDigest,
    /// Terminal status.
    pub status: ExecutionStatus,
    /// Resource-level effects, in ledger order.
    #[serde(default)]
    pub changes: Vec<ResourceChange>,
    /// Events emitted during execution.
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

/// One event emitted by an executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Digest of the emitting operation.
    pub digest: OperationDigest,
    /// Fully qualified event type tag.
    pub event_type: String,
    /// Event payload as reported by the node.
    pub payload: serde_json::Value,
}

/// Point-in-time network health summary captured when the node turns ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSnapshot {
    /// Current epoch.
    pub epoch: u64,
    /// Latest checkpoint/sequence number.
    pub latest_sequence: u64,
    /// Number of active validators.
    pub validator_count: usize,
    /// Reference fee price in minor units.
    pub reference_fee_price: u64,
}
