//! # Object Artifacts
//!
//! Locally persisted history of resources touched by executed operations.
//! Rows are timestamped on deletion/wrapping instead of removed, so later
//! diagnostics can distinguish "never existed", "currently live", and
//! "once live, now consumed".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Address, ObjectId};

/// One tracked resource, keyed by normalized object id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectArtifact {
    /// Normalized object id.
    pub object_id: ObjectId,
    /// Fully qualified type tag.
    pub object_type: String,
    /// Last observed owner.
    pub owner: Address,
    /// Last observed version.
    pub version: u64,
    /// Last observed content digest.
    pub digest: String,
    /// When the harness first saw the resource created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the resource was deleted, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the resource was wrapped into another object, if ever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped_at: Option<DateTime<Utc>>,
}

impl ObjectArtifact {
    /// Whether the resource has been consumed (deleted or wrapped).
    pub fn is_consumed(&self) -> bool {
        self.deleted_at.is_some() || self.wrapped_at.is_some()
    }
}

/// One resource-level effect reported by an executed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceChange {
    /// A new resource came into existence.
    Created {
        id: ObjectId,
        version: u64,
        digest: String,
        /// Type tag as reported inline; the artifact ledger still fetches
        /// the authoritative descriptor when this is absent.
        object_type: Option<String>,
        owner: Option<Address>,
    },
    /// An existing resource changed content.
    Mutated { id: ObjectId, owner: Address, version: u64, digest: String },
    /// An existing resource changed owner.
    Transferred { id: ObjectId, owner: Address, version: u64, digest: String },
    /// The resource was deleted.
    Deleted { id: ObjectId, version: u64 },
    /// The resource was wrapped into another object.
    Wrapped { id: ObjectId, version: u64 },
}

impl ResourceChange {
    /// The id of the resource this change touches.
    pub fn object_id(&self) -> &ObjectId {
        match self {
            Self::Created { id, .. }
            | Self::Mutated { id, .. }
            | Self::Transferred { id, .. }
            | Self::Deleted { id, .. }
            | Self::Wrapped { id, .. } => id,
        }
    }
}
