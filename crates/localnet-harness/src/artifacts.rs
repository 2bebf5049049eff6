//! File-backed object artifact ledger.
//!
//! One JSON file per network name holds every resource the harness has seen
//! created, mutated, deleted, or wrapped, so later test steps and subsequent
//! runs rediscover entities without re-querying the whole network. Rows for
//! consumed resources are timestamped, never removed.
//!
//! Writes go through an internal async mutex: one writer per ledger handle.
//! Cross-process writers still race last-writer-wins, which the harness
//! accepts at test scale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use localnet_types::{ObjectArtifact, ObjectId, ResourceChange};

use crate::error::HarnessError;
use crate::ports::{LedgerError, LedgerReader};

/// Artifacts touched by one `record_changes` call, partitioned by effect.
#[derive(Debug, Clone, Default)]
pub struct AffectedArtifacts {
    /// Newly created resources.
    pub created: Vec<ObjectArtifact>,
    /// Resources mutated or transferred in place.
    pub updated: Vec<ObjectArtifact>,
    /// Ids stamped with a deletion timestamp.
    pub deleted: Vec<ObjectId>,
    /// Ids stamped with a wrap timestamp.
    pub wrapped: Vec<ObjectId>,
}

/// The artifact index for one network name.
pub struct ArtifactLedger {
    network: String,
    path: PathBuf,
    rows: Mutex<BTreeMap<ObjectId, ObjectArtifact>>,
}

impl ArtifactLedger {
    /// Opens (or creates) the ledger for `network` under `artifacts_dir`,
    /// loading any rows a previous run left behind.
    pub fn open(artifacts_dir: &Path, network: &str) -> Result<Self, HarnessError> {
        std::fs::create_dir_all(artifacts_dir)?;
        let path = artifacts_dir.join(format!("{network}.artifacts.json"));

        let rows = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let list: Vec<ObjectArtifact> = serde_json::from_str(&raw)
                .map_err(|err| HarnessError::Artifacts(format!("corrupt artifact file {}: {err}", path.display())))?;
            list.into_iter().map(|row| (row.object_id.clone(), row)).collect()
        } else {
            BTreeMap::new()
        };

        debug!(network, path = %path.display(), "opened artifact ledger");
        Ok(Self { network: network.to_string(), path, rows: Mutex::new(rows) })
    }

    /// The network name this ledger belongs to.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Records the resource changes of one executed operation.
    ///
    /// Created entries fetch the full resource descriptor for authoritative
    /// type/owner data; mutations and transfers update known rows in place
    /// (unknown or already-consumed ids are no-ops); deletions and wraps
    /// stamp the matching timestamp. The full current set is rewritten on
    /// return.
    pub async fn record_changes(
        &self,
        reader: &dyn LedgerReader,
        changes: &[ResourceChange],
    ) -> Result<AffectedArtifacts, HarnessError> {
        let mut rows = self.rows.lock().await;
        let mut affected = AffectedArtifacts::default();
        let now = Utc::now();

        for change in changes {
            match change {
                ResourceChange::Created { id, version, digest, object_type, owner } => {
                    let artifact = match self.describe_created(reader, id).await {
                        Some(descriptor) => ObjectArtifact {
                            object_id: id.clone(),
                            object_type: descriptor.object_type,
                            owner: descriptor.owner,
                            version: descriptor.version,
                            digest: descriptor.digest,
                            created_at: Some(now),
                            deleted_at: None,
                            wrapped_at: None,
                        },
                        // Fall back to what the effects carried inline.
                        None => ObjectArtifact {
                            object_id: id.clone(),
                            object_type: object_type.clone().unwrap_or_else(|| "unknown".to_string()),
                            owner: owner.unwrap_or_default(),
                            version: *version,
                            digest: digest.clone(),
                            created_at: Some(now),
                            deleted_at: None,
                            wrapped_at: None,
                        },
                    };
                    affected.created.push(artifact.clone());
                    rows.insert(id.clone(), artifact);
                }
                ResourceChange::Mutated { id, owner, version, digest }
                | ResourceChange::Transferred { id, owner, version, digest } => {
                    // Only resources this ledger created or previously saw;
                    // consumed rows are excluded from mutation matching.
                    if let Some(row) = rows.get_mut(id).filter(|row| !row.is_consumed()) {
                        row.owner = *owner;
                        row.version = *version;
                        row.digest = digest.clone();
                        affected.updated.push(row.clone());
                    }
                }
                ResourceChange::Deleted { id, .. } => {
                    if let Some(row) = rows.get_mut(id) {
                        row.deleted_at = Some(now);
                        affected.deleted.push(id.clone());
                    }
                }
                ResourceChange::Wrapped { id, .. } => {
                    if let Some(row) = rows.get_mut(id) {
                        row.wrapped_at = Some(now);
                        affected.wrapped.push(id.clone());
                    }
                }
            }
        }

        self.persist(&rows)?;
        Ok(affected)
    }

    async fn describe_created(
        &self,
        reader: &dyn LedgerReader,
        id: &ObjectId,
    ) -> Option<localnet_types::ResourceDescriptor> {
        match reader.resource(id).await {
            Ok(descriptor) => Some(descriptor),
            Err(LedgerError::NotFound(_)) => None,
            Err(err) => {
                warn!(%id, %err, "created-object fetch failed; using inline change data");
                None
            }
        }
    }

    /// Returns one tracked artifact.
    pub async fn get(&self, id: &ObjectId) -> Option<ObjectArtifact> {
        self.rows.lock().await.get(id).cloned()
    }

    /// Returns all tracked artifacts in id order.
    pub async fn snapshot(&self) -> Vec<ObjectArtifact> {
        self.rows.lock().await.values().cloned().collect()
    }

    fn persist(&self, rows: &BTreeMap<ObjectId, ObjectArtifact>) -> Result<(), HarnessError> {
        let list: Vec<&ObjectArtifact> = rows.values().collect();
        let raw = serde_json::to_string_pretty(&list)
            .map_err(|err| HarnessError::Artifacts(err.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
