//! Conflict-aware execution of state-mutating operations.
//!
//! Concurrent test cases race on fee-resource versions: two operations pick
//! the same record, one wins, the other is rejected with a stale or locked
//! conflict. That single transient class is recovered here — re-select the
//! fee resource excluding every id the failure named, retry once — and
//! every other failure propagates unchanged so test assertions can inspect
//! the original reason.

use std::sync::Arc;

use tracing::{debug, info, warn};

use localnet_types::{resources, ExecutionStatus, ObjectId, Operation, OperationDigest};

use crate::artifacts::{AffectedArtifacts, ArtifactLedger};
use crate::conflict::{ConflictClassifier, ConflictKind};
use crate::error::HarnessError;
use crate::ports::{LedgerError, LedgerReader, LedgerSubmitter, OperationSigner};

/// Default attempt bound: one submission plus one conflict retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// The outcome of one executed operation.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Digest of the accepted submission.
    pub digest: OperationDigest,
    /// Terminal status reported by the ledger.
    pub status: ExecutionStatus,
    /// Artifacts recorded from the operation's resource changes.
    pub artifacts: AffectedArtifacts,
}

/// Signs, submits, and retries operations against the ledger.
pub struct Executor {
    reader: Arc<dyn LedgerReader>,
    submitter: Arc<dyn LedgerSubmitter>,
    artifacts: Arc<ArtifactLedger>,
    classifier: ConflictClassifier,
}

impl Executor {
    /// Builds an executor over the ledger ports and the artifact ledger.
    pub fn new(
        reader: Arc<dyn LedgerReader>,
        submitter: Arc<dyn LedgerSubmitter>,
        artifacts: Arc<ArtifactLedger>,
    ) -> Self {
        Self { reader, submitter, artifacts, classifier: ConflictClassifier::default() }
    }

    /// Replaces the conflict classifier (node upgrades change phrasing).
    pub fn with_classifier(mut self, classifier: ConflictClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Executes with the default attempt bound (one retry).
    pub async fn execute(
        &self,
        operation: Operation,
        signer: &dyn OperationSigner,
    ) -> Result<ExecutionResult, HarnessError> {
        self.execute_with_retry(operation, signer, DEFAULT_MAX_ATTEMPTS).await
    }

    /// Executes `operation` signed by `signer`, retrying on stale/locked
    /// conflicts up to `max_attempts` total submissions.
    ///
    /// Regardless of `max_attempts`, only conflict-classified failures are
    /// retried; `Other` failures propagate from whatever attempt hit them.
    pub async fn execute_with_retry(
        &self,
        mut operation: Operation,
        signer: &dyn OperationSigner,
        max_attempts: u32,
    ) -> Result<ExecutionResult, HarnessError> {
        let mut excluded: Vec<ObjectId> = Vec::new();
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if operation.fee_resource.is_none() {
                operation.fee_resource =
                    Some(self.select_fee_resource(signer, &excluded).await?);
            }

            let signed = signer.sign_operation(&operation);
            match self.submitter.submit(&signed).await {
                Ok(effects) => {
                    if !effects.status.is_success() {
                        // Executed but aborted: terminal, nothing recorded.
                        return Ok(ExecutionResult {
                            digest: effects.digest,
                            status: effects.status,
                            artifacts: AffectedArtifacts::default(),
                        });
                    }
                    let artifacts = self
                        .artifacts
                        .record_changes(self.reader.as_ref(), &effects.changes)
                        .await?;
                    if attempt > 1 {
                        info!(digest = %effects.digest, attempt, "succeeded after conflict retry");
                    }
                    return Ok(ExecutionResult {
                        digest: effects.digest,
                        status: effects.status,
                        artifacts,
                    });
                }
                Err(LedgerError::Rejected(message)) => {
                    let kind = self.classifier.classify(&message);
                    let retryable = match &kind {
                        ConflictKind::StaleResource(id) => {
                            excluded.push(id.clone());
                            true
                        }
                        ConflictKind::LockedResources(ids) => {
                            excluded.extend(ids.iter().cloned());
                            true
                        }
                        ConflictKind::Other => false,
                    };

                    if !retryable || attempt == max_attempts {
                        return Err(HarnessError::Execution(message));
                    }

                    // The conflicted fee resource must not be re-picked.
                    if let Some(fee) = operation.fee_resource.take() {
                        if !excluded.contains(&fee) {
                            excluded.push(fee);
                        }
                    }
                    warn!(attempt, ?kind, "transient conflict; re-selecting fee resource");
                }
                Err(other) => return Err(HarnessError::Ledger(other)),
            }
        }

        // Loop always returns; the bound above makes this unreachable.
        Err(HarnessError::Execution("attempt budget exhausted".to_string()))
    }

    /// Picks the freshest spendable resource owned by the signer, skipping
    /// every excluded id.
    async fn select_fee_resource(
        &self,
        signer: &dyn OperationSigner,
        excluded: &[ObjectId],
    ) -> Result<ObjectId, HarnessError> {
        let owner = signer.address();
        let records = self.reader.owned_resources(owner).await?;
        let chosen = resources::freshest_spendable(&records, excluded).ok_or(
            HarnessError::NoFeeResource { address: owner, excluded: excluded.len() },
        )?;
        debug!(owner = %owner, fee = %chosen.id, version = chosen.version, "selected fee resource");
        Ok(chosen.id.clone())
    }
}
