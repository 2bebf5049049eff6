//! Per-test-case sandbox.
//!
//! A `TestContext` owns a private temp directory (package-source copy plus
//! artifacts), and bundles the helper actions test bodies use: create
//! account, fund, build/publish package, execute operation, wait for
//! finality, query events. The temp directory is released on every exit
//! path: RAII through `TempDir`, with an explicit `close()` for callers
//! that want removal errors surfaced.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use localnet_types::{
    Address, EventRecord, ExecutionEffects, FundingRequirement, Operation, OperationDigest,
};

use crate::account::SyntheticAccount;
use crate::artifacts::ArtifactLedger;
use crate::error::HarnessError;
use crate::exec::{ExecutionResult, Executor};
use crate::funding::FundingService;
use crate::instance::NetworkInstance;
use crate::ports::{
    BuiltPackage, FaucetApi, LedgerError, LedgerReader, LedgerSubmitter, OperationSigner,
    PackagePublisher, PublishArtifact,
};

/// Finality poll interval.
const FINALITY_INTERVAL: Duration = Duration::from_millis(250);

/// Wires a `TestContext` from explicit ports. Tests substitute in-memory
/// fakes here; production callers go through [`TestContext::new`].
pub struct TestContextBuilder {
    test_id: String,
    network_name: String,
    reader: Arc<dyn LedgerReader>,
    submitter: Arc<dyn LedgerSubmitter>,
    faucet: Option<Arc<dyn FaucetApi>>,
    treasury: Option<Arc<SyntheticAccount>>,
    package_sources: Option<PathBuf>,
}

impl TestContextBuilder {
    /// Starts a builder over the given ledger ports.
    pub fn new(
        test_id: impl Into<String>,
        network_name: impl Into<String>,
        reader: Arc<dyn LedgerReader>,
        submitter: Arc<dyn LedgerSubmitter>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            network_name: network_name.into(),
            reader,
            submitter,
            faucet: None,
            treasury: None,
            package_sources: None,
        }
    }

    /// Adds a faucet funding source.
    pub fn faucet(mut self, faucet: Arc<dyn FaucetApi>) -> Self {
        self.faucet = Some(faucet);
        self
    }

    /// Adds a treasury funding source.
    pub fn treasury(mut self, treasury: Arc<SyntheticAccount>) -> Self {
        self.treasury = Some(treasury);
        self
    }

    /// Copies deployable package sources into the sandbox at build time.
    pub fn package_sources(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_sources = Some(dir.into());
        self
    }

    /// Builds the sandbox.
    pub fn build(self) -> Result<TestContext, HarnessError> {
        let temp = TempDir::with_prefix(format!("localnet-ctx-{}-", self.test_id))?;
        let sources_dir = temp.path().join("sources");
        let artifacts_dir = temp.path().join("artifacts");
        std::fs::create_dir_all(&sources_dir)?;
        std::fs::create_dir_all(&artifacts_dir)?;

        if let Some(source) = &self.package_sources {
            copy_tree(source, &sources_dir)?;
        }

        let artifacts = Arc::new(ArtifactLedger::open(&artifacts_dir, &self.network_name)?);
        let executor = Arc::new(Executor::new(
            self.reader.clone(),
            self.submitter.clone(),
            artifacts.clone(),
        ));
        let funding = FundingService::new(
            self.reader.clone(),
            executor.clone(),
            self.treasury,
            self.faucet,
        );

        debug!(test_id = %self.test_id, dir = %temp.path().display(), "test context created");
        Ok(TestContext {
            test_id: self.test_id,
            temp,
            sources_dir,
            reader: self.reader,
            executor,
            funding,
            artifacts,
        })
    }
}

/// The per-test sandbox and its helper actions.
pub struct TestContext {
    test_id: String,
    temp: TempDir,
    sources_dir: PathBuf,
    reader: Arc<dyn LedgerReader>,
    executor: Arc<Executor>,
    funding: FundingService,
    artifacts: Arc<ArtifactLedger>,
}

impl TestContext {
    /// Builds a sandbox against a live [`NetworkInstance`].
    pub fn new(
        instance: &NetworkInstance,
        test_id: impl Into<String>,
        package_sources: Option<&Path>,
    ) -> Result<Self, HarnessError> {
        let mut builder = TestContextBuilder::new(
            test_id,
            instance.network_name(),
            instance.reader(),
            instance.submitter(),
        );
        if let Some(faucet) = instance.faucet() {
            builder = builder.faucet(faucet);
        }
        if let Some(treasury) = instance.treasury() {
            builder = builder.treasury(treasury);
        }
        if let Some(sources) = package_sources {
            builder = builder.package_sources(sources);
        }
        builder.build()
    }

    /// The test id accounts derive under.
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// The sandbox's private source copy.
    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    /// The artifact ledger tracking this context's resources.
    pub fn artifacts(&self) -> &ArtifactLedger {
        &self.artifacts
    }

    /// Derives the synthetic account for `label` under this test id.
    ///
    /// Deterministic: the same `(test_id, label)` always yields the same
    /// address. Concurrent tests must use distinct labels.
    pub fn create_account(&self, label: &str) -> SyntheticAccount {
        let account = SyntheticAccount::derive(&self.test_id, label);
        debug!(label, address = %account.address(), "derived synthetic account");
        account
    }

    /// Funds `account` up to `requirement` (no-op when already satisfied).
    pub async fn fund(
        &self,
        account: Address,
        requirement: FundingRequirement,
    ) -> Result<(), HarnessError> {
        self.funding.fund(account, requirement).await
    }

    /// Executes a state-mutating operation with conflict retry.
    pub async fn execute(
        &self,
        operation: Operation,
        signer: &dyn OperationSigner,
    ) -> Result<ExecutionResult, HarnessError> {
        self.executor.execute(operation, signer).await
    }

    /// Builds the package at `relative_path` under the sandbox source copy.
    pub async fn build_package(
        &self,
        publisher: &dyn PackagePublisher,
        relative_path: &str,
    ) -> Result<BuiltPackage, HarnessError> {
        let path = self.sources_dir.join(relative_path);
        Ok(publisher.build(&path).await?)
    }

    /// Publishes the package at `relative_path`, signed by `signer`.
    pub async fn publish_package(
        &self,
        publisher: &dyn PackagePublisher,
        relative_path: &str,
        signer: &dyn OperationSigner,
    ) -> Result<PublishArtifact, HarnessError> {
        let path = self.sources_dir.join(relative_path);
        let artifact = publisher.publish(&path, signer).await?;
        info!(package = %artifact.package_id, "package published");
        Ok(artifact)
    }

    /// Polls until `digest` reaches a terminal status or `budget_ms`
    /// elapses.
    pub async fn wait_for_finality(
        &self,
        digest: &OperationDigest,
        budget_ms: u64,
    ) -> Result<ExecutionEffects, HarnessError> {
        let deadline = Instant::now() + Duration::from_millis(budget_ms);
        loop {
            match self.reader.operation(digest).await {
                Ok(Some(effects)) => return Ok(effects),
                // Not yet checkpointed; keep polling. Some node builds
                // answer this query with a not-found error instead of null.
                Ok(None) | Err(LedgerError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::FinalityTimeout { digest: digest.clone(), budget_ms });
            }
            sleep(FINALITY_INTERVAL).await;
        }
    }

    /// Events emitted by one operation.
    pub async fn events_by_digest(
        &self,
        digest: &OperationDigest,
    ) -> Result<Vec<EventRecord>, HarnessError> {
        Ok(self.reader.events_by_digest(digest).await?)
    }

    /// Events by fully qualified event type.
    pub async fn events_by_type(&self, event_type: &str) -> Result<Vec<EventRecord>, HarnessError> {
        Ok(self.reader.events_by_type(event_type).await?)
    }

    /// Removes the sandbox, surfacing removal errors.
    ///
    /// Dropping the context removes the directory too; `close()` is for
    /// callers that want the error.
    pub fn close(self) -> Result<(), HarnessError> {
        let path = self.temp.path().to_path_buf();
        self.temp.close()?;
        debug!(dir = %path.display(), "test context closed");
        Ok(())
    }
}

/// Recursively copies a directory tree.
fn copy_tree(from: &Path, to: &Path) -> Result<(), HarnessError> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
