//! The live-network handle.
//!
//! `NetworkInstance::start` provisions one node and returns an explicit
//! handle; there is no ambient singleton. Callers wanting suite-wide
//! sharing hold the handle in a suite-level fixture; callers wanting a
//! fresh network per case call `start` per case. At most one live node per
//! instance.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{info, warn};

use localnet_rpc::{FaucetClient, LedgerRpcClient};
use localnet_types::ReadinessSnapshot;

use crate::account::SyntheticAccount;
use crate::adapters::{RpcFaucet, RpcLedger};
use crate::env::EnvOverrides;
use crate::error::HarnessError;
use crate::keystore;
use crate::netport::resolve_ports;
use crate::ports::{FaucetApi, LedgerReader, LedgerSubmitter, OperationSigner};
use crate::process::{NodeLaunchConfig, NodeProcess};

/// Configuration for starting one network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Path to the ledger node binary.
    pub node_binary: PathBuf,
    /// Logical network name; also names the artifact file.
    pub network_name: String,
    /// Start the node's built-in faucet.
    pub with_faucet: bool,
    /// Readiness wait budget in milliseconds.
    pub readiness_budget_ms: u64,
    /// Graceful-shutdown budget in milliseconds.
    pub shutdown_budget_ms: u64,
    /// Environment overrides (treasury index, dir retention).
    pub overrides: EnvOverrides,
}

impl NetworkConfig {
    /// Builds a config with default budgets and env-derived overrides.
    pub fn new(node_binary: impl Into<PathBuf>, network_name: impl Into<String>) -> Self {
        Self {
            node_binary: node_binary.into(),
            network_name: network_name.into(),
            with_faucet: false,
            readiness_budget_ms: 30_000,
            shutdown_budget_ms: 10_000,
            overrides: EnvOverrides::from_env(),
        }
    }

    /// Enables the faucet endpoint.
    pub fn with_faucet(mut self) -> Self {
        self.with_faucet = true;
        self
    }
}

/// One running node process plus everything a test needs to talk to it.
pub struct NetworkInstance {
    network_name: String,
    rpc_url: String,
    faucet_url: Option<String>,
    process: NodeProcess,
    readiness: ReadinessSnapshot,
    ledger: Arc<RpcLedger>,
    faucet: Option<Arc<dyn FaucetApi>>,
    treasury: Option<Arc<SyntheticAccount>>,
    overrides: EnvOverrides,
    // Owns the working directory for the process's lifetime. Once launch
    // succeeds the process manager owns removal through `stop()`; `keep()`
    // disarms TempDir's Drop at that point so it cannot double-delete.
    working_dir: PathBuf,
}

impl NetworkInstance {
    /// Provisions and starts a network: negotiate ports, run genesis,
    /// spawn the node, wait for readiness, discover the treasury.
    ///
    /// Fatal on spawn failure or readiness timeout; callers needing a
    /// fresh network re-invoke `start` after `stop`.
    pub async fn start(config: NetworkConfig) -> Result<Self, HarnessError> {
        let ports = resolve_ports(config.with_faucet)?;

        let temp = TempDir::with_prefix(format!("localnet-{}-", config.network_name))
            .map_err(HarnessError::Io)?;

        let rpc_url = format!("http://127.0.0.1:{}/rpc", ports.rpc_port);
        let faucet_url = ports.faucet_port.map(|port| format!("http://127.0.0.1:{port}"));

        let client = LedgerRpcClient::new(rpc_url.clone())
            .map_err(|err| HarnessError::provisioning(format!("rpc client init failed: {err}")))?;
        let ledger = Arc::new(RpcLedger::new(client));

        let mut launch = NodeLaunchConfig::new(
            config.node_binary.clone(),
            temp.path().to_path_buf(),
            ports,
        );
        launch.readiness_budget = std::time::Duration::from_millis(config.readiness_budget_ms);
        launch.shutdown_budget = std::time::Duration::from_millis(config.shutdown_budget_ms);
        launch.retain_dirs = config.overrides.retain_dirs;

        // TempDir's Drop cleans up when launch itself fails; after a
        // successful launch the process manager owns removal, so disarm it.
        let mut process = match NodeProcess::launch(launch).await {
            Ok(process) => process,
            Err(err) => {
                if config.overrides.retain_dirs {
                    let _ = temp.keep();
                }
                return Err(err);
            }
        };
        let working_dir = temp.keep();

        let readiness = match process.wait_ready(ledger.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // Never leave a half-started node behind a failed start().
                if let Err(stop_err) = process.stop().await {
                    warn!(%stop_err, "cleanup after failed start also failed");
                }
                return Err(err);
            }
        };

        let faucet: Option<Arc<dyn FaucetApi>> = match &faucet_url {
            Some(url) => {
                let client = FaucetClient::new(url.clone()).map_err(|err| {
                    HarnessError::provisioning(format!("faucet client init failed: {err}"))
                })?;
                Some(Arc::new(RpcFaucet::new(client)))
            }
            None => None,
        };

        let treasury =
            keystore::discover_treasury(&working_dir, ledger.as_ref(), &config.overrides)
                .await?
                .map(Arc::new);

        info!(
            network = %config.network_name,
            rpc = %rpc_url,
            faucet = faucet_url.as_deref().unwrap_or("-"),
            treasury = %treasury.as_ref().map(|t| t.address().to_string()).unwrap_or_else(|| "-".to_string()),
            "network instance ready"
        );

        Ok(Self {
            network_name: config.network_name,
            rpc_url,
            faucet_url,
            process,
            readiness,
            ledger,
            faucet,
            treasury,
            overrides: config.overrides,
            working_dir,
        })
    }

    /// The logical network name.
    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    /// The node's RPC endpoint URL.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// The faucet endpoint URL, when enabled.
    pub fn faucet_url(&self) -> Option<&str> {
        self.faucet_url.as_deref()
    }

    /// The readiness snapshot captured when the node turned healthy.
    pub fn readiness(&self) -> &ReadinessSnapshot {
        &self.readiness
    }

    /// The node's private working directory.
    pub fn working_dir(&self) -> &std::path::Path {
        &self.working_dir
    }

    /// Read port onto the live ledger.
    pub fn reader(&self) -> Arc<dyn LedgerReader> {
        self.ledger.clone()
    }

    /// Write port onto the live ledger.
    pub fn submitter(&self) -> Arc<dyn LedgerSubmitter> {
        self.ledger.clone()
    }

    /// The faucet port, when enabled.
    pub fn faucet(&self) -> Option<Arc<dyn FaucetApi>> {
        self.faucet.clone()
    }

    /// The discovered treasury account, when any keystore entry held funds.
    pub fn treasury(&self) -> Option<Arc<SyntheticAccount>> {
        self.treasury.clone()
    }

    /// The environment overrides this instance started under.
    pub fn overrides(&self) -> EnvOverrides {
        self.overrides
    }

    /// Stops the node and removes its working directory.
    ///
    /// Stopping while `TestContext`s still use this instance is a caller
    /// error; in-flight RPC calls will fail once the process dies — no
    /// draining is performed.
    pub async fn stop(self) -> Result<(), HarnessError> {
        info!(network = %self.network_name, "stopping network instance");
        self.process.stop().await
    }
}
