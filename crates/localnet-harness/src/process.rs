//! Node child-process lifecycle.
//!
//! Drives one ledger node through its states:
//!
//! ```text
//! NotStarted → Starting → Ready → Stopping → Stopped
//!                  │
//!                  └──→ Failed   (spawn error or readiness timeout)
//! ```
//!
//! Startup runs the node's one-shot genesis command into a private working
//! directory, rewrites generated config ports when non-defaults were
//! negotiated, spawns the long-running process with stdio piped to a log
//! file, and polls an RPC health probe until ready. Shutdown escalates from
//! SIGTERM through a bounded wait to SIGKILL, then removes the working
//! directory unless retention was requested.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use localnet_types::ReadinessSnapshot;

use crate::error::HarnessError;
use crate::netport::{PortPlan, DEFAULT_EVENT_PORT, DEFAULT_FAUCET_PORT, DEFAULT_RPC_PORT};
use crate::ports::LedgerReader;

/// Health-probe interval.
pub const READINESS_INTERVAL: Duration = Duration::from_millis(250);

/// Default overall readiness budget.
pub const DEFAULT_READINESS_BUDGET: Duration = Duration::from_secs(30);

/// Default graceful-shutdown budget before SIGKILL.
pub const DEFAULT_SHUTDOWN_BUDGET: Duration = Duration::from_secs(10);

/// Lines of node log attached to provisioning errors.
const LOG_TAIL_LINES: usize = 20;

/// Lifecycle states of one node process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Nothing spawned yet.
    NotStarted,
    /// Genesis ran; the process is up but not yet answering RPC.
    Starting,
    /// The health probe succeeded.
    Ready,
    /// Graceful termination in progress.
    Stopping,
    /// The process has exited and cleanup ran.
    Stopped,
    /// Spawn or readiness failed; the process is not usable.
    Failed,
}

/// Everything needed to launch one node.
#[derive(Debug, Clone)]
pub struct NodeLaunchConfig {
    /// Path to the ledger node binary.
    pub node_binary: PathBuf,
    /// Private working directory (config, genesis state, keystore).
    pub working_dir: PathBuf,
    /// Directory receiving the node's log file.
    pub log_dir: PathBuf,
    /// Negotiated ports.
    pub ports: PortPlan,
    /// Start the node's built-in faucet.
    pub with_faucet: bool,
    /// Overall readiness wait budget.
    pub readiness_budget: Duration,
    /// Graceful-shutdown budget before escalation.
    pub shutdown_budget: Duration,
    /// Keep the working directory after stop (debugging).
    pub retain_dirs: bool,
}

impl NodeLaunchConfig {
    /// Builds a config with default budgets.
    pub fn new(node_binary: PathBuf, working_dir: PathBuf, ports: PortPlan) -> Self {
        let log_dir = working_dir.join("logs");
        Self {
            node_binary,
            working_dir,
            log_dir,
            ports,
            with_faucet: ports.faucet_port.is_some(),
            readiness_budget: DEFAULT_READINESS_BUDGET,
            shutdown_budget: DEFAULT_SHUTDOWN_BUDGET,
            retain_dirs: false,
        }
    }
}

/// A spawned node process and its private directories.
#[derive(Debug)]
pub struct NodeProcess {
    config: NodeLaunchConfig,
    child: Child,
    pid: u32,
    state: ProcessState,
    log_path: PathBuf,
}

impl NodeProcess {
    /// Runs genesis initialization and spawns the node.
    ///
    /// On return the process is alive but likely not yet serving RPC; call
    /// [`NodeProcess::wait_ready`] before handing out clients.
    pub async fn launch(config: NodeLaunchConfig) -> Result<Self, HarnessError> {
        std::fs::create_dir_all(&config.working_dir)?;
        std::fs::create_dir_all(&config.log_dir)?;

        run_genesis_init(&config).await?;
        rewrite_config_ports(&config.working_dir, config.ports)?;

        let log_path = config.log_dir.join("node.log");
        let log_file = std::fs::File::create(&log_path)?;
        let stderr_file = log_file.try_clone()?;

        let mut command = Command::new(&config.node_binary);
        command
            .arg("start")
            .arg("--working-dir")
            .arg(&config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(stderr_file))
            .kill_on_drop(true);
        if config.with_faucet {
            command.arg("--with-faucet");
        }

        let child = command.spawn().map_err(|err| HarnessError::Provisioning {
            reason: format!("failed to spawn {}: {err}", config.node_binary.display()),
            log_tail: read_log_tail(&log_path),
        })?;
        let pid = child.id().unwrap_or(0);
        register_reaper_pid(pid);

        info!(pid, working_dir = %config.working_dir.display(), "node process spawned");
        Ok(Self { config, child, pid, state: ProcessState::Starting, log_path })
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// OS pid of the node process.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Path of the node's log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Polls the RPC health probe until the node answers or the budget
    /// elapses, then captures the readiness snapshot.
    pub async fn wait_ready(
        &mut self,
        reader: &dyn LedgerReader,
    ) -> Result<ReadinessSnapshot, HarnessError> {
        let deadline = Instant::now() + self.config.readiness_budget;

        loop {
            match reader.latest_sequence().await {
                Ok(sequence) => {
                    let snapshot = match reader.readiness_snapshot().await {
                        Ok(snapshot) => snapshot,
                        // The probe answered; a missing snapshot endpoint
                        // still counts as ready.
                        Err(err) => {
                            warn!(%err, "readiness snapshot unavailable; synthesizing from probe");
                            ReadinessSnapshot {
                                epoch: 0,
                                latest_sequence: sequence,
                                validator_count: 0,
                                reference_fee_price: 0,
                            }
                        }
                    };
                    self.state = ProcessState::Ready;
                    info!(
                        sequence = snapshot.latest_sequence,
                        validators = snapshot.validator_count,
                        epoch = snapshot.epoch,
                        "node ready"
                    );
                    return Ok(snapshot);
                }
                Err(err) => {
                    if Instant::now() >= deadline {
                        self.state = ProcessState::Failed;
                        return Err(HarnessError::Provisioning {
                            reason: format!(
                                "node not ready after {:?}: {err}",
                                self.config.readiness_budget
                            ),
                            log_tail: read_log_tail(&self.log_path),
                        });
                    }
                    sleep(READINESS_INTERVAL).await;
                }
            }
        }
    }

    /// Stops the node: SIGTERM, bounded wait, SIGKILL if it will not go,
    /// then working-directory removal (unless retained).
    ///
    /// Directory-removal failures are logged and swallowed; teardown never
    /// fails on them.
    pub async fn stop(mut self) -> Result<(), HarnessError> {
        self.state = ProcessState::Stopping;
        info!(pid = self.pid, "stopping node process");

        send_sigterm(self.pid).await;
        match timeout(self.config.shutdown_budget, self.child.wait()).await {
            Ok(Ok(status)) => debug!(pid = self.pid, %status, "node exited gracefully"),
            Ok(Err(err)) => warn!(pid = self.pid, %err, "wait on node process failed"),
            Err(_) => {
                warn!(pid = self.pid, budget = ?self.config.shutdown_budget, "graceful shutdown budget elapsed; sending SIGKILL");
                if let Err(err) = self.child.kill().await {
                    error!(pid = self.pid, %err, "SIGKILL failed");
                }
                let _ = self.child.wait().await;
            }
        }
        unregister_reaper_pid(self.pid);
        self.state = ProcessState::Stopped;

        if self.config.retain_dirs {
            info!(dir = %self.config.working_dir.display(), "retaining working directory");
        } else if let Err(err) = std::fs::remove_dir_all(&self.config.working_dir) {
            warn!(dir = %self.config.working_dir.display(), %err, "working directory removal failed");
        }
        Ok(())
    }
}

/// Runs the node's one-shot deterministic-genesis command.
async fn run_genesis_init(config: &NodeLaunchConfig) -> Result<(), HarnessError> {
    let output = Command::new(&config.node_binary)
        .arg("genesis")
        .arg("--working-dir")
        .arg(&config.working_dir)
        .output()
        .await
        .map_err(|err| {
            HarnessError::provisioning(format!(
                "failed to run genesis init {}: {err}",
                config.node_binary.display()
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HarnessError::Provisioning {
            reason: format!("genesis init exited with {}", output.status),
            log_tail: Some(tail_of(&stderr, LOG_TAIL_LINES)),
        });
    }
    debug!(working_dir = %config.working_dir.display(), "genesis initialized");
    Ok(())
}

/// Rewrites host:port occurrences in generated config files to the
/// negotiated ports. A no-op when every role landed on its default.
fn rewrite_config_ports(working_dir: &Path, ports: PortPlan) -> Result<(), HarnessError> {
    if ports.is_all_default() {
        return Ok(());
    }

    let mut replacements = vec![
        (DEFAULT_RPC_PORT, ports.rpc_port),
        (DEFAULT_EVENT_PORT, ports.event_port),
    ];
    if let Some(faucet_port) = ports.faucet_port {
        replacements.push((DEFAULT_FAUCET_PORT, faucet_port));
    }

    for path in config_files(working_dir)? {
        let original = std::fs::read_to_string(&path)?;
        let mut rewritten = original.clone();
        for (default, negotiated) in &replacements {
            if default == negotiated {
                continue;
            }
            for host in ["127.0.0.1", "0.0.0.0", "localhost"] {
                rewritten = rewritten
                    .replace(&format!("{host}:{default}"), &format!("{host}:{negotiated}"));
            }
        }
        if rewritten != original {
            std::fs::write(&path, rewritten)?;
            debug!(path = %path.display(), "rewrote config ports");
        }
    }
    Ok(())
}

/// Collects config files (toml/yaml/json) directly under the working dir
/// and one level down, where genesis writes them.
fn config_files(working_dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut files = Vec::new();
    collect_config_files(working_dir, 0, &mut files)?;
    Ok(files)
}

fn collect_config_files(
    dir: &Path,
    depth: usize,
    files: &mut Vec<PathBuf>,
) -> Result<(), HarnessError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if depth < 1 {
                collect_config_files(&path, depth + 1, files)?;
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "yaml" || ext == "yml" || ext == "json")
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Sends SIGTERM to a pid. The pack's process model has no signal-sending
/// library, so this execs the platform `kill`.
async fn send_sigterm(pid: u32) {
    #[cfg(unix)]
    {
        match Command::new("kill").arg("-TERM").arg(pid.to_string()).output().await {
            Ok(output) if output.status.success() => debug!(pid, "sent SIGTERM"),
            Ok(output) => warn!(pid, status = %output.status, "kill -TERM failed"),
            Err(err) => warn!(pid, %err, "could not exec kill"),
        }
    }
    #[cfg(not(unix))]
    {
        // No graceful signal on this platform; stop() escalates to kill().
        let _ = pid;
    }
}

/// Reads the last lines of the node log for error diagnostics.
fn read_log_tail(log_path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(log_path).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    Some(tail_of(&raw, LOG_TAIL_LINES))
}

fn tail_of(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

// =============================================================================
// Best-effort orphan cleanup
// =============================================================================
//
// A direct SIGKILL of this process skips `stop()`, leaving node processes
// bound to negotiated ports. The reaper task watches for ctrl-c and kills
// every still-registered pid. Inherently racy and OS-dependent; the real
// guarantee is stop()'s graceful-then-forced sequence.

static REAPER_PIDS: OnceLock<Mutex<Vec<u32>>> = OnceLock::new();

fn reaper_pids() -> &'static Mutex<Vec<u32>> {
    REAPER_PIDS.get_or_init(|| {
        tokio::spawn(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                let pids: Vec<u32> = reaper_pids()
                    .lock()
                    .map(|guard| guard.clone())
                    .unwrap_or_default();
                for pid in pids {
                    warn!(pid, "ctrl-c: force-killing orphaned node process");
                    #[cfg(unix)]
                    let _ = std::process::Command::new("kill")
                        .arg("-KILL")
                        .arg(pid.to_string())
                        .output();
                }
            }
        });
        Mutex::new(Vec::new())
    })
}

fn register_reaper_pid(pid: u32) {
    if pid == 0 {
        return;
    }
    if let Ok(mut guard) = reaper_pids().lock() {
        guard.push(pid);
    }
}

fn unregister_reaper_pid(pid: u32) {
    if let Ok(mut guard) = reaper_pids().lock() {
        guard.retain(|p| *p != pid);
    }
}
