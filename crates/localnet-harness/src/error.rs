//! Harness error taxonomy.
//!
//! Four classes with distinct propagation rules: provisioning and funding
//! errors are fatal to their operation; transient stale/locked conflicts
//! are recovered inside the execution wrapper (at most once); everything
//! else crosses the component boundary unchanged so test assertions can
//! inspect the original failure reason.

use thiserror::Error;

use localnet_types::{Address, FundingShortfall, OperationDigest};

use crate::ports::LedgerError;

/// Errors surfaced by the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Port negotiation, genesis init, spawn, or readiness failure.
    /// Fatal to `start()`; carries the node log tail when available.
    #[error("provisioning failed: {reason}{}", format_log_tail(.log_tail))]
    Provisioning { reason: String, log_tail: Option<String> },

    /// An account could not be brought up to its funding requirement.
    #[error("funding failed for {address} via {endpoint}: {shortfall}")]
    Funding { address: Address, endpoint: String, shortfall: FundingShortfall },

    /// No treasury account and no faucet endpoint are available.
    #[error("no funding source for {address}: no treasury account found and no faucet configured")]
    NoFundingSource { address: Address },

    /// A terminal execution failure, propagated verbatim from the ledger.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The signer owns no spendable resource usable as a fee resource.
    #[error("no spendable fee resource for {address} (excluding {excluded} conflicted ids)")]
    NoFeeResource { address: Address, excluded: usize },

    /// An operation did not reach a terminal status within its budget.
    #[error("finality wait timed out for {digest} after {budget_ms} ms")]
    FinalityTimeout { digest: OperationDigest, budget_ms: u64 },

    /// Ledger boundary failure (transport, lookup).
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Artifact ledger persistence failure.
    #[error("artifact ledger error: {0}")]
    Artifacts(String),

    /// Filesystem failure in harness-owned directories.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_log_tail(tail: &Option<String>) -> String {
    match tail {
        Some(text) => format!("\n--- node log tail ---\n{text}"),
        None => String::new(),
    }
}

impl HarnessError {
    /// Shorthand for a provisioning error without a log tail.
    pub fn provisioning(reason: impl Into<String>) -> Self {
        Self::Provisioning { reason: reason.into(), log_tail: None }
    }
}
