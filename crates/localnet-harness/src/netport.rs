//! Free-port negotiation for the node's listening endpoints.
//!
//! Each role first tries its canonical default so a developer's muscle-memory
//! URLs keep working; an occupied default falls back to an OS-assigned
//! ephemeral port (bind port 0, read the assignment, release the listener).
//! Returned ports are pairwise distinct.

use std::collections::HashSet;
use std::net::TcpListener;

use tracing::debug;

use crate::error::HarnessError;

/// Canonical RPC port.
pub const DEFAULT_RPC_PORT: u16 = 9000;
/// Canonical event-stream port.
pub const DEFAULT_EVENT_PORT: u16 = 9184;
/// Canonical faucet port.
pub const DEFAULT_FAUCET_PORT: u16 = 9123;

/// The negotiated ports for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPlan {
    /// JSON-RPC endpoint port.
    pub rpc_port: u16,
    /// Event-stream endpoint port.
    pub event_port: u16,
    /// Faucet endpoint port, when a faucet was requested.
    pub faucet_port: Option<u16>,
}

impl PortPlan {
    /// Whether every role landed on its canonical default.
    pub fn is_all_default(&self) -> bool {
        self.rpc_port == DEFAULT_RPC_PORT
            && self.event_port == DEFAULT_EVENT_PORT
            && self.faucet_port.is_none_or(|p| p == DEFAULT_FAUCET_PORT)
    }
}

/// Negotiates ports for the RPC, event-stream, and (optionally) faucet
/// endpoints.
///
/// A bind failure during the *actual* node startup is a fatal configuration
/// error handled by the process manager, not retried here; this function
/// only probes availability at negotiation time.
pub fn resolve_ports(need_faucet: bool) -> Result<PortPlan, HarnessError> {
    let mut taken = HashSet::new();
    let rpc_port = pick_port(DEFAULT_RPC_PORT, &mut taken)?;
    let event_port = pick_port(DEFAULT_EVENT_PORT, &mut taken)?;
    let faucet_port =
        if need_faucet { Some(pick_port(DEFAULT_FAUCET_PORT, &mut taken)?) } else { None };

    let plan = PortPlan { rpc_port, event_port, faucet_port };
    debug!(?plan, "negotiated ports");
    Ok(plan)
}

/// Picks one port: the preferred default if free, else an ephemeral port.
/// Re-draws if the OS hands back a port already chosen for another role.
fn pick_port(preferred: u16, taken: &mut HashSet<u16>) -> Result<u16, HarnessError> {
    if !taken.contains(&preferred) && port_is_free(preferred) {
        taken.insert(preferred);
        return Ok(preferred);
    }

    // Bounded number of draws; in practice the first succeeds.
    for _ in 0..16 {
        let port = ephemeral_port()?;
        if taken.insert(port) {
            return Ok(port);
        }
    }
    Err(HarnessError::provisioning("could not negotiate a distinct free port after 16 draws"))
}

fn port_is_free(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Asks the OS for a free port and releases the probe listener.
fn ephemeral_port() -> Result<u16, HarnessError> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| HarnessError::provisioning(format!("failed to bind loopback: {err}")))?;
    let port = listener
        .local_addr()
        .map_err(|err| {
            HarnessError::provisioning(format!("failed to read listener address: {err}"))
        })?
        .port();
    drop(listener);
    Ok(port)
}
