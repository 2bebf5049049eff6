//! Cross-component integration scenarios.
//!
//! Everything here runs against the in-memory doubles from
//! `crate::support`, except `lifecycle` (which spawns small shell scripts
//! as stand-in node binaries) and `e2e_localnet` (which needs a real node
//! binary via `LOCALNET_NODE_BIN`).

pub mod artifacts;
pub mod e2e_localnet;
pub mod finality;
pub mod funding;
pub mod retry;
