//! # Localnet RPC Crate
//!
//! Clients for the two HTTP surfaces the harness consumes:
//!
//! - [`LedgerRpcClient`] — JSON-RPC reads (latest sequence, readiness
//!   snapshot, resource listing and lookup, operation and event queries)
//!   and the single write (submit signed operation requesting effects,
//!   events, and resource changes).
//! - [`FaucetClient`] — the optional "credit this address" endpoint, with
//!   no response-body guarantee beyond success/failure.
//!
//! The node's consensus, signing internals, and wire protocol are out of
//! scope; this crate only speaks the node's public JSON-RPC.

pub mod client;
pub mod error;
pub mod faucet;
pub mod types;

pub use client::LedgerRpcClient;
pub use error::RpcError;
pub use faucet::FaucetClient;
