//! # Adapters
//!
//! Port implementations backed by the real node over `localnet-rpc`.

pub mod rpc;

pub use rpc::{RpcFaucet, RpcLedger};
