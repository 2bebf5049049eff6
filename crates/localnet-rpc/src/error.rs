//! RPC error types.

use thiserror::Error;

/// Errors that can occur when talking to the ledger node or faucet.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The node returned a JSON-RPC error object.
    #[error("JSON-RPC error: {0}")]
    Rpc(String),

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The endpoint refused the connection (node not up yet, or gone).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The faucet rejected the credit request.
    #[error("Faucet request rejected with status {status}: {body}")]
    FaucetRejected { status: u16, body: String },
}
