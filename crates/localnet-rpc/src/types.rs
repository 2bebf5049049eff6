//! JSON-RPC envelope and wire types for the ledger node's public surface.

use serde::{Deserialize, Serialize};

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    /// Builds a jsonrpc-2.0 request.
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self { jsonrpc: "2.0", method: method.into(), params, id }
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    pub jsonrpc: String,
    #[allow(dead_code)]
    pub id: u64,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Options attached to an operation submission: which response sections the
/// node should include.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOptions {
    pub show_effects: bool,
    pub show_events: bool,
    pub show_resource_changes: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        // The harness always wants the full picture; artifact tracking
        // depends on resource changes being present.
        Self { show_effects: true, show_events: true, show_resource_changes: true }
    }
}
