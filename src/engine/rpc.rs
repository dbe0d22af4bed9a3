//! JSON-RPC 2.0 envelopes for the engine link.

use serde::{Deserialize, Serialize};

use crate::codec::{null_as_default, OpaqueValue};

/// JSON-RPC 2.0 request envelope, one per line.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 reply envelope.
///
/// `id` is kept as a raw value since engines may echo it as a number or a
/// string.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn answers(&self, id: u64) -> bool {
        match &self.id {
            Some(serde_json::Value::Number(n)) => n.as_u64() == Some(id),
            Some(serde_json::Value::String(s)) => s.parse::<u64>().ok() == Some(id),
            _ => false,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Result of `eval`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvalResult {
    #[serde(deserialize_with = "null_as_default")]
    pub stdout: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stderr: String,
}

/// Result of `feval`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FevalResult {
    pub result: OpaqueValue,
    #[serde(deserialize_with = "null_as_default")]
    pub stdout: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stderr: String,
}
