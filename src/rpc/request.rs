//! JSON-RPC request envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single JSON-RPC 2.0 request or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol marker, must be `"2.0"`.
    pub jsonrpc: String,
    /// Request ID; absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl RpcRequest {
    /// Create a request with the given id.
    pub fn new(id: impl Into<Value>, method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params: Value::Null,
        }
    }

    /// Create a notification (no id, no response expected).
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params: Value::Null,
        }
    }

    /// Set the parameters.
    pub fn params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// A decoded HTTP body: one message or a batch.
///
/// Batch members are kept as raw values so a malformed member only fails
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Single(Value),
    Batch(Vec<Value>),
}

impl Incoming {
    /// Parse a request body.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        match serde_json::from_slice(body)? {
            Value::Array(items) => Ok(Incoming::Batch(items)),
            other => Ok(Incoming::Single(other)),
        }
    }
}
