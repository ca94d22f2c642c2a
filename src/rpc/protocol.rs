//! MCP method routing over the tool registry.

use crate::rpc::request::{Incoming, RpcRequest};
use crate::rpc::response::{RpcError, RpcResponse, ToolCallResult};
use crate::tool::{CallContext, DispatchError, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Newest protocol revision this server speaks.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-03-26";

/// Protocol revisions accepted during `initialize`.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &[LATEST_PROTOCOL_VERSION, "2024-11-05"];

/// Name and version reported in `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// What to send back for one HTTP body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Single(RpcResponse),
    Batch(Vec<RpcResponse>),
    /// Only notifications were received; nothing to send.
    Accepted,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    #[serde(default)]
    protocol_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Stateless MCP endpoint: every message is answered from the registry alone.
#[derive(Debug, Clone)]
pub struct McpProtocol {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl McpProtocol {
    /// Serve `registry`, reporting this crate's name and version.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            info: ServerInfo::default(),
        }
    }

    /// The registry tools are dispatched to.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle a parsed HTTP body.
    pub async fn handle_incoming(&self, incoming: Incoming, request_id: &str) -> Reply {
        match incoming {
            Incoming::Single(message) => match self.handle_message(message, request_id).await {
                Some(response) => Reply::Single(response),
                None => Reply::Accepted,
            },
            Incoming::Batch(messages) if messages.is_empty() => Reply::Single(
                RpcResponse::failure(Value::Null, RpcError::invalid_request("empty batch")),
            ),
            Incoming::Batch(messages) => {
                let mut responses = Vec::with_capacity(messages.len());
                for message in messages {
                    if let Some(response) = self.handle_message(message, request_id).await {
                        responses.push(response);
                    }
                }
                if responses.is_empty() {
                    Reply::Accepted
                } else {
                    Reply::Batch(responses)
                }
            }
        }
    }

    /// Decode one raw message and handle it.
    pub async fn handle_message(&self, message: Value, request_id: &str) -> Option<RpcResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);

        // serde reads `"id": null` as a missing id, which would turn the
        // request into a notification.
        if message.get("id").is_some_and(Value::is_null) {
            return Some(RpcResponse::failure(
                Value::Null,
                RpcError::invalid_request("id must not be null"),
            ));
        }

        let request: RpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::failure(
                    id,
                    RpcError::invalid_request(format!("invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(RpcResponse::failure(
                id,
                RpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        self.handle_request(request, request_id).await
    }

    /// Handle a decoded request. Notifications never produce a response.
    pub async fn handle_request(&self, request: RpcRequest, request_id: &str) -> Option<RpcResponse> {
        debug!(method = %request.method, request_id, "Handling RPC message");

        if request.id.as_ref().is_some_and(Value::is_null) {
            return Some(RpcResponse::failure(
                Value::Null,
                RpcError::invalid_request("id must not be null"),
            ));
        }

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params, request_id).await,
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(RpcError::method_not_found(format!(
                "method not found: {}",
                method
            ))),
        };

        let id = request.id?;
        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Value) -> Value {
        let params: InitializeParams = serde_json::from_value(params).unwrap_or_default();
        let protocol_version = params
            .protocol_version
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.as_str()))
            .unwrap_or_else(|| LATEST_PROTOCOL_VERSION.to_string());

        info!(protocol_version = %protocol_version, "Client initialized");

        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": self.info,
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self.registry.list().iter().map(|d| d.to_json()).collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Value, request_id: &str) -> Result<Value, RpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("invalid tools/call params: {}", e)))?;

        let ctx = CallContext::new(&params.name, request_id);
        let result = match self
            .registry
            .dispatch(&params.name, params.arguments, &ctx)
            .await
        {
            Ok(value) => ToolCallResult::structured(value),
            Err(DispatchError::Tool { source, .. }) => ToolCallResult::error(source.to_string()),
            Err(err) => return Err(dispatch_rpc_error(&err)),
        };

        serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
    }
}

/// JSON-RPC error for a dispatch failure that is not reported in-band.
fn dispatch_rpc_error(err: &DispatchError) -> RpcError {
    match err {
        DispatchError::NotFound(_) => RpcError::method_not_found(err.to_string()),
        DispatchError::InvalidArguments { tool, source } => RpcError::invalid_params(
            err.to_string(),
        )
        .with_data(json!({
            "tool": tool,
            "field": source.field(),
            "reason": source.to_string(),
        })),
        DispatchError::Tool { .. } => RpcError::internal(err.to_string()),
    }
}
