//! Tool handler trait, call context and error types.

use crate::schema::SchemaError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use thiserror::Error;

/// Per-call context handed to every handler.
///
/// Carries identifiers for logging only; the built-in tools ignore it.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Name of the tool being called.
    pub tool_name: String,
    /// Request ID for tracing.
    pub request_id: String,
}

impl CallContext {
    /// Create a new call context.
    pub fn new(tool_name: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            request_id: request_id.into(),
        }
    }
}

/// Type-erased tool implementation stored in the registry.
///
/// `arguments` has already been checked against the tool's input schema;
/// implementations still decode it into their own input type.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool.
    async fn call(&self, arguments: Value, ctx: &CallContext) -> Result<Value, CallError>;
}

/// Failure raised by a tool's own logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unsupported algorithm: {0} (use md5 or sha256)")]
    UnsupportedAlgorithm(String),
    #[error("unsupported format: {0} (use RFC3339, Unix, or UnixMilli)")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    /// Create a generic tool failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ToolError::Failed(message.into())
    }
}

/// Outcome of a failed [`ToolHandler::call`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The arguments could not be decoded into the handler's input type.
    #[error(transparent)]
    InvalidArguments(#[from] SchemaError),
    /// The handler ran and reported an error.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Adapter turning a synchronous typed function into a [`ToolHandler`].
///
/// Input is decoded with serde, output is encoded back into JSON.
pub struct FnTool<I, O, F> {
    func: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FnTool<I, O, F>
where
    F: Fn(&CallContext, I) -> Result<O, ToolError>,
{
    /// Wrap `func`.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<I, O, F> ToolHandler for FnTool<I, O, F>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(&CallContext, I) -> Result<O, ToolError> + Send + Sync + 'static,
{
    async fn call(&self, arguments: Value, ctx: &CallContext) -> Result<Value, CallError> {
        let input: I = serde_json::from_value(arguments)
            .map_err(|e| SchemaError::Decode(e.to_string()))?;
        let output = (self.func)(ctx, input)?;
        serde_json::to_value(output)
            .map_err(|e| ToolError::failed(format!("failed to encode result: {}", e)).into())
    }
}
