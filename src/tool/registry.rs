//! Tool registry: built once at startup, read-only afterwards.

use crate::schema::{Schema, SchemaError};
use crate::tool::descriptor::ToolDescriptor;
use crate::tool::handler::{CallContext, CallError, FnTool, ToolError, ToolHandler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Startup-time registration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error("tool name must not be empty")]
    InvalidName,
}

/// Failure of [`ToolRegistry::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No tool with this name is registered.
    #[error("method not found: tool '{0}' is not registered")]
    NotFound(String),
    /// The arguments do not match the tool's input schema.
    #[error("invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: SchemaError,
    },
    /// The tool ran and failed.
    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// A registered tool: its descriptor plus the handler.
struct ToolEntry {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

/// Collects tools before the registry is frozen.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under `descriptor.name`.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Box<dyn ToolHandler>,
    ) -> Result<&mut Self, RegistryError> {
        let name = descriptor.name.clone();
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        self.tools.insert(name.clone(), ToolEntry { descriptor, handler });
        info!("Registered tool: {}", name);
        Ok(self)
    }

    /// Register a synchronous typed function; schemas come from `I` and `O`.
    pub fn register_fn<I, O, F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<&mut Self, RegistryError>
    where
        I: Schema + DeserializeOwned + Send + 'static,
        O: Schema + Serialize + Send + 'static,
        F: Fn(&CallContext, I) -> Result<O, ToolError> + Send + Sync + 'static,
    {
        let descriptor = ToolDescriptor::typed::<I, O>(name, description);
        self.register(descriptor, Box::new(FnTool::new(func)))
    }

    /// Freeze the registry.
    pub fn build(self) -> ToolRegistry {
        ToolRegistry { tools: self.tools }
    }
}

/// Immutable mapping from tool name to handler.
///
/// Holds no locks; share it behind an `Arc`.
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistry {
    /// Start collecting tools.
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Look up a tool's descriptor.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|e| &e.descriptor)
    }

    /// Whether a tool named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All descriptors, sorted by name.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        let mut descriptors: Vec<_> = self.tools.values().map(|e| &e.descriptor).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Validate `arguments` and run the named tool.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
        ctx: &CallContext,
    ) -> Result<Value, DispatchError> {
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        entry
            .descriptor
            .input_schema
            .validate(&arguments)
            .map_err(|source| DispatchError::InvalidArguments {
                tool: name.to_string(),
                source,
            })?;

        debug!(tool = name, request_id = %ctx.request_id, "Dispatching tool call");

        match entry.handler.call(arguments, ctx).await {
            Ok(result) => Ok(result),
            Err(CallError::InvalidArguments(source)) => Err(DispatchError::InvalidArguments {
                tool: name.to_string(),
                source,
            }),
            Err(CallError::Tool(source)) => {
                warn!(
                    tool = name,
                    request_id = %ctx.request_id,
                    "Tool returned an error: {}",
                    source
                );
                Err(DispatchError::Tool {
                    tool: name.to_string(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list().iter().map(|d| &d.name).collect::<Vec<_>>())
            .finish()
    }
}
