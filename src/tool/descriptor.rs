//! Tool descriptor: the static metadata of a registered operation.

use crate::schema::{ObjectSchema, Schema};
use serde_json::{json, Value};

/// Name, description and schemas of a tool.
///
/// Created once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    /// Unique tool name, the registry key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Shape of the arguments the tool accepts.
    pub input_schema: ObjectSchema,
    /// Shape of the result the tool returns.
    pub output_schema: ObjectSchema,
}

impl ToolDescriptor {
    /// Create a descriptor with empty schemas.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: ObjectSchema::new(),
            output_schema: ObjectSchema::new(),
        }
    }

    /// Create a descriptor whose schemas come from the `I` and `O` types.
    pub fn typed<I: Schema, O: Schema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, description)
            .with_input_schema(I::schema())
            .with_output_schema(O::schema())
    }

    /// Replace the input schema.
    pub fn with_input_schema(mut self, schema: ObjectSchema) -> Self {
        self.input_schema = schema;
        self
    }

    /// Replace the output schema.
    pub fn with_output_schema(mut self, schema: ObjectSchema) -> Self {
        self.output_schema = schema;
        self
    }

    /// The `tools/list` entry for this tool.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json_schema(),
            "outputSchema": self.output_schema.to_json_schema(),
        })
    }
}
