//! Tool registration and dispatch.

pub mod descriptor;
pub mod handler;
pub mod registry;

pub use descriptor::ToolDescriptor;
pub use handler::{CallContext, CallError, FnTool, ToolError, ToolHandler};
pub use registry::{DispatchError, RegistryError, ToolRegistry, ToolRegistryBuilder};
