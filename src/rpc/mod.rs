//! JSON-RPC 2.0 envelopes and the MCP method router.

mod protocol;
mod request;
mod response;

pub use protocol::{McpProtocol, Reply, ServerInfo, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS};
pub use request::{Incoming, RpcRequest};
pub use response::{ContentBlock, ErrorCode, RpcError, RpcResponse, ToolCallResult};
