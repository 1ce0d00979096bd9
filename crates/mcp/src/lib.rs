//! Model Context Protocol server speaking newline-delimited JSON-RPC 2.0.

pub mod rpc;
pub mod server;

pub use server::{McpError, McpServer, ToolProvider};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const MCP_SERVER_NAME: &str = "Zerodha MCP Server";
