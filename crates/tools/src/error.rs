use kitemcp_core::BrokerError;

/// Per-invocation failures. None of these stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
