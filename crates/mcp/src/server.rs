use crate::rpc::{error_response, success_response, text_result, RpcError};
use crate::{MCP_PROTOCOL_VERSION, MCP_SERVER_NAME};
use async_trait::async_trait;
use kitemcp_tools::{ToolDefinition, ToolError, ToolSet};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Tool Provider
// ---------------------------------------------------------------------------

/// The tool registry the server dispatches `tools/list` and `tools/call` to.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn definitions(&self) -> &[ToolDefinition];

    async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError>;
}

#[async_trait]
impl ToolProvider for ToolSet {
    fn definitions(&self) -> &[ToolDefinition] {
        ToolSet::definitions(self)
    }

    async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        ToolSet::invoke(self, name, args).await
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("I/O error on the protocol stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct McpServer<P> {
    tools: P,
}

impl<P: ToolProvider> McpServer<P> {
    pub fn new(tools: P) -> Self {
        Self { tools }
    }

    /// Serve one message per line until the input closes or `cancel` fires.
    ///
    /// Invocations are handled one at a time, in arrival order.
    pub async fn serve<R, W>(
        &self,
        mut reader: R,
        mut writer: W,
        cancel: CancellationToken,
    ) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tool server cancelled");
                    break;
                }
                read = reader.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                info!("Protocol input closed");
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!(error = %e, "Protocol line is not valid UTF-8");
                    Some(error_response(
                        Value::Null,
                        RpcError::parse_error(format!("Parse error: {e}")),
                    ))
                }
            };

            if let Some(response) = response {
                let mut bytes = serde_json::to_vec(&response)?;
                bytes.push(b'\n');
                writer.write_all(&bytes).await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(incoming) => self.handle_message(incoming).await,
            Err(e) => {
                warn!(error = %e, "Unparseable protocol message");
                Some(error_response(
                    Value::Null,
                    RpcError::parse_error(format!("Parse error: {e}")),
                ))
            }
        }
    }

    async fn handle_message(&self, incoming: Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        // Responses to requests we never send.
        let method = obj.get("method").and_then(Value::as_str)?;

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        match obj.get("id").cloned() {
            Some(id) => Some(match self.handle_request(method, params).await {
                Ok(result) => success_response(id, result),
                Err(err) => error_response(id, err),
            }),
            None => {
                debug!(method, "Notification");
                None
            }
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn tools_list_payload(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .definitions()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        match self.tools.invoke(name, &args).await {
            Ok(text) => Ok(text_result(text, false)),
            Err(ToolError::UnknownTool(name)) => {
                Err(RpcError::invalid_params(format!("Unknown tool: {name}")))
            }
            Err(err) => {
                warn!(tool = name, error = %err, "Tool call failed");
                Ok(text_result(err.to_string(), true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitemcp_tools::ParamSpec;

    /// Echoes the `text` argument back.
    struct EchoTools {
        definitions: Vec<ToolDefinition>,
    }

    impl EchoTools {
        fn new() -> Self {
            Self {
                definitions: vec![ToolDefinition::new("echo", "Echo text back")
                    .param(ParamSpec::string("text", "Text to echo"))],
            }
        }
    }

    #[async_trait]
    impl ToolProvider for EchoTools {
        fn definitions(&self) -> &[ToolDefinition] {
            &self.definitions
        }

        async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
            let definition = self
                .definitions
                .iter()
                .find(|d| d.name == name)
                .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
            definition.validate(args)?;
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    async fn run(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let server = McpServer::new(EchoTools::new());
        let mut output = Vec::new();
        server
            .serve(input, &mut output, CancellationToken::new())
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let responses = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 1);
        let result = &responses[0]["result"];
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "Zerodha MCP Server");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_exposes_schema() {
        let responses = run(r#"{"jsonrpc":"2.0","id":"a","method":"tools/list"}"#).await;

        let tools = responses[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "echo");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["text"]));
        assert_eq!(tools[0]["inputSchema"]["properties"]["text"]["type"], "string");
    }

    #[tokio::test]
    async fn test_tools_call_returns_text_content() {
        let responses = run(
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"echo","arguments":{"text":"hello"}}}"#,
        )
        .await;

        let result = &responses[0]["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "hello");
    }

    #[tokio::test]
    async fn test_tool_failure_is_reported_in_result() {
        let responses = run(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{}}}"#,
        )
        .await;

        let result = &responses[0]["result"];
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Invalid argument"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let responses = run(
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nope"}}"#,
        )
        .await;
        assert_eq!(responses[0]["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_the_loop() {
        let responses = run(concat!(
            "{not json\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"1.0","id":6,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], -32601);
        assert_eq!(responses[2]["error"]["code"], -32600);
        assert_eq!(responses[3]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_a_parse_error() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        input.push(b'\n');

        let responses = run_bytes(&input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[2]["id"], 2);
        assert_eq!(responses[2]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_cancel_stops_serving() {
        let server = McpServer::new(EchoTools::new());
        let (_client, server_end) = tokio::io::duplex(64);
        let (read_half, write_half) = tokio::io::split(server_end);
        let cancel = CancellationToken::new();
        cancel.cancel();

        server
            .serve(tokio::io::BufReader::new(read_half), write_half, cancel)
            .await
            .unwrap();
    }
}
