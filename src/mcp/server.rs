//! MCP server implementation.

use super::protocol::*;
use super::tools::{get_tools, parse_tool_call, ToolCall};
use crate::generation::{generate, query, render};
use crate::vidu::{PollConfig, ViduApi};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "vidu";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "This server connects to Vidu API endpoints which may involve costs. \
    Only use the generation tools when the user specifically asks for them. \
    Generation blocks until the video is ready, which can take several minutes.";

/// MCP Server for Vidu.
///
/// The API client is shared by every tool call; each call runs on its own
/// task so a long-running generation never stalls the others.
pub struct McpServer {
    api: Arc<dyn ViduApi>,
    poll: PollConfig,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(api: Arc<dyn ViduApi>, poll: PollConfig) -> Self {
        Self { api, poll }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Vidu MCP server starting");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve line-delimited JSON-RPC from `reader`, writing responses to `writer`.
    ///
    /// Returns once the input is exhausted and every in-flight call has answered.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let server = Arc::new(self);
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    let _ = tx.send(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
                    continue;
                }
            };

            if request.method == "tools/call" {
                let server = Arc::clone(&server);
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response);
                    }
                });
            } else if let Some(response) = server.handle_request(request).await {
                let _ = tx.send(response);
            }
        }

        debug!("Input closed, waiting for in-flight calls");
        drop(tx);
        writer_task.await??;
        Ok(())
    }

    /// Handle a single JSON-RPC message. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok()) {
            info!(
                "Client {} {} connected (protocol {})",
                params.client_info.name, params.client_info.version, params.protocol_version
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        JsonRpcResponse::from_result(id, &result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::from_result(id, &ToolsListResult { tools: get_tools() })
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Invalid params: {}", e))
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = self.call_tool(&params).await;
        JsonRpcResponse::from_result(id, &result)
    }

    async fn call_tool(&self, params: &ToolCallParams) -> ToolCallResult {
        let args = match params.arguments_object() {
            Some(args) => args,
            None => return ToolCallResult::error("Tool arguments must be an object".to_string()),
        };

        let call = match parse_tool_call(&params.name, args) {
            Some(call) => call,
            None => return ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        info!("Calling tool {}", params.name);
        let outcome = match call {
            Ok(ToolCall::Generate(request)) => generate(self.api.as_ref(), &self.poll, &request).await,
            Ok(ToolCall::Query(task_id)) => query(self.api.as_ref(), &self.poll, task_id).await,
            Err(e) => Err(e),
        };

        ToolCallResult::text(render(outcome))
    }
}

/// Single writer so concurrent responses never interleave on the wire.
async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_string(&response) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                continue;
            }
        };
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
