use crate::tools::{Tool, ToolArgError, ToolResult};
use crate::util::truncate_with_ellipsis;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// MCP protocol version answered when the client does not name one.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Maximum bytes per request line.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// MCP server exposing a fixed set of tools over line-delimited JSON-RPC.
pub struct McpServer {
    name: String,
    version: String,
    tools: Vec<Box<dyn Tool>>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>, tools: Vec<Box<dyn Tool>>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools,
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> anyhow::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Answer requests from `reader` on `writer`, one message per line,
    /// until end of input. Requests are handled strictly in arrival order.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            server = %self.name,
            "Server started. Tools available: {}",
            self.tool_names().join(", ")
        );

        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line).await?;
            if n == 0 {
                break;
            }
            if line.len() > MAX_LINE_BYTES {
                warn!(bytes = line.len(), "Request line exceeds maximum size, skipping");
                send_message(&mut writer, &failure(Value::Null, PARSE_ERROR, "Parse error")).await?;
                continue;
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let message: Value = match serde_json::from_slice(&line) {
                Ok(message) => message,
                Err(e) => {
                    debug!(error = %e, "Unparseable request line");
                    send_message(&mut writer, &failure(Value::Null, PARSE_ERROR, "Parse error"))
                        .await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_message(message).await {
                send_message(&mut writer, &response).await?;
            }
        }

        info!(server = %self.name, "Input closed, shutting down");
        Ok(())
    }

    /// Handle one decoded message. Notifications yield `None`.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let Value::Object(ref fields) = message else {
            return Some(failure(Value::Null, INVALID_REQUEST, "Invalid Request"));
        };
        let method = fields.get("method").and_then(Value::as_str);
        let Some(id) = fields.get("id").cloned() else {
            debug!(method = method.unwrap_or(""), "Notification");
            return None;
        };
        let Some(method) = method else {
            return Some(failure(id, INVALID_REQUEST, "Invalid Request"));
        };
        let params = fields.get("params").cloned().unwrap_or(Value::Null);

        let response = match method {
            "initialize" => success(id, self.initialize_result(&params)),
            "ping" => success(id, json!({})),
            "tools/list" => success(id, self.list_result()),
            "tools/call" => self.call(id, &params).await,
            other => {
                debug!(method = other, "Unknown method");
                failure(id, METHOD_NOT_FOUND, "Method not found")
            }
        };
        Some(response)
    }

    fn initialize_result(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.name,
                "version": self.version
            }
        })
    }

    fn list_result(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                let spec = tool.spec();
                json!({
                    "name": spec.name,
                    "title": spec.title,
                    "description": spec.description,
                    "inputSchema": spec.parameters
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call(&self, id: Value, params: &Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return failure(id, INVALID_PARAMS, "Invalid params: missing tool name");
        };
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            return failure(id, INVALID_PARAMS, &format!("Unknown tool: {name}"));
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        debug!(tool = name, "tools/call");
        match tool.execute(arguments).await {
            Ok(result) => success(id, call_result(&result)),
            Err(e) => {
                if let Some(arg_error) = e.downcast_ref::<ToolArgError>() {
                    debug!(tool = name, error = %arg_error, "Rejected arguments");
                    return failure(id, INVALID_PARAMS, &format!("Invalid params: {arg_error}"));
                }
                let message = e.to_string();
                warn!(tool = name, error = %truncate_with_ellipsis(&message, 200), "Tool failed");
                success(id, call_result(&ToolResult::error(message)))
            }
        }
    }
}

/// `tools/call` result envelope.
fn call_result(result: &ToolResult) -> Value {
    let texts: Vec<&str> = if result.success {
        result.content.iter().map(String::as_str).collect()
    } else {
        vec![result.summary()]
    };
    let content: Vec<Value> = texts
        .into_iter()
        .map(|text| json!({ "type": "text", "text": text }))
        .collect();

    let mut envelope = json!({
        "content": content,
        "isError": !result.success
    });
    // structuredContent must be an object; a 204 from Jira yields null
    if let Some(structured @ Value::Object(_)) = &result.structured {
        envelope["structuredContent"] = structured.clone();
    }
    envelope
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn failure(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

// ── JSON-RPC helpers ────────────────────────────────────────────

async fn send_message<W: AsyncWrite + Unpin>(writer: &mut W, message: &Value) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
