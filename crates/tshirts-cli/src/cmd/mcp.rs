use crate::resources::{self, ResourceError};
use crate::tools::{self, GitHubOpener, ToolContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};
use tshirts_core::config::{GitHubConfig, ModelConfig};
use tshirts_core::model::ClaudeModel;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ToolContent {
    r#type: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ToolCallResult {
    content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    is_error: bool,
}

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

pub fn run(model: Option<String>) -> anyhow::Result<()> {
    let model = ClaudeModel::new(ModelConfig::from_env().with_model(model));
    let stores = GitHubOpener::new(GitHubConfig::from_env());
    let ctx = ToolContext {
        model: &model,
        stores: &stores,
    };
    tracing::info!(model = %model.config().model, "mcp server ready");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), stdout.lock(), &ctx)
}

/// Answer one JSON-RPC request per input line until end of input.
pub fn serve<R: BufRead, W: Write>(input: R, mut out: W, ctx: &ToolContext) -> anyhow::Result<()> {
    let tools = tools::all_tools();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let resp = JsonRpcResponse::failure(None, PARSE_ERROR, format!("parse error: {e}"));
                write_response(&mut out, &resp)?;
                continue;
            }
        };

        // Notifications have no "id" key; do not respond
        if !raw
            .as_object()
            .map(|o| o.contains_key("id"))
            .unwrap_or(false)
        {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse::failure(
                    None,
                    INVALID_REQUEST,
                    format!("invalid request: {e}"),
                );
                write_response(&mut out, &resp)?;
                continue;
            }
        };

        tracing::debug!(method = %request.method, "mcp request");
        let response = handle_request(&request, &tools, ctx);
        write_response(&mut out, &response)?;
    }

    Ok(())
}

fn write_response<W: Write>(out: &mut W, resp: &JsonRpcResponse) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, resp)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Request dispatch (pub for unit tests)
// ---------------------------------------------------------------------------

pub fn handle_request(
    req: &JsonRpcRequest,
    tools: &[Box<dyn tools::TshirtsTool>],
    ctx: &ToolContext,
) -> JsonRpcResponse {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": "tshirts",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let tool_list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name(),
                        "description": t.description(),
                        "inputSchema": t.schema()
                    })
                })
                .collect();
            JsonRpcResponse::success(id, serde_json::json!({ "tools": tool_list }))
        }

        "tools/call" => {
            let Some(params) = &req.params else {
                return JsonRpcResponse::failure(id, INVALID_PARAMS, "missing params");
            };
            let Some(tool_name) = params["name"].as_str() else {
                return JsonRpcResponse::failure(id, INVALID_PARAMS, "missing tool name in params");
            };
            let args = params.get("arguments").cloned().unwrap_or(Value::Null);

            match tools.iter().find(|t| t.name() == tool_name) {
                None => JsonRpcResponse::failure(
                    id,
                    METHOD_NOT_FOUND,
                    format!("tool not found: {tool_name}"),
                ),
                Some(tool) => {
                    let (text, is_error) = match tool.call(args, ctx) {
                        Ok(v) => (
                            serde_json::to_string_pretty(&v)
                                .unwrap_or_else(|e| format!("serialization error: {e}")),
                            false,
                        ),
                        Err(e) => {
                            tracing::warn!(tool = tool_name, error = %e, "tool call failed");
                            (e, true)
                        }
                    };

                    let call_result = ToolCallResult {
                        content: vec![ToolContent {
                            r#type: "text",
                            text,
                        }],
                        is_error,
                    };

                    JsonRpcResponse::success(
                        id,
                        serde_json::to_value(&call_result)
                            .unwrap_or_else(|e| serde_json::json!({"error": e.to_string()})),
                    )
                }
            }
        }

        "resources/list" => JsonRpcResponse::success(id, resources::list()),

        "resources/templates/list" => JsonRpcResponse::success(id, resources::templates()),

        "resources/read" => {
            let Some(uri) = req.params.as_ref().and_then(|p| p["uri"].as_str()) else {
                return JsonRpcResponse::failure(id, INVALID_PARAMS, "missing uri in params");
            };
            match resources::read(uri, ctx.stores) {
                Ok(text) => JsonRpcResponse::success(
                    id,
                    serde_json::json!({
                        "contents": [{
                            "uri": uri,
                            "mimeType": "text/plain",
                            "text": text
                        }]
                    }),
                ),
                Err(e @ ResourceError::UnknownUri(_)) => {
                    JsonRpcResponse::failure(id, INVALID_PARAMS, e.to_string())
                }
                Err(e @ ResourceError::Backend(_)) => {
                    JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string())
                }
            }
        }

        other => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("method not found: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
