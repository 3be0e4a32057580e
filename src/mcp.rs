//! Model Context Protocol server on stdio
//!
//! One JSON-RPC 2.0 request per input line, one response per output line.
//! Three methods exist: `initialize`, `tools/list` and `tools/call`.

use crate::cli::{AddArgs, SearchArgs};
use crate::error::AppError;
use crate::tools::{add, search, Services};
use anyhow::Result;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const ADD_TOOL: &str = "add_establishment";
const SEARCH_TOOL: &str = "search_establishments";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Why a request produced an `error` member instead of a `result`
#[derive(Debug, thiserror::Error)]
enum RpcError {
    #[error("Invalid JSON: {0}")]
    Parse(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Tool '{0}' not found")]
    ToolNotFound(String),
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Tool(#[from] AppError),
}

impl RpcError {
    fn code(&self) -> &'static str {
        match self {
            RpcError::Parse(_) => "parse_error",
            RpcError::MethodNotFound(_) => "method_not_found",
            RpcError::ToolNotFound(_) => "tool_not_found",
            RpcError::InvalidParams(_) => "invalid_params",
            RpcError::Tool(e) => e.error_code(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(flatten)]
    body: Body,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Body {
    Result(Value),
    Error { code: &'static str, message: String },
}

impl Response {
    fn new(id: Option<Value>, outcome: Result<Value, RpcError>) -> Self {
        let body = match outcome {
            Ok(value) => Body::Result(value),
            Err(e) => {
                warn!("Request {:?} failed: {}", id, e);
                Body::Error {
                    code: e.code(),
                    message: e.to_string(),
                }
            }
        };
        Self {
            jsonrpc: "2.0",
            id,
            body,
        }
    }
}

/// Answer requests from stdin until it closes
pub async fn serve_stdio(services: &Services) -> Result<()> {
    info!("eatlist MCP server reading requests on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = respond(&line, services).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, MCP server stopping");
    Ok(())
}

async fn respond(line: &str, services: &Services) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            debug!("Request {:?}: {}", request.id, request.method);
            let outcome = dispatch(&request.method, request.params, services).await;
            Response::new(request.id, outcome)
        }
        Err(e) => Response::new(None, Err(RpcError::Parse(e.to_string()))),
    }
}

async fn dispatch(method: &str, params: Value, services: &Services) -> Result<Value, RpcError> {
    match method {
        "initialize" => Ok(json!({
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": { "tools": { "list": true, "call": true } },
            "tools": tool_catalog(),
        })),
        "tools/list" => Ok(json!({ "tools": tool_catalog() })),
        "tools/call" => {
            let call: ToolCall = serde_json::from_value(params)
                .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
            let text = match call.name.as_str() {
                ADD_TOOL => add::handle_add(call.arguments, services).await?,
                SEARCH_TOOL => search::handle_search(call.arguments, services).await?,
                other => return Err(RpcError::ToolNotFound(other.to_string())),
            };
            Ok(json!({ "content": [{ "type": "text", "text": text }] }))
        }
        other => Err(RpcError::MethodNotFound(other.to_string())),
    }
}

/// Tool descriptors; input schemas come from the CLI argument structs
pub fn tool_catalog() -> Value {
    let add_schema = schema_for!(AddArgs);
    let search_schema = schema_for!(SearchArgs);

    json!([
        {
            "name": ADD_TOOL,
            "description": "Resolve a possibly misspelled restaurant or bar name and store its details",
            "inputSchema": add_schema,
        },
        {
            "name": SEARCH_TOOL,
            "description": "Fuzzy-search stored restaurants and bars by name, cuisine or category",
            "inputSchema": search_schema,
        }
    ])
}
