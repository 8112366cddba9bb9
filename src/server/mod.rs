//! MCP Server implementation
//!
//! This module contains the line-delimited JSON-RPC loop that exposes the
//! registered tools. Stdout carries protocol traffic only; diagnostics go
//! through `tracing` to stderr.

mod handlers;

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpTool, ServerInfo, Tool, ToolError,
};

pub use handlers::*;

/// Failure of the transport itself
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("response encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// MCP Server that handles JSON-RPC communication, over stdio by default
pub struct McpServer<R = BufReader<Stdin>, W = BufWriter<Stdout>> {
    server_info: ServerInfo,
    tools: HashMap<String, Box<dyn Tool>>,
    reader: R,
    writer: W,
}

impl McpServer {
    pub fn new() -> Self {
        Self::with_info(ServerInfo::default())
    }

    pub fn with_info(info: ServerInfo) -> Self {
        Self::with_io(info, BufReader::new(io::stdin()), BufWriter::new(io::stdout()))
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> McpServer<R, W> {
    /// Server over arbitrary streams
    pub fn with_io(info: ServerInfo, reader: R, writer: W) -> Self {
        Self {
            server_info: info,
            tools: HashMap::new(),
            reader,
            writer,
        }
    }

    pub fn register_tool(&mut self, tool: Box<dyn Tool>) -> &mut Self {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Serve requests until the input closes
    pub fn run(&mut self) -> ServerResult<()> {
        info!(
            name = %self.server_info.name,
            version = %self.server_info.version,
            tools = self.tools.len(),
            "Server listening on stdio"
        );
        let mut line = String::new();
        while self.reader.read_line(&mut line)? > 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                self.handle_request(trimmed)?;
            }
            line.clear();
        }
        info!("Input closed, shutting down");
        Ok(())
    }

    /// Consume the server, returning its writer
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn handle_request(&mut self, request_str: &str) -> ServerResult<()> {
        let request: JsonRpcRequest = match serde_json::from_str(request_str) {
            Ok(req) => req,
            Err(e) => return self.send(&JsonRpcError::parse_error(e.to_string())),
        };

        if !request.is_valid() {
            let id = request.id.unwrap_or(Value::Null);
            return self.send(&JsonRpcError::invalid_request(id, "jsonrpc must be '2.0'"));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return Ok(());
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        debug!(method = %request.method, id = %id, "Request received");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tool_call(id, request.params),
            "ping" => self.send(&JsonRpcResponse::new(id, json!({}))),
            method => self.send(&JsonRpcError::method_not_found(id, method)),
        }
    }

    fn handle_initialize(&mut self, id: Value) -> ServerResult<()> {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.server_info.name,
                "version": self.server_info.version
            }
        });
        self.send(&JsonRpcResponse::new(id, result))
    }

    fn handle_tools_list(&mut self, id: Value) -> ServerResult<()> {
        let mut tools: Vec<McpTool> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        self.send(&JsonRpcResponse::new(id, json!({ "tools": tools })))
    }

    fn handle_tool_call(&mut self, id: Value, params: Option<Value>) -> ServerResult<()> {
        let Some(params) = params else {
            return self.send(&JsonRpcError::invalid_params(id, "missing params".to_string()));
        };
        let Some(tool_name) = extract_tool_name(&params) else {
            return self.send(&JsonRpcError::invalid_params(id, "missing tool name".to_string()));
        };

        let Some(tool) = self.tools.get(tool_name) else {
            let details = format!("unknown tool '{}'", tool_name);
            return self.send(&JsonRpcError::invalid_params(id, details));
        };

        let outcome = tool.execute(extract_arguments(&params));
        match outcome {
            Ok(result) => self.send(&JsonRpcResponse::new(id, result)),
            Err(ToolError::InvalidParams(details)) => {
                self.send(&JsonRpcError::invalid_params(id, details))
            }
            Err(ToolError::Engine(e)) if !e.is_fatal() => {
                warn!(tool = tool_name, code = e.code(), error = %e, "Request rejected");
                let response = error_response(e.code(), e.to_string());
                self.send(&JsonRpcResponse::new(id, response))
            }
            Err(ToolError::Engine(e)) => {
                error!(tool = tool_name, code = e.code(), error = %e, "Tool failed");
                let response = JsonRpcError::internal_error(id, e.code(), e.to_string());
                self.send(&response)
            }
            Err(ToolError::Json(e)) => {
                error!(tool = tool_name, error = %e, "Result encoding failed");
                self.send(&JsonRpcError::internal_error(id, "SERIALIZATION", e.to_string()))
            }
        }
    }

    fn send<T: Serialize>(&mut self, message: &T) -> ServerResult<()> {
        let json = serde_json::to_string(message)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }
}
