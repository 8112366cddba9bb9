//! List contestants tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolError, ToolResult};
use crate::server::{json_response, optional_str, optional_usize};
use crate::storage::Store;
use crate::types::ContestantId;

/// Tool for reading the roster, one contestant or the current field
pub struct ListContestantsTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> ListContestantsTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for ListContestantsTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "list_contestants",
            "List the roster in id order, only the current field, or a single contestant",
            json!({
                "type": "object",
                "properties": {
                    "contestantId": { "type": "integer", "description": "Return just this contestant" },
                    "filter": {
                        "type": "string",
                        "enum": ["all", "active"],
                        "default": "all"
                    }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        if let Some(id) = optional_usize(&params, "contestantId")? {
            let contestant = self.engine.contestant(ContestantId(id as u64))?;
            return json_response(&contestant);
        }

        let contestants = match optional_str(&params, "filter").unwrap_or("all") {
            "all" => self.engine.contestants(),
            "active" => self.engine.active_contestants(),
            other => {
                return Err(ToolError::InvalidParams(format!(
                    "unknown filter '{}', expected 'all' or 'active'",
                    other
                )))
            }
        };
        json_response(&contestants)
    }
}
