//! Get general stats tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, optional_usize};
use crate::storage::Store;

/// Tool for per-contestant win, loss and medal counts
pub struct GetGeneralStatsTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetGeneralStatsTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetGeneralStatsTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_general_stats",
            "Get every contestant's matches, wins, losses and medals, most wins first",
            json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer" }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let mut stats = self.engine.general_stats();
        if let Some(limit) = optional_usize(&params, "limit")? {
            stats.truncate(limit);
        }
        json_response(&stats)
    }
}
