//! Advance to next match tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for re-synchronizing the current-match pointer
pub struct AdvanceToNextMatchTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> AdvanceToNextMatchTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for AdvanceToNextMatchTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "advance_to_next_match",
            "Point the active tournament at its next undecided match (safe to repeat)",
            json!({
                "type": "object",
                "properties": {}
            }),
        )
    }

    fn execute(&self, _params: Value) -> ToolResult<Value> {
        let next = self.engine.advance_to_next_match()?;
        json_response(&next)
    }
}
