//! Update contestant tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, optional_str, required_u64};
use crate::storage::Store;
use crate::types::{ContestantId, ContestantPatch};

/// Tool for renaming a contestant or changing the nationality tag
pub struct UpdateContestantTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> UpdateContestantTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for UpdateContestantTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "update_contestant",
            "Change a contestant's name or nationality; points and statistics are not editable",
            json!({
                "type": "object",
                "properties": {
                    "contestantId": { "type": "integer" },
                    "name": { "type": "string" },
                    "nationality": { "type": "string", "description": "Empty string clears the tag" }
                },
                "required": ["contestantId"]
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let id = ContestantId(required_u64(&params, "contestantId")?);
        let patch = ContestantPatch {
            name: optional_str(&params, "name").map(str::to_string),
            nationality: optional_str(&params, "nationality").map(str::to_string),
        };

        let contestant = self.engine.update_contestant(id, patch)?;
        json_response(&contestant)
    }
}
