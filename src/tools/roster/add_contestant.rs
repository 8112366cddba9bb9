//! Add contestant tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, optional_str, required_str};
use crate::storage::Store;
use crate::types::NewContestant;

/// Tool for adding a contestant to the roster
pub struct AddContestantTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> AddContestantTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for AddContestantTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "add_contestant",
            "Add a contestant with 1000 ranking points; joins a field at the next rotation",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Display name, unique ignoring case" },
                    "nationality": { "type": "string", "description": "Optional nationality tag" }
                },
                "required": ["name"]
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let mut new = NewContestant::new(required_str(&params, "name")?);
        if let Some(nationality) = optional_str(&params, "nationality") {
            new = new.with_nationality(nationality);
        }

        let contestant = self.engine.add_contestant(new)?;
        json_response(&contestant)
    }
}
