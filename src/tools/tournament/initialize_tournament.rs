//! Initialize tournament tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for closing the active tournament and seeding a fresh one
pub struct InitializeTournamentTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> InitializeTournamentTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for InitializeTournamentTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "initialize_tournament",
            "Complete any active tournament without awards and seed a new 64-contestant bracket",
            json!({
                "type": "object",
                "properties": {}
            }),
        )
    }

    fn execute(&self, _params: Value) -> ToolResult<Value> {
        let tournament = self.engine.initialize_tournament()?;
        json_response(&tournament)
    }
}
