//! Force new tournament tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for finishing the first round at random and rotating immediately
pub struct ForceNewTournamentTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> ForceNewTournamentTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for ForceNewTournamentTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "force_new_tournament",
            "Decide any open first-round matches at random (no points move) and start the next tournament",
            json!({
                "type": "object",
                "properties": {}
            }),
        )
    }

    fn execute(&self, _params: Value) -> ToolResult<Value> {
        let tournament = self.engine.force_new_tournament()?;
        json_response(&tournament)
    }
}
