//! Get tournament bracket tool

use std::sync::Arc;

use serde_json::{json, Value};

use super::tournament_arg;
use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for projecting every match of a tournament, grouped by round
pub struct GetTournamentBracketTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetTournamentBracketTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetTournamentBracketTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_tournament_bracket",
            "Get all matches of a tournament grouped by round, with the bronze match and final listed separately",
            json!({
                "type": "object",
                "properties": {
                    "tournamentId": {
                        "type": "integer",
                        "description": "Tournament to show (defaults to the active one)"
                    }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let id = tournament_arg(&self.engine, &params)?;
        json_response(&self.engine.tournament_bracket(id)?)
    }
}
