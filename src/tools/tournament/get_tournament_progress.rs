//! Get tournament progress tool

use std::sync::Arc;

use serde_json::{json, Value};

use super::tournament_arg;
use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for reporting how far a tournament has come
pub struct GetTournamentProgressTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetTournamentProgressTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetTournamentProgressTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_tournament_progress",
            "Get completed matches out of 64, percent complete and the current round label",
            json!({
                "type": "object",
                "properties": {
                    "tournamentId": {
                        "type": "integer",
                        "description": "Tournament to report on (defaults to the active one)"
                    }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let id = tournament_arg(&self.engine, &params)?;
        json_response(&self.engine.tournament_progress(id)?)
    }
}
