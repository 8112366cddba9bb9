//! Get tournament history tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, optional_usize};
use crate::storage::Store;
use crate::types::TournamentId;

/// Tool for listing past tournaments with their podiums, or one
/// tournament's placement awards
pub struct GetTournamentHistoryTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetTournamentHistoryTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetTournamentHistoryTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_tournament_history",
            "List tournaments newest first with champion, runner-up and third place; pass tournamentId for its placement awards",
            json!({
                "type": "object",
                "properties": {
                    "tournamentId": {
                        "type": "integer",
                        "description": "Show the placement awards of this tournament instead"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of tournaments to list"
                    }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        if let Some(id) = optional_usize(&params, "tournamentId")? {
            let awards = self.engine.placements(TournamentId(id as u64))?;
            return json_response(&awards);
        }

        let mut history = self.engine.tournament_history();
        if let Some(limit) = optional_usize(&params, "limit")? {
            history.truncate(limit);
        }
        json_response(&history)
    }
}
