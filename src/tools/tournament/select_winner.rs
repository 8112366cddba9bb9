//! Select winner tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, required_u64};
use crate::storage::Store;
use crate::types::{ContestantId, MatchId};

/// Tool for recording the winner of one match
pub struct SelectWinnerTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> SelectWinnerTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for SelectWinnerTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "select_winner",
            "Record the winner of a match; exchanges ranking points and advances the bracket",
            json!({
                "type": "object",
                "properties": {
                    "matchId": { "type": "integer", "description": "Match being decided" },
                    "winnerId": { "type": "integer", "description": "Contestant who won; must play in the match" }
                },
                "required": ["matchId", "winnerId"]
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let match_id = MatchId(required_u64(&params, "matchId")?);
        let winner_id = ContestantId(required_u64(&params, "winnerId")?);

        let outcome = self.engine.select_winner(match_id, winner_id)?;
        json_response(&outcome)
    }
}
