//! Get rankings tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolError, ToolResult};
use crate::server::{json_response, optional_str, optional_usize};
use crate::storage::Store;

const DEFAULT_LIMIT: usize = 20;

/// Tool for the ranking-points and tournament-points leaderboards
pub struct GetRankingsTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetRankingsTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetRankingsTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_rankings",
            "Get the leaderboard by ranking points or by cumulative tournament points",
            json!({
                "type": "object",
                "properties": {
                    "by": {
                        "type": "string",
                        "enum": ["ranking", "tournament"],
                        "default": "ranking"
                    },
                    "limit": { "type": "integer", "default": DEFAULT_LIMIT }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let limit = optional_usize(&params, "limit")?.unwrap_or(DEFAULT_LIMIT);
        let leaderboard = match optional_str(&params, "by").unwrap_or("ranking") {
            "ranking" => self.engine.ranking(limit),
            "tournament" => self.engine.tournament_ranking(limit),
            other => {
                return Err(ToolError::InvalidParams(format!(
                    "unknown leaderboard '{}', expected 'ranking' or 'tournament'",
                    other
                )))
            }
        };
        json_response(&leaderboard)
    }
}
