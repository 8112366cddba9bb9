//! Get point history tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::{json_response, optional_usize};
use crate::storage::Store;
use crate::types::ContestantId;

const DEFAULT_PERFORMERS: usize = 10;
const DEFAULT_PER_CONTESTANT: usize = 5;

/// Tool for the ranking-points audit trail
pub struct GetPointHistoryTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
}

impl<S: Store> GetPointHistoryTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>) -> Self {
        Self { engine }
    }
}

impl<S: Store + 'static> Tool for GetPointHistoryTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_point_history",
            "Get a contestant's point movements newest first, or recent movements of the top performers",
            json!({
                "type": "object",
                "properties": {
                    "contestantId": {
                        "type": "integer",
                        "description": "Contestant to show; omit for the top performers"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Rows for one contestant, or performers to list"
                    },
                    "perContestant": {
                        "type": "integer",
                        "default": DEFAULT_PER_CONTESTANT
                    }
                }
            }),
        )
    }

    fn execute(&self, params: Value) -> ToolResult<Value> {
        let limit = optional_usize(&params, "limit")?;

        match optional_usize(&params, "contestantId")? {
            Some(id) => {
                let rows = self.engine.point_history(ContestantId(id as u64), limit)?;
                json_response(&rows)
            }
            None => {
                let per = optional_usize(&params, "perContestant")?.unwrap_or(DEFAULT_PER_CONTESTANT);
                let performers = self
                    .engine
                    .top_performers_history(limit.unwrap_or(DEFAULT_PERFORMERS), per);
                json_response(&performers)
            }
        }
    }
}
