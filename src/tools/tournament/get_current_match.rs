//! Get current match tool

use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::TournamentEngine;
use crate::images::{enrich_current_match, ImageProvider};
use crate::protocol::{McpTool, Tool, ToolResult};
use crate::server::json_response;
use crate::storage::Store;

/// Tool for reading the match awaiting a decision, with participant images
pub struct GetCurrentMatchTool<S: Store> {
    engine: Arc<TournamentEngine<S>>,
    images: Arc<dyn ImageProvider>,
}

impl<S: Store> GetCurrentMatchTool<S> {
    pub fn new(engine: Arc<TournamentEngine<S>>, images: Arc<dyn ImageProvider>) -> Self {
        Self { engine, images }
    }
}

impl<S: Store + 'static> Tool for GetCurrentMatchTool<S> {
    fn definition(&self) -> McpTool {
        McpTool::new(
            "get_current_match",
            "Get the match awaiting a decision, starting a tournament first if none is active",
            json!({
                "type": "object",
                "properties": {}
            }),
        )
    }

    fn execute(&self, _params: Value) -> ToolResult<Value> {
        self.engine.ensure_active_tournament()?;

        let mut view = self.engine.current_match_data()?;
        if let Some(view) = view.as_mut() {
            enrich_current_match(view, self.images.as_ref());
        }
        json_response(&view)
    }
}
