//! MCP Tools implementation
//!
//! This module contains all 14 MCP tools organized by category:
//! - Tournament tools (8): bracket lifecycle and read models
//! - Roster tools (6): contestant administration and leaderboards

pub mod roster;
pub mod tournament;

use std::sync::Arc;

use crate::engine::TournamentEngine;
use crate::images::ImageProvider;
use crate::server::McpServer;
use crate::storage::Store;

pub use roster::{
    AddContestantTool, GetGeneralStatsTool, GetPointHistoryTool, GetRankingsTool,
    ListContestantsTool, UpdateContestantTool,
};
pub use tournament::{
    AdvanceToNextMatchTool, ForceNewTournamentTool, GetCurrentMatchTool,
    GetTournamentBracketTool, GetTournamentHistoryTool, GetTournamentProgressTool,
    InitializeTournamentTool, SelectWinnerTool,
};

/// Register all tools with the MCP server
pub fn register_all_tools<S, R, W>(
    server: &mut McpServer<R, W>,
    engine: Arc<TournamentEngine<S>>,
    images: Arc<dyn ImageProvider>,
) where
    S: Store + 'static,
    R: std::io::BufRead,
    W: std::io::Write,
{
    // Tournament tools (8)
    server.register_tool(Box::new(InitializeTournamentTool::new(engine.clone())));
    server.register_tool(Box::new(ForceNewTournamentTool::new(engine.clone())));
    server.register_tool(Box::new(SelectWinnerTool::new(engine.clone())));
    server.register_tool(Box::new(AdvanceToNextMatchTool::new(engine.clone())));
    server.register_tool(Box::new(GetCurrentMatchTool::new(engine.clone(), images)));
    server.register_tool(Box::new(GetTournamentBracketTool::new(engine.clone())));
    server.register_tool(Box::new(GetTournamentProgressTool::new(engine.clone())));
    server.register_tool(Box::new(GetTournamentHistoryTool::new(engine.clone())));

    // Roster tools (6)
    server.register_tool(Box::new(AddContestantTool::new(engine.clone())));
    server.register_tool(Box::new(UpdateContestantTool::new(engine.clone())));
    server.register_tool(Box::new(ListContestantsTool::new(engine.clone())));
    server.register_tool(Box::new(GetRankingsTool::new(engine.clone())));
    server.register_tool(Box::new(GetPointHistoryTool::new(engine.clone())));
    server.register_tool(Box::new(GetGeneralStatsTool::new(engine)));
}
