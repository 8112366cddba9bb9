//! Tournament tools
//!
//! This module contains 8 tools for driving the bracket and reading it back.

mod advance_to_next_match;
mod force_new_tournament;
mod get_current_match;
mod get_tournament_bracket;
mod get_tournament_history;
mod get_tournament_progress;
mod initialize_tournament;
mod select_winner;

pub use advance_to_next_match::AdvanceToNextMatchTool;
pub use force_new_tournament::ForceNewTournamentTool;
pub use get_current_match::GetCurrentMatchTool;
pub use get_tournament_bracket::GetTournamentBracketTool;
pub use get_tournament_history::GetTournamentHistoryTool;
pub use get_tournament_progress::GetTournamentProgressTool;
pub use initialize_tournament::InitializeTournamentTool;
pub use select_winner::SelectWinnerTool;

use serde_json::Value;

use crate::engine::TournamentEngine;
use crate::protocol::ToolResult;
use crate::server::optional_usize;
use crate::storage::Store;
use crate::types::TournamentId;

/// The `tournamentId` argument, defaulting to the active tournament
fn tournament_arg<S: Store>(engine: &TournamentEngine<S>, params: &Value) -> ToolResult<TournamentId> {
    match optional_usize(params, "tournamentId")? {
        Some(id) => Ok(TournamentId(id as u64)),
        None => Ok(engine.ensure_active_tournament()?.id),
    }
}
