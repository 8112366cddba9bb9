//! Roster tools
//!
//! This module contains 6 tools for managing contestants and reading the
//! leaderboards.

mod add_contestant;
mod get_general_stats;
mod get_point_history;
mod get_rankings;
mod list_contestants;
mod update_contestant;

pub use add_contestant::AddContestantTool;
pub use get_general_stats::GetGeneralStatsTool;
pub use get_point_history::GetPointHistoryTool;
pub use get_rankings::GetRankingsTool;
pub use list_contestants::ListContestantsTool;
pub use update_contestant::UpdateContestantTool;
