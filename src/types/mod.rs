//! Data types for the bracket engine
//!
//! This module contains the persistent records (contestants, tournaments,
//! matches, point history), the typed ids that link them, the read-model
//! views handed to callers, and the crate-wide error type.

mod contestant;
mod error;
mod history;
mod ids;
mod tournament;
mod view;

pub use contestant::{Contestant, ContestantPatch, NewContestant, STARTING_RANKING_POINTS};
pub use error::{EngineError, RecordKind};
pub use history::{NewPointHistory, PlacementAward, PointHistory};
pub use ids::{ContestantId, MatchId, TournamentId};
pub use tournament::{
    matches_in_round, round_label, Match, NewMatch, Tournament, BRONZE_MATCH, FIELD_SIZE,
    FINAL_MATCH, FINAL_ROUND, FIRST_ROUND, SEMIFINAL_ROUND, TOTAL_MATCHES,
};
pub use view::{
    BracketMatchView, BracketRound, BracketView, ContestantBrief, CurrentMatchView,
    MatchContestantView, ProgressView, SelectWinnerOutcome, TournamentSummary,
};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
