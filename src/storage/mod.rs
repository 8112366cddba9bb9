//! Storage - roster and bracket persistence
//!
//! The engine talks to persistence through two seams:
//! - `Repository`: the CRUD + filtered-query contract over contestants,
//!   tournaments, matches, point history and placement awards
//! - `Store`: the transaction boundary that hands out a `Repository`
//!
//! # Transactions
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────┐    ┌─────────────┐
//! │ lock arena   │───►│ mark row counts  │───►│ run closure, │───►│ Ok: keep    │
//! │ (one writer) │    │                  │    │ saving first │    │ Err: restore│
//! └──────────────┘    └──────────────────┘    │ rewrites     │    │ and truncate│
//!                                             └──────────────┘    └─────────────┘
//! ```
//!
//! A closure that fails leaves the committed state untouched, so a decision
//! and every bracket mutation it cascades into land together or not at all.
//! Holding the lock for the whole closure makes check-then-act on a match
//! atomic.

mod arena;
mod jsonl;
mod memory;
mod transaction;

use chrono::{DateTime, Utc};

use crate::types::{
    Contestant, ContestantId, EngineResult, Match, MatchId, NewContestant, NewMatch,
    NewPointHistory, PlacementAward, PointHistory, Tournament, TournamentId,
};

pub use arena::Arena;
pub use jsonl::{JsonlStore, DEFAULT_MIN_COMPACT_LINES};
pub use memory::MemoryStore;

/// Score a leaderboard is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingKey {
    RankingPoints,
    TournamentPoints,
}

impl RankingKey {
    pub fn score(self, contestant: &Contestant) -> u64 {
        match self {
            RankingKey::RankingPoints => contestant.ranking_points,
            RankingKey::TournamentPoints => contestant.tournament_points,
        }
    }
}

/// CRUD and query contract over the persisted records
///
/// Reads return owned copies; writes replace a whole record by id.
pub trait Repository {
    fn contestant(&self, id: ContestantId) -> Option<Contestant>;
    /// All contestants in id order
    fn contestants(&self) -> Vec<Contestant>;
    fn insert_contestant(&mut self, new: NewContestant) -> Contestant;
    fn update_contestant(&mut self, contestant: Contestant) -> EngineResult<()>;
    /// Highest score first, ties by id
    fn top_contestants(&self, by: RankingKey, limit: usize) -> Vec<Contestant>;

    fn tournament(&self, id: TournamentId) -> Option<Tournament>;
    /// The newest tournament that is not completed
    fn active_tournament(&self) -> Option<Tournament>;
    fn latest_tournament(&self) -> Option<Tournament>;
    /// All tournaments, newest first
    fn tournaments(&self) -> Vec<Tournament>;
    fn insert_tournament(&mut self, started_at: DateTime<Utc>) -> Tournament;
    fn update_tournament(&mut self, tournament: Tournament) -> EngineResult<()>;

    fn match_by_id(&self, id: MatchId) -> Option<Match>;
    /// Ordered by round, then match number
    fn matches_by_tournament(&self, tournament: TournamentId) -> Vec<Match>;
    /// Ordered by match number
    fn matches_by_round(&self, tournament: TournamentId, round: u8) -> Vec<Match>;
    fn insert_match(&mut self, new: NewMatch) -> Match;
    fn update_match(&mut self, m: Match) -> EngineResult<()>;

    fn append_point_history(&mut self, entry: NewPointHistory) -> PointHistory;
    /// Newest first
    fn point_history(&self, contestant: ContestantId, limit: Option<usize>) -> Vec<PointHistory>;

    fn insert_placement(&mut self, award: PlacementAward);
    fn placements(&self, tournament: TournamentId) -> Vec<PlacementAward>;
}

/// Transaction boundary over a `Repository`
pub trait Store: Send + Sync {
    /// Run a read-only closure against the committed state
    fn read<T>(&self, f: impl FnOnce(&dyn Repository) -> T) -> T;

    /// Run a closure atomically; its writes commit only if it returns `Ok`
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut dyn Repository) -> EngineResult<T>,
    ) -> EngineResult<T>;
}
