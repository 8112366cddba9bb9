//! Tournament Engine - bracket progression over a `Store`
//!
//! This module composes the match resolver, continuity rotation and the
//! read-model projections into the operations callers use. Every mutating
//! operation runs inside one store transaction, so a decision and whatever
//! it cascades into (next round, finals, successor tournament) commit
//! together.

mod advance;
mod resolver;
mod roster;
mod rotation;
mod views;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::storage::{Repository, Store};
use crate::types::{
    BracketView, Contestant, ContestantId, ContestantPatch, CurrentMatchView, EngineError,
    EngineResult, Match, MatchId, NewContestant, PlacementAward, PointHistory, ProgressView,
    RecordKind, SelectWinnerOutcome, Tournament, TournamentId, TournamentSummary,
};

pub use roster::PerformerHistory;

/// Single engine implementation, parameterized over its persistence
pub struct TournamentEngine<S: Store> {
    store: S,
    rng: Mutex<StdRng>,
}

impl<S: Store> TournamentEngine<S> {
    /// Engine drawing fields from OS entropy
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Engine whose draws and shuffles are reproducible
    pub fn with_seed(store: S, seed: u64) -> Self {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(store: S, rng: StdRng) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

// Bracket lifecycle (resolver.rs, rotation.rs, advance.rs)
impl<S: Store> TournamentEngine<S> {
    /// Complete any active tournament and start a fresh one
    pub fn initialize_tournament(&self) -> EngineResult<Tournament> {
        self.store.transaction(|repo| {
            let mut rng = self.rng.lock();
            rotation::initialize_tournament(repo, &mut *rng, Utc::now())
        })
    }

    /// Decide the active tournament's unfinished first round at random, then
    /// start a fresh one
    pub fn force_new_tournament(&self) -> EngineResult<Tournament> {
        self.store.transaction(|repo| {
            let mut rng = self.rng.lock();
            rotation::force_new_tournament(repo, &mut *rng, Utc::now())
        })
    }

    /// The active tournament, initializing one if none exists
    pub fn ensure_active_tournament(&self) -> EngineResult<Tournament> {
        if let Some(active) = self.store.read(|repo| repo.active_tournament()) {
            return Ok(active);
        }
        self.store.transaction(|repo| {
            if let Some(active) = repo.active_tournament() {
                return Ok(active);
            }
            let mut rng = self.rng.lock();
            rotation::initialize_tournament(repo, &mut *rng, Utc::now())
        })
    }

    /// Record the winner of a match
    ///
    /// When the decision completes the tournament but the roster cannot
    /// field a successor, the completion is still committed and
    /// `InsufficientRoster` is returned afterwards.
    pub fn select_winner(
        &self,
        match_id: MatchId,
        winner_id: ContestantId,
    ) -> EngineResult<SelectWinnerOutcome> {
        let resolution = self.store.transaction(|repo| {
            let mut rng = self.rng.lock();
            resolver::select_winner(repo, &mut *rng, match_id, winner_id, Utc::now())
        })?;

        match resolution.rotation_error {
            Some(err) => Err(err),
            None => Ok(resolution.outcome),
        }
    }

    /// Point the active tournament at its next undecided match
    pub fn advance_to_next_match(&self) -> EngineResult<Option<Match>> {
        let settled = self.store.read(|repo| advance::pointer_is_settled(repo));
        if let Some(current) = settled {
            return Ok(current);
        }
        self.store.transaction(advance::advance_to_next_match)
    }
}

// Read models (views.rs)
impl<S: Store> TournamentEngine<S> {
    pub fn active_tournament(&self) -> Option<Tournament> {
        self.store.read(|repo| repo.active_tournament())
    }

    pub fn tournament(&self, id: TournamentId) -> EngineResult<Tournament> {
        self.store.read(|repo| {
            repo.tournament(id)
                .ok_or_else(|| EngineError::not_found(RecordKind::Tournament, id))
        })
    }

    pub fn current_match(&self) -> Option<Match> {
        self.store.read(|repo| {
            let tournament = repo.active_tournament()?;
            views::current_match(repo, &tournament)
        })
    }

    pub fn current_match_data(&self) -> EngineResult<Option<CurrentMatchView>> {
        self.store.read(views::current_match_data)
    }

    pub fn tournament_bracket(&self, id: TournamentId) -> EngineResult<BracketView> {
        self.store.read(|repo| views::tournament_bracket(repo, id))
    }

    pub fn tournament_progress(&self, id: TournamentId) -> EngineResult<ProgressView> {
        self.store.read(|repo| views::tournament_progress(repo, id))
    }
}

// Roster administration and statistics (roster.rs)
impl<S: Store> TournamentEngine<S> {
    /// Create roster entries, skipping names already present
    pub fn seed_roster(&self, entries: Vec<NewContestant>) -> EngineResult<Vec<Contestant>> {
        self.store
            .transaction(|repo| Ok(roster::seed_roster(repo, entries)))
    }

    pub fn add_contestant(&self, new: NewContestant) -> EngineResult<Contestant> {
        self.store
            .transaction(|repo| roster::add_contestant(repo, new))
    }

    pub fn update_contestant(
        &self,
        id: ContestantId,
        patch: ContestantPatch,
    ) -> EngineResult<Contestant> {
        self.store
            .transaction(|repo| roster::update_contestant(repo, id, patch))
    }

    pub fn contestant(&self, id: ContestantId) -> EngineResult<Contestant> {
        self.store.read(|repo| require_contestant(repo, id))
    }

    pub fn contestants(&self) -> Vec<Contestant> {
        self.store.read(|repo| repo.contestants())
    }

    /// Contestants in the current field
    pub fn active_contestants(&self) -> Vec<Contestant> {
        self.store.read(roster::active_contestants)
    }

    /// Leaderboard by ranking points
    pub fn ranking(&self, limit: usize) -> Vec<Contestant> {
        self.store.read(|repo| roster::ranking(repo, limit))
    }

    /// Leaderboard by cumulative tournament points
    pub fn tournament_ranking(&self, limit: usize) -> Vec<Contestant> {
        self.store.read(|repo| roster::tournament_ranking(repo, limit))
    }

    pub fn general_stats(&self) -> Vec<Contestant> {
        self.store.read(roster::general_stats)
    }

    pub fn point_history(
        &self,
        contestant: ContestantId,
        limit: Option<usize>,
    ) -> EngineResult<Vec<PointHistory>> {
        self.store
            .read(|repo| roster::point_history(repo, contestant, limit))
    }

    pub fn top_performers_history(
        &self,
        limit: usize,
        per_contestant: usize,
    ) -> Vec<PerformerHistory> {
        self.store
            .read(|repo| roster::top_performers_history(repo, limit, per_contestant))
    }

    pub fn tournament_history(&self) -> Vec<TournamentSummary> {
        self.store.read(roster::tournament_history)
    }

    pub fn placements(&self, tournament: TournamentId) -> EngineResult<Vec<PlacementAward>> {
        self.store.read(|repo| roster::placements(repo, tournament))
    }
}

/// Look up a contestant a caller asked for by id
pub(crate) fn require_contestant(
    repo: &dyn Repository,
    id: ContestantId,
) -> EngineResult<Contestant> {
    repo.contestant(id)
        .ok_or_else(|| EngineError::not_found(RecordKind::Contestant, id))
}

/// Look up a contestant a stored record refers to
///
/// A dangling reference means the bracket is corrupt, not that the caller
/// made a mistake.
pub(crate) fn referenced_contestant(
    repo: &dyn Repository,
    id: ContestantId,
) -> EngineResult<Contestant> {
    repo.contestant(id)
        .ok_or_else(|| EngineError::integrity(format!("contestant {} is referenced but missing", id)))
}
