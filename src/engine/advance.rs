//! Pointer re-synchronization
//!
//! `select_winner` already moves the pointer, so calling this right after a
//! decision is a no-op. It only writes when the pointer names a decided or
//! missing match.

use tracing::debug;

use super::resolver::next_undecided;
use super::views::current_match;
use crate::storage::Repository;
use crate::types::{EngineResult, Match, Tournament};

/// `Some(answer)` when the pointer needs no correction
pub(super) fn pointer_is_settled(repo: &dyn Repository) -> Option<Option<Match>> {
    let Some(tournament) = repo.active_tournament() else {
        return Some(None);
    };
    match current_match(repo, &tournament) {
        Some(m) if !m.is_completed() => Some(Some(m)),
        _ => None,
    }
}

pub(super) fn advance_to_next_match(repo: &mut dyn Repository) -> EngineResult<Option<Match>> {
    let Some(mut tournament) = repo.active_tournament() else {
        return Ok(None);
    };
    if let Some(m) = current_match(repo, &tournament) {
        if !m.is_completed() {
            return Ok(Some(m));
        }
    }

    let Some(next) = first_open_match(repo, &tournament) else {
        return Ok(None);
    };

    debug!(
        tournament_id = %tournament.id,
        from_round = tournament.current_round,
        from_match = tournament.current_match,
        to_round = next.round,
        to_match = next.match_number,
        "Pointer moved"
    );
    tournament.point_to(next.round, next.match_number);
    repo.update_tournament(tournament)?;
    Ok(Some(next))
}

/// Next open match in the pointer's round, else the earliest open match of
/// a later round
fn first_open_match(repo: &dyn Repository, tournament: &Tournament) -> Option<Match> {
    let round = repo.matches_by_round(tournament.id, tournament.current_round);
    if let Some(number) = next_undecided(&round, tournament.current_match) {
        return round.into_iter().find(|m| m.match_number == number);
    }

    repo.matches_by_tournament(tournament.id)
        .into_iter()
        .find(|m| m.round > tournament.current_round && !m.is_completed())
}
