//! Read-model projections: current match, bracket, progress

use crate::storage::{RankingKey, Repository};
use crate::types::{
    round_label, BracketMatchView, BracketRound, BracketView, Contestant, ContestantBrief,
    ContestantId, CurrentMatchView, EngineError, EngineResult, Match, MatchContestantView,
    ProgressView, RecordKind, Tournament, TournamentId, BRONZE_MATCH, FINAL_MATCH, FINAL_ROUND,
    FIRST_ROUND, TOTAL_MATCHES,
};

use super::referenced_contestant;

/// Leaderboard depth that carries a rank
const RANKED_DEPTH: usize = 100;

/// Resolve the tournament's pointer to a match
///
/// In round 6 the pointer may still name a decided bronze match while the
/// final waits, so an open match of that round wins over a decided one.
pub(crate) fn current_match(repo: &dyn Repository, tournament: &Tournament) -> Option<Match> {
    let round = repo.matches_by_round(tournament.id, tournament.current_round);
    let pointed = round
        .iter()
        .find(|m| m.match_number == tournament.current_match)
        .cloned();

    if tournament.current_round != FINAL_ROUND {
        return pointed;
    }

    match pointed {
        Some(m) if !m.is_completed() => Some(m),
        pointed => round
            .iter()
            .filter(|m| m.match_number == BRONZE_MATCH || m.match_number == FINAL_MATCH)
            .find(|m| !m.is_completed())
            .cloned()
            .or(pointed),
    }
}

pub(super) fn current_match_data(repo: &dyn Repository) -> EngineResult<Option<CurrentMatchView>> {
    let Some(tournament) = repo.active_tournament() else {
        return Ok(None);
    };
    let Some(m) = current_match(repo, &tournament) else {
        return Ok(None);
    };

    let leaderboard: Vec<ContestantId> = repo
        .top_contestants(RankingKey::RankingPoints, RANKED_DEPTH)
        .iter()
        .map(|c| c.id)
        .collect();
    let describe = |c: Contestant| MatchContestantView {
        rank: leaderboard.iter().position(|id| *id == c.id).map(|p| p + 1),
        id: c.id,
        name: c.name,
        nationality: c.nationality,
        ranking_points: c.ranking_points,
        image_urls: Vec::new(),
    };

    let contestant1 = describe(referenced_contestant(repo, m.contestant1_id)?);
    let contestant2 = describe(referenced_contestant(repo, m.contestant2_id)?);

    Ok(Some(CurrentMatchView {
        match_id: m.id,
        tournament_id: tournament.id,
        round: m.round,
        match_number: m.match_number,
        round_name: round_label(m.round, m.match_number),
        contestant1,
        contestant2,
    }))
}

pub(super) fn tournament_bracket(
    repo: &dyn Repository,
    id: TournamentId,
) -> EngineResult<BracketView> {
    let tournament = repo
        .tournament(id)
        .ok_or_else(|| EngineError::not_found(RecordKind::Tournament, id))?;

    let brief = |id: ContestantId| repo.contestant(id).as_ref().map(ContestantBrief::from);
    let mut rounds: Vec<BracketRound> = Vec::new();

    for m in repo.matches_by_tournament(tournament.id) {
        let name = round_label(m.round, m.match_number);
        let cell = BracketMatchView {
            id: m.id,
            round: m.round,
            match_number: m.match_number,
            contestant1: brief(m.contestant1_id),
            contestant2: brief(m.contestant2_id),
            winner: m.winner_id.and_then(brief),
            completed: m.is_completed(),
        };

        // Round 6 splits into two groups because its labels differ
        match rounds.last_mut() {
            Some(group) if group.round == m.round && group.name == name => group.matches.push(cell),
            _ => rounds.push(BracketRound {
                round: m.round,
                name,
                matches: vec![cell],
            }),
        }
    }

    Ok(BracketView {
        tournament_id: tournament.id,
        rounds,
    })
}

pub(super) fn tournament_progress(
    repo: &dyn Repository,
    id: TournamentId,
) -> EngineResult<ProgressView> {
    let tournament = repo
        .tournament(id)
        .ok_or_else(|| EngineError::not_found(RecordKind::Tournament, id))?;

    let completed_matches = repo
        .matches_by_tournament(tournament.id)
        .iter()
        .filter(|m| m.is_completed())
        .count() as u32;

    let round_name = if tournament.completed {
        "Completed".to_string()
    } else {
        match current_match(repo, &tournament) {
            Some(m) => round_label(m.round, m.match_number),
            None => round_label(tournament.current_round.max(FIRST_ROUND), tournament.current_match),
        }
    };

    Ok(ProgressView {
        tournament_id: tournament.id,
        total_matches: TOTAL_MATCHES,
        completed_matches,
        current_round: tournament.current_round,
        current_match: tournament.current_match,
        round_name,
        percent_complete: completed_matches * 100 / TOTAL_MATCHES,
        tournament_completed: tournament.completed,
    })
}
