//! Match resolver - records one decision and the bracket mutation it triggers
//!
//! ```text
//! decide match ──► exchange points ──► round still open? ──► move pointer
//!                                      round 1-4 done    ──► create round r+1
//!                                      semi-finals done  ──► create bronze + final
//!                                      bronze decided    ──► third/fourth, point at final
//!                                      final decided     ──► podium, sweep, rotation
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use super::{referenced_contestant, rotation};
use crate::economy::{exchange, Placement};
use crate::storage::Repository;
use crate::types::{
    matches_in_round, Contestant, ContestantId, EngineError, EngineResult, Match, MatchId,
    NewMatch, NewPointHistory, PlacementAward, RecordKind, SelectWinnerOutcome, Tournament,
    TournamentId, BRONZE_MATCH, FINAL_MATCH, FINAL_ROUND, SEMIFINAL_ROUND,
};

/// What a committed decision produced
#[derive(Debug)]
pub(super) struct Resolution {
    pub outcome: SelectWinnerOutcome,
    /// Successor could not be fielded; the decision itself still stands
    pub rotation_error: Option<EngineError>,
}

pub(super) fn select_winner<R: Rng + ?Sized>(
    repo: &mut dyn Repository,
    rng: &mut R,
    match_id: MatchId,
    winner_id: ContestantId,
    now: DateTime<Utc>,
) -> EngineResult<Resolution> {
    let mut decided = repo
        .match_by_id(match_id)
        .ok_or_else(|| EngineError::not_found(RecordKind::Match, match_id))?;
    let mut tournament = repo
        .tournament(decided.tournament_id)
        .ok_or_else(|| EngineError::not_found(RecordKind::Tournament, decided.tournament_id))?;

    if decided.is_completed() {
        return Err(EngineError::AlreadyDecided { match_id });
    }
    if tournament.completed {
        return Err(EngineError::TournamentClosed {
            tournament_id: tournament.id,
        });
    }
    let loser_id = decided
        .opponent_of(winner_id)
        .ok_or(EngineError::InvalidWinner {
            match_id,
            contestant_id: winner_id,
        })?;
    if decided.is_final() {
        let bronze = find_match(repo, tournament.id, FINAL_ROUND, BRONZE_MATCH)?;
        if !bronze.is_completed() {
            return Err(EngineError::BronzePending {
                match_id: bronze.id,
            });
        }
    }

    let mut winner = referenced_contestant(repo, winner_id)?;
    let mut loser = referenced_contestant(repo, loser_id)?;

    let ex = exchange(winner.ranking_points, loser.ranking_points);
    winner.ranking_points = ex.winner_after;
    winner.matches_played += 1;
    winner.wins += 1;
    loser.ranking_points = ex.loser_after;
    loser.matches_played += 1;
    loser.losses += 1;

    repo.append_point_history(NewPointHistory {
        contestant_id: winner.id,
        tournament_id: tournament.id,
        match_id: Some(match_id),
        points_before: ex.winner_before,
        points_after: ex.winner_after,
        reason: format!("Win against {}", loser.name),
        created_at: now,
    });
    repo.append_point_history(NewPointHistory {
        contestant_id: loser.id,
        tournament_id: tournament.id,
        match_id: Some(match_id),
        points_before: ex.loser_before,
        points_after: ex.loser_after,
        reason: format!("Loss to {}", winner.name),
        created_at: now,
    });

    decided.winner_id = Some(winner_id);
    repo.update_match(decided.clone())?;
    tournament.matches_completed += 1;

    info!(
        tournament_id = %tournament.id,
        match_id = %match_id,
        round = decided.round,
        match_number = decided.match_number,
        winner = %winner.name,
        loser = %loser.name,
        winner_points = ex.winner_after,
        loser_points = ex.loser_after,
        "Decision recorded"
    );

    let mut resolution = Resolution {
        outcome: SelectWinnerOutcome {
            decided: decided.clone(),
            exchange: ex,
            next_match: None,
            tournament_changed: false,
            active_tournament: Some(tournament.id),
        },
        rotation_error: None,
    };

    if decided.round < FINAL_ROUND {
        repo.update_contestant(winner)?;
        repo.update_contestant(loser)?;
        progress_round(repo, &mut tournament, &decided)?;
        repo.update_tournament(tournament.clone())?;
        resolution.outcome.next_match = pointed_match(repo, &tournament);
    } else if decided.is_bronze() {
        tournament.third_place = Some(winner.id);
        winner.bronze_medals += 1;
        grant_placement(repo, tournament.id, &mut winner, Placement::Third);
        grant_placement(repo, tournament.id, &mut loser, Placement::Fourth);
        repo.update_contestant(winner.clone())?;
        repo.update_contestant(loser)?;

        tournament.point_to(FINAL_ROUND, FINAL_MATCH);
        repo.update_tournament(tournament.clone())?;
        info!(
            tournament_id = %tournament.id,
            third_place = %winner.name,
            "Bronze match decided"
        );
        resolution.outcome.next_match = pointed_match(repo, &tournament);
    } else {
        tournament.champion = Some(winner.id);
        tournament.runner_up = Some(loser.id);
        tournament.close(now);
        winner.gold_medals += 1;
        loser.silver_medals += 1;
        grant_placement(repo, tournament.id, &mut winner, Placement::Champion);
        grant_placement(repo, tournament.id, &mut loser, Placement::RunnerUp);
        repo.update_contestant(winner.clone())?;
        repo.update_contestant(loser)?;

        let swept = sweep_eliminations(repo, tournament.id)?;
        repo.update_tournament(tournament.clone())?;
        info!(
            tournament_id = %tournament.id,
            champion = %winner.name,
            eliminations_scored = swept,
            "Tournament completed"
        );

        match rotation::rotate(repo, rng, Some(&tournament), now) {
            Ok(successor) => {
                resolution.outcome.tournament_changed = true;
                resolution.outcome.active_tournament = Some(successor.id);
                resolution.outcome.next_match = pointed_match(repo, &successor);
            }
            Err(err @ EngineError::InsufficientRoster { .. }) => {
                warn!(
                    tournament_id = %tournament.id,
                    error = %err,
                    "No successor tournament created"
                );
                resolution.outcome.active_tournament = None;
                resolution.rotation_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(resolution)
}

/// Move the pointer within a round, or open the next stage once it is done
fn progress_round(
    repo: &mut dyn Repository,
    tournament: &mut Tournament,
    decided: &Match,
) -> EngineResult<()> {
    let round_matches = repo.matches_by_round(tournament.id, decided.round);

    if let Some(next) = next_undecided(&round_matches, decided.match_number) {
        tournament.point_to(decided.round, next);
        return Ok(());
    }

    check_round_complete(&round_matches, decided.round)?;

    if decided.round == SEMIFINAL_ROUND {
        create_finals(repo, tournament.id, &round_matches)?;
        tournament.point_to(FINAL_ROUND, BRONZE_MATCH);
    } else {
        create_next_round(repo, tournament.id, decided.round, &round_matches)?;
        tournament.point_to(decided.round + 1, 1);
    }
    Ok(())
}

/// First undecided match numbered after `after`, wrapping to the lowest
pub(super) fn next_undecided(round_matches: &[Match], after: u32) -> Option<u32> {
    let open = || round_matches.iter().filter(|m| !m.is_completed());
    open()
        .filter(|m| m.match_number > after)
        .map(|m| m.match_number)
        .min()
        .or_else(|| open().map(|m| m.match_number).min())
}

/// A finished round must hold exactly its expected matches, numbered 1..=n
fn check_round_complete(round_matches: &[Match], round: u8) -> EngineResult<()> {
    let expected = matches_in_round(round) as usize;
    if round_matches.len() != expected {
        return Err(EngineError::integrity(format!(
            "round {} holds {} matches, expected {}",
            round,
            round_matches.len(),
            expected
        )));
    }
    for (index, m) in round_matches.iter().enumerate() {
        if m.match_number as usize != index + 1 {
            return Err(EngineError::integrity(format!(
                "round {} is missing match {}",
                round,
                index + 1
            )));
        }
        if m.winner_id.is_none() {
            return Err(EngineError::integrity(format!(
                "round {} match {} has no winner",
                round, m.match_number
            )));
        }
    }
    Ok(())
}

fn winner_of(m: &Match) -> EngineResult<ContestantId> {
    m.winner_id.ok_or_else(|| {
        EngineError::integrity(format!(
            "round {} match {} has no winner",
            m.round, m.match_number
        ))
    })
}

fn loser_of(m: &Match) -> EngineResult<ContestantId> {
    m.loser_id().ok_or_else(|| {
        EngineError::integrity(format!(
            "round {} match {} has no loser",
            m.round, m.match_number
        ))
    })
}

fn ensure_round_absent(repo: &dyn Repository, tournament: TournamentId, round: u8) -> EngineResult<()> {
    if repo.matches_by_round(tournament, round).is_empty() {
        Ok(())
    } else {
        Err(EngineError::integrity(format!(
            "round {} of tournament {} already exists",
            round, tournament
        )))
    }
}

/// Pair the winners of matches 2i-1 and 2i as match i of the next round
fn create_next_round(
    repo: &mut dyn Repository,
    tournament: TournamentId,
    round: u8,
    round_matches: &[Match],
) -> EngineResult<()> {
    let next_round = round + 1;
    ensure_round_absent(repo, tournament, next_round)?;

    let winners = round_matches
        .iter()
        .map(winner_of)
        .collect::<EngineResult<Vec<_>>>()?;

    for (index, pair) in winners.chunks(2).enumerate() {
        if let [first, second] = pair {
            repo.insert_match(NewMatch {
                tournament_id: tournament,
                round: next_round,
                match_number: index as u32 + 1,
                contestant1_id: *first,
                contestant2_id: *second,
            });
        }
    }

    info!(
        tournament_id = %tournament,
        round = next_round,
        matches = winners.len() / 2,
        "Round created"
    );
    Ok(())
}

/// Bronze match between the semi-final losers, final between the winners
fn create_finals(
    repo: &mut dyn Repository,
    tournament: TournamentId,
    semifinals: &[Match],
) -> EngineResult<()> {
    ensure_round_absent(repo, tournament, FINAL_ROUND)?;

    let (first, second) = match semifinals {
        [first, second] => (first, second),
        _ => {
            return Err(EngineError::integrity(format!(
                "semi-finals hold {} matches, expected 2",
                semifinals.len()
            )))
        }
    };

    repo.insert_match(NewMatch {
        tournament_id: tournament,
        round: FINAL_ROUND,
        match_number: BRONZE_MATCH,
        contestant1_id: loser_of(first)?,
        contestant2_id: loser_of(second)?,
    });
    repo.insert_match(NewMatch {
        tournament_id: tournament,
        round: FINAL_ROUND,
        match_number: FINAL_MATCH,
        contestant1_id: winner_of(first)?,
        contestant2_id: winner_of(second)?,
    });

    info!(tournament_id = %tournament, "Bronze match and final created");
    Ok(())
}

fn find_match(
    repo: &dyn Repository,
    tournament: TournamentId,
    round: u8,
    match_number: u32,
) -> EngineResult<Match> {
    repo.matches_by_round(tournament, round)
        .into_iter()
        .find(|m| m.match_number == match_number)
        .ok_or_else(|| {
            EngineError::integrity(format!(
                "tournament {} has no round {} match {}",
                tournament, round, match_number
            ))
        })
}

fn pointed_match(repo: &dyn Repository, tournament: &Tournament) -> Option<Match> {
    repo.matches_by_round(tournament.id, tournament.current_round)
        .into_iter()
        .find(|m| m.match_number == tournament.current_match)
}

/// Award a placement unless the contestant already holds one for this
/// tournament; the caller persists the contestant
pub(super) fn grant_placement(
    repo: &mut dyn Repository,
    tournament: TournamentId,
    contestant: &mut Contestant,
    placement: Placement,
) -> bool {
    let already = repo
        .placements(tournament)
        .iter()
        .any(|award| award.contestant_id == contestant.id);
    if already {
        return false;
    }

    let points = placement.points();
    contestant.tournament_points += points;
    repo.insert_placement(PlacementAward {
        tournament_id: tournament,
        contestant_id: contestant.id,
        placement,
        points,
    });
    true
}

/// Score every contestant knocked out in rounds 1-4 who has no award yet
fn sweep_eliminations(repo: &mut dyn Repository, tournament: TournamentId) -> EngineResult<usize> {
    let mut awarded = 0;
    for m in repo.matches_by_tournament(tournament) {
        let Some(placement) = Placement::from_exit_round(m.round) else {
            continue;
        };
        let loser_id = loser_of(&m)?;
        let mut loser = referenced_contestant(repo, loser_id)?;
        if grant_placement(repo, tournament, &mut loser, placement) {
            repo.update_contestant(loser)?;
            awarded += 1;
        }
    }
    Ok(awarded)
}
