//! Continuity rotation - choosing and seeding the next field
//!
//! The next field keeps the prior tournament's round-1 winners that still
//! hold points, fills up with eligible contestants who did not play that
//! tournament, and only then reuses round-1 losers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::storage::Repository;
use crate::types::{
    Contestant, ContestantId, EngineError, EngineResult, NewMatch, Tournament, FIELD_SIZE,
    FIRST_ROUND,
};

/// A chosen field and where its members came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FieldSelection {
    pub field: Vec<ContestantId>,
    pub carried_over: usize,
    pub unseen: usize,
    pub reused: usize,
}

/// Choose the next 64 contestants without touching the store
pub(super) fn select_field<R: Rng + ?Sized>(
    repo: &dyn Repository,
    prior: Option<&Tournament>,
    rng: &mut R,
) -> EngineResult<FieldSelection> {
    let eligible: Vec<Contestant> = repo
        .contestants()
        .into_iter()
        .filter(Contestant::is_eligible)
        .collect();

    let Some(prior) = prior else {
        if eligible.len() < FIELD_SIZE {
            return Err(EngineError::InsufficientRoster {
                required: FIELD_SIZE,
                available: eligible.len(),
            });
        }
        let field: Vec<ContestantId> = eligible
            .choose_multiple(rng, FIELD_SIZE)
            .map(|c| c.id)
            .collect();
        return Ok(FieldSelection {
            field,
            carried_over: 0,
            unseen: FIELD_SIZE,
            reused: 0,
        });
    };

    let eligible_ids: HashSet<ContestantId> = eligible.iter().map(|c| c.id).collect();
    let mut seen = HashSet::new();
    let mut carried = Vec::new();
    let mut fallback = Vec::new();

    for m in repo.matches_by_round(prior.id, FIRST_ROUND) {
        seen.extend(m.participants());
        match (m.winner_id, m.loser_id()) {
            (Some(winner), Some(loser)) => {
                if eligible_ids.contains(&winner) {
                    carried.push(winner);
                }
                fallback.push(loser);
            }
            // An undecided pairing: both sides count as seen and as fallback
            _ => fallback.extend(m.participants()),
        }
    }
    fallback.retain(|id| eligible_ids.contains(id));

    let remaining = FIELD_SIZE.saturating_sub(carried.len());
    let unseen: Vec<ContestantId> = eligible
        .iter()
        .map(|c| c.id)
        .filter(|id| !seen.contains(id))
        .collect();

    let mut field = carried.clone();
    let (from_unseen, reused) = if unseen.len() >= remaining {
        field.extend(unseen.choose_multiple(rng, remaining).copied());
        (remaining, 0)
    } else {
        let shortfall = remaining - unseen.len();
        field.extend(unseen.iter().copied());
        let before = field.len();
        field.extend(fallback.choose_multiple(rng, shortfall).copied());
        (unseen.len(), field.len() - before)
    };

    if field.len() < FIELD_SIZE {
        return Err(EngineError::InsufficientRoster {
            required: FIELD_SIZE,
            available: field.len(),
        });
    }

    Ok(FieldSelection {
        field,
        carried_over: carried.len(),
        unseen: from_unseen,
        reused,
    })
}

/// Start a tournament over `field`, shuffled and paired (2i, 2i+1)
pub(super) fn seed_tournament<R: Rng + ?Sized>(
    repo: &mut dyn Repository,
    rng: &mut R,
    mut field: Vec<ContestantId>,
    now: DateTime<Utc>,
) -> EngineResult<Tournament> {
    let distinct: HashSet<ContestantId> = field.iter().copied().collect();
    if field.len() != FIELD_SIZE || distinct.len() != FIELD_SIZE {
        return Err(EngineError::integrity(format!(
            "field holds {} entries, {} distinct, expected {}",
            field.len(),
            distinct.len(),
            FIELD_SIZE
        )));
    }

    for mut contestant in repo.contestants() {
        let active = distinct.contains(&contestant.id);
        if contestant.active != active {
            contestant.active = active;
            repo.update_contestant(contestant)?;
        }
    }

    field.shuffle(rng);
    let tournament = repo.insert_tournament(now);
    for (index, pair) in field.chunks(2).enumerate() {
        if let [first, second] = pair {
            repo.insert_match(NewMatch {
                tournament_id: tournament.id,
                round: FIRST_ROUND,
                match_number: index as u32 + 1,
                contestant1_id: *first,
                contestant2_id: *second,
            });
        }
    }

    Ok(tournament)
}

/// Clear the active flag of every contestant, returning how many changed
pub(super) fn retire_field(repo: &mut dyn Repository) -> EngineResult<usize> {
    let mut retired = 0;
    for mut contestant in repo.contestants() {
        if contestant.active {
            contestant.active = false;
            repo.update_contestant(contestant)?;
            retired += 1;
        }
    }
    Ok(retired)
}

/// Select and seed the successor of `prior` (or the first-ever field)
///
/// The outgoing field is retired before the draw, so a failed draw leaves no
/// contestant marked active.
pub(super) fn rotate<R: Rng + ?Sized>(
    repo: &mut dyn Repository,
    rng: &mut R,
    prior: Option<&Tournament>,
    now: DateTime<Utc>,
) -> EngineResult<Tournament> {
    let retired = retire_field(repo)?;

    let selection = match select_field(repo, prior, rng) {
        Ok(selection) => selection,
        Err(err) => {
            warn!(
                prior_tournament = ?prior.map(|t| t.id.0),
                retired,
                error = %err,
                "Cannot field the next tournament"
            );
            return Err(err);
        }
    };

    let tournament = seed_tournament(repo, rng, selection.field, now)?;
    info!(
        tournament_id = %tournament.id,
        prior_tournament = ?prior.map(|t| t.id.0),
        retired,
        carried_over = selection.carried_over,
        unseen = selection.unseen,
        reused_losers = selection.reused,
        "Tournament seeded"
    );
    Ok(tournament)
}

/// Close any active tournament without awards, then rotate from the most
/// recent tournament
pub(super) fn initialize_tournament<R: Rng + ?Sized>(
    repo: &mut dyn Repository,
    rng: &mut R,
    now: DateTime<Utc>,
) -> EngineResult<Tournament> {
    let prior = match repo.active_tournament() {
        Some(mut active) => {
            active.close(now);
            repo.update_tournament(active.clone())?;
            info!(
                tournament_id = %active.id,
                matches_completed = active.matches_completed,
                "Active tournament closed early"
            );
            Some(active)
        }
        None => repo.tournaments().into_iter().find(|t| t.completed),
    };

    rotate(repo, rng, prior.as_ref(), now)
}

/// Decide every open round-1 match at random, then initialize
///
/// The random winners move no points; they only give the continuity rule a
/// complete first round to read.
pub(super) fn force_new_tournament<R: Rng + ?Sized>(
    repo: &mut dyn Repository,
    rng: &mut R,
    now: DateTime<Utc>,
) -> EngineResult<Tournament> {
    if let Some(mut active) = repo.active_tournament() {
        let mut forced = 0;
        for mut m in repo.matches_by_round(active.id, FIRST_ROUND) {
            if m.is_completed() {
                continue;
            }
            let winner = if rng.gen_bool(0.5) {
                m.contestant1_id
            } else {
                m.contestant2_id
            };
            m.winner_id = Some(winner);
            repo.update_match(m)?;
            forced += 1;
        }

        if forced > 0 {
            active.matches_completed += forced;
            repo.update_tournament(active.clone())?;
            info!(
                tournament_id = %active.id,
                forced_matches = forced,
                "Open first-round matches decided at random"
            );
        }
    }

    initialize_tournament(repo, rng, now)
}
