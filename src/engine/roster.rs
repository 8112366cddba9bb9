//! Roster administration and statistics

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use super::require_contestant;
use crate::storage::{RankingKey, Repository};
use crate::types::{
    Contestant, ContestantBrief, ContestantId, ContestantPatch, EngineError, EngineResult,
    NewContestant, PlacementAward, PointHistory, RecordKind, TournamentId, TournamentSummary,
};

/// Recent point movements of one leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerHistory {
    pub contestant: ContestantBrief,
    pub history: Vec<PointHistory>,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn clean_name(name: &str) -> EngineResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "contestant name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn clean_nationality(nationality: Option<String>) -> Option<String> {
    nationality
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

pub(super) fn seed_roster(repo: &mut dyn Repository, entries: Vec<NewContestant>) -> Vec<Contestant> {
    let mut known: HashSet<String> = repo.contestants().iter().map(|c| name_key(&c.name)).collect();
    let mut created = Vec::new();

    for entry in entries {
        let Ok(name) = clean_name(&entry.name) else {
            continue;
        };
        if !known.insert(name_key(&name)) {
            continue;
        }
        created.push(repo.insert_contestant(NewContestant {
            name,
            nationality: clean_nationality(entry.nationality),
        }));
    }

    if !created.is_empty() {
        info!(created = created.len(), "Roster seeded");
    }
    created
}

pub(super) fn add_contestant(repo: &mut dyn Repository, new: NewContestant) -> EngineResult<Contestant> {
    let name = clean_name(&new.name)?;
    let key = name_key(&name);
    if repo.contestants().iter().any(|c| name_key(&c.name) == key) {
        return Err(EngineError::InvalidInput(format!(
            "a contestant named '{}' already exists",
            name
        )));
    }

    let contestant = repo.insert_contestant(NewContestant {
        name,
        nationality: clean_nationality(new.nationality),
    });
    info!(contestant_id = %contestant.id, name = %contestant.name, "Contestant added");
    Ok(contestant)
}

pub(super) fn update_contestant(
    repo: &mut dyn Repository,
    id: ContestantId,
    patch: ContestantPatch,
) -> EngineResult<Contestant> {
    let mut contestant = require_contestant(repo, id)?;

    if let Some(name) = patch.name {
        let name = clean_name(&name)?;
        let key = name_key(&name);
        let taken = repo
            .contestants()
            .iter()
            .any(|c| c.id != id && name_key(&c.name) == key);
        if taken {
            return Err(EngineError::InvalidInput(format!(
                "a contestant named '{}' already exists",
                name
            )));
        }
        contestant.name = name;
    }
    if let Some(nationality) = patch.nationality {
        contestant.nationality = clean_nationality(Some(nationality));
    }

    repo.update_contestant(contestant.clone())?;
    Ok(contestant)
}

pub(super) fn active_contestants(repo: &dyn Repository) -> Vec<Contestant> {
    repo.contestants()
        .into_iter()
        .filter(|c| c.active && c.is_eligible())
        .collect()
}

pub(super) fn ranking(repo: &dyn Repository, limit: usize) -> Vec<Contestant> {
    repo.top_contestants(RankingKey::RankingPoints, limit)
}

pub(super) fn tournament_ranking(repo: &dyn Repository, limit: usize) -> Vec<Contestant> {
    repo.top_contestants(RankingKey::TournamentPoints, limit)
}

/// Every contestant, most wins first, then ranking points
pub(super) fn general_stats(repo: &dyn Repository) -> Vec<Contestant> {
    let mut all = repo.contestants();
    all.sort_by_key(|c| (Reverse(c.wins), Reverse(c.ranking_points), c.id));
    all
}

pub(super) fn point_history(
    repo: &dyn Repository,
    contestant: ContestantId,
    limit: Option<usize>,
) -> EngineResult<Vec<PointHistory>> {
    require_contestant(repo, contestant)?;
    Ok(repo.point_history(contestant, limit))
}

pub(super) fn top_performers_history(
    repo: &dyn Repository,
    limit: usize,
    per_contestant: usize,
) -> Vec<PerformerHistory> {
    repo.top_contestants(RankingKey::RankingPoints, limit)
        .iter()
        .map(|c| PerformerHistory {
            contestant: ContestantBrief::from(c),
            history: repo.point_history(c.id, Some(per_contestant)),
        })
        .collect()
}

pub(super) fn tournament_history(repo: &dyn Repository) -> Vec<TournamentSummary> {
    let brief = |id: Option<ContestantId>| {
        id.and_then(|id| repo.contestant(id))
            .as_ref()
            .map(ContestantBrief::from)
    };

    repo.tournaments()
        .into_iter()
        .map(|t| TournamentSummary {
            id: t.id,
            started_at: t.started_at,
            ended_at: t.ended_at,
            completed: t.completed,
            matches_completed: t.matches_completed,
            champion: brief(t.champion),
            runner_up: brief(t.runner_up),
            third_place: brief(t.third_place),
        })
        .collect()
}

pub(super) fn placements(
    repo: &dyn Repository,
    tournament: TournamentId,
) -> EngineResult<Vec<PlacementAward>> {
    if repo.tournament(tournament).is_none() {
        return Err(EngineError::not_found(RecordKind::Tournament, tournament));
    }
    Ok(repo.placements(tournament))
}
