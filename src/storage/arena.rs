//! In-memory arena of records
//!
//! Records live in growable arrays and an id is its record's slot plus one.
//! Nothing is ever deleted, so a lookup is a bounds-checked index.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RankingKey, Repository};
use crate::types::{
    Contestant, ContestantId, EngineError, EngineResult, Match, MatchId, NewContestant, NewMatch,
    NewPointHistory, PlacementAward, PointHistory, RecordKind, Tournament, TournamentId,
};

/// One persisted line, tagged by record type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub(crate) enum Record {
    Contestant(Contestant),
    Tournament(Tournament),
    Match(Match),
    PointHistory(PointHistory),
    Placement(PlacementAward),
    /// Closes a batch of `records` lines written by one commit
    Commit { records: usize },
}

/// Borrowed twin of `Record` for writing without cloning
#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub(crate) enum RecordRef<'a> {
    Contestant(&'a Contestant),
    Tournament(&'a Tournament),
    Match(&'a Match),
    PointHistory(&'a PointHistory),
    Placement(&'a PlacementAward),
    Commit { records: usize },
}

/// Row counts per table at one point in time
///
/// Rows at or past a mark were added after it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Marks {
    pub contestants: usize,
    pub tournaments: usize,
    pub matches: usize,
    pub point_history: usize,
    pub placements: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Arena {
    contestants: Vec<Contestant>,
    tournaments: Vec<Tournament>,
    matches: Vec<Match>,
    point_history: Vec<PointHistory>,
    placements: Vec<PlacementAward>,
    /// Match slots per tournament, in insertion order
    matches_by_tournament: HashMap<TournamentId, Vec<usize>>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contestant_count(&self) -> usize {
        self.contestants.len()
    }

    pub fn tournament_count(&self) -> usize {
        self.tournaments.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Rows across every table
    pub fn record_count(&self) -> usize {
        self.contestants.len()
            + self.tournaments.len()
            + self.matches.len()
            + self.point_history.len()
            + self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contestants.is_empty() && self.tournaments.is_empty()
    }

    /// Every record in write order
    pub(crate) fn records(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.contestants
            .iter()
            .map(RecordRef::Contestant)
            .chain(self.tournaments.iter().map(RecordRef::Tournament))
            .chain(self.matches.iter().map(RecordRef::Match))
            .chain(self.point_history.iter().map(RecordRef::PointHistory))
            .chain(self.placements.iter().map(RecordRef::Placement))
    }

    pub(crate) fn marks(&self) -> Marks {
        Marks {
            contestants: self.contestants.len(),
            tournaments: self.tournaments.len(),
            matches: self.matches.len(),
            point_history: self.point_history.len(),
            placements: self.placements.len(),
        }
    }

    /// Drop every row added after `marks` was taken
    pub(crate) fn truncate(&mut self, marks: Marks) {
        self.contestants.truncate(marks.contestants);
        self.tournaments.truncate(marks.tournaments);
        if self.matches.len() > marks.matches {
            self.matches.truncate(marks.matches);
            self.matches_by_tournament.retain(|_, slots| {
                slots.retain(|&slot| slot < marks.matches);
                !slots.is_empty()
            });
        }
        self.point_history.truncate(marks.point_history);
        self.placements.truncate(marks.placements);
    }

    /// Rows added after `marks` plus the given rewritten slots, in the
    /// order a replay needs them (tournaments before their matches)
    pub(crate) fn changed_since(
        &self,
        marks: Marks,
        contestants: impl IntoIterator<Item = usize>,
        tournaments: impl IntoIterator<Item = usize>,
        matches: impl IntoIterator<Item = usize>,
    ) -> Vec<RecordRef<'_>> {
        fn added<T>(rows: &[T], mark: usize) -> &[T] {
            rows.get(mark..).unwrap_or(&[])
        }

        let mut changed: Vec<RecordRef<'_>> = contestants
            .into_iter()
            .filter_map(|slot| self.contestants.get(slot))
            .chain(added(&self.contestants, marks.contestants))
            .map(RecordRef::Contestant)
            .collect();
        changed.extend(
            tournaments
                .into_iter()
                .filter_map(|slot| self.tournaments.get(slot))
                .chain(added(&self.tournaments, marks.tournaments))
                .map(RecordRef::Tournament),
        );
        changed.extend(
            matches
                .into_iter()
                .filter_map(|slot| self.matches.get(slot))
                .chain(added(&self.matches, marks.matches))
                .map(RecordRef::Match),
        );
        changed.extend(
            added(&self.point_history, marks.point_history)
                .iter()
                .map(RecordRef::PointHistory),
        );
        changed.extend(
            added(&self.placements, marks.placements)
                .iter()
                .map(RecordRef::Placement),
        );
        changed
    }

    /// Replay one persisted record read from `line`
    ///
    /// A record whose id is already present replaces it; the next id in
    /// sequence appends. Any other id is a gap and means the file is damaged.
    pub(crate) fn apply(&mut self, line: usize, record: Record) -> EngineResult<()> {
        let corrupt = |reason: String| EngineError::CorruptRecord { line, reason };
        let slot_for = |id: u64, len: usize| match id.checked_sub(1) {
            Some(slot) if (slot as usize) <= len => Ok(slot as usize),
            _ => Err(EngineError::CorruptRecord {
                line,
                reason: format!("expected an id up to {}, found {}", len + 1, id),
            }),
        };

        match record {
            Record::Contestant(c) => {
                let slot = slot_for(c.id.0, self.contestants.len())?;
                upsert(&mut self.contestants, slot, c);
            }
            Record::Tournament(t) => {
                let slot = slot_for(t.id.0, self.tournaments.len())?;
                upsert(&mut self.tournaments, slot, t);
            }
            Record::Match(m) => {
                let slot = slot_for(m.id.0, self.matches.len())?;
                if m.tournament_id.slot().map_or(true, |s| s >= self.tournaments.len()) {
                    return Err(corrupt(format!(
                        "match {} references unknown tournament",
                        m.id
                    )));
                }
                match self.matches.get(slot).map(|existing| existing.tournament_id) {
                    Some(tournament) if tournament != m.tournament_id => {
                        return Err(corrupt(format!("match {} changed tournament", m.id)));
                    }
                    Some(_) => self.matches[slot] = m,
                    None => {
                        self.matches_by_tournament
                            .entry(m.tournament_id)
                            .or_default()
                            .push(slot);
                        self.matches.push(m);
                    }
                }
            }
            Record::PointHistory(entry) => {
                let slot = slot_for(entry.id, self.point_history.len())?;
                upsert(&mut self.point_history, slot, entry);
            }
            Record::Placement(award) => self.placements.push(award),
            // Batch markers carry no state
            Record::Commit { .. } => {}
        }
        Ok(())
    }

    /// Rebuild an arena from persisted records
    pub(crate) fn from_records(
        records: impl IntoIterator<Item = (usize, Record)>,
    ) -> EngineResult<Self> {
        let mut arena = Arena::new();
        for (line, record) in records {
            arena.apply(line, record)?;
        }
        Ok(arena)
    }

    /// Put back a row saved before a rolled-back write
    pub(crate) fn restore_contestant(&mut self, slot: usize, row: Contestant) {
        if let Some(current) = self.contestants.get_mut(slot) {
            *current = row;
        }
    }

    pub(crate) fn restore_tournament(&mut self, slot: usize, row: Tournament) {
        if let Some(current) = self.tournaments.get_mut(slot) {
            *current = row;
        }
    }

    pub(crate) fn restore_match(&mut self, slot: usize, row: Match) {
        if let Some(current) = self.matches.get_mut(slot) {
            *current = row;
        }
    }
}

fn upsert<T>(rows: &mut Vec<T>, slot: usize, row: T) {
    match rows.get_mut(slot) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

impl Repository for Arena {
    fn contestant(&self, id: ContestantId) -> Option<Contestant> {
        id.slot().and_then(|s| self.contestants.get(s)).cloned()
    }

    fn contestants(&self) -> Vec<Contestant> {
        self.contestants.clone()
    }

    fn insert_contestant(&mut self, new: NewContestant) -> Contestant {
        let id = ContestantId::from_slot(self.contestants.len());
        let contestant = Contestant::new(id, new.name, new.nationality);
        self.contestants.push(contestant.clone());
        contestant
    }

    fn update_contestant(&mut self, contestant: Contestant) -> EngineResult<()> {
        let slot = contestant
            .id
            .slot()
            .filter(|s| *s < self.contestants.len())
            .ok_or_else(|| EngineError::not_found(RecordKind::Contestant, contestant.id))?;
        self.contestants[slot] = contestant;
        Ok(())
    }

    fn top_contestants(&self, by: RankingKey, limit: usize) -> Vec<Contestant> {
        let mut ranked: Vec<&Contestant> = self.contestants.iter().collect();
        ranked.sort_by_key(|c| (Reverse(by.score(c)), c.id));
        ranked.into_iter().take(limit).cloned().collect()
    }

    fn tournament(&self, id: TournamentId) -> Option<Tournament> {
        id.slot().and_then(|s| self.tournaments.get(s)).cloned()
    }

    fn active_tournament(&self) -> Option<Tournament> {
        self.tournaments.iter().rev().find(|t| !t.completed).cloned()
    }

    fn latest_tournament(&self) -> Option<Tournament> {
        self.tournaments.last().cloned()
    }

    fn tournaments(&self) -> Vec<Tournament> {
        self.tournaments.iter().rev().cloned().collect()
    }

    fn insert_tournament(&mut self, started_at: DateTime<Utc>) -> Tournament {
        let id = TournamentId::from_slot(self.tournaments.len());
        let tournament = Tournament::new(id, started_at);
        self.tournaments.push(tournament.clone());
        tournament
    }

    fn update_tournament(&mut self, tournament: Tournament) -> EngineResult<()> {
        let slot = tournament
            .id
            .slot()
            .filter(|s| *s < self.tournaments.len())
            .ok_or_else(|| EngineError::not_found(RecordKind::Tournament, tournament.id))?;
        self.tournaments[slot] = tournament;
        Ok(())
    }

    fn match_by_id(&self, id: MatchId) -> Option<Match> {
        id.slot().and_then(|s| self.matches.get(s)).cloned()
    }

    fn matches_by_tournament(&self, tournament: TournamentId) -> Vec<Match> {
        let mut found: Vec<Match> = self
            .matches_by_tournament
            .get(&tournament)
            .map(|slots| slots.iter().map(|&s| self.matches[s].clone()).collect())
            .unwrap_or_default();
        found.sort_by_key(|m| (m.round, m.match_number));
        found
    }

    fn matches_by_round(&self, tournament: TournamentId, round: u8) -> Vec<Match> {
        let mut found: Vec<Match> = self
            .matches_by_tournament
            .get(&tournament)
            .map(|slots| {
                slots
                    .iter()
                    .map(|&s| &self.matches[s])
                    .filter(|m| m.round == round)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by_key(|m| m.match_number);
        found
    }

    fn insert_match(&mut self, new: NewMatch) -> Match {
        let slot = self.matches.len();
        let m = Match {
            id: MatchId::from_slot(slot),
            tournament_id: new.tournament_id,
            round: new.round,
            match_number: new.match_number,
            contestant1_id: new.contestant1_id,
            contestant2_id: new.contestant2_id,
            winner_id: None,
        };
        self.matches_by_tournament
            .entry(new.tournament_id)
            .or_default()
            .push(slot);
        self.matches.push(m.clone());
        m
    }

    fn update_match(&mut self, m: Match) -> EngineResult<()> {
        let slot = m
            .id
            .slot()
            .filter(|s| *s < self.matches.len())
            .ok_or_else(|| EngineError::not_found(RecordKind::Match, m.id))?;
        self.matches[slot] = m;
        Ok(())
    }

    fn append_point_history(&mut self, entry: NewPointHistory) -> PointHistory {
        let row = PointHistory {
            id: self.point_history.len() as u64 + 1,
            contestant_id: entry.contestant_id,
            tournament_id: entry.tournament_id,
            match_id: entry.match_id,
            points_before: entry.points_before,
            points_change: entry.change(),
            points_after: entry.points_after,
            reason: entry.reason,
            created_at: entry.created_at,
        };
        self.point_history.push(row.clone());
        row
    }

    fn point_history(&self, contestant: ContestantId, limit: Option<usize>) -> Vec<PointHistory> {
        self.point_history
            .iter()
            .rev()
            .filter(|row| row.contestant_id == contestant)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn insert_placement(&mut self, award: PlacementAward) {
        self.placements.push(award);
    }

    fn placements(&self, tournament: TournamentId) -> Vec<PlacementAward> {
        self.placements
            .iter()
            .filter(|a| a.tournament_id == tournament)
            .cloned()
            .collect()
    }
}
