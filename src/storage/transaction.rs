//! In-place transaction over an `Arena`
//!
//! Writes go straight to the committed arena. The first rewrite of an
//! existing row saves its old value, and rows added during the transaction
//! sit past the marks taken at the start. Rolling back restores the saved
//! rows and truncates the additions, so the cost of a transaction follows
//! the rows it touches rather than the size of the store.
//!
//! A transaction that is dropped without `commit` rolls back, including
//! when the closure running it panics.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::arena::{Arena, Marks, RecordRef};
use super::{RankingKey, Repository};
use crate::types::{
    Contestant, ContestantId, EngineResult, Match, MatchId, NewContestant, NewMatch,
    NewPointHistory, PlacementAward, PointHistory, Tournament, TournamentId,
};

pub(crate) struct Transaction<'a> {
    arena: &'a mut Arena,
    marks: Marks,
    saved_contestants: BTreeMap<usize, Contestant>,
    saved_tournaments: BTreeMap<usize, Tournament>,
    saved_matches: BTreeMap<usize, Match>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(arena: &'a mut Arena) -> Self {
        let marks = arena.marks();
        Self {
            arena,
            marks,
            saved_contestants: BTreeMap::new(),
            saved_tournaments: BTreeMap::new(),
            saved_matches: BTreeMap::new(),
            committed: false,
        }
    }

    /// State as this transaction currently sees it
    pub(crate) fn arena(&self) -> &Arena {
        &*self.arena
    }

    /// Every row this transaction wrote, ready to append to a journal
    pub(crate) fn changes(&self) -> Vec<RecordRef<'_>> {
        self.arena.changed_since(
            self.marks,
            self.saved_contestants.keys().copied(),
            self.saved_tournaments.keys().copied(),
            self.saved_matches.keys().copied(),
        )
    }

    /// Keep the writes
    pub(crate) fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        for (slot, row) in std::mem::take(&mut self.saved_contestants) {
            self.arena.restore_contestant(slot, row);
        }
        for (slot, row) in std::mem::take(&mut self.saved_tournaments) {
            self.arena.restore_tournament(slot, row);
        }
        for (slot, row) in std::mem::take(&mut self.saved_matches) {
            self.arena.restore_match(slot, row);
        }
        self.arena.truncate(self.marks);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

/// Save the pre-transaction value of an existing row, once
fn save_once<T>(
    saved: &mut BTreeMap<usize, T>,
    slot: Option<usize>,
    mark: usize,
    current: impl FnOnce() -> Option<T>,
) {
    let Some(slot) = slot.filter(|s| *s < mark) else {
        return;
    };
    if let Entry::Vacant(entry) = saved.entry(slot) {
        if let Some(row) = current() {
            entry.insert(row);
        }
    }
}

impl Repository for Transaction<'_> {
    fn contestant(&self, id: ContestantId) -> Option<Contestant> {
        self.arena.contestant(id)
    }

    fn contestants(&self) -> Vec<Contestant> {
        self.arena.contestants()
    }

    fn insert_contestant(&mut self, new: NewContestant) -> Contestant {
        self.arena.insert_contestant(new)
    }

    fn update_contestant(&mut self, contestant: Contestant) -> EngineResult<()> {
        let arena = &*self.arena;
        save_once(
            &mut self.saved_contestants,
            contestant.id.slot(),
            self.marks.contestants,
            || arena.contestant(contestant.id),
        );
        self.arena.update_contestant(contestant)
    }

    fn top_contestants(&self, by: RankingKey, limit: usize) -> Vec<Contestant> {
        self.arena.top_contestants(by, limit)
    }

    fn tournament(&self, id: TournamentId) -> Option<Tournament> {
        self.arena.tournament(id)
    }

    fn active_tournament(&self) -> Option<Tournament> {
        self.arena.active_tournament()
    }

    fn latest_tournament(&self) -> Option<Tournament> {
        self.arena.latest_tournament()
    }

    fn tournaments(&self) -> Vec<Tournament> {
        self.arena.tournaments()
    }

    fn insert_tournament(&mut self, started_at: DateTime<Utc>) -> Tournament {
        self.arena.insert_tournament(started_at)
    }

    fn update_tournament(&mut self, tournament: Tournament) -> EngineResult<()> {
        let arena = &*self.arena;
        save_once(
            &mut self.saved_tournaments,
            tournament.id.slot(),
            self.marks.tournaments,
            || arena.tournament(tournament.id),
        );
        self.arena.update_tournament(tournament)
    }

    fn match_by_id(&self, id: MatchId) -> Option<Match> {
        self.arena.match_by_id(id)
    }

    fn matches_by_tournament(&self, tournament: TournamentId) -> Vec<Match> {
        self.arena.matches_by_tournament(tournament)
    }

    fn matches_by_round(&self, tournament: TournamentId, round: u8) -> Vec<Match> {
        self.arena.matches_by_round(tournament, round)
    }

    fn insert_match(&mut self, new: NewMatch) -> Match {
        self.arena.insert_match(new)
    }

    fn update_match(&mut self, m: Match) -> EngineResult<()> {
        let arena = &*self.arena;
        save_once(
            &mut self.saved_matches,
            m.id.slot(),
            self.marks.matches,
            || arena.match_by_id(m.id),
        );
        self.arena.update_match(m)
    }

    fn append_point_history(&mut self, entry: NewPointHistory) -> PointHistory {
        self.arena.append_point_history(entry)
    }

    fn point_history(&self, contestant: ContestantId, limit: Option<usize>) -> Vec<PointHistory> {
        self.arena.point_history(contestant, limit)
    }

    fn insert_placement(&mut self, award: PlacementAward) {
        self.arena.insert_placement(award)
    }

    fn placements(&self, tournament: TournamentId) -> Vec<PlacementAward> {
        self.arena.placements(tournament)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Arena {
        let mut arena = Arena::new();
        for i in 0..n {
            arena.insert_contestant(NewContestant::new(format!("P{}", i + 1)));
        }
        arena
    }

    #[test]
    fn test_drop_without_commit_restores_everything() {
        let mut arena = roster(2);
        let before = arena.contestants();
        {
            let mut tx = Transaction::begin(&mut arena);
            let mut first = tx.contestant(ContestantId(1)).unwrap();
            first.ranking_points = 1;
            tx.update_contestant(first.clone()).unwrap();
            first.ranking_points = 2;
            tx.update_contestant(first).unwrap();
            tx.insert_contestant(NewContestant::new("P3"));
            tx.insert_tournament(Utc::now());
        }
        assert_eq!(arena.contestants(), before);
        assert_eq!(arena.tournament_count(), 0);
    }

    #[test]
    fn test_commit_keeps_writes_and_lists_them_once() {
        let mut arena = roster(3);
        let mut tx = Transaction::begin(&mut arena);
        for _ in 0..2 {
            let mut third = tx.contestant(ContestantId(3)).unwrap();
            third.wins += 1;
            tx.update_contestant(third).unwrap();
        }
        let t = tx.insert_tournament(Utc::now());

        let changed = tx.changes();
        assert_eq!(changed.len(), 2);
        assert!(matches!(changed[0], RecordRef::Contestant(c) if c.wins == 2));
        assert!(matches!(changed[1], RecordRef::Tournament(x) if x.id == t.id));
        drop(changed);
        tx.commit();

        assert_eq!(arena.contestant(ContestantId(3)).unwrap().wins, 2);
        assert_eq!(arena.tournament_count(), 1);
    }

    #[test]
    fn test_rows_added_then_updated_are_not_saved() {
        let mut arena = Arena::new();
        let mut tx = Transaction::begin(&mut arena);
        let mut t = tx.insert_tournament(Utc::now());
        t.current_match = 5;
        tx.update_tournament(t).unwrap();

        // Reported once, as an addition
        assert_eq!(tx.changes().len(), 1);
        drop(tx);
        assert_eq!(arena.tournament_count(), 0);
    }
}
