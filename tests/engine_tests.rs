//! Integration tests for the tournament engine over the in-memory store

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use bracket_engine::economy::Placement;
use bracket_engine::storage::{MemoryStore, Repository, Store};
use bracket_engine::types::{
    ContestantId, EngineError, NewContestant, SelectWinnerOutcome, FINAL_ROUND,
};
use bracket_engine::TournamentEngine;

static SEED_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Engine over `roster` fresh contestants with a distinct seed per test
fn setup_engine(roster: usize) -> TournamentEngine<MemoryStore> {
    let seed = SEED_COUNTER.fetch_add(1, Ordering::SeqCst);
    let engine = TournamentEngine::with_seed(MemoryStore::new(), seed);
    let entries = (1..=roster)
        .map(|i| NewContestant::new(format!("Contestant {:03}", i)))
        .collect();
    engine.seed_roster(entries).unwrap();
    engine
}

/// Decide the current match in favour of its first participant
fn decide_next(engine: &TournamentEngine<MemoryStore>) -> SelectWinnerOutcome {
    let m = engine.current_match().expect("an open match");
    engine.select_winner(m.id, m.contestant1_id).unwrap()
}

fn decide_many(engine: &TournamentEngine<MemoryStore>, count: usize) {
    for _ in 0..count {
        decide_next(engine);
    }
}

/// Decisions needed to reach the bronze match (rounds 1-5)
const TO_BRONZE: usize = 32 + 16 + 8 + 4 + 2;

fn set_points(engine: &TournamentEngine<MemoryStore>, id: ContestantId, points: u64) {
    engine
        .store()
        .transaction(|repo| {
            let mut c = repo.contestant(id).unwrap();
            c.ranking_points = points;
            repo.update_contestant(c)
        })
        .unwrap();
}

#[test]
fn test_scenario_a_equal_points_exchange() {
    let engine = setup_engine(64);
    engine.initialize_tournament().unwrap();

    let m = engine.current_match().unwrap();
    let outcome = engine.select_winner(m.id, m.contestant2_id).unwrap();
    assert_eq!(outcome.decided.winner_id, Some(m.contestant2_id));

    let winner = engine.contestant(m.contestant2_id).unwrap();
    let loser = engine.contestant(m.contestant1_id).unwrap();
    assert_eq!(winner.ranking_points, 1100);
    assert_eq!(loser.ranking_points, 900);
    assert_eq!((winner.wins, winner.matches_played), (1, 1));
    assert_eq!((loser.losses, loser.matches_played), (1, 1));

    let winner_rows = engine.point_history(winner.id, None).unwrap();
    let loser_rows = engine.point_history(loser.id, None).unwrap();
    assert_eq!(winner_rows.len(), 1);
    assert_eq!(loser_rows.len(), 1);
    assert_eq!((winner_rows[0].points_before, winner_rows[0].points_after), (1000, 1100));
    assert_eq!((loser_rows[0].points_before, loser_rows[0].points_after), (1000, 900));
    assert_eq!(loser_rows[0].points_change, -100);
    assert_eq!(winner_rows[0].match_id, Some(m.id));
}

#[test]
fn test_scenario_b_first_tournament() {
    let engine = setup_engine(70);
    let tournament = engine.initialize_tournament().unwrap();

    assert_eq!(engine.active_contestants().len(), 64);
    assert_eq!((tournament.current_round, tournament.current_match), (1, 1));

    let bracket = engine.tournament_bracket(tournament.id).unwrap();
    assert_eq!(bracket.rounds.len(), 1);
    let first_round = &bracket.rounds[0];
    assert_eq!(first_round.name, "Round of 64");
    assert_eq!(first_round.matches.len(), 32);
    assert!(first_round.matches.iter().all(|m| !m.completed));

    let players: HashSet<ContestantId> = first_round
        .matches
        .iter()
        .flat_map(|m| [m.contestant1.as_ref().unwrap().id, m.contestant2.as_ref().unwrap().id])
        .collect();
    assert_eq!(players.len(), 64);
}

#[test]
fn test_scenario_c_quarter_finals_open_semi_finals() {
    let engine = setup_engine(64);
    let tournament = engine.initialize_tournament().unwrap();

    decide_many(&engine, 32 + 16 + 8 + 3);
    let t = engine.tournament(tournament.id).unwrap();
    assert_eq!((t.current_round, t.current_match), (4, 4));

    let outcome = decide_next(&engine);
    assert!(!outcome.tournament_changed);
    let t = engine.tournament(tournament.id).unwrap();
    assert_eq!((t.current_round, t.current_match), (5, 1));

    let semis = engine.store().read(|repo| repo.matches_by_round(tournament.id, 5));
    assert_eq!(semis.len(), 2);
    let quarters = engine.store().read(|repo| repo.matches_by_round(tournament.id, 4));
    assert_eq!(semis[0].contestant1_id, quarters[0].winner_id.unwrap());
    assert_eq!(semis[0].contestant2_id, quarters[1].winner_id.unwrap());
    assert_eq!(semis[1].contestant2_id, quarters[3].winner_id.unwrap());
}

#[test]
fn test_scenario_d_semi_finals_open_bronze_and_final() {
    let engine = setup_engine(64);
    let tournament = engine.initialize_tournament().unwrap();

    decide_many(&engine, TO_BRONZE - 1);
    assert!(engine
        .store()
        .read(|repo| repo.matches_by_round(tournament.id, FINAL_ROUND))
        .is_empty());

    let outcome = decide_next(&engine);
    let next = outcome.next_match.unwrap();
    assert!(next.is_bronze());

    let semis = engine.store().read(|repo| repo.matches_by_round(tournament.id, 5));
    let finals = engine
        .store()
        .read(|repo| repo.matches_by_round(tournament.id, FINAL_ROUND));
    assert_eq!(finals.len(), 2);
    assert_eq!(finals[0].participants(), [semis[0].loser_id().unwrap(), semis[1].loser_id().unwrap()]);
    assert_eq!(finals[1].participants(), [semis[0].winner_id.unwrap(), semis[1].winner_id.unwrap()]);

    let t = engine.tournament(tournament.id).unwrap();
    assert_eq!((t.current_round, t.current_match), (6, 1));

    let view = engine.current_match_data().unwrap().unwrap();
    assert_eq!(view.round_name, "Bronze Match");
    let progress = engine.tournament_progress(tournament.id).unwrap();
    assert_eq!(progress.completed_matches, 62);
    assert_eq!(progress.percent_complete, 96);
}

#[test]
fn test_final_waits_for_bronze() {
    let engine = setup_engine(64);
    let tournament = engine.initialize_tournament().unwrap();
    decide_many(&engine, TO_BRONZE);

    let final_match = engine
        .store()
        .read(|repo| repo.matches_by_round(tournament.id, FINAL_ROUND))
        .into_iter()
        .find(|m| m.is_final())
        .unwrap();
    let err = engine
        .select_winner(final_match.id, final_match.contestant1_id)
        .unwrap_err();
    assert!(matches!(err, EngineError::BronzePending { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn test_scenario_e_final_completes_and_rotates() {
    let engine = setup_engine(64);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, TO_BRONZE);

    let bronze_outcome = decide_next(&engine);
    assert!(bronze_outcome.next_match.unwrap().is_final());
    let bronze_winner = bronze_outcome.decided.winner_id.unwrap();

    let final_match = engine.current_match().unwrap();
    assert!(final_match.is_final());
    let outcome = engine
        .select_winner(final_match.id, final_match.contestant2_id)
        .unwrap();

    assert!(outcome.tournament_changed);
    let successor = outcome.active_tournament.unwrap();
    assert_ne!(successor, first.id);

    let closed = engine.tournament(first.id).unwrap();
    assert!(closed.completed);
    assert!(closed.ended_at.is_some());
    assert_eq!(closed.champion, Some(final_match.contestant2_id));
    assert_eq!(closed.runner_up, Some(final_match.contestant1_id));
    assert_eq!(closed.third_place, Some(bronze_winner));
    assert_eq!(closed.matches_completed, 64);
    assert_eq!(
        engine.store().read(|repo| repo.matches_by_tournament(first.id).len()),
        64
    );

    let active = engine.active_tournament().unwrap();
    assert_eq!(active.id, successor);
    let fresh = engine.store().read(|repo| repo.matches_by_tournament(successor));
    assert_eq!(fresh.len(), 32);
    assert!(fresh.iter().all(|m| m.round == 1 && !m.is_completed()));

    let champion = engine.contestant(final_match.contestant2_id).unwrap();
    assert_eq!(champion.gold_medals, 1);
    assert_eq!(champion.tournament_points, 50);
    assert_eq!(engine.contestant(bronze_winner).unwrap().bronze_medals, 1);

    let history = engine.tournament_history();
    assert_eq!(history[0].id, successor);
    assert_eq!(history[1].champion.as_ref().unwrap().id, champion.id);
}

#[test]
fn test_every_contestant_placed_exactly_once() {
    let engine = setup_engine(64);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, 64);

    let awards = engine.placements(first.id).unwrap();
    assert_eq!(awards.len(), 64);
    let placed: HashSet<ContestantId> = awards.iter().map(|a| a.contestant_id).collect();
    assert_eq!(placed.len(), 64);

    let count = |p: Placement| awards.iter().filter(|a| a.placement == p).count();
    assert_eq!(count(Placement::RoundOf64), 32);
    assert_eq!(count(Placement::RoundOf32), 16);
    assert_eq!(count(Placement::RoundOf16), 8);
    assert_eq!(count(Placement::QuarterFinal), 4);
    for podium in [Placement::Fourth, Placement::Third, Placement::RunnerUp, Placement::Champion] {
        assert_eq!(count(podium), 1);
    }
    assert!(awards.iter().all(|a| a.points == a.placement.points()));

    let total: u64 = engine.contestants().iter().map(|c| c.tournament_points).sum();
    assert_eq!(total, 32 * 10 + 16 * 15 + 8 * 20 + 4 * 25 + 30 + 35 + 40 + 50);
}

#[test]
fn test_redecision_is_rejected_without_side_effects() {
    let engine = setup_engine(64);
    engine.initialize_tournament().unwrap();

    let m = engine.current_match().unwrap();
    engine.select_winner(m.id, m.contestant1_id).unwrap();
    let before = engine.contestants();

    let err = engine.select_winner(m.id, m.contestant2_id).unwrap_err();
    assert!(matches!(err, EngineError::AlreadyDecided { match_id } if match_id == m.id));

    assert_eq!(engine.contestants(), before);
    assert_eq!(engine.point_history(m.contestant1_id, None).unwrap().len(), 1);
    assert_eq!(engine.point_history(m.contestant2_id, None).unwrap().len(), 1);
}

#[test]
fn test_winner_must_play_in_match() {
    let engine = setup_engine(64);
    engine.initialize_tournament().unwrap();
    let m = engine.current_match().unwrap();

    let outsider = engine
        .contestants()
        .into_iter()
        .find(|c| !m.involves(c.id))
        .unwrap();
    let err = engine.select_winner(m.id, outsider.id).unwrap_err();
    assert!(matches!(err, EngineError::InvalidWinner { .. }));
    assert!(engine.current_match().unwrap().winner_id.is_none());
}

#[test]
fn test_concurrent_decisions_accept_exactly_one() {
    let engine = Arc::new(setup_engine(64));
    engine.initialize_tournament().unwrap();
    let m = engine.current_match().unwrap();
    let match_id = m.id;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let winner = if i % 2 == 0 { m.contestant1_id } else { m.contestant2_id };
            thread::spawn(move || engine.select_winner(match_id, winner))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, EngineError::AlreadyDecided { .. })));

    let rows = engine.point_history(m.contestant1_id, None).unwrap().len()
        + engine.point_history(m.contestant2_id, None).unwrap().len();
    assert_eq!(rows, 2);
}

#[test]
fn test_advance_after_decision_is_a_no_op() {
    let engine = setup_engine(64);
    let tournament = engine.initialize_tournament().unwrap();

    let outcome = decide_next(&engine);
    let advanced = engine.advance_to_next_match().unwrap().unwrap();
    assert_eq!(Some(advanced.clone()), outcome.next_match);
    assert_eq!(engine.advance_to_next_match().unwrap().unwrap(), advanced);

    let t = engine.tournament(tournament.id).unwrap();
    assert_eq!((t.current_round, t.current_match), (1, 2));
}

#[test]
fn test_rotation_keeps_round_one_winners() {
    let engine = setup_engine(100);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, 64);

    let winners: Vec<ContestantId> = engine
        .store()
        .read(|repo| repo.matches_by_round(first.id, 1))
        .iter()
        .map(|m| m.winner_id.unwrap())
        .collect();
    let active: HashSet<ContestantId> = engine.active_contestants().iter().map(|c| c.id).collect();

    assert_eq!(active.len(), 64);
    assert!(winners.iter().all(|w| active.contains(w)));

    // 36 contestants sat out the first tournament; 32 of them fill the field
    let first_players: HashSet<ContestantId> = engine
        .store()
        .read(|repo| repo.matches_by_round(first.id, 1))
        .iter()
        .flat_map(|m| m.participants())
        .collect();
    let newcomers = active.iter().filter(|id| !first_players.contains(id)).count();
    assert_eq!(newcomers, 32);
}

#[test]
fn test_initialize_with_small_roster_changes_nothing() {
    let engine = setup_engine(40);
    let err = engine.initialize_tournament().unwrap_err();
    assert!(matches!(
        err,
        EngineError::InsufficientRoster {
            required: 64,
            available: 40
        }
    ));
    assert!(err.is_fatal());
    assert!(engine.active_tournament().is_none());
    assert!(engine.active_contestants().is_empty());
    assert!(engine.tournament_history().is_empty());
}

#[test]
fn test_final_with_roster_shortfall_still_completes() {
    let engine = setup_engine(64);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, 32);

    // Knock one round-1 loser out of the fallback pool
    let loser = engine
        .store()
        .read(|repo| repo.matches_by_round(first.id, 1))[0]
        .loser_id()
        .unwrap();
    set_points(&engine, loser, 0);

    decide_many(&engine, 31);
    let final_match = engine.current_match().unwrap();
    let err = engine
        .select_winner(final_match.id, final_match.contestant1_id)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InsufficientRoster { available: 63, .. }
    ));

    let closed = engine.tournament(first.id).unwrap();
    assert!(closed.completed);
    assert_eq!(closed.champion, Some(final_match.contestant1_id));
    assert_eq!(engine.placements(first.id).unwrap().len(), 64);
    assert!(engine.active_tournament().is_none());
    // With no tournament running, nobody is in a field
    assert!(engine.contestants().iter().all(|c| !c.active));

    // A new contestant makes the next field possible again
    engine
        .add_contestant(NewContestant::new("Late Entry"))
        .unwrap();
    let next = engine.ensure_active_tournament().unwrap();
    assert_ne!(next.id, first.id);
    assert_eq!(engine.active_contestants().len(), 64);
}

#[test]
fn test_force_new_tournament_mid_round() {
    let engine = setup_engine(64);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, 5);
    let points_before: Vec<u64> = engine.contestants().iter().map(|c| c.ranking_points).collect();

    let second = engine.force_new_tournament().unwrap();
    assert_ne!(second.id, first.id);

    let closed = engine.tournament(first.id).unwrap();
    assert!(closed.completed);
    assert!(closed.champion.is_none());
    assert!(engine.placements(first.id).unwrap().is_empty());
    let round_one = engine.store().read(|repo| repo.matches_by_round(first.id, 1));
    assert!(round_one.iter().all(|m| m.is_completed()));

    // Random winners move no points
    let points_after: Vec<u64> = engine.contestants().iter().map(|c| c.ranking_points).collect();
    assert_eq!(points_before, points_after);
    assert_eq!(engine.active_tournament().unwrap().id, second.id);
}

#[test]
fn test_ensure_active_tournament_is_lazy() {
    let engine = setup_engine(64);
    assert!(engine.current_match_data().unwrap().is_none());

    let started = engine.ensure_active_tournament().unwrap();
    let again = engine.ensure_active_tournament().unwrap();
    assert_eq!(started.id, again.id);
    assert_eq!(engine.tournament_history().len(), 1);

    let view = engine.current_match_data().unwrap().unwrap();
    assert_eq!(view.round_name, "Round of 64");
    assert!(view.contestant1.rank.is_some());
    assert!(view.contestant1.image_urls.is_empty());
}

#[test]
fn test_same_seed_same_season() {
    let play = || {
        let engine = TournamentEngine::with_seed(MemoryStore::new(), 2024);
        engine
            .seed_roster((1..=90).map(|i| NewContestant::new(format!("P{}", i))).collect())
            .unwrap();
        engine.initialize_tournament().unwrap();
        decide_many(&engine, 64);
        let mut field: Vec<u64> = engine.active_contestants().iter().map(|c| c.id.0).collect();
        field.sort_unstable();
        (field, engine.ranking(10).iter().map(|c| c.id.0).collect::<Vec<_>>())
    };
    assert_eq!(play(), play());
}

#[test]
fn test_leaderboards_follow_results() {
    let engine = setup_engine(64);
    let first = engine.initialize_tournament().unwrap();
    decide_many(&engine, 64);

    let closed = engine.tournament(first.id).unwrap();
    let by_tournament = engine.tournament_ranking(1);
    assert_eq!(Some(by_tournament[0].id), closed.champion);

    let ranking = engine.ranking(64);
    assert!(ranking
        .windows(2)
        .all(|w| w[0].ranking_points >= w[1].ranking_points));

    let stats = engine.general_stats();
    assert_eq!(Some(stats[0].id), closed.champion);
    assert_eq!(stats[0].wins, 6);

    let performers = engine.top_performers_history(3, 2);
    assert_eq!(performers.len(), 3);
    assert!(performers.iter().all(|p| p.history.len() <= 2));
}
