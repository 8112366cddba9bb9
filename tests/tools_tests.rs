//! End-to-end tests of the MCP tool surface

use std::io::Cursor;
use std::sync::Arc;

use serde_json::{json, Value};

use bracket_engine::images::UrlTemplateImages;
use bracket_engine::protocol::ServerInfo;
use bracket_engine::server::McpServer;
use bracket_engine::storage::MemoryStore;
use bracket_engine::tools::register_all_tools;
use bracket_engine::types::NewContestant;
use bracket_engine::TournamentEngine;

fn engine(roster: usize) -> Arc<TournamentEngine<MemoryStore>> {
    let engine = TournamentEngine::with_seed(MemoryStore::new(), 77);
    engine
        .seed_roster((1..=roster).map(|i| NewContestant::new(format!("Seed {}", i))).collect())
        .unwrap();
    Arc::new(engine)
}

/// Send tool calls through a server and return the parsed replies
fn call(engine: &Arc<TournamentEngine<MemoryStore>>, calls: &[(&str, Value)]) -> Vec<Value> {
    let input: String = calls
        .iter()
        .enumerate()
        .map(|(i, (name, args))| {
            json!({
                "jsonrpc": "2.0",
                "id": i + 1,
                "method": "tools/call",
                "params": { "name": name, "arguments": args }
            })
            .to_string()
                + "\n"
        })
        .collect();

    let mut server = McpServer::with_io(ServerInfo::default(), Cursor::new(input), Vec::new());
    register_all_tools(
        &mut server,
        Arc::clone(engine),
        Arc::new(UrlTemplateImages::new("https://img.test/{id}.png")),
    );
    assert_eq!(server.tool_count(), 14);
    server.run().unwrap();

    String::from_utf8(server.into_writer())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// The JSON payload inside a text content result
fn payload(reply: &Value) -> Value {
    let text = reply["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[test]
fn test_current_match_starts_tournament_and_adds_images() {
    let engine = engine(64);
    let replies = call(&engine, &[("get_current_match", json!({}))]);

    let view = payload(&replies[0]);
    assert_eq!(view["roundName"], "Round of 64");
    let id = view["contestant1"]["id"].as_u64().unwrap();
    assert_eq!(
        view["contestant1"]["imageUrls"][0],
        format!("https://img.test/{}.png", id)
    );
    assert!(engine.active_tournament().is_some());
}

#[test]
fn test_select_winner_then_reject_repeat() {
    let engine = engine(64);
    engine.initialize_tournament().unwrap();
    let m = engine.current_match().unwrap();
    let args = json!({ "matchId": m.id.0, "winnerId": m.contestant1_id.0 });

    let replies = call(
        &engine,
        &[
            ("select_winner", args.clone()),
            ("select_winner", args),
            ("advance_to_next_match", json!({})),
        ],
    );

    let outcome = payload(&replies[0]);
    assert_eq!(outcome["exchange"]["winnerAfter"], 1100);
    assert_eq!(outcome["tournamentChanged"], false);
    assert_eq!(outcome["decided"]["completed"], true);
    assert_eq!(outcome["nextMatch"]["completed"], false);

    assert_eq!(replies[1]["result"]["isError"], true);
    assert_eq!(replies[1]["result"]["code"], "ALREADY_DECIDED");

    let next = payload(&replies[2]);
    assert_eq!(next["matchNumber"], 2);
    assert_eq!(next["completed"], false);
}

#[test]
fn test_missing_arguments_are_invalid_params() {
    let engine = engine(64);
    let replies = call(
        &engine,
        &[
            ("select_winner", json!({ "matchId": 1 })),
            ("get_rankings", json!({ "by": "elo" })),
        ],
    );
    assert_eq!(replies[0]["error"]["code"], -32602);
    assert_eq!(replies[1]["error"]["code"], -32602);
}

#[test]
fn test_roster_tools() {
    let engine = engine(3);
    let replies = call(
        &engine,
        &[
            ("add_contestant", json!({ "name": "Newcomer", "nationality": "NZ" })),
            ("add_contestant", json!({ "name": "newcomer" })),
            ("update_contestant", json!({ "contestantId": 1, "nationality": "FI" })),
            ("list_contestants", json!({})),
            ("get_rankings", json!({ "by": "tournament", "limit": 2 })),
            ("get_point_history", json!({ "contestantId": 99 })),
        ],
    );

    assert_eq!(payload(&replies[0])["nationality"], "NZ");
    assert_eq!(replies[1]["result"]["code"], "INVALID_INPUT");
    assert_eq!(payload(&replies[2])["nationality"], "FI");
    assert_eq!(payload(&replies[3]).as_array().unwrap().len(), 4);
    assert_eq!(payload(&replies[4]).as_array().unwrap().len(), 2);
    assert_eq!(replies[5]["result"]["code"], "NOT_FOUND");
}

#[test]
fn test_small_roster_is_a_fatal_protocol_error() {
    let engine = engine(12);
    let replies = call(&engine, &[("initialize_tournament", json!({}))]);
    assert_eq!(replies[0]["error"]["code"], -32603);
    assert_eq!(replies[0]["error"]["data"]["code"], "INSUFFICIENT_ROSTER");
}

#[test]
fn test_bracket_and_progress_default_to_active() {
    let engine = engine(64);
    let replies = call(
        &engine,
        &[
            ("get_tournament_bracket", json!({})),
            ("get_tournament_progress", json!({})),
            ("get_tournament_history", json!({})),
        ],
    );

    let bracket = payload(&replies[0]);
    assert_eq!(bracket["rounds"][0]["matches"].as_array().unwrap().len(), 32);
    let progress = payload(&replies[1]);
    assert_eq!(progress["percentComplete"], 0);
    assert_eq!(progress["totalMatches"], 64);
    assert_eq!(payload(&replies[2]).as_array().unwrap().len(), 1);
}
