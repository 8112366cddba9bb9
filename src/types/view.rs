//! Read-model projections handed to callers

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Contestant, ContestantId, Match, MatchId, TournamentId};
use crate::economy::Exchange;

/// Participant as shown on the current-match screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchContestantView {
    pub id: ContestantId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub ranking_points: u64,
    /// Position in the ranking-points leaderboard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    /// Filled by the image collaborator, never by the engine
    pub image_urls: Vec<String>,
}

/// The match awaiting a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMatchView {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
    pub round: u8,
    pub match_number: u32,
    pub round_name: String,
    pub contestant1: MatchContestantView,
    pub contestant2: MatchContestantView,
}

/// Minimal contestant identity for bracket cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestantBrief {
    pub id: ContestantId,
    pub name: String,
    pub ranking_points: u64,
}

impl From<&Contestant> for ContestantBrief {
    fn from(c: &Contestant) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            ranking_points: c.ranking_points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatchView {
    pub id: MatchId,
    pub round: u8,
    pub match_number: u32,
    pub contestant1: Option<ContestantBrief>,
    pub contestant2: Option<ContestantBrief>,
    pub winner: Option<ContestantBrief>,
    pub completed: bool,
}

/// One labeled group of bracket matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRound {
    pub round: u8,
    pub name: String,
    pub matches: Vec<BracketMatchView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub rounds: Vec<BracketRound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub tournament_id: TournamentId,
    pub total_matches: u32,
    pub completed_matches: u32,
    pub current_round: u8,
    pub current_match: u32,
    pub round_name: String,
    pub percent_complete: u32,
    pub tournament_completed: bool,
}

/// Result of recording one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWinnerOutcome {
    pub decided: Match,
    pub exchange: Exchange,
    /// Match now awaiting a decision, in the successor if one was started
    pub next_match: Option<Match>,
    /// A new tournament id is now current
    pub tournament_changed: bool,
    pub active_tournament: Option<TournamentId>,
}

/// A tournament with its podium resolved to names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub matches_completed: u32,
    pub champion: Option<ContestantBrief>,
    pub runner_up: Option<ContestantBrief>,
    pub third_place: Option<ContestantBrief>,
}
