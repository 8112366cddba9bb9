//! Tournament and match records, plus the fixed bracket shape
//!
//! Every tournament is a 64-contestant single-elimination bracket:
//!
//! ```text
//! round 1   32 matches   round of 64
//! round 2   16 matches   round of 32
//! round 3    8 matches   round of 16
//! round 4    4 matches   quarter-finals
//! round 5    2 matches   semi-finals
//! round 6    2 matches   #1 bronze (semi-final losers), #2 final
//! ```

use chrono::{DateTime, Utc};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use super::{ContestantId, MatchId, TournamentId};

/// Contestants in every field
pub const FIELD_SIZE: usize = 64;

/// Matches in a complete bracket (32 + 16 + 8 + 4 + 2 + 2)
pub const TOTAL_MATCHES: u32 = 64;

pub const FIRST_ROUND: u8 = 1;
pub const SEMIFINAL_ROUND: u8 = 5;
pub const FINAL_ROUND: u8 = 6;

/// Match number of the third-place match within the final round
pub const BRONZE_MATCH: u32 = 1;
/// Match number of the final within the final round
pub const FINAL_MATCH: u32 = 2;

/// Number of matches a round holds
pub fn matches_in_round(round: u8) -> u32 {
    match round {
        FIRST_ROUND..=SEMIFINAL_ROUND => 1 << (FINAL_ROUND - round),
        FINAL_ROUND => 2,
        _ => 0,
    }
}

/// Human label for a round, split into bronze match and final in round 6
pub fn round_label(round: u8, match_number: u32) -> String {
    let label = match (round, match_number) {
        (1, _) => "Round of 64",
        (2, _) => "Round of 32",
        (3, _) => "Round of 16",
        (4, _) => "Quarter-finals",
        (5, _) => "Semi-finals",
        (FINAL_ROUND, BRONZE_MATCH) => "Bronze Match",
        (FINAL_ROUND, FINAL_MATCH) => "Final",
        _ => return format!("Round {}", round),
    };
    label.to_string()
}

/// One run of the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Round of the match awaiting a decision
    pub current_round: u8,
    /// Match number (within `current_round`) awaiting a decision
    pub current_match: u32,
    #[serde(default)]
    pub matches_completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<ContestantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<ContestantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_place: Option<ContestantId>,
}

impl Tournament {
    /// A tournament pointing at the first match of round 1
    pub fn new(id: TournamentId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            ended_at: None,
            completed: false,
            current_round: FIRST_ROUND,
            current_match: 1,
            matches_completed: 0,
            champion: None,
            runner_up: None,
            third_place: None,
        }
    }

    pub fn point_to(&mut self, round: u8, match_number: u32) {
        self.current_round = round;
        self.current_match = match_number;
    }

    /// Close the tournament; podium fields are left to the caller
    pub fn close(&mut self, ended_at: DateTime<Utc>) {
        self.completed = true;
        self.ended_at = Some(ended_at);
    }
}

/// A pairing within one tournament round
///
/// A match is decided exactly when `winner_id` holds one of its two
/// participants. The serialized form carries a `completed` field derived
/// from that; it is ignored when a match is read back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: u8,
    pub match_number: u32,
    pub contestant1_id: ContestantId,
    pub contestant2_id: ContestantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<ContestantId>,
}

impl Match {
    pub fn is_completed(&self) -> bool {
        self.winner_id.is_some()
    }

    pub fn involves(&self, contestant: ContestantId) -> bool {
        self.contestant1_id == contestant || self.contestant2_id == contestant
    }

    /// The other participant, `None` if `contestant` is not in this match
    pub fn opponent_of(&self, contestant: ContestantId) -> Option<ContestantId> {
        if contestant == self.contestant1_id {
            Some(self.contestant2_id)
        } else if contestant == self.contestant2_id {
            Some(self.contestant1_id)
        } else {
            None
        }
    }

    pub fn loser_id(&self) -> Option<ContestantId> {
        self.winner_id.and_then(|winner| self.opponent_of(winner))
    }

    pub fn participants(&self) -> [ContestantId; 2] {
        [self.contestant1_id, self.contestant2_id]
    }

    pub fn is_bronze(&self) -> bool {
        self.round == FINAL_ROUND && self.match_number == BRONZE_MATCH
    }

    pub fn is_final(&self) -> bool {
        self.round == FINAL_ROUND && self.match_number == FINAL_MATCH
    }
}

impl Serialize for Match {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.winner_id.is_some() { 8 } else { 7 };
        let mut state = serializer.serialize_struct("Match", fields)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("tournamentId", &self.tournament_id)?;
        state.serialize_field("round", &self.round)?;
        state.serialize_field("matchNumber", &self.match_number)?;
        state.serialize_field("contestant1Id", &self.contestant1_id)?;
        state.serialize_field("contestant2Id", &self.contestant2_id)?;
        match &self.winner_id {
            Some(winner) => state.serialize_field("winnerId", winner)?,
            None => state.skip_field("winnerId")?,
        }
        state.serialize_field("completed", &self.is_completed())?;
        state.end()
    }
}

/// Input for creating a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub round: u8,
    pub match_number: u32,
    pub contestant1_id: ContestantId,
    pub contestant2_id: ContestantId,
}
