//! Append-only audit records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContestantId, MatchId, TournamentId};
use crate::economy::Placement;

/// One ranking-points movement for one contestant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointHistory {
    pub id: u64,
    pub contestant_id: ContestantId,
    pub tournament_id: TournamentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<MatchId>,
    pub points_before: u64,
    pub points_change: i64,
    pub points_after: u64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a point-history row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointHistory {
    pub contestant_id: ContestantId,
    pub tournament_id: TournamentId,
    pub match_id: Option<MatchId>,
    pub points_before: u64,
    pub points_after: u64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl NewPointHistory {
    /// Signed movement between the before and after values
    pub fn change(&self) -> i64 {
        self.points_after as i64 - self.points_before as i64
    }
}

/// A placement award granted to one contestant for one tournament
///
/// At most one row exists per (tournament, contestant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementAward {
    pub tournament_id: TournamentId,
    pub contestant_id: ContestantId,
    pub placement: Placement,
    pub points: u64,
}
