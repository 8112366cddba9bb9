//! Contestant records

use serde::{Deserialize, Serialize};

use super::ContestantId;

/// Ranking points every contestant starts with
pub const STARTING_RANKING_POINTS: u64 = 1000;

/// A roster member
///
/// Contestants are never deleted. One whose ranking points reach zero stays
/// in rankings and history but is no longer drawn into a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contestant {
    pub id: ContestantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    /// Economy score exchanged on every decided match
    pub ranking_points: u64,
    /// Cumulative placement score, never decreases
    #[serde(default)]
    pub tournament_points: u64,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub gold_medals: u32,
    #[serde(default)]
    pub silver_medals: u32,
    #[serde(default)]
    pub bronze_medals: u32,
    /// In the current tournament's field
    #[serde(default)]
    pub active: bool,
}

impl Contestant {
    /// Create a fresh roster member
    pub fn new(id: ContestantId, name: String, nationality: Option<String>) -> Self {
        Self {
            id,
            name,
            nationality,
            ranking_points: STARTING_RANKING_POINTS,
            tournament_points: 0,
            matches_played: 0,
            wins: 0,
            losses: 0,
            gold_medals: 0,
            silver_medals: 0,
            bronze_medals: 0,
            active: false,
        }
    }

    /// Can be drawn into a future field
    pub fn is_eligible(&self) -> bool {
        self.ranking_points > 0
    }
}

/// Input for creating a contestant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContestant {
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
}

impl NewContestant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nationality: None,
        }
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = Some(nationality.into());
        self
    }
}

/// Editable contestant attributes
///
/// An empty `nationality` clears the tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContestantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}
