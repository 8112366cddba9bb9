//! Placement table for tournament points

use serde::{Deserialize, Serialize};

use crate::types::FINAL_ROUND;

/// Where a contestant finished in one tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Champion,
    RunnerUp,
    Third,
    Fourth,
    /// Lost in round 4
    QuarterFinal,
    /// Lost in round 3
    RoundOf16,
    /// Lost in round 2
    RoundOf32,
    /// Lost in round 1
    RoundOf64,
}

impl Placement {
    /// Placement for a contestant knocked out in rounds 1-4
    ///
    /// Semi-final losers play on in the bronze match, so rounds 5 and 6 have
    /// no elimination placement.
    pub fn from_exit_round(round: u8) -> Option<Self> {
        match round {
            1 => Some(Placement::RoundOf64),
            2 => Some(Placement::RoundOf32),
            3 => Some(Placement::RoundOf16),
            4 => Some(Placement::QuarterFinal),
            _ => None,
        }
    }

    /// Round in which a contestant with this placement last played
    pub fn exit_round(self) -> u8 {
        match self {
            Placement::Champion | Placement::RunnerUp | Placement::Third | Placement::Fourth => {
                FINAL_ROUND
            }
            Placement::QuarterFinal => 4,
            Placement::RoundOf16 => 3,
            Placement::RoundOf32 => 2,
            Placement::RoundOf64 => 1,
        }
    }

    pub fn points(self) -> u64 {
        placement_award(self)
    }
}

/// Tournament points for a placement
pub fn placement_award(placement: Placement) -> u64 {
    match placement {
        Placement::Champion => 50,
        Placement::RunnerUp => 40,
        Placement::Third => 35,
        Placement::Fourth => 30,
        Placement::QuarterFinal => 25,
        Placement::RoundOf16 => 20,
        Placement::RoundOf32 => 15,
        Placement::RoundOf64 => 10,
    }
}
