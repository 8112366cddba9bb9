//! Ranking-points exchange between the two participants of a match

use serde::Serialize;

/// Share of the opponent's points moved on a decision
pub const TRANSFER_PERCENT: u64 = 10;

/// Point movement produced by one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub winner_before: u64,
    pub loser_before: u64,
    /// 10% of the loser's points, rounded down
    pub winner_gain: u64,
    /// 10% of the winner's points, rounded down
    pub loser_loss: u64,
    pub winner_after: u64,
    /// Never below zero
    pub loser_after: u64,
}

impl Exchange {
    /// Signed change actually applied to the winner
    pub fn winner_delta(&self) -> i64 {
        self.winner_after as i64 - self.winner_before as i64
    }

    /// Signed change actually applied to the loser (clamping included)
    pub fn loser_delta(&self) -> i64 {
        self.loser_after as i64 - self.loser_before as i64
    }
}

/// Compute the transfer for a decided match
///
/// The winner takes a tenth of the loser's points and the loser gives up a
/// tenth of the winner's, so the two amounts differ unless both started
/// level. The loser is floored at zero.
pub fn exchange(winner_points: u64, loser_points: u64) -> Exchange {
    let winner_gain = loser_points * TRANSFER_PERCENT / 100;
    let loser_loss = winner_points * TRANSFER_PERCENT / 100;

    Exchange {
        winner_before: winner_points,
        loser_before: loser_points,
        winner_gain,
        loser_loss,
        winner_after: winner_points.saturating_add(winner_gain),
        loser_after: loser_points.saturating_sub(loser_loss),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings() {
        let ex = exchange(1000, 1000);
        assert_eq!(ex.winner_after, 1100);
        assert_eq!(ex.loser_after, 900);
        assert_eq!(ex.winner_delta(), 100);
        assert_eq!(ex.loser_delta(), -100);
    }

    #[test]
    fn test_amounts_round_down() {
        let ex = exchange(1234, 567);
        assert_eq!(ex.winner_gain, 56);
        assert_eq!(ex.loser_loss, 123);
        assert_eq!(ex.winner_after, 1290);
        assert_eq!(ex.loser_after, 444);
    }

    #[test]
    fn test_loser_floored_at_zero() {
        let ex = exchange(5000, 300);
        assert_eq!(ex.loser_loss, 500);
        assert_eq!(ex.loser_after, 0);
        assert_eq!(ex.loser_delta(), -300);
        assert_eq!(ex.winner_after, 5030);
    }

    #[test]
    fn test_zero_point_loser_gives_nothing() {
        let ex = exchange(800, 0);
        assert_eq!(ex.winner_gain, 0);
        assert_eq!(ex.winner_after, 800);
        assert_eq!(ex.loser_after, 0);
    }

    #[test]
    fn test_small_values_match_float_floor() {
        for winner in 0..200u64 {
            for loser in [0u64, 7, 9, 10, 19, 31, 99] {
                let ex = exchange(winner, loser);
                assert_eq!(ex.winner_gain, (loser as f64 * 0.1).floor() as u64);
                assert_eq!(ex.loser_loss, (winner as f64 * 0.1).floor() as u64);
            }
        }
    }
}
