//! Ranking Economy
//!
//! Pure point arithmetic with no state of its own:
//! - `exchange`: the ranking-points transfer after a decided match
//! - `Placement`: the fixed tournament-points table for where a contestant
//!   finished

mod exchange;
mod placement;

pub use exchange::{exchange, Exchange, TRANSFER_PERCENT};
pub use placement::{placement_award, Placement};
