//! Typed record ids
//!
//! Ids are assigned sequentially from 1 by the store, so an id doubles as
//! the slot of its record in the arena's growable arrays.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Arena slot of this id, `None` for the never-assigned id 0
            pub(crate) fn slot(self) -> Option<usize> {
                usize::try_from(self.0).ok()?.checked_sub(1)
            }

            pub(crate) fn from_slot(slot: usize) -> Self {
                Self(slot as u64 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

record_id!(
    /// Identity of a roster member
    ContestantId
);
record_id!(
    /// Identity of a tournament
    TournamentId
);
record_id!(
    /// Identity of a match, unique across tournaments
    MatchId
);
