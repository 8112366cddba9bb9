//! Engine errors
//!
//! | Variant | Code | Fatal |
//! |---------|------|-------|
//! | [`EngineError::NotFound`] | `NOT_FOUND` | No |
//! | [`EngineError::AlreadyDecided`] | `ALREADY_DECIDED` | No |
//! | [`EngineError::InvalidWinner`] | `INVALID_WINNER` | No |
//! | [`EngineError::TournamentClosed`] | `TOURNAMENT_CLOSED` | No |
//! | [`EngineError::BronzePending`] | `BRONZE_PENDING` | No |
//! | [`EngineError::InvalidInput`] | `INVALID_INPUT` | No |
//! | [`EngineError::IntegrityViolation`] | `INTEGRITY_VIOLATION` | Yes |
//! | [`EngineError::InsufficientRoster`] | `INSUFFICIENT_ROSTER` | Yes |
//! | [`EngineError::Io`] | `STORAGE_IO` | Yes |
//! | [`EngineError::Json`] | `STORAGE_JSON` | Yes |
//! | [`EngineError::CorruptRecord`] | `STORAGE_CORRUPT` | Yes |
//!
//! Non-fatal variants are typed rejections meant for the end user. Fatal
//! variants mean the stored state or roster needs a human; retrying without
//! fixing the data repeats the failure.

use std::fmt;

use thiserror::Error;

use super::{ContestantId, MatchId, TournamentId};

/// Kind of record a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Contestant,
    Tournament,
    Match,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Contestant => write!(f, "contestant"),
            RecordKind::Tournament => write!(f, "tournament"),
            RecordKind::Match => write!(f, "match"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    #[error("match {match_id} already has a recorded winner")]
    AlreadyDecided { match_id: MatchId },

    #[error("contestant {contestant_id} does not play in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        contestant_id: ContestantId,
    },

    #[error("tournament {tournament_id} is already completed")]
    TournamentClosed { tournament_id: TournamentId },

    #[error("final cannot be decided before the bronze match (match {match_id})")]
    BronzePending { match_id: MatchId },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("bracket integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("roster too small: {required} eligible contestants required, {available} available")]
    InsufficientRoster { required: usize, available: usize },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },
}

impl EngineError {
    pub fn not_found(kind: RecordKind, id: impl Into<u64>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        EngineError::IntegrityViolation(message.into())
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::InvalidWinner { .. } => "INVALID_WINNER",
            Self::TournamentClosed { .. } => "TOURNAMENT_CLOSED",
            Self::BronzePending { .. } => "BRONZE_PENDING",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::IntegrityViolation(_) => "INTEGRITY_VIOLATION",
            Self::InsufficientRoster { .. } => "INSUFFICIENT_ROSTER",
            Self::Io(_) => "STORAGE_IO",
            Self::Json(_) => "STORAGE_JSON",
            Self::CorruptRecord { .. } => "STORAGE_CORRUPT",
        }
    }

    /// Whether the error signals broken state rather than a rejected request
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyDecided { .. }
                | Self::InvalidWinner { .. }
                | Self::TournamentClosed { .. }
                | Self::BronzePending { .. }
                | Self::InvalidInput(_)
        )
    }
}
