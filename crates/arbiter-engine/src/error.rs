//! Engine error taxonomy.

use arbiter_core::{PlayerId, ValidationError};
use thiserror::Error;

/// Why a pairing or confirmation request failed.
///
/// Every variant carries enough context (round, players, score group) for a
/// caller to explain the failure. A failed call never leaves partial output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PairingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("round {round}: no legal pairing for the {score} point group ({} players)", players.len())]
    UnpairableGroup {
        round: u32,
        score: f64,
        players: Vec<PlayerId>,
    },

    #[error("round {round}: {eligible} eligible players, at least 2 are needed")]
    InsufficientPlayers { round: u32, eligible: usize },

    #[error("round-robin schedule is fixed once round {round} has been generated")]
    ScheduleImmutable { round: u32 },
}
