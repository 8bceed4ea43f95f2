//! Validation errors raised for malformed requests and configuration.

use thiserror::Error;

use crate::PlayerId;

/// A request the engine refuses to act on.
///
/// Validation failures are always surfaced to the caller; nothing in the
/// engine drops an invalid request silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("player {player} already had {taken} byes (limit {limit})")]
    ByeLimitExceeded {
        player: PlayerId,
        taken: u32,
        limit: u32,
    },

    #[error("player {0} has more than one bye in the same round")]
    DuplicateBye(PlayerId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} has withdrawn")]
    WithdrawnPlayer(PlayerId),

    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error("invalid FIDE id '{0}': expected 8 digits")]
    InvalidFideId(String),

    #[error("unknown tiebreak '{0}'")]
    UnknownTiebreak(String),

    #[error("invalid result '{0}'")]
    InvalidResult(String),

    #[error("round {got} is out of sequence, expected round {expected}")]
    RoundOutOfSequence { expected: u32, got: u32 },

    #[error("round {0} has not been generated")]
    RoundNotGenerated(u32),

    #[error("round {0} is already confirmed")]
    RoundAlreadyConfirmed(u32),

    #[error("round {0} has not been confirmed")]
    RoundNotConfirmed(u32),

    #[error("round {round} has no table {table}")]
    UnknownTable { round: u32, table: u32 },

    #[error("player {player} has no game in round {round}")]
    NoGameInRound { round: u32, player: PlayerId },

    #[error("round {round} still has {missing} results pending")]
    ResultsIncomplete { round: u32, missing: usize },

    #[error("all {0} rounds have been played")]
    TournamentComplete(u32),

    #[error("bye requests are not accepted in a round-robin schedule")]
    ByeRequestsUnsupported,

    #[error("only round-robin tournaments have a fixed schedule")]
    NotRoundRobin,
}
