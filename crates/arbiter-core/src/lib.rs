//! Core types for tournament pairing.
//!
//! This crate provides the plain data shared by the pairing engine and its
//! collaborators (storage, exporters, user interfaces):
//! - [`Player`] and [`PlayerId`] for competitors and their history
//! - [`Color`] for board colors
//! - [`Pairing`], [`PairingOrigin`] and [`ByeKind`] for round output
//! - [`GameResult`] and [`GameRecord`] for confirmed results
//! - [`TournamentConfig`] and friends for scoring and tiebreak settings
//! - [`ValidationError`] for rejected requests

mod color;
mod config;
mod error;
mod fide;
mod pairing;
mod player;
mod result;

pub use color::Color;
pub use config::{
    ByeWinPolicy, PairingSystem, ScoringRules, TiebreakKey, TournamentConfig, VoidedGamePolicy,
};
pub use error::ValidationError;
pub use fide::FideId;
pub use pairing::{ByeKind, Pairing, PairingOrigin};
pub use player::{ByeRecord, Player, PlayerId};
pub use result::{GameRecord, GameResult, Outcome};
