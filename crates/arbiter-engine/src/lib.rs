//! Deterministic pairing engine for chess tournaments.
//!
//! This crate provides:
//! - [`SwissPairingEngine`] - FIDE Dutch system pairing with floaters,
//!   transpositions and exchanges
//! - [`RoundRobinScheduler`] - Circle-method schedules with balanced colors
//! - [`ByeAllocator`] - Absence, requested and automatic byes
//! - [`ColorAllocator`] - White/black assignment from color history
//! - [`TiebreakCalculator`] - Buchholz, Sonneborn-Berger, Progressive, Wins
//!   and the head-to-head matrix
//! - [`Tournament`] - The round lifecycle tying them together
//!
//! # Determinism
//!
//! Every call is a pure function of its inputs. Randomness (the first-round
//! color lot) comes from a ChaCha8 stream keyed by the master seed and the
//! round number; see [`MasterSeed`].
//!
//! # Example
//!
//! ```
//! use arbiter_core::{GameResult, Player, TournamentConfig};
//! use arbiter_engine::{RoundRequest, Tournament};
//!
//! let players = (1..=6u32)
//!     .map(|i| Player::new(i, format!("Player {i}"), 2000 - i as i32))
//!     .collect();
//! let config = TournamentConfig {
//!     master_seed: Some("doc".to_string()),
//!     ..TournamentConfig::default()
//! };
//! let mut tournament = Tournament::new(config, players).unwrap();
//!
//! let round = tournament.generate_round(&RoundRequest::new()).unwrap();
//! assert_eq!(round.pairings.len(), 3);
//!
//! for table in 1..=3 {
//!     tournament.record_result(1, table, GameResult::Draw).unwrap();
//! }
//! tournament.confirm_round(1).unwrap();
//! assert_eq!(tournament.ranking().len(), 6);
//! ```

mod bye;
mod color;
mod error;
mod round_robin;
mod seed;
mod standings;
mod swiss;
mod tiebreak;
mod tournament;

pub use bye::{ByeAllocator, ByeAssignment, ByeResolution, RoundRequest};
pub use color::{ColorAllocator, ColorAssignment, ColorConflict, ConflictKind, MAX_COLOR_DIFFERENCE};
pub use error::PairingError;
pub use round_robin::RoundRobinScheduler;
pub use seed::MasterSeed;
pub use standings::{ScoreGroup, StandingsModel};
pub use swiss::{RoundPairings, SwissPairingEngine};
pub use tiebreak::{HeadToHead, TiebreakCalculator, TiebreakTable};
pub use tournament::{Round, RoundState, Tournament};
