//! Tournament configuration consumed by the engine.
//!
//! Every field has a default so that a partial configuration (for example a
//! TOML file naming only the pairing system) is always complete once loaded.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ByeKind, Color, GameResult, Outcome, ValidationError};

/// Which pairing system drives the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingSystem {
    /// FIDE Dutch Swiss system.
    #[default]
    Swiss,
    /// Berger / circle-method round robin.
    RoundRobin,
}

/// Tiebreak criteria, identified by the keys used in `tie_break_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TiebreakKey {
    #[serde(rename = "buchholz")]
    Buchholz,
    #[serde(rename = "sonneborn")]
    SonnebornBerger,
    #[serde(rename = "progressive")]
    Progressive,
    #[serde(rename = "wins")]
    Wins,
    /// Direct encounter. Not numeric: resolved by the standings sort.
    #[serde(rename = "mutual")]
    MutualResult,
}

impl TiebreakKey {
    /// All keys in their canonical order.
    pub const ALL: [TiebreakKey; 5] = [
        TiebreakKey::Buchholz,
        TiebreakKey::SonnebornBerger,
        TiebreakKey::Progressive,
        TiebreakKey::Wins,
        TiebreakKey::MutualResult,
    ];

    /// The configuration key.
    pub const fn as_str(self) -> &'static str {
        match self {
            TiebreakKey::Buchholz => "buchholz",
            TiebreakKey::SonnebornBerger => "sonneborn",
            TiebreakKey::Progressive => "progressive",
            TiebreakKey::Wins => "wins",
            TiebreakKey::MutualResult => "mutual",
        }
    }

    /// Returns true if the key produces a numeric value per player.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, TiebreakKey::MutualResult)
    }
}

impl std::fmt::Display for TiebreakKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TiebreakKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buchholz" => Ok(TiebreakKey::Buchholz),
            "sonneborn" | "sonneborn-berger" | "sonneborn_berger" => {
                Ok(TiebreakKey::SonnebornBerger)
            }
            "progressive" => Ok(TiebreakKey::Progressive),
            "wins" => Ok(TiebreakKey::Wins),
            "mutual" | "mutual_result" | "direct" => Ok(TiebreakKey::MutualResult),
            _ => Err(ValidationError::UnknownTiebreak(s.to_string())),
        }
    }
}

/// How games annulled after confirmation feed into tiebreaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoidedGamePolicy {
    /// Voided games are skipped by every tiebreak.
    #[default]
    Exclude,
    /// Voided games still count as if they stood.
    Count,
}

/// How automatic and requested byes feed the Wins tiebreak.
///
/// Absence byes never count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByeWinPolicy {
    None,
    /// A bye is worth half a win, like a draw.
    #[default]
    Half,
    Full,
}

impl ByeWinPolicy {
    /// Wins credited for a bye of `kind`.
    pub const fn credit(self, kind: ByeKind) -> f64 {
        match (self, kind) {
            (_, ByeKind::Absence) | (ByeWinPolicy::None, _) => 0.0,
            (ByeWinPolicy::Half, _) => 0.5,
            (ByeWinPolicy::Full, _) => 1.0,
        }
    }
}

/// Points awarded per result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default = "default_win")]
    pub win: f64,
    #[serde(default = "default_draw")]
    pub draw: f64,
    #[serde(default)]
    pub loss: f64,
    #[serde(default = "default_win")]
    pub bye_automatic: f64,
    #[serde(default = "default_draw")]
    pub bye_requested: f64,
    #[serde(default)]
    pub bye_absence: f64,
}

fn default_win() -> f64 {
    1.0
}

fn default_draw() -> f64 {
    0.5
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            win: default_win(),
            draw: default_draw(),
            loss: 0.0,
            bye_automatic: default_win(),
            bye_requested: default_draw(),
            bye_absence: 0.0,
        }
    }
}

impl ScoringRules {
    /// Points for a bye of `kind`.
    pub const fn bye_points(&self, kind: ByeKind) -> f64 {
        match kind {
            ByeKind::Automatic => self.bye_automatic,
            ByeKind::Requested => self.bye_requested,
            ByeKind::Absence => self.bye_absence,
        }
    }

    /// Points earned by the side playing `color` (the bye holder sits on
    /// the white side of a bye record).
    ///
    /// A double forfeit gives both players the absence-bye value.
    pub fn points(&self, result: GameResult, color: Color) -> f64 {
        match result {
            GameResult::Bye(kind) => self.bye_points(kind),
            GameResult::DoubleForfeit => self.bye_absence,
            other => match other.outcome_for(color) {
                Some(Outcome::Win) => self.win,
                Some(Outcome::Draw) => self.draw,
                Some(Outcome::Loss) | None => self.loss,
            },
        }
    }
}

/// Complete tournament configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    #[serde(default)]
    pub pairing_system: PairingSystem,
    /// Planned number of rounds. Zero derives it (round robin only).
    #[serde(default)]
    pub total_rounds: u32,
    #[serde(default = "default_tie_break_order")]
    pub tie_break_order: Vec<TiebreakKey>,
    #[serde(default)]
    pub points: ScoringRules,
    /// A bye request is refused once a player has had this many byes of any
    /// kind.
    #[serde(default = "default_max_requested_byes")]
    pub max_requested_byes: u32,
    /// Seed for reproducible pairings. Empty or absent means one is generated
    /// and must be persisted by the caller.
    #[serde(default)]
    pub master_seed: Option<String>,
    /// Allow a single flagged rematch when nothing else pairs.
    #[serde(default)]
    pub allow_repeat_pairing: bool,
    #[serde(default)]
    pub voided_games: VoidedGamePolicy,
    #[serde(default)]
    pub bye_wins: ByeWinPolicy,
}

fn default_tie_break_order() -> Vec<TiebreakKey> {
    vec![
        TiebreakKey::Buchholz,
        TiebreakKey::SonnebornBerger,
        TiebreakKey::Progressive,
        TiebreakKey::Wins,
    ]
}

fn default_max_requested_byes() -> u32 {
    1
}

impl Default for TournamentConfig {
    fn default() -> Self {
        TournamentConfig {
            pairing_system: PairingSystem::default(),
            total_rounds: 0,
            tie_break_order: default_tie_break_order(),
            points: ScoringRules::default(),
            max_requested_byes: default_max_requested_byes(),
            master_seed: None,
            allow_repeat_pairing: false,
            voided_games: VoidedGamePolicy::default(),
            bye_wins: ByeWinPolicy::default(),
        }
    }
}

impl TournamentConfig {
    /// The configured master seed, treating a blank string as absent.
    pub fn seed(&self) -> Option<&str> {
        self.master_seed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
