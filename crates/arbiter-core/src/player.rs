//! Player records as the engine sees them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ByeKind, Color};

/// Stable identifier of a player within one tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        PlayerId(id)
    }
}

/// A bye a player has received in a confirmed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeRecord {
    pub round: u32,
    pub kind: ByeKind,
}

/// A competitor and everything the pairing rules need to know about them.
///
/// `score`, `color_history`, `opponents` and `byes` describe confirmed rounds
/// only. They change exclusively through round confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: i32,
    /// Position in the rating list (1 = strongest). Derived once from
    /// rating, descending, with ties broken by name.
    #[serde(default)]
    pub initial_rank: u32,
    /// Stable number assigned once at registration.
    #[serde(default)]
    pub pairing_number: u32,
    #[serde(default)]
    pub score: f64,
    /// One entry per confirmed round the player took part in; `None` for a
    /// round without a game (bye or forfeit).
    #[serde(default)]
    pub color_history: Vec<Option<Color>>,
    /// Opponents actually faced over the board. A bye is not an opponent.
    #[serde(default)]
    pub opponents: BTreeSet<PlayerId>,
    #[serde(default)]
    pub byes: Vec<ByeRecord>,
    #[serde(default)]
    pub withdrawn: bool,
}

impl Player {
    /// Creates an unranked player with no history.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, rating: i32) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            rating,
            initial_rank: 0,
            pairing_number: 0,
            score: 0.0,
            color_history: Vec::new(),
            opponents: BTreeSet::new(),
            byes: Vec::new(),
            withdrawn: false,
        }
    }

    /// Colors of the games actually played, oldest first.
    pub fn played_colors(&self) -> impl DoubleEndedIterator<Item = Color> + '_ {
        self.color_history.iter().filter_map(|c| *c)
    }

    /// Whites minus blacks over all played games.
    pub fn color_difference(&self) -> i32 {
        self.played_colors().map(Color::balance).sum()
    }

    /// The most recent played color and how many times in a row it was played.
    pub fn color_streak(&self) -> Option<(Color, usize)> {
        let mut colors = self.played_colors().rev();
        let last = colors.next()?;
        let run = 1 + colors.take_while(|&c| c == last).count();
        Some((last, run))
    }

    /// Returns true if the two players already met over the board.
    pub fn has_played(&self, other: PlayerId) -> bool {
        self.opponents.contains(&other)
    }

    /// Number of byes of any kind received so far.
    pub fn bye_count(&self) -> u32 {
        self.byes.len() as u32
    }

    /// Returns true if the player already had a bye in `round`.
    pub fn has_bye_in(&self, round: u32) -> bool {
        self.byes.iter().any(|b| b.round == round)
    }
}
