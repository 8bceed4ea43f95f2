//! Pairing records emitted for one round.

use serde::{Deserialize, Serialize};

use crate::{Color, PlayerId};

/// Why a player sits out a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByeKind {
    /// Assigned by the engine to even out an odd pool.
    Automatic,
    /// Asked for by the player ahead of the round.
    Requested,
    /// The player did not show up.
    Absence,
}

impl std::fmt::Display for ByeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByeKind::Automatic => write!(f, "automatic"),
            ByeKind::Requested => write!(f, "requested"),
            ByeKind::Absence => write!(f, "absence"),
        }
    }
}

/// Origin tag of a pairing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingOrigin {
    Normal,
    ByeAutomatic,
    ByeRequested,
    ByeAbsence,
}

impl PairingOrigin {
    /// The bye kind, if this is a bye record.
    pub const fn bye_kind(self) -> Option<ByeKind> {
        match self {
            PairingOrigin::Normal => None,
            PairingOrigin::ByeAutomatic => Some(ByeKind::Automatic),
            PairingOrigin::ByeRequested => Some(ByeKind::Requested),
            PairingOrigin::ByeAbsence => Some(ByeKind::Absence),
        }
    }
}

impl From<ByeKind> for PairingOrigin {
    fn from(kind: ByeKind) -> Self {
        match kind {
            ByeKind::Automatic => PairingOrigin::ByeAutomatic,
            ByeKind::Requested => PairingOrigin::ByeRequested,
            ByeKind::Absence => PairingOrigin::ByeAbsence,
        }
    }
}

/// One board of a round, or one bye.
///
/// Byes carry no table number and no black player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub table: Option<u32>,
    pub white: PlayerId,
    pub black: Option<PlayerId>,
    pub origin: PairingOrigin,
}

impl Pairing {
    /// A regular game at `table`.
    pub fn game(table: u32, white: PlayerId, black: PlayerId) -> Self {
        Pairing {
            table: Some(table),
            white,
            black: Some(black),
            origin: PairingOrigin::Normal,
        }
    }

    /// A bye for `player`.
    pub fn bye(player: PlayerId, kind: ByeKind) -> Self {
        Pairing {
            table: None,
            white: player,
            black: None,
            origin: kind.into(),
        }
    }

    /// Returns true if this record is a bye.
    pub fn is_bye(&self) -> bool {
        self.black.is_none()
    }

    /// Returns true if `player` sits at this board.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.white == player || self.black == Some(player)
    }

    /// The color `player` has at this board, if they play a game here.
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        match self.black {
            Some(_) if self.white == player => Some(Color::White),
            Some(black) if black == player => Some(Color::Black),
            _ => None,
        }
    }

    /// The opponent of `player`, if this is a game involving them.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let black = self.black?;
        if self.white == player {
            Some(black)
        } else if black == player {
            Some(self.white)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.table, self.black) {
            (Some(table), Some(black)) => write!(f, "{}: {} - {}", table, self.white, black),
            _ => match self.origin.bye_kind() {
                Some(kind) => write!(f, "BYE ({}): {}", kind, self.white),
                None => write!(f, "BYE: {}", self.white),
            },
        }
    }
}
