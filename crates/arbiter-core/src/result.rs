//! Board results and the confirmed game history built from them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ByeKind, Color, PlayerId, ValidationError};

/// How a game ended from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

/// Result of one board.
///
/// Written in the usual notation: `1-0`, `0-1`, `1/2-1/2`, forfeits as
/// `+/-`, `-/+`, `-/-`, and byes as `BYE_AUTOMATIC`, `BYE_REQUESTED`,
/// `BYE_ABSENCE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    WhiteForfeitWin,
    BlackForfeitWin,
    DoubleForfeit,
    Bye(ByeKind),
}

impl GameResult {
    /// Returns true if the game was actually played over the board.
    pub const fn is_played(self) -> bool {
        matches!(
            self,
            GameResult::WhiteWins | GameResult::BlackWins | GameResult::Draw
        )
    }

    /// Returns true for forfeits of either or both sides.
    pub const fn is_forfeit(self) -> bool {
        matches!(
            self,
            GameResult::WhiteForfeitWin | GameResult::BlackForfeitWin | GameResult::DoubleForfeit
        )
    }

    /// The bye kind, if this is a bye.
    pub const fn bye_kind(self) -> Option<ByeKind> {
        match self {
            GameResult::Bye(kind) => Some(kind),
            _ => None,
        }
    }

    /// Outcome for the side playing `color`. Byes have no outcome.
    pub const fn outcome_for(self, color: Color) -> Option<Outcome> {
        let white = match self {
            GameResult::WhiteWins | GameResult::WhiteForfeitWin => Outcome::Win,
            GameResult::BlackWins | GameResult::BlackForfeitWin => Outcome::Loss,
            GameResult::Draw => Outcome::Draw,
            GameResult::DoubleForfeit => return Some(Outcome::Loss),
            GameResult::Bye(_) => return None,
        };
        Some(match (color, white) {
            (Color::White, o) => o,
            (Color::Black, Outcome::Win) => Outcome::Loss,
            (Color::Black, Outcome::Loss) => Outcome::Win,
            (Color::Black, Outcome::Draw) => Outcome::Draw,
        })
    }

    /// Forfeit result for a game where one or both players withdrew.
    ///
    /// Returns `None` when neither player withdrew.
    pub const fn forfeit(white_withdrawn: bool, black_withdrawn: bool) -> Option<Self> {
        match (white_withdrawn, black_withdrawn) {
            (false, false) => None,
            (true, false) => Some(GameResult::BlackForfeitWin),
            (false, true) => Some(GameResult::WhiteForfeitWin),
            (true, true) => Some(GameResult::DoubleForfeit),
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::WhiteForfeitWin => "+/-",
            GameResult::BlackForfeitWin => "-/+",
            GameResult::DoubleForfeit => "-/-",
            GameResult::Bye(ByeKind::Automatic) => "BYE_AUTOMATIC",
            GameResult::Bye(ByeKind::Requested) => "BYE_REQUESTED",
            GameResult::Bye(ByeKind::Absence) => "BYE_ABSENCE",
        };
        f.write_str(s)
    }
}

impl FromStr for GameResult {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-0" => Ok(GameResult::WhiteWins),
            "0-1" => Ok(GameResult::BlackWins),
            "1/2-1/2" | "½-½" => Ok(GameResult::Draw),
            "+/-" | "+-" => Ok(GameResult::WhiteForfeitWin),
            "-/+" | "-+" => Ok(GameResult::BlackForfeitWin),
            "-/-" | "--" => Ok(GameResult::DoubleForfeit),
            "BYE_AUTOMATIC" | "BYE" => Ok(GameResult::Bye(ByeKind::Automatic)),
            "BYE_REQUESTED" => Ok(GameResult::Bye(ByeKind::Requested)),
            "BYE_ABSENCE" => Ok(GameResult::Bye(ByeKind::Absence)),
            other => Err(ValidationError::InvalidResult(other.to_string())),
        }
    }
}

impl TryFrom<String> for GameResult {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GameResult> for String {
    fn from(result: GameResult) -> Self {
        result.to_string()
    }
}

/// One confirmed board (or bye) in the tournament history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub round: u32,
    pub white: PlayerId,
    pub black: Option<PlayerId>,
    pub result: GameResult,
    /// Set when an arbiter annuls the game after confirmation.
    #[serde(default)]
    pub voided: bool,
}

impl GameRecord {
    /// The color `player` had in this game, if they played it.
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        match self.black {
            Some(_) if self.white == player => Some(Color::White),
            Some(black) if black == player => Some(Color::Black),
            _ => None,
        }
    }

    /// The opponent of `player` in this game.
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

    /// Returns true if `player` took part in this record.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.white == player || self.black == Some(player)
    }

    /// Outcome for `player`, if the record is a game involving them.
    pub fn outcome_for(&self, player: PlayerId) -> Option<Outcome> {
        self.color_of(player)
            .and_then(|color| self.result.outcome_for(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_standard_notation() {
        assert_eq!("1-0".parse::<GameResult>().unwrap(), GameResult::WhiteWins);
        assert_eq!("0-1".parse::<GameResult>().unwrap(), GameResult::BlackWins);
        assert_eq!("1/2-1/2".parse::<GameResult>().unwrap(), GameResult::Draw);
        assert_eq!(
            "BYE_ABSENCE".parse::<GameResult>().unwrap(),
            GameResult::Bye(ByeKind::Absence)
        );
    }

    #[test]
    fn parse_rejects_pending() {
        assert_eq!(
            "PENDING".parse::<GameResult>(),
            Err(ValidationError::InvalidResult("PENDING".to_string()))
        );
    }

    #[test]
    fn outcomes_from_both_sides() {
        assert_eq!(GameResult::WhiteWins.outcome_for(Color::Black), Some(Outcome::Loss));
        assert_eq!(GameResult::BlackForfeitWin.outcome_for(Color::Black), Some(Outcome::Win));
        assert_eq!(GameResult::Draw.outcome_for(Color::White), Some(Outcome::Draw));
        assert_eq!(GameResult::DoubleForfeit.outcome_for(Color::White), Some(Outcome::Loss));
        assert_eq!(GameResult::DoubleForfeit.outcome_for(Color::Black), Some(Outcome::Loss));
        assert_eq!(GameResult::Bye(ByeKind::Automatic).outcome_for(Color::White), None);
    }

    #[test]
    fn forfeit_for_withdrawals() {
        assert_eq!(GameResult::forfeit(false, false), None);
        assert_eq!(GameResult::forfeit(true, false), Some(GameResult::BlackForfeitWin));
        assert_eq!(GameResult::forfeit(false, true), Some(GameResult::WhiteForfeitWin));
        assert_eq!(GameResult::forfeit(true, true), Some(GameResult::DoubleForfeit));
    }

    #[test]
    fn record_serializes_result_as_string() {
        let record = GameRecord {
            round: 2,
            white: PlayerId(1),
            black: Some(PlayerId(5)),
            result: GameResult::Draw,
            voided: false,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"result\":\"1/2-1/2\""));
        let back: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcome_for(PlayerId(5)), Some(Outcome::Draw));
    }

    #[test]
    fn record_rejects_unknown_result() {
        let json = r#"{"round":1,"white":1,"black":2,"result":"2-0"}"#;
        assert!(serde_json::from_str::<GameRecord>(json).is_err());
    }
}
