//! Color allocation for a single pairing.
//!
//! Rules, first one that discriminates wins:
//! 1. The player with the larger whites-minus-blacks difference gets black.
//! 2. Nobody gets the same color three times in a row.
//! 3. Nobody leaves the [-2, +2] difference band if a swap avoids it.
//! 4. Otherwise each player's alternation preference is honored, the
//!    higher-ranked player winning a shared preference.
//!
//! When rule 1 would produce a third consecutive color, the affected player
//! alternates instead and the pairing carries a [`ColorConflict`].

use arbiter_core::{Color, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Largest allowed absolute color difference.
pub const MAX_COLOR_DIFFERENCE: i32 = 2;

/// Why a color conflict was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Balancing colors would have given the player a third consecutive
    /// color; the player alternated instead.
    StreakOverridesBalance,
    /// Both players needed the same color; the higher-ranked one got it.
    SharedAbsolutePreference,
}

/// A color preference that could not be honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorConflict {
    /// The player whose preference yielded.
    pub player: PlayerId,
    pub opponent: PlayerId,
    pub kind: ConflictKind,
}

/// Final colors of a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorAssignment {
    pub white: PlayerId,
    pub black: PlayerId,
    pub conflict: Option<ColorConflict>,
}

/// How strongly a player wants a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Preference {
    color: Color,
    absolute: bool,
}

fn preference(player: &Player) -> Option<Preference> {
    let streak = player.color_streak();
    if let Some((c, run)) = streak {
        if run >= 2 {
            return Some(Preference {
                color: c.opposite(),
                absolute: true,
            });
        }
    }
    let diff = player.color_difference();
    let color = match diff {
        d if d > 0 => Color::Black,
        d if d < 0 => Color::White,
        _ => streak?.0.opposite(),
    };
    Some(Preference {
        color,
        absolute: diff.abs() >= MAX_COLOR_DIFFERENCE,
    })
}

fn streak_of(player: &Player, color: Color) -> usize {
    match player.color_streak() {
        Some((c, run)) if c == color => run,
        _ => 0,
    }
}

fn within_band(player: &Player, color: Color) -> bool {
    (player.color_difference() + color.balance()).abs() <= MAX_COLOR_DIFFERENCE
}

fn distinct_needs(a: Option<Color>, b: Option<Color>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x != y,
        _ => true,
    }
}

fn ranks_higher(a: &Player, b: &Player) -> bool {
    (a.initial_rank, a.pairing_number, a.id) <= (b.initial_rank, b.pairing_number, b.id)
}

/// Assigns white and black for one pairing.
pub struct ColorAllocator;

impl ColorAllocator {
    /// The color `player` must receive, if any.
    ///
    /// A difference of two (or more), or two consecutive games with the same
    /// color, leaves only the other color.
    pub fn required(player: &Player) -> Option<Color> {
        Self::band_required(player).or_else(|| match player.color_streak() {
            Some((c, run)) if run >= 2 => Some(c.opposite()),
            _ => None,
        })
    }

    /// The color that keeps `player` inside the difference band, if only one
    /// does.
    pub fn band_required(player: &Player) -> Option<Color> {
        match player.color_difference() {
            d if d >= MAX_COLOR_DIFFERENCE => Some(Color::Black),
            d if d <= -MAX_COLOR_DIFFERENCE => Some(Color::White),
            _ => None,
        }
    }

    /// Returns true unless both players require the same color.
    pub fn compatible(a: &Player, b: &Player) -> bool {
        distinct_needs(Self::required(a), Self::required(b))
    }

    /// Returns true if some color assignment keeps both players inside the
    /// difference band.
    pub fn band_compatible(a: &Player, b: &Player) -> bool {
        distinct_needs(Self::band_required(a), Self::band_required(b))
    }

    /// Decides who plays white.
    ///
    /// `fallback` is the higher-ranked player's color when neither player has
    /// any history that separates them (first round, or identical records).
    pub fn assign_colors(a: &Player, b: &Player, fallback: Color) -> ColorAssignment {
        let (hi, lo) = if ranks_higher(a, b) { (a, b) } else { (b, a) };
        let mut conflict = None;

        let hi_diff = hi.color_difference();
        let lo_diff = lo.color_difference();
        let mut hi_color = if hi_diff != lo_diff {
            let (heavier, lighter) = if hi_diff > lo_diff { (hi, lo) } else { (lo, hi) };
            let mut heavier_color = Color::Black;
            if streak_of(heavier, Color::Black) >= 2 {
                heavier_color = Color::White;
                conflict = Some((heavier, lighter, ConflictKind::StreakOverridesBalance));
            } else if streak_of(lighter, Color::White) >= 2 {
                heavier_color = Color::White;
                conflict = Some((lighter, heavier, ConflictKind::StreakOverridesBalance));
            }
            if heavier.id == hi.id {
                heavier_color
            } else {
                heavier_color.opposite()
            }
        } else {
            match (preference(hi), preference(lo)) {
                (Some(p), Some(q)) if p.color == q.color => {
                    if q.absolute && !p.absolute {
                        q.color.opposite()
                    } else {
                        if p.absolute && q.absolute {
                            conflict = Some((lo, hi, ConflictKind::SharedAbsolutePreference));
                        }
                        p.color
                    }
                }
                (Some(p), _) => p.color,
                (None, Some(q)) => q.color.opposite(),
                (None, None) => fallback,
            }
        };

        if !(within_band(hi, hi_color) && within_band(lo, hi_color.opposite()))
            && within_band(hi, hi_color.opposite())
            && within_band(lo, hi_color)
        {
            hi_color = hi_color.opposite();
        }

        let (white, black) = match hi_color {
            Color::White => (hi.id, lo.id),
            Color::Black => (lo.id, hi.id),
        };
        ColorAssignment {
            white,
            black,
            conflict: conflict.map(|(player, opponent, kind)| ColorConflict {
                player: player.id,
                opponent: opponent.id,
                kind,
            }),
        }
    }
}
