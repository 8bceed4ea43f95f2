//! FIDE Dutch system pairing.
//!
//! A round is generated in three steps:
//! 1. Byes: absences and requests leave the pool; an odd pool gives one
//!    automatic bye.
//! 2. Brackets: the pool is split into score groups and paired top-down,
//!    floating players down where a group cannot be completed (see
//!    [`search`]).
//! 3. Colors and tables: each pair gets its colors from
//!    [`ColorAllocator`], and tables are numbered from the highest score
//!    down.
//!
//! Pairing is first attempted without rematches and without two players who
//! both need the same color, then letting a same-color streak yield, and, if
//! the tournament allows it, with a single flagged rematch. Two players who
//! both sit at the same edge of the [-2, +2] difference band are never
//! paired; if that leaves the pool unpairable the round fails. Within each level
//! the automatic bye candidates are tried in [`ByeAllocator`] order until the
//! rest of the pool pairs.

mod search;

use arbiter_core::{
    ByeKind, Color, Pairing, Player, PlayerId, TournamentConfig, ValidationError,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bye::{ByeAllocator, ByeAssignment, RoundRequest};
use crate::color::{ColorAllocator, ColorConflict};
use crate::{MasterSeed, PairingError, StandingsModel};
use search::{Fit, PairTable};

/// Output of one generated round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPairings {
    pub round: u32,
    /// Boards in table order, followed by byes.
    pub pairings: Vec<Pairing>,
    /// Color preferences that could not be honored.
    #[serde(default)]
    pub color_conflicts: Vec<ColorConflict>,
    /// Boards that repeat an earlier game, as (white, black).
    #[serde(default)]
    pub repeated_pairings: Vec<(PlayerId, PlayerId)>,
}

impl RoundPairings {
    /// Boards with two players.
    pub fn games(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| !p.is_bye())
    }

    /// Bye records.
    pub fn byes(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| p.is_bye())
    }

    /// The pairing of `player`, if any.
    pub fn pairing_of(&self, player: PlayerId) -> Option<&Pairing> {
        self.pairings.iter().find(|p| p.involves(player))
    }
}

/// How much of the pairing rules may be relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Strictness {
    Strict,
    IgnoreColors,
    AllowRepeat,
}

impl Strictness {
    fn fit(self, a: &Player, b: &Player) -> Fit {
        if !ColorAllocator::band_compatible(a, b) {
            return Fit::Illegal;
        }
        if a.has_played(b.id) || b.has_played(a.id) {
            return match self {
                Strictness::AllowRepeat => Fit::Repeat,
                _ => Fit::Illegal,
            };
        }
        if self == Strictness::Strict && !ColorAllocator::compatible(a, b) {
            return Fit::Illegal;
        }
        Fit::Legal
    }

    fn repeat_budget(self) -> u32 {
        match self {
            Strictness::AllowRepeat => 1,
            _ => 0,
        }
    }
}

/// Pairs Swiss rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwissPairingEngine {
    max_requested_byes: u32,
    allow_repeat_pairing: bool,
}

impl SwissPairingEngine {
    pub fn new(max_requested_byes: u32, allow_repeat_pairing: bool) -> Self {
        SwissPairingEngine {
            max_requested_byes,
            allow_repeat_pairing,
        }
    }

    pub fn from_config(config: &TournamentConfig) -> Self {
        Self::new(config.max_requested_byes, config.allow_repeat_pairing)
    }

    fn levels(&self) -> &'static [Strictness] {
        if self.allow_repeat_pairing {
            &[
                Strictness::Strict,
                Strictness::IgnoreColors,
                Strictness::AllowRepeat,
            ]
        } else {
            &[Strictness::Strict, Strictness::IgnoreColors]
        }
    }

    /// Pairs `round` from the confirmed `standings`.
    ///
    /// Pure: the same standings, round, seed and request always give the same
    /// pairings.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Validation`] for an invalid bye request
    /// - [`PairingError::InsufficientPlayers`] when fewer than two players
    ///   are left to pair
    /// - [`PairingError::UnpairableGroup`] when no legal pairing exists
    pub fn generate_round(
        &self,
        standings: &StandingsModel,
        round: u32,
        seed: &MasterSeed,
        request: &RoundRequest,
    ) -> Result<RoundPairings, PairingError> {
        for id in request.players() {
            if standings.get(id)?.withdrawn {
                return Err(ValidationError::WithdrawnPlayer(id).into());
            }
        }

        let active: Vec<&Player> = standings.active_players().collect();
        let resolution = ByeAllocator::resolve_requests(
            &active,
            &request.requested_byes,
            &request.absences,
            self.max_requested_byes,
        )?;
        let mut pool = resolution.remaining;
        if pool.len() < 2 {
            return Err(PairingError::InsufficientPlayers {
                round,
                eligible: pool.len(),
            });
        }
        pool.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.initial_rank.cmp(&b.initial_rank))
                .then(a.id.cmp(&b.id))
        });

        let bye_candidates: Vec<Option<PlayerId>> = if pool.len() % 2 == 1 {
            ByeAllocator::automatic_order(&pool)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None]
        };

        let mut failure = None;
        for &level in self.levels() {
            for (attempt, &bye) in bye_candidates.iter().enumerate() {
                let players: Vec<&Player> = pool
                    .iter()
                    .copied()
                    .filter(|p| Some(p.id) != bye)
                    .collect();
                match pair_pool(round, &players, level) {
                    Ok(pairs) => {
                        let mut byes = resolution.assignments;
                        if let Some(player) = bye {
                            byes.push(ByeAssignment {
                                player,
                                kind: ByeKind::Automatic,
                            });
                        }
                        return Ok(finish(round, seed, &players, &pairs, &byes));
                    }
                    Err(err) => {
                        tracing::debug!(
                            round,
                            ?level,
                            bye = ?bye,
                            "No pairing: {}",
                            err
                        );
                        if attempt == 0 {
                            failure = Some(err);
                        }
                    }
                }
            }
        }

        Err(failure.unwrap_or(PairingError::InsufficientPlayers {
            round,
            eligible: pool.len(),
        }))
    }
}

/// Pairs `players` (sorted by score and rank) bracket by bracket.
fn pair_pool(
    round: u32,
    players: &[&Player],
    level: Strictness,
) -> Result<Vec<(usize, usize)>, PairingError> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, player) in players.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if players[group[0]].score == player.score => group.push(i),
            _ => groups.push(vec![i]),
        }
    }

    let table = PairTable::new(players.len(), |a, b| level.fit(players[a], players[b]));
    search::pair_brackets(&groups, &table, level.repeat_budget()).map_err(|stuck| {
        let score = groups
            .get(stuck.bracket)
            .and_then(|g| g.first())
            .map_or(0.0, |&i| players[i].score);
        PairingError::UnpairableGroup {
            round,
            score,
            players: stuck.members.iter().map(|&i| players[i].id).collect(),
        }
    })
}

/// Numbers the tables, assigns colors and appends the byes.
fn finish(
    round: u32,
    seed: &MasterSeed,
    players: &[&Player],
    pairs: &[(usize, usize)],
    byes: &[ByeAssignment],
) -> RoundPairings {
    let mut rng = seed.round_rng(round);
    let lot = if rng.gen::<bool>() {
        Color::White
    } else {
        Color::Black
    };

    let mut boards: Vec<(&Player, &Player)> = pairs
        .iter()
        .map(|&(a, b)| (players[a], players[b]))
        .collect();
    let board_key = |&(a, b): &(&Player, &Player)| (a.score.max(b.score), a.initial_rank.min(b.initial_rank));
    boards.sort_by(|x, y| {
        let (x_score, x_rank) = board_key(x);
        let (y_score, y_rank) = board_key(y);
        y_score.total_cmp(&x_score).then(x_rank.cmp(&y_rank))
    });

    let mut pairings = Vec::with_capacity(boards.len() + byes.len());
    let mut color_conflicts = Vec::new();
    let mut repeated_pairings = Vec::new();
    for (i, (a, b)) in boards.iter().enumerate() {
        let table = i as u32 + 1;
        let fallback = if i % 2 == 0 { lot } else { lot.opposite() };
        let assignment = ColorAllocator::assign_colors(a, b, fallback);

        if let Some(conflict) = assignment.conflict {
            tracing::warn!(
                round,
                table,
                player = %conflict.player,
                kind = ?conflict.kind,
                "Color preference conflict"
            );
            color_conflicts.push(conflict);
        }
        if a.has_played(b.id) {
            tracing::warn!(
                round,
                table,
                "Repeat pairing {} - {}: no other legal pairing",
                assignment.white,
                assignment.black
            );
            repeated_pairings.push((assignment.white, assignment.black));
        }
        pairings.push(Pairing::game(table, assignment.white, assignment.black));
    }
    for bye in byes {
        tracing::debug!(round, player = %bye.player, kind = %bye.kind, "Bye assigned");
        pairings.push(Pairing::bye(bye.player, bye.kind));
    }

    tracing::info!(
        "Round {} paired: {} boards, {} byes",
        round,
        boards.len(),
        byes.len()
    );
    RoundPairings {
        round,
        pairings,
        color_conflicts,
        repeated_pairings,
    }
}
