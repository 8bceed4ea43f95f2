//! Tiebreak computation over confirmed rounds.
//!
//! Values are always recomputed in full from the game history held by a
//! [`StandingsModel`]; there is no incremental update. Recomputing an
//! unchanged snapshot yields bit-identical output because every sum runs
//! over the history in round order and results are stored in ordered maps.
//!
//! Formulas:
//! - **Buchholz**: sum of the current scores of all opponents faced.
//! - **Sonneborn-Berger**: opponent's score for each win, half of it for
//!   each draw.
//! - **Progressive**: the player's running score after each round, summed.
//! - **Wins**: games won, plus a configurable credit for automatic and
//!   requested byes.
//! - **Mutual result**: not numeric; exposed as a [`HeadToHead`] matrix for
//!   the standings sort.
//!
//! A forfeit is not a game: it gives no opponent for Buchholz,
//! Sonneborn-Berger or the mutual result. A forfeit win still counts as a win.

use std::collections::BTreeMap;

use arbiter_core::{
    ByeWinPolicy, Color, GameRecord, Outcome, PlayerId, ScoringRules, TiebreakKey,
    TournamentConfig, VoidedGamePolicy,
};
use serde::{Deserialize, Serialize};

use crate::StandingsModel;

/// Direct-encounter results: points each player took from each opponent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    points: BTreeMap<PlayerId, BTreeMap<PlayerId, f64>>,
}

impl HeadToHead {
    /// Builds the matrix from every non-voided, played game of `standings`.
    pub fn from_standings(standings: &StandingsModel) -> Self {
        Self::from_games(standings.games().iter().filter(|g| !g.voided))
    }

    fn from_games<'a>(games: impl IntoIterator<Item = &'a GameRecord>) -> Self {
        let mut points: BTreeMap<PlayerId, BTreeMap<PlayerId, f64>> = BTreeMap::new();
        for game in games.into_iter().filter(|g| g.result.is_played()) {
            let Some(black) = game.black else { continue };
            for (player, opponent, color) in [
                (game.white, black, Color::White),
                (black, game.white, Color::Black),
            ] {
                let earned = match game.result.outcome_for(color) {
                    Some(Outcome::Win) => 1.0,
                    Some(Outcome::Draw) => 0.5,
                    _ => 0.0,
                };
                *points
                    .entry(player)
                    .or_default()
                    .entry(opponent)
                    .or_insert(0.0) += earned;
            }
        }
        HeadToHead { points }
    }

    /// Points `player` scored against `opponent`, if they met.
    pub fn result(&self, player: PlayerId, opponent: PlayerId) -> Option<f64> {
        self.points.get(&player)?.get(&opponent).copied()
    }

    /// Points `player` scored against the rest of `block`.
    ///
    /// Returns `None` unless every pair inside `block` has met, in which case
    /// direct encounters cannot separate the block.
    pub fn score_within(&self, player: PlayerId, block: &[PlayerId]) -> Option<f64> {
        for (i, &a) in block.iter().enumerate() {
            for &b in &block[i + 1..] {
                self.result(a, b)?;
            }
        }
        Some(
            block
                .iter()
                .filter(|&&other| other != player)
                .filter_map(|&other| self.result(player, other))
                .sum(),
        )
    }
}

/// Recomputed tiebreak values per player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TiebreakTable {
    values: BTreeMap<PlayerId, BTreeMap<TiebreakKey, f64>>,
    head_to_head: HeadToHead,
}

impl TiebreakTable {
    /// Value of `key` for `player`, zero when not computed.
    pub fn value(&self, player: PlayerId, key: TiebreakKey) -> f64 {
        self.values
            .get(&player)
            .and_then(|row| row.get(&key))
            .copied()
            .unwrap_or(0.0)
    }

    /// All computed values of `player`.
    pub fn row(&self, player: PlayerId) -> Option<&BTreeMap<TiebreakKey, f64>> {
        self.values.get(&player)
    }

    /// The full player → key → value map.
    pub fn values(&self) -> &BTreeMap<PlayerId, BTreeMap<TiebreakKey, f64>> {
        &self.values
    }

    /// The direct-encounter matrix used by the mutual-result step.
    pub fn head_to_head(&self) -> &HeadToHead {
        &self.head_to_head
    }
}

/// Computes tiebreak values from confirmed history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiebreakCalculator {
    scoring: ScoringRules,
    voided: VoidedGamePolicy,
    bye_wins: ByeWinPolicy,
}

impl TiebreakCalculator {
    /// Creates a calculator with explicit policies.
    pub fn new(scoring: ScoringRules, voided: VoidedGamePolicy, bye_wins: ByeWinPolicy) -> Self {
        TiebreakCalculator {
            scoring,
            voided,
            bye_wins,
        }
    }

    /// Creates a calculator from tournament settings.
    pub fn from_config(config: &TournamentConfig) -> Self {
        Self::new(config.points, config.voided_games, config.bye_wins)
    }

    /// Recomputes every numeric key in `keys` for every player.
    ///
    /// Keys that are not numeric (the mutual result) produce no column; the
    /// head-to-head matrix is always included.
    pub fn recompute(&self, standings: &StandingsModel, keys: &[TiebreakKey]) -> TiebreakTable {
        let counted: Vec<&GameRecord> = standings
            .games()
            .iter()
            .filter(|g| !g.voided || self.voided == VoidedGamePolicy::Count)
            .collect();
        let played: Vec<&GameRecord> = counted
            .iter()
            .copied()
            .filter(|g| g.result.is_played())
            .collect();

        let score_of = |id: PlayerId| standings.player(id).map_or(0.0, |p| p.score);

        let mut values = BTreeMap::new();
        for player in standings.players() {
            let id = player.id;
            let mut row = BTreeMap::new();
            for &key in keys {
                let value = match key {
                    TiebreakKey::Buchholz => played
                        .iter()
                        .filter_map(|g| g.opponent_of(id))
                        .map(score_of)
                        .sum(),
                    TiebreakKey::SonnebornBerger => played
                        .iter()
                        .filter_map(|g| {
                            let opponent = g.opponent_of(id)?;
                            match g.outcome_for(id)? {
                                Outcome::Win => Some(score_of(opponent)),
                                Outcome::Draw => Some(score_of(opponent) / 2.0),
                                Outcome::Loss => None,
                            }
                        })
                        .sum(),
                    TiebreakKey::Progressive => self.progressive(standings, id),
                    TiebreakKey::Wins => counted
                        .iter()
                        .filter(|g| g.involves(id))
                        .map(|g| match g.result.bye_kind() {
                            Some(kind) => self.bye_wins.credit(kind),
                            None if g.outcome_for(id) == Some(Outcome::Win) => 1.0,
                            None => 0.0,
                        })
                        .sum(),
                    TiebreakKey::MutualResult => continue,
                };
                row.insert(key, value);
            }
            values.insert(id, row);
        }

        let head_to_head = HeadToHead::from_games(played.iter().copied());
        TiebreakTable {
            values,
            head_to_head,
        }
    }

    fn progressive(&self, standings: &StandingsModel, id: PlayerId) -> f64 {
        let mut per_round = vec![0.0; standings.completed_rounds() as usize];
        for game in standings.games_of(id) {
            let color = game.color_of(id).unwrap_or(Color::White);
            if let Some(slot) = (game.round as usize)
                .checked_sub(1)
                .and_then(|i| per_round.get_mut(i))
            {
                *slot += self.scoring.points(game.result, color);
            }
        }

        let mut running = 0.0;
        let mut total = 0.0;
        for points in per_round {
            running += points;
            total += running;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{ByeKind, GameResult, Player};

    fn game(round: u32, white: u32, black: u32, result: GameResult) -> GameRecord {
        GameRecord {
            round,
            white: PlayerId(white),
            black: Some(PlayerId(black)),
            result,
            voided: false,
        }
    }

    fn bye(round: u32, player: u32, kind: ByeKind) -> GameRecord {
        GameRecord {
            round,
            white: PlayerId(player),
            black: None,
            result: GameResult::Bye(kind),
            voided: false,
        }
    }

    /// Four players, two rounds:
    /// R1: 1-2 1-0, 3-4 draw.  R2: 1-3 draw, 2 bye (automatic), 4 absent.
    fn standings() -> StandingsModel {
        let players = vec![
            Player::new(1, "A", 2000),
            Player::new(2, "B", 1900),
            Player::new(3, "C", 1800),
            Player::new(4, "D", 1700),
        ];
        let scoring = ScoringRules::default();
        let s = StandingsModel::new(players).unwrap();
        let s = s
            .apply_round(
                1,
                &[
                    game(1, 1, 2, GameResult::WhiteWins),
                    game(1, 3, 4, GameResult::Draw),
                ],
                &scoring,
            )
            .unwrap();
        s.apply_round(
            2,
            &[
                game(2, 3, 1, GameResult::Draw),
                bye(2, 2, ByeKind::Automatic),
                bye(2, 4, ByeKind::Absence),
            ],
            &scoring,
        )
        .unwrap()
    }

    fn calculator() -> TiebreakCalculator {
        TiebreakCalculator::from_config(&TournamentConfig::default())
    }

    #[test]
    fn buchholz_sums_opponent_scores() {
        let s = standings();
        // Scores: 1 = 1.5, 2 = 1.0, 3 = 1.0, 4 = 0.5
        let table = calculator().recompute(&s, &[TiebreakKey::Buchholz]);
        assert_eq!(table.value(PlayerId(1), TiebreakKey::Buchholz), 2.0);
        assert_eq!(table.value(PlayerId(2), TiebreakKey::Buchholz), 1.5);
        assert_eq!(table.value(PlayerId(3), TiebreakKey::Buchholz), 2.0);
        assert_eq!(table.value(PlayerId(4), TiebreakKey::Buchholz), 1.0);
    }

    #[test]
    fn sonneborn_berger_weights_wins_and_draws() {
        let s = standings();
        let table = calculator().recompute(&s, &[TiebreakKey::SonnebornBerger]);
        // 1: beat 2 (1.0) + drew 3 (1.0 / 2)
        assert_eq!(table.value(PlayerId(1), TiebreakKey::SonnebornBerger), 1.5);
        assert_eq!(table.value(PlayerId(2), TiebreakKey::SonnebornBerger), 0.0);
        // 3: drew 4 (0.5 / 2) + drew 1 (1.5 / 2)
        assert_eq!(table.value(PlayerId(3), TiebreakKey::SonnebornBerger), 1.0);
    }

    #[test]
    fn progressive_accumulates_running_score() {
        let s = standings();
        let table = calculator().recompute(&s, &[TiebreakKey::Progressive]);
        // 1: 1.0 + 1.5, 2: 0.0 + 1.0, 4: 0.5 + 0.5
        assert_eq!(table.value(PlayerId(1), TiebreakKey::Progressive), 2.5);
        assert_eq!(table.value(PlayerId(2), TiebreakKey::Progressive), 1.0);
        assert_eq!(table.value(PlayerId(4), TiebreakKey::Progressive), 1.0);
    }

    #[test]
    fn wins_credit_byes_by_policy() {
        let s = standings();
        let table = calculator().recompute(&s, &[TiebreakKey::Wins]);
        assert_eq!(table.value(PlayerId(1), TiebreakKey::Wins), 1.0);
        assert_eq!(table.value(PlayerId(2), TiebreakKey::Wins), 0.5);
        assert_eq!(table.value(PlayerId(4), TiebreakKey::Wins), 0.0);

        let strict = TiebreakCalculator::new(
            ScoringRules::default(),
            VoidedGamePolicy::Exclude,
            ByeWinPolicy::None,
        );
        let table = strict.recompute(&s, &[TiebreakKey::Wins]);
        assert_eq!(table.value(PlayerId(2), TiebreakKey::Wins), 0.0);
    }

    #[test]
    fn mutual_result_has_no_column() {
        let s = standings();
        let table = calculator().recompute(&s, &[TiebreakKey::MutualResult]);
        assert!(table.row(PlayerId(1)).unwrap().is_empty());
        assert_eq!(table.head_to_head().result(PlayerId(1), PlayerId(2)), Some(1.0));
        assert_eq!(table.head_to_head().result(PlayerId(2), PlayerId(1)), Some(0.0));
        assert_eq!(table.head_to_head().result(PlayerId(2), PlayerId(4)), None);
    }

    #[test]
    fn voided_games_follow_policy() {
        let s = standings().void_game(1, PlayerId(1)).unwrap();
        let keys = [TiebreakKey::Buchholz];

        let excluded = calculator().recompute(&s, &keys);
        assert_eq!(excluded.value(PlayerId(1), TiebreakKey::Buchholz), 1.0);

        let counted = TiebreakCalculator::new(
            ScoringRules::default(),
            VoidedGamePolicy::Count,
            ByeWinPolicy::Half,
        )
        .recompute(&s, &keys);
        assert_eq!(counted.value(PlayerId(1), TiebreakKey::Buchholz), 2.0);
    }

    #[test]
    fn forfeits_give_no_opponent() {
        // R3: 1 wins against 4 by forfeit, 2-3 draw.
        let s = standings()
            .apply_round(
                3,
                &[
                    game(3, 1, 4, GameResult::WhiteForfeitWin),
                    game(3, 2, 3, GameResult::Draw),
                ],
                &ScoringRules::default(),
            )
            .unwrap();
        // Scores: 1 = 2.5, 2 = 1.5, 3 = 1.5, 4 = 0.5
        let table = calculator().recompute(&s, &TiebreakKey::ALL);
        assert_eq!(table.value(PlayerId(1), TiebreakKey::Buchholz), 3.0);
        assert_eq!(table.value(PlayerId(4), TiebreakKey::Buchholz), 1.5);
        // 1: beat 2 (1.5) + drew 3 (1.5 / 2)
        assert_eq!(table.value(PlayerId(1), TiebreakKey::SonnebornBerger), 2.25);
        assert_eq!(table.value(PlayerId(1), TiebreakKey::Wins), 2.0);
        assert_eq!(table.head_to_head().result(PlayerId(1), PlayerId(4)), None);
        assert_eq!(HeadToHead::from_standings(&s).result(PlayerId(4), PlayerId(1)), None);
    }

    #[test]
    fn recompute_is_idempotent() {
        let s = standings();
        let first = calculator().recompute(&s, &TiebreakKey::ALL);
        let second = calculator().recompute(&s, &TiebreakKey::ALL);
        assert_eq!(first, second);
    }

    #[test]
    fn score_within_requires_complete_block() {
        let s = standings();
        let h2h = HeadToHead::from_standings(&s);
        assert_eq!(h2h.score_within(PlayerId(1), &[PlayerId(1), PlayerId(2)]), Some(1.0));
        assert_eq!(
            h2h.score_within(PlayerId(1), &[PlayerId(1), PlayerId(2), PlayerId(3)]),
            None
        );
    }
}
