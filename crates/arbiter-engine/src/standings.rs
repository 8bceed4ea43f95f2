//! Immutable standings snapshot: players, scores and confirmed history.
//!
//! A [`StandingsModel`] never changes in place during pairing. Confirming a
//! round produces a new snapshot via [`StandingsModel::apply_round`], which
//! the caller swaps in once everything else about the round has succeeded.

use std::collections::{BTreeMap, BTreeSet};

use arbiter_core::{
    ByeRecord, Color, GameRecord, Player, PlayerId, ScoringRules, TiebreakKey, ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::tiebreak::TiebreakTable;

/// Players sharing one score, best initial rank first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreGroup {
    pub score: f64,
    pub players: Vec<PlayerId>,
}

impl ScoreGroup {
    /// Partitions `players` into score groups, highest score first.
    pub fn build<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<ScoreGroup> {
        let mut sorted: Vec<&Player> = players.into_iter().collect();
        sorted.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.initial_rank.cmp(&b.initial_rank))
        });

        let mut groups: Vec<ScoreGroup> = Vec::new();
        for player in sorted {
            match groups.last_mut() {
                Some(group) if group.score == player.score => group.players.push(player.id),
                _ => groups.push(ScoreGroup {
                    score: player.score,
                    players: vec![player.id],
                }),
            }
        }
        groups
    }

    /// Number of players in the group.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if the group has no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Players and confirmed history of one tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsModel {
    /// Ordered by initial rank.
    players: Vec<Player>,
    games: Vec<GameRecord>,
    completed_rounds: u32,
}

impl StandingsModel {
    /// Builds the opening snapshot of a tournament.
    ///
    /// Initial ranks are derived from rating (descending), ties broken by
    /// name and then id. Players without a pairing number get the next free
    /// numbers in rank order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicatePlayer`] if an id appears twice.
    pub fn new(mut players: Vec<Player>) -> Result<Self, ValidationError> {
        let mut ids = BTreeSet::new();
        for player in &players {
            if !ids.insert(player.id) {
                return Err(ValidationError::DuplicatePlayer(player.id));
            }
        }

        players.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        let mut next_number = players.iter().map(|p| p.pairing_number).max().unwrap_or(0);
        let mut numbers = BTreeSet::new();
        for (rank, player) in players.iter_mut().enumerate() {
            player.initial_rank = rank as u32 + 1;
            if player.pairing_number == 0 || !numbers.insert(player.pairing_number) {
                next_number += 1;
                player.pairing_number = next_number;
                numbers.insert(next_number);
            }
        }

        Ok(StandingsModel {
            players,
            games: Vec::new(),
            completed_rounds: 0,
        })
    }

    /// All players, ordered by initial rank.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks up a player, failing on unknown ids.
    pub fn get(&self, id: PlayerId) -> Result<&Player, ValidationError> {
        self.player(id).ok_or(ValidationError::UnknownPlayer(id))
    }

    /// Players who have not withdrawn, in rank order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.withdrawn)
    }

    /// Every confirmed board and bye, in round order.
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// Confirmed records involving `player`.
    pub fn games_of(&self, player: PlayerId) -> impl Iterator<Item = &GameRecord> {
        self.games.iter().filter(move |g| g.involves(player))
    }

    /// Number of confirmed rounds.
    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Score groups of all active players.
    pub fn score_groups(&self) -> Vec<ScoreGroup> {
        ScoreGroup::build(self.active_players())
    }

    /// Marks a player as withdrawn from future rounds.
    pub fn withdraw(&mut self, id: PlayerId) -> Result<(), ValidationError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ValidationError::UnknownPlayer(id))?;
        player.withdrawn = true;
        Ok(())
    }

    /// Computes the snapshot after confirming `round` with `records`.
    ///
    /// Pure: `self` is untouched and nothing is returned unless every record
    /// is valid.
    ///
    /// # Errors
    ///
    /// Fails if the round is out of sequence, a record names an unknown
    /// player, a player appears twice, or a record mixes a bye result with a
    /// game (or the reverse).
    pub fn apply_round(
        &self,
        round: u32,
        records: &[GameRecord],
        scoring: &ScoringRules,
    ) -> Result<Self, ValidationError> {
        let expected = self.completed_rounds + 1;
        if round != expected {
            return Err(ValidationError::RoundOutOfSequence {
                expected,
                got: round,
            });
        }

        let mut next = self.clone();
        let mut seen = BTreeSet::new();
        for record in records {
            if record.round != round {
                return Err(ValidationError::RoundOutOfSequence {
                    expected: round,
                    got: record.round,
                });
            }
            for id in std::iter::once(record.white).chain(record.black) {
                if !seen.insert(id) {
                    return Err(ValidationError::DuplicatePlayer(id));
                }
            }

            match record.black {
                None => {
                    let kind = record
                        .result
                        .bye_kind()
                        .ok_or_else(|| ValidationError::InvalidResult(record.result.to_string()))?;
                    let player = next.player_mut(record.white)?;
                    player.score += scoring.bye_points(kind);
                    player.byes.push(ByeRecord { round, kind });
                    player.color_history.push(None);
                }
                Some(black) => {
                    if record.result.bye_kind().is_some() {
                        return Err(ValidationError::InvalidResult(record.result.to_string()));
                    }
                    let played = record.result.is_played();
                    for (id, color, opponent) in [
                        (record.white, Color::White, black),
                        (black, Color::Black, record.white),
                    ] {
                        let player = next.player_mut(id)?;
                        player.score += scoring.points(record.result, color);
                        if played {
                            player.color_history.push(Some(color));
                            player.opponents.insert(opponent);
                        } else {
                            player.color_history.push(None);
                        }
                    }
                }
            }
        }

        next.games.extend(records.iter().cloned());
        next.completed_rounds = round;
        tracing::debug!(round, records = records.len(), "Standings updated");
        Ok(next)
    }

    /// Computes the snapshot with the game of `player` in `round` voided.
    ///
    /// Scores are unchanged; tiebreaks decide how voided games count.
    pub fn void_game(&self, round: u32, player: PlayerId) -> Result<Self, ValidationError> {
        if self.player(player).is_none() {
            return Err(ValidationError::UnknownPlayer(player));
        }
        let mut next = self.clone();
        let game = next
            .games
            .iter_mut()
            .find(|g| g.round == round && g.black.is_some() && g.involves(player))
            .ok_or(ValidationError::NoGameInRound { round, player })?;
        game.voided = true;
        Ok(next)
    }

    /// Final standings order.
    ///
    /// Players are ordered by score, then by each key of `order` (numeric
    /// keys descending; the mutual result only separates a tied block whose
    /// members have all played each other), then by rating, then by pairing
    /// number.
    pub fn ranking(&self, tiebreaks: &TiebreakTable, order: &[TiebreakKey]) -> Vec<PlayerId> {
        let head_to_head = tiebreaks.head_to_head();
        let mut blocks: Vec<Vec<&Player>> = vec![self.players.iter().collect()];

        blocks = refine(blocks, |_, p| p.score);
        for &key in order {
            blocks = match key {
                TiebreakKey::MutualResult => refine(blocks, |block, p| {
                    let ids: Vec<PlayerId> = block.iter().map(|q| q.id).collect();
                    head_to_head.score_within(p.id, &ids).unwrap_or(0.0)
                }),
                numeric => refine(blocks, |_, p| tiebreaks.value(p.id, numeric)),
            };
        }
        blocks = refine(blocks, |_, p| f64::from(p.rating));
        blocks = refine(blocks, |_, p| -f64::from(p.pairing_number));

        blocks.into_iter().flatten().map(|p| p.id).collect()
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, ValidationError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ValidationError::UnknownPlayer(id))
    }
}

/// Splits every tied block by `key`, highest value first.
fn refine<'a>(
    blocks: Vec<Vec<&'a Player>>,
    key: impl Fn(&[&'a Player], &'a Player) -> f64,
) -> Vec<Vec<&'a Player>> {
    let mut out = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        if block.len() < 2 {
            out.push(block);
            continue;
        }
        let values: BTreeMap<PlayerId, f64> =
            block.iter().map(|&p| (p.id, key(&block, p))).collect();
        block.sort_by(|a, b| values[&b.id].total_cmp(&values[&a.id]));

        let mut current: Vec<&Player> = Vec::new();
        for player in block {
            if let Some(prev) = current.last() {
                if values[&prev.id] != values[&player.id] {
                    out.push(std::mem::take(&mut current));
                }
            }
            current.push(player);
        }
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_core::{ByeKind, GameResult};

    fn roster() -> Vec<Player> {
        vec![
            Player::new(10, "Carol", 1900),
            Player::new(11, "Alice", 2100),
            Player::new(12, "Bob", 1900),
            Player::new(13, "Dave", 1700),
        ]
    }

    #[test]
    fn initial_rank_by_rating_then_name() {
        let standings = StandingsModel::new(roster()).unwrap();
        let order: Vec<u32> = standings.players().iter().map(|p| p.id.0).collect();
        assert_eq!(order, vec![11, 12, 10, 13]);
        let ranks: Vec<u32> = standings.players().iter().map(|p| p.initial_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        let numbers: Vec<u32> = standings.players().iter().map(|p| p.pairing_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut players = roster();
        players.push(Player::new(10, "Carol again", 1000));
        assert_eq!(
            StandingsModel::new(players),
            Err(ValidationError::DuplicatePlayer(PlayerId(10)))
        );
    }

    #[test]
    fn apply_round_updates_history() {
        let standings = StandingsModel::new(roster()).unwrap();
        let records = vec![
            GameRecord {
                round: 1,
                white: PlayerId(11),
                black: Some(PlayerId(10)),
                result: GameResult::Draw,
                voided: false,
            },
            GameRecord {
                round: 1,
                white: PlayerId(13),
                black: Some(PlayerId(12)),
                result: GameResult::BlackForfeitWin,
                voided: false,
            },
        ];
        let next = standings
            .apply_round(1, &records, &ScoringRules::default())
            .unwrap();

        assert_eq!(standings.completed_rounds(), 0);
        assert_eq!(next.completed_rounds(), 1);

        let alice = next.player(PlayerId(11)).unwrap();
        assert_eq!(alice.score, 0.5);
        assert_eq!(alice.color_history, vec![Some(Color::White)]);
        assert!(alice.has_played(PlayerId(10)));

        let bob = next.player(PlayerId(12)).unwrap();
        assert_eq!(bob.score, 1.0);
        assert_eq!(bob.color_history, vec![None]);
        assert!(!bob.has_played(PlayerId(13)));
    }

    #[test]
    fn apply_round_records_byes() {
        let standings = StandingsModel::new(roster()).unwrap();
        let records = vec![GameRecord {
            round: 1,
            white: PlayerId(13),
            black: None,
            result: GameResult::Bye(ByeKind::Requested),
            voided: false,
        }];
        let next = standings
            .apply_round(1, &records, &ScoringRules::default())
            .unwrap();
        let dave = next.player(PlayerId(13)).unwrap();
        assert_eq!(dave.score, 0.5);
        assert_eq!(
            dave.byes,
            vec![ByeRecord {
                round: 1,
                kind: ByeKind::Requested
            }]
        );
        assert!(dave.opponents.is_empty());
    }

    #[test]
    fn apply_round_rejects_out_of_sequence_and_duplicates() {
        let standings = StandingsModel::new(roster()).unwrap();
        assert_eq!(
            standings.apply_round(2, &[], &ScoringRules::default()),
            Err(ValidationError::RoundOutOfSequence {
                expected: 1,
                got: 2
            })
        );

        let records = vec![
            GameRecord {
                round: 1,
                white: PlayerId(11),
                black: Some(PlayerId(10)),
                result: GameResult::WhiteWins,
                voided: false,
            },
            GameRecord {
                round: 1,
                white: PlayerId(10),
                black: None,
                result: GameResult::Bye(ByeKind::Automatic),
                voided: false,
            },
        ];
        assert_eq!(
            standings.apply_round(1, &records, &ScoringRules::default()),
            Err(ValidationError::DuplicatePlayer(PlayerId(10)))
        );
    }

    #[test]
    fn void_game_needs_a_game_in_that_round() {
        let records = vec![
            GameRecord {
                round: 1,
                white: PlayerId(11),
                black: Some(PlayerId(10)),
                result: GameResult::Draw,
                voided: false,
            },
            GameRecord {
                round: 1,
                white: PlayerId(13),
                black: None,
                result: GameResult::Bye(ByeKind::Automatic),
                voided: false,
            },
        ];
        let standings = StandingsModel::new(roster())
            .unwrap()
            .apply_round(1, &records, &ScoringRules::default())
            .unwrap();

        assert_eq!(
            standings.void_game(1, PlayerId(13)),
            Err(ValidationError::NoGameInRound {
                round: 1,
                player: PlayerId(13)
            })
        );
        assert_eq!(
            standings.void_game(2, PlayerId(11)),
            Err(ValidationError::NoGameInRound {
                round: 2,
                player: PlayerId(11)
            })
        );
        assert_eq!(
            standings.void_game(1, PlayerId(99)),
            Err(ValidationError::UnknownPlayer(PlayerId(99)))
        );
        let voided = standings.void_game(1, PlayerId(10)).unwrap();
        assert!(voided.games()[0].voided);
        assert_eq!(voided.player(PlayerId(10)).unwrap().score, 0.5);
    }

    #[test]
    fn score_groups_descending() {
        let mut players = roster();
        players[0].score = 1.0;
        players[3].score = 1.0;
        let standings = StandingsModel::new(players).unwrap();
        let groups = standings.score_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].score, 1.0);
        assert_eq!(groups[0].players, vec![PlayerId(10), PlayerId(13)]);
        assert_eq!(groups[1].players, vec![PlayerId(11), PlayerId(12)]);
    }

    #[test]
    fn withdrawn_players_leave_score_groups() {
        let mut standings = StandingsModel::new(roster()).unwrap();
        standings.withdraw(PlayerId(12)).unwrap();
        let groups = standings.score_groups();
        assert_eq!(groups[0].len(), 3);
        assert!(!groups[0].players.contains(&PlayerId(12)));
        assert!(standings.withdraw(PlayerId(99)).is_err());
    }
}
