//! Round-robin scheduling by the circle method.
//!
//! The top seed stays at position 0 while everyone else rotates one place
//! per round; position `i` meets position `n - 1 - i`. An odd field gets a
//! dummy that takes the fixed position instead (the bye number of the Berger
//! tables), and whoever faces it has a bye that round.
//!
//! Colors follow position parity: away from table one, the player on an even
//! position has white. At table one the fixed player has white in odd rounds.
//! Over the full schedule every color difference stays within one.

use arbiter_core::{ByeKind, Color, Pairing, PlayerId};

use crate::PairingError;

/// Builds complete round-robin schedules.
pub struct RoundRobinScheduler;

impl RoundRobinScheduler {
    /// Number of rounds needed for `players` participants.
    pub fn rounds_for(players: usize) -> u32 {
        match players {
            0 | 1 => 0,
            n if n % 2 == 0 => (n - 1) as u32,
            n => n as u32,
        }
    }

    /// Every round of the tournament, round one first.
    ///
    /// `seeds` lists the players in seed order. The result is a pure function
    /// of that order.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InsufficientPlayers`] for fewer than two
    /// players.
    pub fn generate_schedule(seeds: &[PlayerId]) -> Result<Vec<Vec<Pairing>>, PairingError> {
        if seeds.len() < 2 {
            return Err(PairingError::InsufficientPlayers {
                round: 1,
                eligible: seeds.len(),
            });
        }

        let mut slots: Vec<Option<PlayerId>> = Vec::with_capacity(seeds.len() + 1);
        if seeds.len() % 2 == 1 {
            slots.push(None);
        }
        slots.extend(seeds.iter().copied().map(Some));
        let n = slots.len();

        let mut schedule = Vec::with_capacity(n - 1);
        for round in 1..n as u32 {
            let mut boards = Vec::with_capacity(n / 2);
            let mut byes = Vec::new();
            for i in 0..n / 2 {
                let (a, b) = (slots[i], slots[n - 1 - i]);
                let a_color = if i == 0 {
                    if round % 2 == 1 {
                        Color::White
                    } else {
                        Color::Black
                    }
                } else if i % 2 == 0 {
                    Color::White
                } else {
                    Color::Black
                };
                match (a, b) {
                    (Some(a), Some(b)) => boards.push(match a_color {
                        Color::White => (a, b),
                        Color::Black => (b, a),
                    }),
                    (Some(p), None) | (None, Some(p)) => byes.push(p),
                    (None, None) => {}
                }
            }

            let mut pairings: Vec<Pairing> = boards
                .into_iter()
                .zip(1..)
                .map(|((white, black), table)| Pairing::game(table, white, black))
                .collect();
            pairings.extend(byes.into_iter().map(|p| Pairing::bye(p, ByeKind::Automatic)));
            schedule.push(pairings);

            slots[1..].rotate_right(1);
        }
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ids(n: u32) -> Vec<PlayerId> {
        (1..=n).map(PlayerId).collect()
    }

    fn pairs(round: &[Pairing]) -> Vec<(u32, u32)> {
        round
            .iter()
            .filter_map(|p| Some((p.white.0, p.black?.0)))
            .map(|(w, b)| (w.min(b), w.max(b)))
            .collect()
    }

    #[test]
    fn six_players_circle_method() {
        let schedule = RoundRobinScheduler::generate_schedule(&ids(6)).unwrap();
        assert_eq!(schedule.len(), 5);
        assert_eq!(pairs(&schedule[0]), vec![(1, 6), (2, 5), (3, 4)]);
        assert_eq!(pairs(&schedule[1]), vec![(1, 5), (4, 6), (2, 3)]);
        assert_eq!(pairs(&schedule[2]), vec![(1, 4), (3, 5), (2, 6)]);
    }

    #[test]
    fn odd_field_rotates_the_bye() {
        let schedule = RoundRobinScheduler::generate_schedule(&ids(5)).unwrap();
        assert_eq!(schedule.len(), 5);
        let mut bye_holders: Vec<u32> = schedule
            .iter()
            .map(|round| {
                let byes: Vec<&Pairing> = round.iter().filter(|p| p.is_bye()).collect();
                assert_eq!(byes.len(), 1);
                byes[0].white.0
            })
            .collect();
        bye_holders.sort_unstable();
        assert_eq!(bye_holders, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn colors_stay_balanced() {
        for n in 2..=12 {
            let schedule = RoundRobinScheduler::generate_schedule(&ids(n)).unwrap();
            let mut balance: BTreeMap<PlayerId, i32> = BTreeMap::new();
            for pairing in schedule.iter().flatten() {
                if let Some(black) = pairing.black {
                    *balance.entry(pairing.white).or_default() += 1;
                    *balance.entry(black).or_default() -= 1;
                }
            }
            for (player, diff) in balance {
                assert!(diff.abs() <= 1, "{n} players: {player} ends at {diff}");
            }
        }
    }

    #[test]
    fn tables_skip_the_bye() {
        let schedule = RoundRobinScheduler::generate_schedule(&ids(3)).unwrap();
        let tables: Vec<Option<u32>> = schedule[0].iter().map(|p| p.table).collect();
        assert_eq!(tables, vec![Some(1), None]);
    }

    #[test]
    fn needs_two_players() {
        assert_eq!(
            RoundRobinScheduler::generate_schedule(&ids(1)),
            Err(PairingError::InsufficientPlayers {
                round: 1,
                eligible: 1
            })
        );
        assert_eq!(RoundRobinScheduler::rounds_for(6), 5);
        assert_eq!(RoundRobinScheduler::rounds_for(7), 7);
    }
}
