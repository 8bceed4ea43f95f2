//! Property tests over randomly played events.

use std::collections::{BTreeMap, BTreeSet};

use arbiter_core::{
    ByeKind, Color, GameResult, Player, PlayerId, TiebreakKey, TournamentConfig, ValidationError,
};
use arbiter_engine::{
    MasterSeed, PairingError, RoundRequest, RoundRobinScheduler, StandingsModel,
    SwissPairingEngine, TiebreakCalculator, Tournament, MAX_COLOR_DIFFERENCE,
};
use proptest::prelude::*;

fn roster(n: u32) -> Vec<Player> {
    // Few distinct ratings, so name order breaks ties.
    (1..=n)
        .map(|i| Player::new(i, format!("P{i:02}"), 1500 + (i * 7 % 5) as i32 * 50))
        .collect()
}

fn result_from(code: u8) -> GameResult {
    match code % 3 {
        0 => GameResult::WhiteWins,
        1 => GameResult::BlackWins,
        _ => GameResult::Draw,
    }
}

/// Plays up to `rounds` Swiss rounds, stopping early if a round cannot be
/// paired.
fn play_swiss(n: u32, rounds: u32, seed: &str, codes: &[u8]) -> Tournament {
    let config = TournamentConfig {
        total_rounds: rounds,
        master_seed: Some(seed.to_string()),
        ..TournamentConfig::default()
    };
    let mut t = Tournament::new(config, roster(n)).unwrap();
    let mut codes = codes.iter().cycle();
    for number in 1..=rounds {
        match t.generate_round(&RoundRequest::new()) {
            Ok(_) => {}
            Err(PairingError::UnpairableGroup { .. }) => break,
            Err(other) => panic!("round {number}: {other}"),
        }
        let tables: Vec<u32> = t
            .round(number)
            .unwrap()
            .pairings
            .iter()
            .filter_map(|p| p.table)
            .collect();
        for table in tables {
            let code = *codes.next().unwrap();
            t.record_result(number, table, result_from(code)).unwrap();
        }
        t.confirm_round(number).unwrap();
    }
    t
}

fn diff(colors: &[Color]) -> i32 {
    colors.iter().map(|c| c.balance()).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn round_robin_meets_everyone_once(n in 2u32..=20) {
        let seeds: Vec<PlayerId> = (1..=n).map(PlayerId).collect();
        let schedule = RoundRobinScheduler::generate_schedule(&seeds).unwrap();
        prop_assert_eq!(schedule.len() as u32, RoundRobinScheduler::rounds_for(n as usize));

        let mut met = BTreeSet::new();
        let mut byes = BTreeMap::new();
        for round in &schedule {
            let mut seen = BTreeSet::new();
            for pairing in round {
                prop_assert!(seen.insert(pairing.white));
                match pairing.black {
                    Some(black) => {
                        prop_assert!(seen.insert(black));
                        let pair = (pairing.white.min(black), pairing.white.max(black));
                        prop_assert!(met.insert(pair), "{:?} met twice", pair);
                    }
                    None => *byes.entry(pairing.white).or_insert(0) += 1,
                }
            }
            prop_assert_eq!(seen.len() as u32, n);
        }
        prop_assert_eq!(met.len() as u32, n * (n - 1) / 2);
        if n % 2 == 1 {
            prop_assert_eq!(byes.len() as u32, n);
            prop_assert!(byes.values().all(|&count| count == 1));
        } else {
            prop_assert!(byes.is_empty());
        }
    }

    #[test]
    fn same_inputs_same_event(
        n in 4u32..=11,
        seed in "[a-z0-9]{1,12}",
        codes in prop::collection::vec(any::<u8>(), 1..48),
    ) {
        let a = play_swiss(n, 4, &seed, &codes);
        let b = play_swiss(n, 4, &seed, &codes);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn swiss_never_repeats_a_pairing(
        n in 4u32..=12,
        seed in "[a-z]{4}",
        codes in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let t = play_swiss(n, 5, &seed, &codes);
        let mut met = BTreeSet::new();
        for round in t.rounds() {
            prop_assert!(round.repeated_pairings.is_empty());
            for pairing in &round.pairings {
                let Some(black) = pairing.black else { continue };
                let pair = (pairing.white.min(black), pairing.white.max(black));
                prop_assert!(met.insert(pair), "{:?} met twice", pair);
            }
        }
    }

    #[test]
    fn repeats_are_always_reported(
        seed in "[a-z]{4}",
        codes in prop::collection::vec(any::<u8>(), 1..16),
    ) {
        let config = TournamentConfig {
            total_rounds: 6,
            allow_repeat_pairing: true,
            master_seed: Some(seed),
            ..TournamentConfig::default()
        };
        // Three players run out of fresh opponents after three rounds.
        let mut t = Tournament::new(config, roster(3)).unwrap();
        let mut codes = codes.iter().cycle();
        let mut met = BTreeSet::new();
        for number in 1..=6 {
            let round = t.generate_round(&RoundRequest::new()).unwrap();
            for pairing in &round.pairings {
                let Some(black) = pairing.black else { continue };
                let pair = (pairing.white.min(black), pairing.white.max(black));
                let reported = round
                    .repeated_pairings
                    .iter()
                    .any(|&(w, b)| (w.min(b), w.max(b)) == pair);
                prop_assert_eq!(!met.insert(pair), reported);
            }
            t.record_result(number, 1, result_from(*codes.next().unwrap())).unwrap();
            t.confirm_round(number).unwrap();
        }
    }

    #[test]
    fn colors_stay_in_band(
        n in 4u32..=12,
        seed in "[a-z]{4}",
        codes in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let t = play_swiss(n, 6, &seed, &codes);
        let mut history: BTreeMap<PlayerId, Vec<Color>> = BTreeMap::new();

        for round in t.rounds() {
            // A flagged conflict may give a third same color this round only.
            let flagged: BTreeSet<PlayerId> = round
                .color_conflicts
                .iter()
                .flat_map(|c| [c.player, c.opponent])
                .collect();
            for pairing in &round.pairings {
                let Some(black) = pairing.black else { continue };
                for (player, color) in [(pairing.white, Color::White), (black, Color::Black)] {
                    let colors = history.entry(player).or_default();
                    colors.push(color);
                    prop_assert!(
                        diff(colors).abs() <= MAX_COLOR_DIFFERENCE,
                        "{} left the band in round {}", player, round.number
                    );
                    if !flagged.contains(&player) {
                        prop_assert!(
                            !colors.ends_with(&[color; 3]),
                            "{} has {} three times in round {}", player, color, round.number
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn every_active_player_appears_once(
        n in 2u32..=12,
        requested in prop::collection::btree_set(1u32..=12, 0..4),
        absent in prop::collection::btree_set(1u32..=12, 0..4),
    ) {
        let standings = StandingsModel::new(roster(n)).unwrap();
        let mut request = RoundRequest::new();
        for &id in requested.iter().filter(|&&id| id <= n) {
            request = request.request_bye(PlayerId(id));
        }
        for &id in absent.iter().filter(|&&id| id <= n) {
            request = request.absent(PlayerId(id));
        }
        let overlap = request.requested_byes.intersection(&request.absences).count();

        match SwissPairingEngine::new(4, false).generate_round(
            &standings,
            1,
            &MasterSeed::new("byes"),
            &request,
        ) {
            Ok(round) => {
                prop_assert_eq!(overlap, 0);
                let mut seen = BTreeSet::new();
                for pairing in &round.pairings {
                    prop_assert!(seen.insert(pairing.white));
                    if let Some(black) = pairing.black {
                        prop_assert!(seen.insert(black));
                    }
                }
                prop_assert_eq!(seen.len() as u32, n);
                let automatic = round
                    .byes()
                    .filter(|p| p.origin.bye_kind() == Some(ByeKind::Automatic))
                    .count();
                prop_assert!(automatic <= 1);
            }
            Err(PairingError::Validation(ValidationError::DuplicateBye(_))) => {
                prop_assert!(overlap > 0);
            }
            Err(PairingError::InsufficientPlayers { eligible, .. }) => {
                prop_assert!(eligible < 2);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn tiebreaks_recompute_identically(
        n in 4u32..=10,
        codes in prop::collection::vec(any::<u8>(), 1..40),
    ) {
        let t = play_swiss(n, 4, "tiebreaks", &codes);
        let calculator = TiebreakCalculator::from_config(t.config());
        let first = calculator.recompute(t.standings(), &TiebreakKey::ALL);
        let second = calculator.recompute(t.standings(), &TiebreakKey::ALL);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            &calculator.recompute(t.standings(), &t.config().tie_break_order),
            t.tiebreaks()
        );
    }
}
