//! Round lifecycle of one tournament.
//!
//! [`Tournament`] strings the engine together: it generates a round,
//! collects results, and on confirmation swaps in the next standings and
//! tiebreaks. Confirmation is two-phase. The next [`StandingsModel`] and
//! [`TiebreakTable`] are computed first, and only if both succeed are they
//! stored. A failed call never changes the tournament.

use arbiter_core::{
    ByeKind, GameRecord, GameResult, Pairing, PairingSystem, Player, PlayerId, TournamentConfig,
    ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::bye::RoundRequest;
use crate::color::ColorConflict;
use crate::round_robin::RoundRobinScheduler;
use crate::swiss::{RoundPairings, SwissPairingEngine};
use crate::tiebreak::{TiebreakCalculator, TiebreakTable};
use crate::{MasterSeed, PairingError, StandingsModel};

/// Where a round is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    NotGenerated,
    Generated,
    ResultsPending,
    Confirmed,
}

/// A generated round and its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub state: RoundState,
    pub pairings: Vec<Pairing>,
    /// One slot per pairing. Byes and forfeits are filled at generation.
    pub results: Vec<Option<GameResult>>,
    #[serde(default)]
    pub color_conflicts: Vec<ColorConflict>,
    #[serde(default)]
    pub repeated_pairings: Vec<(PlayerId, PlayerId)>,
}

impl Round {
    fn new(number: u32, pairings: Vec<Pairing>, standings: &StandingsModel) -> Self {
        let withdrawn = |id: PlayerId| standings.player(id).is_some_and(|p| p.withdrawn);
        let results = pairings
            .iter()
            .map(|pairing| match (pairing.black, pairing.origin.bye_kind()) {
                (None, Some(_)) if withdrawn(pairing.white) => {
                    Some(GameResult::Bye(ByeKind::Absence))
                }
                (None, kind) => Some(GameResult::Bye(kind.unwrap_or(ByeKind::Automatic))),
                (Some(black), _) => {
                    let forfeit = GameResult::forfeit(withdrawn(pairing.white), withdrawn(black));
                    if let Some(result) = forfeit {
                        tracing::warn!(
                            round = number,
                            "Withdrawn player forfeits {}: {}",
                            pairing,
                            result
                        );
                    }
                    forfeit
                }
            })
            .collect();

        Round {
            number,
            state: RoundState::Generated,
            pairings,
            results,
            color_conflicts: Vec::new(),
            repeated_pairings: Vec::new(),
        }
    }

    /// Number of boards still without a result.
    pub fn missing_results(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }

    /// The pairing at `table` and its result.
    pub fn board(&self, table: u32) -> Option<(&Pairing, Option<GameResult>)> {
        self.pairings
            .iter()
            .zip(&self.results)
            .find(|(p, _)| p.table == Some(table))
            .map(|(p, r)| (p, *r))
    }

    fn records(&self) -> Result<Vec<GameRecord>, ValidationError> {
        let missing = self.missing_results();
        if missing > 0 {
            return Err(ValidationError::ResultsIncomplete {
                round: self.number,
                missing,
            });
        }
        Ok(self
            .pairings
            .iter()
            .zip(&self.results)
            .filter_map(|(pairing, result)| {
                Some(GameRecord {
                    round: self.number,
                    white: pairing.white,
                    black: pairing.black,
                    result: (*result)?,
                    voided: false,
                })
            })
            .collect())
    }
}

/// One tournament from registration to final standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    config: TournamentConfig,
    seed: MasterSeed,
    standings: StandingsModel,
    tiebreaks: TiebreakTable,
    rounds: Vec<Round>,
    #[serde(default)]
    schedule: Option<Vec<Vec<Pairing>>>,
}

impl Tournament {
    /// Registers `players` and fixes the master seed.
    ///
    /// A blank `master_seed` is replaced by a generated one, available from
    /// [`Tournament::seed`]; it must be stored with the tournament to
    /// reproduce its pairings.
    pub fn new(config: TournamentConfig, players: Vec<Player>) -> Result<Self, ValidationError> {
        let standings = StandingsModel::new(players)?;
        let (seed, generated) = MasterSeed::resolve(config.seed());
        if generated {
            tracing::info!("Generated master seed {}", seed);
        }
        let tiebreaks =
            TiebreakCalculator::from_config(&config).recompute(&standings, &config.tie_break_order);
        Ok(Tournament {
            config,
            seed,
            standings,
            tiebreaks,
            rounds: Vec::new(),
            schedule: None,
        })
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn seed(&self) -> &MasterSeed {
        &self.seed
    }

    /// Standings as of the last confirmed round.
    pub fn standings(&self) -> &StandingsModel {
        &self.standings
    }

    /// Tiebreaks as of the last confirmed round.
    pub fn tiebreaks(&self) -> &TiebreakTable {
        &self.tiebreaks
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        number
            .checked_sub(1)
            .and_then(|i| self.rounds.get(i as usize))
    }

    /// The fixed round-robin schedule, once created.
    pub fn schedule(&self) -> Option<&[Vec<Pairing>]> {
        self.schedule.as_deref()
    }

    /// Planned number of rounds, or zero when open-ended.
    pub fn total_rounds(&self) -> u32 {
        match (self.config.total_rounds, self.config.pairing_system) {
            (0, PairingSystem::RoundRobin) => match &self.schedule {
                Some(schedule) => schedule.len() as u32,
                None => RoundRobinScheduler::rounds_for(self.standings.active_players().count()),
            },
            (total, _) => total,
        }
    }

    pub fn round_state(&self, number: u32) -> RoundState {
        self.round(number)
            .map_or(RoundState::NotGenerated, |round| round.state)
    }

    /// Generates the next round.
    ///
    /// # Errors
    ///
    /// Fails if the previous round is not confirmed, all rounds have been
    /// played, or pairing fails. The tournament is unchanged on failure.
    pub fn generate_round(&mut self, request: &RoundRequest) -> Result<&Round, PairingError> {
        let number = self.rounds.len() as u32 + 1;
        if let Some(last) = self.rounds.last() {
            if last.state != RoundState::Confirmed {
                return Err(ValidationError::RoundNotConfirmed(last.number).into());
            }
        }
        let total = self.total_rounds();
        if total > 0 && number > total {
            return Err(ValidationError::TournamentComplete(total).into());
        }

        let (round, schedule) = match self.config.pairing_system {
            PairingSystem::Swiss => {
                let RoundPairings {
                    pairings,
                    color_conflicts,
                    repeated_pairings,
                    ..
                } = SwissPairingEngine::from_config(&self.config).generate_round(
                    &self.standings,
                    number,
                    &self.seed,
                    request,
                )?;
                let mut round = Round::new(number, pairings, &self.standings);
                round.color_conflicts = color_conflicts;
                round.repeated_pairings = repeated_pairings;
                (round, None)
            }
            PairingSystem::RoundRobin => {
                if !request.is_empty() {
                    return Err(ValidationError::ByeRequestsUnsupported.into());
                }
                let schedule = match self.schedule.take() {
                    Some(schedule) => schedule,
                    None => self.build_schedule()?,
                };
                let pairings = schedule.get(number as usize - 1).cloned();
                let Some(pairings) = pairings else {
                    let total = schedule.len() as u32;
                    self.schedule = Some(schedule);
                    return Err(ValidationError::TournamentComplete(total).into());
                };
                (Round::new(number, pairings, &self.standings), Some(schedule))
            }
        };

        if schedule.is_some() {
            self.schedule = schedule;
        }
        tracing::info!(
            "Round {} generated: {} pairings",
            number,
            round.pairings.len()
        );
        self.rounds.push(round);
        Ok(&self.rounds[self.rounds.len() - 1])
    }

    fn build_schedule(&self) -> Result<Vec<Vec<Pairing>>, PairingError> {
        let seeds: Vec<PlayerId> = self.standings.active_players().map(|p| p.id).collect();
        RoundRobinScheduler::generate_schedule(&seeds)
    }

    /// Creates the round-robin schedule again from the current roster.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::ScheduleImmutable`] once any round has been
    /// generated, and a validation error for Swiss tournaments.
    pub fn regenerate_schedule(&mut self) -> Result<&[Vec<Pairing>], PairingError> {
        if self.config.pairing_system != PairingSystem::RoundRobin {
            return Err(ValidationError::NotRoundRobin.into());
        }
        if let Some(last) = self.rounds.last() {
            return Err(PairingError::ScheduleImmutable { round: last.number });
        }
        let built = self.build_schedule()?;
        let schedule = self.schedule.insert(built);
        Ok(schedule.as_slice())
    }

    fn open_round(&mut self, number: u32) -> Result<&mut Round, ValidationError> {
        let round = number
            .checked_sub(1)
            .and_then(|i| self.rounds.get_mut(i as usize))
            .ok_or(ValidationError::RoundNotGenerated(number))?;
        if round.state == RoundState::Confirmed {
            return Err(ValidationError::RoundAlreadyConfirmed(number));
        }
        Ok(round)
    }

    /// Records the result of one board.
    ///
    /// A result can be corrected any number of times until the round is
    /// confirmed.
    pub fn record_result(
        &mut self,
        round: u32,
        table: u32,
        result: GameResult,
    ) -> Result<(), ValidationError> {
        if result.bye_kind().is_some() {
            return Err(ValidationError::InvalidResult(result.to_string()));
        }
        let open = self.open_round(round)?;
        let slot = open
            .pairings
            .iter()
            .position(|p| p.table == Some(table))
            .ok_or(ValidationError::UnknownTable { round, table })?;
        open.results[slot] = Some(result);
        open.state = RoundState::ResultsPending;
        Ok(())
    }

    /// Confirms a round: applies its results and recomputes tiebreaks.
    ///
    /// # Errors
    ///
    /// Fails if the round is unknown, already confirmed, or has boards
    /// without a result. Standings and tiebreaks are unchanged on failure.
    pub fn confirm_round(&mut self, round: u32) -> Result<&TiebreakTable, PairingError> {
        let open = self.open_round(round)?;
        let records = open.records()?;

        let standings = self
            .standings
            .apply_round(round, &records, &self.config.points)?;
        let tiebreaks = TiebreakCalculator::from_config(&self.config)
            .recompute(&standings, &self.config.tie_break_order);

        self.open_round(round)?.state = RoundState::Confirmed;
        self.standings = standings;
        self.tiebreaks = tiebreaks;
        tracing::info!("Round {} confirmed", round);
        Ok(&self.tiebreaks)
    }

    /// Withdraws a player from all future rounds.
    pub fn withdraw(&mut self, player: PlayerId) -> Result<(), ValidationError> {
        self.standings.withdraw(player)?;
        tracing::info!("Player {} withdrawn", player);
        Ok(())
    }

    /// Voids a confirmed game (fair-play penalty) and recomputes tiebreaks.
    ///
    /// Scores stand; `voided_games` decides how tiebreaks treat the game.
    pub fn void_game(&mut self, round: u32, table: u32) -> Result<(), ValidationError> {
        let confirmed = self
            .round(round)
            .ok_or(ValidationError::RoundNotGenerated(round))?;
        if confirmed.state != RoundState::Confirmed {
            return Err(ValidationError::RoundNotConfirmed(round));
        }
        let (pairing, _) = confirmed
            .board(table)
            .ok_or(ValidationError::UnknownTable { round, table })?;

        let standings = self.standings.void_game(round, pairing.white)?;
        let tiebreaks = TiebreakCalculator::from_config(&self.config)
            .recompute(&standings, &self.config.tie_break_order);
        self.standings = standings;
        self.tiebreaks = tiebreaks;
        tracing::warn!("Round {} table {} voided", round, table);
        Ok(())
    }

    /// Current standings order.
    pub fn ranking(&self) -> Vec<PlayerId> {
        self.standings
            .ranking(&self.tiebreaks, &self.config.tie_break_order)
    }
}
