//! Bye resolution for one round.
//!
//! Absence byes are removed from the pool first, then requested byes (subject
//! to the per-player limit). If the pool left over is odd, one automatic bye
//! goes to the first player in [`ByeAllocator::automatic_order`].

use std::collections::BTreeSet;

use arbiter_core::{ByeKind, Player, PlayerId, ValidationError};
use serde::{Deserialize, Serialize};

/// Byes asked for ahead of a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRequest {
    #[serde(default)]
    pub requested_byes: BTreeSet<PlayerId>,
    #[serde(default)]
    pub absences: BTreeSet<PlayerId>,
}

impl RoundRequest {
    /// A request without any byes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a requested bye.
    pub fn request_bye(mut self, player: PlayerId) -> Self {
        self.requested_byes.insert(player);
        self
    }

    /// Adds an absence.
    pub fn absent(mut self, player: PlayerId) -> Self {
        self.absences.insert(player);
        self
    }

    /// Returns true if no bye was asked for.
    pub fn is_empty(&self) -> bool {
        self.requested_byes.is_empty() && self.absences.is_empty()
    }

    /// Every id named by the request.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.absences.iter().chain(&self.requested_byes).copied()
    }
}

/// One bye handed out for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeAssignment {
    pub player: PlayerId,
    pub kind: ByeKind,
}

/// Outcome of bye resolution: the byes, and who is left to pair.
#[derive(Debug, Clone)]
pub struct ByeResolution<'a> {
    pub assignments: Vec<ByeAssignment>,
    /// Players still to be paired, in the order they were given.
    pub remaining: Vec<&'a Player>,
}

/// Decides which players sit out a round.
pub struct ByeAllocator;

impl ByeAllocator {
    /// Resolves every bye of a round, including the automatic one.
    ///
    /// # Errors
    ///
    /// See [`ByeAllocator::resolve_requests`].
    pub fn resolve_byes<'a>(
        eligible: &[&'a Player],
        requested: &BTreeSet<PlayerId>,
        absent: &BTreeSet<PlayerId>,
        limit: u32,
    ) -> Result<ByeResolution<'a>, ValidationError> {
        let mut resolution = Self::resolve_requests(eligible, requested, absent, limit)?;
        if resolution.remaining.len() % 2 == 1 {
            if let Some(&player) = Self::automatic_order(&resolution.remaining).first() {
                resolution.remaining.retain(|p| p.id != player);
                resolution.assignments.push(ByeAssignment {
                    player,
                    kind: ByeKind::Automatic,
                });
            }
        }
        Ok(resolution)
    }

    /// Resolves absence and requested byes, leaving the automatic bye open.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownPlayer`] if an id is not among `eligible`
    /// - [`ValidationError::DuplicateBye`] if an id is both absent and
    ///   requesting a bye
    /// - [`ValidationError::ByeLimitExceeded`] if a requesting player has
    ///   already had `limit` byes of any kind
    pub fn resolve_requests<'a>(
        eligible: &[&'a Player],
        requested: &BTreeSet<PlayerId>,
        absent: &BTreeSet<PlayerId>,
        limit: u32,
    ) -> Result<ByeResolution<'a>, ValidationError> {
        let find = |id: PlayerId| {
            eligible
                .iter()
                .copied()
                .find(|p| p.id == id)
                .ok_or(ValidationError::UnknownPlayer(id))
        };

        let mut assignments = Vec::with_capacity(absent.len() + requested.len() + 1);
        for &id in absent {
            find(id)?;
            if requested.contains(&id) {
                return Err(ValidationError::DuplicateBye(id));
            }
            assignments.push(ByeAssignment {
                player: id,
                kind: ByeKind::Absence,
            });
        }
        for &id in requested {
            let player = find(id)?;
            let taken = player.bye_count();
            if taken >= limit {
                return Err(ValidationError::ByeLimitExceeded {
                    player: id,
                    taken,
                    limit,
                });
            }
            assignments.push(ByeAssignment {
                player: id,
                kind: ByeKind::Requested,
            });
        }

        let remaining = eligible
            .iter()
            .copied()
            .filter(|p| !absent.contains(&p.id) && !requested.contains(&p.id))
            .collect();
        Ok(ByeResolution {
            assignments,
            remaining,
        })
    }

    /// Candidates for the automatic bye, most deserving first.
    ///
    /// Fewest prior byes, then lowest score, then lowest rating, then lowest
    /// pairing number.
    pub fn automatic_order(pool: &[&Player]) -> Vec<PlayerId> {
        let mut order: Vec<&Player> = pool.to_vec();
        order.sort_by(|a, b| {
            a.bye_count()
                .cmp(&b.bye_count())
                .then(a.score.total_cmp(&b.score))
                .then(a.rating.cmp(&b.rating))
                .then(a.pairing_number.cmp(&b.pairing_number))
        });
        order.into_iter().map(|p| p.id).collect()
    }
}
