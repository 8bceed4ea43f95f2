//! Master seed handling and per-round random streams.
//!
//! A round's stream is a pure function of the master seed and the round
//! number: `SHA-256(domain || seed || round)` keys a ChaCha8 generator.

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const DOMAIN: &[u8] = b"ARBITER_PAIRING_V1";
const GENERATED_LEN: usize = 16;

/// The tournament-wide seed all pairing randomness derives from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterSeed(String);

impl MasterSeed {
    /// Wraps an existing seed.
    pub fn new(seed: impl Into<String>) -> Self {
        MasterSeed(seed.into())
    }

    /// Generates a fresh seed. The caller must persist it to reproduce
    /// later rounds.
    pub fn generate() -> Self {
        let seed: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_LEN)
            .map(char::from)
            .collect();
        MasterSeed(seed)
    }

    /// Uses the configured seed, or generates one when it is absent.
    ///
    /// The flag is true when a new seed was generated.
    pub fn resolve(configured: Option<&str>) -> (Self, bool) {
        match configured {
            Some(seed) => (MasterSeed::new(seed), false),
            None => (MasterSeed::generate(), true),
        }
    }

    /// The seed string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the 32-byte key of `round`'s stream.
    pub fn round_key(&self, round: u32) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        hasher.update(self.0.as_bytes());
        hasher.update(round.to_le_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        key
    }

    /// A deterministic generator for `round`.
    pub fn round_rng(&self, round: u32) -> ChaCha8Rng {
        ChaCha8Rng::from_seed(self.round_key(round))
    }
}

impl std::fmt::Display for MasterSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
