//! Deterministic RNG hierarchy.
//!
//! Season `i` of a scenario always draws from the same stream: its seed is a
//! BLAKE3 hash of the master seed, the scenario name and `i`, with no state
//! shared between seasons. Which worker runs a season, and what it ran
//! before, has no effect on its draws.

use rand::rngs::StdRng;
use rand::SeedableRng;

const STREAM_CONTEXT: &str = "qualsim 2024 season stream";

/// Maps `(scenario, season index)` to an independent seeded stream.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
    // Derive-key hasher with the master seed already absorbed.
    keyed: blake3::Hasher,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        let mut keyed = blake3::Hasher::new_derive_key(STREAM_CONTEXT);
        keyed.update(&master_seed.to_le_bytes());
        Self { master_seed, keyed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// 32-byte seed for season `season` of `scenario`. The name is length
    /// prefixed so `("ab", i)` and `("a", j)` never share input bytes.
    pub fn season_seed(&self, scenario: &str, season: u64) -> [u8; 32] {
        let mut hasher = self.keyed.clone();
        hasher.update(&(scenario.len() as u64).to_le_bytes());
        hasher.update(scenario.as_bytes());
        hasher.update(&season.to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Seeded `StdRng` for one season.
    pub fn season_rng(&self, scenario: &str, season: u64) -> StdRng {
        StdRng::from_seed(self.season_seed(scenario, season))
    }
}
