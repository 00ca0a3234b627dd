//! Deterministic Randomness
//!
//! Provides seeded random number generation for the simulation, so a run's
//! draws can be replayed from its recorded seed.

//-----------------------------------------------------------------------------
// Imports
//-----------------------------------------------------------------------------

use rand::prelude::{SeedableRng, StdRng};
use rand::Rng;

/// A wrapper around a seeded Pseudo-Random Number Generator (PRNG) that
/// remembers its seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: StdRng,
    seed: u64,
}

impl SeededRng {
    /// Creates a new RNG instance seeded with the given 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a new RNG instance from entropy.
    /// A seed is generated from entropy, stored, and used to initialize the
    /// RNG, so a run started without an explicit seed can still be replayed.
    pub fn from_entropy() -> Self {
        let seed: u64 = StdRng::from_entropy().gen();
        Self::new(seed)
    }

    /// Returns the seed used to initialize this RNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a random value in the given range.
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.rng.gen_range(range)
    }

    /// Generate a random 64-bit value; used to derive per-customer seeds.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
