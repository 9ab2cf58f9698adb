//! Deterministic per-person RNG.
//!
//! # Determinism strategy
//!
//! Each person gets an independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (person_index * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive indices uniformly across the seed space.  A
//! person's generated plan therefore depends only on the seed and its index,
//! never on how many producers ran before it or on thread scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── PersonRng ─────────────────────────────────────────────────────────────────

/// Per-person deterministic RNG.
pub struct PersonRng(SmallRng);

impl PersonRng {
    /// Seed deterministically from the run's global seed and a person index.
    pub fn new(global_seed: u64, person_index: u64) -> Self {
        let seed = global_seed ^ person_index.wrapping_mul(MIXING_CONSTANT);
        PersonRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
