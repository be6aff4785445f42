//! Pluggable random source for the stochastic effects.
//!
//! Noise, glitter, glitch and VHS draw from a [`RandomSource`]. Any
//! `rand::Rng` qualifies, so production code can use an entropy-seeded
//! `StdRng` while tests substitute a seeded one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random numbers in `[0, 1)` plus a few derived helpers.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// True with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform sample in `[lo, hi)`.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform index in `0..n`; returns 0 when `n == 0`.
    fn below(&mut self, n: usize) -> usize {
        ((self.next_f32() * n as f32) as usize).min(n.saturating_sub(1))
    }
}

impl<R: Rng> RandomSource for R {
    fn next_f32(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Generator seeded from the operating system.
pub fn entropy_source() -> StdRng {
    StdRng::from_os_rng()
}

/// Generator with a fixed seed for reproducible renders.
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
