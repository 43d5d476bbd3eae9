//! Seeded randomness.
//!
//! Every generator draws from a [`GameRng`]. It wraps ChaCha8, whose output
//! stream is fixed by the algorithm rather than by the `rand` version, so a
//! seed reproduces the same content on every platform.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable random source shared by all generators.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: Option<u64>,
    drawn: bool,
}

impl GameRng {
    /// Reproducible stream for `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
            drawn: false,
        }
    }

    /// Non-reproducible stream seeded from the OS.
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
            seed: None,
            drawn: false,
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_option(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    /// The seed this stream was created from, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The seed, but only while nothing has been drawn yet. Output produced
    /// from here on can be regenerated with `GameRng::seeded` of this value.
    pub fn replay_seed(&self) -> Option<u64> {
        if self.drawn {
            None
        } else {
            self.seed
        }
    }

    /// Draw a seed for an independent child stream.
    pub fn derive_seed(&mut self) -> u64 {
        self.next_u64()
    }

    /// Uniform float in [0, 1).
    pub fn unit(&mut self) -> f64 {
        self.drawn = true;
        self.inner.gen::<f64>()
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform offset in [-span/2, span/2).
    pub fn centered(&mut self, span: f64) -> f64 {
        (self.unit() - 0.5) * span
    }

    /// Uniform integer in [lo, hi].
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        self.drawn = true;
        self.inner.gen_range(lo..=hi)
    }

    /// Uniformly chosen element. Panics on an empty slice, which only
    /// happens with a programming error in the static tables.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        self.drawn = true;
        &items[self.inner.gen_range(0..items.len())]
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.drawn = true;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.drawn = true;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.drawn = true;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.drawn = true;
        self.inner.try_fill_bytes(dest)
    }
}
