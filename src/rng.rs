//! Deterministic random number generation for worker attributes.
//!
//! All randomness in the pool initializer flows through a [`PoolRng`] seeded
//! from the config, so tests can reproduce the exact default worker set.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A seeded RNG for drawing worker attributes.
pub struct PoolRng {
    inner: Pcg64Mcg,
}

impl PoolRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Seed from the system clock. Used when no seed is configured.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed);
        Self::seeded(nanos)
    }

    /// Draw a float in [lo, hi), rounded to two decimal places.
    pub fn ratio_between(&mut self, lo: f64, hi: f64) -> f64 {
        let raw = self.inner.gen_range(lo..hi);
        (raw * 100.0).round() / 100.0
    }

    /// Draw an integer in [lo, hi] inclusive.
    pub fn int_between(&mut self, lo: u32, hi: u32) -> u32 {
        self.inner.gen_range(lo..=hi)
    }

    /// Pick one entry from a non-empty slice.
    pub fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.inner.gen_range(0..items.len())]
    }
}
