//! Deterministic random number generation for synthetic feeds.
//!
//! RULE: The feed generator never calls a platform RNG.
//! Every draw comes from a StreamRng derived from one master seed.
//!
//! Each generator stream gets its own RNG, seeded from
//! (master_seed XOR stream_index * golden-ratio constant). This means:
//!   - Adding a stream never changes the draws of existing streams.
//!   - Each stream is fully reproducible in isolation.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one generator stream.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    pub fn new(master_seed: u64, stream: StreamSlot) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: stream.name(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }

    /// Amount in [min, max), rounded to cents.
    pub fn amount_between(&mut self, min: f64, max: f64) -> f64 {
        let raw = min + self.next_f64() * (max - min);
        (raw * 100.0).round() / 100.0
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Lifecycle = 0,
    Device = 1,
    Transfer = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::Device    => "device",
            Self::Transfer  => "transfer",
        }
    }
}
