//! Deterministic random number generation for synthetic data.
//!
//! RULE: Seeding never calls a platform RNG.
//! Each concern (names, hierarchy, alerts) draws from its own stream,
//! derived from (master_seed XOR stream_index). Changing how many
//! alerts are drawn therefore never changes the generated hierarchy.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one seeding stream.
pub struct SeedRng {
    pub stream: SeedStream,
    inner: Pcg64Mcg,
}

impl SeedRng {
    pub fn new(master_seed: u64, stream: SeedStream) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            stream,
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

    /// Pick an index in [0, n).
    pub fn index(&mut self, n: usize) -> usize {
        self.next_u64_below(n as u64) as usize
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SeedStream {
    Names = 0,
    Hierarchy = 1,
    Alerts = 2,
}
