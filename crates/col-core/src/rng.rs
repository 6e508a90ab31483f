//! Deterministic per-citizen and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each citizen owns a `SmallRng` seeded by
//!
//!   seed = global_seed XOR (citizen_id * MIXING_CONSTANT)
//!
//! so citizens never share RNG state and spawning a new citizen does not
//! disturb the sequences of existing ones.  Every random decision a behaviour
//! or navigator makes (stat rolls, mesh breaks, ladder jitter, partner
//! choice) draws from the owning citizen's stream.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::CitizenId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-citizen deterministic RNG.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(global_seed: u64, citizen: CitizenId) -> Self {
        let seed = global_seed ^ (citizen.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.0.r#gen()
    }

    #[inline]
    pub fn next_bool(&mut self) -> bool {
        self.0.r#gen()
    }

    /// Uniform integer in `[0, bound)`; zero when `bound` is zero.
    #[inline]
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 { 0 } else { self.0.gen_range(0..bound) }
    }

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

    /// `true` with `percent` in 100 odds, rolled as `next_below(100) < percent`.
    #[inline]
    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.next_below(100) < percent
    }

    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Colony-wide RNG, seeded once from the master seed.  The simulation draws
/// the stat-roll seeds of newly arriving citizens from it.
#[derive(Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
