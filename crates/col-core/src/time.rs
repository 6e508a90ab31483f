//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter advanced once per
//! simulation step.  The host runs at a fixed [`TICKS_PER_SECOND`], so
//! behaviour timings written in seconds or minutes convert exactly.

use std::fmt;

/// Simulation steps per simulated second.
pub const TICKS_PER_SECOND: u64 = 20;

// ── Tick ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Current tick plus conversions between ticks and simulated wall time.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start: Tick) -> Self {
        Self { current_tick: start }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    #[inline]
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick.0 / TICKS_PER_SECOND
    }

    /// Break elapsed time into (minutes, seconds) for log lines.
    pub fn elapsed_ms(&self) -> (u64, u64) {
        let secs = self.elapsed_secs();
        (secs / 60, secs % 60)
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    #[inline]
    pub const fn ticks_for_secs(secs: u64) -> u64 {
        secs * TICKS_PER_SECOND
    }

    #[inline]
    pub const fn ticks_for_minutes(minutes: u64) -> u64 {
        Self::ticks_for_secs(minutes * 60)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, s) = self.elapsed_ms();
        write!(f, "{} ({}m{:02}s)", self.current_tick, m, s)
    }
}
