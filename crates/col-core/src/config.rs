//! Read-only configuration consumed by the AI core.
//!
//! Loaded by the host (the demo reads JSON) and handed to the simulation
//! builder.  Values are never mutated after `validate()` succeeds.

use crate::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColonyConfig {
    /// Upper bound on path search worker threads.  Must be at least 1.
    pub pathfinding_max_threads: usize,

    /// Ticks after a path starts during which stuck detection is suppressed.
    pub min_path_keep_ticks: u64,

    /// Scales every block-breaking delay.
    pub block_mining_delay_modifier: f64,

    /// In pvp mode the mining delay ignores citizen level and halves the modifier.
    pub pvp_mode: bool,

    /// Multiplier applied to every saturation loss.
    pub food_modifier: f64,

    /// Master RNG seed.  The same seed always reproduces the same run.
    pub seed: u64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            pathfinding_max_threads:     2,
            min_path_keep_ticks:         100,
            block_mining_delay_modifier: 500.0,
            pvp_mode:                    false,
            food_modifier:               1.0,
            seed:                        0,
        }
    }
}

impl ColonyConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.pathfinding_max_threads == 0 {
            return Err(CoreError::Config("pathfinding_max_threads must be >= 1".into()));
        }
        if !(self.block_mining_delay_modifier.is_finite() && self.block_mining_delay_modifier >= 0.0) {
            return Err(CoreError::Config(format!(
                "block_mining_delay_modifier must be a non-negative number, got {}",
                self.block_mining_delay_modifier
            )));
        }
        if !(self.food_modifier.is_finite() && self.food_modifier >= 0.0) {
            return Err(CoreError::Config(format!(
                "food_modifier must be a non-negative number, got {}",
                self.food_modifier
            )));
        }
        Ok(())
    }
}
