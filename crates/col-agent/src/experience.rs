//! Job experience.

use serde::{Deserialize, Serialize};

pub const MAX_CITIZEN_LEVEL: u32 = 99;

/// XP needed to go from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> f64 {
    10.0 * (level as f64 + 1.0).powf(1.5)
}

/// Level and accumulated experience for one job.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Experience {
    pub level: u32,
    /// XP collected towards the next level.
    pub xp:    f64,
}

impl Experience {
    /// Add `amount` (its absolute value) and apply any level-ups.  Returns
    /// the number of levels gained.
    pub fn add(&mut self, amount: f64) -> u32 {
        self.xp += amount.abs();
        let mut gained = 0;
        while self.level < MAX_CITIZEN_LEVEL && self.xp >= xp_for_next_level(self.level) {
            self.xp -= xp_for_next_level(self.level);
            self.level += 1;
            gained += 1;
        }
        gained
    }
}
