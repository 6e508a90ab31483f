//! Citizen skills and hunger.
//!
//! Skills are small integers bounded by the colony's level cap.  The cap can
//! drop after a skill was raised; existing values are kept, only growth is
//! blocked.

use serde::{Deserialize, Serialize};

use col_core::AgentRng;

// ── Saturation ────────────────────────────────────────────────────────────────

pub const MAX_SATURATION: f64 = 20.0;
pub const FULL_SATURATION: f64 = 10.0;
pub const HIGH_SATURATION: f64 = 7.0;
pub const AVERAGE_SATURATION: f64 = 5.0;
pub const LOW_SATURATION: f64 = 3.0;

/// One in `CHANCE_TO_LEVEL` random level-up attempts succeeds.
pub const CHANCE_TO_LEVEL: u32 = 50;

// ── Skill ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Intelligence,
    Charisma,
    Strength,
    Endurance,
    Dexterity,
}

impl Skill {
    pub const ALL: [Skill; 5] = [
        Skill::Intelligence,
        Skill::Charisma,
        Skill::Strength,
        Skill::Endurance,
        Skill::Dexterity,
    ];
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Stats {
    pub intelligence: u32,
    pub charisma:     u32,
    pub strength:     u32,
    pub endurance:    u32,
    pub dexterity:    u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl Stats {
    pub fn uniform(value: u32) -> Self {
        Self { intelligence: value, charisma: value, strength: value, endurance: value, dexterity: value }
    }

    /// Stats for a freshly spawned citizen.  A cap of 1 or less gives all
    /// ones; otherwise each skill is rolled in `[1, cap - 1]`.
    pub fn roll_new(level_cap: u32, rng: &mut AgentRng) -> Self {
        if level_cap <= 1 {
            return Self::uniform(1);
        }
        let mut roll = || rng.next_below(level_cap - 1) + 1;
        Self {
            intelligence: roll(),
            charisma:     roll(),
            strength:     roll(),
            endurance:    roll(),
            dexterity:    roll(),
        }
    }

    pub fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Intelligence => self.intelligence,
            Skill::Charisma => self.charisma,
            Skill::Strength => self.strength,
            Skill::Endurance => self.endurance,
            Skill::Dexterity => self.dexterity,
        }
    }

    fn slot_mut(&mut self, skill: Skill) -> &mut u32 {
        match skill {
            Skill::Intelligence => &mut self.intelligence,
            Skill::Charisma => &mut self.charisma,
            Skill::Strength => &mut self.strength,
            Skill::Endurance => &mut self.endurance,
            Skill::Dexterity => &mut self.dexterity,
        }
    }

    /// Set a skill, clamped to `level_cap`.
    pub fn set(&mut self, skill: Skill, value: u32, level_cap: u32) {
        *self.slot_mut(skill) = value.min(level_cap.max(1));
    }

    /// Raise `skill` by one without exceeding `level_cap`; never lowers it.
    /// Returns whether the value changed.
    pub fn raise(&mut self, skill: Skill, level_cap: u32) -> bool {
        let slot = self.slot_mut(skill);
        let next = (*slot).max((*slot + 1).min(level_cap));
        let changed = next != *slot;
        *slot = next;
        changed
    }

    /// One-in-`chance` roll (defaults to [`CHANCE_TO_LEVEL`] when `chance`
    /// is zero); on success a random skill is raised.  Returns the skill that
    /// was picked, even if the cap kept it from growing.
    pub fn try_random_level_up(&mut self, rng: &mut AgentRng, level_cap: u32, chance: u32) -> Option<Skill> {
        let odds = if chance > 0 { chance } else { CHANCE_TO_LEVEL };
        if rng.next_below(odds) > 0 {
            return None;
        }
        let skill = Skill::ALL[rng.next_below(Skill::ALL.len() as u32) as usize];
        self.raise(skill, level_cap);
        Some(skill)
    }
}
