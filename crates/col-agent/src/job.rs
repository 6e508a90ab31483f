use std::fmt;

use serde::{Deserialize, Serialize};

use col_core::BuildingId;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Sifter,
    Knight,
    Miner,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::Sifter => "sifter",
            JobKind::Knight => "knight",
            JobKind::Miner => "miner",
        };
        f.write_str(name)
    }
}

/// A citizen's employment.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Job {
    pub kind:          JobKind,
    pub work_building: Option<BuildingId>,
    /// Actions since the last inventory dump.
    #[serde(default)]
    pub actions_done:  u32,
}

impl Job {
    pub fn new(kind: JobKind, work_building: Option<BuildingId>) -> Self {
        Self { kind, work_building, actions_done: 0 }
    }

    pub fn increment_actions(&mut self) {
        self.actions_done = self.actions_done.saturating_add(1);
    }

    pub fn clear_actions(&mut self) {
        self.actions_done = 0;
    }
}
