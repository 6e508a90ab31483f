//! What a path job is looking for, and what the walker can do.

use std::fmt;
use std::sync::Arc;

use col_core::BlockPos;
use col_world::Block;

/// Movement abilities of the entity the path is for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Capabilities {
    pub can_swim:       bool,
    pub can_open_doors: bool,
    pub can_climb:      bool,
}

impl Default for Capabilities {
    /// Citizens swim, open doors and climb ladders.
    fn default() -> Self {
        Self { can_swim: true, can_open_doors: true, can_climb: true }
    }
}

/// Thread-safe block test for find-nearest searches.
#[derive(Clone)]
pub struct BlockPredicate {
    label: &'static str,
    test:  Arc<dyn Fn(Block) -> bool + Send + Sync>,
}

impl BlockPredicate {
    pub fn new(label: &'static str, test: impl Fn(Block) -> bool + Send + Sync + 'static) -> Self {
        Self { label, test: Arc::new(test) }
    }

    pub fn water() -> Self {
        Self::new("water", Block::is_liquid)
    }

    pub fn exactly(block: Block) -> Self {
        Self::new("exact block", move |b| b == block)
    }

    #[inline]
    pub fn matches(&self, block: Block) -> bool {
        (self.test)(block)
    }
}

impl fmt::Debug for BlockPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockPredicate({})", self.label)
    }
}

#[derive(Clone, Debug)]
pub enum PathGoal {
    /// Reach `dest`.  If `dest` itself cannot be stood in (a chest, a wall),
    /// any standable block touching it counts.
    MoveTo { dest: BlockPos },

    /// Get at least `range` blocks away from `avoid`.
    MoveAwayFrom { avoid: BlockPos, range: u32 },

    /// Stand next to the nearest block matching `predicate`, optionally only
    /// counting blocks inside the inclusive `region`.
    FindNearest { region: Option<(BlockPos, BlockPos)>, predicate: BlockPredicate },
}

impl PathGoal {
    /// Destination for de-duplication and bookkeeping, if the goal has one.
    pub fn destination(&self) -> Option<BlockPos> {
        match self {
            PathGoal::MoveTo { dest } => Some(*dest),
            _ => None,
        }
    }
}

pub(crate) fn in_region(region: &Option<(BlockPos, BlockPos)>, pos: BlockPos) -> bool {
    match region {
        None => true,
        Some((a, b)) => {
            (a.x.min(b.x)..=a.x.max(b.x)).contains(&pos.x)
                && (a.y.min(b.y)..=a.y.max(b.y)).contains(&pos.y)
                && (a.z.min(b.z)..=a.z.max(b.z)).contains(&pos.z)
        }
    }
}
