//! Waypoints and resolved paths.

use col_core::{BlockPos, Facing, Vec3};

/// One step of a path.  `pos` is the block the entity's feet occupy.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PathPoint {
    pub pos:      BlockPos,
    /// Set when the point is on a ladder: the ladder's facing while
    /// climbing, `Facing::Down` while descending.
    pub ladder:   Option<Facing>,
    pub in_water: bool,
}

impl PathPoint {
    pub fn plain(pos: BlockPos) -> Self {
        Self { pos, ladder: None, in_water: false }
    }

    #[inline]
    pub fn on_ladder(&self) -> bool {
        self.ladder.is_some()
    }

    /// Where the entity should stand: bottom-center of the block.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.pos.bottom_center()
    }
}

/// Ordered waypoints plus a follow cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points: Vec<PathPoint>,
    cursor: usize,
    /// Block that satisfied a find-nearest goal.
    target: Option<BlockPos>,
}

impl Path {
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points, cursor: 0, target: None }
    }

    pub fn with_target(mut self, target: Option<BlockPos>) -> Self {
        self.target = target;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clamped to `len()`, which marks the path finished.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.points.len());
    }

    pub fn advance(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    #[inline]
    pub fn current(&self) -> Option<&PathPoint> {
        self.points.get(self.cursor)
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.points.len()
    }

    pub fn final_point(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    pub fn target(&self) -> Option<BlockPos> {
        self.target
    }
}
