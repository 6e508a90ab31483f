//! What a behaviour may ask of the citizen it drives.

use col_agent::CitizenData;
use col_core::{AgentRng, BlockPos, Vec3};

/// Movement through the citizen's navigator.  Every call returns at once;
/// paths are computed in the background and followed on later ticks.
pub trait Movable {
    fn position(&self) -> Vec3;

    fn block_pos(&self) -> BlockPos {
        self.position().block_pos()
    }

    /// `true` once within `range` blocks of `site` on every axis.  Otherwise
    /// starts walking there (unless a path is already being followed) and
    /// returns `false`.
    fn walk_to(&mut self, site: BlockPos, range: i32) -> bool;

    /// Start fleeing until at least `range` blocks from `avoid`.
    fn move_away_from(&mut self, avoid: BlockPos, range: u32);

    /// A random standable spot within `range` blocks, if one turns up.
    fn random_land_pos(&self, range: i32, rng: &mut AgentRng) -> Option<BlockPos>;

    /// Neither computing nor following a path.
    fn no_path(&self) -> bool;

    /// Index of the next waypoint on the path being followed.  Callers use
    /// it to notice a citizen that stopped making progress.
    fn path_progress(&self) -> Option<usize> {
        None
    }

    /// Cancel any pending search and drop the current path.
    fn stop(&mut self);
}

/// A movable citizen with its data record.
pub trait Worker: Movable {
    fn citizen(&self) -> &CitizenData;

    fn citizen_mut(&mut self) -> &mut CitizenData;
}
