//! The per-citizen path navigator.
//!
//! # Request lifecycle
//!
//! ```text
//! move_to ──► PathJob ──► scheduler ──► PathFuture
//!                                           │ polled each tick
//!                                           ▼
//!                        adopt path ──► follow ──► COMPLETE
//! ```
//!
//! At most one future is outstanding.  A new request for the same
//! destination returns the existing [`PathResult`]; any other request
//! cancels the old job first.
//!
//! # Following
//!
//! Each tick the navigator picks the body's move target from the path:
//!
//! * **Ladders.**  On a ladder waypoint whose successor changes height, the
//!   body is pushed against the ladder so it climbs instead of walking off.
//! * **Water.**  While swimming the cursor is not allowed to skip ahead past
//!   a height change, which otherwise makes the citizen spin back after
//!   dropping in.
//! * **Roads.**  Standing on a path block multiplies the walking speed.
//! * **Stuck.**  Every [`STUCK_CHECK_TICKS`] the body must have moved
//!   [`STUCK_DISTANCE_SQ`]; otherwise the path is abandoned.  The check is
//!   off for the first `min_path_keep_ticks` after a path is adopted.

use std::sync::Arc;
use std::time::Duration;

use col_core::{AgentRng, BlockPos, ColonyConfig, Facing, Tick, Vec3};
use col_path::{
    prepare_start, BlockPredicate, Capabilities, Path, PathError, PathFuture, PathGoal, PathJob, PathPoint,
    PathResult, PathScheduler, PathStatus,
};
use col_world::World;

use crate::{Body, NavError, NavResult};

/// Requests above this speed are rejected.
pub const MAX_SPEED_ALLOWED: f64 = 100.0;

pub const ON_PATH_SPEED_MULTIPLIER: f64 = 1.3;

/// A descending ladder waypoint counts as reached this close to its floor.
pub const MIN_Y_DISTANCE: f64 = 0.001;

pub const DEFAULT_SPEED: f64 = 1.0;

pub const DEFAULT_SEARCH_RANGE: u32 = 48;

pub const STUCK_CHECK_TICKS: u64 = 100;

pub const STUCK_DISTANCE_SQ: f64 = 2.25;

const LADDER_NUDGE_SPEED: f64 = 0.05;

/// A waypoint is passed once the body is inside its block column and less
/// than one block off vertically.
const WAYPOINT_REACH: f64 = 0.5;

const LAND_POS_ATTEMPTS: u32 = 10;

#[derive(Copy, Clone, Debug)]
struct StuckCheck {
    at:  Tick,
    pos: Vec3,
}

pub struct PathNavigator {
    scheduler:            Arc<PathScheduler>,
    world:                Arc<dyn World>,
    caps:                 Capabilities,
    search_range:         u32,
    min_keep_ticks:       u64,
    future:               Option<PathFuture>,
    result:               Option<PathResult>,
    path:                 Option<Path>,
    destination:          Option<BlockPos>,
    original_destination: Option<BlockPos>,
    walk_speed:           f64,
    path_start:           Tick,
    stuck:                StuckCheck,
}

impl PathNavigator {
    pub fn new(scheduler: Arc<PathScheduler>, world: Arc<dyn World>, config: &ColonyConfig) -> Self {
        Self {
            scheduler,
            world,
            caps:                 Capabilities::default(),
            search_range:         DEFAULT_SEARCH_RANGE,
            min_keep_ticks:       config.min_path_keep_ticks,
            future:               None,
            result:               None,
            path:                 None,
            destination:          None,
            original_destination: None,
            walk_speed:           DEFAULT_SPEED,
            path_start:           Tick::ZERO,
            stuck:                StuckCheck { at: Tick::ZERO, pos: Vec3::ZERO },
        }
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_search_range(mut self, range: u32) -> Self {
        self.search_range = range;
        self
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// Path from `from` to the block containing `target`.
    ///
    /// Returns the pending result at once.  A request for the destination
    /// already being computed or followed hands back that same result.
    pub fn move_to(&mut self, from: Vec3, target: Vec3, speed: f64) -> NavResult<PathResult> {
        if target.is_zero() {
            return Err(NavError::ZeroTarget);
        }
        let dest = target.block_pos();
        let same_dest = self.destination == Some(dest) || self.original_destination == Some(dest);
        if let Some(result) = self.result.as_ref().filter(|_| same_dest) {
            return Ok(result.clone());
        }
        let start = prepare_start(self.world.as_ref(), from, self.caps);
        let job = PathJob::new(Arc::clone(&self.world), start, PathGoal::MoveTo { dest }, self.search_range, self.caps);
        self.set_path_job(job, Some(dest), speed)
    }

    pub fn move_to_block(&mut self, from: Vec3, dest: BlockPos, speed: f64) -> NavResult<PathResult> {
        if dest.is_origin() {
            return Err(NavError::ZeroTarget);
        }
        self.move_to(from, dest.bottom_center(), speed)
    }

    /// Get at least `range` blocks away from `avoid`.
    pub fn move_away_from(&mut self, from: Vec3, avoid: BlockPos, range: u32, speed: f64) -> NavResult<PathResult> {
        let start = prepare_start(self.world.as_ref(), from, self.caps);
        let goal = PathGoal::MoveAwayFrom { avoid, range };
        let job = PathJob::new(Arc::clone(&self.world), start, goal, self.search_range.max(range * 2), self.caps);
        self.set_path_job(job, None, speed)
    }

    /// Walk next to the nearest block matching `predicate`.  The matched
    /// block is reported through [`PathResult::target`].
    pub fn move_to_nearest(
        &mut self,
        from:      Vec3,
        region:    Option<(BlockPos, BlockPos)>,
        predicate: BlockPredicate,
        speed:     f64,
    ) -> NavResult<PathResult> {
        let start = prepare_start(self.world.as_ref(), from, self.caps);
        let goal = PathGoal::FindNearest { region, predicate };
        let job = PathJob::new(Arc::clone(&self.world), start, goal, self.search_range, self.caps);
        self.set_path_job(job, None, speed)
    }

    /// Nearest water within `range` blocks on every axis.
    pub fn move_to_water(&mut self, from: Vec3, range: i32, speed: f64) -> NavResult<PathResult> {
        let here = from.block_pos();
        let region = (here.offset(-range, -range, -range), here.offset(range, range, range));
        self.move_to_nearest(from, Some(region), BlockPredicate::water(), speed)
    }

    fn set_path_job(&mut self, job: PathJob, dest: Option<BlockPos>, speed: f64) -> NavResult<PathResult> {
        if speed.is_nan() || speed > MAX_SPEED_ALLOWED {
            tracing::error!(speed, max = MAX_SPEED_ALLOWED, "rejected path request with too high a speed");
            return Err(NavError::SpeedTooHigh(speed));
        }
        self.clear_path();
        self.destination = dest;
        self.original_destination = dest;
        self.walk_speed = speed;

        let future = match self.scheduler.enqueue(job) {
            Ok(future) => future,
            Err(e) => {
                self.destination = None;
                self.original_destination = None;
                return Err(e.into());
            }
        };
        let result = future.result().clone();
        self.future = Some(future);
        self.result = Some(result.clone());
        Ok(result)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Neither computing nor following.
    pub fn no_path(&self) -> bool {
        self.future.is_none() && self.path.as_ref().is_none_or(Path::is_finished)
    }

    pub fn is_computing(&self) -> bool {
        self.future.is_some()
    }

    pub fn speed(&self) -> f64 {
        self.walk_speed
    }

    /// Speeds above [`MAX_SPEED_ALLOWED`] are logged and ignored.
    pub fn set_speed(&mut self, speed: f64) -> NavResult<()> {
        if speed.is_nan() || speed > MAX_SPEED_ALLOWED {
            tracing::error!(speed, max = MAX_SPEED_ALLOWED, "rejected speed change");
            return Err(NavError::SpeedTooHigh(speed));
        }
        self.walk_speed = speed;
        Ok(())
    }

    /// Where the current path ends, or the requested destination while it
    /// is still being computed.
    pub fn destination(&self) -> Option<BlockPos> {
        self.destination
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn result(&self) -> Option<&PathResult> {
        self.result.as_ref()
    }

    /// `true` when `from` is within `range` blocks of `site` on every axis.
    /// Otherwise requests a path there (de-duplicated) and returns `false`.
    pub fn is_at_site_with_move(&mut self, from: Vec3, site: BlockPos, range: i32, speed: f64) -> bool {
        let here = from.block_pos();
        if (here.x - site.x).abs() <= range && (here.y - site.y).abs() <= range && (here.z - site.z).abs() <= range {
            return true;
        }
        if let Err(e) = self.move_to_block(from, site, speed) {
            tracing::debug!(site = %site, error = %e, "could not start walking to site");
        }
        false
    }

    /// A random spot within `range` of `around` a citizen can stand on dry.
    pub fn random_land_pos(&self, around: BlockPos, range: i32, rng: &mut AgentRng) -> Option<BlockPos> {
        if range <= 0 {
            return None;
        }
        for _ in 0..LAND_POS_ATTEMPTS {
            let x = around.x + rng.gen_range(-range..=range);
            let z = around.z + rng.gen_range(-range..=range);
            let found = (-2..=2).map(|dy| BlockPos::new(x, around.y + dy, z)).find(|p| self.is_dry_land(*p));
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn is_dry_land(&self, pos: BlockPos) -> bool {
        let feet = self.world.block_at(pos);
        self.world.is_loaded(pos)
            && feet.is_air()
            && !self.world.block_at(pos.up()).blocks_movement()
            && self.world.block_at(pos.down()).is_floor()
    }

    /// Block until the outstanding search finishes.  Meant for tests and
    /// tools; the simulation polls instead.
    pub fn wait_for_computation(&self, timeout: Duration) -> bool {
        self.future.as_ref().is_none_or(|f| f.wait_timeout(timeout))
    }

    // ── Cancellation ──────────────────────────────────────────────────────

    /// Cancel the search, mark the result cancelled and drop the path.
    /// Safe to call any number of times.
    pub fn clear_path(&mut self) {
        if let Some(future) = self.future.take() {
            future.cancel();
        }
        if let Some(result) = self.result.take() {
            result.set_status(PathStatus::Cancelled);
        }
        self.destination = None;
        self.path = None;
    }

    // ── Per-tick update ───────────────────────────────────────────────────

    pub fn on_update_navigation(&mut self, body: &mut Body, now: Tick, rng: &mut AgentRng) {
        if let Some(future) = &self.future {
            if !future.is_done() {
                return;
            }
            self.process_completed(body.position(), now);
        }

        if self.path.is_some() {
            self.follow(body, now, rng);
        }
        if self.path.as_ref().is_some_and(Path::is_finished) {
            self.path = None;
        }

        if self.no_path() {
            if let Some(result) = self.result.take() {
                result.set_status(PathStatus::Complete);
            }
        }
    }

    fn process_completed(&mut self, pos: Vec3, now: Tick) {
        let Some(future) = self.future.take() else {
            return;
        };
        let result = future.result().clone();
        match future.try_take() {
            Some(Ok(Some(path))) => self.adopt(path, &result, pos, now),
            Some(Ok(None)) => {
                tracing::debug!(dest = ?self.original_destination, "no path found");
                result.set_status(PathStatus::Failed);
            }
            Some(Err(PathError::Interrupted)) => {}
            Some(Err(e)) => {
                tracing::warn!(error = %e, "path job failed");
                result.set_status(PathStatus::Failed);
            }
            None => {}
        }
    }

    fn adopt(&mut self, path: Path, result: &PathResult, pos: Vec3, now: Tick) {
        result.set_path_length(path.len());
        result.set_target(path.target());
        let Some(last) = path.final_point().map(|p| p.pos) else {
            result.set_status(PathStatus::Failed);
            return;
        };
        if self.destination.is_none() {
            result.set_reaches_destination(true);
        }
        self.destination = Some(last);

        if path.len() == 1 && last == pos.block_pos() {
            result.complete_in_place();
            return;
        }
        result.set_status(PathStatus::InProgressFollowing);
        tracing::debug!(len = path.len(), dest = %last, "path adopted");
        self.path_start = now;
        self.stuck = StuckCheck { at: now, pos };
        self.path = Some(path);
    }

    fn follow(&mut self, body: &mut Body, now: Tick, rng: &mut AgentRng) {
        let Some(path) = &self.path else {
            return;
        };
        let cursor = path.cursor();
        let (Some(point), next) = (path.get(cursor).copied(), path.get(cursor + 1).copied()) else {
            return;
        };
        let pos = body.position();

        if let Some(next) = next.filter(|n| point.on_ladder() && n.pos.y != point.pos.y) {
            self.steer_on_ladder(body, point, next, rng);
            self.path_follow(pos, now);
            return;
        }
        if body.in_water(self.world.as_ref()) {
            self.swim(body);
            self.check_for_stuck(pos, now);
            return;
        }

        let speed = if self.world.block_at(pos.block_pos().down()).is_path_block() {
            ON_PATH_SPEED_MULTIPLIER * self.walk_speed
        } else {
            self.walk_speed
        };
        self.path_follow(pos, now);
        if let Some(p) = self.path.as_ref().and_then(Path::current) {
            body.set_move_target(p.target(), speed);
        }
    }

    fn steer_on_ladder(&self, body: &mut Body, point: PathPoint, next: PathPoint, rng: &mut AgentRng) {
        let pos = body.position();
        let centre = point.target();
        let mut target = Vec3::new(centre.x, next.pos.y as f64, centre.z);
        let mut speed = self.walk_speed;

        if target.horizontal_distance_sq(pos) < rng.next_f64() * 0.1 {
            // press into the ladder; a descending waypoint holds still
            speed = LADDER_NUDGE_SPEED;
            match point.ladder {
                Some(Facing::North) => target.z += 1.0,
                Some(Facing::South) => target.z -= 1.0,
                Some(Facing::West) => target.x += 1.0,
                Some(Facing::East) => target.x -= 1.0,
                _ => speed = 0.0,
            }
        }
        body.set_move_target(target, speed);
    }

    fn swim(&mut self, body: &mut Body) {
        let speed = self.walk_speed;
        let Some(path) = self.path.as_mut() else {
            return;
        };
        let cursor = path.cursor();
        let height = |i: usize| path.get(i).map(|p| p.pos.y);
        if cursor > 0 && cursor + 1 < path.len() && height(cursor - 1) != height(cursor) {
            path.set_cursor(cursor + 1);
        }

        let pos = body.position();
        let Some(mut target) = path.current().map(PathPoint::target) else {
            return;
        };
        if target.horizontal_distance_sq(pos) < 0.1 && (pos.y - target.y).abs() < 0.5 {
            path.advance();
            match path.current() {
                Some(p) => target = p.target(),
                None => return,
            }
        }
        body.set_move_target(target, speed);
    }

    /// Advance the cursor past every waypoint already reached, then check
    /// for being stuck.
    fn path_follow(&mut self, pos: Vec3, now: Tick) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        let cursor = path.cursor();
        let hold = match (path.get(cursor), path.get(cursor + 1)) {
            (Some(p), Some(next)) => p.ladder == Some(Facing::Down) && !next.on_ladder(),
            _ => false,
        };

        if hold {
            // bottom of a ladder: stay on it until the body is down
            let floor = path.get(cursor).map_or(pos.y, |p| p.pos.y as f64);
            if pos.y - floor < MIN_Y_DISTANCE {
                path.set_cursor(cursor + 1);
            }
        } else {
            while let Some(p) = path.current() {
                let t = p.target();
                let reached = (pos.x - t.x).abs() < WAYPOINT_REACH
                    && (pos.z - t.z).abs() < WAYPOINT_REACH
                    && (pos.y - t.y).abs() < 1.0;
                if !reached {
                    break;
                }
                path.advance();
            }
        }
        self.check_for_stuck(pos, now);
    }

    fn check_for_stuck(&mut self, pos: Vec3, now: Tick) {
        if now.since(self.path_start) < self.min_keep_ticks {
            return;
        }
        if now.since(self.stuck.at) < STUCK_CHECK_TICKS {
            return;
        }
        if pos.distance_sq(self.stuck.pos) < STUCK_DISTANCE_SQ {
            tracing::debug!(pos = ?pos, dest = ?self.destination, "stuck; abandoning path");
            if let Some(result) = &self.result {
                result.set_status(PathStatus::Failed);
            }
            self.clear_path();
        }
        self.stuck = StuckCheck { at: now, pos };
    }
}

impl Drop for PathNavigator {
    fn drop(&mut self) {
        if let Some(future) = &self.future {
            future.cancel();
        }
    }
}
