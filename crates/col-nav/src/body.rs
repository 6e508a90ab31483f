//! Kinematic stand-in for the host engine's movement helper.
//!
//! The body is a point with a two-block-tall hitbox.  Each [`Body::step`]:
//!
//! 1. moves horizontally toward the move target, at most
//!    `speed * WALK_PER_TICK` blocks, stepping up one block when a wall is
//!    in the way and the target is higher;
//! 2. climbs or descends toward the target's height while inside a ladder
//!    or water block;
//! 3. falls when nothing below holds it.

use col_core::{BlockPos, Vec3};
use col_world::World;

/// Blocks walked per tick at speed 1.0.
pub const WALK_PER_TICK: f64 = 0.25;

/// Vertical blocks per tick on ladders and in water.
pub const CLIMB_PER_TICK: f64 = 0.2;

pub const FALL_PER_TICK: f64 = 0.5;

const EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MoveTarget {
    pub pos:   Vec3,
    pub speed: f64,
}

#[derive(Clone, Debug)]
pub struct Body {
    pos:      Vec3,
    target:   Option<MoveTarget>,
    collided: bool,
}

impl Body {
    pub fn new(pos: Vec3) -> Self {
        Self { pos, target: None, collided: false }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pos
    }

    /// Teleport.  The move target is kept.
    pub fn set_position(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    pub fn move_target(&self) -> Option<MoveTarget> {
        self.target
    }

    pub fn set_move_target(&mut self, pos: Vec3, speed: f64) {
        self.target = Some(MoveTarget { pos, speed });
    }

    pub fn stop(&mut self) {
        self.target = None;
    }

    /// The last step ran into a wall.
    pub fn collided_horizontally(&self) -> bool {
        self.collided
    }

    pub fn in_water(&self, world: &dyn World) -> bool {
        world.block_at(self.pos.block_pos()).is_liquid()
    }

    pub fn on_ladder(&self, world: &dyn World) -> bool {
        world.block_at(self.pos.block_pos()).ladder_facing().is_some()
    }

    pub fn step(&mut self, world: &dyn World) {
        self.collided = false;
        if let Some(target) = self.target {
            self.walk(world, target);
            self.climb(world, target);
        }
        self.fall(world);
    }

    fn walk(&mut self, world: &dyn World, target: MoveTarget) {
        let dx = target.pos.x - self.pos.x;
        let dz = target.pos.z - self.pos.z;
        let dist = (dx * dx + dz * dz).sqrt();
        let reach = target.speed.max(0.0) * WALK_PER_TICK;
        if dist < EPSILON || reach <= 0.0 {
            return;
        }
        let f = (reach / dist).min(1.0);
        let next = Vec3::new(self.pos.x + dx * f, self.pos.y, self.pos.z + dz * f);
        if fits(world, next) {
            self.pos = next;
            return;
        }

        let stepped = Vec3::new(next.x, next.block_pos().y as f64 + 1.0, next.z);
        let rise = stepped.y - self.pos.y;
        if target.pos.y > self.pos.y + EPSILON && rise <= 1.0 + EPSILON && fits(world, stepped) {
            self.pos = stepped;
        } else {
            self.collided = true;
        }
    }

    fn climb(&mut self, world: &dyn World, target: MoveTarget) {
        let feet = world.block_at(self.pos.block_pos());
        if feet.ladder_facing().is_none() && !feet.is_liquid() {
            return;
        }
        let dy = target.pos.y - self.pos.y;
        let y = if dy > EPSILON {
            self.pos.y + dy.min(CLIMB_PER_TICK)
        } else if dy < -EPSILON {
            self.pos.y + dy.max(-CLIMB_PER_TICK)
        } else {
            return;
        };
        let moved = Vec3::new(self.pos.x, y, self.pos.z);
        if fits(world, moved) {
            self.pos = moved;
        }
    }

    fn fall(&mut self, world: &dyn World) {
        let feet_pos = self.pos.block_pos();
        let feet = world.block_at(feet_pos);
        if feet.ladder_facing().is_some() || feet.is_liquid() {
            return;
        }
        let below = feet_pos.down();
        let floor = if world.block_at(below).blocks_movement() || !world.is_loaded(below) {
            feet_pos.y as f64
        } else {
            f64::NEG_INFINITY
        };
        self.pos.y = (self.pos.y - FALL_PER_TICK).max(floor);
    }
}

/// Feet and head blocks are both free.
fn fits(world: &dyn World, pos: Vec3) -> bool {
    let feet: BlockPos = pos.block_pos();
    !world.block_at(feet).blocks_movement() && !world.block_at(feet.up()).blocks_movement()
}
