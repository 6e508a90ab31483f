//! Unit tests for col-nav.

use std::sync::Arc;
use std::time::Duration;

use col_core::{AgentRng, BlockPos, CitizenId, ColonyConfig, Tick, Vec3};
use col_path::{PathResult, PathScheduler};
use col_world::{Block, GridWorld, GridWorldBuilder, Material, World};

use crate::{Body, PathNavigator};

// ── Fixtures ──────────────────────────────────────────────────────────────────

const STONE: Block = Block::Solid(Material::Stone);

fn flat() -> GridWorldBuilder {
    GridWorldBuilder::new(BlockPos::new(-16, -4, -16), BlockPos::new(16, 12, 16))
        .fill(BlockPos::new(-16, -1, -16), BlockPos::new(16, 0, 16), STONE)
}

struct Rig {
    world:     Arc<dyn World>,
    scheduler: Arc<PathScheduler>,
    nav:       PathNavigator,
    body:      Body,
    rng:       AgentRng,
    tick:      u64,
}

impl Rig {
    fn new(world: GridWorld, at: Vec3) -> Self {
        Self::with_config(world, at, ColonyConfig::default())
    }

    fn with_config(world: GridWorld, at: Vec3, config: ColonyConfig) -> Self {
        let world: Arc<dyn World> = Arc::new(world);
        let scheduler = PathScheduler::started(2).unwrap();
        let nav = PathNavigator::new(Arc::clone(&scheduler), Arc::clone(&world), &config);
        Self { world, scheduler, nav, body: Body::new(at), rng: AgentRng::new(5, CitizenId(1)), tick: 0 }
    }

    /// One simulation tick: wait out any search first so tests do not race
    /// the pool, then navigate and move.
    fn tick(&mut self, step_body: bool) {
        assert!(self.nav.wait_for_computation(Duration::from_secs(10)));
        self.tick += 1;
        self.nav.on_update_navigation(&mut self.body, Tick(self.tick), &mut self.rng);
        if step_body {
            self.body.step(self.world.as_ref());
        }
    }

    fn walk_until_done(&mut self, result: &PathResult, max_ticks: u32) {
        for _ in 0..max_ticks {
            self.tick(true);
            if result.is_done() {
                return;
            }
        }
    }
}

impl Drop for Rig {
    fn drop(&mut self) {
        self.nav.clear_path();
        self.scheduler.shutdown_now();
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod requests {
    use super::{flat, Rig};
    use col_core::{BlockPos, Vec3};
    use col_path::PathStatus;

    use crate::NavError;

    fn rig() -> Rig {
        Rig::new(flat().build(), Vec3::new(0.5, 1.0, 0.5))
    }

    #[test]
    fn same_destination_returns_same_result() {
        let mut r = rig();
        let from = r.body.position();
        let a = r.nav.move_to(from, Vec3::new(6.5, 1.0, 0.5), 1.0).unwrap();
        let b = r.nav.move_to(from, Vec3::new(6.2, 1.0, 0.9), 1.0).unwrap();
        assert!(a.same_as(&b), "same block, same job");
    }

    #[test]
    fn new_destination_cancels_old_job() {
        let mut r = rig();
        let from = r.body.position();
        let a = r.nav.move_to(from, Vec3::new(6.5, 1.0, 0.5), 1.0).unwrap();
        let b = r.nav.move_to(from, Vec3::new(-6.5, 1.0, 0.5), 1.0).unwrap();
        assert!(!a.same_as(&b));
        assert_eq!(a.status(), PathStatus::Cancelled);
        assert!(r.nav.result().is_some_and(|cur| cur.same_as(&b)));
        assert_eq!(r.nav.destination(), Some(BlockPos::new(-7, 1, 0)));
    }

    #[test]
    fn clear_path_is_idempotent() {
        let mut r = rig();
        r.nav.clear_path();
        assert!(r.nav.no_path());

        let a = r.nav.move_to(r.body.position(), Vec3::new(4.5, 1.0, 4.5), 1.0).unwrap();
        assert!(!r.nav.no_path());
        for _ in 0..3 {
            r.nav.clear_path();
            assert!(r.nav.no_path());
            assert!(!r.nav.is_computing());
            assert!(r.nav.result().is_none());
            assert_eq!(r.nav.destination(), None);
        }
        assert_eq!(a.status(), PathStatus::Cancelled);
    }

    #[test]
    fn zero_target_is_refused() {
        let mut r = rig();
        let from = r.body.position();
        assert_eq!(r.nav.move_to(from, Vec3::ZERO, 1.0).unwrap_err(), NavError::ZeroTarget);
        assert_eq!(r.nav.move_to_block(from, BlockPos::ORIGIN, 1.0).unwrap_err(), NavError::ZeroTarget);
        assert!(r.nav.no_path());
    }

    #[test]
    fn speed_above_ceiling_never_applies() {
        let mut r = rig();
        r.nav.set_speed(50.0).unwrap();
        assert!(matches!(r.nav.set_speed(150.0), Err(NavError::SpeedTooHigh(_))));
        assert!(r.nav.set_speed(f64::NAN).is_err());
        assert_eq!(r.nav.speed(), 50.0);

        let from = r.body.position();
        let pending = r.nav.move_to(from, Vec3::new(3.5, 1.0, 0.5), 2.0).unwrap();
        assert!(r.nav.move_to(from, Vec3::new(-3.5, 1.0, 0.5), 101.0).is_err());
        assert_eq!(r.nav.speed(), 2.0);
        assert!(r.nav.result().is_some_and(|cur| cur.same_as(&pending)), "rejected request leaves state alone");
    }

    #[test]
    fn unstarted_scheduler_surfaces_as_error() {
        use std::sync::Arc;

        use col_core::ColonyConfig;
        use col_path::PathScheduler;
        use col_world::World;

        use crate::PathNavigator;

        let world: Arc<dyn World> = Arc::new(flat().build());
        let mut nav = PathNavigator::new(Arc::new(PathScheduler::new()), world, &ColonyConfig::default());
        let err = nav.move_to(Vec3::new(0.5, 1.0, 0.5), Vec3::new(3.5, 1.0, 0.5), 1.0).unwrap_err();
        assert!(matches!(err, NavError::Scheduler(_)));
        assert!(nav.no_path());
    }
}

// ── Following ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod following {
    use super::{flat, Rig, STONE};
    use col_core::{BlockPos, Facing, Vec3};
    use col_path::PathStatus;
    use col_world::Block;

    #[test]
    fn walks_flat_path_to_completion() {
        let mut r = Rig::new(flat().build(), Vec3::new(0.5, 1.0, 0.5));
        let result = r.nav.move_to(r.body.position(), Vec3::new(6.5, 1.0, 0.5), 1.0).unwrap();
        r.walk_until_done(&result, 200);
        assert_eq!(result.status(), PathStatus::Complete);
        assert_eq!(r.body.position().block_pos(), BlockPos::new(6, 1, 0));
        assert!(result.path_length() >= 7);
        assert!(r.nav.no_path());
        assert!(r.nav.result().is_none());
    }

    #[test]
    fn already_there_completes_in_place() {
        let mut r = Rig::new(flat().build(), Vec3::new(2.5, 1.0, 2.5));
        let result = r.nav.move_to(r.body.position(), Vec3::new(2.5, 1.0, 2.5), 1.0).unwrap();
        r.tick(true);
        assert_eq!(result.status(), PathStatus::Complete);
        assert!(r.nav.no_path());
    }

    #[test]
    fn road_is_faster() {
        let road = flat().fill(BlockPos::new(-16, 0, 0), BlockPos::new(16, 0, 0), Block::Path).build();
        let mut on_road = Rig::new(road, Vec3::new(-8.5, 1.0, 0.5));
        let mut off_road = Rig::new(flat().build(), Vec3::new(-8.5, 1.0, 0.5));

        let goal = Vec3::new(8.5, 1.0, 0.5);
        let a = on_road.nav.move_to(on_road.body.position(), goal, 1.0).unwrap();
        let b = off_road.nav.move_to(off_road.body.position(), goal, 1.0).unwrap();
        let mut ticks = (0u32, 0u32);
        while !a.is_done() && ticks.0 < 400 {
            on_road.tick(true);
            ticks.0 += 1;
        }
        while !b.is_done() && ticks.1 < 400 {
            off_road.tick(true);
            ticks.1 += 1;
        }
        assert_eq!(a.status(), PathStatus::Complete);
        assert_eq!(b.status(), PathStatus::Complete);
        assert!(ticks.0 < ticks.1, "road {} vs grass {}", ticks.0, ticks.1);
    }

    #[test]
    fn climbs_ladder_onto_tower() {
        let world = flat()
            .fill(BlockPos::new(3, 1, 1), BlockPos::new(5, 4, 3), STONE)
            .ladder(BlockPos::new(4, 1, 0), 4, Facing::North)
            .build();
        let mut r = Rig::new(world, Vec3::new(4.5, 1.0, -2.5));
        let result = r.nav.move_to(r.body.position(), Vec3::new(4.5, 5.0, 2.5), 1.0).unwrap();
        let mut saw_ladder = false;
        for _ in 0..400 {
            r.tick(true);
            saw_ladder |= r.body.on_ladder(r.world.as_ref());
            if result.is_done() {
                break;
            }
        }
        assert!(saw_ladder);
        assert_eq!(result.status(), PathStatus::Complete);
        assert_eq!(r.body.position().block_pos().y, 5);
    }

    #[test]
    fn swims_across_pool() {
        let world = flat().fill(BlockPos::new(-16, 0, 4), BlockPos::new(16, 0, 6), Block::Water).build();
        let mut r = Rig::new(world, Vec3::new(0.5, 1.0, 1.5));
        let result = r.nav.move_to(r.body.position(), Vec3::new(0.5, 1.0, 9.5), 1.0).unwrap();
        let mut swam = false;
        for _ in 0..400 {
            r.tick(true);
            swam |= r.body.in_water(r.world.as_ref());
            if result.is_done() {
                break;
            }
        }
        assert!(swam);
        assert_eq!(result.status(), PathStatus::Complete);
        assert_eq!(r.body.position().block_pos(), BlockPos::new(0, 1, 9));
    }

    #[test]
    fn finds_water_and_reports_it() {
        let world = flat().block(BlockPos::new(5, 0, 0), Block::Water).build();
        let mut r = Rig::new(world, Vec3::new(0.5, 1.0, 0.5));
        let result = r.nav.move_to_water(r.body.position(), 8, 1.0).unwrap();
        r.walk_until_done(&result, 200);
        assert_eq!(result.status(), PathStatus::Complete);
        assert_eq!(result.target(), Some(BlockPos::new(5, 0, 0)));
        assert!(result.reaches_destination());
    }

    #[test]
    fn flees_past_range() {
        let mut r = Rig::new(flat().build(), Vec3::new(0.5, 1.0, 0.5));
        let avoid = BlockPos::new(0, 1, 0);
        let result = r.nav.move_away_from(r.body.position(), avoid, 5, 1.0).unwrap();
        r.walk_until_done(&result, 300);
        assert_eq!(result.status(), PathStatus::Complete);
        assert!(r.body.position().block_pos().distance_sq(avoid) >= 25);
    }

    #[test]
    fn unreachable_goal_fails() {
        // walled pit: nowhere to go
        let world = flat()
            .fill(BlockPos::new(-1, 1, -1), BlockPos::new(1, 3, 1), STONE)
            .block(BlockPos::new(0, 1, 0), Block::Air)
            .block(BlockPos::new(0, 2, 0), Block::Air)
            .block(BlockPos::new(0, 3, 0), Block::Air)
            .build();
        let mut r = Rig::new(world, Vec3::new(0.5, 1.0, 0.5));
        let result = r.nav.move_to(r.body.position(), Vec3::new(8.5, 1.0, 8.5), 1.0).unwrap();
        r.tick(true);
        assert_eq!(result.status(), PathStatus::Failed);
        assert!(r.nav.no_path());
        assert!(r.nav.result().is_none());
    }

    #[test]
    fn at_site_with_move_walks_once() {
        let mut r = Rig::new(flat().build(), Vec3::new(0.5, 1.0, 0.5));
        let site = BlockPos::new(8, 1, 0);
        assert!(!r.nav.is_at_site_with_move(r.body.position(), site, 2, 1.0));
        let first = r.nav.result().cloned().unwrap();
        assert!(!r.nav.is_at_site_with_move(r.body.position(), site, 2, 1.0));
        assert!(r.nav.result().is_some_and(|cur| cur.same_as(&first)));
        for _ in 0..200 {
            r.tick(true);
            if r.nav.is_at_site_with_move(r.body.position(), site, 2, 1.0) {
                return;
            }
        }
        panic!("never arrived");
    }

    #[test]
    fn random_land_pos_is_standable() {
        let r = Rig::new(flat().build(), Vec3::new(0.5, 1.0, 0.5));
        let mut rng = col_core::AgentRng::new(3, col_core::CitizenId(4));
        for _ in 0..20 {
            let p = r.nav.random_land_pos(BlockPos::new(0, 1, 0), 5, &mut rng).unwrap();
            assert_eq!(p.y, 1);
            assert!(p.x.abs() <= 5 && p.z.abs() <= 5);
        }
        assert_eq!(r.nav.random_land_pos(BlockPos::new(0, 1, 0), 0, &mut rng), None);
    }
}

// ── Stuck detection ───────────────────────────────────────────────────────────

#[cfg(test)]
mod stuck {
    use super::{flat, Rig};
    use col_core::{BlockPos, ColonyConfig, Vec3};
    use col_world::Block;
    use col_path::PathStatus;

    fn frozen(keep: u64) -> (Rig, col_path::PathResult) {
        let config = ColonyConfig { min_path_keep_ticks: keep, ..ColonyConfig::default() };
        let mut r = Rig::with_config(flat().build(), Vec3::new(0.5, 1.0, 0.5), config);
        let result = r.nav.move_to(r.body.position(), Vec3::new(10.5, 1.0, 0.5), 1.0).unwrap();
        (r, result)
    }

    #[test]
    fn motionless_body_abandons_path() {
        let (mut r, result) = frozen(100);
        r.tick(false); // adopt at tick 1
        for _ in 2..=100 {
            r.tick(false);
            assert!(!r.nav.no_path(), "abandoned early at tick {}", r.tick);
        }
        r.tick(false); // tick 101
        assert!(r.nav.no_path());
        assert_eq!(result.status(), PathStatus::Failed);
    }

    #[test]
    fn keep_window_suppresses_check() {
        let (mut r, result) = frozen(300);
        for _ in 1..=300 {
            r.tick(false);
        }
        assert!(!r.nav.no_path(), "still inside the keep window");
        assert_eq!(result.status(), PathStatus::InProgressFollowing);
        r.tick(false);
        assert!(r.nav.no_path());
        assert_eq!(result.status(), PathStatus::Failed);
    }

    #[test]
    fn motionless_swimmer_abandons_path() {
        let world = flat().fill(BlockPos::new(-16, 1, -16), BlockPos::new(16, 1, 16), Block::Water).build();
        let config = ColonyConfig { min_path_keep_ticks: 100, ..ColonyConfig::default() };
        let mut r = Rig::with_config(world, Vec3::new(0.5, 1.0, 0.5), config);
        assert!(r.body.in_water(r.world.as_ref()));
        let result = r.nav.move_to(r.body.position(), Vec3::new(10.5, 1.0, 0.5), 1.0).unwrap();
        for _ in 0..400 {
            r.tick(false);
        }
        assert!(r.nav.no_path());
        assert_eq!(result.status(), PathStatus::Failed);
    }

    #[test]
    fn moving_body_is_not_stuck() {
        let (mut r, result) = frozen(0);
        r.walk_until_done(&result, 200);
        assert_eq!(result.status(), PathStatus::Complete);
    }
}

// ── Body ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod body {
    use super::{flat, STONE};
    use col_core::{BlockPos, Vec3};

    use crate::Body;

    #[test]
    fn falls_to_floor() {
        let world = flat().build();
        let mut b = Body::new(Vec3::new(0.5, 4.0, 0.5));
        for _ in 0..10 {
            b.step(&world);
        }
        assert_eq!(b.position().y, 1.0);
    }

    #[test]
    fn wall_blocks_level_walk_but_steps_up_when_target_is_higher() {
        let world = flat().block(BlockPos::new(1, 1, 0), STONE).build();
        let mut b = Body::new(Vec3::new(0.5, 1.0, 0.5));
        b.set_move_target(Vec3::new(1.5, 1.0, 0.5), 4.0);
        b.step(&world);
        assert!(b.collided_horizontally());
        assert_eq!(b.position().block_pos(), BlockPos::new(0, 1, 0));

        b.set_move_target(Vec3::new(1.5, 2.0, 0.5), 4.0);
        b.step(&world);
        assert_eq!(b.position().block_pos(), BlockPos::new(1, 2, 0));
    }
}
