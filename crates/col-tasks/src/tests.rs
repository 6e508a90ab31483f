//! Unit tests for col-tasks.

use col_agent::{CitizenData, CitizenDataBuilder};
use col_behavior::{Movable, PeerSnapshot, TaskContext, Worker};
use col_core::{AgentRng, BlockPos, CitizenId, ColonyConfig, Tick, Vec3};
use col_world::{Block, GridWorld, GridWorldBuilder, ItemKind, Material, RecordingSink};

use crate::Colony;

// ── Helpers ───────────────────────────────────────────────────────────────────

const STONE: Block = Block::Solid(Material::Stone);

/// A worker that arrives instantly when `teleport` is set; otherwise it
/// starts a pretend path that never makes progress.
struct StubWorker {
    data:     CitizenData,
    pos:      Vec3,
    teleport: bool,
    path:     Option<usize>,
    walks:    Vec<BlockPos>,
    fled:     Vec<BlockPos>,
    stops:    u32,
}

impl StubWorker {
    fn new(data: CitizenData) -> Self {
        Self {
            data,
            pos: Vec3::new(0.5, 1.0, 0.5),
            teleport: true,
            path: None,
            walks: Vec::new(),
            fled: Vec::new(),
            stops: 0,
        }
    }
}

impl Movable for StubWorker {
    fn position(&self) -> Vec3 {
        self.pos
    }

    fn walk_to(&mut self, site: BlockPos, range: i32) -> bool {
        let here = self.pos.block_pos();
        if (here.x - site.x).abs() <= range && (here.y - site.y).abs() <= range && (here.z - site.z).abs() <= range {
            return true;
        }
        self.walks.push(site);
        if self.teleport {
            self.pos = site.bottom_center();
            return true;
        }
        self.path = Some(0);
        false
    }

    fn move_away_from(&mut self, avoid: BlockPos, _range: u32) {
        self.fled.push(avoid);
    }

    fn random_land_pos(&self, _range: i32, _rng: &mut AgentRng) -> Option<BlockPos> {
        None
    }

    fn no_path(&self) -> bool {
        self.path.is_none()
    }

    fn path_progress(&self) -> Option<usize> {
        self.path
    }

    fn stop(&mut self) {
        self.path = None;
        self.stops += 1;
    }
}

impl Worker for StubWorker {
    fn citizen(&self) -> &CitizenData {
        &self.data
    }
    fn citizen_mut(&mut self) -> &mut CitizenData {
        &mut self.data
    }
}

struct Harness {
    worker: StubWorker,
    colony: Colony,
    world:  GridWorld,
    sink:   RecordingSink,
    rng:    AgentRng,
    config: ColonyConfig,
    peers:  Vec<PeerSnapshot>,
    tick:   u64,
}

impl Harness {
    fn new(data: CitizenData) -> Self {
        Self::with_world(data, flat().build())
    }

    fn with_world(data: CitizenData, world: GridWorld) -> Self {
        Self {
            worker: StubWorker::new(data),
            colony: Colony::new(5),
            world,
            sink:   RecordingSink::new(),
            rng:    AgentRng::new(11, CitizenId(1)),
            config: ColonyConfig::default(),
            peers:  Vec::new(),
            tick:   0,
        }
    }

    /// Run `f` against a fresh context for the next tick.
    fn step<R>(&mut self, f: impl FnOnce(&mut TaskContext<'_, Colony>) -> R) -> R {
        self.tick += 1;
        let mut ctx = TaskContext::new(
            Tick(self.tick),
            &mut self.worker,
            &mut self.colony,
            &self.world,
            &self.sink,
            &mut self.rng,
            &self.peers,
            &self.config,
        );
        f(&mut ctx)
    }

    fn count(&self, kind: ItemKind) -> u32 {
        col_world::container::count_matching(self.worker.data.inventory(), |s| s.kind == kind)
    }
}

fn flat() -> GridWorldBuilder {
    GridWorldBuilder::new(BlockPos::new(-16, -2, -16), BlockPos::new(16, 8, 16))
        .fill(BlockPos::new(-16, 0, -16), BlockPos::new(16, 0, 16), STONE)
}

fn citizen(id: u32) -> CitizenDataBuilder {
    CitizenDataBuilder::new(CitizenId(id)).name(format!("citizen-{id}"))
}

// ── Colony ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod colony {
    use col_core::{AgentRng, BlockPos, BuildingId, CitizenId};
    use col_world::{ItemKind, ItemStack};

    use crate::{AcademyModule, BuildingKind, Colony, DigOrder, Mesh, MineModule, SifterModule};

    #[test]
    fn best_restaurant_is_nearest_then_lowest_id() {
        let mut c = Colony::new(5);
        c.add_building(BlockPos::new(0, 1, 0), 1, BuildingKind::Hut);
        let far = c.add_building(BlockPos::new(20, 1, 0), 1, BuildingKind::Restaurant);
        let near = c.add_building(BlockPos::new(5, 1, 0), 1, BuildingKind::Restaurant);
        let tie = c.add_building(BlockPos::new(-5, 1, 0), 1, BuildingKind::Restaurant);
        assert_eq!(c.best_restaurant(BlockPos::new(0, 1, 0)), Some(near));
        assert_ne!(c.best_restaurant(BlockPos::new(0, 1, 0)), Some(tie));
        assert_eq!(c.best_restaurant(BlockPos::new(19, 1, 0)), Some(far));
        assert_eq!(Colony::new(5).best_restaurant(BlockPos::ORIGIN), None);
    }

    #[test]
    fn requests_are_deduplicated_per_citizen_and_item() {
        let mut c = Colony::new(5);
        let a = CitizenId(1);
        assert!(c.request_item(a, ItemStack::new(ItemKind::Dirt, 10)));
        assert!(!c.request_item(a, ItemStack::new(ItemKind::Dirt, 4)));
        assert!(c.request_item(a, ItemStack::new(ItemKind::Shield, 1)));
        assert!(c.request_item(CitizenId(2), ItemStack::new(ItemKind::Dirt, 1)));
        assert_eq!(c.requests().len(), 3);

        let taken = c.take_request(a, ItemKind::Dirt).map(|r| r.stack.count);
        assert_eq!(taken, Some(10));
        assert_eq!(c.cancel_requests(a), 1);
        assert_eq!(c.requests().len(), 1);
    }

    #[test]
    fn wrong_kind_is_an_error() {
        let mut c = Colony::new(5);
        let hut = c.add_building(BlockPos::ORIGIN, 1, BuildingKind::Hut);
        assert!(c.sifter_mut(hut).is_err());
        assert!(c.academy_mut(BuildingId(99)).is_err());
    }

    #[test]
    fn partner_bonds_are_symmetric() {
        let mut rng = AgentRng::new(3, CitizenId(1));
        let mut a = AcademyModule::new(vec![BlockPos::new(3, 1, 3)]);
        for id in 1..=3 {
            a.assign(CitizenId(id));
        }
        let p = a.random_partner(CitizenId(1), &mut rng, |c| c != CitizenId(3));
        assert_eq!(p, Some(CitizenId(2)));
        assert_eq!(a.partner_of(CitizenId(2)), Some(CitizenId(1)));
        // 3 is the only one left and it is unavailable
        assert_eq!(a.random_partner(CitizenId(3), &mut rng, |_| true), None);

        a.reset_partner(CitizenId(2));
        assert!(!a.has_partner(CitizenId(1)));
        assert!(!a.has_partner(CitizenId(2)));
        assert_eq!(a.random_target(&mut rng), Some(BlockPos::new(3, 1, 3)));
    }

    #[test]
    fn sifter_quota_and_mesh_reset() {
        let mut s = SifterModule::new(ItemKind::Gravel, Mesh::new(ItemKind::IronMesh, 2.0), 2);
        assert_eq!(s.remaining_today(), 2);
        s.current_daily_quantity = 2;
        assert!(s.quota_reached());
        s.reset_mesh();
        assert_eq!(s.mesh, Mesh::STRING);
        s.start_new_day();
        assert!(!s.quota_reached());
        assert_eq!(Mesh::standard(ItemKind::Dirt), None);
    }

    #[test]
    fn mine_completes_only_the_front_order() {
        let a = DigOrder { block: BlockPos::new(1, 1, 0), stand: BlockPos::new(0, 1, 0) };
        let b = DigOrder { block: BlockPos::new(2, 1, 0), stand: BlockPos::new(1, 1, 0) };
        let mut m = MineModule::new([a, b]);
        m.complete(b);
        assert_eq!(m.remaining(), 2);
        m.complete(a);
        assert_eq!(m.next_order(), Some(b));
        assert_eq!(m.blocks_dug(), 1);
    }
}

// ── Sieve table ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod sieve {
    use std::io::Cursor;

    use col_core::{AgentRng, CitizenId};
    use col_world::ItemKind;

    use crate::{SieveEntry, SieveTable};

    const CSV: &str = "\
mesh,block,result,count,weight,quality
string_mesh,dirt,wheat_seeds,2,40,0
string_mesh,dirt,bone,1,10,0.5
flint_mesh,gravel,iron_nugget,1,5,2
";

    #[test]
    fn parses_rows_and_optional_quality() {
        let t = SieveTable::from_reader(Cursor::new(CSV)).expect("valid csv");
        let dirt = t.entries(ItemKind::StringMesh, ItemKind::Dirt);
        assert_eq!(dirt.len(), 2);
        assert_eq!(dirt[0], SieveEntry { result: ItemKind::WheatSeeds, count: 2, weight: 40.0, quality: 0.0 });
        assert_eq!(dirt[1].quality, 0.5);
        assert_eq!(t.entries(ItemKind::FlintMesh, ItemKind::Gravel)[0].quality, 2.0);
        assert!(t.entries(ItemKind::IronMesh, ItemKind::Sand).is_empty());
    }

    #[test]
    fn quality_column_is_optional() {
        let csv = "mesh,block,result,count,weight\nstring_mesh,sand,clay,1,3\n";
        let t = SieveTable::from_reader(Cursor::new(csv)).expect("valid csv");
        assert_eq!(t.entries(ItemKind::StringMesh, ItemKind::Sand)[0].quality, 0.0);
    }

    #[test]
    fn rejects_non_mesh_and_bad_weight() {
        let bad_mesh = "mesh,block,result,count,weight\ndirt,dirt,bone,1,1\n";
        assert!(SieveTable::from_reader(Cursor::new(bad_mesh)).is_err());
        let bad_weight = "mesh,block,result,count,weight\nstring_mesh,dirt,bone,1,-3\n";
        assert!(SieveTable::from_reader(Cursor::new(bad_weight)).is_err());
        let bad_item = "mesh,block,result,count,weight\nstring_mesh,dirt,unobtainium,1,1\n";
        assert!(SieveTable::from_reader(Cursor::new(bad_item)).is_err());
    }

    #[test]
    fn roll_respects_weights_and_nothing_rows() {
        let mut rng = AgentRng::new(5, CitizenId(1));
        let mut t = SieveTable::new();
        t.insert(ItemKind::StringMesh, ItemKind::Sand, SieveEntry {
            result:  ItemKind::Clay,
            count:   1,
            weight:  1.0,
            quality: 0.0,
        });
        t.insert(ItemKind::StringMesh, ItemKind::Sand, SieveEntry {
            result:  ItemKind::GoldNugget,
            count:   1,
            weight:  0.0,
            quality: 1.0,
        });
        for _ in 0..50 {
            let r = t.roll(ItemKind::StringMesh, ItemKind::Sand, 0.0, &mut rng);
            assert_eq!(r.map(|s| s.kind), Some(ItemKind::Clay), "zero-weight rows need luck");
        }
        assert_eq!(t.roll(ItemKind::IronMesh, ItemKind::Sand, 0.0, &mut rng), None);

        let mut empty = SieveTable::new();
        empty.insert(ItemKind::StringMesh, ItemKind::Dirt, SieveEntry {
            result:  ItemKind::Bone,
            count:   0,
            weight:  1.0,
            quality: 0.0,
        });
        assert_eq!(empty.roll(ItemKind::StringMesh, ItemKind::Dirt, 3.0, &mut rng), None);
    }

    #[test]
    fn builtin_covers_every_sievable_block_with_string_mesh() {
        let t = SieveTable::builtin();
        for block in [ItemKind::Dirt, ItemKind::Gravel, ItemKind::Sand, ItemKind::SoulSand] {
            assert!(!t.entries(ItemKind::StringMesh, block).is_empty(), "{block:?}");
        }
    }
}

// ── Eating ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod eat {
    use col_agent::stats::FULL_SATURATION;
    use col_agent::{Job, JobKind};
    use col_core::BlockPos;
    use col_world::container;
    use col_world::{Effect, ItemKind, ItemStack, Sound};

    use super::{citizen, Harness};
    use crate::eat::{NO_RESTAURANT, RAW_FOOD};
    use crate::{BuildingKind, EatState, EatTask};

    /// Tick the gate and the machine like the owning citizen does.
    /// Returns every transition until `stop` holds or `limit` ticks pass.
    fn drive(h: &mut Harness, task: &mut EatTask, limit: u32, stop: impl Fn(&EatTask) -> bool) -> Vec<EatState> {
        let mut seen = Vec::new();
        for _ in 0..limit {
            let next = h.step(|ctx| if task.should_execute(ctx) { task.tick(ctx) } else { None });
            seen.extend(next);
            if stop(task) {
                break;
            }
        }
        seen
    }

    #[test]
    fn starving_without_restaurant_complains_once_and_idles() {
        let mut h = Harness::new(citizen(1).saturation(0.0).build());
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 5_000, |_| false);

        assert_eq!(task.state(), EatState::Idle);
        assert_eq!(
            seen,
            vec![EatState::CheckForFood, EatState::GoToHut, EatState::SearchRestaurant, EatState::Idle]
        );
        assert_eq!(h.sink.count_key(NO_RESTAURANT), 1);
        assert!(h.worker.data.interactions().contains(NO_RESTAURANT));
        assert!(h.worker.data.interactions().has_blocking());
    }

    #[test]
    fn peckish_citizen_visits_the_hut_only_when_idling_at_work() {
        let mut h = Harness::new(citizen(1).saturation(5.0).build());
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 200, |_| false);
        assert!(!seen.contains(&EatState::GoToHut), "busy citizen stayed put: {seen:?}");

        let mut task = EatTask::new();
        task.set_job_idle(true);
        let seen = drive(&mut h, &mut task, 200, |t| t.state() == EatState::GoToHut);
        assert_eq!(seen, vec![EatState::CheckForFood, EatState::GoToHut]);
    }

    #[test]
    fn restaurant_built_later_lifts_the_complaint() {
        let mut h = Harness::new(citizen(1).saturation(0.0).build());
        let mut task = EatTask::new();
        drive(&mut h, &mut task, 200, |_| false);
        assert!(h.worker.data.interactions().contains(NO_RESTAURANT));

        h.colony.add_building(BlockPos::new(3, 1, 0), 1, BuildingKind::Restaurant);
        assert!(h.step(|ctx| task.should_execute(ctx)));
        assert!(!h.worker.data.interactions().contains(NO_RESTAURANT));
    }

    #[test]
    fn food_in_inventory_goes_straight_to_eat_and_exhausts_stack() {
        let mut h = Harness::new(citizen(1).saturation(2.0).item(ItemStack::new(ItemKind::Bread, 3)).build());
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 5_000, |_| false);

        assert_eq!(&seen[..2], &[EatState::CheckForFood, EatState::Eat]);
        assert_eq!(seen.last(), Some(&EatState::Idle));
        // three bites of bread at 2.5 each
        assert!((h.worker.data.saturation() - 9.5).abs() < 1e-9);
        assert_eq!(h.count(ItemKind::Bread), 0);
        assert_eq!(h.worker.data.held_slot(), None);
        let eats = h.sink.effects().iter().filter(|(e, _)| *e == Effect::Sound(Sound::Eat)).count();
        assert_eq!(eats, 15, "five evaluations per bite");
    }

    #[test]
    fn stops_eating_once_full() {
        let mut h = Harness::new(citizen(1).saturation(4.0).item(ItemStack::new(ItemKind::Bread, 10)).build());
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 5_000, |_| false);

        assert_eq!(seen.last(), Some(&EatState::Idle));
        assert!(h.worker.data.saturation() >= FULL_SATURATION);
        assert_eq!(h.count(ItemKind::Bread), 7);
        // full citizens are not pulled back in
        assert!(!h.step(|ctx| task.should_execute(ctx)));
    }

    #[test]
    fn hungry_worker_takes_food_from_hut() {
        let mut h = Harness::new(citizen(1).saturation(0.0).build());
        let hut = h.colony.add_building(BlockPos::new(8, 1, 0), 2, BuildingKind::Hut);
        h.worker.data.set_job(Some(Job::new(JobKind::Miner, Some(hut))));
        if let Some(b) = h.colony.building_mut(hut) {
            container::insert_anywhere(b.inventory_mut(), ItemStack::new(ItemKind::Bread, 10));
        }
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 5_000, |t| t.state() == EatState::Eat);

        assert_eq!(seen, vec![EatState::CheckForFood, EatState::GoToHut, EatState::CheckForFood, EatState::Eat]);
        assert_eq!(h.worker.walks, vec![BlockPos::new(8, 1, 0)]);
        // level 2 hut serves two portions
        assert_eq!(h.count(ItemKind::Bread), 4);
        let left = h.colony.building(hut).map(|b| container::count_matching(b.inventory(), |s| s.kind == ItemKind::Bread));
        assert_eq!(left, Some(6));
        assert!(!task.take_job_reset());
    }

    #[test]
    fn waits_at_restaurant_then_serves_itself() {
        let mut h = Harness::new(citizen(1).saturation(0.0).build());
        let restaurant = h.colony.add_building(BlockPos::new(2, 1, 0), 1, BuildingKind::Restaurant);
        if let Some(b) = h.colony.building_mut(restaurant) {
            container::insert_anywhere(b.inventory_mut(), ItemStack::new(ItemKind::CookedBeef, 5));
        }
        let mut task = EatTask::new();
        let seen = drive(&mut h, &mut task, 10_000, |t| t.state() == EatState::Eat);

        assert!(seen.contains(&EatState::WaitForFood));
        assert!(seen.contains(&EatState::GetFoodYourself));
        assert_eq!(seen.last(), Some(&EatState::Eat));
        assert_eq!(h.count(ItemKind::CookedBeef), 2);
        assert_eq!(h.sink.count_key(NO_RESTAURANT), 0);
    }

    #[test]
    fn raw_food_is_reported_instead_of_missing_restaurant() {
        let mut h = Harness::new(citizen(1).saturation(0.0).item(ItemStack::new(ItemKind::RawBeef, 2)).build());
        let mut task = EatTask::new();
        drive(&mut h, &mut task, 1_000, |_| false);
        assert_eq!(h.sink.count_key(RAW_FOOD), 1);
        assert_eq!(h.sink.count_key(NO_RESTAURANT), 0);
        assert!(h.worker.data.interactions().contains(RAW_FOOD));
        // raw food is never eaten
        assert_eq!(h.count(ItemKind::RawBeef), 2);
    }

    #[test]
    fn asleep_citizens_never_eat() {
        let mut h = Harness::new(citizen(1).saturation(0.0).asleep(true).build());
        let mut task = EatTask::new();
        for _ in 0..100 {
            assert!(!h.step(|ctx| task.should_execute(ctx)));
        }
    }
}

// ── Combat training ───────────────────────────────────────────────────────────

#[cfg(test)]
mod combat {
    use col_agent::{Job, JobKind};
    use col_behavior::PeerSnapshot;
    use col_core::{BlockPos, BuildingId, CitizenId, Vec3};
    use col_world::{ItemKind, ItemStack};

    use super::{citizen, Harness};
    use crate::combat::ACTIONS_PER_BUILDING_LEVEL;
    use crate::{AcademyModule, BuildingKind, CombatState, CombatTrainingTask};

    fn knight(h: &mut Harness, level: u32, targets: Vec<BlockPos>) -> BuildingId {
        let mut module = AcademyModule::new(targets);
        module.assign(CitizenId(1));
        module.assign(CitizenId(2));
        let academy = h.colony.add_building(BlockPos::new(0, 1, 4), level, BuildingKind::Academy(module));
        h.worker.data.set_job(Some(Job::new(JobKind::Knight, Some(academy))));
        academy
    }

    fn armed(h: &mut Harness) {
        let inv = h.worker.data.inventory_mut();
        col_world::container::insert_anywhere(inv, ItemStack::new(ItemKind::IronSword, 1));
        col_world::container::insert_anywhere(inv, ItemStack::new(ItemKind::Shield, 1));
    }

    #[test]
    fn missing_equipment_is_requested_once_and_blocks() {
        let mut h = Harness::new(citizen(1).build());
        knight(&mut h, 1, vec![BlockPos::new(3, 1, 3)]);
        let mut task = CombatTrainingTask::new();
        for _ in 0..500 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(task.state(), CombatState::StartWorking);
        assert_eq!(h.colony.requests().len(), 1);
        assert_eq!(h.colony.requests()[0].stack.kind, ItemKind::WoodenSword);

        col_world::container::insert_anywhere(h.worker.data.inventory_mut(), ItemStack::new(ItemKind::IronSword, 1));
        for _ in 0..200 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(task.state(), CombatState::StartWorking);
        let kinds: Vec<ItemKind> = h.colony.requests().iter().map(|r| r.stack.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Shield], "sword request closed, shield requested");

        col_world::container::insert_anywhere(h.worker.data.inventory_mut(), ItemStack::new(ItemKind::Shield, 1));
        for _ in 0..200 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_ne!(task.state(), CombatState::StartWorking);
        assert!(h.colony.requests().is_empty());
        assert_eq!(h.worker.data.held_item().map(|s| s.kind), Some(ItemKind::IronSword));
    }

    #[test]
    fn partner_rounds_never_exceed_the_budget() {
        let mut h = Harness::new(citizen(1).build());
        let level = 2;
        let academy = knight(&mut h, level, Vec::new());
        armed(&mut h);
        h.peers.push(PeerSnapshot { id: CitizenId(2), pos: Vec3::new(2.5, 1.0, 0.5), alive: true });

        let budget = level * ACTIONS_PER_BUILDING_LEVEL;
        let mut task = CombatTrainingTask::new();
        let mut peak = 0;
        let mut rounds = 0;
        for _ in 0..40_000 {
            let before = task.target_counter();
            h.step(|ctx| task.tick(ctx));
            let now = task.target_counter();
            assert!(now <= budget, "counter {now} over budget {budget}");
            peak = peak.max(now);
            if before > 0 && now == 0 {
                rounds += 1;
                let bonded = h.colony.building(academy).and_then(|b| b.academy()).map(|a| a.has_partner(CitizenId(1)));
                assert_eq!(bonded, Some(false), "bond released with the counter");
            }
        }
        // the last exchange of a round releases the bond and zeroes the counter
        assert_eq!(peak, budget - 1);
        assert!(rounds > 0);
        assert!(!h.worker.fled.is_empty(), "backs off after each hit");
        assert!(h.worker.data.saturation() < 10.0);
    }

    #[test]
    fn dummy_training_visits_targets() {
        let mut h = Harness::new(citizen(1).build());
        let target = BlockPos::new(6, 1, 6);
        knight(&mut h, 1, vec![target]);
        armed(&mut h);
        let mut task = CombatTrainingTask::new();
        for _ in 0..10_000 {
            h.step(|ctx| task.tick(ctx));
            assert!(task.target_counter() <= ACTIONS_PER_BUILDING_LEVEL);
        }
        assert!(h.worker.walks.contains(&target));
        assert!(task.partner().is_none(), "no live co-worker to bond with");
    }
}

// ── Sifting ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sift {
    use std::sync::Arc;

    use col_agent::{Job, JobKind, Stats};
    use col_core::{BlockPos, BuildingId};
    use col_world::container;
    use col_world::{ItemKind, ItemStack};

    use super::{citizen, Harness};
    use crate::sift::{progress_threshold, INVENTORY_FULL, MESH_BROKE};
    use crate::{BuildingKind, Mesh, SieveEntry, SieveTable, SiftState, SiftTask, SifterModule};

    fn table() -> Arc<SieveTable> {
        let mut t = SieveTable::new();
        for mesh in [ItemKind::StringMesh, ItemKind::FlintMesh] {
            t.insert(mesh, ItemKind::Gravel, SieveEntry {
                result:  ItemKind::Flint,
                count:   1,
                weight:  1.0,
                quality: 0.0,
            });
        }
        Arc::new(t)
    }

    fn sifter(h: &mut Harness, mesh: Mesh, daily: u32, current: u32) -> BuildingId {
        let mut module = SifterModule::new(ItemKind::Gravel, mesh, daily);
        module.current_daily_quantity = current;
        let hut = h.colony.add_building(BlockPos::new(1, 1, 1), 1, BuildingKind::Sifter(module));
        h.worker.data.set_job(Some(Job::new(JobKind::Sifter, Some(hut))));
        hut
    }

    fn with_gravel(n: u32) -> col_agent::CitizenData {
        citizen(1).stats(Stats::uniform(40)).item(ItemStack::new(ItemKind::Gravel, n)).build()
    }

    #[test]
    fn threshold_shrinks_with_skill() {
        assert_eq!(progress_threshold(0), 49);
        assert_eq!(progress_threshold(40), 41);
        assert_eq!(progress_threshold(1_000), 0);
    }

    #[test]
    fn daily_quota_reached_never_consumes() {
        let mut h = Harness::new(with_gravel(10));
        let hut = sifter(&mut h, Mesh::STRING, 5, 5);
        let mut task = SiftTask::new(table());
        task.force(SiftState::Sift);

        let mut next = None;
        for _ in 0..10 {
            next = next.or(h.step(|ctx| task.tick(ctx)));
        }
        assert_eq!(next, Some(SiftState::StartWorking));
        assert_eq!(h.count(ItemKind::Gravel), 10);
        assert_eq!(task.progress(), 0);
        assert!(h.colony.requests().is_empty());

        for _ in 0..1_000 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(h.count(ItemKind::Gravel), 10);
        let done = h.colony.building(hut).and_then(|b| b.sifter()).map(|s| s.current_daily_quantity);
        assert_eq!(done, Some(5));
    }

    #[test]
    fn sifts_up_to_the_daily_quantity() {
        let mut h = Harness::new(with_gravel(10));
        let hut = sifter(&mut h, Mesh::new(ItemKind::FlintMesh, 0.0), 3, 0);
        let mut task = SiftTask::new(table());
        for _ in 0..20_000 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(h.count(ItemKind::Gravel), 7);
        let building = h.colony.building(hut).expect("sifter exists");
        assert_eq!(building.sifter().map(|s| s.current_daily_quantity), Some(3));
        let flint = h.count(ItemKind::Flint) + container::count_matching(building.inventory(), |s| s.kind == ItemKind::Flint);
        assert_eq!(flint, 3);
        assert_eq!(building.sifter().map(|s| s.mesh.kind), Some(ItemKind::FlintMesh));
        assert_eq!(h.sink.count_key(MESH_BROKE), 0);
    }

    #[test]
    fn broken_mesh_falls_back_to_string_and_tells_managers() {
        let mut h = Harness::new(with_gravel(10));
        let hut = sifter(&mut h, Mesh::new(ItemKind::FlintMesh, 100.0), 1, 0);
        let mut task = SiftTask::new(table());
        for _ in 0..5_000 {
            h.step(|ctx| task.tick(ctx));
        }
        let mesh = h.colony.building(hut).and_then(|b| b.sifter()).map(|s| s.mesh);
        assert_eq!(mesh, Some(Mesh::STRING));
        assert_eq!(h.sink.count_key(MESH_BROKE), 1);
    }

    #[test]
    fn inventory_full_of_material_keeps_sifting() {
        let data = citizen(1)
            .stats(Stats::uniform(40))
            .inventory_slots(2)
            .item(ItemStack::new(ItemKind::Gravel, 128))
            .build();
        let mut h = Harness::new(data);
        let hut = sifter(&mut h, Mesh::new(ItemKind::FlintMesh, 0.0), 2, 0);
        let mut task = SiftTask::new(table());
        for _ in 0..20_000 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(h.count(ItemKind::Gravel), 126);
        let done = h.colony.building(hut).and_then(|b| b.sifter()).map(|s| s.current_daily_quantity);
        assert_eq!(done, Some(2));
        assert_eq!(h.sink.count_key(INVENTORY_FULL), 0);
    }

    #[test]
    fn inventory_full_of_tools_idles_and_complains() {
        let data = citizen(1)
            .inventory_slots(2)
            .item(ItemStack::new(ItemKind::IronPickaxe, 1))
            .item(ItemStack::new(ItemKind::FlintMesh, 1))
            .build();
        let mut h = Harness::new(data);
        let hut = sifter(&mut h, Mesh::STRING, 5, 0);
        if let Some(b) = h.colony.building_mut(hut) {
            container::insert_anywhere(b.inventory_mut(), ItemStack::new(ItemKind::Gravel, 10));
        }
        let mut task = SiftTask::new(table());
        let mut idled = false;
        for _ in 0..2_000 {
            h.step(|ctx| task.tick(ctx));
            idled |= task.is_idle() && h.sink.count_key(INVENTORY_FULL) > 0;
        }
        assert!(idled);
        let left = h.colony.building(hut).map(|b| container::count_matching(b.inventory(), |s| s.kind == ItemKind::Gravel));
        assert_eq!(left, Some(10));
        assert_eq!(h.count(ItemKind::IronPickaxe), 1);
    }

    #[test]
    fn missing_material_is_requested_then_gathered() {
        let mut h = Harness::new(citizen(1).build());
        let hut = sifter(&mut h, Mesh::STRING, 5, 0);
        let mut task = SiftTask::new(table());
        for _ in 0..500 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(task.state(), SiftState::NeedsItem);
        assert_eq!(h.colony.requests().len(), 1);
        assert_eq!(h.colony.requests()[0].stack, ItemStack::new(ItemKind::Gravel, 10));

        // delivered to the hut
        if let Some(b) = h.colony.building_mut(hut) {
            container::insert_anywhere(b.inventory_mut(), ItemStack::new(ItemKind::Gravel, 10));
        }
        for _ in 0..200 {
            h.step(|ctx| task.tick(ctx));
        }
        assert!(h.colony.requests().is_empty());
        assert_eq!(h.count(ItemKind::Gravel), 10);
    }
}

// ── Mining ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod miner {
    use col_agent::{Job, JobKind};
    use col_core::{BlockPos, ColonyConfig, Vec3};
    use col_world::{Block, EntityKind, ItemKind, ItemStack, Material, World};

    use super::{citizen, flat, Harness, STONE};
    use crate::miner::{self, MinerData, STUCK_WAIT_TICKS};
    use crate::{block_mining_delay, BuildingKind, DigOrder, MineModule, MinerState, MinerTask};

    #[test]
    fn delay_scales_with_hardness_tool_and_level() {
        let cfg = ColonyConfig::default();
        let pick = Some(ItemKind::IronPickaxe);
        assert_eq!(block_mining_delay(STONE, pick, 0, &cfg), 125);
        assert_eq!(block_mining_delay(STONE, pick, 2, &cfg), 90);
        assert_eq!(block_mining_delay(STONE, None, 0, &cfg), 1);
        assert_eq!(block_mining_delay(Block::Solid(Material::Bedrock), pick, 0, &cfg), 0);
        // wrong tool is slower
        assert!(block_mining_delay(STONE, Some(ItemKind::IronAxe), 0, &cfg) > 125);

        let pvp = ColonyConfig { pvp_mode: true, ..ColonyConfig::default() };
        assert_eq!(block_mining_delay(STONE, pick, 0, &pvp), 62);
    }

    fn miner_at_wall() -> Harness {
        let world = flat().block(BlockPos::new(2, 1, 0), STONE).build();
        Harness::with_world(citizen(1).build(), world)
    }

    #[test]
    fn mines_in_two_phases_and_collects_the_drop() {
        let mut h = miner_at_wall();
        let order = DigOrder { block: BlockPos::new(2, 1, 0), stand: BlockPos::new(1, 1, 0) };
        let mine = h.colony.add_building(BlockPos::new(0, 1, 3), 1, BuildingKind::Mine(MineModule::new([order])));
        h.worker.data.set_job(Some(Job::new(JobKind::Miner, Some(mine))));
        col_world::container::insert_anywhere(h.worker.data.inventory_mut(), ItemStack::new(ItemKind::IronPickaxe, 1));

        let mut task = MinerTask::new();
        let mut broken_at = None;
        for t in 0..400 {
            h.step(|ctx| task.tick(ctx));
            if broken_at.is_none() && h.world.block_at(order.block).is_air() {
                broken_at = Some(t);
            }
        }
        let broken_at = broken_at.expect("stone broken");
        assert!(broken_at >= 125, "break delay served, broke at {broken_at}");
        assert_eq!(h.count(ItemKind::Cobblestone), 1);
        assert_eq!(h.worker.data.held_item().map(|s| (s.kind, s.damage)), Some((ItemKind::IronPickaxe, 1)));
        assert_eq!(h.worker.data.job().map(|j| j.actions_done), Some(1));
        assert_eq!(h.colony.building(mine).and_then(|b| b.mine()).map(|m| m.remaining()), Some(0));
    }

    #[test]
    fn missing_pickaxe_is_requested() {
        let mut h = miner_at_wall();
        let order = DigOrder { block: BlockPos::new(2, 1, 0), stand: BlockPos::new(1, 1, 0) };
        let mine = h.colony.add_building(BlockPos::new(0, 1, 3), 1, BuildingKind::Mine(MineModule::new([order])));
        h.worker.data.set_job(Some(Job::new(JobKind::Miner, Some(mine))));
        let mut task = MinerTask::new();
        for _ in 0..300 {
            h.step(|ctx| task.tick(ctx));
        }
        assert_eq!(task.state(), MinerState::NeedsTool);
        assert_eq!(h.colony.requests().len(), 1);
        assert_eq!(h.colony.requests()[0].stack.kind, ItemKind::WoodenPickaxe);
        assert!(!h.world.block_at(order.block).is_air());
    }

    #[test]
    fn air_liquid_and_bedrock_count_as_mined() {
        let world = flat()
            .block(BlockPos::new(3, 1, 0), Block::Water)
            .block(BlockPos::new(4, 1, 0), Block::Solid(Material::Bedrock))
            .build();
        let mut h = Harness::with_world(citizen(1).build(), world);
        let mut d = MinerData::default();
        let stand = BlockPos::new(0, 1, 0);
        for x in 2..=4 {
            let pos = BlockPos::new(x, 1, 0);
            assert_eq!(h.step(|ctx| miner::mine_block(&mut d, ctx, pos, stand)).ok(), Some(true));
        }
        assert!(h.world.block_at(BlockPos::new(3, 1, 0)).is_air(), "liquid cleared");
        assert_eq!(h.world.block_at(BlockPos::new(4, 1, 0)), Block::Solid(Material::Bedrock));
        assert!(h.worker.walks.is_empty());
    }

    #[test]
    fn picks_up_items_within_reach() {
        let world = flat()
            .entity(EntityKind::Item, Vec3::new(1.5, 1.0, 0.5), Some(ItemStack::new(ItemKind::Coal, 3)))
            .build();
        let mut h = Harness::with_world(citizen(1).build(), world);
        let mut d = MinerData::default();
        h.step(|ctx| miner::fill_items_list(&mut d, ctx));
        assert!(h.step(|ctx| miner::gather_items(&mut d, ctx)));
        assert_eq!(h.count(ItemKind::Coal), 3);
        assert_eq!(h.world.entity_count(), 0);
    }

    #[test]
    fn unreachable_item_is_skipped_after_waiting() {
        let far = Vec3::new(10.5, 1.0, 0.5);
        let world = flat().entity(EntityKind::Item, far, Some(ItemStack::new(ItemKind::Coal, 1))).build();
        let mut h = Harness::with_world(citizen(1).build(), world);
        h.worker.teleport = false;
        let mut d = MinerData::default();
        h.step(|ctx| miner::fill_items_list(&mut d, ctx));

        let mut calls = 0;
        while !h.step(|ctx| miner::gather_items(&mut d, ctx)) {
            calls += 1;
            assert!(calls < 100, "gathering never gave up");
        }
        assert!(calls > STUCK_WAIT_TICKS as usize);
        assert_eq!(h.worker.stops, 1);
        assert_eq!(h.worker.walks, vec![far.block_pos()]);
        assert_eq!(h.world.entity_count(), 1, "left where it lies");
    }
}
