//! Sifting at the sifter's hut.
//!
//! Each SIFT evaluation adds one unit of progress.  Past a threshold that
//! shrinks with the secondary skill, one sievable block is consumed and a
//! result is rolled from the [`SieveTable`] for the hut's mesh.  The hut's
//! daily quantity caps how many blocks are sifted per day; once it is
//! reached, or the inventory is full of things to dump, sifting stops.
//!
//! Material comes from the worker's inventory, then the hut's container,
//! then an item request.  Results are dumped into the hut every
//! [`ACTIONS_UNTIL_DUMP`] sifts, and at random in between.

use std::sync::Arc;

use col_agent::Skill;
use col_behavior::{AiTarget, BehaviorResult, StateMachine, TaskContext};
use col_core::BuildingId;
use col_world::container;
use col_world::{Effect, ItemKind, ItemStack, Recipients, Sound};

use crate::common::{self, ACTION_SATURATION_COST, BUILDING_RANGE, REQUEST_DELAY};
use crate::{Colony, SieveTable};

/// Progress needed for a sift at skill zero.
pub const MAX_LEVEL: u32 = 50;
/// Ticks between SIFT evaluations.
pub const TICK_DELAY: u32 = 10;
/// Percent chance to dump the inventory after a sift.
pub const CHANCE_TO_DUMP_INV: u32 = 10;
pub const ACTIONS_UNTIL_DUMP: u32 = 10;
pub const XP_PER_SIFT: f64 = 0.2;
pub const STACK_SIZE: u32 = 64;
/// Notification key sent to the colony's managers.
pub const MESH_BROKE: &str = "sifter.meshbroke";
/// Told to the sifter when it holds nothing to dump and no room for material.
pub const INVENTORY_FULL: &str = "sifter.inventoryfull";

/// Skill that sets the result luck.
pub const PRIMARY_SKILL: Skill = Skill::Dexterity;
/// Skill that shortens the progress threshold.
pub const SECONDARY_SKILL: Skill = Skill::Endurance;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SiftState {
    Idle,
    StartWorking,
    Sift,
    InventoryFull,
    GatheringRequiredMaterials,
    NeedsItem,
}

#[derive(Clone, Debug)]
pub struct SiftData {
    progress: u32,
    table:    Arc<SieveTable>,
}

pub struct SiftTask {
    machine: StateMachine<SiftState, SiftData, Colony>,
    data:    SiftData,
}

impl SiftTask {
    pub fn new(table: Arc<SieveTable>) -> Self {
        let machine = StateMachine::new("sift", SiftState::Idle).with_targets([
            AiTarget::goto(SiftState::Idle, 10, SiftState::StartWorking),
            AiTarget::new(SiftState::StartWorking, 1, start_working),
            AiTarget::new(SiftState::Sift, TICK_DELAY, sift),
            AiTarget::new(SiftState::InventoryFull, 1, dump),
            AiTarget::new(SiftState::GatheringRequiredMaterials, 1, gather_materials),
            AiTarget::new(SiftState::NeedsItem, 1, needs_item),
        ]);
        Self { machine, data: SiftData { progress: 0, table } }
    }

    pub fn state(&self) -> SiftState {
        self.machine.state()
    }

    pub fn progress(&self) -> u32 {
        self.data.progress
    }

    pub fn is_idle(&self) -> bool {
        self.machine.state() == SiftState::Idle
    }

    pub fn tick(&mut self, ctx: &mut TaskContext<'_, Colony>) -> Option<SiftState> {
        self.machine.tick(&mut self.data, ctx)
    }

    pub fn reset(&mut self) {
        self.data.progress = 0;
        self.machine.reset();
    }

    /// Resume in `state`, e.g. a task restored from a save.
    pub fn force(&mut self, state: SiftState) {
        self.machine.force(state);
    }
}

/// Progress a sift needs at the given secondary skill.
pub fn progress_threshold(secondary: u32) -> u32 {
    MAX_LEVEL - (secondary / 5 + 1).min(MAX_LEVEL)
}

fn sievable_of(ctx: &mut TaskContext<'_, Colony>, hut: BuildingId) -> BehaviorResult<ItemKind> {
    Ok(ctx.colony.sifter_mut(hut)?.sievable)
}

/// Raw material, tools and meshes stay with the sifter.
fn is_dumpable(stack: &ItemStack, sievable: ItemKind) -> bool {
    stack.kind != sievable && stack.kind.tool_type().is_none() && !stack.kind.is_mesh()
}

/// Full, and a trip to the hut would actually free a slot.
fn must_dump(ctx: &TaskContext<'_, Colony>, sievable: ItemKind) -> bool {
    let inventory = ctx.citizen().inventory();
    container::is_full(inventory) && container::has_matching(inventory, |s| is_dumpable(s, sievable))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn start_working(_: &mut SiftData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<SiftState> {
    let hut = common::work_building(ctx)?;
    let sievable = sievable_of(ctx, hut)?;
    let actions = ctx.citizen().job().map_or(0, |j| j.actions_done);
    if actions >= ACTIONS_UNTIL_DUMP || must_dump(ctx, sievable) {
        return Ok(SiftState::InventoryFull);
    }
    if ctx.colony.sifter_mut(hut)?.quota_reached() {
        ctx.set_delay(REQUEST_DELAY);
        return Ok(SiftState::StartWorking);
    }
    Ok(SiftState::Sift)
}

fn sift(d: &mut SiftData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<SiftState> {
    let hut = common::work_building(ctx)?;
    let module = ctx.colony.sifter_mut(hut)?;
    if module.quota_reached() {
        return Ok(SiftState::StartWorking);
    }
    let (mesh, sievable, remaining) = (module.mesh, module.sievable, module.remaining_today());

    if must_dump(ctx, sievable) {
        return Ok(SiftState::InventoryFull);
    }
    let hut_pos = ctx.colony.require(hut)?.pos();
    if !ctx.worker.walk_to(hut_pos, BUILDING_RANGE) {
        return Ok(SiftState::Sift);
    }

    let is_sievable = |s: &ItemStack| s.kind == sievable;
    if !container::has_matching(ctx.citizen().inventory(), is_sievable) {
        if container::has_matching(ctx.colony.require(hut)?.inventory(), is_sievable) {
            return Ok(SiftState::GatheringRequiredMaterials);
        }
        let qty = (remaining * 2).min(STACK_SIZE);
        if qty == 0 {
            return Ok(SiftState::StartWorking);
        }
        let me = ctx.citizen().id();
        ctx.colony.request_item(me, ItemStack::new(sievable, qty));
        return Ok(SiftState::NeedsItem);
    }

    let id = ctx.citizen().id();
    let pos = ctx.worker.position();
    ctx.effects.broadcast_effect(Effect::ItemParticles(mesh.kind), hut_pos.bottom_center());
    ctx.effects.broadcast_effect(Effect::ItemParticles(sievable), hut_pos.down().bottom_center());
    ctx.effects.broadcast_effect(Effect::SwingArm(id), pos);
    ctx.effects.broadcast_effect(Effect::Sound(Sound::Sift), hut_pos.bottom_center());

    d.progress += 1;
    let stats = *ctx.citizen().stats();
    if d.progress <= progress_threshold(stats.get(SECONDARY_SKILL)) {
        return Ok(SiftState::Sift);
    }

    d.progress = 0;
    let module = ctx.colony.sifter_mut(hut)?;
    module.current_daily_quantity += 1;
    let done_today = module.current_daily_quantity;

    let luck = 1.0 + (stats.get(PRIMARY_SKILL) as f64 / 10.0).round();
    let result = d.table.roll(mesh.kind, sievable, luck, ctx.rng);
    let food_modifier = ctx.config.food_modifier;
    let citizen = ctx.worker.citizen_mut();
    if let Some(job) = citizen.job_mut() {
        job.increment_actions();
    }
    citizen.decrease_saturation(ACTION_SATURATION_COST, food_modifier);
    container::reduce_matching(citizen.inventory_mut(), is_sievable, 1);
    if let Some(stack) = result {
        if let Some(rest) = container::insert_anywhere(citizen.inventory_mut(), stack) {
            ctx.world.spawn_item(pos, rest);
        }
    }
    citizen.add_experience(XP_PER_SIFT);
    tracing::debug!(citizen = %id, result = ?result.map(|s| s.kind), done_today, "sifted");

    if ctx.rng.next_f64() * 100.0 < mesh.break_chance {
        ctx.colony.sifter_mut(hut)?.reset_mesh();
        tracing::info!(building = %hut, mesh = ?mesh.kind, "mesh broke");
        ctx.effects.notify(Recipients::ColonyManagers, MESH_BROKE, &[]);
    }

    if ctx.rng.chance_percent(CHANCE_TO_DUMP_INV) {
        return Ok(SiftState::InventoryFull);
    }
    Ok(SiftState::Sift)
}

fn dump(_: &mut SiftData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<SiftState> {
    let hut = common::work_building(ctx)?;
    let pos = ctx.colony.require(hut)?.pos();
    if !ctx.worker.walk_to(pos, BUILDING_RANGE) {
        return Ok(SiftState::InventoryFull);
    }
    let sievable = sievable_of(ctx, hut)?;
    let target = ctx.colony.require_mut(hut)?;
    container::transfer_matching(
        ctx.worker.citizen_mut().inventory_mut(),
        target.inventory_mut(),
        |s| is_dumpable(s, sievable),
        u32::MAX,
    );
    if let Some(job) = ctx.worker.citizen_mut().job_mut() {
        job.clear_actions();
    }
    Ok(SiftState::StartWorking)
}

fn gather_materials(_: &mut SiftData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<SiftState> {
    let hut = common::work_building(ctx)?;
    let pos = ctx.colony.require(hut)?.pos();
    if !ctx.worker.walk_to(pos, BUILDING_RANGE) {
        return Ok(SiftState::GatheringRequiredMaterials);
    }
    let sievable = sievable_of(ctx, hut)?;
    let building = ctx.colony.require_mut(hut)?;
    let taken = container::transfer_matching(
        building.inventory_mut(),
        ctx.worker.citizen_mut().inventory_mut(),
        |s| s.kind == sievable,
        STACK_SIZE,
    );
    let me = ctx.citizen().id();
    tracing::debug!(citizen = %me, taken, "gathered material");
    if taken == 0 && container::is_full(ctx.citizen().inventory()) {
        // only kept items and no room: nothing a dump could fix
        ctx.effects.notify(Recipients::Citizen(me), INVENTORY_FULL, &[]);
        ctx.set_delay(REQUEST_DELAY);
        return Ok(SiftState::Idle);
    }
    Ok(SiftState::StartWorking)
}

fn needs_item(_: &mut SiftData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<SiftState> {
    let hut = common::work_building(ctx)?;
    let sievable = sievable_of(ctx, hut)?;
    let me = ctx.citizen().id();
    if container::has_matching(ctx.citizen().inventory(), |s| s.kind == sievable) {
        ctx.colony.take_request(me, sievable);
        return Ok(SiftState::StartWorking);
    }
    if container::has_matching(ctx.colony.require(hut)?.inventory(), |s| s.kind == sievable) {
        ctx.colony.take_request(me, sievable);
        return Ok(SiftState::GatheringRequiredMaterials);
    }
    ctx.set_delay(REQUEST_DELAY);
    Ok(SiftState::NeedsItem)
}
