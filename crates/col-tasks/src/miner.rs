//! Block-breaking work at a mine.
//!
//! The miner works through its mine's dig plan.  Breaking a block is two
//! handler runs: the first equips a tool, walks to the safe standing spot
//! and schedules a delay that grows with hardness and shrinks with tool
//! speed and level; the second breaks the block and collects its drop.
//! After each block the miner gathers dropped items lying around, skipping
//! any it cannot reach.

use col_behavior::{AiTarget, BehaviorResult, StateMachine, TaskContext};
use col_core::{Aabb, BlockPos, ColonyConfig, EntityId};
use col_world::container;
use col_world::{Block, Effect, EntityKind, ItemKind, Sound, WorldEntity};

use crate::building::DigOrder;
use crate::common::{self, BUILDING_RANGE, REQUEST_DELAY};
use crate::Colony;

pub const XP_PER_BLOCK: f64 = 0.05;
/// Per-level factor on the mining delay.
pub const LEVEL_MODIFIER: f64 = 0.85;
/// Actions before the inventory goes back to the mine.
pub const ACTIONS_UNTIL_DUMP: u32 = 64;
pub const ITEM_PICKUP_RANGE: i32 = 3;
/// Gather ticks without path progress before an item is skipped.
pub const STUCK_WAIT_TICKS: u32 = 20;
pub const RANGE_HORIZONTAL_PICKUP: f64 = 45.0;
pub const RANGE_VERTICAL_PICKUP: f64 = 3.0;
const STAND_RANGE: i32 = 1;
const IDLE_DELAY: u32 = 100;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MinerState {
    Idle,
    StartWorking,
    MineBlock,
    GatherItems,
    InventoryFull,
    NeedsTool,
}

#[derive(Clone, Debug, Default)]
pub struct MinerData {
    order:         Option<DigOrder>,
    /// The block whose break delay has been served.
    mining:        Option<BlockPos>,
    items:         Vec<WorldEntity>,
    gather_target: Option<BlockPos>,
    last_progress: Option<usize>,
    stuck_ticks:   u32,
}

pub struct MinerTask {
    machine: StateMachine<MinerState, MinerData, Colony>,
    data:    MinerData,
}

impl Default for MinerTask {
    fn default() -> Self {
        Self::new()
    }
}

impl MinerTask {
    pub fn new() -> Self {
        let machine = StateMachine::new("miner", MinerState::Idle).with_targets([
            AiTarget::goto(MinerState::Idle, 10, MinerState::StartWorking),
            AiTarget::new(MinerState::StartWorking, 1, start_working),
            AiTarget::new(MinerState::MineBlock, 1, mine),
            AiTarget::new(MinerState::GatherItems, 1, gather),
            AiTarget::new(MinerState::InventoryFull, 1, dump),
            AiTarget::new(MinerState::NeedsTool, 1, needs_tool),
        ]);
        Self { machine, data: MinerData::default() }
    }

    pub fn state(&self) -> MinerState {
        self.machine.state()
    }

    pub fn is_idle(&self) -> bool {
        self.machine.state() == MinerState::Idle
    }

    /// Item entities still to be collected.
    pub fn pending_items(&self) -> usize {
        self.data.items.len()
    }

    pub fn tick(&mut self, ctx: &mut TaskContext<'_, Colony>) -> Option<MinerState> {
        self.machine.tick(&mut self.data, ctx)
    }

    pub fn reset(&mut self) {
        self.data = MinerData::default();
        self.machine.reset();
    }
}

// ── Mining delay ──────────────────────────────────────────────────────────────

/// Ticks to break `block` with `tool` at job `level`.  Unbreakable blocks
/// take no time because they are never broken.
pub fn block_mining_delay(block: Block, tool: Option<ItemKind>, level: u32, config: &ColonyConfig) -> u32 {
    let Some(hardness) = block.hardness() else { return 0 };
    let Some(tool) = tool else {
        return hardness as u32;
    };
    let modifier = if config.pvp_mode {
        config.block_mining_delay_modifier / 2.0
    } else {
        config.block_mining_delay_modifier * LEVEL_MODIFIER.powi(level as i32)
    };
    (modifier * hardness / tool.destroy_speed(block)) as u32
}

/// Break `pos` while standing at `stand`.  Returns `true` once the block is
/// gone, `false` while still walking, equipping or waiting out the delay.
/// Air, liquids and unbreakable blocks count as gone.
pub fn mine_block(
    d: &mut MinerData,
    ctx: &mut TaskContext<'_, Colony>,
    pos: BlockPos,
    stand: BlockPos,
) -> BehaviorResult<bool> {
    let block = ctx.world.block_at(pos);
    if block.is_liquid() {
        ctx.world.set_block(pos, Block::Air);
        return Ok(true);
    }
    if block.is_air() || block.hardness().is_none() {
        return Ok(true);
    }
    if !check_mining_location(d, ctx, pos, stand, block) {
        return Ok(false);
    }

    if let Some(drop) = block.drops() {
        let citizen = ctx.worker.citizen_mut();
        if let Some(rest) = container::insert_anywhere(citizen.inventory_mut(), drop) {
            ctx.world.spawn_item(pos.bottom_center(), rest);
        }
    }
    ctx.world.set_block(pos, Block::Air);
    ctx.effects.broadcast_effect(Effect::Sound(Sound::BlockBreak), pos.bottom_center());

    let citizen = ctx.worker.citizen_mut();
    if citizen.damage_held_item(1) {
        tracing::debug!(citizen = %citizen.id(), "tool broke");
    }
    citizen.add_experience(XP_PER_BLOCK);
    if let Some(job) = citizen.job_mut() {
        job.increment_actions();
    }
    d.mining = None;
    tracing::trace!(citizen = %ctx.citizen().id(), %pos, ?block, "block mined");
    Ok(true)
}

/// First run: equip, walk, and schedule the delay.  Second run: ready.
fn check_mining_location(
    d: &mut MinerData,
    ctx: &mut TaskContext<'_, Colony>,
    pos: BlockPos,
    stand: BlockPos,
    block: Block,
) -> bool {
    let tool = match block.preferred_tool() {
        Some(tool_type) => {
            if common::check_for_tool(ctx, tool_type) {
                d.mining = None;
                return false;
            }
            let slot = common::tool_slot(ctx, tool_type);
            ctx.citizen_mut().set_held_slot(slot);
            ctx.citizen().held_item().map(|s| s.kind)
        }
        None => ctx.citizen().held_item().map(|s| s.kind),
    };

    if !ctx.worker.walk_to(stand, STAND_RANGE) {
        d.mining = None;
        return false;
    }
    if d.mining == Some(pos) {
        return true;
    }

    let id = ctx.citizen().id();
    let delay = block_mining_delay(block, tool, ctx.citizen().level(), ctx.config);
    ctx.effects.broadcast_effect(Effect::SwingArm(id), ctx.worker.position());
    d.mining = Some(pos);
    ctx.set_delay(delay);
    false
}

// ── Item gathering ────────────────────────────────────────────────────────────

/// Refill the list of item entities near the worker.
pub fn fill_items_list(d: &mut MinerData, ctx: &TaskContext<'_, Colony>) {
    let bounds = Aabb::around(ctx.worker.position(), RANGE_HORIZONTAL_PICKUP, RANGE_VERTICAL_PICKUP);
    d.items = ctx.world.entities_in_bounds(&bounds, EntityKind::Item);
    d.gather_target = None;
    d.stuck_ticks = 0;
}

/// Pick up item entities within reach.  Items that do not fit stay where
/// they are.
fn pick_up_nearby(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) {
    let reach = ITEM_PICKUP_RANGE as f64;
    let bounds = Aabb::around(ctx.worker.position(), reach, 1.0);
    let mut taken: Vec<EntityId> = Vec::new();
    for e in ctx.world.entities_in_bounds(&bounds, EntityKind::Item) {
        let Some(stack) = e.item else { continue };
        let inv = ctx.worker.citizen_mut().inventory_mut();
        if container::room_for(inv, stack) < stack.count {
            continue;
        }
        if ctx.world.remove_entity(e.id).is_some() {
            container::insert_anywhere(inv, stack);
            taken.push(e.id);
        }
    }
    d.items.retain(|e| !taken.contains(&e.id));
}

/// One gathering step.  Returns `true` when nothing is left to collect.
pub fn gather_items(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> bool {
    pick_up_nearby(d, ctx);

    if ctx.worker.no_path() || d.gather_target.is_none() {
        let here = ctx.worker.position();
        let closest = d
            .items
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.pos.distance_sq(here).total_cmp(&b.pos.distance_sq(here)))
            .map(|(i, _)| i);
        let Some(i) = closest else {
            d.gather_target = None;
            return true;
        };
        let target = d.items.swap_remove(i).pos.block_pos();
        d.gather_target = Some(target);
        d.last_progress = None;
        d.stuck_ticks = 0;
        ctx.worker.walk_to(target, ITEM_PICKUP_RANGE);
        return false;
    }

    let progress = ctx.worker.path_progress();
    if progress == d.last_progress {
        d.stuck_ticks += 1;
        if d.stuck_ticks > STUCK_WAIT_TICKS {
            tracing::debug!(citizen = %ctx.citizen().id(), target = ?d.gather_target, "item unreachable; skipped");
            ctx.worker.stop();
            d.gather_target = None;
            d.stuck_ticks = 0;
        }
    } else {
        d.last_progress = progress;
        d.stuck_ticks = 0;
    }
    false
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn start_working(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<MinerState> {
    let mine = common::work_building(ctx)?;
    let citizen = ctx.citizen();
    let actions = citizen.job().map_or(0, |j| j.actions_done);
    if actions >= ACTIONS_UNTIL_DUMP || container::is_full(citizen.inventory()) {
        return Ok(MinerState::InventoryFull);
    }
    d.order = ctx.colony.mine_mut(mine)?.next_order();
    if d.order.is_some() {
        return Ok(MinerState::MineBlock);
    }
    fill_items_list(d, ctx);
    if !d.items.is_empty() {
        return Ok(MinerState::GatherItems);
    }
    ctx.set_delay(IDLE_DELAY);
    Ok(MinerState::Idle)
}

fn mine(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<MinerState> {
    let Some(order) = d.order else {
        return Ok(MinerState::StartWorking);
    };
    if !mine_block(d, ctx, order.block, order.stand)? {
        let wanted = ctx.world.block_at(order.block).preferred_tool();
        if wanted.is_some_and(|t| common::tool_slot(ctx, t).is_none()) {
            ctx.set_delay(REQUEST_DELAY);
            return Ok(MinerState::NeedsTool);
        }
        return Ok(MinerState::MineBlock);
    }
    let mine = common::work_building(ctx)?;
    ctx.colony.mine_mut(mine)?.complete(order);
    d.order = None;
    fill_items_list(d, ctx);
    if d.items.is_empty() {
        return Ok(MinerState::StartWorking);
    }
    Ok(MinerState::GatherItems)
}

fn gather(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<MinerState> {
    if gather_items(d, ctx) {
        return Ok(MinerState::StartWorking);
    }
    Ok(MinerState::GatherItems)
}

fn dump(_: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<MinerState> {
    let mine = common::work_building(ctx)?;
    let pos = ctx.colony.require(mine)?.pos();
    if !ctx.worker.walk_to(pos, BUILDING_RANGE) {
        return Ok(MinerState::InventoryFull);
    }
    common::dump_inventory(ctx, mine)?;
    Ok(MinerState::StartWorking)
}

fn needs_tool(d: &mut MinerData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<MinerState> {
    let Some(order) = d.order else {
        return Ok(MinerState::StartWorking);
    };
    let wanted = ctx.world.block_at(order.block).preferred_tool();
    match wanted {
        Some(tool) if common::check_for_tool(ctx, tool) => {
            ctx.set_delay(REQUEST_DELAY);
            Ok(MinerState::NeedsTool)
        }
        _ => Ok(MinerState::MineBlock),
    }
}
