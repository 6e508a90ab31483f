//! Knight combat training at the academy.
//!
//! Each round either spars with a partner knight or hits the academy's
//! training dummies.  Every exchange is a coin flip between a shield block
//! and a sword swing; the swing wears the sword.  After
//! `level * ACTIONS_PER_BUILDING_LEVEL` exchanges the bond is released and
//! the round starts over.
//!
//! A knight without a sword and a shield never gets past START_WORKING: the
//! missing piece is requested and the check repeats every
//! [`REQUEST_DELAY`] ticks.

use col_behavior::{AiTarget, BehaviorResult, StateMachine, TaskContext};
use col_core::{BlockPos, CitizenId};
use col_world::container;
use col_world::{Effect, Sound, ToolType};

use crate::common::{self, ACTION_SATURATION_COST, REQUEST_DELAY};
use crate::Colony;

pub const ACTIONS_PER_BUILDING_LEVEL: u32 = 5;
pub const XP_BASE_RATE: f64 = 0.2;
/// Percent chance to look for a sparring partner instead of a dummy.
pub const PARTNER_TRAINING_CHANCE: u32 = 25;
pub const TRAININGS_DELAY: u32 = 60;
pub const MIN_DISTANCE_TO_TRAIN: f64 = 5.0;
pub const STANDARD_DELAY: u32 = 5;
/// Handler runs between two exchanges.
pub const ATTACK_DELAY_BASE: u32 = 10;
/// Distance to back off after hitting a partner.
pub const BACK_OFF_RANGE: u32 = 4;
const TARGET_RANGE: i32 = 3;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CombatState {
    Idle,
    StartWorking,
    Decide,
    CombatTraining,
    FindTrainingPartner,
    TrainWithPartner,
    AttackProtect,
    GoToTarget,
    FindDummyPartner,
    AttackDummy,
}

#[derive(Clone, Debug)]
pub struct CombatData {
    partner:         Option<CitizenId>,
    dummy:           Option<BlockPos>,
    pathing_target:  Option<BlockPos>,
    after_pathing:   CombatState,
    target_counter:  u32,
    attack_delay:    u32,
}

impl Default for CombatData {
    fn default() -> Self {
        Self {
            partner:        None,
            dummy:          None,
            pathing_target: None,
            after_pathing:  CombatState::StartWorking,
            target_counter: 0,
            attack_delay:   0,
        }
    }
}

pub struct CombatTrainingTask {
    machine: StateMachine<CombatState, CombatData, Colony>,
    data:    CombatData,
}

impl Default for CombatTrainingTask {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatTrainingTask {
    pub fn new() -> Self {
        let machine = StateMachine::new("combat_training", CombatState::Idle).with_targets([
            AiTarget::goto(CombatState::Idle, 1, CombatState::StartWorking),
            AiTarget::new(CombatState::StartWorking, 1, start_working),
            AiTarget::new(CombatState::Decide, 1, decide),
            AiTarget::new(CombatState::CombatTraining, 1, decide_on_training_type),
            AiTarget::new(CombatState::FindTrainingPartner, 1, find_training_partner),
            AiTarget::new(CombatState::TrainWithPartner, 1, train_with_partner),
            AiTarget::new(CombatState::AttackProtect, 1, attack),
            AiTarget::new(CombatState::GoToTarget, 1, go_to_target),
            AiTarget::new(CombatState::FindDummyPartner, 1, find_dummy_partner),
            AiTarget::new(CombatState::AttackDummy, 1, attack_dummy),
        ]);
        Self { machine, data: CombatData::default() }
    }

    pub fn state(&self) -> CombatState {
        self.machine.state()
    }

    /// Exchanges in the current round.
    pub fn target_counter(&self) -> u32 {
        self.data.target_counter
    }

    pub fn partner(&self) -> Option<CitizenId> {
        self.data.partner
    }

    pub fn is_idle(&self) -> bool {
        self.machine.state() == CombatState::Idle
    }

    pub fn tick(&mut self, ctx: &mut TaskContext<'_, Colony>) -> Option<CombatState> {
        self.machine.tick(&mut self.data, ctx)
    }

    pub fn reset(&mut self) {
        self.data = CombatData::default();
        self.machine.reset();
    }
}

/// Level-scaled exchanges per round.
fn action_budget(ctx: &TaskContext<'_, Colony>, academy: col_core::BuildingId) -> BehaviorResult<u32> {
    Ok(ctx.colony.require(academy)?.level() * ACTIONS_PER_BUILDING_LEVEL)
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// Sword and shield in the inventory; the sword goes into the hand.
pub fn is_setup(ctx: &mut TaskContext<'_, Colony>) -> bool {
    if common::check_for_tool(ctx, ToolType::Sword) || common::check_for_tool(ctx, ToolType::Shield) {
        ctx.set_delay(REQUEST_DELAY);
        return false;
    }
    let sword = common::tool_slot(ctx, ToolType::Sword);
    ctx.citizen_mut().set_held_slot(sword);
    true
}

fn start_working(_: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    common::work_building(ctx)?;
    if !is_setup(ctx) {
        return Ok(CombatState::StartWorking);
    }
    Ok(CombatState::Decide)
}

fn decide(_: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    let academy = common::work_building(ctx)?;
    let me = ctx.citizen().id();
    if ctx.colony.academy_mut(academy)?.has_partner(me) {
        ctx.set_delay(STANDARD_DELAY);
        return Ok(CombatState::TrainWithPartner);
    }
    Ok(CombatState::CombatTraining)
}

fn decide_on_training_type(_: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    let academy = common::work_building(ctx)?;
    let me = ctx.citizen().id();
    if ctx.colony.academy_mut(academy)?.has_partner(me) || ctx.rng.chance_percent(PARTNER_TRAINING_CHANCE) {
        return Ok(CombatState::FindTrainingPartner);
    }
    Ok(CombatState::FindDummyPartner)
}

// ── Partner ───────────────────────────────────────────────────────────────────

fn find_training_partner(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    let academy = common::work_building(ctx)?;
    let me = ctx.citizen().id();
    let peers = ctx.peers;
    let alive = |c: CitizenId| peers.iter().any(|p| p.id == c && p.alive);
    d.partner = ctx.colony.academy_mut(academy)?.random_partner(me, ctx.rng, alive);
    match d.partner {
        None => Ok(CombatState::CombatTraining),
        Some(p) => {
            tracing::debug!(citizen = %me, partner = %p, "training partner found");
            Ok(CombatState::TrainWithPartner)
        }
    }
}

fn partner_pos(d: &mut CombatData, ctx: &TaskContext<'_, Colony>) -> Option<BlockPos> {
    let peer = d.partner.and_then(|p| ctx.peer(p));
    if peer.is_none() {
        d.partner = None;
    }
    peer.map(|p| p.pos.block_pos())
}

fn train_with_partner(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    let Some(target) = partner_pos(d, ctx) else {
        return Ok(CombatState::CombatTraining);
    };
    if target.distance_2d(ctx.worker.block_pos()) > MIN_DISTANCE_TO_TRAIN && !ctx.worker.walk_to(target, 1) {
        return Ok(CombatState::TrainWithPartner);
    }
    Ok(CombatState::AttackProtect)
}

/// One block-or-swing exchange.
fn exchange(ctx: &mut TaskContext<'_, Colony>) {
    let id = ctx.citizen().id();
    let pos = ctx.worker.position();
    let food_modifier = ctx.config.food_modifier;
    let citizen = ctx.worker.citizen_mut();
    citizen.add_experience(XP_BASE_RATE);
    citizen.decrease_saturation(ACTION_SATURATION_COST, food_modifier);

    if ctx.rng.next_bool() {
        let shield = container::has_matching(ctx.citizen().inventory(), |s| s.kind.tool_type() == Some(ToolType::Shield));
        if shield {
            ctx.effects.broadcast_effect(Effect::Sound(Sound::ShieldBlock), pos);
        }
    } else {
        ctx.effects.broadcast_effect(Effect::SwingArm(id), pos);
        ctx.effects.broadcast_effect(Effect::Sound(Sound::SwordSwing), pos);
        if ctx.citizen_mut().damage_held_item(1) {
            tracing::debug!(citizen = %id, "sword broke");
        }
    }
}

fn attack(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    let Some(target) = partner_pos(d, ctx) else {
        return Ok(CombatState::StartWorking);
    };
    if target.distance_2d(ctx.worker.block_pos()) > MIN_DISTANCE_TO_TRAIN {
        d.pathing_target = Some(target);
        d.after_pathing = CombatState::TrainWithPartner;
        return Ok(CombatState::GoToTarget);
    }
    if d.attack_delay > 0 {
        d.attack_delay -= 1;
        return Ok(CombatState::AttackProtect);
    }

    exchange(ctx);
    ctx.worker.move_away_from(target, BACK_OFF_RANGE);
    d.target_counter += 1;

    let academy = common::work_building(ctx)?;
    if d.target_counter >= action_budget(ctx, academy)? {
        let me = ctx.citizen().id();
        ctx.colony.academy_mut(academy)?.reset_partner(me);
        tracing::debug!(citizen = %me, exchanges = d.target_counter, "sparring round done");
        d.partner = None;
        d.target_counter = 0;
        return Ok(CombatState::StartWorking);
    }
    d.attack_delay = ATTACK_DELAY_BASE;
    ctx.set_delay(TRAININGS_DELAY);
    Ok(CombatState::AttackProtect)
}

// ── Dummy ─────────────────────────────────────────────────────────────────────

fn find_dummy_partner(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    let academy = common::work_building(ctx)?;
    if d.target_counter >= action_budget(ctx, academy)? {
        d.target_counter = 0;
        return Ok(CombatState::Decide);
    }
    let me = ctx.citizen().id();
    let module = ctx.colony.academy_mut(academy)?;
    if module.has_partner(me) {
        return Ok(CombatState::TrainWithPartner);
    }
    let Some(dummy) = module.random_target(ctx.rng) else {
        return Ok(CombatState::Decide);
    };
    d.dummy = Some(dummy);
    d.target_counter += 1;
    d.pathing_target = Some(dummy);
    d.after_pathing = CombatState::AttackDummy;
    Ok(CombatState::GoToTarget)
}

fn go_to_target(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    let Some(target) = d.pathing_target else {
        return Ok(CombatState::StartWorking);
    };
    if !ctx.worker.walk_to(target, TARGET_RANGE) {
        return Ok(CombatState::GoToTarget);
    }
    d.pathing_target = None;
    Ok(d.after_pathing)
}

fn attack_dummy(d: &mut CombatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<CombatState> {
    ctx.set_delay(STANDARD_DELAY);
    if d.dummy.is_none() {
        return Ok(CombatState::StartWorking);
    }
    if d.attack_delay > 0 {
        d.attack_delay -= 1;
        return Ok(CombatState::AttackDummy);
    }
    exchange(ctx);
    d.attack_delay = ATTACK_DELAY_BASE;
    ctx.set_delay(TRAININGS_DELAY);
    Ok(CombatState::FindDummyPartner)
}
