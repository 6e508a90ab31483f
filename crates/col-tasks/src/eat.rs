//! Eating.
//!
//! Runs beside the job behaviour and preempts it through
//! [`EatTask::should_execute`].  Every state is evaluated once per second.
//!
//! ```text
//! IDLE -> CHECK_FOR_FOOD -+-> EAT -> IDLE
//!                         +-> GO_TO_HUT -+-> CHECK_FOR_FOOD
//!                                        +-> SEARCH_RESTAURANT -+-> IDLE (no restaurant)
//!                                                               +-> GO_TO_RESTAURANT -> WAIT_FOR_FOOD
//! WAIT_FOR_FOOD -+-> FIND_PLACE_TO_EAT -> EAT
//!                +-> GET_FOOD_YOURSELF -> WAIT_FOR_FOOD   (after two minutes)
//! ```

use col_agent::stats::{AVERAGE_SATURATION, FULL_SATURATION, HIGH_SATURATION, LOW_SATURATION};
use col_agent::{Interaction, InteractionPriority};
use col_behavior::{AiTarget, BehaviorResult, StateMachine, TaskContext};
use col_core::{BlockPos, BuildingId, TICKS_PER_SECOND};
use col_world::container;
use col_world::{Effect, ItemContainer, ItemStack, Recipients, Sound};

use crate::Colony;

/// Gate ticks at low saturation before a citizen with a job gives up work
/// to look for food.
pub const TICKS_BETWEEN_FOOD_CHECKS: u32 = 2 * 60 * TICKS_PER_SECOND as u32;

/// WAIT_FOR_FOOD evaluations (one per second) before serving oneself.
pub const WAITING_SECONDS: u32 = 2 * 60;

pub const MIN_DISTANCE_TO_RESTAURANT: i32 = 5;

pub const PLACE_TO_EAT_DISTANCE: i32 = 5;

/// EAT evaluations per bite.
pub const REQUIRED_TIME_TO_EAT: u32 = 5;

/// Food handed over per serving; a hut serves this much per building level.
pub const AMOUNT_OF_FOOD_TO_SERVE: u32 = 2;

pub const NO_RESTAURANT: &str = "citizen.eat.no_restaurant";
pub const RAW_FOOD: &str = "citizen.eat.raw_food";

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EatState {
    Idle,
    CheckForFood,
    GoToHut,
    SearchRestaurant,
    GoToRestaurant,
    WaitForFood,
    GetFoodYourself,
    FindPlaceToEat,
    Eat,
}

#[derive(Clone, Debug, Default)]
pub struct EatData {
    waiting_ticks: u32,
    food_slot:     Option<usize>,
    place_to_eat:  Option<BlockPos>,
    restaurant:    Option<BuildingId>,
    /// Set by the owner each tick: the job behaviour has nothing to do.
    job_idle:      bool,
    reset_job:     bool,
}

/// Edible as is.  Raw food waits for a cook.
fn is_food(s: &ItemStack) -> bool {
    s.kind.is_food() && !s.kind.is_cookable()
}

fn is_cookable(s: &ItemStack) -> bool {
    s.kind.is_cookable()
}

// ── EatTask ───────────────────────────────────────────────────────────────────

pub struct EatTask {
    machine: StateMachine<EatState, EatData, Colony>,
    data:    EatData,
}

impl Default for EatTask {
    fn default() -> Self {
        Self::new()
    }
}

impl EatTask {
    pub fn new() -> Self {
        let every = TICKS_PER_SECOND as u32;
        let machine = StateMachine::new("eat", EatState::Idle).with_targets([
            AiTarget::new(EatState::Idle, every, idle),
            AiTarget::new(EatState::CheckForFood, every, check_for_food),
            AiTarget::new(EatState::GoToHut, every, go_to_hut),
            AiTarget::new(EatState::SearchRestaurant, every, search_restaurant),
            AiTarget::new(EatState::GoToRestaurant, every, go_to_restaurant),
            AiTarget::new(EatState::WaitForFood, every, wait_for_food),
            AiTarget::new(EatState::GetFoodYourself, every, get_food_yourself),
            AiTarget::new(EatState::FindPlaceToEat, every, find_place_to_eat),
            AiTarget::new(EatState::Eat, every, eat),
        ]);
        Self { machine, data: EatData::default() }
    }

    pub fn state(&self) -> EatState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine<EatState, EatData, Colony> {
        &self.machine
    }

    /// Tell the task whether the job behaviour is idling; idle workers go
    /// to their hut for food sooner.
    pub fn set_job_idle(&mut self, idle: bool) {
        self.data.job_idle = idle;
    }

    /// `true` once after the citizen headed for a restaurant; the owner
    /// should restart its job behaviour.
    pub fn take_job_reset(&mut self) -> bool {
        std::mem::take(&mut self.data.reset_job)
    }

    /// Whether eating takes over this tick.  Once started it keeps control
    /// until it returns to IDLE.
    pub fn should_execute(&mut self, ctx: &mut TaskContext<'_, Colony>) -> bool {
        let citizen = ctx.citizen();
        if citizen.is_asleep() {
            return false;
        }
        if self.machine.state() != EatState::Idle {
            return true;
        }
        let sat = citizen.saturation();
        if sat >= HIGH_SATURATION {
            return false;
        }
        if citizen.interactions().contains(NO_RESTAURANT) {
            if ctx.colony.best_restaurant(ctx.worker.block_pos()).is_none() {
                return false;
            }
            ctx.citizen_mut().dismiss_interaction(NO_RESTAURANT);
        }

        let citizen = ctx.citizen();
        if sat <= AVERAGE_SATURATION {
            self.data.waiting_ticks = self.data.waiting_ticks.saturating_add(1);
            return (self.data.waiting_ticks >= TICKS_BETWEEN_FOOD_CHECKS && sat < LOW_SATURATION)
                || citizen.job().is_none()
                || sat <= 0.0;
        }
        container::has_matching(citizen.inventory(), is_food)
    }

    pub fn tick(&mut self, ctx: &mut TaskContext<'_, Colony>) -> Option<EatState> {
        self.machine.tick(&mut self.data, ctx)
    }

    /// Abandon whatever eating was in progress.
    pub fn reset(&mut self, ctx: &mut TaskContext<'_, Colony>) {
        reset(&mut self.data, ctx);
        self.machine.reset();
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn reset(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) {
    d.waiting_ticks = 0;
    d.food_slot = None;
    d.place_to_eat = None;
    d.restaurant = None;
    ctx.citizen_mut().set_held_slot(None);
}

fn idle(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    reset(d, ctx);
    Ok(EatState::CheckForFood)
}

/// EAT when food is in the inventory; otherwise GO_TO_HUT when hungry
/// enough, else IDLE.
fn food_check(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> EatState {
    let citizen = ctx.citizen();
    match container::find_first_slot(citizen.inventory(), is_food) {
        Some(slot) => {
            d.food_slot = Some(slot);
            EatState::Eat
        }
        None => {
            let sat = citizen.saturation();
            if (sat < LOW_SATURATION || d.job_idle) && sat < HIGH_SATURATION {
                EatState::GoToHut
            } else {
                reset(d, ctx);
                EatState::Idle
            }
        }
    }
}

fn check_for_food(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    Ok(food_check(d, ctx))
}

fn go_to_hut(_: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let Some(hut) = ctx.citizen().job().and_then(|j| j.work_building) else {
        return Ok(EatState::SearchRestaurant);
    };
    let Some(building) = ctx.colony.building(hut) else {
        return Ok(EatState::SearchRestaurant);
    };
    let (pos, level) = (building.pos(), building.level());
    if !ctx.worker.walk_to(pos, MIN_DISTANCE_TO_RESTAURANT) {
        return Ok(EatState::GoToHut);
    }

    let building = ctx.colony.require_mut(hut)?;
    if !container::has_matching(building.inventory(), is_food) {
        return Ok(EatState::SearchRestaurant);
    }
    let taken = container::transfer_matching(
        building.inventory_mut(),
        ctx.worker.citizen_mut().inventory_mut(),
        is_food,
        level.max(1) * AMOUNT_OF_FOOD_TO_SERVE,
    );
    tracing::debug!(citizen = %ctx.citizen().id(), building = %hut, taken, "took food from hut");
    Ok(EatState::CheckForFood)
}

fn search_restaurant(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let here = ctx.worker.block_pos();
    d.restaurant = ctx.colony.best_restaurant(here);

    let has_raw = container::has_matching(ctx.citizen().inventory(), is_cookable);
    if has_raw {
        let raw_food = Interaction::new(RAW_FOOD, InteractionPriority::Important)
            .valid_while(|c| Ok(container::has_matching(c.inventory(), is_cookable)));
        if ctx.citizen_mut().trigger_interaction(raw_food) {
            ctx.effects.notify(Recipients::Citizen(ctx.citizen().id()), RAW_FOOD, &[]);
        }
    }

    if d.restaurant.is_none() {
        if !has_raw {
            let no_restaurant = Interaction::new(NO_RESTAURANT, InteractionPriority::Blocking)
                .valid_while(|c| Ok(c.saturation() < HIGH_SATURATION));
            if ctx.citizen_mut().trigger_interaction(no_restaurant) {
                tracing::info!(citizen = %ctx.citizen().id(), "hungry and no restaurant");
                ctx.effects.notify(Recipients::Citizen(ctx.citizen().id()), NO_RESTAURANT, &[]);
            }
        }
        return Ok(EatState::Idle);
    }

    if ctx.citizen().job().is_some() {
        d.reset_job = true;
    }
    Ok(EatState::GoToRestaurant)
}

fn restaurant_pos(d: &EatData, ctx: &TaskContext<'_, Colony>) -> Option<BlockPos> {
    d.restaurant.and_then(|id| ctx.colony.building(id)).map(|b| b.pos())
}

fn go_to_restaurant(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let Some(pos) = restaurant_pos(d, ctx) else {
        return Ok(EatState::SearchRestaurant);
    };
    if ctx.worker.walk_to(pos, MIN_DISTANCE_TO_RESTAURANT) {
        return Ok(EatState::WaitForFood);
    }
    Ok(EatState::SearchRestaurant)
}

fn wait_for_food(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    d.restaurant = ctx.colony.best_restaurant(ctx.worker.block_pos());
    let Some(pos) = restaurant_pos(d, ctx) else {
        return Ok(EatState::SearchRestaurant);
    };
    if pos.distance_2d(ctx.worker.block_pos()) > MIN_DISTANCE_TO_RESTAURANT as f64 {
        return Ok(EatState::GoToRestaurant);
    }

    match food_check(d, ctx) {
        EatState::Eat => {
            d.place_to_eat = None;
            return Ok(EatState::FindPlaceToEat);
        }
        EatState::Idle => return Ok(EatState::Idle),
        _ => {}
    }

    d.waiting_ticks += 1;
    if d.waiting_ticks > WAITING_SECONDS {
        d.waiting_ticks = 0;
        return Ok(EatState::GetFoodYourself);
    }
    Ok(EatState::WaitForFood)
}

fn get_food_yourself(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let Some(id) = d.restaurant.filter(|&id| ctx.colony.building(id).is_some_and(|b| b.is_restaurant())) else {
        return Ok(EatState::SearchRestaurant);
    };
    let restaurant = ctx.colony.require_mut(id)?;
    let taken = container::transfer_matching(
        restaurant.inventory_mut(),
        ctx.worker.citizen_mut().inventory_mut(),
        is_food,
        AMOUNT_OF_FOOD_TO_SERVE,
    );
    tracing::debug!(citizen = %ctx.citizen().id(), restaurant = %id, taken, "served self");
    Ok(EatState::WaitForFood)
}

fn find_place_to_eat(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let place = match d.place_to_eat {
        Some(p) => p,
        None => match ctx.worker.random_land_pos(PLACE_TO_EAT_DISTANCE, ctx.rng) {
            Some(p) => {
                d.place_to_eat = Some(p);
                p
            }
            None => {
                d.waiting_ticks = 0;
                return Ok(EatState::Eat);
            }
        },
    };
    if ctx.worker.walk_to(place, MIN_DISTANCE_TO_RESTAURANT) {
        d.waiting_ticks = 0;
        return Ok(EatState::Eat);
    }
    Ok(EatState::FindPlaceToEat)
}

fn eat(d: &mut EatData, ctx: &mut TaskContext<'_, Colony>) -> BehaviorResult<EatState> {
    let Some(slot) = d.food_slot else {
        return Ok(EatState::CheckForFood);
    };
    let Some(stack) = ctx.citizen().inventory().get(slot).filter(is_food) else {
        return Ok(EatState::CheckForFood);
    };

    let id = ctx.citizen().id();
    let pos = ctx.worker.position();
    ctx.citizen_mut().set_held_slot(Some(slot));
    ctx.effects.broadcast_effect(Effect::SwingArm(id), pos);
    ctx.effects.broadcast_effect(Effect::Sound(Sound::Eat), pos);
    ctx.effects.broadcast_effect(Effect::ItemParticles(stack.kind), pos);

    d.waiting_ticks += 1;
    if d.waiting_ticks < REQUIRED_TIME_TO_EAT {
        return Ok(EatState::Eat);
    }

    let heal = stack.kind.heal_amount().unwrap_or(0.0);
    let citizen = ctx.citizen_mut();
    citizen.increase_saturation(heal / 2.0);
    citizen.inventory_mut().extract(slot, 1, false);
    citizen.set_held_slot(None);
    citizen.set_just_ate(true);
    tracing::trace!(citizen = %id, food = ?stack.kind, saturation = citizen.saturation(), "bite");

    let food_left = citizen.inventory().get(slot).is_some_and(|s| is_food(&s));
    if citizen.saturation() < FULL_SATURATION && food_left {
        d.waiting_ticks = 0;
        return Ok(EatState::Eat);
    }
    Ok(EatState::Idle)
}
