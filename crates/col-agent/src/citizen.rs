//! The persistent citizen record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use col_core::{AgentRng, CitizenId, Vec3};
use col_world::{ItemContainer, ItemStack, SlotInventory};

use crate::arena::Handle;
use crate::experience::Experience;
use crate::interaction::{Interaction, InteractionPriority, Interactions};
use crate::job::{Job, JobKind};
use crate::stats::{Stats, MAX_SATURATION};
use crate::{AgentError, AgentResult};

/// Main inventory size of every citizen.
pub const INVENTORY_SLOTS: usize = 27;

// ── CitizenData ───────────────────────────────────────────────────────────────

/// Everything about a citizen that outlives its live entity.
///
/// The live entity (body, navigator, behaviours) is owned elsewhere and
/// referenced through `entity`, an arena handle that may be stale or absent.
#[derive(Clone, Debug)]
pub struct CitizenData {
    id:           CitizenId,
    name:         String,
    position:     Vec3,
    held_slot:    Option<usize>,
    stats:        Stats,
    saturation:   f64,
    inventory:    SlotInventory,
    job:          Option<Job>,
    experience:   BTreeMap<JobKind, Experience>,
    asleep:       bool,
    paused:       bool,
    just_ate:     bool,
    interactions: Interactions,
    entity:       Option<Handle>,
    dirty:        bool,
}

impl CitizenData {
    /// A new citizen with full saturation and freshly rolled stats.
    pub fn new_random(id: CitizenId, name: impl Into<String>, level_cap: u32, rng: &mut AgentRng) -> Self {
        CitizenDataBuilder::new(id)
            .name(name)
            .stats(Stats::roll_new(level_cap, rng))
            .build()
    }

    #[inline]
    pub fn id(&self) -> CitizenId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, pos: Vec3) {
        self.position = pos;
    }

    // ── Equipment & inventory ─────────────────────────────────────────────

    pub fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut SlotInventory {
        self.dirty = true;
        &mut self.inventory
    }

    pub fn held_slot(&self) -> Option<usize> {
        self.held_slot
    }

    /// Hold the item in `slot`, or nothing.  Out-of-range slots clear the hand.
    pub fn set_held_slot(&mut self, slot: Option<usize>) {
        self.held_slot = slot.filter(|s| *s < self.inventory.slot_count());
    }

    pub fn held_item(&self) -> Option<ItemStack> {
        self.held_slot.and_then(|s| self.inventory.get(s))
    }

    /// Wear the held item.  A broken item is removed from the inventory and
    /// the hand is emptied.  Returns `true` when it broke.
    pub fn damage_held_item(&mut self, amount: u32) -> bool {
        let Some(slot) = self.held_slot else { return false };
        let broke = self.inventory.modify(slot, |s| s.damage_item(amount)).unwrap_or(false);
        if broke {
            // slot is known to be in range
            let _ = self.inventory.set(slot, None);
            self.held_slot = None;
        }
        self.dirty = true;
        broke
    }

    // ── Stats & hunger ────────────────────────────────────────────────────

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut Stats {
        self.dirty = true;
        &mut self.stats
    }

    pub fn try_random_level_up(&mut self, rng: &mut AgentRng, level_cap: u32) {
        if self.stats.try_random_level_up(rng, level_cap, 0).is_some() {
            self.dirty = true;
        }
    }

    #[inline]
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn set_saturation(&mut self, value: f64) {
        self.saturation = value.clamp(0.0, MAX_SATURATION);
        self.dirty = true;
    }

    pub fn increase_saturation(&mut self, amount: f64) {
        self.saturation = (self.saturation + amount.abs()).min(MAX_SATURATION);
        self.dirty = true;
    }

    /// Lose `amount * food_modifier` saturation, never below zero.
    pub fn decrease_saturation(&mut self, amount: f64, food_modifier: f64) {
        self.saturation = (self.saturation - (amount * food_modifier).abs()).max(0.0);
        self.just_ate = false;
        self.dirty = true;
    }

    pub fn just_ate(&self) -> bool {
        self.just_ate
    }

    pub fn set_just_ate(&mut self, value: bool) {
        self.just_ate = value;
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn set_asleep(&mut self, asleep: bool) {
        self.asleep = asleep;
        self.dirty = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.dirty = true;
    }

    // ── Job & experience ──────────────────────────────────────────────────

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn job_mut(&mut self) -> Option<&mut Job> {
        self.dirty = true;
        self.job.as_mut()
    }

    pub fn set_job(&mut self, job: Option<Job>) {
        self.job = job;
        self.dirty = true;
    }

    /// Level in the current job; zero when unemployed.
    pub fn level(&self) -> u32 {
        self.job
            .and_then(|j| self.experience.get(&j.kind))
            .map_or(0, |e| e.level)
    }

    pub fn experience_in(&self, kind: JobKind) -> Experience {
        self.experience.get(&kind).copied().unwrap_or_default()
    }

    /// Credit the current job.  Unemployed citizens gain nothing.  Returns
    /// the levels gained.
    pub fn add_experience(&mut self, xp: f64) -> u32 {
        let Some(job) = self.job else { return 0 };
        self.dirty = true;
        let gained = self.experience.entry(job.kind).or_default().add(xp);
        if gained > 0 {
            tracing::debug!(citizen = %self.id, job = %job.kind, level = self.level(), "level up");
        }
        gained
    }

    // ── Interactions ──────────────────────────────────────────────────────

    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    /// Returns `true` when the interaction was not already pending.
    pub fn trigger_interaction(&mut self, interaction: Interaction) -> bool {
        let added = self.interactions.trigger(interaction);
        self.dirty |= added;
        added
    }

    pub fn dismiss_interaction(&mut self, key: &str) -> bool {
        let removed = self.interactions.dismiss(key).is_some();
        self.dirty |= removed;
        removed
    }

    /// Re-check every pending interaction while the citizen is alive in the
    /// world, removing the ones that no longer apply.
    pub fn tick_interactions(&mut self) -> Vec<String> {
        if self.entity.is_none() || self.interactions.is_empty() {
            return Vec::new();
        }
        let mut interactions = std::mem::take(&mut self.interactions);
        let removed = interactions.retain_valid(self);
        self.interactions = interactions;
        self.dirty |= !removed.is_empty();
        removed
    }

    // ── Live entity link ──────────────────────────────────────────────────

    pub fn entity(&self) -> Option<Handle> {
        self.entity
    }

    pub fn set_entity(&mut self, handle: Option<Handle>) {
        self.entity = handle;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Snapshot for the host's save format.  Interaction checks are code and
    /// are not saved; restored interactions stay until dismissed.
    pub fn serialize(&self) -> CitizenRecord {
        CitizenRecord {
            id:           self.id,
            name:         self.name.clone(),
            position:     self.position,
            held_slot:    self.held_slot,
            stats:        self.stats,
            saturation:   self.saturation,
            inventory:    self.inventory.clone(),
            job:          self.job,
            experience:   self.experience.clone(),
            asleep:       self.asleep,
            paused:       self.paused,
            interactions: self
                .interactions
                .iter()
                .map(|i| InteractionRecord { key: i.key.clone(), args: i.args.clone(), priority: i.priority })
                .collect(),
        }
    }

    pub fn deserialize(record: CitizenRecord) -> AgentResult<Self> {
        if !record.saturation.is_finite() || !(0.0..=MAX_SATURATION).contains(&record.saturation) {
            return Err(AgentError::InvalidRecord(format!("saturation {} out of range", record.saturation)));
        }
        if let Some(slot) = record.held_slot.filter(|s| *s >= record.inventory.slot_count()) {
            return Err(AgentError::InvalidRecord(format!("held slot {slot} out of range")));
        }
        let mut interactions = Interactions::default();
        for i in record.interactions {
            interactions.trigger(Interaction::new(i.key, i.priority).with_args(i.args));
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            position: record.position,
            held_slot: record.held_slot,
            stats: record.stats,
            saturation: record.saturation,
            inventory: record.inventory,
            job: record.job,
            experience: record.experience,
            asleep: record.asleep,
            paused: record.paused,
            just_ate: false,
            interactions,
            entity: None,
            dirty: false,
        })
    }
}

// ── CitizenRecord ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub key:      String,
    #[serde(default)]
    pub args:     Vec<String>,
    pub priority: InteractionPriority,
}

/// Format-neutral saved form of [`CitizenData`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub id:           CitizenId,
    pub name:         String,
    pub position:     Vec3,
    pub held_slot:    Option<usize>,
    pub stats:        Stats,
    pub saturation:   f64,
    pub inventory:    SlotInventory,
    pub job:          Option<Job>,
    #[serde(default)]
    pub experience:   BTreeMap<JobKind, Experience>,
    #[serde(default)]
    pub asleep:       bool,
    #[serde(default)]
    pub paused:       bool,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

// ── CitizenDataBuilder ────────────────────────────────────────────────────────

/// Fluent construction for spawning and tests.
///
/// ```rust
/// use col_agent::{CitizenDataBuilder, Job, JobKind};
/// use col_core::CitizenId;
/// use col_world::{ItemKind, ItemStack};
///
/// let data = CitizenDataBuilder::new(CitizenId(3))
///     .name("Ada")
///     .saturation(4.0)
///     .job(Job::new(JobKind::Sifter, None))
///     .item(ItemStack::new(ItemKind::Bread, 2))
///     .build();
/// assert_eq!(data.saturation(), 4.0);
/// assert_eq!(data.level(), 0);
/// ```
pub struct CitizenDataBuilder {
    id:         CitizenId,
    name:       String,
    position:   Vec3,
    stats:      Stats,
    saturation: f64,
    job:        Option<Job>,
    items:      Vec<ItemStack>,
    held:       Option<usize>,
    asleep:     bool,
    slots:      usize,
}

impl CitizenDataBuilder {
    pub fn new(id: CitizenId) -> Self {
        Self {
            id,
            name:       format!("Citizen {}", id.0),
            position:   Vec3::ZERO,
            stats:      Stats::default(),
            saturation: MAX_SATURATION,
            job:        None,
            items:      Vec::new(),
            held:       None,
            asleep:     false,
            slots:      INVENTORY_SLOTS,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    pub fn job(mut self, job: Job) -> Self {
        self.job = Some(job);
        self
    }

    /// Add a stack to the inventory (placed in order, first fit).
    pub fn item(mut self, stack: ItemStack) -> Self {
        self.items.push(stack);
        self
    }

    pub fn held_slot(mut self, slot: usize) -> Self {
        self.held = Some(slot);
        self
    }

    pub fn asleep(mut self, asleep: bool) -> Self {
        self.asleep = asleep;
        self
    }

    pub fn inventory_slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    pub fn build(self) -> CitizenData {
        let mut inventory = SlotInventory::new(self.slots);
        for stack in self.items {
            if let Some(rest) = col_world::container::insert_anywhere(&mut inventory, stack) {
                tracing::warn!(citizen = %self.id, ?rest, "inventory full while building citizen");
            }
        }
        let mut data = CitizenData {
            id: self.id,
            name: self.name,
            position: self.position,
            held_slot: None,
            stats: self.stats,
            saturation: self.saturation.clamp(0.0, MAX_SATURATION),
            inventory,
            job: self.job,
            experience: BTreeMap::new(),
            asleep: self.asleep,
            paused: false,
            just_ate: false,
            interactions: Interactions::default(),
            entity: None,
            dirty: false,
        };
        data.set_held_slot(self.held);
        data
    }
}
