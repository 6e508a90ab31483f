//! Colony buildings.
//!
//! Every building has a position, a level and an item container.  What else
//! it carries depends on its kind: a sifter has a daily quota and a mesh, an
//! academy has dummy targets and partner bonds, a mine has a dig plan.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use col_core::{AgentRng, BlockPos, BuildingId, CitizenId};
use col_world::{ItemKind, SlotInventory};

/// Container size of every building.
pub const BUILDING_SLOTS: usize = 27;

// ── Building ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Building {
    id:        BuildingId,
    pos:       BlockPos,
    level:     u32,
    inventory: SlotInventory,
    kind:      BuildingKind,
}

#[derive(Clone, Debug)]
pub enum BuildingKind {
    /// A worker's plain hut.  Only its container matters here.
    Hut,
    /// Where cooks hand out food.
    Restaurant,
    Sifter(SifterModule),
    Academy(AcademyModule),
    Mine(MineModule),
}

impl BuildingKind {
    pub fn label(&self) -> &'static str {
        match self {
            BuildingKind::Hut => "hut",
            BuildingKind::Restaurant => "restaurant",
            BuildingKind::Sifter(_) => "sifter",
            BuildingKind::Academy(_) => "academy",
            BuildingKind::Mine(_) => "mine",
        }
    }
}

impl Building {
    pub fn new(id: BuildingId, pos: BlockPos, level: u32, kind: BuildingKind) -> Self {
        Self { id, pos, level, inventory: SlotInventory::new(BUILDING_SLOTS), kind }
    }

    #[inline]
    pub fn id(&self) -> BuildingId {
        self.id
    }

    #[inline]
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut SlotInventory {
        &mut self.inventory
    }

    pub fn kind(&self) -> &BuildingKind {
        &self.kind
    }

    pub fn is_restaurant(&self) -> bool {
        matches!(self.kind, BuildingKind::Restaurant)
    }

    pub fn sifter(&self) -> Option<&SifterModule> {
        match &self.kind {
            BuildingKind::Sifter(m) => Some(m),
            _ => None,
        }
    }

    pub fn sifter_mut(&mut self) -> Option<&mut SifterModule> {
        match &mut self.kind {
            BuildingKind::Sifter(m) => Some(m),
            _ => None,
        }
    }

    pub fn academy(&self) -> Option<&AcademyModule> {
        match &self.kind {
            BuildingKind::Academy(m) => Some(m),
            _ => None,
        }
    }

    pub fn academy_mut(&mut self) -> Option<&mut AcademyModule> {
        match &mut self.kind {
            BuildingKind::Academy(m) => Some(m),
            _ => None,
        }
    }

    pub fn mine(&self) -> Option<&MineModule> {
        match &self.kind {
            BuildingKind::Mine(m) => Some(m),
            _ => None,
        }
    }

    pub fn mine_mut(&mut self) -> Option<&mut MineModule> {
        match &mut self.kind {
            BuildingKind::Mine(m) => Some(m),
            _ => None,
        }
    }
}

// ── Sifter ────────────────────────────────────────────────────────────────────

/// A sifter mesh and its per-sift break chance in percent.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Mesh {
    pub kind:         ItemKind,
    pub break_chance: f64,
}

impl Mesh {
    /// What a sifter falls back to when its mesh breaks.
    pub const STRING: Mesh = Mesh { kind: ItemKind::StringMesh, break_chance: 10.0 };

    pub fn new(kind: ItemKind, break_chance: f64) -> Self {
        Self { kind, break_chance }
    }

    /// Shipped break chances for each mesh.
    pub fn standard(kind: ItemKind) -> Option<Self> {
        let chance = match kind {
            ItemKind::StringMesh => 10.0,
            ItemKind::FlintMesh => 5.0,
            ItemKind::IronMesh => 2.0,
            ItemKind::DiamondMesh => 1.0,
            _ => return None,
        };
        Some(Self::new(kind, chance))
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::STRING
    }
}

#[derive(Clone, Debug)]
pub struct SifterModule {
    pub daily_quantity:         u32,
    pub current_daily_quantity: u32,
    pub mesh:                   Mesh,
    /// The block the owner configured to be sifted.
    pub sievable:               ItemKind,
}

impl SifterModule {
    pub fn new(sievable: ItemKind, mesh: Mesh, daily_quantity: u32) -> Self {
        Self { daily_quantity, current_daily_quantity: 0, mesh, sievable }
    }

    pub fn quota_reached(&self) -> bool {
        self.current_daily_quantity >= self.daily_quantity
    }

    /// Units that may still be sifted today.
    pub fn remaining_today(&self) -> u32 {
        self.daily_quantity.saturating_sub(self.current_daily_quantity)
    }

    pub fn reset_mesh(&mut self) {
        self.mesh = Mesh::STRING;
    }

    pub fn start_new_day(&mut self) {
        self.current_daily_quantity = 0;
    }
}

// ── Combat academy ────────────────────────────────────────────────────────────

/// Training dummies and the sparring bonds between the academy's knights.
/// Bonds are always symmetric.
#[derive(Clone, Debug, Default)]
pub struct AcademyModule {
    targets: Vec<BlockPos>,
    workers: BTreeSet<CitizenId>,
    bonds:   BTreeMap<CitizenId, CitizenId>,
}

impl AcademyModule {
    pub fn new(targets: Vec<BlockPos>) -> Self {
        Self { targets, ..Self::default() }
    }

    pub fn targets(&self) -> &[BlockPos] {
        &self.targets
    }

    pub fn add_target(&mut self, pos: BlockPos) {
        self.targets.push(pos);
    }

    pub fn assign(&mut self, citizen: CitizenId) {
        self.workers.insert(citizen);
    }

    /// Removes the citizen and breaks its bond.
    pub fn unassign(&mut self, citizen: CitizenId) {
        self.workers.remove(&citizen);
        self.reset_partner(citizen);
    }

    pub fn random_target(&self, rng: &mut AgentRng) -> Option<BlockPos> {
        rng.choose(&self.targets).copied()
    }

    pub fn partner_of(&self, citizen: CitizenId) -> Option<CitizenId> {
        self.bonds.get(&citizen).copied()
    }

    pub fn has_partner(&self, citizen: CitizenId) -> bool {
        self.bonds.contains_key(&citizen)
    }

    /// Bond `citizen` to a random unbonded co-worker accepted by `available`.
    pub fn random_partner(
        &mut self,
        citizen: CitizenId,
        rng: &mut AgentRng,
        available: impl Fn(CitizenId) -> bool,
    ) -> Option<CitizenId> {
        if let Some(p) = self.partner_of(citizen) {
            return Some(p);
        }
        let candidates: Vec<CitizenId> = self
            .workers
            .iter()
            .copied()
            .filter(|&c| c != citizen && !self.bonds.contains_key(&c) && available(c))
            .collect();
        let partner = *rng.choose(&candidates)?;
        self.bonds.insert(citizen, partner);
        self.bonds.insert(partner, citizen);
        Some(partner)
    }

    /// Break the bond on both sides.
    pub fn reset_partner(&mut self, citizen: CitizenId) {
        if let Some(p) = self.bonds.remove(&citizen) {
            self.bonds.remove(&p);
        }
    }
}

// ── Mine ──────────────────────────────────────────────────────────────────────

/// One block to break and where to stand while breaking it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DigOrder {
    pub block: BlockPos,
    pub stand: BlockPos,
}

#[derive(Clone, Debug, Default)]
pub struct MineModule {
    plan: VecDeque<DigOrder>,
    dug:  u32,
}

impl MineModule {
    pub fn new(plan: impl IntoIterator<Item = DigOrder>) -> Self {
        Self { plan: plan.into_iter().collect(), dug: 0 }
    }

    pub fn next_order(&self) -> Option<DigOrder> {
        self.plan.front().copied()
    }

    /// Drop the front order once its block is gone.
    pub fn complete(&mut self, order: DigOrder) {
        if self.plan.front() == Some(&order) {
            self.plan.pop_front();
            self.dug += 1;
        }
    }

    pub fn remaining(&self) -> usize {
        self.plan.len()
    }

    pub fn blocks_dug(&self) -> u32 {
        self.dug
    }
}
