//! The colony: buildings, the stat level cap and open item requests.
//!
//! Behaviours receive `&mut Colony` through their task context.  The colony
//! never reaches into citizens; citizens are owned by the simulation.

use std::collections::BTreeMap;

use col_core::{BlockPos, BuildingId, CitizenId};
use col_world::{ItemKind, ItemStack};

use crate::building::{AcademyModule, Building, BuildingKind, MineModule, SifterModule};
use crate::{TaskError, TaskResult};

/// An open request for an item, waiting for someone to deliver it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ItemRequest {
    pub requester: CitizenId,
    pub stack:     ItemStack,
}

#[derive(Clone, Debug)]
pub struct Colony {
    buildings:     BTreeMap<BuildingId, Building>,
    next_building: u32,
    level_cap:     u32,
    requests:      Vec<ItemRequest>,
}

impl Colony {
    pub fn new(level_cap: u32) -> Self {
        Self { buildings: BTreeMap::new(), next_building: 0, level_cap, requests: Vec::new() }
    }

    /// Highest value any citizen skill may reach.
    pub fn level_cap(&self) -> u32 {
        self.level_cap
    }

    pub fn set_level_cap(&mut self, cap: u32) {
        self.level_cap = cap;
    }

    // ── Buildings ─────────────────────────────────────────────────────────

    pub fn add_building(&mut self, pos: BlockPos, level: u32, kind: BuildingKind) -> BuildingId {
        let id = BuildingId(self.next_building);
        self.next_building += 1;
        tracing::debug!(building = %id, kind = kind.label(), %pos, level, "building added");
        self.buildings.insert(id, Building::new(id, pos, level, kind));
        id
    }

    pub fn remove_building(&mut self, id: BuildingId) -> Option<Building> {
        self.buildings.remove(&id)
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    /// Buildings in id order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> + '_ {
        self.buildings.values()
    }

    pub fn require(&self, id: BuildingId) -> TaskResult<&Building> {
        self.buildings.get(&id).ok_or(TaskError::UnknownBuilding(id))
    }

    pub fn require_mut(&mut self, id: BuildingId) -> TaskResult<&mut Building> {
        self.buildings.get_mut(&id).ok_or(TaskError::UnknownBuilding(id))
    }

    pub fn sifter_mut(&mut self, id: BuildingId) -> TaskResult<&mut SifterModule> {
        self.require_mut(id)?
            .sifter_mut()
            .ok_or(TaskError::WrongKind { id, expected: "sifter" })
    }

    pub fn academy_mut(&mut self, id: BuildingId) -> TaskResult<&mut AcademyModule> {
        self.require_mut(id)?
            .academy_mut()
            .ok_or(TaskError::WrongKind { id, expected: "academy" })
    }

    pub fn mine_mut(&mut self, id: BuildingId) -> TaskResult<&mut MineModule> {
        self.require_mut(id)?
            .mine_mut()
            .ok_or(TaskError::WrongKind { id, expected: "mine" })
    }

    /// The restaurant closest to `from`; the lower id wins a tie.
    pub fn best_restaurant(&self, from: BlockPos) -> Option<BuildingId> {
        self.buildings
            .values()
            .filter(|b| b.is_restaurant())
            .min_by_key(|b| b.pos().distance_sq(from))
            .map(Building::id)
    }

    /// A new day: sifters may work again.
    pub fn start_new_day(&mut self) {
        for b in self.buildings.values_mut() {
            if let Some(s) = b.sifter_mut() {
                s.start_new_day();
            }
        }
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// Open a request unless `requester` already waits for the same item.
    /// Returns whether a new request was created.
    pub fn request_item(&mut self, requester: CitizenId, stack: ItemStack) -> bool {
        if self.has_request(requester, stack.kind) {
            return false;
        }
        tracing::debug!(citizen = %requester, item = ?stack.kind, count = stack.count, "item requested");
        self.requests.push(ItemRequest { requester, stack });
        true
    }

    pub fn has_request(&self, requester: CitizenId, kind: ItemKind) -> bool {
        self.requests.iter().any(|r| r.requester == requester && r.stack.kind == kind)
    }

    pub fn requests(&self) -> &[ItemRequest] {
        &self.requests
    }

    /// Close the request, e.g. once the item turned up or was delivered.
    pub fn take_request(&mut self, requester: CitizenId, kind: ItemKind) -> Option<ItemRequest> {
        let i = self.requests.iter().position(|r| r.requester == requester && r.stack.kind == kind)?;
        Some(self.requests.remove(i))
    }

    /// Drop everything `requester` asked for.
    pub fn cancel_requests(&mut self, requester: CitizenId) -> usize {
        let before = self.requests.len();
        self.requests.retain(|r| r.requester != requester);
        before - self.requests.len()
    }

    /// Remove every trace of a citizen that left the colony: its requests,
    /// academy memberships and partner bonds.
    pub fn forget_citizen(&mut self, citizen: CitizenId) {
        let cancelled = self.cancel_requests(citizen);
        for b in self.buildings.values_mut() {
            if let Some(academy) = b.academy_mut() {
                academy.unassign(citizen);
            }
        }
        tracing::debug!(%citizen, cancelled, "citizen removed from colony");
    }
}
