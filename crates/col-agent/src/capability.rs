//! Capability traits behaviours are written against.
//!
//! A behaviour that only moves items asks for `InventoryOwning`; one that
//! levels the worker asks for `Experienceable`.  Movement lives in
//! `col-behavior` next to the navigator contract.

use col_world::container;
use col_world::{ItemStack, SlotInventory};

use crate::CitizenData;

pub trait InventoryOwning {
    fn inventory(&self) -> &SlotInventory;

    fn inventory_mut(&mut self) -> &mut SlotInventory;

    fn held_item(&self) -> Option<ItemStack>;

    fn has_item(&self, pred: &dyn Fn(&ItemStack) -> bool) -> bool {
        container::has_matching(self.inventory(), pred)
    }

    fn is_inventory_full(&self) -> bool {
        container::is_full(self.inventory())
    }
}

pub trait Experienceable {
    fn level(&self) -> u32;

    /// Returns the levels gained.
    fn add_experience(&mut self, xp: f64) -> u32;
}

impl InventoryOwning for CitizenData {
    fn inventory(&self) -> &SlotInventory {
        CitizenData::inventory(self)
    }

    fn inventory_mut(&mut self) -> &mut SlotInventory {
        CitizenData::inventory_mut(self)
    }

    fn held_item(&self) -> Option<ItemStack> {
        CitizenData::held_item(self)
    }
}

impl Experienceable for CitizenData {
    fn level(&self) -> u32 {
        CitizenData::level(self)
    }

    fn add_experience(&mut self, xp: f64) -> u32 {
        CitizenData::add_experience(self, xp)
    }
}
