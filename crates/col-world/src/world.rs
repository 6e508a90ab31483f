//! The world facade.
//!
//! Path jobs read it from worker threads while the simulation thread mutates
//! it, so every method takes `&self` and implementations synchronise
//! internally.  Reads are expected to vastly outnumber writes.

use col_core::{Aabb, BlockPos, EntityId, Tick, Vec3};

use crate::block::Block;
use crate::item::ItemStack;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    /// A dropped item stack lying on the ground.
    Item,
    /// A static combat training target.
    TrainingDummy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldEntity {
    pub id:   EntityId,
    pub kind: EntityKind,
    pub pos:  Vec3,
    /// Present for `EntityKind::Item`.
    pub item: Option<ItemStack>,
}

pub trait World: Send + Sync {
    /// Block at `pos`.  Unloaded positions read as air.
    fn block_at(&self, pos: BlockPos) -> Block;

    fn set_block(&self, pos: BlockPos, block: Block);

    fn is_loaded(&self, pos: BlockPos) -> bool;

    /// Entities of `kind` whose position lies inside `bounds`, ordered by id.
    fn entities_in_bounds(&self, bounds: &Aabb, kind: EntityKind) -> Vec<WorldEntity>;

    fn spawn_entity(&self, kind: EntityKind, pos: Vec3, item: Option<ItemStack>) -> EntityId;

    fn remove_entity(&self, id: EntityId) -> Option<WorldEntity>;

    fn time(&self) -> Tick;

    fn advance_time(&self);

    /// Drop an item stack into the world.
    fn spawn_item(&self, pos: Vec3, stack: ItemStack) -> EntityId {
        self.spawn_entity(EntityKind::Item, pos, Some(stack))
    }
}
