//! In-memory reference world.
//!
//! # Data layout
//!
//! Blocks live in a sparse `FxHashMap<BlockPos, Block>`; absent keys are
//! air.  The loaded region is a single inclusive box fixed at build time.
//!
//! # Spatial index
//!
//! Entities (dropped items, training dummies) are indexed by an R-tree (via
//! `rstar`) over their `[x, y, z]` position so bounding-box queries stay
//! cheap when a miner leaves hundreds of drops behind.  Entity payloads live
//! in a side map keyed by `EntityId`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use rstar::{RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use col_core::{Aabb, BlockPos, EntityId, Facing, Tick, Vec3};

use crate::block::Block;
use crate::item::ItemStack;
use crate::world::{EntityKind, World, WorldEntity};

// ── R-tree entity entry ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct EntityEntry {
    point: [f64; 3],
    id:    EntityId,
}

impl RTreeObject for EntityEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

#[derive(Default)]
struct EntityIndex {
    tree: RTree<EntityEntry>,
    data: FxHashMap<EntityId, WorldEntity>,
}

// ── GridWorld ─────────────────────────────────────────────────────────────────

/// Construct with [`GridWorldBuilder`].
pub struct GridWorld {
    loaded_min:  BlockPos,
    loaded_max:  BlockPos,
    blocks:      RwLock<FxHashMap<BlockPos, Block>>,
    entities:    RwLock<EntityIndex>,
    next_entity: AtomicU64,
    time:        AtomicU64,
}

impl GridWorld {
    pub fn loaded_bounds(&self) -> (BlockPos, BlockPos) {
        (self.loaded_min, self.loaded_max)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().unwrap_or_else(PoisonError::into_inner).data.len()
    }
}

impl World for GridWorld {
    fn block_at(&self, pos: BlockPos) -> Block {
        if !self.is_loaded(pos) {
            return Block::Air;
        }
        let blocks = self.blocks.read().unwrap_or_else(PoisonError::into_inner);
        blocks.get(&pos).copied().unwrap_or_default()
    }

    fn set_block(&self, pos: BlockPos, block: Block) {
        if !self.is_loaded(pos) {
            tracing::warn!(%pos, "set_block outside the loaded region ignored");
            return;
        }
        let mut blocks = self.blocks.write().unwrap_or_else(PoisonError::into_inner);
        if block.is_air() {
            blocks.remove(&pos);
        } else {
            blocks.insert(pos, block);
        }
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        let (lo, hi) = (self.loaded_min, self.loaded_max);
        (lo.x..=hi.x).contains(&pos.x) && (lo.y..=hi.y).contains(&pos.y) && (lo.z..=hi.z).contains(&pos.z)
    }

    fn entities_in_bounds(&self, bounds: &Aabb, kind: EntityKind) -> Vec<WorldEntity> {
        let index = self.entities.read().unwrap_or_else(PoisonError::into_inner);
        let envelope = AABB::from_corners(
            [bounds.min.x, bounds.min.y, bounds.min.z],
            [bounds.max.x, bounds.max.y, bounds.max.z],
        );
        let mut found: Vec<WorldEntity> = index
            .tree
            .locate_in_envelope(&envelope)
            .filter_map(|e| index.data.get(&e.id))
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }

    fn spawn_entity(&self, kind: EntityKind, pos: Vec3, item: Option<ItemStack>) -> EntityId {
        let id = EntityId(self.next_entity.fetch_add(1, Ordering::Relaxed));
        let mut index = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        index.tree.insert(EntityEntry { point: [pos.x, pos.y, pos.z], id });
        index.data.insert(id, WorldEntity { id, kind, pos, item });
        id
    }

    fn remove_entity(&self, id: EntityId) -> Option<WorldEntity> {
        let mut index = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        let entity = index.data.remove(&id)?;
        let p = entity.pos;
        index.tree.remove(&EntityEntry { point: [p.x, p.y, p.z], id });
        Some(entity)
    }

    fn time(&self) -> Tick {
        Tick(self.time.load(Ordering::Acquire))
    }

    fn advance_time(&self) {
        self.time.fetch_add(1, Ordering::AcqRel);
    }
}

// ── GridWorldBuilder ──────────────────────────────────────────────────────────

/// Build a [`GridWorld`] from fills and single-block edits, applied in call
/// order.
///
/// # Example
///
/// ```
/// use col_core::BlockPos;
/// use col_world::{Block, GridWorldBuilder, Material, World};
///
/// let world = GridWorldBuilder::new(BlockPos::new(-8, 0, -8), BlockPos::new(8, 16, 8))
///     .fill(BlockPos::new(-8, 0, -8), BlockPos::new(8, 0, 8), Block::Solid(Material::Stone))
///     .build();
/// assert!(world.block_at(BlockPos::new(3, 0, 3)).is_floor());
/// assert!(world.block_at(BlockPos::new(3, 1, 3)).is_air());
/// ```
pub struct GridWorldBuilder {
    loaded_min: BlockPos,
    loaded_max: BlockPos,
    blocks:     FxHashMap<BlockPos, Block>,
    entities:   Vec<(EntityKind, Vec3, Option<ItemStack>)>,
    start_time: Tick,
}

impl GridWorldBuilder {
    pub fn new(loaded_min: BlockPos, loaded_max: BlockPos) -> Self {
        Self {
            loaded_min: BlockPos::new(
                loaded_min.x.min(loaded_max.x),
                loaded_min.y.min(loaded_max.y),
                loaded_min.z.min(loaded_max.z),
            ),
            loaded_max: BlockPos::new(
                loaded_min.x.max(loaded_max.x),
                loaded_min.y.max(loaded_max.y),
                loaded_min.z.max(loaded_max.z),
            ),
            blocks:     FxHashMap::default(),
            entities:   Vec::new(),
            start_time: Tick::ZERO,
        }
    }

    /// Fill the inclusive box between two corners.
    pub fn fill(mut self, a: BlockPos, b: BlockPos, block: Block) -> Self {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.put(BlockPos::new(x, y, z), block);
                }
            }
        }
        self
    }

    pub fn block(mut self, pos: BlockPos, block: Block) -> Self {
        self.put(pos, block);
        self
    }

    /// Ladder column of `height` blocks starting at `base`.
    pub fn ladder(mut self, base: BlockPos, height: i32, facing: Facing) -> Self {
        for dy in 0..height {
            self.put(base.offset(0, dy, 0), Block::Ladder(facing));
        }
        self
    }

    pub fn entity(mut self, kind: EntityKind, pos: Vec3, item: Option<ItemStack>) -> Self {
        self.entities.push((kind, pos, item));
        self
    }

    pub fn start_time(mut self, tick: Tick) -> Self {
        self.start_time = tick;
        self
    }

    fn put(&mut self, pos: BlockPos, block: Block) {
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    pub fn build(self) -> GridWorld {
        let world = GridWorld {
            loaded_min:  self.loaded_min,
            loaded_max:  self.loaded_max,
            blocks:      RwLock::new(self.blocks),
            entities:    RwLock::new(EntityIndex::default()),
            next_entity: AtomicU64::new(0),
            time:        AtomicU64::new(self.start_time.0),
        };
        for (kind, pos, item) in self.entities {
            world.spawn_entity(kind, pos, item);
        }
        world
    }
}
