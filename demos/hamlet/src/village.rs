//! The hamlet: a flat stone plain with a hut, a restaurant, a sifter's hut,
//! a combat academy and a mine cut into a small quarry wall.

use col_core::{BlockPos, BuildingId, Facing};
use col_tasks::{AcademyModule, BuildingKind, Colony, DigOrder, Mesh, MineModule, SifterModule};
use col_world::container;
use col_world::{Block, GridWorld, GridWorldBuilder, ItemKind, ItemStack, Material};

const STONE: Block = Block::Solid(Material::Stone);

/// Blocks the sifter may sift per day.
const SIFTER_DAILY_QUANTITY: u32 = 16;

pub struct Sites {
    pub hut:        BuildingId,
    pub restaurant: BuildingId,
    pub sifter:     BuildingId,
    pub academy:    BuildingId,
    pub mine:       BuildingId,
}

pub fn build_world() -> GridWorld {
    GridWorldBuilder::new(BlockPos::new(-32, -4, -32), BlockPos::new(32, 12, 32))
        .fill(BlockPos::new(-32, 0, -32), BlockPos::new(32, 0, 32), STONE)
        // quarry wall the miner works into
        .fill(BlockPos::new(12, 1, -4), BlockPos::new(16, 4, 4), STONE)
        .fill(BlockPos::new(13, 1, -1), BlockPos::new(13, 2, 1), Block::Solid(Material::CoalOre))
        .ladder(BlockPos::new(11, 1, 4), 3, Facing::West)
        // a road from the hut to the restaurant
        .fill(BlockPos::new(-6, 0, 0), BlockPos::new(6, 0, 0), Block::Path)
        .build()
}

pub fn build_colony(level_cap: u32) -> (Colony, Sites) {
    let mut colony = Colony::new(level_cap);

    let hut = colony.add_building(BlockPos::new(-6, 1, 1), 1, BuildingKind::Hut);
    stock(&mut colony, hut, [ItemStack::new(ItemKind::Bread, 4)]);

    let restaurant = colony.add_building(BlockPos::new(6, 1, 1), 2, BuildingKind::Restaurant);
    stock(
        &mut colony,
        restaurant,
        [ItemStack::new(ItemKind::Bread, 32), ItemStack::new(ItemKind::CookedBeef, 16)],
    );

    let mesh = Mesh::standard(ItemKind::FlintMesh).unwrap_or_default();
    let sifter = colony.add_building(
        BlockPos::new(-4, 1, -10),
        2,
        BuildingKind::Sifter(SifterModule::new(ItemKind::Gravel, mesh, SIFTER_DAILY_QUANTITY)),
    );
    stock(&mut colony, sifter, [ItemStack::new(ItemKind::Gravel, 24)]);

    let dummies = vec![BlockPos::new(-12, 1, 8), BlockPos::new(-12, 1, 12), BlockPos::new(-8, 1, 12)];
    let academy = colony.add_building(BlockPos::new(-10, 1, 10), 2, BuildingKind::Academy(AcademyModule::new(dummies)));

    let plan = (-1..=1).flat_map(|z| {
        [1, 2].map(|y| DigOrder { block: BlockPos::new(12, y, z), stand: BlockPos::new(11, 1, z) })
    });
    let mine = colony.add_building(BlockPos::new(9, 1, 0), 1, BuildingKind::Mine(MineModule::new(plan)));

    (colony, Sites { hut, restaurant, sifter, academy, mine })
}

fn stock(colony: &mut Colony, building: BuildingId, items: impl IntoIterator<Item = ItemStack>) {
    let Some(b) = colony.building_mut(building) else {
        return;
    };
    for stack in items {
        if let Some(rest) = container::insert_anywhere(b.inventory_mut(), stack) {
            tracing::warn!(%building, ?rest, "building container full");
        }
    }
}
