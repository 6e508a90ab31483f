//! Block states.
//!
//! Only the properties the AI reasons about are modelled: whether a block
//! can be stood on, walked through, climbed or swum, and the hardness and
//! drop used by mining.  Everything else about a block is the host's concern.

use serde::{Deserialize, Serialize};

use col_core::Facing;

use crate::item::{ItemKind, ItemStack, ToolType};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Stone,
    Dirt,
    Grass,
    Gravel,
    Sand,
    Wood,
    Planks,
    CoalOre,
    IronOre,
    Bedrock,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    #[default]
    Air,
    Solid(Material),
    /// Colony road surface.  Walkable floor that grants a speed bonus.
    Path,
    /// Ladder attached to the given face of its support block.
    Ladder(Facing),
    Water,
    Door,
}

impl Block {
    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        matches!(self, Block::Water)
    }

    #[inline]
    pub fn ladder_facing(self) -> Option<Facing> {
        match self {
            Block::Ladder(f) => Some(f),
            _ => None,
        }
    }

    /// A full cube an entity can stand on top of.
    #[inline]
    pub fn is_floor(self) -> bool {
        matches!(self, Block::Solid(_) | Block::Path)
    }

    /// Blocks an entity's body regardless of capabilities.
    #[inline]
    pub fn blocks_movement(self) -> bool {
        self.is_floor()
    }

    #[inline]
    pub fn is_path_block(self) -> bool {
        matches!(self, Block::Path)
    }

    /// Breaking resistance; `None` for unbreakable blocks.
    pub fn hardness(self) -> Option<f64> {
        let h = match self {
            Block::Air | Block::Water => 0.0,
            Block::Solid(Material::Bedrock) => return None,
            Block::Solid(Material::Stone) => 1.5,
            Block::Solid(Material::Dirt) | Block::Solid(Material::Sand) => 0.5,
            Block::Solid(Material::Grass) | Block::Solid(Material::Gravel) => 0.6,
            Block::Solid(Material::Wood) | Block::Solid(Material::Planks) => 2.0,
            Block::Solid(Material::CoalOre) | Block::Solid(Material::IronOre) => 3.0,
            Block::Path => 0.65,
            Block::Ladder(_) => 0.4,
            Block::Door => 3.0,
        };
        Some(h)
    }

    pub fn preferred_tool(self) -> Option<ToolType> {
        match self {
            Block::Solid(Material::Stone | Material::CoalOre | Material::IronOre) => Some(ToolType::Pickaxe),
            Block::Solid(Material::Dirt | Material::Grass | Material::Gravel | Material::Sand) | Block::Path => {
                Some(ToolType::Shovel)
            }
            Block::Solid(Material::Wood | Material::Planks) | Block::Ladder(_) | Block::Door => Some(ToolType::Axe),
            _ => None,
        }
    }

    /// What breaking this block yields.
    pub fn drops(self) -> Option<ItemStack> {
        let kind = match self {
            Block::Solid(Material::Stone) => ItemKind::Cobblestone,
            Block::Solid(Material::Dirt | Material::Grass) | Block::Path => ItemKind::Dirt,
            Block::Solid(Material::Gravel) => ItemKind::Gravel,
            Block::Solid(Material::Sand) => ItemKind::Sand,
            Block::Solid(Material::Wood) => ItemKind::Log,
            Block::Solid(Material::Planks) | Block::Door => ItemKind::Planks,
            Block::Solid(Material::CoalOre) => ItemKind::Coal,
            Block::Solid(Material::IronOre) => ItemKind::IronOre,
            Block::Ladder(_) => ItemKind::Ladder,
            Block::Air | Block::Water | Block::Solid(Material::Bedrock) => return None,
        };
        Some(ItemStack::new(kind, 1))
    }
}
