//! Item kinds and stacks.
//!
//! `ItemKind` is a closed registry of the items the citizen AI handles.
//! Names serialise as snake_case so sieve tables and save records can refer
//! to them by string.

use serde::{Deserialize, Serialize};

use crate::block::Block;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Sword,
    Shield,
    Pickaxe,
    Shovel,
    Axe,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    // food
    Bread,
    Apple,
    BakedPotato,
    CookedBeef,
    CookedFish,
    RawBeef,
    RawFish,
    Potato,
    // equipment
    WoodenSword,
    IronSword,
    Shield,
    WoodenPickaxe,
    IronPickaxe,
    IronShovel,
    IronAxe,
    // sievable blocks
    Dirt,
    Gravel,
    Sand,
    SoulSand,
    // sifter meshes
    StringMesh,
    FlintMesh,
    IronMesh,
    DiamondMesh,
    // materials and sieve results
    Cobblestone,
    Log,
    Planks,
    Ladder,
    Coal,
    IronOre,
    Flint,
    IronNugget,
    GoldNugget,
    Bone,
    WheatSeeds,
    Clay,
}

impl ItemKind {
    /// Saturation restored by eating one; `None` if inedible.
    pub fn heal_amount(self) -> Option<f64> {
        let v = match self {
            ItemKind::Bread | ItemKind::BakedPotato | ItemKind::CookedFish => 5.0,
            ItemKind::Apple => 4.0,
            ItemKind::CookedBeef => 8.0,
            ItemKind::RawBeef => 3.0,
            ItemKind::RawFish => 2.0,
            ItemKind::Potato => 1.0,
            _ => return None,
        };
        Some(v)
    }

    #[inline]
    pub fn is_food(self) -> bool {
        self.heal_amount().is_some()
    }

    /// Edible, but a cook would turn it into something better.
    #[inline]
    pub fn is_cookable(self) -> bool {
        matches!(self, ItemKind::RawBeef | ItemKind::RawFish | ItemKind::Potato)
    }

    pub fn tool_type(self) -> Option<ToolType> {
        match self {
            ItemKind::WoodenSword | ItemKind::IronSword => Some(ToolType::Sword),
            ItemKind::Shield => Some(ToolType::Shield),
            ItemKind::WoodenPickaxe | ItemKind::IronPickaxe => Some(ToolType::Pickaxe),
            ItemKind::IronShovel => Some(ToolType::Shovel),
            ItemKind::IronAxe => Some(ToolType::Axe),
            _ => None,
        }
    }

    pub fn is_mesh(self) -> bool {
        matches!(self, ItemKind::StringMesh | ItemKind::FlintMesh | ItemKind::IronMesh | ItemKind::DiamondMesh)
    }

    /// Durability of a fresh item; zero for items that never wear.
    pub fn max_damage(self) -> u32 {
        match self {
            ItemKind::WoodenSword | ItemKind::WoodenPickaxe => 59,
            ItemKind::IronSword | ItemKind::IronPickaxe | ItemKind::IronShovel | ItemKind::IronAxe => 250,
            ItemKind::Shield => 336,
            _ => 0,
        }
    }

    pub fn max_stack(self) -> u32 {
        if self.tool_type().is_some() || self.is_mesh() { 1 } else { 64 }
    }

    /// Block-breaking speed multiplier of this item used as a tool on `block`.
    pub fn destroy_speed(self, block: Block) -> f64 {
        match (self.tool_type(), block.preferred_tool()) {
            (Some(have), Some(want)) if have == want => match self {
                ItemKind::WoodenPickaxe => 2.0,
                _ => 6.0,
            },
            _ => 1.0,
        }
    }
}

// ── ItemStack ─────────────────────────────────────────────────────────────────

/// A non-empty stack of one item kind.  Empty slots are `None` in containers.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind:   ItemKind,
    pub count:  u32,
    /// Accumulated wear; the item breaks when this reaches `max_damage`.
    #[serde(default)]
    pub damage: u32,
}

impl ItemStack {
    pub fn new(kind: ItemKind, count: u32) -> Self {
        Self { kind, count, damage: 0 }
    }

    #[inline]
    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    /// Two stacks can share a slot.
    #[inline]
    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.kind == other.kind
            && self.kind.max_stack() > 1
            && self.damage == 0
            && other.damage == 0
    }

    /// Apply wear.  Returns `true` when the item broke.
    pub fn damage_item(&mut self, amount: u32) -> bool {
        let max = self.kind.max_damage();
        if max == 0 {
            return false;
        }
        self.damage = self.damage.saturating_add(amount);
        self.damage >= max
    }
}
