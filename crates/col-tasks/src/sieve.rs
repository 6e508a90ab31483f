//! Weighted sifting results per (mesh, block) pair.
//!
//! # CSV format
//!
//! One row per possible result.  `quality` is optional and scales how much
//! the sifter's luck favours the row.
//!
//! ```csv
//! mesh,block,result,count,weight,quality
//! string_mesh,dirt,wheat_seeds,1,40,0
//! string_mesh,dirt,bone,1,10,1
//! flint_mesh,gravel,iron_nugget,1,5,2
//! ```
//!
//! Item names are the snake_case `ItemKind` names.  The effective weight of a
//! row is `max(0, weight + quality * luck)`; a roll can also come up empty
//! when the table sets aside weight for "nothing" with a row whose `count`
//! is zero.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use col_core::AgentRng;
use col_world::{ItemKind, ItemStack};

use crate::{TaskError, TaskResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SieveRecord {
    mesh:    ItemKind,
    block:   ItemKind,
    result:  ItemKind,
    count:   u32,
    weight:  f64,
    #[serde(default)]
    quality: f64,
}

// ── SieveTable ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SieveEntry {
    pub result:  ItemKind,
    /// Zero means "nothing".
    pub count:   u32,
    pub weight:  f64,
    pub quality: f64,
}

impl SieveEntry {
    fn effective_weight(&self, luck: f64) -> f64 {
        (self.weight + self.quality * luck).max(0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SieveTable {
    entries: BTreeMap<(ItemKind, ItemKind), Vec<SieveEntry>>,
}

impl SieveTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: ItemKind, block: ItemKind, entry: SieveEntry) {
        self.entries.entry((mesh, block)).or_default().push(entry);
    }

    pub fn entries(&self, mesh: ItemKind, block: ItemKind) -> &[SieveEntry] {
        self.entries.get(&(mesh, block)).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table from a CSV file.
    pub fn load_csv(path: &Path) -> TaskResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Like [`SieveTable::load_csv`] but accepts any `Read` source.
    pub fn from_reader<R: Read>(reader: R) -> TaskResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut table = Self::new();
        for (line, row) in csv_reader.deserialize::<SieveRecord>().enumerate() {
            let r = row.map_err(|e| TaskError::Parse(e.to_string()))?;
            if !r.mesh.is_mesh() {
                return Err(TaskError::Parse(format!("row {}: {:?} is not a mesh", line + 1, r.mesh)));
            }
            if !(r.weight.is_finite() && r.weight >= 0.0) {
                return Err(TaskError::Parse(format!("row {}: weight {} must be a non-negative number", line + 1, r.weight)));
            }
            table.insert(r.mesh, r.block, SieveEntry {
                result:  r.result,
                count:   r.count,
                weight:  r.weight,
                quality: r.quality,
            });
        }
        Ok(table)
    }

    /// The table a new colony starts with.
    pub fn builtin() -> Self {
        use ItemKind::*;
        // placeholder kind for "nothing" rows; never handed out
        const NONE: ItemKind = Cobblestone;

        let rows: &[(ItemKind, ItemKind, ItemKind, u32, f64, f64)] = &[
            (StringMesh, Dirt, NONE, 0, 50.0, -1.0),
            (StringMesh, Dirt, WheatSeeds, 1, 30.0, 0.0),
            (StringMesh, Dirt, Bone, 1, 10.0, 1.0),
            (StringMesh, Dirt, Clay, 1, 10.0, 1.0),
            (StringMesh, Gravel, NONE, 0, 50.0, -1.0),
            (StringMesh, Gravel, Flint, 1, 40.0, 0.0),
            (StringMesh, Gravel, IronNugget, 1, 10.0, 1.0),
            (StringMesh, Sand, NONE, 0, 60.0, -1.0),
            (StringMesh, Sand, Clay, 1, 40.0, 0.5),
            (StringMesh, SoulSand, NONE, 0, 70.0, -1.0),
            (StringMesh, SoulSand, Bone, 1, 30.0, 0.5),
            (FlintMesh, Dirt, WheatSeeds, 2, 30.0, 0.0),
            (FlintMesh, Dirt, Bone, 1, 20.0, 1.0),
            (FlintMesh, Gravel, Flint, 1, 30.0, 0.0),
            (FlintMesh, Gravel, IronNugget, 1, 20.0, 1.0),
            (FlintMesh, Gravel, Coal, 1, 10.0, 1.0),
            (IronMesh, Gravel, IronNugget, 2, 30.0, 1.0),
            (IronMesh, Gravel, GoldNugget, 1, 10.0, 1.0),
            (IronMesh, Sand, GoldNugget, 1, 20.0, 1.0),
            (DiamondMesh, Gravel, IronOre, 1, 20.0, 1.0),
            (DiamondMesh, Gravel, GoldNugget, 2, 20.0, 2.0),
        ];

        let mut table = Self::new();
        for &(mesh, block, result, count, weight, quality) in rows {
            table.insert(mesh, block, SieveEntry { result, count, weight, quality });
        }
        table
    }

    /// Roll one result.  `None` when nothing is configured for the pair, the
    /// weights are all zero, or the roll lands on a "nothing" row.
    pub fn roll(&self, mesh: ItemKind, block: ItemKind, luck: f64, rng: &mut AgentRng) -> Option<ItemStack> {
        let entries = self.entries(mesh, block);
        let total: f64 = entries.iter().map(|e| e.effective_weight(luck)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut pick = rng.next_f64() * total;
        for e in entries {
            let w = e.effective_weight(luck);
            if pick < w {
                return (e.count > 0).then(|| ItemStack::new(e.result, e.count));
            }
            pick -= w;
        }
        // rounding left us past the end; take the last live row
        entries
            .iter()
            .rev()
            .find(|e| e.effective_weight(luck) > 0.0)
            .filter(|e| e.count > 0)
            .map(|e| ItemStack::new(e.result, e.count))
    }
}
