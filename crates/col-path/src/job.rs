//! Path jobs and the A* search they run.
//!
//! # Graph
//!
//! Nodes are block positions an entity can occupy: feet and head blocks
//! passable for its capabilities, plus support underneath (a floor block, a
//! ladder it can climb, or water it can swim in).  From each node the search
//! tries, per horizontal direction in `Facing::HORIZONTAL` order: a level
//! step, a one-block jump up, then a drop of up to [`MAX_DROP`] blocks.
//! Ladders and water add straight up/down moves.
//!
//! # Determinism
//!
//! The open set is a binary heap ordered by f-score (`total_cmp`) with the
//! lower `BlockPos` winning ties, and neighbours are generated in a fixed
//! order, so identical world state and inputs always yield the same path.
//!
//! # Cancellation
//!
//! The search checks its [`CancelToken`] once per expansion and returns
//! `PathError::Interrupted` without touching anything outside its own stack.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use col_core::{BlockPos, Facing, Vec3};
use col_world::{Block, World};

use crate::goal::{in_region, Capabilities, PathGoal};
use crate::point::{Path, PathPoint};
use crate::result::PathResult;
use crate::{PathError, PathingResult};

/// Furthest an entity will drop down in one step.
pub const MAX_DROP: i32 = 3;

/// Expansion budget for one search.
pub const DEFAULT_MAX_NODES: usize = 20_000;

const WALK_COST: f64 = 1.0;
const ROAD_COST: f64 = 0.5;
const JUMP_COST: f64 = 0.5;
const DROP_COST_PER_BLOCK: f64 = 0.25;
const LADDER_COST: f64 = 1.5;
const SWIM_COST: f64 = 2.5;
const DOOR_COST: f64 = 0.5;

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Cooperative cancellation flag shared between a future and its search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }
}

// ── PathJob ───────────────────────────────────────────────────────────────────

/// An immutable search request.
///
/// Everything is captured at construction; there are no setters.  The world
/// is shared, not copied, but the job only ever reads it.
pub struct PathJob {
    world:     Arc<dyn World>,
    start:     BlockPos,
    goal:      PathGoal,
    range:     u32,
    caps:      Capabilities,
    max_nodes: usize,
    result:    PathResult,
}

impl PathJob {
    pub fn new(world: Arc<dyn World>, start: BlockPos, goal: PathGoal, range: u32, caps: Capabilities) -> Self {
        Self {
            world,
            start,
            goal,
            range,
            caps,
            max_nodes: DEFAULT_MAX_NODES,
            result: PathResult::new(),
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Handle to this job's shared result.
    pub fn result(&self) -> PathResult {
        self.result.clone()
    }

    pub fn start(&self) -> BlockPos {
        self.start
    }

    pub fn goal(&self) -> &PathGoal {
        &self.goal
    }

    /// Run the search.  `Ok(None)` means the bound was exhausted without
    /// reaching the goal.
    pub fn compute(&self, cancel: &CancelToken) -> PathingResult<Option<Path>> {
        if !self.world.is_loaded(self.start) {
            return Err(PathError::StartNotLoaded(self.start));
        }
        let terrain = Terrain { world: self.world.as_ref(), caps: self.caps };
        let mut search = Search::new(self.start);
        let mut neighbours = Vec::with_capacity(8);

        while let Some(entry) = search.open.pop() {
            if cancel.is_cancelled() {
                return Err(PathError::Interrupted);
            }
            let idx = entry.node;
            if search.nodes[idx].closed || entry.g > search.nodes[idx].g {
                continue;
            }
            search.nodes[idx].closed = true;
            search.expanded += 1;
            if search.expanded > self.max_nodes {
                tracing::debug!(start = %self.start, nodes = self.max_nodes, "path search budget exhausted");
                return Ok(None);
            }

            let pos = search.nodes[idx].pos;
            if let Some(found) = self.goal_reached(&terrain, pos) {
                return Ok(Some(search.reconstruct(idx, &terrain).with_target(found)));
            }

            terrain.neighbours(pos, &mut neighbours);
            for &(next, cost) in &neighbours {
                if self.start.distance_2d(next) > self.range as f64 {
                    continue;
                }
                let g = search.nodes[idx].g + cost;
                let h = self.heuristic(next);
                search.relax(idx, next, g, h);
            }
        }
        Ok(None)
    }

    /// `Some(target)` when `pos` satisfies the goal; the inner value is the
    /// matched block for find-nearest goals.
    fn goal_reached(&self, terrain: &Terrain<'_>, pos: BlockPos) -> Option<Option<BlockPos>> {
        match &self.goal {
            PathGoal::MoveTo { dest } => {
                if pos == *dest || (!terrain.can_stand(*dest) && touches(pos, *dest)) {
                    Some(None)
                } else {
                    None
                }
            }
            PathGoal::MoveAwayFrom { avoid, range } => {
                let r = *range as i64;
                (pos.distance_sq(*avoid) >= r * r).then_some(None)
            }
            PathGoal::FindNearest { region, predicate } => {
                let mut candidates = vec![pos.down()];
                for facing in Facing::HORIZONTAL {
                    let side = pos.step(facing);
                    candidates.push(side);
                    candidates.push(side.down());
                }
                candidates
                    .into_iter()
                    .find(|c| in_region(region, *c) && predicate.matches(terrain.world.block_at(*c)))
                    .map(Some)
            }
        }
    }

    fn heuristic(&self, pos: BlockPos) -> f64 {
        match &self.goal {
            PathGoal::MoveTo { dest } => (pos.distance_sq(*dest) as f64).sqrt() * ROAD_COST,
            PathGoal::MoveAwayFrom { avoid, range } => {
                let d = (pos.distance_sq(*avoid) as f64).sqrt();
                (*range as f64 - d).max(0.0) * ROAD_COST
            }
            PathGoal::FindNearest { .. } => 0.0,
        }
    }
}

/// Adjacent on the grid, including diagonals and one level up or down.
fn touches(a: BlockPos, b: BlockPos) -> bool {
    (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1 && (a.z - b.z).abs() <= 1
}

/// Snap a continuous position to the block the search should start from:
/// the entity's feet block, or the first standable block below it when the
/// entity is mid-air.
pub fn prepare_start(world: &dyn World, pos: Vec3, caps: Capabilities) -> BlockPos {
    let terrain = Terrain { world, caps };
    let mut p = pos.block_pos();
    if terrain.world.block_at(p).blocks_movement() {
        p = p.up();
    }
    for dy in 0..=MAX_DROP {
        let candidate = p.offset(0, -dy, 0);
        if terrain.can_stand(candidate) {
            return candidate;
        }
    }
    p
}

// ── Terrain rules ─────────────────────────────────────────────────────────────

struct Terrain<'w> {
    world: &'w dyn World,
    caps:  Capabilities,
}

impl Terrain<'_> {
    fn passable(&self, block: Block) -> bool {
        match block {
            Block::Air | Block::Ladder(_) => true,
            Block::Water => self.caps.can_swim,
            Block::Door => self.caps.can_open_doors,
            Block::Solid(_) | Block::Path => false,
        }
    }

    fn can_stand(&self, pos: BlockPos) -> bool {
        if !self.world.is_loaded(pos) {
            return false;
        }
        let feet = self.world.block_at(pos);
        if !self.passable(feet) || !self.passable(self.world.block_at(pos.up())) {
            return false;
        }
        match feet {
            Block::Ladder(_) if self.caps.can_climb => true,
            Block::Water => true,
            _ => self.world.block_at(pos.down()).is_floor(),
        }
    }

    fn step_cost(&self, to: BlockPos) -> f64 {
        let feet = self.world.block_at(to);
        let base = if feet.is_liquid() {
            SWIM_COST
        } else if self.world.block_at(to.down()).is_path_block() {
            ROAD_COST
        } else {
            WALK_COST
        };
        if matches!(feet, Block::Door) { base + DOOR_COST } else { base }
    }

    fn neighbours(&self, pos: BlockPos, out: &mut Vec<(BlockPos, f64)>) {
        out.clear();
        let head_clear = self.passable(self.world.block_at(pos.up().up()));

        for facing in Facing::HORIZONTAL {
            let side = pos.step(facing);
            if self.can_stand(side) {
                out.push((side, self.step_cost(side)));
                continue;
            }
            let up = side.up();
            if head_clear && self.can_stand(up) {
                out.push((up, self.step_cost(up) + JUMP_COST));
                continue;
            }
            let open = self.passable(self.world.block_at(side)) && self.passable(self.world.block_at(up));
            if !open {
                continue;
            }
            for dy in 1..=MAX_DROP {
                let below = side.offset(0, -dy, 0);
                if !self.passable(self.world.block_at(below)) {
                    break;
                }
                if self.can_stand(below) {
                    out.push((below, self.step_cost(below) + DROP_COST_PER_BLOCK * dy as f64));
                    break;
                }
            }
        }

        let feet = self.world.block_at(pos);
        let above = pos.up();
        let below = pos.down();
        let below_block = self.world.block_at(below);
        if self.caps.can_climb {
            if feet.ladder_facing().is_some() && self.can_stand(above) {
                out.push((above, LADDER_COST));
            }
            if below_block.ladder_facing().is_some() && self.can_stand(below) {
                out.push((below, LADDER_COST));
            }
        }
        if self.caps.can_swim {
            if feet.is_liquid() && self.can_stand(above) && !out.iter().any(|(p, _)| *p == above) {
                out.push((above, SWIM_COST));
            }
            if below_block.is_liquid() && self.can_stand(below) && !out.iter().any(|(p, _)| *p == below) {
                out.push((below, SWIM_COST));
            }
        }
    }

    fn annotate(&self, pos: BlockPos, next: Option<BlockPos>) -> PathPoint {
        let feet = self.world.block_at(pos);
        let descending = next.is_some_and(|n| n.y < pos.y);
        let ladder = match feet.ladder_facing() {
            Some(_) if descending => Some(Facing::Down),
            Some(facing) => Some(facing),
            None if descending && self.world.block_at(pos.down()).ladder_facing().is_some() => Some(Facing::Down),
            None => None,
        };
        PathPoint { pos, ladder, in_water: feet.is_liquid() }
    }
}

// ── A* bookkeeping ────────────────────────────────────────────────────────────

const NO_PARENT: usize = usize::MAX;

struct Node {
    pos:    BlockPos,
    parent: usize,
    g:      f64,
    closed: bool,
}

struct OpenEntry {
    node: usize,
    pos:  BlockPos,
    f:    f64,
    g:    f64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap pops the greatest, we want the smallest f then pos
        other.f.total_cmp(&self.f).then_with(|| other.pos.cmp(&self.pos))
    }
}

struct Search {
    nodes:    Vec<Node>,
    index:    FxHashMap<BlockPos, usize>,
    open:     BinaryHeap<OpenEntry>,
    expanded: usize,
}

impl Search {
    fn new(start: BlockPos) -> Self {
        let mut s = Self {
            nodes:    Vec::new(),
            index:    FxHashMap::default(),
            open:     BinaryHeap::new(),
            expanded: 0,
        };
        s.nodes.push(Node { pos: start, parent: NO_PARENT, g: 0.0, closed: false });
        s.index.insert(start, 0);
        s.open.push(OpenEntry { node: 0, pos: start, f: 0.0, g: 0.0 });
        s
    }

    fn relax(&mut self, parent: usize, pos: BlockPos, g: f64, h: f64) {
        let idx = match self.index.get(&pos) {
            Some(&i) => {
                let node = &mut self.nodes[i];
                if node.closed || node.g <= g {
                    return;
                }
                node.g = g;
                node.parent = parent;
                i
            }
            None => {
                let i = self.nodes.len();
                self.nodes.push(Node { pos, parent, g, closed: false });
                self.index.insert(pos, i);
                i
            }
        };
        self.open.push(OpenEntry { node: idx, pos, f: g + h, g });
    }

    fn reconstruct(&self, goal: usize, terrain: &Terrain<'_>) -> Path {
        let mut positions = Vec::new();
        let mut cur = goal;
        while cur != NO_PARENT {
            positions.push(self.nodes[cur].pos);
            cur = self.nodes[cur].parent;
        }
        positions.reverse();
        let points = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| terrain.annotate(p, positions.get(i + 1).copied()))
            .collect();
        Path::new(points)
    }
}
