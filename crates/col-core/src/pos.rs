//! Block-grid and continuous coordinates.
//!
//! `BlockPos` addresses one voxel; `Vec3` is an entity position in block
//! units.  A block at `(x, y, z)` spans `[x, x+1) × [y, y+1) × [z, z+1)`, and
//! an entity "standing in" that block has its feet at `y`.

use std::fmt;

// ── BlockPos ──────────────────────────────────────────────────────────────────

/// Integer voxel coordinate.  Orders by `(x, y, z)`, which is the path search
/// tie-break order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    #[inline]
    pub fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    #[inline]
    pub fn step(self, facing: Facing) -> Self {
        let (dx, dy, dz) = facing.delta();
        self.offset(dx, dy, dz)
    }

    /// Squared euclidean distance between block corners.
    #[inline]
    pub fn distance_sq(self, other: BlockPos) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Horizontal (x/z) euclidean distance.
    #[inline]
    pub fn distance_2d(self, other: BlockPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dz * dz).sqrt()
    }

    /// Bottom-center of the block: where an entity standing in it has its feet.
    #[inline]
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }

    #[inline]
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

// ── Vec3 ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Block containing this point (floor on every axis).
    #[inline]
    pub fn block_pos(self) -> BlockPos {
        BlockPos::new(self.x.floor() as i32, self.y.floor() as i32, self.z.floor() as i32)
    }

    #[inline]
    pub fn distance_sq(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn horizontal_distance_sq(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ── Facing ────────────────────────────────────────────────────────────────────

/// One of the six axis directions.  Ladders record the face they are
/// attached to; `Down` marks a descending ladder waypoint.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Facing {
    /// Horizontal faces in search expansion order.
    pub const HORIZONTAL: [Facing; 4] = [Facing::North, Facing::East, Facing::South, Facing::West];

    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Facing::Down  => (0, -1, 0),
            Facing::Up    => (0, 1, 0),
            Facing::North => (0, 0, -1),
            Facing::South => (0, 0, 1),
            Facing::West  => (-1, 0, 0),
            Facing::East  => (1, 0, 0),
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        !matches!(self, Facing::Down | Facing::Up)
    }
}

// ── Aabb ──────────────────────────────────────────────────────────────────────

/// Axis-aligned box in continuous coordinates, inclusive on both ends.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box centred on `center` extending `horizontal` on x/z and `vertical` on y.
    pub fn around(center: Vec3, horizontal: f64, vertical: f64) -> Self {
        Self {
            min: Vec3::new(center.x - horizontal, center.y - vertical, center.z - horizontal),
            max: Vec3::new(center.x + horizontal, center.y + vertical, center.z + horizontal),
        }
    }

    /// Box covering every block between two corners, inclusive.
    pub fn from_blocks(a: BlockPos, b: BlockPos) -> Self {
        let lo = BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let hi = BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        Self {
            min: Vec3::new(lo.x as f64, lo.y as f64, lo.z as f64),
            max: Vec3::new(hi.x as f64 + 1.0, hi.y as f64 + 1.0, hi.z as f64 + 1.0),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    #[inline]
    pub fn contains_block(&self, pos: BlockPos) -> bool {
        self.contains(Vec3::new(pos.x as f64 + 0.5, pos.y as f64 + 0.5, pos.z as f64 + 0.5))
    }
}
