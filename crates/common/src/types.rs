use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Integer address of one unit cube.
///
/// Block `(x, y, z)` spans `[x - 0.5, x + 0.5]` on each axis, so a continuous
/// coordinate maps to its block by rounding (see [`BlockPos::containing`]).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a continuous position. Each axis is rounded
    /// independently, ties to even.
    pub fn containing(position: Vec3) -> Self {
        Self {
            x: position.x.round_ties_even() as i32,
            y: position.y.round_ties_even() as i32,
            z: position.z.round_ties_even() as i32,
        }
    }

    /// The face-adjacent block in direction `face`.
    pub fn neighbor(self, face: Face) -> Self {
        self.offset(face.normal())
    }

    /// All six face-adjacent blocks, in [`Face::ALL`] order.
    pub fn neighbors(self) -> [BlockPos; 6] {
        Face::ALL.map(|face| self.neighbor(face))
    }

    pub fn offset(self, delta: IVec3) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            z: self.z + delta.z,
        }
    }

    /// Center of the block in world space.
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// Sector bucket for this block, for a sector edge of `sector_size`.
    pub fn sector(self, sector_size: i32) -> SectorKey {
        SectorKey::new(
            self.x.div_euclid(sector_size),
            self.z.div_euclid(sector_size),
        )
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<BlockPos> for IVec3 {
    fn from(p: BlockPos) -> Self {
        IVec3::new(p.x, p.y, p.z)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Vertical column of blocks sharing the same floor-divided x and z.
///
/// Sectors never split vertically, so the y component is always 0 and is not stored.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SectorKey {
    pub x: i32,
    pub z: i32,
}

impl SectorKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Sector containing a continuous position.
    pub fn containing(position: Vec3, sector_size: i32) -> Self {
        BlockPos::containing(position).sector(sector_size)
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

impl std::fmt::Display for SectorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sector({}, {})", self.x, self.z)
    }
}

/// One of the six axis-aligned faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Up,
    Down,
    West,
    East,
    South,
    North,
}

impl Face {
    /// Fixed scan order used by exposure checks and collision.
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Down,
        Face::West,
        Face::East,
        Face::South,
        Face::North,
    ];

    pub const fn normal(self) -> IVec3 {
        match self {
            Face::Up => IVec3::new(0, 1, 0),
            Face::Down => IVec3::new(0, -1, 0),
            Face::West => IVec3::new(-1, 0, 0),
            Face::East => IVec3::new(1, 0, 0),
            Face::South => IVec3::new(0, 0, 1),
            Face::North => IVec3::new(0, 0, -1),
        }
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Face::Up | Face::Down)
    }
}
