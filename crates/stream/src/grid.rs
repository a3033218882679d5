use blockworld_common::SectorKey;

/// A chunk coordinate: one `size x size` column footprint of the world grid.
///
/// Chunks share their edge length and origin with visibility sectors, so a
/// chunk and the sector with the same key cover the same columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the world position `(x, z)`. Floors toward negative
    /// infinity, so `-0.5` lands in chunk `-1`.
    pub fn of_position(x: f32, z: f32, size: i32) -> Self {
        let size = size as f32;
        Self {
            x: (x / size).floor() as i32,
            z: (z / size).floor() as i32,
        }
    }

    /// Euclidean distance in chunk units.
    pub fn distance(self, other: ChunkCoord) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Block `(x, z)` of the chunk's minimum corner.
    pub fn origin(self, size: i32) -> (i32, i32) {
        (self.x * size, self.z * size)
    }

    /// Every block column `(x, z)` of the footprint.
    pub fn columns(self, size: i32) -> impl Iterator<Item = (i32, i32)> {
        let (ox, oz) = self.origin(size);
        (0..size).flat_map(move |dx| (0..size).map(move |dz| (ox + dx, oz + dz)))
    }

    pub fn contains_column(self, x: i32, z: i32, size: i32) -> bool {
        x.div_euclid(size) == self.x && z.div_euclid(size) == self.z
    }

    pub fn sector(self) -> SectorKey {
        SectorKey::new(self.x, self.z)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk({}, {})", self.x, self.z)
    }
}

/// Chunks of the disc of `radius` around `center`, nearest rings first.
pub fn chunks_in_radius(center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    let limit = radius * radius;
    let mut result = Vec::new();
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            if dx * dx + dz * dz <= limit {
                result.push(center.offset(dx, dz));
            }
        }
    }
    result.sort_by_key(|c| ((c.x - center.x).pow(2) + (c.z - center.z).pow(2), *c));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_common::BlockPos;

    #[test]
    fn negative_positions_floor() {
        assert_eq!(ChunkCoord::of_position(-0.5, -16.0, 16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::of_position(-16.5, 0.0, 16), ChunkCoord::new(-2, 0));
        assert_eq!(ChunkCoord::of_position(15.9, 16.0, 16), ChunkCoord::new(0, 1));
    }

    #[test]
    fn columns_cover_footprint() {
        let chunk = ChunkCoord::new(-1, 2);
        let columns: Vec<_> = chunk.columns(4).collect();
        assert_eq!(columns.len(), 16);
        assert!(columns.contains(&(-4, 8)));
        assert!(columns.contains(&(-1, 11)));
        assert!(columns.iter().all(|&(x, z)| chunk.contains_column(x, z, 4)));
    }

    #[test]
    fn chunk_and_sector_agree() {
        let chunk = ChunkCoord::new(-3, 5);
        for (x, z) in chunk.columns(16) {
            assert_eq!(BlockPos::new(x, 7, z).sector(16), chunk.sector());
        }
    }

    #[test]
    fn distance_is_euclidean() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.distance(ChunkCoord::new(3, 4)), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn radius_is_a_disc() {
        let around = chunks_in_radius(ChunkCoord::new(2, 2), 1);
        assert_eq!(around.len(), 5);
        assert_eq!(around[0], ChunkCoord::new(2, 2));
        assert!(!around.contains(&ChunkCoord::new(3, 3)));

        let wide = chunks_in_radius(ChunkCoord::new(0, 0), 3);
        assert!(wide.contains(&ChunkCoord::new(3, 0)));
        assert!(!wide.contains(&ChunkCoord::new(3, 1)));
        assert!(wide.iter().all(|c| c.distance(ChunkCoord::new(0, 0)) <= 3.0));
    }
}
