use std::collections::{BTreeMap, BTreeSet, HashMap};

use blockworld_common::{BlockPos, SectorKey, TextureDescriptor};
use glam::Vec3;

/// The authoritative block map plus its sector index.
///
/// A position is in `blocks` iff a solid block occupies it, and then it is in
/// exactly one sector bucket: the one for `pos.sector(sector_size)`. Empty
/// buckets are dropped so the index holds no stale keys. The index is ordered
/// so sector-wide passes enqueue work in the same order on every run.
#[derive(Debug, Clone)]
pub struct BlockStore {
    sector_size: i32,
    blocks: HashMap<BlockPos, TextureDescriptor>,
    sectors: BTreeMap<SectorKey, BTreeSet<BlockPos>>,
}

/// Result of a successful hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// First occupied block along the ray.
    pub block: BlockPos,
    /// Last empty block before it. `None` when the ray starts inside `block`.
    pub previous: Option<BlockPos>,
}

impl BlockStore {
    pub fn new(sector_size: i32) -> Self {
        assert!(sector_size > 0, "sector_size must be positive");
        Self {
            sector_size,
            blocks: HashMap::new(),
            sectors: BTreeMap::new(),
        }
    }

    pub fn sector_size(&self) -> i32 {
        self.sector_size
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.blocks.contains_key(&pos)
    }

    pub fn get(&self, pos: BlockPos) -> Option<&TextureDescriptor> {
        self.blocks.get(&pos)
    }

    /// Read-only access to every block.
    pub fn blocks(&self) -> &HashMap<BlockPos, TextureDescriptor> {
        &self.blocks
    }

    /// Read-only access to the sector index.
    pub fn sectors(&self) -> &BTreeMap<SectorKey, BTreeSet<BlockPos>> {
        &self.sectors
    }

    /// Positions in one sector bucket, if it holds any block.
    pub fn sector(&self, key: SectorKey) -> Option<&BTreeSet<BlockPos>> {
        self.sectors.get(&key)
    }

    pub fn sector_of(&self, pos: BlockPos) -> SectorKey {
        pos.sector(self.sector_size)
    }

    /// Store a block. Returns the texture it replaced, if any.
    pub fn insert(&mut self, pos: BlockPos, texture: TextureDescriptor) -> Option<TextureDescriptor> {
        let previous = self.blocks.insert(pos, texture);
        if previous.is_none() {
            self.sectors
                .entry(pos.sector(self.sector_size))
                .or_default()
                .insert(pos);
        }
        previous
    }

    /// Drop a block and its index entry. Returns its texture if it existed.
    pub fn remove(&mut self, pos: BlockPos) -> Option<TextureDescriptor> {
        let texture = self.blocks.remove(&pos)?;
        let key = pos.sector(self.sector_size);
        if let Some(bucket) = self.sectors.get_mut(&key) {
            bucket.remove(&pos);
            if bucket.is_empty() {
                self.sectors.remove(&key);
            }
        }
        Some(texture)
    }

    /// True iff at least one face neighbour of `pos` is empty.
    ///
    /// Strictly local: six lookups regardless of world size.
    pub fn exposed(&self, pos: BlockPos) -> bool {
        pos.neighbors().iter().any(|n| !self.blocks.contains_key(n))
    }

    /// March along a ray in `1 / steps_per_block` increments and return the
    /// first occupied block within `max_distance` blocks.
    pub fn hit_test(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: u32,
        steps_per_block: u32,
    ) -> Option<RayHit> {
        let step = direction / steps_per_block as f32;
        let mut point = origin;
        let mut previous = None;
        for _ in 0..max_distance.saturating_mul(steps_per_block) {
            let key = BlockPos::containing(point);
            if previous != Some(key) && self.blocks.contains_key(&key) {
                return Some(RayHit {
                    block: key,
                    previous,
                });
            }
            previous = Some(key);
            point += step;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_common::blocks::{BRICK, GRASS};

    #[test]
    fn insert_indexes_by_sector() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::new(3, 40, -2), GRASS);

        assert!(store.contains(BlockPos::new(3, 40, -2)));
        let bucket = store.sector(SectorKey::new(0, -1)).unwrap();
        assert!(bucket.contains(&BlockPos::new(3, 40, -2)));
        assert_eq!(store.sectors().len(), 1);
    }

    #[test]
    fn replacing_keeps_single_index_entry() {
        let mut store = BlockStore::new(16);
        let pos = BlockPos::new(1, 1, 1);
        assert_eq!(store.insert(pos, GRASS), None);
        assert_eq!(store.insert(pos, BRICK), Some(GRASS));
        assert_eq!(store.len(), 1);
        assert_eq!(store.sector(SectorKey::new(0, 0)).unwrap().len(), 1);
        assert_eq!(store.get(pos), Some(&BRICK));
    }

    #[test]
    fn remove_drops_empty_bucket() {
        let mut store = BlockStore::new(16);
        let pos = BlockPos::new(-1, 0, 0);
        store.insert(pos, GRASS);
        assert_eq!(store.remove(pos), Some(GRASS));
        assert!(store.is_empty());
        assert!(store.sectors().is_empty());
        assert_eq!(store.remove(pos), None);
    }

    #[test]
    fn lone_block_is_exposed() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::default(), GRASS);
        assert!(store.exposed(BlockPos::default()));
    }

    #[test]
    fn enclosed_block_is_not_exposed() {
        let mut store = BlockStore::new(16);
        let center = BlockPos::default();
        store.insert(center, GRASS);
        for n in center.neighbors() {
            store.insert(n, GRASS);
        }
        assert!(!store.exposed(center));

        store.remove(center.neighbors()[4]);
        assert!(store.exposed(center));
    }

    #[test]
    fn hit_test_straight_down() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::new(0, 0, 0), GRASS);

        let hit = store
            .hit_test(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 8, 8)
            .unwrap();
        assert_eq!(hit.block, BlockPos::new(0, 0, 0));
        assert_eq!(hit.previous, Some(BlockPos::new(0, 1, 0)));
    }

    #[test]
    fn hit_test_out_of_reach() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::new(0, 0, 0), GRASS);

        let miss = store.hit_test(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 8, 8);
        assert_eq!(miss, None);
    }

    #[test]
    fn hit_test_from_inside_block_has_no_previous() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::new(2, 2, 2), GRASS);

        let hit = store
            .hit_test(Vec3::new(2.1, 2.0, 2.0), Vec3::X, 8, 8)
            .unwrap();
        assert_eq!(hit.block, BlockPos::new(2, 2, 2));
        assert_eq!(hit.previous, None);
    }

    #[test]
    fn hit_test_with_unbounded_reach_still_hits() {
        let mut store = BlockStore::new(16);
        store.insert(BlockPos::new(0, 0, 0), GRASS);

        let hit = store
            .hit_test(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, u32::MAX, 8)
            .unwrap();
        assert_eq!(hit.block, BlockPos::new(0, 0, 0));
    }

    #[test]
    #[should_panic(expected = "sector_size must be positive")]
    fn zero_sector_size_panics() {
        let _ = BlockStore::new(0);
    }
}
