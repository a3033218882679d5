use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use blockworld_common::{BlockPos, SectorKey, TextureDescriptor, WorldConfig};
use blockworld_render::Renderer;
use glam::Vec3;

use crate::error::WorldError;
use crate::queue::CommandQueue;
use crate::store::{BlockStore, RayHit};
use crate::visibility::Visibility;

/// The authoritative block world.
///
/// Owns the block store and the visibility state derived from it. Every
/// mutation goes through `add_block`/`remove_block`, which keep the shown set
/// consistent with exposure for the touched block and its six neighbours.
pub struct World<R: Renderer> {
    store: BlockStore,
    visibility: Visibility<R>,
}

/// Sectors touched by a [`World::change_sectors`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorChange {
    pub shown: Vec<SectorKey>,
    pub hidden: Vec<SectorKey>,
}

impl<R: Renderer> World<R> {
    pub fn new(renderer: R, sector_size: i32, sector_pad: i32) -> Self {
        Self {
            store: BlockStore::new(sector_size),
            visibility: Visibility::new(renderer, sector_pad),
        }
    }

    pub fn with_config(renderer: R, config: &WorldConfig) -> Self {
        Self::new(renderer, config.sector_size, config.sector_pad)
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn sector_size(&self) -> i32 {
        self.store.sector_size()
    }

    pub fn block_count(&self) -> usize {
        self.store.len()
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.store.contains(pos)
    }

    pub fn block_at(&self, pos: BlockPos) -> Result<TextureDescriptor, WorldError> {
        self.store
            .get(pos)
            .copied()
            .ok_or(WorldError::BlockNotFound(pos))
    }

    pub fn sectors(&self) -> &BTreeMap<SectorKey, BTreeSet<BlockPos>> {
        self.store.sectors()
    }

    pub fn is_shown(&self, pos: BlockPos) -> bool {
        self.visibility.is_shown(pos)
    }

    pub fn shown(&self) -> &HashMap<BlockPos, TextureDescriptor> {
        self.visibility.shown()
    }

    pub fn primitive_count(&self) -> usize {
        self.visibility.primitive_count()
    }

    pub fn primitive_positions(&self) -> impl Iterator<Item = &BlockPos> {
        self.visibility.primitive_positions()
    }

    pub fn pending(&self) -> &CommandQueue {
        self.visibility.queue()
    }

    pub fn renderer(&self) -> &R {
        self.visibility.renderer()
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        self.visibility.renderer_mut()
    }

    pub fn exposed(&self, pos: BlockPos) -> bool {
        self.store.exposed(pos)
    }

    pub fn hit_test(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: u32,
        steps_per_block: u32,
    ) -> Option<RayHit> {
        self.store
            .hit_test(origin, direction, max_distance, steps_per_block)
    }

    /// Place a block. An occupied position is cleared first, hiding its old
    /// primitive. When `immediate`, the block and its neighbours are
    /// re-derived and drawn synchronously; otherwise visibility is left to
    /// the caller.
    pub fn add_block(
        &mut self,
        pos: BlockPos,
        texture: TextureDescriptor,
        immediate: bool,
    ) -> Result<(), WorldError> {
        let replaced = self.store.insert(pos, texture);
        if replaced.is_some() && self.visibility.is_shown(pos) {
            // Occupancy is unchanged, so only the replaced block itself needs redrawing.
            self.visibility.hide(pos, immediate)?;
        }
        tracing::trace!(%pos, replaced = replaced.is_some(), "block added");
        if immediate {
            self.reconcile(pos, true)?;
            self.check_neighbors(pos)?;
        }
        Ok(())
    }

    /// Remove a block, hiding it if shown. When `immediate`, neighbours that
    /// became exposed are shown synchronously.
    pub fn remove_block(
        &mut self,
        pos: BlockPos,
        immediate: bool,
    ) -> Result<TextureDescriptor, WorldError> {
        let texture = self
            .store
            .remove(pos)
            .ok_or(WorldError::BlockNotFound(pos))?;
        if self.visibility.is_shown(pos) {
            self.visibility.hide(pos, immediate)?;
        }
        tracing::trace!(%pos, "block removed");
        if immediate {
            self.check_neighbors(pos)?;
        }
        Ok(texture)
    }

    /// Bring each existing face neighbour of `pos` in line with its exposure.
    pub fn check_neighbors(&mut self, pos: BlockPos) -> Result<(), WorldError> {
        for neighbor in pos.neighbors() {
            self.reconcile(neighbor, true)?;
        }
        Ok(())
    }

    /// Show `pos` if it is exposed and hidden, hide it if it is enclosed and
    /// shown. Absent positions are left alone.
    pub fn reconcile(&mut self, pos: BlockPos, immediate: bool) -> Result<(), WorldError> {
        let Some(&texture) = self.store.get(pos) else {
            return Ok(());
        };
        let exposed = self.store.exposed(pos);
        let shown = self.visibility.is_shown(pos);
        if exposed && !shown {
            self.visibility.show(pos, texture, immediate)?;
        } else if !exposed && shown {
            self.visibility.hide(pos, immediate)?;
        }
        Ok(())
    }

    pub fn show_block(&mut self, pos: BlockPos, immediate: bool) -> Result<(), WorldError> {
        let texture = self.block_at(pos)?;
        self.visibility.show(pos, texture, immediate)
    }

    pub fn hide_block(&mut self, pos: BlockPos, immediate: bool) -> Result<(), WorldError> {
        self.visibility.hide(pos, immediate)
    }

    /// Queue every exposed, hidden block of `sector` for display.
    /// Returns how many were queued.
    pub fn show_sector(&mut self, sector: SectorKey) -> Result<usize, WorldError> {
        let Some(bucket) = self.store.sector(sector) else {
            return Ok(0);
        };
        let mut queued = 0;
        for &pos in bucket {
            if self.visibility.is_shown(pos) || !self.store.exposed(pos) {
                continue;
            }
            if let Some(&texture) = self.store.get(pos) {
                self.visibility.show(pos, texture, false)?;
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Queue every shown block of `sector` for removal from display.
    /// Returns how many were queued.
    pub fn hide_sector(&mut self, sector: SectorKey) -> Result<usize, WorldError> {
        let Some(bucket) = self.store.sector(sector) else {
            return Ok(0);
        };
        let mut queued = 0;
        for &pos in bucket {
            if self.visibility.is_shown(pos) {
                self.visibility.hide(pos, false)?;
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Re-tile visibility after the observer moved from sector `before` to
    /// `after`. Sectors in both footprints are left alone.
    pub fn change_sectors(
        &mut self,
        before: Option<SectorKey>,
        after: SectorKey,
    ) -> Result<SectorChange, WorldError> {
        let _span = tracing::debug_span!("change_sectors", ?before, %after).entered();
        let before_set = before
            .map(|b| self.visibility.footprint(b))
            .unwrap_or_default();
        let after_set = self.visibility.footprint(after);

        let change = SectorChange {
            shown: after_set.difference(&before_set).copied().collect(),
            hidden: before_set.difference(&after_set).copied().collect(),
        };
        let mut queued = 0;
        for &sector in &change.shown {
            queued += self.show_sector(sector)?;
        }
        for &sector in &change.hidden {
            queued += self.hide_sector(sector)?;
        }
        tracing::debug!(
            shown = change.shown.len(),
            hidden = change.hidden.len(),
            queued,
            "sectors changed"
        );
        Ok(change)
    }

    /// Run deferred visibility work for at most `budget` of wall-clock time.
    pub fn drain_budgeted(&mut self, budget: Duration) -> usize {
        self.visibility.drain_budgeted(budget)
    }

    /// Run all deferred visibility work.
    pub fn drain_all(&mut self) -> usize {
        self.visibility.drain_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_common::blocks::{BRICK, GRASS};
    use blockworld_render::RecordingRenderer;

    fn world() -> World<RecordingRenderer> {
        World::new(RecordingRenderer::new(), 16, 4)
    }

    fn fill_cube(w: &mut World<RecordingRenderer>) {
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    w.add_block(BlockPos::new(x, y, z), GRASS, true).unwrap();
                }
            }
        }
    }

    fn assert_neighbors_consistent(w: &World<RecordingRenderer>, pos: BlockPos) {
        for n in pos.neighbors() {
            if w.contains(n) {
                assert_eq!(w.is_shown(n), w.exposed(n), "neighbor {n} out of sync");
            }
        }
    }

    #[test]
    fn lone_block_is_shown() {
        let mut w = world();
        w.add_block(BlockPos::new(0, 0, 0), GRASS, true).unwrap();
        assert!(w.is_shown(BlockPos::new(0, 0, 0)));
        assert_eq!(w.renderer().live_count(), 1);
    }

    #[test]
    fn filled_cube_hides_only_the_center() {
        let mut w = world();
        fill_cube(&mut w);

        assert_eq!(w.block_count(), 27);
        assert_eq!(w.shown().len(), 26);
        assert!(!w.is_shown(BlockPos::new(0, 0, 0)));
        assert_eq!(w.renderer().live_count(), 26);
        assert_eq!(w.renderer().count_at(BlockPos::new(0, 0, 0)), 0);
    }

    #[test]
    fn mining_into_cube_exposes_center() {
        let mut w = world();
        fill_cube(&mut w);

        let top = BlockPos::new(0, 1, 0);
        assert_eq!(w.remove_block(top, true).unwrap(), GRASS);
        assert!(!w.contains(top));
        assert!(!w.is_shown(top));
        assert!(w.is_shown(BlockPos::new(0, 0, 0)));
        assert_neighbors_consistent(&w, top);
        assert_eq!(w.renderer().live_count(), w.shown().len());
    }

    #[test]
    fn placing_hides_newly_enclosed_neighbor() {
        let mut w = world();
        fill_cube(&mut w);
        w.remove_block(BlockPos::new(0, 1, 0), true).unwrap();
        assert!(w.is_shown(BlockPos::new(0, 0, 0)));

        w.add_block(BlockPos::new(0, 1, 0), BRICK, true).unwrap();
        assert!(!w.is_shown(BlockPos::new(0, 0, 0)));
        assert_neighbors_consistent(&w, BlockPos::new(0, 1, 0));
    }

    #[test]
    fn add_then_remove_restores_state() {
        let mut w = world();
        fill_cube(&mut w);
        let shown_before = w.shown().clone();
        let sectors_before = w.sectors().clone();
        let blocks_before = w.store().blocks().clone();

        let pos = BlockPos::new(2, 0, 0);
        w.add_block(pos, BRICK, true).unwrap();
        assert!(w.is_shown(pos));
        w.remove_block(pos, true).unwrap();

        assert_eq!(w.shown(), &shown_before);
        assert_eq!(w.sectors(), &sectors_before);
        assert_eq!(w.store().blocks(), &blocks_before);
    }

    #[test]
    fn add_then_remove_across_sector_boundary_restores_index() {
        let mut w = world();
        let pos = BlockPos::new(-17, 3, 40);
        w.add_block(pos, GRASS, true).unwrap();
        assert!(w.sectors()[&SectorKey::new(-2, 2)].contains(&pos));
        w.remove_block(pos, true).unwrap();
        assert!(w.sectors().is_empty());
        assert!(w.shown().is_empty());
    }

    #[test]
    fn remove_missing_block_fails() {
        let mut w = world();
        let err = w.remove_block(BlockPos::new(5, 5, 5), true).unwrap_err();
        assert_eq!(err, WorldError::BlockNotFound(BlockPos::new(5, 5, 5)));
    }

    #[test]
    fn replacing_a_shown_block_redraws_once() {
        let mut w = world();
        let pos = BlockPos::new(0, 0, 0);
        w.add_block(pos, GRASS, true).unwrap();
        w.add_block(pos, BRICK, true).unwrap();

        assert_eq!(w.block_at(pos).unwrap(), BRICK);
        assert_eq!(w.shown()[&pos], BRICK);
        assert_eq!(w.renderer().count_at(pos), 1);
        assert_eq!(w.block_count(), 1);
    }

    #[test]
    fn deferred_replace_redraws_after_drain() {
        let mut w = world();
        let pos = BlockPos::new(0, 0, 0);
        w.add_block(pos, GRASS, true).unwrap();
        w.add_block(pos, BRICK, false).unwrap();
        assert!(!w.is_shown(pos));
        w.show_block(pos, false).unwrap();
        w.drain_all();

        assert_eq!(w.renderer().count_at(pos), 1);
        let live = w.renderer().live().values().next().copied().unwrap();
        assert_eq!(live.texture, BRICK);
    }

    #[test]
    fn deferred_add_leaves_visibility_alone() {
        let mut w = world();
        w.add_block(BlockPos::new(0, 0, 0), GRASS, false).unwrap();
        assert!(!w.is_shown(BlockPos::new(0, 0, 0)));
        assert!(w.pending().is_empty());
    }

    #[test]
    fn show_block_requires_block() {
        let mut w = world();
        let err = w.show_block(BlockPos::new(1, 1, 1), true).unwrap_err();
        assert_eq!(err, WorldError::BlockNotFound(BlockPos::new(1, 1, 1)));
    }

    #[test]
    fn double_hide_is_illegal() {
        let mut w = world();
        let pos = BlockPos::new(0, 0, 0);
        w.add_block(pos, GRASS, true).unwrap();
        w.hide_block(pos, true).unwrap();
        assert!(matches!(
            w.hide_block(pos, true),
            Err(WorldError::IllegalState { .. })
        ));
    }

    #[test]
    fn block_at_reports_missing() {
        let w = world();
        assert_eq!(
            w.block_at(BlockPos::default()),
            Err(WorldError::BlockNotFound(BlockPos::default()))
        );
    }

    #[test]
    fn first_sector_change_shows_everything_in_range() {
        let mut w = world();
        w.add_block(BlockPos::new(0, 0, 0), GRASS, false).unwrap();
        w.add_block(BlockPos::new(64, 0, 0), GRASS, false).unwrap();
        w.add_block(BlockPos::new(200, 0, 0), GRASS, false).unwrap();

        let change = w.change_sectors(None, SectorKey::new(0, 0)).unwrap();
        assert!(change.hidden.is_empty());
        assert!(change.shown.contains(&SectorKey::new(4, 0)));
        assert_eq!(w.drain_all(), 2);
        assert!(w.is_shown(BlockPos::new(0, 0, 0)));
        assert!(w.is_shown(BlockPos::new(64, 0, 0)));
        assert!(!w.is_shown(BlockPos::new(200, 0, 0)));
    }

    #[test]
    fn sector_change_hides_only_what_left_range() {
        let mut w = world();
        let near = BlockPos::new(0, 0, 0);
        let behind = BlockPos::new(-64, 0, 0);
        w.add_block(near, GRASS, false).unwrap();
        w.add_block(behind, GRASS, false).unwrap();
        w.change_sectors(None, SectorKey::new(0, 0)).unwrap();
        w.drain_all();
        let created_before = w.renderer().created();

        let change = w
            .change_sectors(Some(SectorKey::new(0, 0)), SectorKey::new(1, 0))
            .unwrap();
        assert!(change.hidden.contains(&SectorKey::new(-4, 0)));
        assert!(!change.shown.contains(&SectorKey::new(0, 0)));
        w.drain_all();

        assert!(w.is_shown(near));
        assert!(!w.is_shown(behind));
        assert!(w.contains(behind));
        assert_eq!(w.renderer().created(), created_before);
        assert_eq!(w.renderer().live_count(), 1);
    }

    #[test]
    fn show_sector_skips_enclosed_blocks() {
        let mut w = world();
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    w.add_block(BlockPos::new(x, y, z), GRASS, false).unwrap();
                }
            }
        }
        let queued = w.show_sector(SectorKey::new(0, 0)).unwrap()
            + w.show_sector(SectorKey::new(-1, 0)).unwrap()
            + w.show_sector(SectorKey::new(0, -1)).unwrap()
            + w.show_sector(SectorKey::new(-1, -1)).unwrap();
        assert_eq!(queued, 26);
        w.drain_all();
        assert!(!w.is_shown(BlockPos::new(0, 0, 0)));
        assert_eq!(w.renderer().live_count(), 26);
    }

    #[test]
    fn show_sector_queues_in_position_order() {
        let positions = [
            BlockPos::new(9, 0, 2),
            BlockPos::new(0, 4, 0),
            BlockPos::new(3, 0, 11),
            BlockPos::new(0, 0, 7),
            BlockPos::new(14, 2, 0),
        ];
        let queued_order = |order: &[BlockPos]| {
            let mut w = world();
            for &pos in order {
                w.add_block(pos, GRASS, false).unwrap();
            }
            w.show_sector(SectorKey::new(0, 0)).unwrap();
            w.pending().iter().map(|c| c.pos()).collect::<Vec<_>>()
        };

        let mut reversed = positions;
        reversed.reverse();
        let forward = queued_order(&positions);
        assert_eq!(forward, queued_order(&reversed));

        let mut sorted = positions.to_vec();
        sorted.sort();
        assert_eq!(forward, sorted);
    }

    #[test]
    fn hide_sector_queues_destroys() {
        let mut w = world();
        w.add_block(BlockPos::new(1, 0, 1), GRASS, true).unwrap();
        w.add_block(BlockPos::new(1, 5, 1), GRASS, true).unwrap();
        assert_eq!(w.hide_sector(SectorKey::new(0, 0)).unwrap(), 2);
        assert_eq!(w.renderer().live_count(), 2);
        w.drain_all();
        assert_eq!(w.renderer().live_count(), 0);
        assert_eq!(w.hide_sector(SectorKey::new(7, 7)).unwrap(), 0);
    }
}
