use std::time::Duration;

use blockworld_common::{BlockPos, SectorKey, TextureDescriptor};
use blockworld_kernel::World;
use blockworld_render::Renderer;
use glam::Vec3;

/// World inspector for developer tooling.
///
/// Read-only queries against the world state for debugging, profiling and
/// the HUD label.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state. Streaming, actor and timing
    /// fields start empty; callers that own them fill them in.
    pub fn summary<R: Renderer>(world: &World<R>) -> WorldSummary {
        WorldSummary {
            blocks: world.block_count(),
            shown: world.shown().len(),
            primitives: world.primitive_count(),
            pending_commands: world.pending().len(),
            sectors: world.sectors().len(),
            loaded_chunks: 0,
            actor: None,
            average_tick: Duration::ZERO,
        }
    }

    /// Details of the block at `pos`, if any.
    pub fn inspect_block<R: Renderer>(world: &World<R>, pos: BlockPos) -> Option<BlockInfo> {
        let texture = world.block_at(pos).ok()?;
        Some(BlockInfo {
            pos,
            texture,
            sector: world.store().sector_of(pos),
            exposed: world.exposed(pos),
            shown: world.is_shown(pos),
        })
    }

    /// Number of blocks per sector, sorted by sector key.
    pub fn sector_histogram<R: Renderer>(
        world: &World<R>,
    ) -> Vec<(SectorKey, usize)> {
        world
            .sectors()
            .iter()
            .map(|(key, bucket)| (*key, bucket.len()))
            .collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSummary {
    pub blocks: usize,
    pub shown: usize,
    pub primitives: usize,
    pub pending_commands: usize,
    pub sectors: usize,
    pub loaded_chunks: usize,
    pub actor: Option<Vec3>,
    pub average_tick: Duration,
}

impl WorldSummary {
    pub fn with_loaded_chunks(mut self, loaded_chunks: usize) -> Self {
        self.loaded_chunks = loaded_chunks;
        self
    }

    pub fn with_actor(mut self, position: Vec3) -> Self {
        self.actor = Some(position);
        self
    }

    pub fn with_average_tick(mut self, average_tick: Duration) -> Self {
        self.average_tick = average_tick;
        self
    }
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: {} / {} shown, primitives={} pending={} sectors={} chunks={}",
            self.shown,
            self.blocks,
            self.primitives,
            self.pending_commands,
            self.sectors,
            self.loaded_chunks
        )?;
        if let Some(p) = self.actor {
            write!(f, " actor=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?;
        }
        if !self.average_tick.is_zero() {
            write!(f, " tick={:?}", self.average_tick)?;
        }
        Ok(())
    }
}

/// Detailed info about a single block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInfo {
    pub pos: BlockPos,
    pub texture: TextureDescriptor,
    pub sector: SectorKey,
    pub exposed: bool,
    pub shown: bool,
}

impl std::fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Block {} in {} exposed={} shown={}",
            self.pos, self.sector, self.exposed, self.shown
        )
    }
}
