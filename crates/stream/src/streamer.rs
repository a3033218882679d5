use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use blockworld_common::blocks::GRASS;
use blockworld_common::{BlockPos, TextureDescriptor, WorldConfig};
use blockworld_kernel::{World, WorldError};
use blockworld_render::Renderer;

use crate::grid::{ChunkCoord, chunks_in_radius};
use crate::height::HeightField;

/// Errors from chunk streaming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("{0} is not loaded")]
    ChunkNotLoaded(ChunkCoord),
    #[error("world error: {0}")]
    World(#[from] WorldError),
}

/// Streaming parameters, lifted out of [`WorldConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Chunk edge length in blocks. Matches the world's sector size.
    pub chunk_size: i32,
    pub max_build_height: i32,
    /// Chunks farther than this from the observer's chunk are unloaded.
    pub render_radius: i32,
    /// Unloading removes blocks with `0 <= y < unload_height` only.
    pub unload_height: i32,
    /// Block that terrain columns are filled with.
    pub fill: TextureDescriptor,
}

impl StreamConfig {
    pub fn from_world_config(config: &WorldConfig) -> Self {
        Self {
            chunk_size: config.sector_size,
            max_build_height: config.max_build_height,
            render_radius: config.render_radius,
            unload_height: config.unload_height,
            fill: GRASS,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::from_world_config(&WorldConfig::default())
    }
}

/// Statistics from the last `check_chunks` pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub chunks_loaded: usize,
    pub chunks_unloaded: usize,
    pub blocks_added: usize,
    pub blocks_removed: usize,
    pub total_loaded_chunks: usize,
    pub elapsed: Duration,
}

/// Loads terrain chunks around the observer and unloads those that fall out
/// of range.
///
/// Loading adds blocks without drawing them and then queues display of the
/// exposed ones, so the work reaches the renderer through the world's
/// budgeted queue. Unloading is immediate and bounded by `unload_height`.
pub struct ChunkStreamer<H> {
    config: StreamConfig,
    height_field: H,
    loaded: BTreeSet<ChunkCoord>,
    stats: StreamStats,
}

impl<H: HeightField> ChunkStreamer<H> {
    pub fn new(config: StreamConfig, height_field: H) -> Self {
        assert!(config.chunk_size > 0, "chunk_size must be positive");
        Self {
            config,
            height_field,
            loaded: BTreeSet::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn height_field(&self) -> &H {
        &self.height_field
    }

    pub fn loaded_chunks(&self) -> &BTreeSet<ChunkCoord> {
        &self.loaded
    }

    pub fn is_loaded(&self, chunk: ChunkCoord) -> bool {
        self.loaded.contains(&chunk)
    }

    /// Statistics from the last `check_chunks` pass.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Chunk containing the world position `(x, z)`.
    pub fn chunk_of(&self, x: f32, z: f32) -> ChunkCoord {
        ChunkCoord::of_position(x, z, self.config.chunk_size)
    }

    /// Terrain height of column `(x, z)`, clamped to `[1, max_build_height]`.
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        let raw = self.height_field.height(x as f64, z as f64);
        let max = self.config.max_build_height.max(1) as f64;
        if raw > max || raw < 1.0 || raw.is_nan() {
            tracing::trace!(x, z, raw, "column height out of bounds, clamped");
        }
        if raw.is_nan() {
            return 1;
        }
        raw.clamp(1.0, max) as i32
    }

    /// Generate and register `chunk`. Returns the number of blocks added;
    /// zero if it was already loaded.
    pub fn load_chunk<R: Renderer>(
        &mut self,
        world: &mut World<R>,
        chunk: ChunkCoord,
    ) -> Result<usize, StreamError> {
        if self.loaded.contains(&chunk) {
            return Ok(0);
        }
        let size = self.config.chunk_size;
        let mut added = Vec::new();
        for (x, z) in chunk.columns(size) {
            for y in 0..self.column_height(x, z) {
                let pos = BlockPos::new(x, y, z);
                world.add_block(pos, self.config.fill, false)?;
                added.push(pos);
            }
        }

        for &pos in &added {
            world.reconcile(pos, false)?;
            // Blocks of neighbouring chunks may have just been covered.
            for neighbor in pos.neighbors() {
                if !chunk.contains_column(neighbor.x, neighbor.z, size) {
                    world.reconcile(neighbor, false)?;
                }
            }
        }

        self.loaded.insert(chunk);
        tracing::debug!(%chunk, blocks = added.len(), "chunk loaded");
        Ok(added.len())
    }

    /// Remove the lower part of `chunk` and unregister it. Returns the number
    /// of blocks removed.
    pub fn unload_chunk<R: Renderer>(
        &mut self,
        world: &mut World<R>,
        chunk: ChunkCoord,
    ) -> Result<usize, StreamError> {
        if !self.loaded.contains(&chunk) {
            return Err(StreamError::ChunkNotLoaded(chunk));
        }
        let mut removed = 0;
        for (x, z) in chunk.columns(self.config.chunk_size) {
            for y in 0..self.config.unload_height {
                let pos = BlockPos::new(x, y, z);
                if world.contains(pos) {
                    world.remove_block(pos, true)?;
                    removed += 1;
                }
            }
        }
        self.loaded.remove(&chunk);
        tracing::debug!(%chunk, blocks = removed, "chunk unloaded");
        Ok(removed)
    }

    /// Unload chunks out of range of the observer at `(x, z)`, then load the
    /// missing chunks within range.
    pub fn check_chunks<R: Renderer>(
        &mut self,
        world: &mut World<R>,
        x: f32,
        z: f32,
    ) -> Result<StreamStats, StreamError> {
        let _span = tracing::info_span!("check_chunks").entered();
        let start = Instant::now();
        let center = self.chunk_of(x, z);
        let radius = self.config.render_radius;
        let mut stats = StreamStats::default();

        let stale: Vec<ChunkCoord> = self
            .loaded
            .iter()
            .filter(|c| c.distance(center) > radius as f32)
            .copied()
            .collect();
        for chunk in stale {
            stats.blocks_removed += self.unload_chunk(world, chunk)?;
            stats.chunks_unloaded += 1;
        }

        for chunk in chunks_in_radius(center, radius) {
            if self.loaded.contains(&chunk) {
                continue;
            }
            stats.blocks_added += self.load_chunk(world, chunk)?;
            stats.chunks_loaded += 1;
        }

        stats.total_loaded_chunks = self.loaded.len();
        stats.elapsed = start.elapsed();
        tracing::debug!(
            %center,
            loaded = stats.chunks_loaded,
            unloaded = stats.chunks_unloaded,
            total = stats.total_loaded_chunks,
            "check_chunks complete"
        );
        self.stats = stats.clone();
        Ok(stats)
    }
}
