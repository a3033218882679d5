//! Streaming: chunk coordinates, terrain height fields and the chunk streamer.
//!
//! # Invariants
//! - A chunk is loaded at most once; `load_chunk` on a loaded chunk is a no-op.
//! - Unloading runs before loading in every `check_chunks` pass.
//! - Loading never draws directly; display work goes through the world's queue.
//!
//! # Workaround
//! Generation is synchronous on the tick thread. Unloading only clears the
//! lowest `unload_height` layers of a chunk, so tall columns leave their tops
//! behind.

mod grid;
mod height;
mod streamer;

pub use grid::{ChunkCoord, chunks_in_radius};
pub use height::{FlatHeightField, HeightField, PerlinHeightField};
pub use streamer::{ChunkStreamer, StreamConfig, StreamError, StreamStats};
