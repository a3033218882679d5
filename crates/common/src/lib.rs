//! Shared vocabulary of the block world: coordinates, faces, texture
//! descriptors, the block palette and the world configuration.
//!
//! # Invariants
//! - `BlockPos` is the only key of block-level state.
//! - Sector keys never carry a vertical component.

pub mod blocks;
pub mod config;
pub mod types;

pub use blocks::{AtlasTile, TextureDescriptor};
pub use config::{ConfigError, PhysicsConfig, TerrainConfig, WorldConfig};
pub use types::{BlockPos, Face, SectorKey};
