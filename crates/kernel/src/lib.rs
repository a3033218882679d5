//! World Kernel: authoritative block store, sector index, exposure-driven
//! visibility, the deferred render queue and actor collision.
//!
//! # Invariants
//! - Every stored block sits in exactly one sector bucket.
//! - A shown block exists and is exposed; an enclosed block is never shown.
//! - Once the command queue drains, each shown block owns exactly one primitive.
//! - All state mutations flow through `World::add_block` / `World::remove_block`.

pub mod collision;
pub mod error;
pub mod queue;
pub mod store;
pub mod visibility;
pub mod world;

pub use collision::{CollisionResolver, Resolved};
pub use error::WorldError;
pub use queue::{CommandQueue, PendingCommand};
pub use store::{BlockStore, RayHit};
pub use visibility::{Visibility, circular_offsets};
pub use world::{SectorChange, World};
