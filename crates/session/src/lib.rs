//! Session: the top-level context object that owns the world configuration,
//! the block world, chunk streaming, collision and the actor, and advances
//! them one fixed-rate tick at a time.
//!
//! # Invariants
//! - All world mutation happens inside `Session` methods on the tick thread.
//! - The first tick draws everything in range before returning.
//! - `dt` is clamped to `max_tick_dt` and split into `substeps` equal steps.

mod actor;
mod error;
mod session;

pub use actor::Actor;
pub use error::SessionError;
pub use session::{Session, TickReport};
