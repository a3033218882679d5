//! Developer Tooling: world inspector, invariant checker, tick timing.
//!
//! # Invariants
//! - Tools only read world state; nothing here mutates a `World`.

pub mod inspector;
pub mod invariants;
pub mod timer;

pub use inspector::{BlockInfo, WorldInspector, WorldSummary};
pub use invariants::{InvariantViolation, check_invariants};
pub use timer::TickTimer;
