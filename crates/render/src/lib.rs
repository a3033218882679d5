//! Rendering adapter: the interface the world model draws through.
//!
//! # Invariants
//! - Renderer cannot mutate world truth directly.
//! - Every handle it issues is handed back exactly once.
//!
//! Ships a null renderer and a recording renderer. A GPU backend implements
//! the same trait without changing the world model.

mod renderer;

pub use renderer::{NullRenderer, Primitive, PrimitiveId, RecordingRenderer, Renderer};
