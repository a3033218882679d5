//! Input: desktop key, button and mouse events mapped to world actions, plus
//! the view and motion vectors derived from them.
//!
//! # Invariants
//! - The session sees `Action`s only, never raw events.
//! - Pitch stays within `[-90, 90]` degrees.

pub mod action;
pub mod view;

pub use action::{Action, InputState, Key, MouseButton};
pub use view::{LOOK_SENSITIVITY, Rotation, Strafe, motion_vector};
