use blockworld_common::BlockPos;

use crate::view::{Rotation, Strafe};

/// A high-level action produced by the input layer.
///
/// The session consumes actions, never raw key or mouse events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Mine the block the actor is looking at.
    Mine,
    /// Place the selected block against the one the actor is looking at.
    Place,
    /// Mine the block at an explicit position.
    MineAt(BlockPos),
    /// Place the selected block at an explicit position.
    PlaceAt(BlockPos),
    /// Replace the held movement keys.
    Strafe(Strafe),
    /// Replace the view orientation.
    Look(Rotation),
    Jump(bool),
    ToggleFlight,
    ToggleStreaming,
    /// Select a hotbar slot. Wraps around the hotbar length.
    SelectSlot(usize),
    /// Input with no binding.
    Noop,
}

/// Keys the desktop layer forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    Tab,
    Q,
    /// Number row key `1..=9`.
    Digit(u8),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Folds raw key, button and mouse events into [`Action`]s.
///
/// Movement keys are tracked as counters so overlapping presses of opposite
/// keys cancel instead of flipping direction.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    strafe: Strafe,
    rotation: Rotation,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strafe(&self) -> Strafe {
        self.strafe
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn key_pressed(&mut self, key: Key) -> Action {
        match key {
            Key::W => self.shift(-1, 0),
            Key::S => self.shift(1, 0),
            Key::A => self.shift(0, -1),
            Key::D => self.shift(0, 1),
            Key::Space => Action::Jump(true),
            Key::Tab => Action::ToggleFlight,
            Key::Q => Action::ToggleStreaming,
            Key::Digit(n) if (1..=9).contains(&n) => Action::SelectSlot(n as usize - 1),
            Key::Digit(_) | Key::Other => {
                tracing::trace!(?key, "unbound key");
                Action::Noop
            }
        }
    }

    pub fn key_released(&mut self, key: Key) -> Action {
        match key {
            Key::W => self.shift(1, 0),
            Key::S => self.shift(-1, 0),
            Key::A => self.shift(0, 1),
            Key::D => self.shift(0, -1),
            Key::Space => Action::Jump(false),
            _ => Action::Noop,
        }
    }

    pub fn button_pressed(&mut self, button: MouseButton) -> Action {
        match button {
            MouseButton::Left => Action::Mine,
            MouseButton::Right => Action::Place,
            MouseButton::Middle => Action::Noop,
        }
    }

    pub fn mouse_moved(&mut self, dx: f32, dy: f32) -> Action {
        self.rotation = self.rotation.turn(dx, dy);
        Action::Look(self.rotation)
    }

    fn shift(&mut self, forward: i8, sideways: i8) -> Action {
        self.strafe.forward = self.strafe.forward.saturating_add(forward);
        self.strafe.sideways = self.strafe.sideways.saturating_add(sideways);
        Action::Strafe(self.strafe)
    }
}
